//! Filesystem-backed device library: a configured directory stands in for
//! the platform media library. Deletion goes through the system trash so a
//! wrong call stays recoverable.

use crate::{Access, DeviceLibrary, DevicePhoto, ProviderError};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

const IMAGE_EXTS: &[&str] = &["jpg", "jpeg", "png", "gif", "heic", "webp"];

#[derive(Debug, Clone)]
pub struct FsDeviceConfig {
    pub root: PathBuf,
    /// Write permission gate. Deletion requests are refused outright when
    /// this is off, regardless of filesystem state.
    pub allow_delete: bool,
}

pub struct FsDeviceLibrary {
    cfg: FsDeviceConfig,
}

impl FsDeviceLibrary {
    pub fn new(cfg: FsDeviceConfig) -> Self {
        Self { cfg }
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn created_secs(entry: &walkdir::DirEntry) -> i64 {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.created().or_else(|_| m.modified()).ok())
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl DeviceLibrary for FsDeviceLibrary {
    async fn request_permission(&self, access: Access) -> Result<bool, ProviderError> {
        let granted = match access {
            Access::Read => self.cfg.root.is_dir(),
            Access::Write => self.cfg.allow_delete && self.cfg.root.is_dir(),
        };
        Ok(granted)
    }

    async fn list_photos(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<DevicePhoto>, ProviderError> {
        let root = self.cfg.root.clone();
        let mut photos = tokio::task::spawn_blocking(move || {
            let mut out = Vec::new();
            for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() || !is_image(entry.path()) {
                    continue;
                }
                out.push(DevicePhoto {
                    asset_id: entry.path().to_string_lossy().into_owned(),
                    created: created_secs(&entry),
                });
            }
            out
        })
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))?;

        photos.sort_by(|a, b| b.created.cmp(&a.created).then(a.asset_id.cmp(&b.asset_id)));
        Ok(photos
            .into_iter()
            .skip(page.saturating_mul(per_page))
            .take(per_page)
            .collect())
    }

    async fn delete_asset(&self, asset_id: &str) -> Result<(), ProviderError> {
        if !self.cfg.allow_delete {
            return Err(ProviderError::PermissionDenied(
                "deletes are disabled for this device library".into(),
            ));
        }
        let root = self.cfg.root.clone();
        let asset = PathBuf::from(asset_id);
        tokio::task::spawn_blocking(move || {
            let root = std::fs::canonicalize(&root)
                .map_err(|e| ProviderError::Transport(format!("device root: {}", e)))?;
            let target = std::fs::canonicalize(&asset)
                .map_err(|e| ProviderError::Transport(format!("{}: {}", asset.display(), e)))?;
            if !target.starts_with(&root) {
                return Err(ProviderError::PermissionDenied(format!(
                    "{} is outside the device library",
                    target.display()
                )));
            }
            trash::delete(&target)
                .map_err(|e| ProviderError::Transport(format!("{}: {}", target.display(), e)))
        })
        .await
        .map_err(|e| ProviderError::Transport(e.to_string()))?
    }
}
