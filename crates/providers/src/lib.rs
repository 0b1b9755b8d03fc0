//! Provider abstractions for the remote photo service and the local device
//! media library.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub mod device;
pub mod error;
pub mod http;
pub mod mock;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network unreachable, timeout, or a local I/O failure on the way to
    /// the wire.
    #[error("transport error: {0}")]
    Transport(String),
    /// Non-2xx response; `message` already carries the classified detail.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// One local asset queued for submission.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: String,
}

impl AssetUpload {
    /// Builds an upload from a file path, deriving the display name and a
    /// content-type hint from the path itself.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.jpg".to_string());
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let content_type = match ext.as_deref() {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("heic") => "image/heic",
            _ => "image/jpeg",
        }
        .to_string();
        Self {
            path,
            file_name,
            content_type,
        }
    }
}

/// Successful submission response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub photo_id: String,
    pub storage_url: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// One status query response. `status` stays raw here; interpreting it is
/// the caller's business.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default)]
    pub status: Option<String>,
}

/// Remote record of a photo with no detected content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UntaggedRecord {
    pub id: String,
    pub storage_url: String,
    #[serde(default)]
    pub device_uri: Option<String>,
}

#[async_trait::async_trait]
pub trait RemoteLibrary: Send + Sync {
    async fn upload(
        &self,
        user_id: &str,
        asset: &AssetUpload,
    ) -> Result<UploadReceipt, ProviderError>;

    async fn photo_status(&self, photo_id: &str) -> Result<StatusReport, ProviderError>;

    async fn untagged(&self, user_id: &str) -> Result<Vec<UntaggedRecord>, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// One photo as seen by the device library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicePhoto {
    /// Platform identifier usable with `delete_asset`.
    pub asset_id: String,
    /// Creation time, unix seconds.
    pub created: i64,
}

#[async_trait::async_trait]
pub trait DeviceLibrary: Send + Sync {
    async fn request_permission(&self, access: Access) -> Result<bool, ProviderError>;

    /// Pages through device photos, newest first.
    async fn list_photos(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<DevicePhoto>, ProviderError>;

    async fn delete_asset(&self, asset_id: &str) -> Result<(), ProviderError>;
}
