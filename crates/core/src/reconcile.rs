//! Aligns the local device library with the server's low-value verdicts:
//! delete the device asset, then drop the entry from the visible list.

use crate::models::UntaggedPhoto;
use providers::{Access, DeviceLibrary, ProviderError, RemoteLibrary};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// In-memory list of deletion candidates. Refilled wholesale on each fetch;
/// nothing is cached between invocations.
#[derive(Debug, Clone, Default)]
pub struct UntaggedList {
    inner: Arc<Mutex<Vec<UntaggedPhoto>>>,
}

impl UntaggedList {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<UntaggedPhoto>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn replace(&self, photos: Vec<UntaggedPhoto>) {
        *self.lock() = photos;
    }

    /// Idempotent.
    pub fn remove(&self, id: &str) {
        self.lock().retain(|p| p.id != id);
    }

    pub fn snapshot(&self) -> Vec<UntaggedPhoto> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Fetches the current untagged candidates for this user.
pub async fn fetch_untagged(
    remote: &dyn RemoteLibrary,
    user_id: &str,
) -> Result<Vec<UntaggedPhoto>, ProviderError> {
    let records = remote.untagged(user_id).await?;
    Ok(records.into_iter().map(UntaggedPhoto::from).collect())
}

/// What one reconciliation pass did. The entry has left the visible list in
/// every variant except `AlreadyInFlight`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    Deleted,
    /// Server could not map the photo to a device asset; list-only removal.
    SkippedNoAsset,
    SkippedNoPermission,
    /// The device call failed; the entry is dropped anyway and the message
    /// is surfaced as a non-fatal warning.
    DeleteFailed(String),
    /// Another deletion for this id is still outstanding; nothing was done.
    AlreadyInFlight,
}

pub struct Reconciler {
    device: Arc<dyn DeviceLibrary>,
    uri_prefixes: Vec<String>,
    in_flight: Mutex<HashSet<String>>,
}

impl Reconciler {
    pub fn new(device: Arc<dyn DeviceLibrary>, uri_prefixes: Vec<String>) -> Self {
        Self {
            device,
            uri_prefixes,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Strips the first matching platform scheme from a device URI. A URI
    /// with no known scheme is used as-is.
    fn resolve_asset_id(&self, device_uri: &str) -> String {
        for prefix in &self.uri_prefixes {
            if let Some(rest) = device_uri.strip_prefix(prefix.as_str()) {
                return rest.to_string();
            }
        }
        device_uri.to_string()
    }

    fn in_flight(&self) -> MutexGuard<'_, HashSet<String>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Deletes the device asset behind one untagged photo, then removes the
    /// entry from the visible list no matter how the device call went. The
    /// remote service has already written this photo off; a device-side
    /// failure must not leave a stale, undeletable-looking entry behind.
    ///
    /// At most one deletion per photo id is in flight at a time; a second
    /// call while the first is outstanding returns `AlreadyInFlight` with no
    /// side effects.
    pub async fn delete_photo(&self, list: &UntaggedList, photo: &UntaggedPhoto) -> CleanupOutcome {
        if !self.in_flight().insert(photo.id.clone()) {
            return CleanupOutcome::AlreadyInFlight;
        }

        let outcome = self.delete_device_asset(photo).await;
        list.remove(&photo.id);
        self.in_flight().remove(&photo.id);

        match &outcome {
            CleanupOutcome::DeleteFailed(msg) => {
                warn!("device delete for {} failed: {}", photo.id, msg);
            }
            CleanupOutcome::SkippedNoPermission => {
                info!("media deletion permission denied; {} left on device", photo.id);
            }
            _ => {}
        }
        outcome
    }

    async fn delete_device_asset(&self, photo: &UntaggedPhoto) -> CleanupOutcome {
        let asset_id = photo
            .device_uri
            .as_deref()
            .map(|uri| self.resolve_asset_id(uri))
            .unwrap_or_default();
        if asset_id.is_empty() {
            return CleanupOutcome::SkippedNoAsset;
        }

        match self.device.request_permission(Access::Write).await {
            Ok(true) => {}
            Ok(false) => return CleanupOutcome::SkippedNoPermission,
            Err(err) => return CleanupOutcome::DeleteFailed(err.to_string()),
        }

        match self.device.delete_asset(&asset_id).await {
            Ok(()) => CleanupOutcome::Deleted,
            Err(err) => CleanupOutcome::DeleteFailed(err.to_string()),
        }
    }
}
