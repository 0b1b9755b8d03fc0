//! Scripted in-memory providers. Responses are queued ahead of time and
//! popped in call order, so tests can drive the orchestration layers without
//! a network or a real media library.

use crate::{
    Access, AssetUpload, DeviceLibrary, DevicePhoto, ProviderError, RemoteLibrary, StatusReport,
    UntaggedRecord, UploadReceipt,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn receipt(photo_id: &str, storage_url: &str, status: Option<&str>) -> UploadReceipt {
    UploadReceipt {
        photo_id: photo_id.to_string(),
        storage_url: storage_url.to_string(),
        status: status.map(str::to_string),
    }
}

pub fn report(status: Option<&str>) -> StatusReport {
    StatusReport {
        status: status.map(str::to_string),
    }
}

#[derive(Default)]
pub struct ScriptedRemote {
    uploads: Mutex<VecDeque<Result<UploadReceipt, ProviderError>>>,
    statuses: Mutex<VecDeque<Result<StatusReport, ProviderError>>>,
    untagged: Mutex<Vec<UntaggedRecord>>,
    pub upload_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_upload(&self, result: Result<UploadReceipt, ProviderError>) {
        self.uploads.lock().unwrap().push_back(result);
    }

    pub fn push_status(&self, result: Result<StatusReport, ProviderError>) {
        self.statuses.lock().unwrap().push_back(result);
    }

    pub fn set_untagged(&self, records: Vec<UntaggedRecord>) {
        *self.untagged.lock().unwrap() = records;
    }
}

#[async_trait::async_trait]
impl RemoteLibrary for ScriptedRemote {
    async fn upload(
        &self,
        _user_id: &str,
        _asset: &AssetUpload,
    ) -> Result<UploadReceipt, ProviderError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Transport("no scripted upload".into())))
    }

    async fn photo_status(&self, _photo_id: &str) -> Result<StatusReport, ProviderError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::Transport("no scripted status".into())))
    }

    async fn untagged(&self, _user_id: &str) -> Result<Vec<UntaggedRecord>, ProviderError> {
        Ok(self.untagged.lock().unwrap().clone())
    }
}

pub struct ScriptedDevice {
    pub grant_read: bool,
    pub grant_write: bool,
    pub fail_delete: bool,
    /// Artificial latency for `delete_asset`, for in-flight guard tests.
    pub delete_delay: Duration,
    pub photos: Mutex<Vec<DevicePhoto>>,
    pub deleted: Mutex<Vec<String>>,
}

impl ScriptedDevice {
    pub fn allowing_all() -> Self {
        Self {
            grant_read: true,
            grant_write: true,
            fail_delete: false,
            delete_delay: Duration::ZERO,
            photos: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn read_only() -> Self {
        Self {
            grant_write: false,
            ..Self::allowing_all()
        }
    }

    pub fn failing_delete() -> Self {
        Self {
            fail_delete: true,
            ..Self::allowing_all()
        }
    }
}

#[async_trait::async_trait]
impl DeviceLibrary for ScriptedDevice {
    async fn request_permission(&self, access: Access) -> Result<bool, ProviderError> {
        Ok(match access {
            Access::Read => self.grant_read,
            Access::Write => self.grant_write,
        })
    }

    async fn list_photos(
        &self,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<DevicePhoto>, ProviderError> {
        let photos = self.photos.lock().unwrap();
        Ok(photos
            .iter()
            .skip(page.saturating_mul(per_page))
            .take(per_page)
            .cloned()
            .collect())
    }

    async fn delete_asset(&self, asset_id: &str) -> Result<(), ProviderError> {
        if !self.delete_delay.is_zero() {
            tokio::time::sleep(self.delete_delay).await;
        }
        if self.fail_delete {
            return Err(ProviderError::Transport(
                "simulated device delete failure".into(),
            ));
        }
        self.deleted.lock().unwrap().push(asset_id.to_string());
        Ok(())
    }
}
