use providers::{UntaggedRecord, UploadReceipt};
use serde::{Deserialize, Serialize};

/// Remote processing state of a tracked photo. Anything the service reports
/// that we cannot interpret lands on `Unknown` rather than failing the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoStatus {
    Processing,
    Completed,
    Failed,
    Unknown,
}

impl PhotoStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("processing") => PhotoStatus::Processing,
            Some("completed") => PhotoStatus::Completed,
            Some("failed") => PhotoStatus::Failed,
            _ => PhotoStatus::Unknown,
        }
    }

    /// Terminal statuses end polling.
    pub fn is_terminal(self) -> bool {
        matches!(self, PhotoStatus::Completed | PhotoStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhotoStatus::Processing => "processing",
            PhotoStatus::Completed => "completed",
            PhotoStatus::Failed => "failed",
            PhotoStatus::Unknown => "unknown",
        }
    }
}

/// One remote-tracked upload. `photo_id` is assigned by the service and is
/// the primary key in the collection store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedPhoto {
    pub photo_id: String,
    pub storage_url: String,
    pub status: PhotoStatus,
}

impl TrackedPhoto {
    /// A missing status on the receipt means processing has just started.
    pub fn from_receipt(receipt: UploadReceipt) -> Self {
        let status = match receipt.status.as_deref() {
            None => PhotoStatus::Processing,
            raw => PhotoStatus::parse(raw),
        };
        Self {
            photo_id: receipt.photo_id,
            storage_url: receipt.storage_url,
            status,
        }
    }
}

/// A remote-identified photo with no detected content, a candidate for
/// local deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UntaggedPhoto {
    pub id: String,
    pub storage_url: String,
    /// Opaque handle for the matching device asset; absent when the server
    /// could not map the photo back to the device.
    pub device_uri: Option<String>,
}

impl From<UntaggedRecord> for UntaggedPhoto {
    fn from(record: UntaggedRecord) -> Self {
        Self {
            id: record.id,
            storage_url: record.storage_url,
            device_uri: record.device_uri,
        }
    }
}

/// Absolute storage references pass through; relative ones are joined onto
/// the configured API base.
pub fn resolve_storage_url(base_url: &str, storage_url: &str) -> String {
    if storage_url.starts_with("http") {
        return storage_url.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        storage_url.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses() {
        assert_eq!(PhotoStatus::parse(Some("processing")), PhotoStatus::Processing);
        assert_eq!(PhotoStatus::parse(Some("completed")), PhotoStatus::Completed);
        assert_eq!(PhotoStatus::parse(Some("failed")), PhotoStatus::Failed);
    }

    #[test]
    fn unrecognized_status_is_unknown() {
        assert_eq!(PhotoStatus::parse(Some("queued")), PhotoStatus::Unknown);
        assert_eq!(PhotoStatus::parse(None), PhotoStatus::Unknown);
    }

    #[test]
    fn receipt_without_status_defaults_to_processing() {
        let photo = TrackedPhoto::from_receipt(providers::UploadReceipt {
            photo_id: "p1".into(),
            storage_url: "/s/p1.jpg".into(),
            status: None,
        });
        assert_eq!(photo.status, PhotoStatus::Processing);
    }

    #[test]
    fn storage_urls_resolve_against_base() {
        assert_eq!(
            resolve_storage_url("http://api.local", "/s/p1.jpg"),
            "http://api.local/s/p1.jpg"
        );
        assert_eq!(
            resolve_storage_url("http://api.local/", "s/p1.jpg"),
            "http://api.local/s/p1.jpg"
        );
        assert_eq!(
            resolve_storage_url("http://api.local", "https://cdn/p1.jpg"),
            "https://cdn/p1.jpg"
        );
    }
}
