//! Fans a user-selected batch of assets out to independent submit+poll
//! pairs.

use crate::collection::CollectionStore;
use crate::poller::{self, PollOutcome, PollPolicy};
use crate::uploader;
use providers::{AssetUpload, RemoteLibrary};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub file_name: String,
    pub error: String,
}

/// Result of one batch run. The orchestrator has already returned by the
/// time any poller resolves; `pollers` exists so a process host can wait for
/// them before exiting.
pub struct BatchOutcome {
    pub submitted: Vec<String>,
    pub failures: Vec<BatchFailure>,
    pub pollers: Vec<JoinHandle<PollOutcome>>,
}

/// Submits the assets in selection order, one at a time. A failed submission
/// is recorded and the loop moves on; one bad file never aborts the rest of
/// the batch. Each success is inserted into the store immediately, then a
/// detached poller takes over for that photo id.
pub async fn upload_batch(
    remote: Arc<dyn RemoteLibrary>,
    store: &CollectionStore,
    user_id: &str,
    assets: &[AssetUpload],
    policy: PollPolicy,
) -> BatchOutcome {
    let mut outcome = BatchOutcome {
        submitted: Vec::new(),
        failures: Vec::new(),
        pollers: Vec::new(),
    };
    for asset in assets {
        match uploader::submit(remote.as_ref(), user_id, asset).await {
            Ok(photo) => {
                let photo_id = photo.photo_id.clone();
                store.insert(photo);
                outcome.pollers.push(poller::spawn_poller(
                    remote.clone(),
                    store.clone(),
                    photo_id.clone(),
                    policy,
                ));
                outcome.submitted.push(photo_id);
            }
            Err(err) => {
                warn!("upload of {} failed: {}", asset.file_name, err);
                outcome.failures.push(BatchFailure {
                    file_name: asset.file_name.clone(),
                    error: err.to_string(),
                });
            }
        }
    }
    info!(
        "batch complete: {} submitted, {} failed",
        outcome.submitted.len(),
        outcome.failures.len()
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PhotoStatus;
    use crate::poller::PollPolicy;
    use providers::mock::{receipt, report, ScriptedRemote};
    use providers::ProviderError;
    use std::time::Duration;

    fn fast() -> PollPolicy {
        PollPolicy {
            attempts: 3,
            interval: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn one_bad_asset_does_not_abort_the_batch() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.push_upload(Ok(receipt("p1", "/s/p1.jpg", Some("processing"))));
        remote.push_upload(Err(ProviderError::Api {
            status: 422,
            message: "INVALID_IMAGE: unsupported format".into(),
        }));
        remote.push_upload(Ok(receipt("p3", "/s/p3.jpg", Some("processing"))));
        // Terminal on first poll for both survivors.
        remote.push_status(Ok(report(Some("completed"))));
        remote.push_status(Ok(report(Some("completed"))));

        let store = CollectionStore::new();
        let assets = vec![
            AssetUpload::from_path("/tmp/a.jpg"),
            AssetUpload::from_path("/tmp/b.jpg"),
            AssetUpload::from_path("/tmp/c.jpg"),
        ];
        let outcome = upload_batch(remote, &store, "u1", &assets, fast()).await;

        assert_eq!(outcome.submitted, vec!["p1", "p3"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].file_name, "b.jpg");
        assert_eq!(store.len(), 2);
        assert!(store.get("p1").is_some());
        assert!(store.get("p3").is_some());

        for handle in outcome.pollers {
            handle.await.unwrap();
        }
    }

    #[tokio::test]
    async fn store_holds_entry_before_any_poll_completes() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.push_upload(Ok(receipt("p1", "/s/p1.jpg", Some("processing"))));
        // Poller will see a terminal status when it eventually runs.
        remote.push_status(Ok(report(Some("completed"))));

        let store = CollectionStore::new();
        let assets = vec![AssetUpload::from_path("/tmp/a.jpg")];
        let outcome = upload_batch(remote, &store, "u1", &assets, fast()).await;

        // The batch has returned; the spawned poller has not been awaited
        // yet, so the entry still carries the submission status.
        let photo = store.get("p1").unwrap();
        assert_eq!(photo.status, PhotoStatus::Processing);
        assert_eq!(photo.storage_url, "/s/p1.jpg");
        assert_eq!(store.len(), 1);

        for handle in outcome.pollers {
            handle.await.unwrap();
        }
        assert_eq!(store.get("p1").unwrap().status, PhotoStatus::Completed);
    }

    #[tokio::test]
    async fn insertions_follow_selection_order() {
        let remote = Arc::new(ScriptedRemote::new());
        remote.push_upload(Ok(receipt("p1", "/s/p1.jpg", None)));
        remote.push_upload(Ok(receipt("p2", "/s/p2.jpg", None)));
        remote.push_status(Ok(report(Some("completed"))));
        remote.push_status(Ok(report(Some("completed"))));

        let store = CollectionStore::new();
        let assets = vec![
            AssetUpload::from_path("/tmp/a.jpg"),
            AssetUpload::from_path("/tmp/b.jpg"),
        ];
        let outcome = upload_batch(remote, &store, "u1", &assets, fast()).await;

        // Prepend order: the photo submitted last shows first.
        let ids: Vec<_> = store.snapshot().iter().map(|p| p.photo_id.clone()).collect();
        assert_eq!(ids, vec!["p2", "p1"]);

        for handle in outcome.pollers {
            handle.await.unwrap();
        }
    }
}
