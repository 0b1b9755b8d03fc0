//! End-to-end orchestration flows against scripted providers: batch upload
//! with per-asset isolation, detached polling into the shared store, and the
//! cleanup pass that reconciles the device library with server verdicts.

use camroll_core::batch;
use camroll_core::collection::CollectionStore;
use camroll_core::models::PhotoStatus;
use camroll_core::poller::PollPolicy;
use camroll_core::reconcile::{self, CleanupOutcome, Reconciler, UntaggedList};
use providers::mock::{receipt, report, ScriptedDevice, ScriptedRemote};
use providers::{AssetUpload, ProviderError, UntaggedRecord};
use std::sync::Arc;
use std::time::Duration;

fn fast_policy() -> PollPolicy {
    PollPolicy {
        attempts: 15,
        interval: Duration::ZERO,
    }
}

#[tokio::test]
async fn upload_then_poll_to_terminal() {
    let remote = Arc::new(ScriptedRemote::new());
    remote.push_upload(Ok(receipt("p1", "/s/p1.jpg", Some("processing"))));
    remote.push_status(Ok(report(Some("processing"))));
    remote.push_status(Ok(report(Some("processing"))));
    remote.push_status(Ok(report(Some("completed"))));

    let temp = tempfile::tempdir().unwrap();
    let file = temp.path().join("beach.jpg");
    std::fs::write(&file, b"fake_image_bytes").unwrap();

    let store = CollectionStore::new();
    let assets = vec![AssetUpload::from_path(&file)];
    assert_eq!(assets[0].file_name, "beach.jpg");
    assert_eq!(assets[0].content_type, "image/jpeg");
    let outcome = batch::upload_batch(remote, &store, "u1", &assets, fast_policy()).await;

    // Inserted with the submission status before any poll resolves.
    assert_eq!(store.get("p1").unwrap().status, PhotoStatus::Processing);

    for handle in outcome.pollers {
        handle.await.unwrap();
    }
    assert_eq!(store.get("p1").unwrap().status, PhotoStatus::Completed);
}

#[tokio::test]
async fn batch_of_three_with_failing_middle_asset() {
    let remote = Arc::new(ScriptedRemote::new());
    remote.push_upload(Ok(receipt("p1", "/s/p1.jpg", Some("processing"))));
    remote.push_upload(Err(ProviderError::Api {
        status: 413,
        message: "FILE_TOO_LARGE: image exceeds the size limit".into(),
    }));
    remote.push_upload(Ok(receipt("p3", "/s/p3.jpg", Some("processing"))));
    remote.push_status(Ok(report(Some("completed"))));
    remote.push_status(Ok(report(Some("failed"))));

    let store = CollectionStore::new();
    let assets = vec![
        AssetUpload::from_path("/tmp/one.jpg"),
        AssetUpload::from_path("/tmp/two.jpg"),
        AssetUpload::from_path("/tmp/three.jpg"),
    ];
    let outcome = batch::upload_batch(remote, &store, "u1", &assets, fast_policy()).await;

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].file_name, "two.jpg");
    assert_eq!(
        outcome.failures[0].error,
        "FILE_TOO_LARGE: image exceeds the size limit"
    );
    assert_eq!(store.len(), 2);

    for handle in outcome.pollers {
        handle.await.unwrap();
    }
    // Each surviving photo resolved independently.
    let statuses: Vec<_> = store
        .snapshot()
        .iter()
        .map(|p| (p.photo_id.clone(), p.status))
        .collect();
    assert!(statuses.contains(&("p1".to_string(), PhotoStatus::Completed)));
    assert!(statuses.contains(&("p3".to_string(), PhotoStatus::Failed)));
}

#[tokio::test]
async fn cleanup_reconciles_and_warns_on_device_failure() {
    let remote = ScriptedRemote::new();
    remote.set_untagged(vec![
        UntaggedRecord {
            id: "x1".into(),
            storage_url: "/s/x1.jpg".into(),
            device_uri: Some("ph://AAA".into()),
        },
        UntaggedRecord {
            id: "x2".into(),
            storage_url: "/s/x2.jpg".into(),
            device_uri: None,
        },
    ]);

    let candidates = reconcile::fetch_untagged(&remote, "u1").await.unwrap();
    assert_eq!(candidates.len(), 2);

    let device = Arc::new(ScriptedDevice::failing_delete());
    let reconciler = Reconciler::new(device, vec!["ph://".to_string()]);
    let list = UntaggedList::new();
    list.replace(candidates.clone());

    let mut warnings = 0usize;
    for photo in &candidates {
        if let CleanupOutcome::DeleteFailed(_) = reconciler.delete_photo(&list, photo).await {
            warnings += 1;
        }
    }

    // The device call for x1 threw; x2 had no device mapping. Both entries
    // are gone and exactly one warning was reported.
    assert!(list.is_empty());
    assert_eq!(warnings, 1);
}

#[tokio::test]
async fn exhausted_polling_leaves_photo_visible_as_processing() {
    let remote = Arc::new(ScriptedRemote::new());
    remote.push_upload(Ok(receipt("p1", "/s/p1.jpg", None)));
    for _ in 0..15 {
        remote.push_status(Ok(report(Some("processing"))));
    }

    let store = CollectionStore::new();
    let assets = vec![AssetUpload::from_path("/tmp/slow.jpg")];
    let outcome = batch::upload_batch(remote, &store, "u1", &assets, fast_policy()).await;

    for handle in outcome.pollers {
        handle.await.unwrap();
    }
    // Soft failure: the entry stays, still showing processing.
    assert_eq!(store.get("p1").unwrap().status, PhotoStatus::Processing);
}
