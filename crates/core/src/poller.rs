//! Per-photo status polling loop.

use crate::collection::CollectionStore;
use crate::config::PollingConfig;
use crate::models::PhotoStatus;
use providers::RemoteLibrary;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Attempt budget and inter-attempt delay for one polling run. Linear
/// polling, no backoff: remote processing latency is assumed short and
/// bounded.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            attempts: 15,
            interval: Duration::from_millis(1500),
        }
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(cfg: &PollingConfig) -> Self {
        Self {
            attempts: cfg.attempts,
            interval: Duration::from_millis(cfg.interval_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Resolved(PhotoStatus),
    /// Attempt budget spent without a terminal status. The last known
    /// non-terminal status stays visible in the store; nothing is escalated.
    Exhausted,
}

/// Polls one photo's processing status until it turns terminal or the budget
/// runs out. A failed query is inconclusive rather than fatal: the remote
/// pipeline may still be mid-flight, so the loop just moves to the next
/// attempt.
pub async fn poll_status(
    remote: Arc<dyn RemoteLibrary>,
    store: CollectionStore,
    photo_id: String,
    policy: PollPolicy,
) -> PollOutcome {
    for attempt in 1..=policy.attempts {
        match remote.photo_status(&photo_id).await {
            Ok(report) => {
                let status = PhotoStatus::parse(report.status.as_deref());
                store.update_status(&photo_id, status);
                if status.is_terminal() {
                    debug!(
                        "photo {} resolved {} on attempt {}",
                        photo_id,
                        status.as_str(),
                        attempt
                    );
                    return PollOutcome::Resolved(status);
                }
            }
            Err(err) => {
                debug!("status query for {} failed on attempt {}: {}", photo_id, attempt, err);
            }
        }
        if attempt < policy.attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }
    debug!("polling exhausted for photo {}", photo_id);
    PollOutcome::Exhausted
}

/// Starts a detached polling loop for one photo id. The handle is returned
/// so a process host can drain outstanding loops before exiting; the upload
/// path never awaits it.
pub fn spawn_poller(
    remote: Arc<dyn RemoteLibrary>,
    store: CollectionStore,
    photo_id: String,
    policy: PollPolicy,
) -> JoinHandle<PollOutcome> {
    tokio::spawn(poll_status(remote, store, photo_id, policy))
}
