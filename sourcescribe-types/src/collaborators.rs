use crate::{AppSummaryRecord, FingerprintKey, SourceRecord};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// External document store. All operations are assumed linearizable per
/// key; the core never takes an application-level lock around them.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_source(&self, record: SourceRecord) -> Result<(), String>;
    async fn delete_sources_by_project(&self, project_name: &str) -> Result<(), String>;
    async fn does_project_source_exist(&self, key: &FingerprintKey) -> Result<bool, String>;
    async fn create_or_replace_app_summary(&self, record: AppSummaryRecord) -> Result<(), String>;
}

/// Yields a finite, restartable lazy sequence of absolute file paths under
/// a root, honoring the directory-ignore and filename-prefix-ignore sets.
/// `walk` returns as soon as the producing task is spawned; paths arrive
/// over the channel as the tree is traversed, so the Capture Orchestrator
/// can start dispatching work before the whole tree has been read. The
/// worker-pool semaphore stays the only backpressure mechanism: the
/// channel itself is unbounded, since bounding it would add a second,
/// redundant point of backpressure between the walk and the pool.
#[async_trait]
pub trait FileWalker: Send + Sync {
    async fn walk(&self, root: &std::path::Path) -> Result<tokio::sync::mpsc::Receiver<PathBuf>, String>;
}

/// Time source and cancellation-aware sleep, injected so retry backoff and
/// cancellation tests are deterministic.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> chrono::DateTime<chrono::Utc>;

    /// Sleeps for `duration` unless `cancellation` fires first, in which
    /// case the sleep is abandoned immediately.
    async fn sleep(&self, duration: Duration, cancellation: &CancellationToken);
}

/// Real wall-clock implementation, used outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }

    async fn sleep(&self, duration: Duration, cancellation: &CancellationToken) {
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = cancellation.cancelled() => {}
        }
    }
}
