//! Batch-ingestion helpers: bounded retry and the rate-throttled sync job.

mod retry;
mod sync;

pub use retry::with_retry;
pub use sync::{QuoteSyncJob, SyncReport};
