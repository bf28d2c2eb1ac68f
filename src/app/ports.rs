use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::{LogEntry, ReleaseMetadata};
use crate::error::LookupError;

/// Remote catalog lookup by release id
#[async_trait]
pub trait CatalogPort: Send + Sync {
    async fn fetch_release(
        &self,
        release_id: &str,
        credential: &str,
    ) -> Result<ReleaseMetadata, LookupError>;
}

/// Receives run progress as a whole percentage, 0 to 100
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

/// Receives the user-facing log stream in emission order
pub trait LogSink: Send + Sync {
    fn emit(&self, entry: LogEntry);
}

/// Polled at item boundaries; true means stop before the next item
pub trait CancellationPort: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

impl<F> ProgressSink for F
where
    F: Fn(u8) + Send + Sync,
{
    fn report(&self, percent: u8) {
        self(percent)
    }
}

impl<F> LogSink for F
where
    F: Fn(LogEntry) + Send + Sync,
{
    fn emit(&self, entry: LogEntry) {
        self(entry)
    }
}

impl<F> CancellationPort for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Shared stop flag, cheap to clone into a signal handler
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl CancellationPort for CancellationFlag {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
