use std::collections::HashMap;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::app::ports::{CancellationPort, CatalogPort, LogSink, ProgressSink};
use crate::constants::MAX_ATTEMPTS;
use crate::domain::{sort_collection, CollectionItem, LogEntry, LogLevel};
use crate::error::{ErrorClass, LookupError};
use crate::observability::metrics;
use crate::pipeline::throttle::{RequestThrottle, ThrottleLimits};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnrichSettings {
    pub throttle: ThrottleLimits,
    /// Transport failures tolerated per item before it is dropped
    pub max_attempts: u32,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            throttle: ThrottleLimits::default(),
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

/// Result of one enrichment run. Dropped items are simply absent; compare
/// counts with the input and read the log to tell why.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentOutcome {
    /// Enriched items sorted by artist, then release year
    pub items: Vec<CollectionItem>,
    pub was_cancelled: bool,
}

/// Use case for enriching a normalized collection from the remote catalog.
///
/// Items are handled strictly one at a time in input order. Each item either
/// reuses data from a previous run, is fetched (with throttling, cooldowns and
/// bounded retries), or is dropped; no single item can abort the run.
pub struct EnrichUseCase {
    catalog: Box<dyn CatalogPort>,
    settings: EnrichSettings,
}

impl EnrichUseCase {
    pub fn new(catalog: Box<dyn CatalogPort>, settings: EnrichSettings) -> Self {
        Self { catalog, settings }
    }

    pub fn with_default_settings(catalog: Box<dyn CatalogPort>) -> Self {
        Self::new(catalog, EnrichSettings::default())
    }

    pub async fn enrich(
        &self,
        items: Vec<CollectionItem>,
        previous: &[CollectionItem],
        credential: &str,
        progress: &dyn ProgressSink,
        log: &dyn LogSink,
        cancel: &dyn CancellationPort,
    ) -> EnrichmentOutcome {
        let total = items.len();
        let reusable = index_reusable(previous);
        let mut throttle = RequestThrottle::new(self.settings.throttle.clone());
        let mut results = Vec::with_capacity(total);
        let mut was_cancelled = false;

        info!(total, reusable = reusable.len(), "Starting enrichment run");
        log.emit(LogEntry::new(
            LogLevel::Info,
            format!("🚀 Processing {} records...", total),
        ));

        for (index, mut item) in items.into_iter().enumerate() {
            if cancel.is_cancelled() {
                was_cancelled = true;
                log.emit(LogEntry::new(
                    LogLevel::Warning,
                    format!("⏹️ Processing stopped after {} of {} records", index, total),
                ));
                break;
            }

            match item.release_id.clone() {
                None => {
                    debug!(index, "Skipping row without a release id");
                    metrics::enrich::item_dropped("missing_release_id");
                }
                Some(release_id) => {
                    if let Some(prior) = reusable.get(release_id.as_str()) {
                        item.reuse_from(prior);
                        log.emit(LogEntry::new(
                            LogLevel::Info,
                            format!(
                                "♻️ Reused previous data for {} – {} (release {})",
                                item.artist, item.title, release_id
                            ),
                        ));
                        metrics::enrich::item_reused();
                        results.push(item);
                    } else if let Some(enriched) = self
                        .fetch_with_retry(item, &release_id, credential, &mut throttle, log)
                        .await
                    {
                        results.push(enriched);
                    }
                }
            }

            progress.report(percent(index + 1, total));
        }

        if total == 0 {
            progress.report(100);
        }

        sort_collection(&mut results);
        metrics::enrich::run_finished(was_cancelled);
        info!(
            input = total,
            output = results.len(),
            was_cancelled,
            "Enrichment run finished"
        );
        if !was_cancelled {
            log.emit(LogEntry::new(
                LogLevel::Success,
                format!("✅ Processed {} records successfully!", results.len()),
            ));
        }

        EnrichmentOutcome {
            items: results,
            was_cancelled,
        }
    }

    /// Look one release up. Returns `None` when the item is to be dropped.
    async fn fetch_with_retry(
        &self,
        mut item: CollectionItem,
        release_id: &str,
        credential: &str,
        throttle: &mut RequestThrottle,
        log: &dyn LogSink,
    ) -> Option<CollectionItem> {
        let mut failures = 0;

        while failures < self.settings.max_attempts {
            if throttle.before_request(log).await {
                metrics::enrich::cooldown("ceiling");
            }

            let started = Instant::now();
            let result = self.catalog.fetch_release(release_id, credential).await;
            let elapsed = started.elapsed().as_secs_f64();

            match result {
                Ok(release) => {
                    throttle.record_request();
                    metrics::enrich::remote_call("success", elapsed);
                    item.apply_release(&release);
                    let year = item
                        .release_year
                        .map(|y| y.to_string())
                        .unwrap_or_else(|| "?".to_string());
                    log.emit(LogEntry::new(
                        LogLevel::Success,
                        format!("🎵 {} | {} | [{}]", item.artist, year, item.genres.join(", ")),
                    ));
                    metrics::enrich::item_enriched();
                    return Some(item);
                }
                Err(err) if err.classify() == ErrorClass::PermanentPerItem => {
                    throttle.record_request();
                    let reason = match err {
                        LookupError::Malformed(_) => "malformed",
                        _ => "http_status",
                    };
                    metrics::enrich::remote_call(reason, elapsed);
                    metrics::enrich::item_dropped(reason);
                    log.emit(LogEntry::new(
                        LogLevel::Error,
                        format!("❌ Error processing release {}: {}", release_id, err),
                    ));
                    return None;
                }
                Err(LookupError::RateLimited) => {
                    // Backpressure, not failure: does not count against the attempts
                    throttle.record_request();
                    metrics::enrich::remote_call("rate_limited", elapsed);
                    log.emit(LogEntry::new(
                        LogLevel::Warning,
                        format!("🚦 Rate limited while fetching release {}", release_id),
                    ));
                    throttle.cooldown(log).await;
                    throttle.reset();
                    metrics::enrich::cooldown("rate_limited");
                }
                Err(err) => {
                    // Remaining transient class: the connection failed
                    failures += 1;
                    metrics::enrich::remote_call("transport_error", elapsed);
                    log.emit(LogEntry::new(
                        LogLevel::Warning,
                        format!(
                            "❌ Release {} failed (attempt {}/{}): {}",
                            release_id, failures, self.settings.max_attempts, err
                        ),
                    ));
                    log.emit(LogEntry::new(
                        LogLevel::Info,
                        "⏳ Waiting before retrying to prevent rate limiting...",
                    ));
                    throttle.cooldown(log).await;
                    throttle.reset();
                    metrics::enrich::cooldown("transport");
                }
            }
        }

        // Known lossy edge: the source row is not kept when retries run out
        metrics::enrich::item_dropped("retries_exhausted");
        log.emit(LogEntry::new(
            LogLevel::Error,
            format!(
                "🗑️ Dropping release {} after {} failed attempts",
                release_id, failures
            ),
        ));
        None
    }
}

/// Previous-run items keyed by release id, keeping only those with genres
/// and real artwork. The first such entry per release wins.
fn index_reusable(previous: &[CollectionItem]) -> HashMap<&str, &CollectionItem> {
    let mut index = HashMap::new();
    for item in previous.iter().filter(|item| item.has_reusable_metadata()) {
        if let Some(release_id) = item.release_id.as_deref() {
            index.entry(release_id).or_insert(item);
        }
    }
    index
}

/// Rounded completion percentage. 100 is held back until the last item is
/// done, so rounding on large inputs never signals completion early.
fn percent(done: usize, total: usize) -> u8 {
    if total == 0 || done >= total {
        return 100;
    }
    let rounded = ((done as f64 / total as f64) * 100.0).round() as u8;
    rounded.min(99)
}
