use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter, fmt, prelude::*, EnvFilter};

/// Target for pipeline log lines that the CLI already prints to stdout.
/// They are kept in the log file but left off the console.
pub const RUN_LOG_TARGET: &str = "vinyl_sorter::run";

fn shows_on_console(target: &str) -> bool {
    target != RUN_LOG_TARGET
}

/// Initializes process logging: a console layer on stderr and a daily
/// rotated JSON file under `log_dir`.
///
/// The returned guard flushes the file writer when dropped, so hold it for
/// the life of the process.
pub fn init_logging(log_dir: &Path) -> WorkerGuard {
    // Ensure logs directory exists
    let _ = fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::daily(log_dir, "vinyl-sorter.log");
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    // stdout carries the run's own log stream; diagnostics go to stderr
    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(filter::filter_fn(|meta| shows_on_console(meta.target())));

    // Respect RUST_LOG if set; otherwise info for our crate, warnings elsewhere
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vinyl_sorter=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_lines_stay_off_console() {
        assert!(!shows_on_console(RUN_LOG_TARGET));
        assert!(shows_on_console("vinyl_sorter::app::enrich_use_case"));
        assert!(shows_on_console("vinyl_sorter::run_summary"));
    }
}
