use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::app::ports::{LogSink, ProgressSink};
use crate::domain::{LogEntry, LogLevel};
use crate::observability::logging::RUN_LOG_TARGET;

/// Everything a running pipeline tells its caller
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Progress(u8),
    Log(LogEntry),
}

/// Progress and log sink that forwards onto a channel, so a pipeline
/// suspended in a cooldown never holds back delivery.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<PipelineEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn report(&self, percent: u8) {
        // A closed receiver only means nobody is watching any more
        let _ = self.tx.send(PipelineEvent::Progress(percent));
    }
}

impl LogSink for ChannelSink {
    fn emit(&self, entry: LogEntry) {
        let _ = self.tx.send(PipelineEvent::Log(entry));
    }
}

/// Render events to stdout as they arrive, mirroring log lines into tracing
/// under `RUN_LOG_TARGET` (file only).
/// The task ends once every sender has been dropped.
pub fn spawn_console_renderer(mut rx: UnboundedReceiver<PipelineEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_progress = None;
        while let Some(event) = rx.recv().await {
            match event {
                PipelineEvent::Progress(percent) => {
                    if last_progress != Some(percent) {
                        println!("[{:>3}%]", percent);
                        last_progress = Some(percent);
                    }
                }
                PipelineEvent::Log(entry) => {
                    match entry.level {
                        LogLevel::Info | LogLevel::Success => info!(target: RUN_LOG_TARGET, "{}", entry.message),
                        LogLevel::Warning => warn!(target: RUN_LOG_TARGET, "{}", entry.message),
                        LogLevel::Error => error!(target: RUN_LOG_TARGET, "{}", entry.message),
                    }
                    println!("{}", entry);
                }
            }
        }
    })
}
