use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

use crate::models::CaseStage;

/// A progress checkpoint for one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub case_id: String,
    /// The stage about to run, or `Completed`
    pub stage: CaseStage,
    pub percentage: u8,
}

/// Receives progress checkpoints.
///
/// Called synchronously on the pipeline task, so implementations should be
/// quick. An `Err` is logged and otherwise ignored.
pub trait ProgressReporter: Send + Sync {
    fn notify(&self, event: &ProgressEvent) -> Result<()>;
}

impl<F> ProgressReporter for F
where
    F: Fn(&ProgressEvent) -> Result<()> + Send + Sync,
{
    fn notify(&self, event: &ProgressEvent) -> Result<()> {
        self(event)
    }
}

/// Logs each checkpoint at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingReporter;

impl ProgressReporter for LoggingReporter {
    fn notify(&self, event: &ProgressEvent) -> Result<()> {
        info!("Case {}: {} ({}%)", event.case_id, event.stage, event.percentage);
        Ok(())
    }
}

/// Forwards checkpoints into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressReporter for ChannelReporter {
    fn notify(&self, event: &ProgressEvent) -> Result<()> {
        self.tx
            .send(event.clone())
            .map_err(|_| anyhow::anyhow!("progress receiver dropped"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(percentage: u8) -> ProgressEvent {
        ProgressEvent {
            case_id: "c1".to_string(),
            stage: CaseStage::SymptomReasoning,
            percentage,
        }
    }

    #[test]
    fn test_channel_reporter() {
        let (reporter, mut rx) = ChannelReporter::new();
        reporter.notify(&event(20)).unwrap();
        assert_eq!(rx.try_recv().unwrap().percentage, 20);

        drop(rx);
        assert!(reporter.notify(&event(40)).is_err());
    }

    #[test]
    fn test_closure_reporter() {
        let seen = std::sync::Mutex::new(Vec::new());
        let reporter = |e: &ProgressEvent| -> Result<()> {
            seen.lock().unwrap().push(e.percentage);
            Ok(())
        };
        reporter.notify(&event(20)).unwrap();
        LoggingReporter.notify(&event(40)).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![20]);
    }
}
