//! Polling of the shared progress counters while a worker thread runs

use crate::display::{create_progress_bar, create_spinner};
use dirmirror_sync::ProgressState;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};

#[derive(Debug, Clone, Copy)]
enum Stage {
    Comparison,
    Replication,
}

/// Refreshes a progress display from [`ProgressState`] until a task finishes
pub struct ProgressPoller {
    progress_bar: Option<ProgressBar>,
    progress: Arc<ProgressState>,
    interval: Duration,
    stage: Stage,
}

impl ProgressPoller {
    /// Spinner reporting how many missing files were found so far
    pub fn for_comparison(progress: Arc<ProgressState>, interval: Duration, quiet: bool) -> Self {
        Self {
            progress_bar: create_spinner(quiet),
            progress,
            interval,
            stage: Stage::Comparison,
        }
    }

    /// Bar reporting processed files against the last comparison's total
    pub fn for_replication(progress: Arc<ProgressState>, interval: Duration, quiet: bool) -> Self {
        let total = progress.total_file_count();
        Self {
            progress_bar: create_progress_bar(total, quiet),
            progress,
            interval,
            stage: Stage::Replication,
        }
    }

    /// Wait for `task`, refreshing the display every interval
    pub async fn wait<T>(self, mut task: JoinHandle<T>) -> Result<T, JoinError> {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                result = &mut task => {
                    self.refresh();
                    if let Some(pb) = &self.progress_bar {
                        pb.finish_and_clear();
                    }
                    return result;
                }
                _ = ticker.tick() => self.refresh(),
            }
        }
    }

    fn refresh(&self) {
        let Some(pb) = &self.progress_bar else {
            return;
        };

        match self.stage {
            Stage::Comparison => pb.set_message(format!(
                "Comparing directories... {} missing files found",
                self.progress.total_file_count()
            )),
            Stage::Replication => {
                let snapshot = self.progress.snapshot();
                pb.set_position(u64::try_from(snapshot.processed_files).unwrap_or(0));
                pb.set_message(snapshot.current_file);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_returns_task_result() {
        let progress = Arc::new(ProgressState::new());
        let poller = ProgressPoller::for_replication(progress, Duration::from_millis(10), true);

        let task = tokio::task::spawn_blocking(|| {
            std::thread::sleep(Duration::from_millis(50));
            42
        });

        assert_eq!(poller.wait(task).await.unwrap(), 42);
    }
}
