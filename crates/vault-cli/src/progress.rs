//! Terminal rendering of publish progress

use std::io::{IsTerminal, Write};

use colored::Colorize;
use tokio::task::JoinHandle;
use vault_core::{ProgressPhase, ProgressReporter, ProgressSnapshot};

/// Render one progress line.
pub fn format_line(snapshot: &ProgressSnapshot) -> String {
    let mut line = format!(
        "Publishing {}/{}",
        snapshot.publish_done, snapshot.publish_total
    );
    if snapshot.delete_total > 0 {
        line.push_str(&format!(
            ", deleting {}/{}",
            snapshot.delete_done, snapshot.delete_total
        ));
    }
    line
}

/// Watches a reporter and redraws a status line on stderr.
pub struct ProgressView {
    reporter: ProgressReporter,
    task: Option<JoinHandle<()>>,
}

impl ProgressView {
    /// Start watching. Nothing is drawn unless stderr is a terminal.
    pub fn spawn(reporter: &ProgressReporter) -> Self {
        let task = std::io::stderr().is_terminal().then(|| {
            let mut rx = reporter.subscribe();
            tokio::spawn(async move {
                while rx.changed().await.is_ok() {
                    let snapshot = rx.borrow_and_update().clone();
                    let mut stderr = std::io::stderr();
                    match snapshot.phase {
                        ProgressPhase::Running => {
                            let _ = write!(stderr, "\r{}", format_line(&snapshot).dimmed());
                            let _ = stderr.flush();
                        }
                        ProgressPhase::Finished { .. } => {
                            let _ = writeln!(stderr, "\r{}", format_line(&snapshot).dimmed());
                            break;
                        }
                        ProgressPhase::Idle => {}
                    }
                }
            })
        });
        Self {
            reporter: reporter.clone(),
            task,
        }
    }

    /// Stop watching once the operation has returned.
    pub async fn finish(self) {
        let Some(task) = self.task else {
            return;
        };
        // The final state stays visible while the reporter lingers
        if matches!(self.reporter.snapshot().phase, ProgressPhase::Finished { .. }) {
            let _ = task.await;
        } else {
            task.abort();
        }
    }
}
