//! Progress reporting
//!
//! The engine drives a [`ProgressReporter`]; observers hold a
//! [`tokio::sync::watch::Receiver`] and render the latest
//! [`ProgressSnapshot`]. No operation result is stored here.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

/// How long a finished operation stays visible before observers reset.
pub const DEFAULT_LINGER: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProgressPhase {
    Idle,
    Running,
    Finished { success: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub phase: ProgressPhase,
    pub publish_total: usize,
    pub publish_done: usize,
    pub delete_total: usize,
    pub delete_done: usize,
    pub started_at: Option<DateTime<Utc>>,
}

impl ProgressSnapshot {
    pub fn idle() -> Self {
        Self {
            phase: ProgressPhase::Idle,
            publish_total: 0,
            publish_done: 0,
            delete_total: 0,
            delete_done: 0,
            started_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == ProgressPhase::Running
    }
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

struct Shared {
    tx: watch::Sender<ProgressSnapshot>,
    /// Bumped on every start so a stale linger reset cannot clobber a newer run
    generation: AtomicU64,
}

/// Counter state machine observed by status displays. Cheap to clone.
#[derive(Clone)]
pub struct ProgressReporter {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ProgressSnapshot::idle());
        Self {
            shared: Arc::new(Shared {
                tx,
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.shared.tx.subscribe()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.shared.tx.borrow().clone()
    }

    /// Reset counts and mark an operation as running.
    pub fn start(&self, publish_total: usize, delete_total: usize) {
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.tx.send_replace(ProgressSnapshot {
            phase: ProgressPhase::Running,
            publish_total,
            publish_done: 0,
            delete_total,
            delete_done: 0,
            started_at: Some(Utc::now()),
        });
    }

    /// Count one completed upload. Saturates at the declared total.
    pub fn increment_publish(&self) {
        self.shared.tx.send_if_modified(|s| {
            if s.is_running() && s.publish_done < s.publish_total {
                s.publish_done += 1;
                true
            } else {
                false
            }
        });
    }

    /// Count one completed deletion. Saturates at the declared total.
    pub fn increment_delete(&self) {
        self.shared.tx.send_if_modified(|s| {
            if s.is_running() && s.delete_done < s.delete_total {
                s.delete_done += 1;
                true
            } else {
                false
            }
        });
    }

    /// Mark the operation finished and reset observers to idle after `linger`.
    ///
    /// A failed operation reports zero completion. The reset is skipped if
    /// another operation has started in the meantime.
    pub fn finish(&self, success: bool, linger: Duration) {
        let generation = self.shared.generation.load(Ordering::SeqCst);
        self.shared.tx.send_modify(|s| {
            s.phase = ProgressPhase::Finished { success };
            if !success {
                s.publish_done = 0;
                s.delete_done = 0;
            }
        });

        if linger.is_zero() {
            self.reset_if_current(generation);
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let reporter = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(linger).await;
                    reporter.reset_if_current(generation);
                });
            }
            Err(_) => self.reset_if_current(generation),
        }
    }

    fn reset_if_current(&self, generation: u64) {
        if self.shared.generation.load(Ordering::SeqCst) == generation {
            self.shared.tx.send_replace(ProgressSnapshot::idle());
        }
    }
}
