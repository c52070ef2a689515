//! Extended-lifetime tracking for event handlers.
//!
//! A fetch event can answer before all of its work is finished (a
//! stale-while-revalidate refresh keeps running after the cached copy is
//! returned). That work is registered here, and the host awaits
//! [`WaitUntil::settle`] before it considers the event done.

use serde::Serialize;
use stalecache_core::Error;
use tokio::task::JoinHandle;

/// Outcome counts of a settled [`WaitUntil`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct SettleReport {
    pub completed: usize,
    pub failed: usize,
}

/// Background tasks an event handler spawned and the host must outlive.
#[derive(Debug, Default)]
pub struct WaitUntil {
    pending: Vec<(String, JoinHandle<Result<(), Error>>)>,
}

impl WaitUntil {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spawned task under a label used when reporting its failure.
    pub fn track(&mut self, label: impl Into<String>, handle: JoinHandle<Result<(), Error>>) {
        self.pending.push((label.into(), handle));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Await every tracked task.
    ///
    /// Failures are logged, never propagated: a task that returned an error is
    /// a handled failure, a task that panicked is an unhandled one.
    pub async fn settle(self) -> SettleReport {
        let mut report = SettleReport::default();
        for (label, handle) in self.pending {
            match handle.await {
                Ok(Ok(())) => report.completed += 1,
                Ok(Err(e)) => {
                    tracing::warn!(task = %label, error = %e, "background task failed");
                    report.failed += 1;
                }
                Err(e) => {
                    tracing::error!(task = %label, error = %e, "unhandled failure in background task");
                    report.failed += 1;
                }
            }
        }
        report
    }
}
