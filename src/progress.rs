//! Progress reporting.
//!
//! The engine calls a [`ProgressSink`] synchronously once per generation
//! and at coarse lifecycle milestones. Sinks must return promptly: the
//! channel-backed sinks never block, they drop events the host cannot take.

use std::fmt;
use std::sync::mpsc::{Sender, SyncSender};

use serde::{Deserialize, Serialize};

/// Coarse lifecycle milestones of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Milestone {
    /// Parameters and inputs are being checked.
    Initializing,
    /// The session space is being built.
    PreparingData,
    /// The genetic search is running.
    Searching,
    /// The result is ready.
    Completed,
}

impl Milestone {
    /// Human-readable status label.
    pub fn label(&self) -> &'static str {
        match self {
            Milestone::Initializing => "Initializing",
            Milestone::PreparingData => "Preparing data",
            Milestone::Searching => "Running genetic search",
            Milestone::Completed => "Completed",
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressEvent {
    /// A lifecycle milestone was reached.
    Status(Milestone),
    /// Generation `current` of at most `total` finished.
    Generation { current: usize, total: usize },
}

/// Receiver of progress notifications.
pub trait ProgressSink {
    /// Called synchronously by the engine. Must not block.
    fn notify(&mut self, event: ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn notify(&mut self, _event: ProgressEvent) {}
}

/// Adapts a closure into a sink.
///
/// ```
/// use u_civics::progress::{ProgressEvent, ProgressFn, ProgressSink};
///
/// let mut seen = Vec::new();
/// let mut sink = ProgressFn(|e: ProgressEvent| seen.push(e));
/// sink.notify(ProgressEvent::Generation { current: 1, total: 10 });
/// drop(sink);
/// assert_eq!(seen.len(), 1);
/// ```
pub struct ProgressFn<F>(pub F);

impl<F: FnMut(ProgressEvent)> ProgressSink for ProgressFn<F> {
    fn notify(&mut self, event: ProgressEvent) {
        (self.0)(event)
    }
}

impl ProgressSink for Sender<ProgressEvent> {
    fn notify(&mut self, event: ProgressEvent) {
        // A hung-up receiver is not the engine's problem.
        let _ = self.send(event);
    }
}

impl ProgressSink for SyncSender<ProgressEvent> {
    fn notify(&mut self, event: ProgressEvent) {
        let _ = self.try_send(event);
    }
}

/// Records every event. Useful for tests and batch hosts.
#[derive(Debug, Clone, Default)]
pub struct ProgressLog {
    pub events: Vec<ProgressEvent>,
}

impl ProgressLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generation events, in order.
    pub fn generations(&self) -> Vec<(usize, usize)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Generation { current, total } => Some((*current, *total)),
                ProgressEvent::Status(_) => None,
            })
            .collect()
    }

    /// Milestones, in order.
    pub fn milestones(&self) -> Vec<Milestone> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Status(m) => Some(*m),
                ProgressEvent::Generation { .. } => None,
            })
            .collect()
    }
}

impl ProgressSink for ProgressLog {
    fn notify(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}
