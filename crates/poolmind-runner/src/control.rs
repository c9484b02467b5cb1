use serde::{Deserialize, Serialize};

/// Commands an outer surface (dashboard button, replay file) can send to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlEvent {
    /// Start a new game without touching the tracker.
    ResetGame,
}

/// A queue of control events.
/// Producers push at any time; the runner drains it at the start of each tick.
pub struct ControlQueue {
    events: Vec<ControlEvent>,
}

impl ControlQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(4),
        }
    }

    pub fn push(&mut self, event: ControlEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for ControlQueue {
    fn default() -> Self {
        Self::new()
    }
}
