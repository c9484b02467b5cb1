use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::api::types::{BallId, ColorClass};

/// Maximum number of undrained events kept by an [`EventLog`].
pub const MAX_EVENTS: usize = 100;

/// Type tag of a game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A ball vanished near a pocket.
    Pot,
    /// The cue ball was potted, or a scratch on an 8-ball attempt.
    Scratch,
    GameReset,
    EightBallBreakLoss,
    BreakScratch,
    BreakMade,
    BreakMiss,
    Miss,
    GroupAssigned,
    Foul,
    LegalPot,
    EightBallLoss,
    EightBallWin,
    EightBallMiss,
}

/// A timestamped game event. `ts` is seconds since the UNIX epoch at emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball_id: Option<BallId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ball_type: Option<ColorClass>,
    pub ts: f64,
}

impl Event {
    pub fn new(kind: EventKind, info: impl Into<String>) -> Self {
        Self {
            kind,
            info: info.into(),
            ball_id: None,
            ball_type: None,
            ts: now_secs(),
        }
    }

    pub fn with_ball(mut self, id: BallId) -> Self {
        self.ball_id = Some(id);
        self
    }

    pub fn with_ball_type(mut self, color: ColorClass) -> Self {
        self.ball_type = Some(color);
        self
    }
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Append-only event buffer, capped at [`MAX_EVENTS`]. Oldest entries drop first.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<Event>,
    capacity: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(MAX_EVENTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, event: Event) {
        if self.capacity == 0 {
            return;
        }
        while self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Take every buffered event, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<Event> for EventLog {
    fn extend<I: IntoIterator<Item = Event>>(&mut self, iter: I) {
        for event in iter {
            self.push(event);
        }
    }
}
