//! Snapshot hub: the hand-off point between the single-threaded frame loop and
//! reader threads (dashboard, metrics). The core engine is not thread-safe; only
//! cloned snapshots cross this boundary.

use poolmind::{Event, EventLog, GameSnapshot};
use std::sync::{Mutex, MutexGuard};

/// Default number of events retained for readers.
pub const HUB_MAX_EVENTS: usize = 200;

/// Everything a reader gets from one [`SnapshotHub::snapshot`] call.
#[derive(Debug, Clone, Default)]
pub struct HubSnapshot {
    /// Index of the last published frame, `None` before the first one.
    pub frame: Option<u64>,
    pub fps: f32,
    /// Latest engine state, or the default state before the first publish.
    pub state: GameSnapshot,
    pub events: Vec<Event>,
}

struct HubInner {
    frame: Option<u64>,
    fps: f32,
    state: GameSnapshot,
    events: EventLog,
}

pub struct SnapshotHub {
    inner: Mutex<HubInner>,
}

impl SnapshotHub {
    pub fn new() -> Self {
        Self::with_max_events(HUB_MAX_EVENTS)
    }

    pub fn with_max_events(max_events: usize) -> Self {
        Self {
            inner: Mutex::new(HubInner {
                frame: None,
                fps: 0.0,
                state: GameSnapshot::default(),
                events: EventLog::with_capacity(max_events),
            }),
        }
    }

    // A panic on another thread never leaves the hub half-written, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn publish_state(&self, frame: u64, fps: f32, state: GameSnapshot) {
        let mut inner = self.lock();
        inner.frame = Some(frame);
        inner.fps = fps;
        inner.state = state;
    }

    pub fn push_event(&self, event: Event) {
        self.lock().events.push(event);
    }

    /// Clone of the current state and the retained events. Does not drain.
    pub fn snapshot(&self) -> HubSnapshot {
        let inner = self.lock();
        HubSnapshot {
            frame: inner.frame,
            fps: inner.fps,
            state: inner.state.clone(),
            events: inner.events.iter().cloned().collect(),
        }
    }
}

impl Default for SnapshotHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolmind::EventKind;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn default_snapshot_before_publish() {
        let hub = SnapshotHub::new();
        let snap = hub.snapshot();
        assert_eq!(snap.frame, None);
        assert_eq!(snap.state, GameSnapshot::default());
        assert!(snap.events.is_empty());
    }

    #[test]
    fn publish_and_read() {
        let hub = SnapshotHub::new();
        let state = GameSnapshot {
            potted: 2,
            ..Default::default()
        };
        hub.publish_state(7, 29.5, state);
        hub.push_event(Event::new(EventKind::Pot, "solid ball ID 3"));

        let snap = hub.snapshot();
        assert_eq!(snap.frame, Some(7));
        assert_eq!(snap.fps, 29.5);
        assert_eq!(snap.state.potted, 2);
        assert_eq!(snap.events.len(), 1);
        // Reading does not drain.
        assert_eq!(hub.snapshot().events.len(), 1);
    }

    #[test]
    fn event_ring_is_bounded() {
        let hub = SnapshotHub::with_max_events(3);
        for i in 0..5 {
            hub.push_event(Event::new(EventKind::Miss, format!("miss {}", i)));
        }
        let infos: Vec<String> = hub.snapshot().events.into_iter().map(|e| e.info).collect();
        assert_eq!(infos, vec!["miss 2", "miss 3", "miss 4"]);
    }

    #[test]
    fn zero_capacity_keeps_no_events() {
        let hub = SnapshotHub::with_max_events(0);
        hub.push_event(Event::new(EventKind::Pot, "cue ball ID 1"));
        assert!(hub.snapshot().events.is_empty());
    }

    #[test]
    fn readers_on_other_threads() {
        let hub = Arc::new(SnapshotHub::new());
        let writer = {
            let hub = Arc::clone(&hub);
            thread::spawn(move || {
                for frame in 0..100 {
                    hub.publish_state(frame, 30.0, GameSnapshot::default());
                }
            })
        };
        let reader = {
            let hub = Arc::clone(&hub);
            thread::spawn(move || {
                for _ in 0..100 {
                    let _ = hub.snapshot();
                }
            })
        };
        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(hub.snapshot().frame, Some(99));
    }
}
