use poolmind::{
    CentroidTracker, Detection, Event, GameEngine, GameSnapshot, PoolConfig, TableGeometry, Tracks,
};
use serde::Serialize;
use std::sync::Arc;

use crate::clock::FpsMeter;
use crate::control::{ControlEvent, ControlQueue};
use crate::hub::SnapshotHub;

/// What one frame produced.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub fps: f32,
    /// Identities the tracker reported this frame. Empty when the table was not located.
    pub tracks: Tracks,
    pub state: GameSnapshot,
    pub events: Vec<Event>,
}

/// Owns the tracker and game engine and drives them one frame at a time.
///
/// All state mutation happens on the thread calling [`PoolRunner::tick`].
/// Readers on other threads go through the shared [`SnapshotHub`].
pub struct PoolRunner {
    table: TableGeometry,
    tracker: CentroidTracker,
    engine: GameEngine,
    controls: ControlQueue,
    fps: FpsMeter,
    hub: Arc<SnapshotHub>,
    frame: u64,
}

impl PoolRunner {
    pub fn new(config: &PoolConfig, hub: Arc<SnapshotHub>) -> Self {
        let table = TableGeometry::new(&config.table);
        log::info!(
            "runner: table {}x{} margin {}, pocket radius {}",
            table.width(),
            table.height(),
            table.margin(),
            config.game.pocket_radius,
        );
        let engine = GameEngine::new(&table, config.game.clone());
        Self {
            table,
            tracker: CentroidTracker::new(config.tracking.clone()),
            engine,
            controls: ControlQueue::new(),
            fps: FpsMeter::new(),
            hub,
            frame: 0,
        }
    }

    /// Queue a control event. It takes effect at the start of the next tick.
    pub fn push_control(&mut self, event: ControlEvent) {
        self.controls.push(event);
    }

    /// Run one frame.
    ///
    /// `detections` is `None` when the table could not be located. The tracker
    /// is left untouched in that case and the engine sees an empty frame.
    pub fn tick(&mut self, detections: Option<&[Detection]>, dt: f32) -> FrameReport {
        for control in self.controls.drain() {
            match control {
                ControlEvent::ResetGame => self.engine.reset_game(),
            }
        }

        let fps = self.fps.tick(dt);

        let tracks = match detections {
            Some(detections) => {
                let outside = detections.iter().filter(|d| !self.table.contains(d.pos)).count();
                if outside > 0 {
                    log::debug!("frame {}: {} detections outside the table", self.frame, outside);
                }
                self.tracker.update(detections)
            }
            None => Tracks::new(),
        };

        self.engine.update(&tracks);
        let state = self.engine.state();
        let events = self.engine.consume_events();

        self.hub.publish_state(self.frame, fps, state.clone());
        for event in &events {
            log::info!("event: {:?} {}", event.kind, event.info);
            self.hub.push_event(event.clone());
        }

        let report = FrameReport {
            frame: self.frame,
            fps,
            tracks,
            state,
            events,
        };
        self.frame += 1;
        report
    }

    pub fn table(&self) -> &TableGeometry {
        &self.table
    }

    pub fn tracker(&self) -> &CentroidTracker {
        &self.tracker
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn hub(&self) -> &Arc<SnapshotHub> {
        &self.hub
    }

    /// Frames processed so far.
    pub fn frames(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poolmind::{ColorClass, EventKind};

    const DT: f32 = 1.0 / 30.0;

    fn runner() -> PoolRunner {
        PoolRunner::new(&PoolConfig::default(), Arc::new(SnapshotHub::new()))
    }

    /// Feed `frames` empty frames and collect every event they produce.
    fn run_empty(runner: &mut PoolRunner, frames: usize) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..frames {
            events.extend(runner.tick(Some(&[]), DT).events);
        }
        events
    }

    #[test]
    fn frame_indices_count_up() {
        let mut r = runner();
        assert_eq!(r.tick(Some(&[]), DT).frame, 0);
        assert_eq!(r.tick(None, DT).frame, 1);
        assert_eq!(r.frames(), 2);
        assert_eq!(r.hub().snapshot().frame, Some(1));
    }

    #[test]
    fn ball_vanishing_at_pocket_is_potted() {
        let mut r = runner();
        // Top-left pocket sits at (30, 30) with the default calibration.
        let ball = Detection::new(40.0, 40.0, 10.0).with_color(ColorClass::Solid);
        let report = r.tick(Some(&[ball]), DT);
        assert_eq!(report.tracks.len(), 1);

        // The tracker holds the ball for max_disappeared frames before the
        // engine starts counting, then the engine needs disappear_for_pot more.
        let events = run_empty(&mut r, 20);
        let pots: Vec<&Event> = events.iter().filter(|e| e.kind == EventKind::Pot).collect();
        assert_eq!(pots.len(), 1);
        assert!(pots[0].info.contains("solid"));

        let snap = r.hub().snapshot();
        assert_eq!(snap.state.potted, 1);
        assert_eq!(snap.state.solid_potted, 1);
        assert!(snap.events.iter().any(|e| e.kind == EventKind::Pot));
    }

    #[test]
    fn ball_vanishing_mid_table_is_not_potted() {
        let mut r = runner();
        r.tick(Some(&[Detection::new(1000.0, 500.0, 10.0)]), DT);
        let events = run_empty(&mut r, 30);
        assert!(events.iter().all(|e| e.kind != EventKind::Pot));
        assert_eq!(r.engine().state().potted, 0);
    }

    #[test]
    fn table_not_found_keeps_tracker_state() {
        let mut r = runner();
        r.tick(Some(&[Detection::new(500.0, 500.0, 10.0)]), DT);
        let report = r.tick(None, DT);
        assert!(report.tracks.is_empty());
        assert_eq!(r.tracker().len(), 1);
        assert_eq!(r.tracker().objects().next().map(|o| o.disappeared), Some(0));
    }

    #[test]
    fn table_comes_from_config() {
        let r = runner();
        assert_eq!(r.table().width(), 2000);
        assert!(r.table().contains(Detection::new(40.0, 40.0, 10.0).pos));
        assert!(!r.table().contains(Detection::new(2100.0, 40.0, 10.0).pos));
    }

    #[test]
    fn reset_control_applies_on_next_tick() {
        let mut r = runner();
        r.tick(Some(&[Detection::new(40.0, 40.0, 10.0)]), DT);
        run_empty(&mut r, 20);
        assert_eq!(r.engine().state().potted, 1);

        r.push_control(ControlEvent::ResetGame);
        assert_eq!(r.engine().state().potted, 1);
        let report = r.tick(Some(&[]), DT);
        assert_eq!(report.state.potted, 0);
        assert!(report.events.iter().any(|e| e.kind == EventKind::GameReset));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut r = runner();
        let report = r.tick(Some(&[Detection::new(100.0, 100.0, 10.0)]), DT);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["frame"], 0);
        assert!(json["tracks"]["1"].is_object());
        assert_eq!(json["state"]["total_tracked"], 1);
    }
}
