//! Centroid tracker: gives unlabeled per-frame ball detections stable identities.
//!
//! Association is greedy: every (object, detection) pair is sorted by distance and
//! claimed smallest-first, as long as neither side is taken and the distance is
//! within `max_distance`. This is not a globally optimal matching. With at most
//! sixteen balls and small inter-frame motion, closest-first is what we want, and
//! tie-breaking stays predictable.

use glam::Vec2;
use std::collections::BTreeMap;

use crate::api::config::TrackerConfig;
use crate::api::types::{BallId, BallState, ColorClass, Detection};

/// Live identity -> state mapping returned by [`CentroidTracker::update`].
pub type Tracks = BTreeMap<BallId, BallState>;

/// A ball the tracker currently knows about.
#[derive(Debug, Clone)]
pub struct TrackedObject {
    pub id: BallId,
    pub pos: Vec2,
    pub radius: f32,
    pub color: ColorClass,
    /// Consecutive frames without a matching detection.
    pub disappeared: u32,
}

impl TrackedObject {
    fn new(id: BallId, detection: &Detection) -> Self {
        Self {
            id,
            pos: detection.pos,
            radius: detection.radius,
            color: detection.color,
            disappeared: 0,
        }
    }

    fn refresh(&mut self, detection: &Detection) {
        self.pos = detection.pos;
        self.radius = detection.radius;
        self.color = detection.color;
        self.disappeared = 0;
    }

    pub fn state(&self) -> BallState {
        BallState {
            pos: self.pos,
            radius: self.radius,
            color: self.color,
        }
    }
}

/// Nearest-centroid identity tracker with disappearance tolerance.
#[derive(Debug, Clone)]
pub struct CentroidTracker {
    objects: BTreeMap<BallId, TrackedObject>,
    next_id: u32,
    config: TrackerConfig,
}

impl CentroidTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: 1,
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Associate this frame's detections with known objects.
    ///
    /// Returns every live object, including ones unmatched this frame that have not
    /// yet exceeded `max_disappeared`.
    pub fn update(&mut self, detections: &[Detection]) -> Tracks {
        for d in detections {
            debug_assert!(d.pos.is_finite(), "detection position must be finite: {:?}", d);
            debug_assert!(d.radius >= 0.0, "detection radius must be non-negative: {:?}", d);
        }

        if self.objects.is_empty() {
            for d in detections {
                self.register(d);
            }
            return self.tracks();
        }

        let ids: Vec<BallId> = self.objects.keys().copied().collect();
        let centroids: Vec<Vec2> = self.objects.values().map(|o| o.pos).collect();
        let inputs: Vec<Vec2> = detections.iter().map(|d| d.pos).collect();
        let dist = distance_matrix(&centroids, &inputs);

        // Row-major order then a stable sort: equal distances go to the lower id first.
        let mut pairs: Vec<(f32, usize, usize)> = Vec::with_capacity(ids.len() * inputs.len());
        for (row, distances) in dist.iter().enumerate() {
            for (col, &d) in distances.iter().enumerate() {
                pairs.push((d, row, col));
            }
        }
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut used_rows = vec![false; ids.len()];
        let mut used_cols = vec![false; inputs.len()];
        for (d, row, col) in pairs {
            // Sorted ascending, so nothing after this can match either.
            if !(d <= self.config.max_distance) {
                break;
            }
            if used_rows[row] || used_cols[col] {
                continue;
            }
            if let Some(object) = self.objects.get_mut(&ids[row]) {
                object.refresh(&detections[col]);
            }
            used_rows[row] = true;
            used_cols[col] = true;
        }

        for (row, id) in ids.iter().enumerate() {
            if !used_rows[row] {
                self.mark_missing(*id);
            }
        }

        for (col, d) in detections.iter().enumerate() {
            if !used_cols[col] {
                self.register(d);
            }
        }

        self.tracks()
    }

    /// Snapshot of every live object, keyed by identity.
    pub fn tracks(&self) -> Tracks {
        self.objects.iter().map(|(id, o)| (*id, o.state())).collect()
    }

    pub fn get(&self, id: BallId) -> Option<&TrackedObject> {
        self.objects.get(&id)
    }

    /// Frames since `id` was last matched, or `None` if it is not live.
    pub fn disappeared(&self, id: BallId) -> Option<u32> {
        self.objects.get(&id).map(|o| o.disappeared)
    }

    pub fn objects(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.values()
    }

    /// Identity the next new object will receive.
    pub fn next_id(&self) -> BallId {
        BallId(self.next_id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn register(&mut self, detection: &Detection) {
        let id = BallId(self.next_id);
        self.next_id += 1;
        log::debug!(
            "tracker: new object {} ({}) at ({:.1}, {:.1})",
            id, detection.color, detection.pos.x, detection.pos.y
        );
        self.objects.insert(id, TrackedObject::new(id, detection));
    }

    fn mark_missing(&mut self, id: BallId) {
        let Some(object) = self.objects.get_mut(&id) else {
            return;
        };
        object.disappeared += 1;
        if object.disappeared > self.config.max_disappeared {
            log::debug!(
                "tracker: evicting object {} after {} missed frames",
                id,
                object.disappeared
            );
            self.objects.remove(&id);
        }
    }
}

impl Default for CentroidTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

/// Pairwise Euclidean distances: `result[i][j]` is from `a[i]` to `b[j]`.
pub fn distance_matrix(a: &[Vec2], b: &[Vec2]) -> Vec<Vec<f32>> {
    a.iter()
        .map(|p| b.iter().map(|q| p.distance(*q)).collect())
        .collect()
}
