use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::config::TableConfig;

/// A point counts as "at" a pocket within this multiple of the capture radius.
pub const POCKET_TOLERANCE: f32 = 1.2;

/// A pocket in canonical table space. Immutable for the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pocket {
    pub pos: Vec2,
    pub radius: f32,
}

impl Pocket {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            radius,
        }
    }

    /// Whether `point` lies within the tolerated capture radius (inclusive).
    pub fn captures(&self, point: Vec2) -> bool {
        self.pos.distance(point) <= self.radius * POCKET_TOLERANCE
    }
}

/// Canonical table rectangle that the camera view is warped into.
#[derive(Debug, Clone)]
pub struct TableGeometry {
    width: u32,
    height: u32,
    margin: u32,
}

impl TableGeometry {
    pub fn new(config: &TableConfig) -> Self {
        Self {
            width: config.table_w,
            height: config.table_h,
            margin: config.margin,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    /// Whether `point` is inside the canonical table rectangle.
    pub fn contains(&self, point: Vec2) -> bool {
        let (w, h) = (self.width as f32, self.height as f32);
        point.x >= 0.0 && point.y >= 0.0 && point.x <= w && point.y <= h
    }

    /// Six pockets: four corners and the middle of each long rail, inset by the margin.
    /// Order: top-left, top-middle, top-right, bottom-right, bottom-middle, bottom-left.
    pub fn default_pockets(&self, radius: f32) -> Vec<Pocket> {
        let w = self.width as f32;
        let h = self.height as f32;
        let m = self.margin as f32;
        let mid = (self.width / 2) as f32;
        vec![
            Pocket::new(m, m, radius),
            Pocket::new(mid, m, radius),
            Pocket::new(w - m, m, radius),
            Pocket::new(w - m, h - m, radius),
            Pocket::new(mid, h - m, radius),
            Pocket::new(m, h - m, radius),
        ]
    }
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self::new(&TableConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(w: u32, h: u32, margin: u32) -> TableGeometry {
        TableGeometry::new(&TableConfig { table_w: w, table_h: h, margin })
    }

    #[test]
    fn default_dimensions() {
        let t = TableGeometry::default();
        assert_eq!(t.width(), 2000);
        assert_eq!(t.height(), 1000);
        assert_eq!(t.margin(), 30);
    }

    #[test]
    fn six_pockets_at_corners_and_rail_middles() {
        let t = table(800, 400, 30);
        let pockets = t.default_pockets(30.0);
        assert_eq!(pockets.len(), 6);

        let positions: Vec<Vec2> = pockets.iter().map(|p| p.pos).collect();
        for expected in [
            Vec2::new(30.0, 30.0),
            Vec2::new(400.0, 30.0),
            Vec2::new(770.0, 30.0),
            Vec2::new(770.0, 370.0),
            Vec2::new(400.0, 370.0),
            Vec2::new(30.0, 370.0),
        ] {
            assert!(positions.contains(&expected), "missing pocket at {:?}", expected);
        }
        assert!(pockets.iter().all(|p| p.radius == 30.0));
    }

    #[test]
    fn odd_width_middle_uses_integer_half() {
        let t = table(1001, 500, 25);
        let pockets = t.default_pockets(20.0);
        assert_eq!(pockets[1].pos, Vec2::new(500.0, 25.0));
    }

    #[test]
    fn capture_uses_tolerance() {
        let p = Pocket::new(50.0, 50.0, 20.0);
        assert!(p.captures(Vec2::new(55.0, 55.0)));
        // Exactly 1.2 * radius away is still captured.
        assert!(p.captures(Vec2::new(74.0, 50.0)));
        assert!(!p.captures(Vec2::new(75.0, 50.0)));
    }

    #[test]
    fn contains_point() {
        let t = table(800, 400, 30);
        assert!(t.contains(Vec2::new(400.0, 200.0)));
        assert!(!t.contains(Vec2::new(-1.0, 200.0)));
        assert!(!t.contains(Vec2::new(400.0, 401.0)));
    }
}
