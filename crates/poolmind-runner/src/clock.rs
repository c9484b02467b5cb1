/// Weight of the newest sample in the moving average.
const SMOOTHING: f32 = 0.1;

/// Smoothed frames-per-second meter.
/// `fps = 0.9 * fps + 0.1 * (1 / dt)` on every frame with a positive delta.
pub struct FpsMeter {
    fps: f32,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self { fps: 0.0 }
    }

    /// Feed one frame delta in seconds. Returns the smoothed rate.
    pub fn tick(&mut self, dt: f32) -> f32 {
        if dt > 0.0 && dt.is_finite() {
            self.fps = (1.0 - SMOOTHING) * self.fps + SMOOTHING / dt;
        }
        self.fps
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_is_a_tenth() {
        let mut m = FpsMeter::new();
        let fps = m.tick(1.0 / 30.0);
        assert!((fps - 3.0).abs() < 1e-3, "fps was {}", fps);
    }

    #[test]
    fn converges_to_frame_rate() {
        let mut m = FpsMeter::new();
        for _ in 0..200 {
            m.tick(1.0 / 30.0);
        }
        assert!((m.fps() - 30.0).abs() < 0.1, "fps was {}", m.fps());
    }

    #[test]
    fn zero_delta_keeps_rate() {
        let mut m = FpsMeter::new();
        m.tick(0.05);
        let before = m.fps();
        assert_eq!(m.tick(0.0), before);
        assert_eq!(m.tick(-1.0), before);
        assert_eq!(m.tick(f32::NAN), before);
    }
}
