//! Time management utilities

use std::time::Instant;

/// Point-in-time view of the frame clock handed to systems
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds covered by the current frame (already clamped)
    pub delta: f32,
    /// Seconds of simulated time since the clock was created or reset
    pub elapsed: f32,
    /// Number of frames advanced so far
    pub frame: u64,
}

/// Frame timer used by the frame driver for time accounting.
///
/// Deltas longer than `max_delta` are clamped so a stalled frame (debugger
/// break, window drag) does not teleport every moving entity.
pub struct FrameTimer {
    last_frame: Instant,
    max_delta: f32,
    current: FrameTime,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl FrameTimer {
    /// Create a new timer with the given delta ceiling in seconds
    pub fn new(max_delta: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            max_delta: max_delta.max(0.0),
            current: FrameTime::default(),
        }
    }

    /// Wall-clock seconds since the previous measurement, without advancing
    pub fn measure(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        elapsed
    }

    /// Measure wall-clock time since the previous tick and advance by it
    pub fn tick(&mut self) -> FrameTime {
        let elapsed = self.measure();
        self.advance(elapsed)
    }

    /// Advance by an explicit delta (fixed-step drivers and tests)
    pub fn advance(&mut self, delta: f32) -> FrameTime {
        let delta = if delta.is_finite() { delta.clamp(0.0, self.max_delta) } else { 0.0 };
        self.current.delta = delta;
        self.current.elapsed += delta;
        self.current.frame += 1;
        self.current
    }

    /// The most recent frame time
    pub fn current(&self) -> FrameTime {
        self.current
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.current.delta
    }

    /// Get the total simulated time
    pub fn total_time(&self) -> f32 {
        self.current.elapsed
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.current.frame
    }

    /// Get the average FPS over simulated time
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.current.elapsed > 0.0 {
            self.current.frame as f32 / self.current.elapsed
        } else {
            0.0
        }
    }

    /// Reset counters (used on game restart)
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.current = FrameTime::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_advance_accumulates() {
        let mut timer = FrameTimer::new(0.25);
        timer.advance(0.1);
        let time = timer.advance(0.1);
        assert_eq!(time.frame, 2);
        assert_relative_eq!(time.elapsed, 0.2);
        assert_relative_eq!(timer.average_fps(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut timer = FrameTimer::new(0.25);
        let time = timer.advance(3.0);
        assert_relative_eq!(time.delta, 0.25);

        let time = timer.advance(-1.0);
        assert_relative_eq!(time.delta, 0.0);

        let time = timer.advance(f32::NAN);
        assert_relative_eq!(time.delta, 0.0);
    }

    #[test]
    fn test_reset() {
        let mut timer = FrameTimer::default();
        timer.advance(0.1);
        timer.reset();
        assert_eq!(timer.frame_count(), 0);
        assert_relative_eq!(timer.total_time(), 0.0);
    }
}
