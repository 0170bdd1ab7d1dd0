//! Frame timing for the engine loop

use std::time::Instant;

/// Frame timer driving the system update delta
///
/// Runs either from the wall clock ([`Timer::tick`]) or from caller supplied
/// steps ([`Timer::advance`]) so headless runs stay deterministic.
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    max_delta: f32,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Longest frame delta handed to systems, in seconds
    pub const DEFAULT_MAX_DELTA: f32 = 0.25;

    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            max_delta: Self::DEFAULT_MAX_DELTA,
        }
    }

    /// Builder pattern: clamp frame deltas to at most `max_delta` seconds
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta.max(0.0);
        self
    }

    /// Sample the wall clock and return the clamped delta since the last tick
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.advance(elapsed)
    }

    /// Step the timer by an explicit delta and return the clamped value
    pub fn advance(&mut self, delta_time: f32) -> f32 {
        self.delta_time = delta_time.clamp(0.0, self.max_delta);
        self.total_time += self.delta_time;
        self.frame_count += 1;
        self.delta_time
    }

    /// Delta of the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Accumulated simulated time in seconds
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Frames stepped so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frames per simulated second
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
