use std::time::{Duration, Instant};

use super::{Clock, SystemClock};

/// Tracks the wall-clock duration of the previous frame.
///
/// `update()` is called exactly once per loop iteration, after the frame's
/// logic has run. `frame_elapsed()` then reports the time between the two most
/// recent `update()` calls and is what the next frame's simulation consumes.
///
/// Elapsed time is zero until the first `update()` and is never negative. It is
/// not clamped unless a maximum step is configured with [`with_max_step`].
///
/// [`with_max_step`]: FrameTimer::with_max_step
#[derive(Debug)]
pub struct FrameTimer {
    clock: Box<dyn Clock>,
    last: Instant,
    elapsed: Duration,
    frame_index: u64,
    max_step: Option<Duration>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        let last = clock.now();
        Self {
            clock,
            last,
            elapsed: Duration::ZERO,
            frame_index: 0,
            max_step: None,
        }
    }

    /// Caps a single frame's elapsed time, e.g. to survive debugger pauses.
    pub fn with_max_step(mut self, max_step: Duration) -> Self {
        self.max_step = Some(max_step);
        self
    }

    /// Resets the baseline so the next frame does not see the time spent paused.
    pub fn reset(&mut self) {
        self.last = self.clock.now();
        self.elapsed = Duration::ZERO;
    }

    /// Advances the timer by one frame.
    pub fn update(&mut self) {
        let now = self.clock.now();
        let mut dt = now.saturating_duration_since(self.last);
        if let Some(max) = self.max_step {
            dt = dt.min(max);
        }

        self.last = now;
        self.elapsed = dt;
        self.frame_index = self.frame_index.wrapping_add(1);
    }

    #[inline]
    pub fn frame_elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time of the previous frame in seconds.
    #[inline]
    pub fn frame_elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Number of completed `update()` calls.
    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
