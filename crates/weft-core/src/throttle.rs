//! Frame throttler: enforces a minimum inter-frame interval and can
//! adapt the target rate to observed render times.
//!
//! The loop asks [`FrameThrottler::should_render`] on every dirty tick;
//! a denied request bumps `pending_count` so the next allowed render
//! knows work piled up. Recorded frame durations feed a 60-slot ring;
//! in adaptive mode the moving average nudges the target rate down when
//! renders run long and back up when there is headroom.

use std::time::{Duration, Instant};

/// Lowest selectable frame rate.
const MIN_FPS: u32 = 1;
/// Highest selectable frame rate.
const MAX_FPS: u32 = 120;
/// Adaptive mode never drops the target below this.
const ADAPTIVE_FLOOR_FPS: u32 = 30;
/// Size of the frame-duration ring.
const RING_SIZE: usize = 60;
/// Minimum spacing between adaptive adjustments.
const ADJUST_INTERVAL: Duration = Duration::from_secs(1);

/// Decides whether the current tick is allowed to trigger a render.
#[derive(Debug)]
pub struct FrameThrottler {
    target_fps: u32,
    min_interval: Duration,
    target_frame_time: Duration,
    last_render: Option<Instant>,
    pending_count: u64,
    ring: [Duration; RING_SIZE],
    ring_len: usize,
    ring_next: usize,
    adaptive: bool,
    last_adjust: Option<Instant>,
}

impl FrameThrottler {
    /// Create a throttler targeting `fps` frames per second, clamped to
    /// `[1, 120]`.
    pub fn new(fps: u32) -> Self {
        let clamped = fps.clamp(MIN_FPS, MAX_FPS);
        Self {
            target_fps: clamped,
            min_interval: interval_for(clamped),
            target_frame_time: interval_for(clamped),
            last_render: None,
            pending_count: 0,
            ring: [Duration::ZERO; RING_SIZE],
            ring_len: 0,
            ring_next: 0,
            adaptive: false,
            last_adjust: None,
        }
    }

    /// Enable or disable adaptive rate control.
    #[must_use]
    pub fn with_adaptive(mut self, adaptive: bool) -> Self {
        self.adaptive = adaptive;
        self
    }

    /// Current target frame rate.
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Minimum interval between allowed renders.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Renders denied since the last allowed render.
    pub fn pending_count(&self) -> u64 {
        self.pending_count
    }

    /// Change the target frame rate (clamped to `[1, 120]`).
    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps.clamp(MIN_FPS, MAX_FPS);
        self.min_interval = interval_for(self.target_fps);
        self.target_frame_time = interval_for(self.target_fps);
    }

    /// Whether a render may proceed now.
    ///
    /// Returns false (and counts the request as pending) when less than
    /// the minimum interval has elapsed since the last allowed render.
    /// The very first call always returns true.
    pub fn should_render(&mut self) -> bool {
        let now = Instant::now();
        match self.last_render {
            Some(at) if now.duration_since(at) < self.min_interval => {
                self.pending_count += 1;
                false
            }
            _ => {
                self.last_render = Some(now);
                self.pending_count = 0;
                true
            }
        }
    }

    /// Guarantee the next [`Self::should_render`] returns true.
    ///
    /// Does not interrupt a render in progress; it only clears the
    /// last-render instant.
    pub fn force_render(&mut self) {
        self.last_render = None;
    }

    /// Record how long a frame took to render.
    ///
    /// In adaptive mode, at most once per second, the moving average is
    /// compared to the target frame time: persistent overruns drop the
    /// target rate by 20% (floor 30), and an average under half the
    /// target raises it by 20% (ceiling 120).
    pub fn record_frame_time(&mut self, duration: Duration) {
        self.ring[self.ring_next] = duration;
        self.ring_next = (self.ring_next + 1) % RING_SIZE;
        self.ring_len = (self.ring_len + 1).min(RING_SIZE);

        if self.adaptive {
            self.maybe_adjust();
        }
    }

    /// Average of the recorded frame durations.
    pub fn average_frame_time(&self) -> Duration {
        if self.ring_len == 0 {
            return Duration::ZERO;
        }
        let total: Duration = self.ring[..self.ring_len].iter().sum();
        total / self.ring_len as u32
    }

    fn maybe_adjust(&mut self) {
        let now = Instant::now();
        if let Some(at) = self.last_adjust
            && now.duration_since(at) < ADJUST_INTERVAL
        {
            return;
        }
        self.last_adjust = Some(now);

        let average = self.average_frame_time();
        if average.is_zero() {
            return;
        }

        if average > self.target_frame_time && self.target_fps > ADAPTIVE_FLOOR_FPS {
            let reduced = (self.target_fps * 4 / 5).max(ADAPTIVE_FLOOR_FPS);
            tracing::debug!(from = self.target_fps, to = reduced, "render falling behind; lowering target fps");
            self.target_fps = reduced;
        } else if average < self.target_frame_time / 2 && self.target_fps < MAX_FPS {
            let raised = (self.target_fps * 6 / 5).min(MAX_FPS);
            tracing::debug!(from = self.target_fps, to = raised, "render has headroom; raising target fps");
            self.target_fps = raised;
        } else {
            return;
        }
        self.min_interval = interval_for(self.target_fps);
        self.target_frame_time = interval_for(self.target_fps);
    }
}

impl Default for FrameThrottler {
    fn default() -> Self {
        Self::new(60)
    }
}

fn interval_for(fps: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(fps.max(1)))
}
