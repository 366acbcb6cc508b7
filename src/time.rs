//! Time facilities: a frame clock and repeating timers.
//!
//! [`Time`] tracks elapsed time, frame count and FPS for a render loop.
//! [`TimerHost`] is the seam carousels use to schedule their ticks;
//! [`ManualTimers`] implements it with a clock that only moves when told to,
//! which makes tick-driven behaviour deterministic.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use constellation::time::{ManualTimers, TimerHost};
//!
//! let mut timers = ManualTimers::new();
//! let handle = timers.set_interval(Duration::from_millis(3000));
//! assert_eq!(timers.advance(Duration::from_millis(6500)), vec![handle, handle]);
//! ```

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Time tracking for rendering.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Time {
    /// Create a new time tracker starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns `(elapsed_time, delta_time)` for convenience.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();

        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        // Update FPS periodically
        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Total elapsed time in seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since last frame in seconds.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies one registered repeating timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(pub u64);

/// Something that can run repeating timers.
pub trait TimerHost {
    /// Register a timer that fires every `period` until cleared.
    fn set_interval(&mut self, period: Duration) -> TimerHandle;
    /// Stop a timer. Unknown or already-cleared handles are ignored.
    fn clear_interval(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    period: Duration,
    next_due: Duration,
}

/// Deterministic [`TimerHost`] driven by [`advance`](ManualTimers::advance).
#[derive(Debug, Default)]
pub struct ManualTimers {
    now: Duration,
    next_id: u64,
    intervals: BTreeMap<TimerHandle, Interval>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on this clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers currently registered.
    pub fn active(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.intervals.contains_key(&handle)
    }

    /// Move the clock forward by `dt` and return every firing in time order.
    ///
    /// A timer whose period fits several times into `dt` fires several times.
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerHandle> {
        let target = self.now + dt;
        let mut fired = Vec::new();

        loop {
            let due = self
                .intervals
                .iter()
                .filter(|(_, iv)| iv.next_due <= target)
                .min_by_key(|(handle, iv)| (iv.next_due, **handle))
                .map(|(handle, iv)| (*handle, iv.next_due));

            let Some((handle, at)) = due else { break };
            self.now = at;
            if let Some(iv) = self.intervals.get_mut(&handle) {
                iv.next_due += iv.period;
            }
            fired.push(handle);
        }

        self.now = target;
        fired
    }
}

impl TimerHost for ManualTimers {
    fn set_interval(&mut self, period: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        // A zero period would fire forever within one advance.
        let period = period.max(Duration::from_millis(1));
        self.intervals.insert(
            handle,
            Interval {
                period,
                next_due: self.now + period,
            },
        );
        handle
    }

    fn clear_interval(&mut self, handle: TimerHandle) {
        self.intervals.remove(&handle);
    }
}
