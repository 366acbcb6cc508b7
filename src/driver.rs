//! Explicit frame loop with cooperative cancellation.
//!
//! Animations run "forever" from the page's point of view; here that is a
//! loop that checks a [`StopToken`] before every frame. Tests and headless
//! runs use [`FrameLoop::run_frames`] to execute a bounded number of frames.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Shared stop signal. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every loop holding this token to finish after its current frame.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Drives a per-frame callback.
#[derive(Debug, Default)]
pub struct FrameLoop {
    /// Minimum wall time per frame; `None` runs as fast as possible.
    frame_interval: Option<Duration>,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pace frames to at most one per `interval`.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }

    pub fn frame_interval(&self) -> Option<Duration> {
        self.frame_interval
    }

    /// Frames executed across all runs.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run until `stop` is signalled. Returns the number of frames executed.
    pub fn run<F>(&mut self, stop: &StopToken, frame: F) -> u64
    where
        F: FnMut(u64),
    {
        self.run_inner(None, stop, frame)
    }

    /// Run at most `limit` frames, or fewer if `stop` is signalled.
    pub fn run_frames<F>(&mut self, limit: u64, stop: &StopToken, frame: F) -> u64
    where
        F: FnMut(u64),
    {
        self.run_inner(Some(limit), stop, frame)
    }

    fn run_inner<F>(&mut self, limit: Option<u64>, stop: &StopToken, mut frame: F) -> u64
    where
        F: FnMut(u64),
    {
        let mut executed = 0;
        while !stop.is_stopped() && limit.map_or(true, |l| executed < l) {
            let started = Instant::now();
            frame(self.frames);
            self.frames += 1;
            executed += 1;

            if let Some(interval) = self.frame_interval {
                if let Some(rest) = interval.checked_sub(started.elapsed()) {
                    thread::sleep(rest);
                }
            }
        }
        log::debug!("frame loop finished after {} frames", executed);
        executed
    }
}
