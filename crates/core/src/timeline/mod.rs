use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Tick counter for the frame-driven simulation.
///
/// Physics constants downstream are tuned per tick, so the clock tracks
/// tick count as its primary observable; elapsed seconds are derived from
/// whatever delta the driver supplies.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    pub ticks: u64,
    pub time_seconds: f32,
}

impl FrameClock {
    pub fn reset(&mut self) {
        self.ticks = 0;
        self.time_seconds = 0.0;
    }

    pub fn advance(&mut self, delta: f32) {
        self.ticks += 1;
        self.time_seconds = (self.time_seconds + delta).max(0.0);
    }
}

/// Cancellation handle for a running [`RenderLoop`].
///
/// Cloneable and thread-safe; once [`StopHandle::stop`] is invoked no
/// further ticks execute. The in-flight tick always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Cooperative per-frame driver: the platform analogue of an
/// animation-frame callback that re-arms itself every tick.
#[derive(Debug)]
pub struct RenderLoop {
    interval: Duration,
    clock: FrameClock,
    handle: StopHandle,
}

impl RenderLoop {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            clock: FrameClock::default(),
            handle: StopHandle::new(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.handle.clone()
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Runs at most `frames` ticks back to back, stopping early if the
    /// handle fires. Deterministic driver used by tests and the demo.
    pub fn run_frames<F>(&mut self, frames: u64, mut tick: F)
    where
        F: FnMut(&FrameClock),
    {
        for _ in 0..frames {
            if self.handle.is_stopped() {
                break;
            }
            self.clock.advance(self.interval.as_secs_f32());
            tick(&self.clock);
        }
    }

    /// Drives `tick` once per interval until the stop handle fires.
    pub fn run_until_stopped<F>(&mut self, mut tick: F)
    where
        F: FnMut(&FrameClock),
    {
        while !self.handle.is_stopped() {
            self.clock.advance(self.interval.as_secs_f32());
            tick(&self.clock);
            if self.handle.is_stopped() {
                break;
            }
            std::thread::sleep(self.interval);
        }
    }
}
