//! Fixed-timestep frame clock.
//!
//! Simulation (animators, camera follow) advances in 60 Hz steps decoupled
//! from the render rate. Long frames are clamped so a stall is absorbed as
//! slowdown instead of a burst of catch-up steps.

use std::time::Instant;
use tracing::warn;

/// Fixed simulation timestep: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Longest frame the clock will simulate in one go.
pub const MAX_FRAME_TIME: f64 = 0.25;

pub struct FrameClock {
    previous_time: Instant,
    accumulator: f64,
    sim_time: f64,
    frame_count: u64,
    step_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            sim_time: 0.0,
            frame_count: 0,
            step_count: 0,
        }
    }

    /// Measure wall-clock time since the last tick and run the fixed steps it
    /// covers. `step(dt, sim_ms)` receives the simulated time after the step.
    /// Returns the interpolation alpha in `[0, 1)`.
    pub fn tick(&mut self, step: impl FnMut(f64, u64)) -> f64 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.advance(frame_time, step)
    }

    /// Deterministic core of [`tick`](Self::tick) for an explicit frame time.
    pub fn advance(&mut self, frame_time: f64, mut step: impl FnMut(f64, u64)) -> f64 {
        let mut frame_time = frame_time.max(0.0);
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.accumulator += frame_time;
        while self.accumulator >= FIXED_DT {
            self.sim_time += FIXED_DT;
            self.accumulator -= FIXED_DT;
            self.step_count += 1;
            step(FIXED_DT, self.sim_time_ms());
        }

        self.frame_count += 1;
        self.alpha()
    }

    pub fn alpha(&self) -> f64 {
        (self.accumulator / FIXED_DT).clamp(0.0, 1.0)
    }

    /// Simulated time in whole milliseconds, the clock animators run on.
    pub fn sim_time_ms(&self) -> u64 {
        (self.sim_time * 1000.0).round() as u64
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }
}
