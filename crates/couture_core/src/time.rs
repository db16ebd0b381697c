#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Longest step a single frame may take, in seconds. A host that was
/// suspended (hidden tab, debugger) resumes with this instead of one huge
/// jump in guide time and camera damping.
pub const DEFAULT_MAX_DT: f32 = 0.1;

/// Per-frame timing handed to frame callbacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameState {
    /// Total elapsed time in seconds.
    pub time: f32,
    /// Delta time since the last frame in seconds.
    pub dt: f32,
    /// Frames committed since mount.
    pub frame_count: u64,
}

/// Wall-clock frame timer of a viewer host.
pub struct Timer {
    last_tick: Option<Instant>,
    max_dt: f32,
    time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_dt(DEFAULT_MAX_DT)
    }

    #[must_use]
    pub fn with_max_dt(max_dt: f32) -> Self {
        Self {
            last_tick: None,
            max_dt: max_dt.max(0.0),
            time: 0.0,
            frame_count: 0,
        }
    }

    /// Steps by the wall time since the previous tick. The first tick has a
    /// zero delta.
    pub fn tick(&mut self) -> FrameState {
        let now = Instant::now();
        let dt = self
            .last_tick
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_tick = Some(now);
        self.advance(dt)
    }

    /// Steps by an explicit delta, clamped to `[0, max_dt]`.
    pub fn advance(&mut self, dt: f32) -> FrameState {
        let dt = dt.clamp(0.0, self.max_dt);
        self.time += dt;
        self.frame_count += 1;
        FrameState {
            time: self.time,
            dt,
            frame_count: self.frame_count,
        }
    }

    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_no_delta() {
        let mut timer = Timer::new();
        let state = timer.tick();
        assert!(state.dt.abs() < f32::EPSILON);
        assert_eq!(state.frame_count, 1);
    }

    #[test]
    fn long_stalls_are_clamped() {
        let mut timer = Timer::with_max_dt(0.05);
        timer.advance(0.02);
        let state = timer.advance(3.0);
        assert!((state.dt - 0.05).abs() < 1e-6);
        assert!((state.time - 0.07).abs() < 1e-6);
        assert_eq!(timer.frame_count(), 2);

        assert!(timer.advance(-1.0).dt.abs() < f32::EPSILON);
    }
}
