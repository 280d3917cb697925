//! Fixed-timestep clock.
//!
//! Wall-clock frame time feeds an accumulator; the simulation consumes it in
//! fixed slices of `fixed_dt_us`, which callers hand to the simulation as its
//! step duration in integer microseconds.

use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// One simulation tick: 1/60 s.
pub const FIXED_DT_US: u64 = 16_667;

pub struct TimeState {
    pub fixed_dt_us: u64,
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self {
            fixed_dt_us: FIXED_DT_US,
            fixed_dt: FIXED_DT_US as f64 / 1_000_000.0,
            max_accumulator: 0.25,
            accumulator: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.feed(real_dt);
    }

    /// Feed one frame's worth of wall-clock seconds into the accumulator.
    pub fn feed(&mut self, real_dt: f64) {
        self.real_dt = real_dt;

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        // FPS smoothing
        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_tick_of_wall_time_yields_one_step() {
        let mut time = TimeState::new();
        time.feed(FIXED_DT_US as f64 / 1_000_000.0 + 1e-6);
        assert!(time.should_step());
        assert!(!time.should_step());
        assert_eq!(time.steps_this_frame, 1);
        assert_eq!(time.fixed_step_count, 1);
    }

    #[test]
    fn short_frame_yields_no_step() {
        let mut time = TimeState::new();
        time.feed(0.005);
        assert!(!time.should_step());
        assert_eq!(time.steps_this_frame, 0);
        assert_eq!(time.fixed_step_count, 0);
    }

    #[test]
    fn long_frame_is_capped() {
        let mut time = TimeState::new();
        time.feed(2.0);
        assert!((time.real_dt - time.max_accumulator).abs() < f64::EPSILON);

        let mut steps = 0;
        while time.should_step() {
            steps += 1;
        }
        // 0.25 s of simulation at 60 Hz.
        assert_eq!(steps, 14);
    }

    #[test]
    fn thirty_hz_frames_step_twice_on_average() {
        let mut time = TimeState::new();
        let mut per_frame = Vec::new();
        for _ in 0..30 {
            time.feed(1.0 / 30.0);
            while time.should_step() {}
            per_frame.push(time.steps_this_frame);
        }
        assert!(per_frame.iter().all(|&n| n == 1 || n == 2 || n == 3));
        // 1 s of wall time at 16.667 ms per step, less the undrained remainder.
        assert!((59..=60).contains(&time.fixed_step_count));
        assert_eq!(time.frame_count, 30);
    }
}
