//! Fixed timestep accumulator
//!
//! Frame time is accumulated and drained in whole simulation steps so script
//! updates and physics always see the same `dt`.

/// Default simulation rate (60 Hz).
pub const DEFAULT_STEP: f32 = 1.0 / 60.0;

/// Upper bound on steps drained per frame, so a long stall can't spiral.
pub const MAX_STEPS_PER_FRAME: u32 = 8;

pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
    tick_count: u64,
}

impl FixedTimestep {
    pub fn new(step: f32) -> Self {
        let step = if step > 0.0 { step } else { DEFAULT_STEP };
        Self {
            step,
            accumulator: 0.0,
            tick_count: 0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Add `frame_time` seconds and return how many whole steps to simulate.
    pub fn advance(&mut self, frame_time: f32) -> u32 {
        self.accumulator += frame_time.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.step && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == MAX_STEPS_PER_FRAME {
            self.accumulator = self.accumulator.min(self.step);
        }
        self.tick_count += steps as u64;
        steps
    }

    /// Fraction of a step left in the accumulator, for interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(DEFAULT_STEP)
    }
}
