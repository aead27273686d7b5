/// Accumulates variable frame time and releases fixed-size ticks.
///
/// At most one tick is released per `advance` call. Time beyond one step stays
/// in the accumulator and is consumed by later frames.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedStepClock {
    step: f64,
    accumulator: f64,
    ticks: u64,
}

impl FixedStepClock {
    pub fn new(step: f64) -> Self {
        debug_assert!(step > 0.0, "fixed step must be positive, got {step}");
        Self {
            step,
            accumulator: 0.0,
            ticks: 0,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Unconsumed time, never negative.
    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Ticks released so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Add one frame's elapsed time. Returns `true` if a tick is due.
    pub fn advance(&mut self, frame_dt: f64) -> bool {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }
        if self.accumulator >= self.step {
            self.accumulator = (self.accumulator - self.step).max(0.0);
            self.ticks += 1;
            true
        } else {
            false
        }
    }
}
