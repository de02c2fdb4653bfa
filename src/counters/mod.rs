//! Counters for benchmarking various parts of the coupling step.

use std::fmt::{Display, Formatter, Result};

pub use self::coupling_counters::CouplingCounters;
pub use self::stages_counters::StagesCounters;
pub use self::timer::Timer;

mod coupling_counters;
mod stages_counters;
mod timer;

/// Aggregation of all the performances counters tracked by the coupling loop.
#[derive(Clone, Copy, Default)]
pub struct Counters {
    /// Total number of coupling steps performed.
    pub nsteps: usize,
    /// Timer for a whole coupling step.
    pub step_time: Timer,
    /// Timer used for debugging.
    pub custom: Timer,
    /// Counters of every stage of one coupling step.
    pub stages: StagesCounters,
    /// Counters of the fluid/solid data transfers.
    pub coupling: CouplingCounters,
}

impl Counters {
    /// Create a new set of counters initialized to zero.
    pub fn new() -> Self {
        Counters {
            nsteps: 0,
            step_time: Timer::new(),
            custom: Timer::new(),
            stages: StagesCounters::new(),
            coupling: CouplingCounters::new(),
        }
    }

    /// Resets to zero all the counters.
    pub fn reset(&mut self) {
        self.nsteps = 0;
        self.step_time.reset();
        self.custom.reset();
        self.stages.reset();
        self.coupling.reset();
    }

    /// Enable all the counters.
    pub fn enable(&mut self) {
        self.step_time.enable();
        self.custom.enable();
        self.stages.enable();
        self.coupling.enable();
    }

    /// Disable all the counters.
    pub fn disable(&mut self) {
        self.step_time.disable();
        self.custom.disable();
        self.stages.disable();
        self.coupling.disable();
    }
}

impl Display for Counters {
    fn fmt(&self, f: &mut Formatter) -> Result {
        writeln!(f, "Total step time: {}", self.step_time)?;
        writeln!(f, "Num steps: {}", self.nsteps)?;
        self.stages.fmt(f)?;
        self.coupling.fmt(f)?;
        writeln!(f, "Custom timer: {}", self.custom)
    }
}
