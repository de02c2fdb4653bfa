use crate::counters::Timer;
use std::fmt::{Display, Formatter, Result};

/// Performance counters related to each stage of the coupling step.
#[derive(Default, Clone, Copy)]
pub struct StagesCounters {
    /// Time spent by the external solid solver.
    pub solid_solve_time: Timer,
    /// Time spent by the external fluid solver.
    pub fluid_solve_time: Timer,
    /// Time spent exchanging data between the fluid and the solid.
    pub coupling_time: Timer,
    /// Time spent adapting the fluid mesh.
    pub remesh_time: Timer,
}

impl StagesCounters {
    /// Create a new counter initialized to zero.
    pub fn new() -> Self {
        StagesCounters {
            solid_solve_time: Timer::new(),
            fluid_solve_time: Timer::new(),
            coupling_time: Timer::new(),
            remesh_time: Timer::new(),
        }
    }

    /// Enables all the counters for the simulation stages.
    pub fn enable(&mut self) {
        self.solid_solve_time.enable();
        self.fluid_solve_time.enable();
        self.coupling_time.enable();
        self.remesh_time.enable();
    }

    /// Disables all the counters for the simulation stages.
    pub fn disable(&mut self) {
        self.solid_solve_time.disable();
        self.fluid_solve_time.disable();
        self.coupling_time.disable();
        self.remesh_time.disable();
    }

    /// Resets to zero all the counters for the simulation stages.
    pub fn reset(&mut self) {
        self.solid_solve_time.reset();
        self.fluid_solve_time.reset();
        self.coupling_time.reset();
        self.remesh_time.reset();
    }
}

impl Display for StagesCounters {
    fn fmt(&self, f: &mut Formatter) -> Result {
        writeln!(f, "Solid solve time: {}", self.solid_solve_time)?;
        writeln!(f, "Fluid solve time: {}", self.fluid_solve_time)?;
        writeln!(f, "Coupling time: {}", self.coupling_time)?;
        writeln!(f, "Remesh time: {}", self.remesh_time)
    }
}
