use crate::counters::Timer;
use std::fmt::{Display, Formatter, Result};

/// Performance counters related to the fluid/solid data transfers.
#[derive(Default, Clone, Copy)]
pub struct CouplingCounters {
    /// Number of fluid quadrature points found inside the solid.
    pub nimmersed_points: usize,
    /// Number of solid boundary quadrature points that received a traction.
    pub ntraction_points: usize,
    /// Time spent computing the fluid traction on the solid boundary.
    pub solid_bc_time: Timer,
    /// Time spent computing the immersed sources of the fluid.
    pub fluid_bc_time: Timer,
}

impl CouplingCounters {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        CouplingCounters {
            nimmersed_points: 0,
            ntraction_points: 0,
            solid_bc_time: Timer::new(),
            fluid_bc_time: Timer::new(),
        }
    }

    /// Enables all the counters for the data transfers.
    pub fn enable(&mut self) {
        self.solid_bc_time.enable();
        self.fluid_bc_time.enable();
    }

    /// Disables all the counters for the data transfers.
    pub fn disable(&mut self) {
        self.solid_bc_time.disable();
        self.fluid_bc_time.disable();
    }

    /// Resets to zero all the counters for the data transfers.
    pub fn reset(&mut self) {
        self.nimmersed_points = 0;
        self.ntraction_points = 0;
        self.solid_bc_time.reset();
        self.fluid_bc_time.reset();
    }
}

impl Display for CouplingCounters {
    fn fmt(&self, f: &mut Formatter) -> Result {
        writeln!(f, "Number of immersed points: {}", self.nimmersed_points)?;
        writeln!(f, "Number of traction points: {}", self.ntraction_points)?;
        writeln!(f, "Solid BC time: {}", self.solid_bc_time)?;
        writeln!(f, "Fluid BC time: {}", self.fluid_bc_time)
    }
}
