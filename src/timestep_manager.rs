use crate::math::Real;

/// Structure responsible for regulating the simulated time of a coupled simulation.
///
/// Time is advanced by a fixed step; the output, refinement and save events fire whenever the
/// current time crosses a multiple of their interval.
#[derive(Clone, Debug, PartialEq)]
pub struct TimestepManager {
    end: Real,
    delta_t: Real,
    output_interval: Real,
    refinement_interval: Real,
    save_interval: Real,
    current: Real,
    timestep: usize,
}

impl TimestepManager {
    /// Tolerance used to decide whether the end time was reached.
    pub const END_TOLERANCE: Real = 1.0e-12;

    /// Initialize a new timestep manager starting at time zero.
    pub fn new(
        end: Real,
        delta_t: Real,
        output_interval: Real,
        refinement_interval: Real,
        save_interval: Real,
    ) -> Self {
        Self {
            end,
            delta_t,
            output_interval,
            refinement_interval,
            save_interval,
            current: 0.0,
            timestep: 0,
        }
    }

    /// The current simulated time.
    #[inline]
    pub fn current(&self) -> Real {
        self.current
    }

    /// The time at which the simulation ends.
    #[inline]
    pub fn end(&self) -> Real {
        self.end
    }

    /// The length of a step.
    #[inline]
    pub fn get_delta_t(&self) -> Real {
        self.delta_t
    }

    /// The number of steps performed so far.
    #[inline]
    pub fn get_timestep(&self) -> usize {
        self.timestep
    }

    /// Has the end time been reached, up to rounding errors?
    #[inline]
    pub fn is_done(&self) -> bool {
        self.end - self.current <= Self::END_TOLERANCE
    }

    /// The number of steps needed to go from zero to the end time.
    pub fn n_steps(&self) -> usize {
        let mut probe = Self::new(self.end, self.delta_t, 1.0, 1.0, 1.0);
        while !probe.is_done() {
            probe.increment();
        }
        probe.timestep
    }

    /// Advances the time by one step.
    pub fn increment(&mut self) {
        self.timestep += 1;
        // Accumulating `delta_t` drifts; multiplying does not.
        self.current = self.timestep as Real * self.delta_t;
    }

    fn crossed(&self, interval: Real) -> bool {
        if self.timestep == 0 {
            return false;
        }

        let previous = self.current - self.delta_t;
        let eps = Self::END_TOLERANCE;
        ((self.current + eps) / interval).floor() > ((previous + eps) / interval).floor()
    }

    /// Was an output interval completed by the last step?
    pub fn time_to_output(&self) -> bool {
        self.crossed(self.output_interval)
    }

    /// Was a refinement interval completed by the last step?
    pub fn time_to_refine(&self) -> bool {
        self.crossed(self.refinement_interval)
    }

    /// Was a save interval completed by the last step?
    pub fn time_to_save(&self) -> bool {
        self.crossed(self.save_interval)
    }
}
