//! Parameters of a coupled simulation.

use serde::{Deserialize, Serialize};

use crate::error::{FsiError, Result};
use crate::math::{Real, Vector};

/// The fluid acceleration term of the acceleration discrepancy injected at immersed points.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccelerationDiscrepancy {
    /// `gravity - solid_acceleration`.
    #[default]
    BodyForce,
    /// `Dv/Dt - solid_acceleration`, with `Dv/Dt = Δv / Δt + (∇v) v` evaluated from the fluid
    /// velocity increment and the present fluid velocity.
    MaterialDerivative,
}

/// Number of global refinements applied to each mesh before the first step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRefinements {
    /// Base refinement level of the fluid mesh.
    pub fluid: u32,
    /// Base refinement level of the solid mesh.
    pub solid: u32,
}

/// Parameters of a coupled simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsiParameters {
    /// Dynamic viscosity of the fluid.
    pub viscosity: Real,
    /// External body force per unit mass.
    pub gravity: Vector<Real>,
    /// Time at which the simulation ends.
    pub end_time: Real,
    /// Length of a coupling step.
    pub time_step: Real,
    /// Simulated time between two outputs.
    pub output_interval: Real,
    /// Simulated time between two adaptations of the fluid mesh.
    pub refinement_interval: Real,
    /// Simulated time between two saves.
    pub save_interval: Real,
    /// Base refinement levels of the meshes.
    pub global_refinements: GlobalRefinements,
    /// A fluid cell closer than this to a solid cell (center to center) gets refined.
    pub refinement_proximity: Real,
    /// Number of refinement levels the fluid mesh may gain above its base level.
    pub max_refinement_offset: u32,
    /// The fluid acceleration term of the immersed sources.
    pub acceleration_discrepancy: AccelerationDiscrepancy,
}

impl Default for FsiParameters {
    fn default() -> Self {
        Self {
            viscosity: 1.0,
            gravity: Vector::zeros(),
            end_time: 1.0,
            time_step: 0.01,
            output_interval: 0.01,
            refinement_interval: 0.1,
            save_interval: 1.0,
            global_refinements: GlobalRefinements::default(),
            refinement_proximity: 0.1,
            max_refinement_offset: 2,
            acceleration_discrepancy: AccelerationDiscrepancy::BodyForce,
        }
    }
}

impl FsiParameters {
    /// Checks that these parameters describe a simulation that can run.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("time_step", self.time_step),
            ("output_interval", self.output_interval),
            ("refinement_interval", self.refinement_interval),
            ("save_interval", self.save_interval),
        ];

        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(FsiError::InvalidParameters(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }

        if !(self.end_time >= 0.0 && self.end_time.is_finite()) {
            return Err(FsiError::InvalidParameters(format!(
                "end_time must be non-negative and finite, got {}",
                self.end_time
            )));
        }

        if !(self.viscosity >= 0.0) {
            return Err(FsiError::InvalidParameters(format!(
                "viscosity must be non-negative, got {}",
                self.viscosity
            )));
        }

        if !(self.refinement_proximity >= 0.0) {
            return Err(FsiError::InvalidParameters(format!(
                "refinement_proximity must be non-negative, got {}",
                self.refinement_proximity
            )));
        }

        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(FsiError::InvalidParameters(
                "gravity must be finite".to_string(),
            ));
        }

        Ok(())
    }
}
