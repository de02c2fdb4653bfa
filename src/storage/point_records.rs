use crate::math::{Matrix, Real, Vector};

use num::Zero;

/// Coupling data attached to one fluid quadrature point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FluidPointRecord {
    /// Whether the point lies inside the displaced solid.
    pub indicator: bool,
    /// The acceleration discrepancy injected into the fluid momentum equation.
    pub fsi_acceleration: Vector<Real>,
    /// The symmetric stress discrepancy between the fluid and the solid.
    pub fsi_stress: Matrix<Real>,
}

impl Default for FluidPointRecord {
    fn default() -> Self {
        Self {
            indicator: false,
            fsi_acceleration: Vector::zeros(),
            fsi_stress: Matrix::zeros(),
        }
    }
}

impl FluidPointRecord {
    /// Marks the point as inside or outside of the solid, with zero sources.
    #[inline]
    pub fn reset(&mut self, indicator: bool) {
        *self = Self {
            indicator,
            ..Self::default()
        };
    }

    /// Are the sources exactly zero wherever the point is outside of the solid?
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.indicator || (self.fsi_acceleration.is_zero() && self.fsi_stress.is_zero())
    }
}

/// Coupling data attached to one solid face quadrature point.
///
/// Each solid cell stores one record per (face, face quadrature point), the record of the
/// point `q` of `face` being at the local index `face * n_face_quadrature_points + q`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolidPointRecord {
    /// The traction exerted by the fluid on the solid boundary.
    pub fsi_traction: Vector<Real>,
}

impl Default for SolidPointRecord {
    fn default() -> Self {
        Self {
            fsi_traction: Vector::zeros(),
        }
    }
}
