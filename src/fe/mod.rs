//! The Q1 finite-element substrate: element, quadrature, values, and degrees of freedom.

pub use self::dof_handler::DofHandler;
pub use self::fe_values::{CellValues, FaceValues};
pub use self::interpolator::{point_gradient, point_value, GridInterpolator};
pub use self::quadrature::{FaceQuadrature, Quadrature};

mod dof_handler;
mod fe_values;
mod interpolator;
pub mod q1;
mod quadrature;
