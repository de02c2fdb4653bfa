//! Errors raised by the coupling core.
//!
//! Every error is fatal to the current run: nothing is retried and nothing is silently skipped.

use crate::math::{Point, Real};
use thiserror::Error;

/// Boxed error produced by an external collaborator.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type of the coupling core.
pub type Result<T> = std::result::Result<T, FsiError>;

/// The error taxonomy of the coupling core.
#[derive(Error, Debug)]
pub enum FsiError {
    /// A point expected to lie inside a mesh was not found by the point locator.
    ///
    /// This happens when the solid drifted outside of the fluid background mesh.
    #[error("geometric inconsistency: point {point} is not inside the {mesh} mesh")]
    GeometricInconsistency {
        /// The mesh that was queried.
        mesh: &'static str,
        /// The physical point that could not be located.
        point: Point<Real>,
    },

    /// A per-quadrature-point record store does not match its mesh.
    #[error("size mismatch in {store}: expected {expected} records, found {found}")]
    SizeMismatch {
        /// The name of the store.
        store: &'static str,
        /// `number of active cells × number of points per cell`.
        expected: usize,
        /// The actual number of records.
        found: usize,
    },

    /// An external solver failed to converge.
    #[error("the {solver} solver did not converge")]
    NonConvergence {
        /// The collaborator that failed.
        solver: &'static str,
        /// The collaborator's own error.
        #[source]
        source: BoxedError,
    },

    /// The simulation parameters are not usable.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

impl FsiError {
    /// Wraps the error of an external solver.
    pub fn non_convergence(solver: &'static str, source: impl Into<BoxedError>) -> Self {
        FsiError::NonConvergence {
            solver,
            source: source.into(),
        }
    }
}
