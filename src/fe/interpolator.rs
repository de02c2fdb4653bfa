use na::DVector;

use crate::fe::q1::{self, CellMapping};
use crate::fe::DofHandler;
use crate::geometry::{CellLocation, Mesh, PointLocator};
use crate::math::{Matrix, Point, Real, Vector, DIM, VERTICES_PER_CELL};

/// Evaluates finite-element fields at an arbitrary physical point.
///
/// The point is located once at construction; every field defined on the same mesh (whatever
/// its number of components) can then be evaluated without searching again.
pub struct GridInterpolator<'a> {
    mesh: &'a Mesh,
    location: CellLocation,
    values: [Real; VERTICES_PER_CELL],
    gradients: [Vector<Real>; VERTICES_PER_CELL],
}

impl<'a> GridInterpolator<'a> {
    /// Locates `point` with `locator`.
    ///
    /// Returns `None` if the point is outside of the locator's mesh.
    pub fn new(locator: &PointLocator<'a>, point: &Point<Real>) -> Option<Self> {
        let location = locator.locate(point)?;
        Some(Self::from_location(locator.mesh(), location))
    }

    /// Builds an interpolator from an already known location.
    pub fn from_location(mesh: &'a Mesh, location: CellLocation) -> Self {
        let xi = &location.reference_point;
        let inv_jacobian_tr = CellMapping::new(mesh, location.cell)
            .jacobian(xi)
            .try_inverse()
            .unwrap_or_else(Matrix::zeros)
            .transpose();

        Self {
            mesh,
            location,
            values: q1::shape_values(xi),
            gradients: q1::shape_gradients(xi).map(|g| inv_jacobian_tr * g),
        }
    }

    /// Where the point was found.
    #[inline]
    pub fn location(&self) -> &CellLocation {
        &self.location
    }

    /// The value of one component of `field`.
    pub fn component_value(&self, dofs: &DofHandler, field: &[Real], component: usize) -> Real {
        let indices = dofs.cell_dof_indices(self.mesh, self.location.cell, component);
        (0..VERTICES_PER_CELL)
            .map(|v| self.values[v] * field[indices[v]])
            .sum()
    }

    /// The gradient of one component of `field`.
    pub fn component_gradient(
        &self,
        dofs: &DofHandler,
        field: &[Real],
        component: usize,
    ) -> Vector<Real> {
        let indices = dofs.cell_dof_indices(self.mesh, self.location.cell, component);
        (0..VERTICES_PER_CELL).fold(Vector::zeros(), |acc, v| {
            acc + self.gradients[v] * field[indices[v]]
        })
    }

    /// The values of all the components of `field`.
    pub fn point_value(&self, dofs: &DofHandler, field: &[Real]) -> DVector<Real> {
        DVector::from_fn(dofs.n_components(), |c, _| {
            self.component_value(dofs, field, c)
        })
    }

    /// The gradients of all the components of `field`.
    pub fn point_gradient(&self, dofs: &DofHandler, field: &[Real]) -> Vec<Vector<Real>> {
        (0..dofs.n_components())
            .map(|c| self.component_gradient(dofs, field, c))
            .collect()
    }

    /// The vector made of the components `first_component..first_component + DIM`.
    pub fn vector_value(
        &self,
        dofs: &DofHandler,
        field: &[Real],
        first_component: usize,
    ) -> Vector<Real> {
        Vector::from_fn(|d, _| self.component_value(dofs, field, first_component + d))
    }

    /// The gradient `G[(i, j)] = ∂v_i / ∂x_j` of the vector starting at `first_component`.
    pub fn vector_gradient(
        &self,
        dofs: &DofHandler,
        field: &[Real],
        first_component: usize,
    ) -> Matrix<Real> {
        let mut result = Matrix::zeros();
        for i in 0..DIM {
            let grad = self.component_gradient(dofs, field, first_component + i);
            result.set_row(i, &grad.transpose());
        }
        result
    }
}

/// The values of all the components of `field` at `point`.
///
/// Returns `None` if `point` is outside of the locator's mesh.
pub fn point_value(
    locator: &PointLocator,
    dofs: &DofHandler,
    field: &[Real],
    point: &Point<Real>,
) -> Option<DVector<Real>> {
    GridInterpolator::new(locator, point).map(|interp| interp.point_value(dofs, field))
}

/// The gradients of all the components of `field` at `point`.
///
/// Returns `None` if `point` is outside of the locator's mesh.
pub fn point_gradient(
    locator: &PointLocator,
    dofs: &DofHandler,
    field: &[Real],
    point: &Point<Real>,
) -> Option<Vec<Vector<Real>>> {
    GridInterpolator::new(locator, point).map(|interp| interp.point_gradient(dofs, field))
}
