//! The lowest-order Lagrange element on quadrilaterals/hexahedra and its multilinear mapping.

use crate::geometry::reference_cell::bit;
use crate::geometry::Mesh;
use crate::math::{Matrix, Point, Real, Vector, DIM, VERTICES_PER_CELL};

const MAX_NEWTON_ITERATIONS: usize = 20;

/// The values of the `VERTICES_PER_CELL` shape functions at the reference point `xi`.
pub fn shape_values(xi: &Point<Real>) -> [Real; VERTICES_PER_CELL] {
    std::array::from_fn(|v| {
        (0..DIM)
            .map(|d| if bit(v, d) == 1 { xi[d] } else { 1.0 - xi[d] })
            .product()
    })
}

/// The gradients, wrt. the reference coordinates, of the shape functions at `xi`.
pub fn shape_gradients(xi: &Point<Real>) -> [Vector<Real>; VERTICES_PER_CELL] {
    std::array::from_fn(|v| {
        Vector::from_fn(|k, _| {
            (0..DIM)
                .map(|d| match (d == k, bit(v, d)) {
                    (true, 1) => 1.0,
                    (true, _) => -1.0,
                    (false, 1) => xi[d],
                    (false, _) => 1.0 - xi[d],
                })
                .product()
        })
    })
}

/// The multilinear map from the reference cell to one physical cell.
#[derive(Clone, Debug)]
pub struct CellMapping {
    vertices: [Point<Real>; VERTICES_PER_CELL],
}

impl CellMapping {
    /// The mapping of the cell `cell` of `mesh`, with its current vertex positions.
    pub fn new(mesh: &Mesh, cell: usize) -> Self {
        Self {
            vertices: mesh.cell_vertices(cell),
        }
    }

    /// The mapping of the cell with the given vertices.
    pub fn from_vertices(vertices: [Point<Real>; VERTICES_PER_CELL]) -> Self {
        Self { vertices }
    }

    /// Maps the reference point `xi` to physical space.
    pub fn transform_unit_to_real(&self, xi: &Point<Real>) -> Point<Real> {
        let phi = shape_values(xi);
        let coords = self
            .vertices
            .iter()
            .zip(phi.iter())
            .fold(Vector::zeros(), |acc, (x, phi)| acc + x.coords * *phi);
        Point::from(coords)
    }

    /// The jacobian `J[(i, j)] = ∂x_i / ∂ξ_j` of the mapping at `xi`.
    pub fn jacobian(&self, xi: &Point<Real>) -> Matrix<Real> {
        let grads = shape_gradients(xi);
        self.vertices
            .iter()
            .zip(grads.iter())
            .fold(Matrix::zeros(), |acc, (x, g)| acc + x.coords * g.transpose())
    }

    /// Maps the physical point `p` back to the reference cell with Newton iterations.
    ///
    /// The result may lie outside of the reference cell if `p` is outside of the cell.
    /// Returns `None` if the iterations do not converge or the jacobian becomes singular.
    pub fn transform_real_to_unit(&self, p: &Point<Real>) -> Option<Point<Real>> {
        let scale = (self.vertices[VERTICES_PER_CELL - 1] - self.vertices[0]).norm();
        let tol = 1.0e-12 * scale.max(Real::MIN_POSITIVE);
        let mut xi = Point::from(Vector::repeat(0.5));

        for _ in 0..MAX_NEWTON_ITERATIONS {
            let residual = self.transform_unit_to_real(&xi) - p;

            if residual.norm() <= tol {
                return Some(xi);
            }

            let inv_jacobian = self.jacobian(&xi).try_inverse()?;
            xi -= inv_jacobian * residual;
        }

        let residual = self.transform_unit_to_real(&xi) - p;
        (residual.norm() <= tol * 1.0e3).then_some(xi)
    }
}
