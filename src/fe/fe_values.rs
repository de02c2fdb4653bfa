use crate::fe::q1::{self, CellMapping};
use crate::fe::{DofHandler, FaceQuadrature, Quadrature};
use crate::geometry::{reference_cell, Mesh};
use crate::math::{Matrix, Point, Real, Vector, DIM, VERTICES_PER_CELL};

/// Shape functions, physical quadrature points and integration weights on one cell.
///
/// The reference values are computed once; [`CellValues::reinit`] only recomputes what depends
/// on the geometry of the current cell.
pub struct CellValues<'a> {
    quadrature: &'a Quadrature,
    values: Vec<[Real; VERTICES_PER_CELL]>,
    ref_gradients: Vec<[Vector<Real>; VERTICES_PER_CELL]>,
    cell: usize,
    points: Vec<Point<Real>>,
    gradients: Vec<[Vector<Real>; VERTICES_PER_CELL]>,
    jxw: Vec<Real>,
}

impl<'a> CellValues<'a> {
    /// Prepares the evaluation of the Q1 element at the points of `quadrature`.
    pub fn new(quadrature: &'a Quadrature) -> Self {
        let n = quadrature.size();
        Self {
            quadrature,
            values: quadrature.points().iter().map(q1::shape_values).collect(),
            ref_gradients: quadrature.points().iter().map(q1::shape_gradients).collect(),
            cell: usize::MAX,
            points: Vec::with_capacity(n),
            gradients: Vec::with_capacity(n),
            jxw: Vec::with_capacity(n),
        }
    }

    /// Recomputes the geometric quantities for the cell `cell` of `mesh`.
    pub fn reinit(&mut self, mesh: &Mesh, cell: usize) {
        let mapping = CellMapping::new(mesh, cell);
        self.cell = cell;
        self.points.clear();
        self.gradients.clear();
        self.jxw.clear();

        for (q, xi) in self.quadrature.points().iter().enumerate() {
            let jacobian = mapping.jacobian(xi);
            let inv_jacobian_tr = jacobian
                .try_inverse()
                .unwrap_or_else(Matrix::zeros)
                .transpose();

            self.points.push(mapping.transform_unit_to_real(xi));
            self.jxw
                .push(jacobian.determinant().abs() * self.quadrature.weights()[q]);
            self.gradients
                .push(self.ref_gradients[q].map(|g| inv_jacobian_tr * g));
        }
    }

    /// The number of quadrature points.
    #[inline]
    pub fn n_quadrature_points(&self) -> usize {
        self.quadrature.size()
    }

    /// The cell this was last reinitialized with.
    #[inline]
    pub fn cell(&self) -> usize {
        self.cell
    }

    /// The physical location of the `q`-th quadrature point.
    #[inline]
    pub fn quadrature_point(&self, q: usize) -> &Point<Real> {
        &self.points[q]
    }

    /// The physical locations of all the quadrature points.
    #[inline]
    pub fn quadrature_points(&self) -> &[Point<Real>] {
        &self.points
    }

    /// The jacobian determinant times the quadrature weight at the `q`-th point.
    #[inline]
    pub fn jxw(&self, q: usize) -> Real {
        self.jxw[q]
    }

    /// The value of the `v`-th shape function at the `q`-th point.
    #[inline]
    pub fn shape_value(&self, v: usize, q: usize) -> Real {
        self.values[q][v]
    }

    /// The physical gradient of the `v`-th shape function at the `q`-th point.
    #[inline]
    pub fn shape_grad(&self, v: usize, q: usize) -> &Vector<Real> {
        &self.gradients[q][v]
    }

    /// The values of one scalar component of `field` at every quadrature point.
    pub fn function_values(
        &self,
        mesh: &Mesh,
        dofs: &DofHandler,
        field: &[Real],
        component: usize,
    ) -> Vec<Real> {
        let indices = dofs.cell_dof_indices(mesh, self.cell, component);
        self.values
            .iter()
            .map(|phi| (0..VERTICES_PER_CELL).map(|v| phi[v] * field[indices[v]]).sum())
            .collect()
    }

    /// The values of the vector made of the components `first_component..first_component + DIM`.
    pub fn vector_values(
        &self,
        mesh: &Mesh,
        dofs: &DofHandler,
        field: &[Real],
        first_component: usize,
    ) -> Vec<Vector<Real>> {
        let mut result = vec![Vector::zeros(); self.n_quadrature_points()];

        for d in 0..DIM {
            let values = self.function_values(mesh, dofs, field, first_component + d);
            for (r, val) in result.iter_mut().zip(values) {
                r[d] = val;
            }
        }

        result
    }

    /// The gradients `G[(i, j)] = ∂v_i / ∂x_j` of the vector starting at `first_component`.
    pub fn vector_gradients(
        &self,
        mesh: &Mesh,
        dofs: &DofHandler,
        field: &[Real],
        first_component: usize,
    ) -> Vec<Matrix<Real>> {
        let mut result = vec![Matrix::zeros(); self.n_quadrature_points()];

        for i in 0..DIM {
            let indices = dofs.cell_dof_indices(mesh, self.cell, first_component + i);
            for (r, grads) in result.iter_mut().zip(self.gradients.iter()) {
                let grad_i = (0..VERTICES_PER_CELL)
                    .fold(Vector::zeros(), |acc, v| acc + grads[v] * field[indices[v]]);
                r.set_row(i, &grad_i.transpose());
            }
        }

        result
    }

    /// The symmetric parts of [`CellValues::vector_gradients`].
    pub fn vector_symmetric_gradients(
        &self,
        mesh: &Mesh,
        dofs: &DofHandler,
        field: &[Real],
        first_component: usize,
    ) -> Vec<Matrix<Real>> {
        self.vector_gradients(mesh, dofs, field, first_component)
            .iter()
            .map(crate::helper::symmetrize)
            .collect()
    }
}

/// Physical quadrature points, outward normals and integration weights on one cell face.
pub struct FaceValues<'a> {
    quadrature: &'a FaceQuadrature,
    points: Vec<Point<Real>>,
    normals: Vec<Vector<Real>>,
    jxw: Vec<Real>,
}

impl<'a> FaceValues<'a> {
    /// Prepares the evaluation of face quantities at the points of `quadrature`.
    pub fn new(quadrature: &'a FaceQuadrature) -> Self {
        let n = quadrature.size();
        Self {
            quadrature,
            points: Vec::with_capacity(n),
            normals: Vec::with_capacity(n),
            jxw: Vec::with_capacity(n),
        }
    }

    /// Recomputes the geometric quantities for the face `face` of the cell `cell`.
    pub fn reinit(&mut self, mesh: &Mesh, cell: usize, face: usize) {
        let mapping = CellMapping::new(mesh, cell);
        let ref_normal = reference_cell::face_normal(face);
        self.points.clear();
        self.normals.clear();
        self.jxw.clear();

        for q in 0..self.quadrature.size() {
            let xi = self.quadrature.point(face, q);
            let jacobian = mapping.jacobian(xi);
            let inv_jacobian_tr = jacobian
                .try_inverse()
                .unwrap_or_else(Matrix::zeros)
                .transpose();
            let normal = inv_jacobian_tr * ref_normal;
            let normal_norm = normal.norm();

            self.points.push(mapping.transform_unit_to_real(xi));
            self.normals.push(if normal_norm > 0.0 {
                normal / normal_norm
            } else {
                normal
            });
            self.jxw.push(
                jacobian.determinant().abs() * normal_norm * self.quadrature.weights()[q],
            );
        }
    }

    /// The number of quadrature points on the face.
    #[inline]
    pub fn n_quadrature_points(&self) -> usize {
        self.quadrature.size()
    }

    /// The physical location of the `q`-th face quadrature point.
    #[inline]
    pub fn quadrature_point(&self, q: usize) -> &Point<Real> {
        &self.points[q]
    }

    /// The outward unit normal at the `q`-th face quadrature point.
    #[inline]
    pub fn normal_vector(&self, q: usize) -> &Vector<Real> {
        &self.normals[q]
    }

    /// The face measure element times the quadrature weight at the `q`-th point.
    #[inline]
    pub fn jxw(&self, q: usize) -> Real {
        self.jxw[q]
    }
}
