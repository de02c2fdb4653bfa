use crate::geometry::reference_cell;
use crate::math::{Point, Real, Vector, DIM, FACES_PER_CELL};
use itertools::Itertools;

// Gauss-Legendre points and weights on [0, 1].
fn gauss_1d(n: usize) -> (Vec<Real>, Vec<Real>) {
    match n {
        1 => (vec![0.5], vec![1.0]),
        2 => {
            let a = 0.5 / 3.0f64.sqrt();
            (vec![0.5 - a, 0.5 + a], vec![0.5, 0.5])
        }
        3 => {
            let a = 0.5 * (3.0f64 / 5.0).sqrt();
            (
                vec![0.5 - a, 0.5, 0.5 + a],
                vec![5.0 / 18.0, 8.0 / 18.0, 5.0 / 18.0],
            )
        }
        4 => {
            let s = (6.0f64 / 5.0).sqrt();
            let a = 0.5 * ((3.0 - 2.0 * s) / 7.0).sqrt();
            let b = 0.5 * ((3.0 + 2.0 * s) / 7.0).sqrt();
            let wa = (18.0 + 30.0f64.sqrt()) / 72.0;
            let wb = (18.0 - 30.0f64.sqrt()) / 72.0;
            (
                vec![0.5 - b, 0.5 - a, 0.5 + a, 0.5 + b],
                vec![wb, wa, wa, wb],
            )
        }
        _ => panic!("Gauss rules are only available with 1 to 4 points per direction."),
    }
}

// Tensor product of the 1D rule over `dim` directions, first direction varying fastest.
fn tensor_product(n: usize, dim: usize) -> Vec<(Vec<Real>, Real)> {
    let (points, weights) = gauss_1d(n);

    if dim == 0 {
        return vec![(Vec::new(), 1.0)];
    }

    (0..dim)
        .map(|_| 0..n)
        .multi_cartesian_product()
        .map(|mut idx| {
            idx.reverse();
            let p = idx.iter().map(|i| points[*i]).collect();
            let w = idx.iter().map(|i| weights[*i]).product();
            (p, w)
        })
        .collect()
}

/// A Gauss quadrature rule on the reference cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Quadrature {
    points: Vec<Point<Real>>,
    weights: Vec<Real>,
}

impl Quadrature {
    /// The tensor-product Gauss rule with `n` points per direction.
    pub fn gauss(n: usize) -> Self {
        let (points, weights) = tensor_product(n, DIM)
            .into_iter()
            .map(|(p, w)| (Point::from(Vector::from_column_slice(&p)), w))
            .unzip();
        Self { points, weights }
    }

    /// The number of quadrature points.
    #[inline]
    pub fn size(&self) -> usize {
        self.points.len()
    }

    /// The quadrature points on the reference cell.
    #[inline]
    pub fn points(&self) -> &[Point<Real>] {
        &self.points
    }

    /// The weights of the quadrature points; they sum to one.
    #[inline]
    pub fn weights(&self) -> &[Real] {
        &self.weights
    }
}

/// A Gauss quadrature rule on the faces of the reference cell.
///
/// The same `(DIM - 1)`-dimensional rule is mapped onto every face, so the `q`-th point of
/// every face shares the same weight.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceQuadrature {
    points: Vec<[Point<Real>; FACES_PER_CELL]>,
    weights: Vec<Real>,
}

impl FaceQuadrature {
    /// The tensor-product Gauss rule with `n` points per face direction.
    pub fn gauss(n: usize) -> Self {
        let (points, weights) = tensor_product(n, DIM - 1)
            .into_iter()
            .map(|(p, w)| {
                let on_faces =
                    std::array::from_fn(|face| reference_cell::face_to_cell(face, &p));
                (on_faces, w)
            })
            .unzip();
        Self { points, weights }
    }

    /// The number of quadrature points on one face.
    #[inline]
    pub fn size(&self) -> usize {
        self.weights.len()
    }

    /// The `q`-th quadrature point of `face`, on the reference cell.
    #[inline]
    pub fn point(&self, face: usize, q: usize) -> &Point<Real> {
        &self.points[q][face]
    }

    /// The weights of the face quadrature points; they sum to one.
    #[inline]
    pub fn weights(&self) -> &[Real] {
        &self.weights
    }
}
