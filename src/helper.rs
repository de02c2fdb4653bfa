//! Various helper functions for tensors and collections.

use crate::math::{Matrix, Point, Real, Vector, DIM};

/// The symmetric part `(m + mᵀ) / 2` of `m`.
#[inline]
pub fn symmetrize(m: &Matrix<Real>) -> Matrix<Real> {
    (m + m.transpose()) * 0.5
}

/// Composes a tensor from its independently computed components.
///
/// `components[i * DIM + j]` is the component `(i, j)` of the result.
pub fn tensor_from_components(components: &[Real]) -> Matrix<Real> {
    assert_eq!(components.len(), DIM * DIM);
    Matrix::from_fn(|i, j| components[i * DIM + j])
}

/// The Cauchy stress `-p I + μ sym(∇v)` of a Newtonian fluid.
///
/// `velocity_gradient[(i, j)]` is `∂v_i / ∂x_j`.
#[inline]
pub fn fluid_stress(pressure: Real, viscosity: Real, velocity_gradient: &Matrix<Real>) -> Matrix<Real> {
    symmetrize(velocity_gradient) * viscosity - Matrix::identity() * pressure
}

/// The squared distance from `point` to the closest of `others`, or `None` if `others` is empty.
pub fn min_distance_squared<'a>(
    point: &Point<Real>,
    others: impl IntoIterator<Item = &'a Point<Real>>,
) -> Option<Real> {
    others
        .into_iter()
        .map(|other| na::distance_squared(point, other))
        .min_by(|a, b| a.total_cmp(b))
}

/// The vector made of the components `first..first + DIM` of `values`.
#[inline]
pub fn vector_at(values: &[Real], first: usize) -> Vector<Real> {
    Vector::from_fn(|d, _| values[first + d])
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fluid_stress_at_rest_is_isotropic() {
        let sigma = fluid_stress(3.0, 0.5, &Matrix::zeros());
        assert_relative_eq!(sigma, Matrix::identity() * -3.0);
    }

    #[test]
    fn fluid_stress_only_sees_the_symmetric_gradient() {
        // A rigid rotation has a skew-symmetric gradient.
        let mut rotation = Matrix::zeros();
        rotation[(0, 1)] = 1.0;
        rotation[(1, 0)] = -1.0;
        assert_relative_eq!(fluid_stress(0.0, 2.0, &rotation), Matrix::zeros());

        let shear = Matrix::from_fn(|i, j| if (i, j) == (0, 1) { 2.0 } else { 0.0 });
        let sigma = fluid_stress(1.0, 0.1, &shear);
        assert_relative_eq!(sigma[(0, 1)], 0.1);
        assert_relative_eq!(sigma[(1, 0)], 0.1);
        assert_relative_eq!(sigma[(0, 0)], -1.0);
    }

    #[test]
    fn tensor_components_are_row_major() {
        let components: Vec<_> = (0..DIM * DIM).map(|k| k as Real).collect();
        let m = tensor_from_components(&components);
        assert_eq!(m[(0, 1)], 1.0);
        assert_eq!(m[(1, 0)], DIM as Real);
    }

    #[test]
    fn closest_point() {
        let p = Point::origin();
        let others = [Point::from(Vector::repeat(2.0)), Point::from(Vector::repeat(1.0))];
        assert_relative_eq!(min_distance_squared(&p, &others).unwrap(), DIM as Real);
        assert!(min_distance_squared(&p, &[]).is_none());
    }
}
