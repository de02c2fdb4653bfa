//! Topology of the reference cell `[0, 1]^DIM`.
//!
//! Vertices are numbered lexicographically: bit `d` of a vertex index is its `d`-th reference
//! coordinate. Face `2 * d + s` is the face where the `d`-th reference coordinate equals `s`.
//! Children of a refined cell follow the same numbering as the vertices: child `c` is the
//! sub-cell touching vertex `c`.

use crate::math::{Point, Real, Vector, DIM, VERTICES_PER_CELL, VERTICES_PER_FACE};

/// The `d`-th bit of the lexicographic index `i`.
#[inline]
pub fn bit(i: usize, d: usize) -> usize {
    (i >> d) & 1
}

/// The reference coordinates of the vertex `v`.
pub fn vertex_coords(v: usize) -> Point<Real> {
    Point::from(Vector::from_fn(|d, _| bit(v, d) as Real))
}

/// The axis orthogonal to `face` and the side of the cell it lies on.
#[inline]
pub fn face_axis_and_side(face: usize) -> (usize, usize) {
    (face / 2, face % 2)
}

/// The local indices of the vertices of `face`, in increasing order.
pub fn face_vertices(face: usize) -> [usize; VERTICES_PER_FACE] {
    let (axis, side) = face_axis_and_side(face);
    let mut result = [0; VERTICES_PER_FACE];
    let mut k = 0;

    for v in 0..VERTICES_PER_CELL {
        if bit(v, axis) == side {
            result[k] = v;
            k += 1;
        }
    }

    result
}

/// The outward unit normal of `face` on the reference cell.
pub fn face_normal(face: usize) -> Vector<Real> {
    let (axis, side) = face_axis_and_side(face);
    let mut n = Vector::zeros();
    n[axis] = if side == 0 { -1.0 } else { 1.0 };
    n
}

/// Maps a point of the `(DIM - 1)`-dimensional face parameter space to the reference cell.
///
/// Only the first `DIM - 1` coordinates of `param` are read.
pub fn face_to_cell(face: usize, param: &[Real]) -> Point<Real> {
    let (axis, side) = face_axis_and_side(face);
    let mut p = Point::origin();
    let mut k = 0;

    for d in 0..DIM {
        if d == axis {
            p[d] = side as Real;
        } else {
            p[d] = param[k];
            k += 1;
        }
    }

    p
}

/// Does `child` touch the given `face` of its parent?
#[inline]
pub fn child_on_face(child: usize, face: usize) -> bool {
    let (axis, side) = face_axis_and_side(face);
    bit(child, axis) == side
}

/// Is `p` inside the reference cell, up to `eps`?
pub fn is_inside_unit_cell(p: &Point<Real>, eps: Real) -> bool {
    p.iter().all(|x| *x >= -eps && *x <= 1.0 + eps)
}
