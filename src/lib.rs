/*!
**ifem** is a 2 and 3-dimensional immersed finite-element coupling core for fluid-structure interaction.
It uses [nalgebra](https://nalgebra.org) for vector/matrix math.
2D and 3D implementations both share (mostly) the same code!

The solid lives on its own mesh which is immersed, without any conformity requirement, inside a
fixed background fluid mesh. Each time step the coupling core:

- classifies every fluid quadrature point as inside or outside the (displaced) solid,
- injects the solid acceleration and stress discrepancies into the fluid at immersed points,
- computes the fluid traction on the solid boundary,
- optionally refines the fluid mesh around the solid.

The single-physics solvers themselves are external collaborators: they implement the
[`FluidSolver`](coupling::FluidSolver) and [`SolidSolver`](coupling::SolidSolver) traits and
own their meshes, degrees of freedom, and per-quadrature-point coupling records.

## Features
- **Point location** in independently refined and displaced quadrilateral/hexahedral meshes.
- **Interpolation** of finite-element fields and gradients at arbitrary physical points.
- **Scoped mesh motion** restoring the reference configuration on every exit path.
- **Adaptive remeshing** of the fluid mesh driven by the proximity of the solid.
- Optional **parallel** passes with rayon.
*/
#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_qualifications)]
#![warn(missing_docs)]
#![warn(unused_results)]
#![allow(type_alias_bounds)]
#![allow(missing_copy_implementations)]

extern crate nalgebra as na;
extern crate num_traits as num;

macro_rules! par_iter {
    ($t: expr) => {{
        #[cfg(not(feature = "parallel"))]
        let it = $t.iter();

        #[cfg(feature = "parallel")]
        let it = $t.par_iter();
        it
    }};
}

macro_rules! par_chunks_mut {
    ($t: expr, $n: expr) => {{
        #[cfg(not(feature = "parallel"))]
        let it = $t.chunks_mut($n);

        #[cfg(feature = "parallel")]
        let it = $t.par_chunks_mut($n);
        it
    }};
}

pub mod counters;
pub mod coupling;
pub mod error;
pub mod fe;
mod fsi_world;
pub mod geometry;
pub mod helper;
pub mod parameters;
pub mod storage;
#[cfg(test)]
pub(crate) mod testing;
mod timestep_manager;

pub use crate::error::{FsiError, Result};
pub use crate::fsi_world::FsiWorld;
pub use crate::parameters::FsiParameters;
pub use crate::timestep_manager::TimestepManager;

/// Compilation flags dependent aliases for mathematical types.
#[cfg(feature = "dim3")]
pub mod math {
    use na::{Matrix3, Point3, Vector3, U3};

    /// The number of dimensions of the ambient space.
    pub const DIM: usize = 3;
    /// The number of vertices of a hexahedron.
    pub const VERTICES_PER_CELL: usize = 8;
    /// The number of faces of a hexahedron.
    pub const FACES_PER_CELL: usize = 6;
    /// The number of vertices of a quadrilateral face.
    pub const VERTICES_PER_FACE: usize = 4;
    /// The number of children created by the isotropic refinement of a cell.
    pub const CHILDREN_PER_CELL: usize = 8;

    /// The scalar type.
    pub type Real = f64;

    /// The dimension of the ambient space.
    pub type Dim = U3;

    /// The point type.
    pub type Point<Real> = Point3<Real>;

    /// The vector type.
    pub type Vector<Real> = Vector3<Real>;

    /// Square matrix with dimension `Dim × Dim`.
    pub type Matrix<Real> = Matrix3<Real>;
}

/// Compilation flags dependent aliases for mathematical types.
#[cfg(feature = "dim2")]
pub mod math {
    use na::{Matrix2, Point2, Vector2, U2};

    /// The number of dimensions of the ambient space.
    pub const DIM: usize = 2;
    /// The number of vertices of a quadrilateral.
    pub const VERTICES_PER_CELL: usize = 4;
    /// The number of faces (edges) of a quadrilateral.
    pub const FACES_PER_CELL: usize = 4;
    /// The number of vertices of a face (edge).
    pub const VERTICES_PER_FACE: usize = 2;
    /// The number of children created by the isotropic refinement of a cell.
    pub const CHILDREN_PER_CELL: usize = 4;

    /// The scalar type.
    pub type Real = f64;

    /// The dimension of the ambient space.
    pub type Dim = U2;

    /// The point type.
    pub type Point<Real> = Point2<Real>;

    /// The vector type.
    pub type Vector<Real> = Vector2<Real>;

    /// Square matrix with dimension `Dim × Dim`.
    pub type Matrix<Real> = Matrix2<Real>;
}
