//! Meshes and geometric queries on them.

pub use self::cell_grid::CellGrid;
pub use self::mesh::{BoundaryId, Cell, Mesh};
pub use self::point_locator::{CellLocation, PointLocator};

mod cell_grid;
mod mesh;
mod point_locator;
pub mod reference_cell;
