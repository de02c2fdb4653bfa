//! Coupling between a fluid solver and an immersed solid solver.

pub use self::collaborators::{FluidCouplingView, FluidSolver, SolidCouplingView, SolidSolver};
pub use self::mesh_motion::{apply_displacement, vertex_shifts, DisplacedMesh};
pub use self::remesh::{flag_cells, refine_mesh, transfer_solution};
pub use self::transfer::{find_fluid_bc, find_solid_bc, update_indicator, update_solid_displacement};

mod collaborators;
mod mesh_motion;
mod remesh;
mod transfer;
