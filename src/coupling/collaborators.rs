use crate::error::Result;
use crate::fe::{DofHandler, FaceQuadrature, Quadrature};
use crate::geometry::{BoundaryId, Mesh};
use crate::math::Real;
use crate::storage::{CellDataStorage, FluidPointRecord, SolidPointRecord};

/// What the coupling passes need from a fluid solver, borrowed for the duration of one pass.
pub struct FluidCouplingView<'a> {
    /// The fluid mesh.
    pub mesh: &'a Mesh,
    /// The numbering of the `DIM + 1` (velocity, pressure) components of the fluid field.
    pub dofs: &'a DofHandler,
    /// The cell quadrature used by the fluid assembly.
    pub quadrature: &'a Quadrature,
    /// The present velocity and pressure.
    pub present_solution: &'a [Real],
    /// The change of the solution during the last fluid step.
    pub solution_increment: &'a [Real],
    /// One record per active cell and quadrature point.
    pub records: &'a mut CellDataStorage<FluidPointRecord>,
}

/// What the coupling passes need from a solid solver, borrowed for the duration of one pass.
pub struct SolidCouplingView<'a> {
    /// The solid mesh, in its reference configuration.
    pub mesh: &'a mut Mesh,
    /// The numbering of the `DIM` components of the displacement and acceleration fields.
    pub dofs: &'a DofHandler,
    /// The numbering of the scalar stress fields.
    pub scalar_dofs: &'a DofHandler,
    /// The present displacement.
    pub displacement: &'a mut [Real],
    /// The present acceleration.
    pub acceleration: &'a [Real],
    /// The `DIM × DIM` stress components; `stress[i * DIM + j]` is the component `(i, j)`.
    pub stress: &'a [Vec<Real>],
    /// The face quadrature used by the solid assembly.
    pub face_quadrature: &'a FaceQuadrature,
    /// Boundary ids with a prescribed displacement; no traction is computed on them.
    pub dirichlet_boundaries: &'a [BoundaryId],
    /// One record per active cell, face, and face quadrature point.
    pub records: &'a mut CellDataStorage<SolidPointRecord>,
}

/// Trait that needs to be implemented by the fluid solver coupled to a solid.
///
/// The solver owns its mesh, degrees of freedom, and coupling records. It reads its records
/// during its next assembly after a coupling pass filled them.
pub trait FluidSolver {
    /// The fluid mesh.
    fn mesh(&self) -> &Mesh;
    /// The fluid mesh, for refinement.
    fn mesh_mut(&mut self) -> &mut Mesh;
    /// The numbering of the fluid degrees of freedom.
    fn dof_handler(&self) -> &DofHandler;
    /// The present velocity and pressure.
    fn present_solution(&self) -> &[Real];
    /// Replaces the present solution, e.g., after it was transferred to a new mesh.
    fn set_present_solution(&mut self, solution: Vec<Real>);
    /// Borrows everything a coupling pass needs.
    fn coupling_view(&mut self) -> FluidCouplingView<'_>;

    /// Numbers the degrees of freedom of the current mesh.
    fn setup_dofs(&mut self);
    /// Rebuilds the hanging-node and boundary constraints.
    fn make_constraints(&mut self);
    /// Allocates the system storage and the coupling records.
    fn initialize_system(&mut self);
    /// Makes the present solution satisfy the constraints.
    fn distribute_constraints(&mut self);
    /// Advances the fluid by one time step.
    fn run_one_step(&mut self, first_step: bool) -> Result<()>;
}

/// Trait that needs to be implemented by the solid solver coupled to a fluid.
pub trait SolidSolver {
    /// The solid mesh, in its reference configuration.
    fn mesh(&self) -> &Mesh;
    /// The solid mesh, for refinement.
    fn mesh_mut(&mut self) -> &mut Mesh;
    /// The numbering of the displacement degrees of freedom.
    fn dof_handler(&self) -> &DofHandler;
    /// Borrows everything a coupling pass needs.
    fn coupling_view(&mut self) -> SolidCouplingView<'_>;

    /// Numbers the degrees of freedom of the current mesh.
    fn setup_dofs(&mut self);
    /// Allocates the system storage and the coupling records.
    fn initialize_system(&mut self);
    /// Advances the solid by one time step.
    fn run_one_step(&mut self, first_step: bool) -> Result<()>;
}
