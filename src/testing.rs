//! Meshes and prescribed-field collaborators shared by the unit tests.

use crate::coupling::{FluidCouplingView, FluidSolver, SolidCouplingView, SolidSolver};
use crate::error::{FsiError, Result};
use crate::fe::{DofHandler, FaceQuadrature, Quadrature};
use crate::geometry::{BoundaryId, Mesh};
use crate::math::{Matrix, Point, Real, Vector, DIM, FACES_PER_CELL};
use crate::storage::{CellDataStorage, FluidPointRecord, SolidPointRecord};

/// `[0, 1]^DIM` split into `n` cells per direction, with colorized boundary ids.
pub fn unit_box(n: usize) -> Mesh {
    block(0.0, 1.0, n)
}

/// `[lo, hi]^DIM` split into `n` cells per direction, with colorized boundary ids.
pub fn block(lo: Real, hi: Real, n: usize) -> Mesh {
    Mesh::hyper_rectangle(
        &Point::from(Vector::repeat(lo)),
        &Point::from(Vector::repeat(hi)),
        [n; DIM],
        true,
    )
}

/// The field with velocity `a x` and pressure `p0 + p_coeff * (x_0 + … + x_{DIM-1})`.
///
/// The pressure is only set if `dofs` has more than `DIM` components.
pub fn interpolate_affine(
    mesh: &Mesh,
    dofs: &DofHandler,
    a: &Matrix<Real>,
    p0: Real,
    p_coeff: Real,
) -> Vec<Real> {
    let mut field = vec![0.0; dofs.n_dofs()];

    for v in dofs.slot_vertices() {
        let x = mesh.vertices()[*v].coords;
        let velocity = a * x;

        for d in 0..DIM {
            field[dofs.vertex_dof_index(*v, d).unwrap()] = velocity[d];
        }

        if dofs.n_components() > DIM {
            field[dofs.vertex_dof_index(*v, DIM).unwrap()] = p0 + p_coeff * x.sum();
        }
    }

    field
}

/// A fluid whose solution is prescribed instead of solved for.
pub struct PrescribedFluid {
    pub mesh: Mesh,
    pub quadrature: Quadrature,
    pub dofs: DofHandler,
    pub present_solution: Vec<Real>,
    pub solution_increment: Vec<Real>,
    pub records: CellDataStorage<FluidPointRecord>,
    /// Velocity gradient, base pressure and pressure slope imposed by every step.
    pub prescribed: Option<(Matrix<Real>, Real, Real)>,
    /// The step (counted from zero) that fails to converge.
    pub fail_at_step: Option<usize>,
    pub n_setup_calls: usize,
    pub first_steps: Vec<bool>,
    /// Number of immersed records seen by each step.
    pub immersed_per_step: Vec<usize>,
    /// Whether all the records were consistent at each step.
    pub consistent_per_step: Vec<bool>,
}

impl PrescribedFluid {
    pub fn new(mesh: Mesh, quadrature: Quadrature) -> Self {
        let dofs = DofHandler::new(&mesh, DIM + 1);
        Self {
            mesh,
            quadrature,
            dofs,
            present_solution: Vec::new(),
            solution_increment: Vec::new(),
            records: CellDataStorage::new(),
            prescribed: None,
            fail_at_step: None,
            n_setup_calls: 0,
            first_steps: Vec::new(),
            immersed_per_step: Vec::new(),
            consistent_per_step: Vec::new(),
        }
    }

    pub fn setup(&mut self) {
        self.setup_dofs();
        self.make_constraints();
        self.initialize_system();
    }

    pub fn view(&mut self) -> FluidCouplingView<'_> {
        self.coupling_view()
    }

    pub fn set_affine_solution(&mut self, a: &Matrix<Real>, p0: Real, p_coeff: Real) {
        self.present_solution = interpolate_affine(&self.mesh, &self.dofs, a, p0, p_coeff);
    }

    pub fn set_uniform_velocity(&mut self, velocity: Vector<Real>) {
        let nslots = self.dofs.n_vertex_slots();
        self.present_solution = vec![0.0; self.dofs.n_dofs()];
        for d in 0..DIM {
            self.present_solution[d * nslots..(d + 1) * nslots].fill(velocity[d]);
        }
    }
}

impl FluidSolver for PrescribedFluid {
    fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    fn mesh_mut(&mut self) -> &mut Mesh {
        &mut self.mesh
    }

    fn dof_handler(&self) -> &DofHandler {
        &self.dofs
    }

    fn present_solution(&self) -> &[Real] {
        &self.present_solution
    }

    fn set_present_solution(&mut self, solution: Vec<Real>) {
        self.present_solution = solution;
    }

    fn coupling_view(&mut self) -> FluidCouplingView<'_> {
        FluidCouplingView {
            mesh: &self.mesh,
            dofs: &self.dofs,
            quadrature: &self.quadrature,
            present_solution: &self.present_solution,
            solution_increment: &self.solution_increment,
            records: &mut self.records,
        }
    }

    fn setup_dofs(&mut self) {
        self.dofs = DofHandler::new(&self.mesh, DIM + 1);
        self.n_setup_calls += 1;
    }

    fn make_constraints(&mut self) {}

    fn initialize_system(&mut self) {
        self.present_solution = vec![0.0; self.dofs.n_dofs()];
        self.solution_increment = vec![0.0; self.dofs.n_dofs()];
        self.records
            .initialize(self.mesh.n_active_cells(), self.quadrature.size());
    }

    fn distribute_constraints(&mut self) {}

    fn run_one_step(&mut self, first_step: bool) -> Result<()> {
        if self.fail_at_step == Some(self.first_steps.len()) {
            return Err(FsiError::non_convergence(
                "fluid",
                "the prescribed fluid was told to fail",
            ));
        }

        self.first_steps.push(first_step);
        let records = self.records.as_slice();
        self.immersed_per_step
            .push(records.iter().filter(|r| r.indicator).count());
        self.consistent_per_step
            .push(records.iter().all(FluidPointRecord::is_consistent));

        if let Some((a, p0, p_coeff)) = self.prescribed {
            let previous = std::mem::take(&mut self.present_solution);
            self.set_affine_solution(&a, p0, p_coeff);
            self.solution_increment = self
                .present_solution
                .iter()
                .zip(previous.iter())
                .map(|(new, old)| new - old)
                .collect();
        }

        Ok(())
    }
}

/// A solid translated at a prescribed velocity instead of solved for.
pub struct PrescribedSolid {
    pub mesh: Mesh,
    pub face_quadrature: FaceQuadrature,
    pub dofs: DofHandler,
    pub scalar_dofs: DofHandler,
    pub displacement: Vec<Real>,
    pub acceleration: Vec<Real>,
    pub stress: Vec<Vec<Real>>,
    pub dirichlet_boundaries: Vec<BoundaryId>,
    pub records: CellDataStorage<SolidPointRecord>,
    /// Displacement added by every step.
    pub step_displacement: Vector<Real>,
    pub first_steps: Vec<bool>,
    /// Number of records with a non-zero traction seen by each step.
    pub loaded_per_step: Vec<usize>,
}

impl PrescribedSolid {
    pub fn new(mesh: Mesh, face_quadrature: FaceQuadrature) -> Self {
        let dofs = DofHandler::new(&mesh, DIM);
        let scalar_dofs = DofHandler::new(&mesh, 1);
        Self {
            mesh,
            face_quadrature,
            dofs,
            scalar_dofs,
            displacement: Vec::new(),
            acceleration: Vec::new(),
            stress: Vec::new(),
            dirichlet_boundaries: Vec::new(),
            records: CellDataStorage::new(),
            step_displacement: Vector::zeros(),
            first_steps: Vec::new(),
            loaded_per_step: Vec::new(),
        }
    }

    pub fn setup(&mut self) {
        self.setup_dofs();
        self.initialize_system();
    }

    pub fn view(&mut self) -> SolidCouplingView<'_> {
        self.coupling_view()
    }

    fn uniform_vector_field(&self, value: Vector<Real>) -> Vec<Real> {
        let nslots = self.dofs.n_vertex_slots();
        let mut field = vec![0.0; self.dofs.n_dofs()];
        for d in 0..DIM {
            field[d * nslots..(d + 1) * nslots].fill(value[d]);
        }
        field
    }

    pub fn set_uniform_displacement(&mut self, displacement: Vector<Real>) {
        self.displacement = self.uniform_vector_field(displacement);
    }

    pub fn set_uniform_acceleration(&mut self, acceleration: Vector<Real>) {
        self.acceleration = self.uniform_vector_field(acceleration);
    }

    pub fn set_uniform_stress(&mut self, stress: &Matrix<Real>) {
        let n = self.scalar_dofs.n_dofs();
        self.stress = (0..DIM * DIM)
            .map(|k| vec![stress[(k / DIM, k % DIM)]; n])
            .collect();
    }
}

impl SolidSolver for PrescribedSolid {
    fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    fn mesh_mut(&mut self) -> &mut Mesh {
        &mut self.mesh
    }

    fn dof_handler(&self) -> &DofHandler {
        &self.dofs
    }

    fn coupling_view(&mut self) -> SolidCouplingView<'_> {
        SolidCouplingView {
            mesh: &mut self.mesh,
            dofs: &self.dofs,
            scalar_dofs: &self.scalar_dofs,
            displacement: &mut self.displacement,
            acceleration: &self.acceleration,
            stress: &self.stress,
            face_quadrature: &self.face_quadrature,
            dirichlet_boundaries: &self.dirichlet_boundaries,
            records: &mut self.records,
        }
    }

    fn setup_dofs(&mut self) {
        self.dofs = DofHandler::new(&self.mesh, DIM);
        self.scalar_dofs = DofHandler::new(&self.mesh, 1);
    }

    fn initialize_system(&mut self) {
        self.displacement = vec![0.0; self.dofs.n_dofs()];
        self.acceleration = vec![0.0; self.dofs.n_dofs()];
        self.set_uniform_stress(&Matrix::zeros());
        self.records.initialize(
            self.mesh.n_active_cells(),
            FACES_PER_CELL * self.face_quadrature.size(),
        );
    }

    fn run_one_step(&mut self, first_step: bool) -> Result<()> {
        self.first_steps.push(first_step);
        self.loaded_per_step.push(
            self.records
                .as_slice()
                .iter()
                .filter(|r| r.fsi_traction != Vector::zeros())
                .count(),
        );

        let step = self.uniform_vector_field(self.step_displacement);
        for (u, du) in self.displacement.iter_mut().zip(step) {
            *u += du;
        }

        Ok(())
    }
}
