use crate::counters::Counters;
use crate::coupling::{self, FluidSolver, SolidSolver};
use crate::error::Result;
use crate::parameters::FsiParameters;
use crate::TimestepManager;

/// The coupled simulation of a fluid and an immersed solid.
///
/// Each step is explicit and partitioned: the solid is advanced under the traction of the last
/// known fluid state, then the fluid is advanced with the sources of the just updated solid.
pub struct FsiWorld<F: FluidSolver, S: SolidSolver> {
    /// Performance counters of the last coupling step.
    pub counters: Counters,
    fluid: F,
    solid: S,
    params: FsiParameters,
    time: TimestepManager,
    first_step: bool,
    initialized: bool,
}

impl<F: FluidSolver, S: SolidSolver> FsiWorld<F, S> {
    /// Couples `fluid` and `solid` with the given parameters.
    ///
    /// Fails with [`crate::FsiError::InvalidParameters`] if the parameters are not usable.
    pub fn new(fluid: F, solid: S, params: FsiParameters) -> Result<Self> {
        params.validate()?;

        let time = TimestepManager::new(
            params.end_time,
            params.time_step,
            params.output_interval,
            params.refinement_interval,
            params.save_interval,
        );

        Ok(Self {
            counters: Counters::new(),
            fluid,
            solid,
            params,
            time,
            first_step: true,
            initialized: false,
        })
    }

    /// Refines both meshes to their base level and sets up both solvers.
    ///
    /// This is done automatically by the first call to [`FsiWorld::run`] or [`FsiWorld::step`].
    pub fn initialize(&mut self) {
        let refinements = self.params.global_refinements;

        self.solid.mesh_mut().refine_global(refinements.solid);
        self.solid.setup_dofs();
        self.solid.initialize_system();

        self.fluid.mesh_mut().refine_global(refinements.fluid);
        self.fluid.setup_dofs();
        self.fluid.make_constraints();
        self.fluid.initialize_system();

        log::info!(
            "Number of fluid active cells and dofs: [{}, {}]",
            self.fluid.mesh().n_active_cells(),
            self.fluid.dof_handler().n_dofs()
        );
        log::info!(
            "Number of solid active cells and dofs: [{}, {}]",
            self.solid.mesh().n_active_cells(),
            self.solid.dof_handler().n_dofs()
        );

        self.initialized = true;
    }

    /// Runs the simulation until the end time is reached.
    pub fn run(&mut self) -> Result<()> {
        if !self.initialized {
            self.initialize();
        }

        while !self.time.is_done() {
            self.step()?;
        }

        log::info!(
            "Simulation finished after {} steps at t = {}.",
            self.time.get_timestep(),
            self.time.current()
        );

        Ok(())
    }

    /// Performs one coupling step.
    pub fn step(&mut self) -> Result<()> {
        if !self.initialized {
            self.initialize();
        }

        self.counters.reset();
        self.counters.step_time.start();

        self.counters.stages.coupling_time.resume();
        self.counters.coupling.solid_bc_time.resume();
        self.counters.coupling.ntraction_points = coupling::find_solid_bc(
            self.fluid.coupling_view(),
            self.solid.coupling_view(),
            &self.params,
        )?;
        self.counters.coupling.solid_bc_time.pause();
        self.counters.stages.coupling_time.pause();

        self.counters.stages.solid_solve_time.resume();
        self.solid.run_one_step(self.first_step)?;
        self.counters.stages.solid_solve_time.pause();

        self.counters.stages.coupling_time.resume();
        self.counters.coupling.fluid_bc_time.resume();
        self.counters.coupling.nimmersed_points = coupling::find_fluid_bc(
            self.fluid.coupling_view(),
            self.solid.coupling_view(),
            &self.params,
            self.time.get_delta_t(),
        )?;
        self.counters.coupling.fluid_bc_time.pause();
        self.counters.stages.coupling_time.pause();

        self.counters.stages.fluid_solve_time.resume();
        self.fluid.run_one_step(self.first_step)?;
        self.counters.stages.fluid_solve_time.pause();

        self.first_step = false;
        self.time.increment();

        if self.time.time_to_refine() {
            self.counters.stages.remesh_time.resume();
            let min_level = self.params.global_refinements.fluid;
            let max_level = min_level + self.params.max_refinement_offset;
            coupling::refine_mesh(
                &mut self.fluid,
                &mut self.solid,
                &self.params,
                min_level,
                max_level,
            )?;
            self.counters.stages.remesh_time.pause();
        }

        self.counters.nsteps += 1;
        self.counters.step_time.pause();

        log::debug!(
            "Step {} done, t = {}: {} immersed fluid points, {} loaded solid points.",
            self.time.get_timestep(),
            self.time.current(),
            self.counters.coupling.nimmersed_points,
            self.counters.coupling.ntraction_points
        );

        Ok(())
    }

    /// Marks whole fluid cells inside the solid, see [`coupling::update_indicator`].
    ///
    /// Returns the number of fluid cells inside the solid.
    pub fn update_indicator(&mut self) -> Result<usize> {
        coupling::update_indicator(self.fluid.coupling_view(), self.solid.coupling_view())
    }

    /// Advects the solid with the fluid velocity, see [`coupling::update_solid_displacement`].
    pub fn update_solid_displacement(&mut self) -> Result<()> {
        coupling::update_solid_displacement(
            self.fluid.coupling_view(),
            self.solid.coupling_view(),
            self.time.get_delta_t(),
        )
    }

    /// The simulation clock.
    pub fn time(&self) -> &TimestepManager {
        &self.time
    }

    /// The simulation parameters.
    pub fn parameters(&self) -> &FsiParameters {
        &self.params
    }

    /// The fluid solver.
    pub fn fluid(&self) -> &F {
        &self.fluid
    }

    /// The mutable fluid solver.
    pub fn fluid_mut(&mut self) -> &mut F {
        &mut self.fluid
    }

    /// The solid solver.
    pub fn solid(&self) -> &S {
        &self.solid
    }

    /// The mutable solid solver.
    pub fn solid_mut(&mut self) -> &mut S {
        &mut self.solid
    }

    /// Gives the solvers back.
    pub fn into_solvers(self) -> (F, S) {
        (self.fluid, self.solid)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fe::{FaceQuadrature, Quadrature};
    use crate::math::{Matrix, Real, Vector};
    use crate::parameters::GlobalRefinements;
    use crate::testing::{self, PrescribedFluid, PrescribedSolid};
    use crate::FsiError;

    fn world(params: FsiParameters) -> FsiWorld<PrescribedFluid, PrescribedSolid> {
        let fluid = PrescribedFluid::new(testing::unit_box(2), Quadrature::gauss(2));
        let solid = PrescribedSolid::new(testing::block(0.4, 0.6, 1), FaceQuadrature::gauss(2));
        FsiWorld::new(fluid, solid, params).unwrap()
    }

    fn params(end_time: Real, time_step: Real) -> FsiParameters {
        FsiParameters {
            end_time,
            time_step,
            refinement_interval: 1.0e3,
            global_refinements: GlobalRefinements { fluid: 2, solid: 1 },
            ..FsiParameters::default()
        }
    }

    #[test]
    fn loop_runs_ceil_end_time_over_time_step_iterations() {
        let mut world = world(params(0.1, 0.03));
        world.run().unwrap();

        assert_eq!(world.time().get_timestep(), 4);
        assert_eq!(world.fluid().first_steps, vec![true, false, false, false]);
        assert_eq!(world.solid().first_steps, vec![true, false, false, false]);
        assert!(world.time().current() - 0.1 < 0.03);
    }

    #[test]
    fn meshes_are_refined_to_their_base_level() {
        let mut world = world(params(0.0, 0.1));
        world.run().unwrap();

        assert_eq!(world.time().get_timestep(), 0);
        assert_eq!(world.fluid().mesh.n_levels(), 3);
        assert_eq!(world.solid().mesh.n_levels(), 2);
        assert_eq!(
            world.fluid().records.len(),
            world.fluid().mesh.n_active_cells() * world.fluid().quadrature.size()
        );
    }

    #[test]
    fn fluid_sees_consistent_immersed_records_at_every_step() {
        let mut world = world(params(0.05, 0.01));
        world.solid_mut().step_displacement = Vector::repeat(0.02);
        world.run().unwrap();

        let fluid = world.fluid();
        assert_eq!(fluid.immersed_per_step.len(), 5);
        assert!(fluid.consistent_per_step.iter().all(|c| *c));
        assert!(fluid.immersed_per_step.iter().all(|n| *n > 0));
    }

    #[test]
    fn solid_is_loaded_by_the_last_known_fluid_state() {
        let mut world = world(params(0.03, 0.01));
        world.fluid_mut().prescribed = Some((Matrix::zeros(), 1.0, 0.0));
        world.run().unwrap();

        // The fluid is at rest with zero pressure until its first step.
        let loaded = &world.solid().loaded_per_step;
        assert_eq!(loaded[0], 0);
        assert!(loaded[1] > 0);
        assert_eq!(loaded[1], loaded[2]);
        assert_eq!(world.counters.coupling.ntraction_points, loaded[2]);
    }

    #[test]
    fn remeshing_keeps_the_records_consistent() {
        let mut world = world(FsiParameters {
            refinement_interval: 0.02,
            refinement_proximity: 0.2,
            ..params(0.06, 0.01)
        });
        world.solid_mut().step_displacement = Vector::repeat(0.01);
        world.run().unwrap();

        let fluid = world.fluid();
        assert_eq!(fluid.n_setup_calls, 4);
        assert!(fluid.mesh.n_levels() > 3);
        assert!(fluid.mesh.n_levels() <= 5);
        assert!(fluid.consistent_per_step.iter().all(|c| *c));
        assert!(fluid
            .records
            .check_size("fluid records", fluid.mesh.n_active_cells(), fluid.quadrature.size())
            .is_ok());
    }

    #[test]
    fn solver_failures_are_propagated() {
        let mut world = world(params(1.0, 0.1));
        world.fluid_mut().fail_at_step = Some(2);

        match world.run() {
            Err(FsiError::NonConvergence { solver, .. }) => assert_eq!(solver, "fluid"),
            other => panic!("Unexpected result: {:?}", other),
        }
        assert_eq!(world.time().get_timestep(), 2);
    }

    #[test]
    fn solid_leaving_the_fluid_aborts_the_run() {
        let mut world = world(params(1.0, 0.1));
        world.solid_mut().step_displacement = Vector::repeat(0.25);

        assert!(matches!(
            world.run(),
            Err(FsiError::GeometricInconsistency { mesh: "fluid", .. })
        ));
        assert!(world.time().get_timestep() < 10);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let fluid = PrescribedFluid::new(testing::unit_box(1), Quadrature::gauss(2));
        let solid = PrescribedSolid::new(testing::block(0.4, 0.6, 1), FaceQuadrature::gauss(2));

        assert!(matches!(
            FsiWorld::new(fluid, solid, params(1.0, -0.1)),
            Err(FsiError::InvalidParameters(_))
        ));
    }
}
