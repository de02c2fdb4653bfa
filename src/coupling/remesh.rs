//! Adaptation of the fluid mesh to the position of the solid.

use crate::coupling::{DisplacedMesh, FluidSolver, SolidSolver};
use crate::error::{FsiError, Result};
use crate::fe::{DofHandler, GridInterpolator};
use crate::geometry::{Mesh, PointLocator};
use crate::helper;
use crate::math::{Point, Real};
use crate::parameters::FsiParameters;

/// Flags the active fluid cells close to the solid for refinement, and the others for
/// coarsening.
///
/// A fluid cell is close when its center is closer than `proximity` to the center of a solid
/// cell. Refinement flags are then cleared on cells at level `max_level` or finer, and
/// coarsening flags on cells at level `min_level` or coarser.
pub fn flag_cells(
    fluid_mesh: &mut Mesh,
    solid_centers: &[Point<Real>],
    proximity: Real,
    min_level: u32,
    max_level: u32,
) {
    let proximity_sq = proximity * proximity;

    for i in 0..fluid_mesh.n_active_cells() {
        let cell = fluid_mesh.active_cell_indices()[i];
        let center = fluid_mesh.cell_center(cell);
        let close = helper::min_distance_squared(&center, solid_centers)
            .map_or(false, |dist_sq| dist_sq < proximity_sq);

        if close {
            fluid_mesh.set_refine_flag(cell);
        } else {
            fluid_mesh.set_coarsen_flag(cell);
        }

        let level = fluid_mesh.cell(cell).level();

        if level >= max_level {
            fluid_mesh.clear_refine_flag(cell);
        }

        if level <= min_level {
            fluid_mesh.clear_coarsen_flag(cell);
        }
    }
}

/// Transfers a vertex-based field from an old mesh to a new one.
///
/// Values at vertices used by both meshes are copied. Values at the other vertices of the new
/// mesh are interpolated from the old mesh.
pub fn transfer_solution(
    old_mesh: &Mesh,
    old_dofs: &DofHandler,
    old_solution: &[Real],
    new_mesh: &Mesh,
    new_dofs: &DofHandler,
) -> Result<Vec<Real>> {
    let ncomponents = new_dofs.n_components();
    let nslots = new_dofs.n_vertex_slots();
    let old_locator = PointLocator::new(old_mesh);
    let mut result = vec![0.0; new_dofs.n_dofs()];
    let mut ninterpolated = 0;

    for (slot, v) in new_dofs.slot_vertices().iter().enumerate() {
        if old_dofs.vertex_slot(*v).is_some() {
            for c in 0..ncomponents {
                if let Some(old_dof) = old_dofs.vertex_dof_index(*v, c) {
                    result[c * nslots + slot] = old_solution[old_dof];
                }
            }
        } else {
            let point = new_mesh.vertices()[*v];
            let interpolator = GridInterpolator::new(&old_locator, &point).ok_or(
                FsiError::GeometricInconsistency {
                    mesh: "previous fluid",
                    point,
                },
            )?;

            for c in 0..ncomponents {
                result[c * nslots + slot] = interpolator.component_value(old_dofs, old_solution, c);
            }
            ninterpolated += 1;
        }
    }

    log::trace!(
        "Solution transfer: {} vertices copied, {} vertices interpolated.",
        nslots - ninterpolated,
        ninterpolated
    );

    Ok(result)
}

/// Refines the fluid mesh around the solid and coarsens it elsewhere.
///
/// Cells are flagged with [`flag_cells`] against the cell centers of the displaced solid. After
/// the mesh adaptation, the fluid re-derives its degrees of freedom, constraints, and system
/// storage; its present solution is transferred to the new mesh with [`transfer_solution`]
/// before the constraints are distributed.
pub fn refine_mesh<F: FluidSolver + ?Sized, S: SolidSolver + ?Sized>(
    fluid: &mut F,
    solid: &mut S,
    params: &FsiParameters,
    min_level: u32,
    max_level: u32,
) -> Result<()> {
    let solid_centers: Vec<_> = {
        let view = solid.coupling_view();
        let solid_mesh = DisplacedMesh::new(view.mesh, view.dofs, view.displacement)?;
        solid_mesh
            .active_cell_indices()
            .iter()
            .map(|c| solid_mesh.cell_center(*c))
            .collect()
    };

    flag_cells(
        fluid.mesh_mut(),
        &solid_centers,
        params.refinement_proximity,
        min_level,
        max_level,
    );

    let old_mesh = fluid.mesh().clone();
    let old_dofs = fluid.dof_handler().clone();
    let old_solution = fluid.present_solution().to_vec();

    fluid.mesh_mut().execute_coarsening_and_refinement();
    fluid.setup_dofs();
    fluid.make_constraints();
    fluid.initialize_system();

    let solution = transfer_solution(
        &old_mesh,
        &old_dofs,
        &old_solution,
        fluid.mesh(),
        fluid.dof_handler(),
    )?;
    fluid.set_present_solution(solution);
    fluid.distribute_constraints();

    let view = fluid.coupling_view();
    view.records
        .check_size("fluid records", view.mesh.n_active_cells(), view.quadrature.size())?;

    log::debug!(
        "Fluid mesh adapted: {} -> {} active cells, {} -> {} dofs.",
        old_mesh.n_active_cells(),
        view.mesh.n_active_cells(),
        old_dofs.n_dofs(),
        view.dofs.n_dofs()
    );

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fe::{point_value, FaceQuadrature, Quadrature};
    use crate::math::{Matrix, Vector, DIM};
    use crate::testing::{self, PrescribedFluid, PrescribedSolid};
    use approx::assert_relative_eq;

    fn setup() -> (PrescribedFluid, PrescribedSolid) {
        let mut fluid = PrescribedFluid::new(testing::unit_box(4), Quadrature::gauss(2));
        fluid.setup();
        let mut solid =
            PrescribedSolid::new(testing::block(0.4, 0.6, 1), FaceQuadrature::gauss(2));
        solid.setup();
        (fluid, solid)
    }

    #[test]
    fn cells_near_the_solid_are_refined() {
        let (mut fluid, mut solid) = setup();
        let params = FsiParameters {
            refinement_proximity: 0.25,
            ..FsiParameters::default()
        };

        refine_mesh(&mut fluid, &mut solid, &params, 0, 2).unwrap();

        let solid_center = Point::from(Vector::repeat(0.5));
        for cell in fluid.mesh.active_cell_indices() {
            let level = fluid.mesh.cell(*cell).level();
            let parent_center = fluid
                .mesh
                .cell(*cell)
                .parent()
                .map(|p| fluid.mesh.cell_center(p));

            if level == 1 {
                let parent_center = parent_center.unwrap();
                assert!(na::distance(&parent_center, &solid_center) < 0.25);
            } else {
                assert_eq!(level, 0);
                assert!(na::distance(&fluid.mesh.cell_center(*cell), &solid_center) >= 0.25);
            }
        }

        assert!(fluid.mesh.n_active_cells() > 4usize.pow(DIM as u32));
        assert_eq!(fluid.n_setup_calls, 2);
        assert!(fluid
            .records
            .check_size(
                "fluid records",
                fluid.mesh.n_active_cells(),
                fluid.quadrature.size()
            )
            .is_ok());
    }

    #[test]
    fn refinement_stops_at_the_maximum_level() {
        let (mut fluid, mut solid) = setup();
        let params = FsiParameters {
            refinement_proximity: 0.25,
            ..FsiParameters::default()
        };

        for _ in 0..4 {
            refine_mesh(&mut fluid, &mut solid, &params, 0, 2).unwrap();
        }

        assert_eq!(fluid.mesh.n_levels(), 3);
        for cell in fluid.mesh.active_cell_indices() {
            assert!(fluid.mesh.cell(*cell).level() <= 2);
        }
    }

    #[test]
    fn cells_far_from_the_solid_are_coarsened_down_to_the_minimum_level() {
        let (mut fluid, mut solid) = setup();
        fluid.mesh.refine_global(2);
        fluid.setup();
        let params = FsiParameters {
            refinement_proximity: 0.1,
            ..FsiParameters::default()
        };

        refine_mesh(&mut fluid, &mut solid, &params, 1, 3).unwrap();

        let corner = PointLocator::new(&fluid.mesh)
            .locate(&Point::from(Vector::repeat(0.01)))
            .unwrap();
        assert_eq!(fluid.mesh.cell(corner.cell).level(), 1);
        for cell in fluid.mesh.active_cell_indices() {
            assert!(fluid.mesh.cell(*cell).level() >= 1);
        }
    }

    #[test]
    fn remeshing_preserves_the_solution() {
        let (mut fluid, mut solid) = setup();
        let a = Matrix::from_fn(|i, j| 0.5 + i as Real - j as Real);
        fluid.set_affine_solution(&a, 1.0, 2.0);
        let params = FsiParameters {
            refinement_proximity: 0.25,
            ..FsiParameters::default()
        };

        let probes: Vec<_> = (0..20)
            .map(|i| Point::from(Vector::from_fn(|d, _| ((i * (5 + 2 * d)) % 19) as Real / 18.0)))
            .collect();
        let sample = |fluid: &PrescribedFluid| -> Vec<_> {
            let locator = PointLocator::new(&fluid.mesh);
            probes
                .iter()
                .map(|p| point_value(&locator, &fluid.dofs, &fluid.present_solution, p).unwrap())
                .collect()
        };
        let before = sample(&fluid);

        refine_mesh(&mut fluid, &mut solid, &params, 0, 2).unwrap();
        refine_mesh(&mut fluid, &mut solid, &params, 0, 2).unwrap();

        // Affine fields are reproduced exactly by Q1 elements, hanging vertices included.
        let after = sample(&fluid);
        for (b, a) in before.iter().zip(after.iter()) {
            assert_relative_eq!(*b, *a, epsilon = 1.0e-10);
        }
    }

    #[test]
    fn copied_and_interpolated_values() {
        let old_mesh = testing::unit_box(1);
        let old_dofs = DofHandler::new(&old_mesh, 1);
        let old_solution: Vec<_> = old_dofs
            .slot_vertices()
            .iter()
            .map(|v| old_mesh.vertices()[*v].coords.sum())
            .collect();

        let mut new_mesh = old_mesh.clone();
        new_mesh.refine_global(1);
        let new_dofs = DofHandler::new(&new_mesh, 1);
        let new_solution =
            transfer_solution(&old_mesh, &old_dofs, &old_solution, &new_mesh, &new_dofs).unwrap();

        for (slot, v) in new_dofs.slot_vertices().iter().enumerate() {
            let expected = new_mesh.vertices()[*v].coords.sum();
            assert_relative_eq!(new_solution[slot], expected, epsilon = 1.0e-12);
        }
    }
}
