//! Transfers of coupling data between the fluid and the immersed solid.
//!
//! Every pass moves the solid to its current configuration for its whole duration, then loops
//! over the cells of the mesh whose records it fills. The per-cell bodies are independent and
//! run on rayon with the `parallel` feature.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::coupling::{DisplacedMesh, FluidCouplingView, SolidCouplingView};
use crate::error::{FsiError, Result};
use crate::fe::{CellValues, DofHandler, FaceValues, GridInterpolator};
use crate::geometry::{Mesh, PointLocator};
use crate::helper;
use crate::math::{Matrix, Real, Vector, DIM, FACES_PER_CELL};
use crate::parameters::{AccelerationDiscrepancy, FsiParameters};

fn check_field(store: &'static str, field: &[Real], dofs: &DofHandler) -> Result<()> {
    if field.len() != dofs.n_dofs() {
        return Err(FsiError::SizeMismatch {
            store,
            expected: dofs.n_dofs(),
            found: field.len(),
        });
    }

    Ok(())
}

fn check_stress_fields(stress: &[Vec<Real>], scalar_dofs: &DofHandler) -> Result<()> {
    if stress.len() != DIM * DIM {
        return Err(FsiError::SizeMismatch {
            store: "solid stress components",
            expected: DIM * DIM,
            found: stress.len(),
        });
    }

    stress
        .iter()
        .try_for_each(|component| check_field("solid stress field", component, scalar_dofs))
}

// The fluid quantities at the quadrature points of one cell.
struct FluidCellFields {
    velocities: Vec<Vector<Real>>,
    velocity_increments: Vec<Vector<Real>>,
    velocity_gradients: Vec<Matrix<Real>>,
    pressures: Vec<Real>,
}

impl FluidCellFields {
    fn new(
        values: &CellValues,
        mesh: &Mesh,
        dofs: &DofHandler,
        present_solution: &[Real],
        solution_increment: &[Real],
    ) -> Self {
        Self {
            velocities: values.vector_values(mesh, dofs, present_solution, 0),
            velocity_increments: values.vector_values(mesh, dofs, solution_increment, 0),
            velocity_gradients: values.vector_gradients(mesh, dofs, present_solution, 0),
            pressures: values.function_values(mesh, dofs, present_solution, DIM),
        }
    }

    fn material_acceleration(&self, q: usize, dt: Real) -> Vector<Real> {
        self.velocity_increments[q] / dt + self.velocity_gradients[q] * self.velocities[q]
    }
}

/// Updates the fluid records from the current state of the solid.
///
/// Every fluid quadrature point is classified as inside or outside of the displaced solid.
/// Points outside get zero sources. Points inside get the acceleration discrepancy selected by
/// `params.acceleration_discrepancy` and the stress discrepancy
/// `-p I + μ sym(∇v) - σ_solid`, where the solid stress is interpolated at the point.
///
/// Returns the number of fluid quadrature points inside the solid.
pub fn find_fluid_bc(
    fluid: FluidCouplingView,
    solid: SolidCouplingView,
    params: &FsiParameters,
    dt: Real,
) -> Result<usize> {
    let FluidCouplingView {
        mesh: fluid_mesh,
        dofs: fluid_dofs,
        quadrature,
        present_solution,
        solution_increment,
        records,
    } = fluid;
    let SolidCouplingView {
        mesh: solid_mesh,
        dofs: solid_dofs,
        scalar_dofs,
        displacement,
        acceleration,
        stress,
        ..
    } = solid;

    let nq = quadrature.size();
    records.check_size("fluid records", fluid_mesh.n_active_cells(), nq)?;
    check_field("fluid solution", present_solution, fluid_dofs)?;
    check_field("fluid solution increment", solution_increment, fluid_dofs)?;
    check_field("solid acceleration", acceleration, solid_dofs)?;
    check_stress_fields(stress, scalar_dofs)?;

    let solid_mesh = DisplacedMesh::new(solid_mesh, solid_dofs, displacement)?;
    let solid_locator = PointLocator::new(&solid_mesh);
    let active_cells = fluid_mesh.active_cell_indices();

    let nimmersed = par_chunks_mut!(records.as_mut_slice(), nq)
        .enumerate()
        .map(|(active_index, cell_records)| {
            let mut values = CellValues::new(quadrature);
            values.reinit(fluid_mesh, active_cells[active_index]);
            let mut fields = None;
            let mut nimmersed = 0;

            for (q, record) in cell_records.iter_mut().enumerate() {
                let point = values.quadrature_point(q);
                let solid_at_q = match GridInterpolator::new(&solid_locator, point) {
                    Some(interpolator) => interpolator,
                    None => {
                        record.reset(false);
                        continue;
                    }
                };

                record.reset(true);
                nimmersed += 1;

                let fluid_at_q = fields.get_or_insert_with(|| {
                    FluidCellFields::new(
                        &values,
                        fluid_mesh,
                        fluid_dofs,
                        present_solution,
                        solution_increment,
                    )
                });

                let solid_acceleration = solid_at_q.vector_value(solid_dofs, acceleration, 0);
                let fluid_acceleration = match params.acceleration_discrepancy {
                    AccelerationDiscrepancy::BodyForce => params.gravity,
                    AccelerationDiscrepancy::MaterialDerivative => {
                        fluid_at_q.material_acceleration(q, dt)
                    }
                };
                record.fsi_acceleration = fluid_acceleration - solid_acceleration;

                let components: Vec<_> = stress
                    .iter()
                    .map(|component| solid_at_q.component_value(scalar_dofs, component, 0))
                    .collect();
                let solid_stress = helper::symmetrize(&helper::tensor_from_components(&components));
                let fluid_stress = helper::fluid_stress(
                    fluid_at_q.pressures[q],
                    params.viscosity,
                    &fluid_at_q.velocity_gradients[q],
                );
                record.fsi_stress = fluid_stress - solid_stress;
            }

            nimmersed
        })
        .sum();

    Ok(nimmersed)
}

/// Updates the solid records with the traction the fluid exerts on the solid boundary.
///
/// Faces on the boundary of the solid mesh get `(-p I + μ sym(∇v)) n` at each face quadrature
/// point, the fluid fields being interpolated at the displaced location of the point. Faces
/// tagged with a Dirichlet boundary id, and interior faces, get zero traction.
///
/// Returns the number of face quadrature points that received a traction. Fails with
/// [`FsiError::GeometricInconsistency`] if a boundary point of the solid is outside of the fluid
/// mesh.
pub fn find_solid_bc(
    fluid: FluidCouplingView,
    solid: SolidCouplingView,
    params: &FsiParameters,
) -> Result<usize> {
    let FluidCouplingView {
        mesh: fluid_mesh,
        dofs: fluid_dofs,
        present_solution,
        ..
    } = fluid;
    let SolidCouplingView {
        mesh: solid_mesh,
        dofs: solid_dofs,
        displacement,
        face_quadrature,
        dirichlet_boundaries,
        records,
        ..
    } = solid;

    let nfq = face_quadrature.size();
    records.check_size(
        "solid records",
        solid_mesh.n_active_cells(),
        FACES_PER_CELL * nfq,
    )?;
    check_field("fluid solution", present_solution, fluid_dofs)?;
    records.reset();

    let solid_mesh = DisplacedMesh::new(solid_mesh, solid_dofs, displacement)?;
    let fluid_locator = PointLocator::new(fluid_mesh);
    let active_cells = solid_mesh.active_cell_indices();

    par_chunks_mut!(records.as_mut_slice(), FACES_PER_CELL * nfq)
        .enumerate()
        .map(|(active_index, cell_records)| -> Result<usize> {
            let cell = active_cells[active_index];
            let mut face_values = FaceValues::new(face_quadrature);
            let mut ntraction = 0;

            for face in 0..FACES_PER_CELL {
                match solid_mesh.cell(cell).boundary_id(face) {
                    Some(id) if !dirichlet_boundaries.contains(&id) => {}
                    _ => continue,
                }

                face_values.reinit(&solid_mesh, cell, face);

                for q in 0..nfq {
                    let point = face_values.quadrature_point(q);
                    let fluid_at_q = GridInterpolator::new(&fluid_locator, point).ok_or(
                        FsiError::GeometricInconsistency {
                            mesh: "fluid",
                            point: *point,
                        },
                    )?;

                    let pressure = fluid_at_q.component_value(fluid_dofs, present_solution, DIM);
                    let gradient = fluid_at_q.vector_gradient(fluid_dofs, present_solution, 0);
                    let stress = helper::fluid_stress(pressure, params.viscosity, &gradient);
                    cell_records[face * nfq + q].fsi_traction = stress * face_values.normal_vector(q);
                    ntraction += 1;
                }
            }

            Ok(ntraction)
        })
        .sum()
}

/// Marks whole fluid cells as inside or outside of the solid.
///
/// A cell is inside iff all its vertices are inside the displaced solid; all the records of the
/// cell then get the same indicator, and zero sources. This classification is conservative:
/// it never marks a cell whose quadrature points are all outside of a convex solid.
///
/// Returns the number of fluid cells inside the solid.
pub fn update_indicator(fluid: FluidCouplingView, solid: SolidCouplingView) -> Result<usize> {
    let FluidCouplingView {
        mesh: fluid_mesh,
        quadrature,
        records,
        ..
    } = fluid;
    let SolidCouplingView {
        mesh: solid_mesh,
        dofs: solid_dofs,
        displacement,
        ..
    } = solid;

    let nq = quadrature.size();
    records.check_size("fluid records", fluid_mesh.n_active_cells(), nq)?;

    let solid_mesh = DisplacedMesh::new(solid_mesh, solid_dofs, displacement)?;
    let solid_locator = PointLocator::new(&solid_mesh);
    let active_cells = fluid_mesh.active_cell_indices();

    let ninside = par_chunks_mut!(records.as_mut_slice(), nq)
        .enumerate()
        .map(|(active_index, cell_records)| {
            let is_solid = fluid_mesh
                .cell(active_cells[active_index])
                .vertices()
                .iter()
                .all(|v| solid_locator.contains(&fluid_mesh.vertices()[*v]));

            cell_records.iter_mut().for_each(|r| r.reset(is_solid));
            is_solid as usize
        })
        .sum();

    Ok(ninside)
}

/// Advects the solid vertices with the fluid velocity: `u ← u + v_fluid Δt`.
///
/// The fluid velocity is interpolated at the displaced location of every distinct solid vertex.
/// Fails with [`FsiError::GeometricInconsistency`] if a solid vertex is outside of the fluid
/// mesh, in which case the displacement is left untouched.
pub fn update_solid_displacement(
    fluid: FluidCouplingView,
    solid: SolidCouplingView,
    dt: Real,
) -> Result<()> {
    let FluidCouplingView {
        mesh: fluid_mesh,
        dofs: fluid_dofs,
        present_solution,
        ..
    } = fluid;
    let SolidCouplingView {
        mesh: solid_mesh,
        dofs: solid_dofs,
        displacement,
        ..
    } = solid;

    check_field("fluid solution", present_solution, fluid_dofs)?;

    let increments = {
        let solid_mesh = DisplacedMesh::new(solid_mesh, solid_dofs, displacement)?;
        let fluid_locator = PointLocator::new(fluid_mesh);

        par_iter!(solid_dofs.slot_vertices())
            .map(|v| -> Result<Vector<Real>> {
                let point = &solid_mesh.vertices()[*v];
                let fluid_at_v = GridInterpolator::new(&fluid_locator, point).ok_or(
                    FsiError::GeometricInconsistency {
                        mesh: "fluid",
                        point: *point,
                    },
                )?;
                Ok(fluid_at_v.vector_value(fluid_dofs, present_solution, 0) * dt)
            })
            .collect::<Result<Vec<_>>>()?
    };

    let nslots = solid_dofs.n_vertex_slots();
    for (slot, increment) in increments.iter().enumerate() {
        for d in 0..DIM {
            displacement[d * nslots + slot] += increment[d];
        }
    }

    Ok(())
}
