use std::ops::Deref;

use crate::error::{FsiError, Result};
use crate::fe::DofHandler;
use crate::geometry::Mesh;
use crate::math::{Real, Vector, DIM};

/// The shift of every distinct vertex carrying degrees of freedom of `displacement`.
///
/// `dofs` must number a field with at least `DIM` components, the first `DIM` of them being
/// the displacement.
pub fn vertex_shifts(dofs: &DofHandler, displacement: &[Real]) -> Result<Vec<(usize, Vector<Real>)>> {
    if displacement.len() != dofs.n_dofs() || dofs.n_components() < DIM {
        return Err(FsiError::SizeMismatch {
            store: "displacement field",
            expected: dofs.n_dofs(),
            found: displacement.len(),
        });
    }

    let nslots = dofs.n_vertex_slots();
    // Slots are unique per vertex, so each vertex gets exactly one shift.
    Ok(dofs
        .slot_vertices()
        .iter()
        .enumerate()
        .map(|(slot, v)| {
            let shift = Vector::from_fn(|d, _| displacement[d * nslots + slot]);
            (*v, shift)
        })
        .collect())
}

fn shift_vertices(mesh: &mut Mesh, shifts: &[(usize, Vector<Real>)], forward: bool) {
    let vertices = mesh.vertices_mut();

    for (v, shift) in shifts {
        if forward {
            vertices[*v] += shift;
        } else {
            vertices[*v] -= shift;
        }
    }
}

/// Moves every distinct vertex of `mesh` by `+displacement` if `forward`, else by
/// `-displacement`.
///
/// Prefer [`DisplacedMesh`], which cannot forget to move the vertices back.
pub fn apply_displacement(
    mesh: &mut Mesh,
    dofs: &DofHandler,
    displacement: &[Real],
    forward: bool,
) -> Result<()> {
    let shifts = vertex_shifts(dofs, displacement)?;
    shift_vertices(mesh, &shifts, forward);
    Ok(())
}

/// A mesh moved to its current configuration for the lifetime of this guard.
///
/// The vertex shifts are recorded at construction and undone when the guard is dropped, which
/// happens on every exit path of the enclosing scope, including `?` and panics.
pub struct DisplacedMesh<'a> {
    mesh: &'a mut Mesh,
    shifts: Vec<(usize, Vector<Real>)>,
}

impl<'a> DisplacedMesh<'a> {
    /// Moves `mesh` forward by the displacement field `displacement` numbered by `dofs`.
    pub fn new(mesh: &'a mut Mesh, dofs: &DofHandler, displacement: &[Real]) -> Result<Self> {
        let shifts = vertex_shifts(dofs, displacement)?;
        shift_vertices(mesh, &shifts, true);
        Ok(Self { mesh, shifts })
    }
}

impl<'a> Deref for DisplacedMesh<'a> {
    type Target = Mesh;

    #[inline]
    fn deref(&self) -> &Mesh {
        self.mesh
    }
}

impl<'a> Drop for DisplacedMesh<'a> {
    fn drop(&mut self) {
        shift_vertices(self.mesh, &self.shifts, false);
    }
}
