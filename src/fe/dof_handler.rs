use crate::geometry::Mesh;
use crate::math::VERTICES_PER_CELL;

/// Numbering of the degrees of freedom of a vertex-based (Q1) field with several components.
///
/// Every vertex used by an active cell gets a *slot*; slots are numbered in order of first
/// appearance while iterating through the active cells. Degrees of freedom are blocked by
/// component: the DoF of the component `c` at slot `s` is `c * n_vertex_slots + s`.
///
/// The numbering is a snapshot: it must be redistributed after the mesh topology changes.
#[derive(Clone, Debug, PartialEq)]
pub struct DofHandler {
    n_components: usize,
    vertex_slots: Vec<Option<usize>>,
    slot_vertices: Vec<usize>,
}

impl DofHandler {
    /// Numbers the degrees of freedom of an `n_components`-component field on `mesh`.
    pub fn new(mesh: &Mesh, n_components: usize) -> Self {
        let slot_vertices = mesh.used_vertices();
        let mut vertex_slots = vec![None; mesh.n_vertices()];

        for (slot, v) in slot_vertices.iter().enumerate() {
            vertex_slots[*v] = Some(slot);
        }

        Self {
            n_components,
            vertex_slots,
            slot_vertices,
        }
    }

    /// The number of components of the field.
    #[inline]
    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// The number of vertices carrying degrees of freedom.
    #[inline]
    pub fn n_vertex_slots(&self) -> usize {
        self.slot_vertices.len()
    }

    /// The total number of degrees of freedom.
    #[inline]
    pub fn n_dofs(&self) -> usize {
        self.n_components * self.slot_vertices.len()
    }

    /// The mesh vertex of each slot.
    #[inline]
    pub fn slot_vertices(&self) -> &[usize] {
        &self.slot_vertices
    }

    /// The slot of the mesh vertex `vertex`, if it carries degrees of freedom.
    #[inline]
    pub fn vertex_slot(&self, vertex: usize) -> Option<usize> {
        self.vertex_slots.get(vertex).copied().flatten()
    }

    /// The DoF of the given component at the mesh vertex `vertex`.
    #[inline]
    pub fn vertex_dof_index(&self, vertex: usize, component: usize) -> Option<usize> {
        debug_assert!(component < self.n_components);
        self.vertex_slot(vertex)
            .map(|slot| component * self.slot_vertices.len() + slot)
    }

    /// The DoFs of the given component at the vertices of the active cell `cell`.
    ///
    /// # Panics
    /// Panics if the cell has a vertex without degrees of freedom, i.e., if the cell is not
    /// active in the mesh this numbering was built for.
    pub fn cell_dof_indices(
        &self,
        mesh: &Mesh,
        cell: usize,
        component: usize,
    ) -> [usize; VERTICES_PER_CELL] {
        let vertices = mesh.cell(cell).vertices();
        std::array::from_fn(|v| {
            self.vertex_dof_index(vertices[v], component)
                .expect("The DoF handler is out of date wrt. the mesh.")
        })
    }
}
