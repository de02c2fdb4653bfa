use crate::geometry::reference_cell::{self, bit};
use crate::math::{
    Point, Real, Vector, CHILDREN_PER_CELL, DIM, FACES_PER_CELL, VERTICES_PER_CELL,
};
use fnv::FnvHashMap;
use itertools::Itertools;

/// The identifier attached to a boundary face.
pub type BoundaryId = u32;

/// A quadrilateral (2D) or hexahedral (3D) cell of a [`Mesh`].
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    vertices: [usize; VERTICES_PER_CELL],
    level: u32,
    parent: Option<usize>,
    children: Option<[usize; CHILDREN_PER_CELL]>,
    boundary: [Option<BoundaryId>; FACES_PER_CELL],
    refine_flag: bool,
    coarsen_flag: bool,
}

impl Cell {
    fn new(vertices: [usize; VERTICES_PER_CELL], level: u32, parent: Option<usize>) -> Self {
        Self {
            vertices,
            level,
            parent,
            children: None,
            boundary: [None; FACES_PER_CELL],
            refine_flag: false,
            coarsen_flag: false,
        }
    }

    /// The global indices of the vertices of this cell.
    #[inline]
    pub fn vertices(&self) -> &[usize; VERTICES_PER_CELL] {
        &self.vertices
    }

    /// The refinement level of this cell, zero for coarse cells.
    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// The cell this one was created from by refinement.
    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// The children of this cell, if it has been refined.
    #[inline]
    pub fn children(&self) -> Option<&[usize; CHILDREN_PER_CELL]> {
        self.children.as_ref()
    }

    /// Is this cell a leaf of the refinement hierarchy?
    #[inline]
    pub fn is_active(&self) -> bool {
        self.children.is_none()
    }

    /// Does the given face lie on the boundary of the domain?
    #[inline]
    pub fn at_boundary(&self, face: usize) -> bool {
        self.boundary[face].is_some()
    }

    /// The boundary identifier of the given face, `None` for interior faces.
    #[inline]
    pub fn boundary_id(&self, face: usize) -> Option<BoundaryId> {
        self.boundary[face]
    }

    /// Is this cell flagged for refinement?
    #[inline]
    pub fn refine_flag(&self) -> bool {
        self.refine_flag
    }

    /// Is this cell flagged for coarsening?
    #[inline]
    pub fn coarsen_flag(&self) -> bool {
        self.coarsen_flag
    }
}

/// A hierarchical, non-conforming mesh of quadrilaterals (2D) or hexahedra (3D).
///
/// Cells are never removed by refinement: refining a cell gives it children and only the leaves
/// of the hierarchy, the *active* cells, take part in computations. Active cells are addressed
/// by their position in [`Mesh::active_cell_indices`], their *active ordinal*.
///
/// Vertex positions can be moved freely (see [`crate::coupling::DisplacedMesh`]); the
/// connectivity only changes through [`Mesh::execute_coarsening_and_refinement`].
#[derive(Clone, Debug)]
pub struct Mesh {
    vertices: Vec<Point<Real>>,
    cells: Vec<Cell>,
    active: Vec<usize>,
    // Vertices created by refinement, keyed by the sorted vertices they are the barycenter of.
    refinement_vertices: FnvHashMap<Vec<usize>, usize>,
}

impl Mesh {
    /// Creates a mesh from its vertices and the vertices of its coarse cells.
    ///
    /// The cell vertices must follow the lexicographic numbering of the reference cell.
    /// Faces that belong to only one cell are marked as boundary faces with the identifier `0`.
    pub fn new(vertices: Vec<Point<Real>>, cells: Vec<[usize; VERTICES_PER_CELL]>) -> Self {
        let mut face_count: FnvHashMap<Vec<usize>, usize> = FnvHashMap::default();

        for cell in &cells {
            for face in 0..FACES_PER_CELL {
                *face_count.entry(Self::face_key(cell, face)).or_insert(0) += 1;
            }
        }

        let cells: Vec<_> = cells
            .iter()
            .map(|vtx| {
                let mut cell = Cell::new(*vtx, 0, None);
                for face in 0..FACES_PER_CELL {
                    if face_count[&Self::face_key(vtx, face)] == 1 {
                        cell.boundary[face] = Some(0);
                    }
                }
                cell
            })
            .collect();

        let mut result = Self {
            vertices,
            cells,
            active: Vec::new(),
            refinement_vertices: FnvHashMap::default(),
        };
        result.update_active_cells();
        result
    }

    /// Creates the axis-aligned box with opposite corners `p1` and `p2`, split into
    /// `subdivisions[d]` cells along the `d`-th axis.
    ///
    /// If `colorize` is `true`, the boundary face orthogonal to the axis `d` on the side `s`
    /// (`0` for the lower side) gets the boundary identifier `2 * d + s`.
    pub fn hyper_rectangle(
        p1: &Point<Real>,
        p2: &Point<Real>,
        subdivisions: [usize; DIM],
        colorize: bool,
    ) -> Self {
        assert!(
            subdivisions.iter().all(|n| *n > 0),
            "Every axis must be subdivided at least once."
        );
        let mins = p1.inf(p2);
        let maxs = p1.sup(p2);
        let extents = maxs - mins;

        let mut strides = [1; DIM];
        for d in 1..DIM {
            strides[d] = strides[d - 1] * (subdivisions[d - 1] + 1);
        }

        // `multi_cartesian_product` varies its last range fastest, we want the first axis fastest.
        let lexicographic = |counts: [usize; DIM]| {
            counts
                .into_iter()
                .rev()
                .map(|n| 0..n)
                .multi_cartesian_product()
                .map(|mut idx| {
                    idx.reverse();
                    idx
                })
        };

        let vertices = lexicographic(subdivisions.map(|n| n + 1))
            .map(|idx| {
                Point::from(Vector::from_fn(|d, _| {
                    mins[d] + extents[d] * idx[d] as Real / subdivisions[d] as Real
                }))
            })
            .collect();

        let cells = lexicographic(subdivisions)
            .map(|idx| {
                let base: usize = (0..DIM).map(|d| idx[d] * strides[d]).sum();
                let mut vtx = [0; VERTICES_PER_CELL];
                for (v, out) in vtx.iter_mut().enumerate() {
                    *out = base + (0..DIM).map(|d| bit(v, d) * strides[d]).sum::<usize>();
                }
                vtx
            })
            .collect();

        let mut mesh = Self::new(vertices, cells);

        if colorize {
            for cell in &mut mesh.cells {
                for face in 0..FACES_PER_CELL {
                    if cell.boundary[face].is_some() {
                        cell.boundary[face] = Some(face as BoundaryId);
                    }
                }
            }
        }

        mesh
    }

    fn face_key(vertices: &[usize; VERTICES_PER_CELL], face: usize) -> Vec<usize> {
        reference_cell::face_vertices(face)
            .iter()
            .map(|v| vertices[*v])
            .sorted_unstable()
            .collect()
    }

    /// The number of vertices, including vertices no active cell uses anymore.
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// The positions of all the vertices.
    #[inline]
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The mutable positions of all the vertices.
    #[inline]
    pub fn vertices_mut(&mut self) -> &mut [Point<Real>] {
        &mut self.vertices
    }

    /// The cell with the given index.
    #[inline]
    pub fn cell(&self, i: usize) -> &Cell {
        &self.cells[i]
    }

    /// The total number of cells, active or not.
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// The number of active cells.
    #[inline]
    pub fn n_active_cells(&self) -> usize {
        self.active.len()
    }

    /// The cell indices of all the active cells, in their deterministic iteration order.
    #[inline]
    pub fn active_cell_indices(&self) -> &[usize] {
        &self.active
    }

    /// The number of refinement levels of this mesh.
    pub fn n_levels(&self) -> u32 {
        self.active
            .iter()
            .map(|i| self.cells[*i].level + 1)
            .max()
            .unwrap_or(0)
    }

    /// The position of the `v`-th vertex of the cell `cell`.
    #[inline]
    pub fn cell_vertex(&self, cell: usize, v: usize) -> Point<Real> {
        self.vertices[self.cells[cell].vertices[v]]
    }

    /// The positions of all the vertices of the cell `cell`.
    pub fn cell_vertices(&self, cell: usize) -> [Point<Real>; VERTICES_PER_CELL] {
        let vtx = &self.cells[cell].vertices;
        std::array::from_fn(|v| self.vertices[vtx[v]])
    }

    /// The average of the vertices of the cell `cell`.
    pub fn cell_center(&self, cell: usize) -> Point<Real> {
        let sum = self.cells[cell]
            .vertices
            .iter()
            .fold(Vector::zeros(), |acc, v| acc + self.vertices[*v].coords);
        Point::from(sum / VERTICES_PER_CELL as Real)
    }

    /// The axis-aligned bounding box `(mins, maxs)` of the cell `cell`.
    pub fn cell_bounding_box(&self, cell: usize) -> (Point<Real>, Point<Real>) {
        let vtx = &self.cells[cell].vertices;
        let first = self.vertices[vtx[0]];

        vtx[1..].iter().fold((first, first), |(mins, maxs), v| {
            let p = &self.vertices[*v];
            (mins.inf(p), maxs.sup(p))
        })
    }

    /// The vertices used by at least one active cell, in order of first appearance.
    pub fn used_vertices(&self) -> Vec<usize> {
        self.active
            .iter()
            .flat_map(|c| self.cells[*c].vertices.iter().copied())
            .unique()
            .collect()
    }

    /// Sets the boundary identifier of a boundary face.
    ///
    /// # Panics
    /// Panics if the face is not on the boundary of the domain.
    pub fn set_boundary_id(&mut self, cell: usize, face: usize, id: BoundaryId) {
        assert!(
            self.cells[cell].at_boundary(face),
            "Only boundary faces can be given a boundary identifier."
        );
        self.cells[cell].boundary[face] = Some(id);
    }

    /// Flags the cell `cell` for refinement.
    pub fn set_refine_flag(&mut self, cell: usize) {
        self.cells[cell].refine_flag = true;
    }

    /// Removes the refinement flag of the cell `cell`.
    pub fn clear_refine_flag(&mut self, cell: usize) {
        self.cells[cell].refine_flag = false;
    }

    /// Flags the cell `cell` for coarsening.
    pub fn set_coarsen_flag(&mut self, cell: usize) {
        self.cells[cell].coarsen_flag = true;
    }

    /// Removes the coarsening flag of the cell `cell`.
    pub fn clear_coarsen_flag(&mut self, cell: usize) {
        self.cells[cell].coarsen_flag = false;
    }

    /// Refines every active cell `times` times.
    pub fn refine_global(&mut self, times: u32) {
        for _ in 0..times {
            for i in 0..self.active.len() {
                let cell = self.active[i];
                self.cells[cell].refine_flag = true;
                self.cells[cell].coarsen_flag = false;
            }
            self.execute_coarsening_and_refinement();
        }
    }

    /// Applies the refinement and coarsening flags, then clears every flag.
    ///
    /// A refinement flag wins over a coarsening flag. A parent is coarsened only if all its
    /// children are active, flagged for coarsening, and not flagged for refinement; the
    /// coarsening flags of the other cells are ignored.
    pub fn execute_coarsening_and_refinement(&mut self) {
        let mut retired = vec![false; self.cells.len()];
        let mut num_coarsened = 0;
        let mut num_refined = 0;

        for parent in 0..self.cells.len() {
            let Some(children) = self.cells[parent].children else {
                continue;
            };

            let coarsen = children.iter().all(|c| {
                let child = &self.cells[*c];
                child.is_active() && child.coarsen_flag && !child.refine_flag
            });

            if coarsen {
                for c in children {
                    retired[c] = true;
                }
                self.cells[parent].children = None;
                num_coarsened += 1;
            }
        }

        for i in 0..self.active.len() {
            let cell = self.active[i];
            if !retired[cell] && self.cells[cell].refine_flag {
                self.refine_cell(cell);
                num_refined += 1;
            }
        }

        for cell in &mut self.cells {
            cell.refine_flag = false;
            cell.coarsen_flag = false;
        }

        if num_coarsened != 0 {
            retired.resize(self.cells.len(), false);
            self.remove_cells(&retired);
        }

        self.update_active_cells();

        log::trace!(
            "Mesh adaptation: {} cells refined, {} parents coarsened, {} active cells.",
            num_refined,
            num_coarsened,
            self.active.len()
        );
    }

    fn refine_cell(&mut self, cell: usize) {
        let parent = self.cells[cell].clone();
        let first_child = self.cells.len();

        for child in 0..CHILDREN_PER_CELL {
            let mut vtx = [0; VERTICES_PER_CELL];

            for (v, out) in vtx.iter_mut().enumerate() {
                // Position of the child vertex on the parent's reference cell, in half-units.
                let support: Vec<usize> = (0..VERTICES_PER_CELL)
                    .filter(|w| {
                        (0..DIM).all(|d| match bit(child, d) + bit(v, d) {
                            0 => bit(*w, d) == 0,
                            2 => bit(*w, d) == 1,
                            _ => true,
                        })
                    })
                    .map(|w| parent.vertices[w])
                    .sorted_unstable()
                    .collect();
                *out = self.support_vertex(support);
            }

            let mut new_cell = Cell::new(vtx, parent.level + 1, Some(cell));
            for face in 0..FACES_PER_CELL {
                if reference_cell::child_on_face(child, face) {
                    new_cell.boundary[face] = parent.boundary[face];
                }
            }
            self.cells.push(new_cell);
        }

        self.cells[cell].children = Some(std::array::from_fn(|c| first_child + c));
    }

    // The vertex at the barycenter of `support`, created if it does not exist yet.
    fn support_vertex(&mut self, support: Vec<usize>) -> usize {
        if support.len() == 1 {
            return support[0];
        }

        if let Some(v) = self.refinement_vertices.get(&support) {
            return *v;
        }

        let sum = support
            .iter()
            .fold(Vector::zeros(), |acc, v| acc + self.vertices[*v].coords);
        let id = self.vertices.len();
        self.vertices.push(Point::from(sum / support.len() as Real));
        let _ = self.refinement_vertices.insert(support, id);
        id
    }

    fn remove_cells(&mut self, retired: &[bool]) {
        let mut new_index = vec![usize::MAX; self.cells.len()];
        let mut next = 0;

        for (i, retired) in retired.iter().enumerate() {
            if !retired {
                new_index[i] = next;
                next += 1;
            }
        }

        let mut i = 0;
        self.cells.retain(|_| {
            let keep = !retired[i];
            i += 1;
            keep
        });

        for cell in &mut self.cells {
            cell.parent = cell.parent.map(|p| new_index[p]);
            if let Some(children) = &mut cell.children {
                children.iter_mut().for_each(|c| *c = new_index[*c]);
            }
        }
    }

    fn update_active_cells(&mut self) {
        self.active = (0..self.cells.len())
            .filter(|i| self.cells[*i].is_active())
            .collect();
    }
}
