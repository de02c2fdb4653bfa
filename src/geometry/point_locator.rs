use crate::fe::q1::CellMapping;
use crate::geometry::{reference_cell, CellGrid, Mesh};
use crate::math::{Point, Real, Vector, DIM};

/// Where a point was found in a mesh.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellLocation {
    /// The active ordinal of the containing cell.
    pub active_index: usize,
    /// The index of the containing cell in the mesh.
    pub cell: usize,
    /// The coordinates of the point on the reference cell.
    pub reference_point: Point<Real>,
}

/// Finds the active cell of a mesh containing a physical point.
///
/// The locator borrows the mesh, so it always sees the vertex positions the mesh had when the
/// locator was built: build it *after* displacing a mesh.
///
/// Candidate cells are found with a spatial hash grid over the cell bounding boxes, then tested
/// exactly by inverting their multilinear map. When a point lies on a face shared by several
/// cells, the cell with the smallest active ordinal is returned.
pub struct PointLocator<'a> {
    mesh: &'a Mesh,
    grid: CellGrid<usize>,
    tolerance: Real,
}

impl<'a> PointLocator<'a> {
    /// Tolerance, in reference coordinates, for a point to be considered inside a cell.
    pub const DEFAULT_TOLERANCE: Real = 1.0e-10;

    /// Builds a locator for the active cells of `mesh`.
    pub fn new(mesh: &'a Mesh) -> Self {
        Self::with_tolerance(mesh, Self::DEFAULT_TOLERANCE)
    }

    /// Builds a locator with a custom reference-coordinates tolerance.
    pub fn with_tolerance(mesh: &'a Mesh, tolerance: Real) -> Self {
        let boxes: Vec<_> = mesh
            .active_cell_indices()
            .iter()
            .map(|c| mesh.cell_bounding_box(*c))
            .collect();

        let mean_width = boxes
            .iter()
            .map(|(mins, maxs)| (maxs - mins).max())
            .sum::<Real>()
            / boxes.len().max(1) as Real;
        let cell_width = if mean_width > 0.0 { mean_width } else { 1.0 };
        let mut grid = CellGrid::new(cell_width);

        for (active_index, (mins, maxs)) in boxes.iter().enumerate() {
            let margin = Vector::repeat(Self::margin(mins, maxs, tolerance));
            grid.insert_aabb(&(mins - margin), &(maxs + margin), active_index);
        }

        Self {
            mesh,
            grid,
            tolerance,
        }
    }

    fn margin(mins: &Point<Real>, maxs: &Point<Real>, tolerance: Real) -> Real {
        (maxs - mins).max() * tolerance.max(1.0e-8)
    }

    /// The mesh this locator searches.
    #[inline]
    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }

    /// Finds the active cell containing `point`, or `None` if `point` is outside of the mesh.
    pub fn locate(&self, point: &Point<Real>) -> Option<CellLocation> {
        // Grid buckets are filled in increasing active ordinal.
        self.grid
            .elements_at(point)
            .iter()
            .find_map(|active_index| self.test_cell(*active_index, point))
    }

    /// Does any active cell of the mesh contain `point`?
    #[inline]
    pub fn contains(&self, point: &Point<Real>) -> bool {
        self.locate(point).is_some()
    }

    /// Same as [`PointLocator::locate`], but tests every active cell of the mesh.
    pub fn locate_brute_force(&self, point: &Point<Real>) -> Option<CellLocation> {
        (0..self.mesh.n_active_cells())
            .find_map(|active_index| self.test_cell(active_index, point))
    }

    fn test_cell(&self, active_index: usize, point: &Point<Real>) -> Option<CellLocation> {
        let cell = self.mesh.active_cell_indices()[active_index];
        let (mins, maxs) = self.mesh.cell_bounding_box(cell);
        let margin = Self::margin(&mins, &maxs, self.tolerance);

        let outside_box = (0..DIM)
            .any(|d| point[d] < mins[d] - margin || point[d] > maxs[d] + margin);
        if outside_box {
            return None;
        }

        let reference_point = CellMapping::new(self.mesh, cell).transform_real_to_unit(point)?;

        reference_cell::is_inside_unit_cell(&reference_point, self.tolerance).then_some(
            CellLocation {
                active_index,
                cell,
                reference_point,
            },
        )
    }
}
