use fnv::FnvHasher;
use std::collections::HashMap;

use crate::math::{Point, Real, DIM};

use std::hash::BuildHasher;

#[derive(Copy, Clone, Debug)]
pub struct DeterministicState;

impl BuildHasher for DeterministicState {
    type Hasher = FnvHasher;

    fn build_hasher(&self) -> FnvHasher {
        FnvHasher::with_key(1820)
    }
}

/// A grid based on spatial hashing, bucketing elements by the boxes they overlap.
///
/// Each element is inserted in every grid cell overlapped by its bounding box, so a point query
/// only has to look at a single grid cell.
#[derive(PartialEq, Debug, Clone)]
pub struct CellGrid<T> {
    cells: HashMap<Point<i64>, Vec<T>, DeterministicState>,
    cell_width: Real,
}

impl<T: Clone> CellGrid<T> {
    /// Initialize a grid where each cell has the width `cell_width`.
    pub fn new(cell_width: Real) -> Self {
        assert!(cell_width > 0.0, "The grid cell width must be positive.");
        Self {
            cells: HashMap::with_hasher(DeterministicState),
            cell_width,
        }
    }

    pub fn cell_width(&self) -> Real {
        self.cell_width
    }

    fn quantify(value: Real, cell_width: Real) -> i64 {
        (value / cell_width).floor() as i64
    }

    pub fn key(&self, point: &Point<Real>) -> Point<i64> {
        Point::from(point.coords.map(|e| Self::quantify(e, self.cell_width)))
    }

    /// Removes all elements from this grid.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// The number of non-empty grid cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Inserts `element` into every grid cell intersecting the box `[mins, maxs]`.
    pub fn insert_aabb(&mut self, mins: &Point<Real>, maxs: &Point<Real>, element: T) {
        let start = self.key(mins);
        let end = self.key(maxs);

        for key in CellRangeIterator::new(start, end) {
            self.cells.entry(key).or_default().push(element.clone())
        }
    }

    /// The elements attached to the grid cell containing `point`.
    ///
    /// Returns an empty slice if that grid cell is empty.
    pub fn elements_at(&self, point: &Point<Real>) -> &[T] {
        let key = self.key(point);
        self.cells.get(&key).map(|c| &c[..]).unwrap_or(&[])
    }
}

struct CellRangeIterator {
    start: Point<i64>,
    end: Point<i64>,
    curr: Point<i64>,
    done: bool,
}

impl CellRangeIterator {
    fn new(start: Point<i64>, end: Point<i64>) -> Self {
        Self {
            start,
            end,
            curr: start,
            done: false,
        }
    }
}

impl Iterator for CellRangeIterator {
    type Item = Point<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.curr == self.end {
            self.done = true;
            Some(self.curr)
        } else {
            let result = self.curr;

            for i in 0..DIM {
                self.curr[i] += 1;

                if self.curr[i] > self.end[i] {
                    self.curr[i] = self.start[i];
                } else {
                    break;
                }
            }

            Some(result)
        }
    }
}
