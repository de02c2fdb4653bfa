use crate::error::{FsiError, Result};

/// Dense per-cell storage of a fixed number of records per active cell.
///
/// Records of the active cell with ordinal `i` occupy the contiguous range
/// `i * n_per_cell..(i + 1) * n_per_cell`. The storage must be re-initialized whenever the
/// topology of its mesh changes.
#[derive(Clone, Debug, PartialEq)]
pub struct CellDataStorage<T> {
    records: Vec<T>,
    n_per_cell: usize,
}

impl<T> Default for CellDataStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CellDataStorage<T> {
    /// An empty storage.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            n_per_cell: 0,
        }
    }

    /// The number of records per cell.
    #[inline]
    pub fn n_per_cell(&self) -> usize {
        self.n_per_cell
    }

    /// The number of cells covered by this storage.
    #[inline]
    pub fn n_cells(&self) -> usize {
        if self.n_per_cell == 0 {
            0
        } else {
            self.records.len() / self.n_per_cell
        }
    }

    /// The total number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Is this storage empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records of the active cell with the given ordinal.
    #[inline]
    pub fn get(&self, active_index: usize) -> &[T] {
        let start = active_index * self.n_per_cell;
        &self.records[start..start + self.n_per_cell]
    }

    /// The mutable records of the active cell with the given ordinal.
    #[inline]
    pub fn get_mut(&mut self, active_index: usize) -> &mut [T] {
        let start = active_index * self.n_per_cell;
        &mut self.records[start..start + self.n_per_cell]
    }

    /// All the records, cell after cell.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.records[..]
    }

    /// All the mutable records, cell after cell.
    ///
    /// Chunks of `n_per_cell` records can be handed to independent workers.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.records[..]
    }

    /// Checks that this storage holds exactly `n_cells × n_per_cell` records.
    pub fn check_size(&self, store: &'static str, n_cells: usize, n_per_cell: usize) -> Result<()> {
        let expected = n_cells * n_per_cell;

        if self.records.len() != expected || (expected != 0 && self.n_per_cell != n_per_cell) {
            return Err(FsiError::SizeMismatch {
                store,
                expected,
                found: self.records.len(),
            });
        }

        Ok(())
    }
}

impl<T: Default + Clone> CellDataStorage<T> {
    /// Allocates `n_per_cell` default records for each of `n_cells` active cells.
    pub fn initialize(&mut self, n_cells: usize, n_per_cell: usize) {
        self.records.clear();
        self.records.resize(n_cells * n_per_cell, T::default());
        self.n_per_cell = n_per_cell;
    }

    /// Resets every record to its default value.
    pub fn reset(&mut self) {
        self.records.iter_mut().for_each(|r| *r = T::default());
    }
}

impl<T> std::ops::Index<usize> for CellDataStorage<T> {
    type Output = [T];

    #[inline]
    fn index(&self, active_index: usize) -> &[T] {
        self.get(active_index)
    }
}

impl<T> std::ops::IndexMut<usize> for CellDataStorage<T> {
    #[inline]
    fn index_mut(&mut self, active_index: usize) -> &mut [T] {
        self.get_mut(active_index)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn records_are_grouped_by_cell() {
        let mut storage = CellDataStorage::<u32>::new();
        storage.initialize(3, 4);
        assert_eq!(storage.len(), 12);
        assert_eq!(storage.n_cells(), 3);

        storage[1][2] = 7;
        assert_eq!(storage.as_slice()[6], 7);
        assert_eq!(storage.get(1), &[0, 0, 7, 0]);

        storage.reset();
        assert!(storage.as_slice().iter().all(|r| *r == 0));
    }

    #[test]
    fn size_mismatch_is_reported() {
        let mut storage = CellDataStorage::<u32>::new();
        storage.initialize(4, 9);
        assert!(storage.check_size("test", 4, 9).is_ok());

        match storage.check_size("test", 5, 9) {
            Err(FsiError::SizeMismatch {
                store,
                expected,
                found,
            }) => {
                assert_eq!(store, "test");
                assert_eq!(expected, 45);
                assert_eq!(found, 36);
            }
            other => panic!("Unexpected result: {:?}", other),
        }

        // Same total, wrong layout.
        assert!(storage.check_size("test", 9, 4).is_err());
    }

    #[test]
    fn empty_storage_matches_empty_mesh() {
        let storage = CellDataStorage::<u32>::default();
        assert!(storage.is_empty());
        assert_eq!(storage.n_cells(), 0);
        assert!(storage.check_size("test", 0, 4).is_ok());
    }
}
