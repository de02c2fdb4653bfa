//! Per-quadrature-point coupling records, stored densely per active cell.

pub use self::cell_data_storage::CellDataStorage;
pub use self::point_records::{FluidPointRecord, SolidPointRecord};

mod cell_data_storage;
mod point_records;
