pub mod cell_list;

pub use cell_list::{CellId, CellList};
