pub mod graph;
pub mod memory;
pub mod spreadsheet;
