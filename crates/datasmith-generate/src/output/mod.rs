//! Exporters for generated record sets.

pub mod csv;
pub mod json;

pub use csv::{read_csv, write_csv};
pub use json::write_json;
