//! Core contracts and helpers for Datasmith.
//!
//! This crate defines the canonical schema types, the foreign-key dependency
//! ordering, and the reference value pool shared across adapters and the CLI.

pub mod error;
pub mod graph;
pub mod pool;
pub mod records;
pub mod schema;

pub use error::{Error, Result};
pub use graph::generation_order;
pub use pool::ValuePool;
pub use records::RecordSet;
pub use schema::{ColumnSpec, ForeignKeyEdge, TableSchema};
