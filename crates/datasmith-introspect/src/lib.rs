//! Schema source adapters.

pub mod postgres;
pub mod source;

pub use postgres::PostgresSource;
pub use source::SchemaSource;

pub use datasmith_core::{ForeignKeyEdge, RecordSet, TableSchema};
