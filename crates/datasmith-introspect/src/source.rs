use async_trait::async_trait;

use datasmith_core::{ForeignKeyEdge, RecordSet, Result, TableSchema};

/// Trait implemented by adapters that can supply table schemas, foreign-key
/// relationships, and bounded sample excerpts.
#[async_trait]
pub trait SchemaSource {
    /// List candidate table names.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Column constraints for one table, in catalog order.
    async fn table_schema(&self, table: &str) -> Result<TableSchema>;

    /// Foreign-key edges among the given tables. Edges whose parent lies
    /// outside the set are still returned; ordering ignores them.
    async fn foreign_keys(&self, tables: &[String]) -> Result<Vec<ForeignKeyEdge>>;

    /// A small excerpt of existing rows, used only to steer generation style.
    async fn sample_rows(&self, table: &str, limit: i64) -> Result<RecordSet>;
}
