use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Column metadata as read from the schema source. Immutable after retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnSpec {
    pub name: String,
    /// Engine data type as reported by the catalog (e.g. `integer`, `text`).
    pub data_type: String,
    pub is_nullable: bool,
    pub default: Option<String>,
    pub is_primary_key: bool,
}

/// Schema snapshot for a single table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Schema with all-text nullable columns, used when only a header row is
    /// known (uploaded sample files).
    pub fn from_text_columns(name: &str, columns: &[String]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns
                .iter()
                .map(|column| ColumnSpec {
                    name: column.clone(),
                    data_type: "text".to_string(),
                    is_nullable: true,
                    default: None,
                    is_primary_key: false,
                })
                .collect(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// A declared foreign-key dependency between two tables' columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignKeyEdge {
    pub child_table: String,
    pub child_column: String,
    pub parent_table: String,
    pub parent_column: String,
}
