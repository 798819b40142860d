use serde::{Deserialize, Serialize};

/// Ordered rows with a stable column order. Values remain untyped text; any
/// coercion belongs to downstream exporters.
///
/// Never mutated after creation by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, column: &str) -> Option<Vec<&str>> {
        let index = self.columns.iter().position(|name| name == column)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| row.get(index).map(String::as_str))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_values_follow_row_order() {
        let records = RecordSet {
            columns: vec!["id".to_string(), "name".to_string()],
            rows: vec![
                vec!["1".to_string(), "Ada".to_string()],
                vec!["2".to_string(), "Bo".to_string()],
            ],
        };

        assert_eq!(records.column_values("id").unwrap(), ["1", "2"]);
        assert!(records.column_values("missing").is_none());
    }
}
