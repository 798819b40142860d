use std::collections::BTreeMap;

use crate::records::RecordSet;

/// Run-scoped record of already-generated column values, keyed by table and
/// column. Used to steer dependent tables toward valid foreign-key values.
///
/// The pool grows monotonically: a table's columns are recorded exactly once,
/// after its generation succeeds, in the order the values were produced.
#[derive(Debug, Default, Clone)]
pub struct ValuePool {
    values: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl ValuePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the generated values for one column, replacing any prior entry.
    pub fn record(&mut self, table: &str, column: &str, values: Vec<String>) {
        self.values
            .entry(table.to_string())
            .or_default()
            .insert(column.to_string(), values);
    }

    /// Record every column of a completed table's record set.
    pub fn record_table(&mut self, table: &str, records: &RecordSet) {
        for column in &records.columns {
            let values = records
                .column_values(column)
                .unwrap_or_default()
                .into_iter()
                .map(|value| value.to_string())
                .collect();
            self.record(table, column, values);
        }
    }

    pub fn lookup(&self, table: &str, column: &str) -> Option<&[String]> {
        self.values
            .get(table)
            .and_then(|columns| columns.get(column))
            .map(Vec::as_slice)
    }
}
