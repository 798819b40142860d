use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde_json::{Map, Value};

use datasmith_core::RecordSet;

use crate::errors::GenerateError;

/// Write a record set as a JSON array of objects keyed by column name.
/// Object key order follows the record set's column order.
pub fn write_json(path: &Path, records: &RecordSet) -> Result<(), GenerateError> {
    let objects: Vec<Map<String, Value>> = records
        .rows
        .iter()
        .map(|row| {
            records
                .columns
                .iter()
                .zip(row)
                .map(|(column, value)| (column.clone(), Value::String(value.clone())))
                .collect()
        })
        .collect();

    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &objects)?;
    Ok(())
}
