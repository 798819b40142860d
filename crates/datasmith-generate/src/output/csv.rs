use std::path::Path;

use datasmith_core::RecordSet;

use crate::errors::GenerateError;

/// Read a CSV file into a record set, header first. Quoted fields are
/// handled per RFC 4180, unlike the lenient completion parser.
pub fn read_csv(path: &Path) -> Result<RecordSet, GenerateError> {
    let mut reader = csv::Reader::from_path(path)?;
    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|field| field.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }

    Ok(RecordSet { columns, rows })
}

/// Write a record set as CSV, header first, preserving column order.
pub fn write_csv(path: &Path, records: &RecordSet) -> Result<(), GenerateError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&records.columns)?;
    for row in &records.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows_in_order() {
        let records = RecordSet {
            columns: vec!["id".to_string(), "name".to_string()],
            rows: vec![vec!["1".to_string(), "Ada".to_string()]],
        };

        let dir = std::env::temp_dir().join(format!("datasmith-csv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("customers.csv");

        write_csv(&path, &records).expect("write");
        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, "id,name\n1,Ada\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn quoted_fields_survive_reading() {
        let dir = std::env::temp_dir().join(format!("datasmith-csv-read-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("people.csv");
        std::fs::write(&path, "name,address\n\"Doe, Jane\",\"1 Main St, Town\"\n")
            .expect("write sample");

        let records = read_csv(&path).expect("read");
        assert_eq!(records.columns, ["name", "address"]);
        assert_eq!(records.rows, vec![vec!["Doe, Jane", "1 Main St, Town"]]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn written_record_sets_read_back_identically() {
        let records = RecordSet {
            columns: vec!["id".to_string(), "note".to_string()],
            rows: vec![vec!["1".to_string(), "a, quoted value".to_string()]],
        };

        let dir = std::env::temp_dir().join(format!("datasmith-csv-rt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("notes.csv");

        write_csv(&path, &records).expect("write");
        let read_back = read_csv(&path).expect("read");
        assert_eq!(read_back, records);

        std::fs::remove_dir_all(&dir).ok();
    }
}
