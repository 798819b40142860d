use datasmith_core::RecordSet;

use crate::errors::GenerateError;

/// Outcome of parsing one completion: the usable records plus the number of
/// data lines dropped for a field-count mismatch.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub records: RecordSet,
    pub skipped: usize,
}

/// Parse delimited tabular text into a record set.
///
/// The first non-empty line is the header and fixes the column order; each
/// later line is one record. A row whose field count differs from the header
/// is dropped (counted in `skipped`), not fatal. Zero usable rows is a
/// `MalformedResponse` so the caller can tell "declined" from "garbage".
/// Values stay untyped text.
pub fn parse_completion(raw: &str) -> Result<Parsed, GenerateError> {
    // Models occasionally fence the output despite instructions.
    let mut lines = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("```"));

    let header = lines
        .next()
        .ok_or_else(|| GenerateError::MalformedResponse("completion is empty".to_string()))?;
    let columns = split_fields(header);

    let mut rows = Vec::new();
    let mut skipped = 0_usize;
    for line in lines {
        let fields = split_fields(line);
        if fields.len() == columns.len() {
            rows.push(fields);
        } else {
            skipped += 1;
        }
    }

    if rows.is_empty() {
        return Err(GenerateError::MalformedResponse(format!(
            "no usable data rows ({skipped} skipped)"
        )));
    }

    Ok(Parsed {
        records: RecordSet { columns, rows },
        skipped,
    })
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',').map(|field| field.trim().to_string()).collect()
}
