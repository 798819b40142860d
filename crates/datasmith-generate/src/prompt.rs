use std::fmt::Write as _;

use datasmith_core::{Error, ForeignKeyEdge, RecordSet, Result, TableSchema, ValuePool};

/// Conversation-level instruction sent alongside every table prompt.
pub const SYSTEM_PROMPT: &str = "You are an AI test data generator.";

/// One instruction clause of a generation request.
///
/// Clauses are collected as typed values and serialized once, so the request
/// contract stays testable independent of exact wording.
#[derive(Debug, Clone)]
enum Clause {
    RowCount(u32),
    DelimitedOnly,
    NoFences,
    NoVerbatimSamples,
    ForeignKeyValues { column: String, values: Vec<String> },
}

/// Assembles the generation request for a single table.
#[derive(Debug)]
pub struct PromptBuilder<'a> {
    schema: &'a TableSchema,
    sample: Option<&'a RecordSet>,
    clauses: Vec<Clause>,
}

impl<'a> PromptBuilder<'a> {
    /// Start a request for `record_count` rows of `schema`'s table.
    ///
    /// Fails with `InvalidRequest` on a zero row count or an empty schema;
    /// everything past that point is pure string assembly.
    pub fn new(schema: &'a TableSchema, record_count: u32) -> Result<Self> {
        if record_count == 0 {
            return Err(Error::InvalidRequest(
                "record count must be positive".to_string(),
            ));
        }
        if schema.columns.is_empty() {
            return Err(Error::InvalidRequest(format!(
                "table '{}' has no columns",
                schema.name
            )));
        }
        Ok(Self {
            schema,
            sample: None,
            clauses: vec![
                Clause::RowCount(record_count),
                Clause::DelimitedOnly,
                Clause::NoFences,
            ],
        })
    }

    /// Embed an excerpt of existing rows to steer style, with an instruction
    /// never to reproduce a sample row verbatim.
    pub fn with_sample(mut self, sample: &'a RecordSet) -> Self {
        if !sample.is_empty() {
            self.sample = Some(sample);
            self.clauses.push(Clause::NoVerbatimSamples);
        }
        self
    }

    /// Add one referential-integrity clause per outgoing foreign-key edge
    /// whose parent values have been recorded. Absent or empty pool entries
    /// produce no clause; compliance is advisory either way.
    pub fn with_foreign_keys(mut self, edges: &[ForeignKeyEdge], pool: &ValuePool) -> Self {
        for edge in edges {
            if edge.child_table != self.schema.name {
                continue;
            }
            if let Some(values) = pool.lookup(&edge.parent_table, &edge.parent_column) {
                if !values.is_empty() {
                    self.clauses.push(Clause::ForeignKeyValues {
                        column: edge.child_column.clone(),
                        values: values.to_vec(),
                    });
                }
            }
        }
        self
    }

    /// Serialize the request deterministically.
    pub fn render(&self) -> String {
        let mut prompt = format!(
            "Generate sample data for the table '{}' with the following schema:\n",
            self.schema.name
        );

        for column in &self.schema.columns {
            let mut tags = Vec::new();
            if column.is_primary_key {
                tags.push("PRIMARY KEY".to_string());
            }
            if column.is_nullable {
                tags.push("NULLABLE".to_string());
            } else {
                tags.push("NOT NULL".to_string());
            }
            if let Some(default) = &column.default {
                tags.push(format!("DEFAULT {default}"));
            }
            let _ = writeln!(
                prompt,
                "- {} ({}) {}",
                column.name,
                column.data_type,
                tags.join(" ")
            );
        }

        if let Some(sample) = self.sample {
            let _ = writeln!(
                prompt,
                "\nSample records from the table '{}':",
                self.schema.name
            );
            let _ = writeln!(prompt, "{}", sample.columns.join(","));
            for row in &sample.rows {
                let _ = writeln!(prompt, "{}", row.join(","));
            }
        }

        prompt.push_str("\nRules:\n");
        for (index, clause) in self.clauses.iter().enumerate() {
            let _ = writeln!(prompt, "{}. {}", index + 1, render_clause(clause));
        }

        prompt
    }
}

fn render_clause(clause: &Clause) -> String {
    match clause {
        Clause::RowCount(count) => {
            format!("STRICTLY GENERATE '{count}' new records in the output.")
        }
        Clause::DelimitedOnly => "Produce only comma-delimited text with a single header row; \
                                  no narrative, no insert statements."
            .to_string(),
        Clause::NoFences => "Don't use ``` in the output.".to_string(),
        Clause::NoVerbatimSamples => "Understand the pattern of the sample records but never \
                                      reproduce a sample row verbatim."
            .to_string(),
        Clause::ForeignKeyValues { column, values } => format!(
            "For column {column}, use only values from this list to ensure referential \
             integrity: [{}]",
            values.join(", ")
        ),
    }
}
