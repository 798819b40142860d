use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;

use datasmith_core::{ForeignKeyEdge, RecordSet, TableSchema};

use crate::prompt::SYSTEM_PROMPT;

/// Options for the generation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Upper bound for the requested record count.
    pub max_records: u32,
    /// Timeout for a single LLM call; expiry marks the table failed.
    pub llm_timeout: Duration,
    /// Conversation-level instruction sent with every prompt.
    pub system_prompt: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_records: 1000,
            llm_timeout: Duration::from_secs(120),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Everything one generation run needs. Owned by the caller; the pipeline
/// holds no state across runs.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Selected tables, in operator order.
    pub tables: Vec<String>,
    pub schemas: BTreeMap<String, TableSchema>,
    pub edges: Vec<ForeignKeyEdge>,
    pub record_count: u32,
    /// Optional style excerpts keyed by table.
    pub samples: BTreeMap<String, RecordSet>,
}

/// Why one table's generation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The LLM call errored.
    Unavailable,
    /// The LLM call exceeded the configured timeout.
    Timeout,
    /// The completion could not be parsed into records.
    Malformed,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureReason::Unavailable => "unavailable",
            FailureReason::Timeout => "timeout",
            FailureReason::Malformed => "malformed",
        };
        f.write_str(label)
    }
}

/// Per-table result of a run. `Failed` stands in for "no data" so callers can
/// distinguish a failed table from one that was never selected.
#[derive(Debug, Clone)]
pub enum TableOutcome {
    Generated(RecordSet),
    Failed {
        reason: FailureReason,
        message: String,
    },
}

impl TableOutcome {
    pub fn records(&self) -> Option<&RecordSet> {
        match self {
            TableOutcome::Generated(records) => Some(records),
            TableOutcome::Failed { .. } => None,
        }
    }
}

/// Summary row for one table.
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: String,
    pub rows_generated: u64,
    pub rows_skipped: u64,
    pub failure: Option<String>,
    pub elapsed_ms: u128,
}

/// Summary of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub tables: Vec<TableReport>,
    pub rows_generated: u64,
    pub failures: u64,
}

impl RunReport {
    pub fn new(run_id: String) -> Self {
        Self {
            run_id,
            tables: Vec::new(),
            rows_generated: 0,
            failures: 0,
        }
    }

    pub fn record_table(&mut self, table: TableReport) {
        if table.failure.is_some() {
            self.failures += 1;
        }
        self.rows_generated += table.rows_generated;
        self.tables.push(table);
    }
}

/// Result of a generation run: the resolved order, each table's outcome, and
/// the run summary.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub order: Vec<String>,
    pub tables: BTreeMap<String, TableOutcome>,
    pub report: RunReport,
}
