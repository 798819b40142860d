use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use datasmith_core::{generation_order, Error, ValuePool};
use datasmith_llm::LlmClient;

use crate::errors::GenerateError;
use crate::model::{
    FailureReason, PipelineOptions, RunOutcome, RunReport, RunRequest, TableOutcome, TableReport,
};
use crate::parse::parse_completion;
use crate::prompt::PromptBuilder;

/// Drives generation in dependency order, isolating per-table failures.
///
/// Each call to [`Pipeline::run`] owns a fresh value pool and result map;
/// nothing is shared across runs.
pub struct Pipeline {
    llm: Arc<dyn LlmClient>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(llm: Arc<dyn LlmClient>, options: PipelineOptions) -> Self {
        Self { llm, options }
    }

    pub async fn run(&self, request: &RunRequest) -> Result<RunOutcome, GenerateError> {
        self.validate(request)?;

        let order = generation_order(&request.tables, &request.edges)?;
        let run_id = uuid::Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            tables = order.len(),
            records = request.record_count,
            "generation started"
        );

        let mut pool = ValuePool::new();
        let mut outcomes: BTreeMap<String, TableOutcome> = BTreeMap::new();
        let mut report = RunReport::new(run_id.clone());

        for table in &order {
            let started = Instant::now();
            let outcome = self.generate_table(request, table, &pool).await;

            match outcome {
                Ok(parsed) => {
                    pool.record_table(table, &parsed.records);
                    info!(
                        table = %table,
                        rows = parsed.records.len(),
                        skipped = parsed.skipped,
                        "table generated"
                    );
                    report.record_table(TableReport {
                        table: table.clone(),
                        rows_generated: parsed.records.len() as u64,
                        rows_skipped: parsed.skipped as u64,
                        failure: None,
                        elapsed_ms: started.elapsed().as_millis(),
                    });
                    outcomes.insert(table.clone(), TableOutcome::Generated(parsed.records));
                }
                Err((reason, message)) => {
                    warn!(table = %table, reason = %reason, message = %message, "table failed");
                    report.record_table(TableReport {
                        table: table.clone(),
                        rows_generated: 0,
                        rows_skipped: 0,
                        failure: Some(format!("{reason}: {message}")),
                        elapsed_ms: started.elapsed().as_millis(),
                    });
                    outcomes.insert(table.clone(), TableOutcome::Failed { reason, message });
                }
            }
        }

        info!(
            run_id = %run_id,
            rows = report.rows_generated,
            failures = report.failures,
            "generation finished"
        );

        Ok(RunOutcome {
            order,
            tables: outcomes,
            report,
        })
    }

    /// Reject caller misuse before any LLM call is made.
    fn validate(&self, request: &RunRequest) -> Result<(), GenerateError> {
        if request.tables.is_empty() {
            return Err(Error::InvalidRequest("no tables selected".to_string()).into());
        }
        if request.record_count == 0 || request.record_count > self.options.max_records {
            return Err(Error::InvalidRequest(format!(
                "record count must be between 1 and {}",
                self.options.max_records
            ))
            .into());
        }
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for table in &request.tables {
            if !seen.insert(table.as_str()) {
                return Err(Error::InvalidRequest(format!(
                    "table '{table}' selected more than once"
                ))
                .into());
            }
            let schema = request
                .schemas
                .get(table)
                .ok_or_else(|| Error::InvalidRequest(format!("missing schema for '{table}'")))?;
            if schema.columns.is_empty() {
                return Err(
                    Error::InvalidRequest(format!("table '{table}' has no columns")).into(),
                );
            }
        }
        Ok(())
    }

    async fn generate_table(
        &self,
        request: &RunRequest,
        table: &str,
        pool: &ValuePool,
    ) -> Result<crate::parse::Parsed, (FailureReason, String)> {
        // Schema presence was validated up front.
        let schema = request
            .schemas
            .get(table)
            .ok_or_else(|| (FailureReason::Unavailable, "schema missing".to_string()))?;

        let mut builder = PromptBuilder::new(schema, request.record_count)
            .map_err(|err| (FailureReason::Unavailable, err.to_string()))?
            .with_foreign_keys(&request.edges, pool);
        if let Some(sample) = request.samples.get(table) {
            builder = builder.with_sample(sample);
        }
        let prompt = builder.render();

        let completion = match tokio::time::timeout(
            self.options.llm_timeout,
            self.llm.complete(&self.options.system_prompt, &prompt),
        )
        .await
        {
            Err(_) => {
                return Err((
                    FailureReason::Timeout,
                    format!(
                        "no completion within {}s",
                        self.options.llm_timeout.as_secs()
                    ),
                ));
            }
            Ok(Err(err)) => return Err((FailureReason::Unavailable, err.to_string())),
            Ok(Ok(text)) => text,
        };

        parse_completion(&completion).map_err(|err| (FailureReason::Malformed, err.to_string()))
    }
}
