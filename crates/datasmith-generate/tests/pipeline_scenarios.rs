use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use datasmith_core::{ColumnSpec, Error, ForeignKeyEdge, TableSchema};
use datasmith_generate::{
    FailureReason, GenerateError, Pipeline, PipelineOptions, RunRequest, TableOutcome,
};
use datasmith_llm::{LlmClient, LlmError};

/// Replays queued completions in call order and records every prompt.
#[derive(Default)]
struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn new(responses: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(prompt.to_string());
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyCompletion))
    }
}

struct SlowLlm;

#[async_trait]
impl LlmClient for SlowLlm {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("id\n1\n".to_string())
    }
}

fn schema(table: &str, columns: &[&str]) -> TableSchema {
    TableSchema {
        name: table.to_string(),
        columns: columns
            .iter()
            .enumerate()
            .map(|(index, name)| ColumnSpec {
                name: name.to_string(),
                data_type: "integer".to_string(),
                is_nullable: index != 0,
                default: None,
                is_primary_key: index == 0,
            })
            .collect(),
    }
}

fn edge(child: &str, child_col: &str, parent: &str, parent_col: &str) -> ForeignKeyEdge {
    ForeignKeyEdge {
        child_table: child.to_string(),
        child_column: child_col.to_string(),
        parent_table: parent.to_string(),
        parent_column: parent_col.to_string(),
    }
}

fn request(
    tables: &[&str],
    schemas: Vec<TableSchema>,
    edges: Vec<ForeignKeyEdge>,
    record_count: u32,
) -> RunRequest {
    RunRequest {
        tables: tables.iter().map(|table| table.to_string()).collect(),
        schemas: schemas
            .into_iter()
            .map(|schema| (schema.name.clone(), schema))
            .collect(),
        edges,
        record_count,
        samples: BTreeMap::new(),
    }
}

#[tokio::test]
async fn parent_values_flow_into_dependent_prompts() {
    let llm = ScriptedLlm::new(vec![
        Ok("id,name\n1,Ada\n2,Bo\n3,Cy\n".to_string()),
        Ok("id,customer_id\n10,1\n11,3\n".to_string()),
    ]);
    let pipeline = Pipeline::new(llm.clone(), PipelineOptions::default());

    let req = request(
        &["orders", "customers"],
        vec![
            schema("customers", &["id", "name"]),
            schema("orders", &["id", "customer_id"]),
        ],
        vec![edge("orders", "customer_id", "customers", "id")],
        3,
    );

    let outcome = pipeline.run(&req).await.expect("run succeeds");
    assert_eq!(outcome.order, ["customers", "orders"]);

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("table 'customers'"));
    assert!(prompts[1].contains("For column customer_id"));
    assert!(prompts[1].contains("[1, 2, 3]"));

    let orders = outcome.tables["orders"].records().expect("generated");
    assert_eq!(orders.len(), 2);
}

#[tokio::test]
async fn chain_orders_tables_and_repeats_the_count() {
    let llm = ScriptedLlm::new(vec![
        Ok("id\n1\n2\n3\n4\n5\n".to_string()),
        Ok("id,a_id\n1,1\n2,2\n3,3\n4,4\n5,5\n".to_string()),
        Ok("id,b_id\n1,1\n2,2\n3,3\n4,4\n5,5\n".to_string()),
    ]);
    let pipeline = Pipeline::new(llm.clone(), PipelineOptions::default());

    let req = request(
        &["c", "b", "a"],
        vec![
            schema("a", &["id"]),
            schema("b", &["id", "a_id"]),
            schema("c", &["id", "b_id"]),
        ],
        vec![edge("b", "a_id", "a", "id"), edge("c", "b_id", "b", "id")],
        5,
    );

    let outcome = pipeline.run(&req).await.expect("run succeeds");
    assert_eq!(outcome.order, ["a", "b", "c"]);

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 3);
    for prompt in &prompts {
        assert!(prompt.contains("'5' new records"));
    }
    assert_eq!(outcome.report.rows_generated, 15);
    assert_eq!(outcome.report.failures, 0);
}

#[tokio::test]
async fn failed_parent_does_not_poison_the_run() {
    let llm = ScriptedLlm::new(vec![
        Ok("id\n1\n2\n".to_string()),
        Err(LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        }),
        Ok("id,b_id\n1,9\n".to_string()),
    ]);
    let pipeline = Pipeline::new(llm.clone(), PipelineOptions::default());

    let req = request(
        &["a", "b", "c"],
        vec![
            schema("a", &["id"]),
            schema("b", &["id", "a_id"]),
            schema("c", &["id", "b_id"]),
        ],
        vec![edge("b", "a_id", "a", "id"), edge("c", "b_id", "b", "id")],
        2,
    );

    let outcome = pipeline.run(&req).await.expect("run succeeds");

    assert!(outcome.tables["a"].records().is_some());
    assert!(matches!(
        outcome.tables["b"],
        TableOutcome::Failed {
            reason: FailureReason::Unavailable,
            ..
        }
    ));
    assert!(outcome.tables["c"].records().is_some());

    // All three tables were still attempted, and c's prompt carries no
    // integrity hint because b never produced values.
    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(!prompts[2].contains("referential integrity"));
    assert_eq!(outcome.report.failures, 1);
}

#[tokio::test]
async fn cycle_aborts_before_any_llm_call() {
    let llm = ScriptedLlm::new(vec![Ok("id\n1\n".to_string())]);
    let pipeline = Pipeline::new(llm.clone(), PipelineOptions::default());

    let req = request(
        &["x", "y"],
        vec![schema("x", &["id", "y_id"]), schema("y", &["id", "x_id"])],
        vec![edge("x", "y_id", "y", "id"), edge("y", "x_id", "x", "id")],
        2,
    );

    let err = pipeline.run(&req).await.unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Core(Error::CyclicDependency { .. })
    ));
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn malformed_completion_marks_only_that_table() {
    let llm = ScriptedLlm::new(vec![
        Ok("Sorry, I cannot help with that.".to_string()),
        Ok("id\n1\n".to_string()),
    ]);
    let pipeline = Pipeline::new(llm.clone(), PipelineOptions::default());

    let req = request(
        &["a", "z"],
        vec![schema("a", &["id"]), schema("z", &["id"])],
        Vec::new(),
        1,
    );

    let outcome = pipeline.run(&req).await.expect("run succeeds");
    assert!(matches!(
        outcome.tables["a"],
        TableOutcome::Failed {
            reason: FailureReason::Malformed,
            ..
        }
    ));
    assert!(outcome.tables["z"].records().is_some());
}

#[tokio::test]
async fn slow_llm_times_out_and_the_run_continues() {
    let options = PipelineOptions {
        llm_timeout: Duration::from_millis(50),
        ..PipelineOptions::default()
    };
    let pipeline = Pipeline::new(Arc::new(SlowLlm), options);

    let req = request(&["a"], vec![schema("a", &["id"])], Vec::new(), 1);

    let outcome = pipeline.run(&req).await.expect("run succeeds");
    assert!(matches!(
        outcome.tables["a"],
        TableOutcome::Failed {
            reason: FailureReason::Timeout,
            ..
        }
    ));
}

#[tokio::test]
async fn empty_table_set_is_invalid() {
    let llm = ScriptedLlm::new(Vec::new());
    let pipeline = Pipeline::new(llm, PipelineOptions::default());

    let req = request(&[], Vec::new(), Vec::new(), 5);
    let err = pipeline.run(&req).await.unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Core(Error::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn duplicate_table_selection_is_invalid() {
    let llm = ScriptedLlm::new(Vec::new());
    let pipeline = Pipeline::new(llm.clone(), PipelineOptions::default());

    let req = request(&["a", "a"], vec![schema("a", &["id"])], Vec::new(), 1);
    let err = pipeline.run(&req).await.unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Core(Error::InvalidRequest(_))
    ));
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn record_count_is_bounded() {
    let llm = ScriptedLlm::new(Vec::new());
    let pipeline = Pipeline::new(llm.clone(), PipelineOptions::default());

    let req = request(&["a"], vec![schema("a", &["id"])], Vec::new(), 1001);
    let err = pipeline.run(&req).await.unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Core(Error::InvalidRequest(_))
    ));
    assert!(llm.prompts().is_empty());
}
