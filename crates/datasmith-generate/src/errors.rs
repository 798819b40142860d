use thiserror::Error;

/// Errors emitted by the generation pipeline.
///
/// `Core` failures (cyclic dependencies, caller misuse) are fatal for a run;
/// `MalformedResponse` is local to one table and handled by the orchestrator.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Core(#[from] datasmith_core::Error),
    #[error("malformed completion: {0}")]
    MalformedResponse(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
