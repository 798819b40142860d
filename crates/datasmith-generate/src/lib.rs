//! Dependency-ordered, referential-integrity-preserving generation pipeline.
//!
//! Tables are ordered so every foreign-key parent is synthesized first; each
//! table's prompt embeds its schema constraints and, for dependent tables,
//! the pool of already-generated parent-key values. A single table's failure
//! never aborts the run.

pub mod errors;
pub mod model;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod prompt;

pub use errors::GenerateError;
pub use model::{
    FailureReason, PipelineOptions, RunOutcome, RunReport, RunRequest, TableOutcome, TableReport,
};
pub use parse::{parse_completion, Parsed};
pub use pipeline::Pipeline;
pub use prompt::{PromptBuilder, SYSTEM_PROMPT};
