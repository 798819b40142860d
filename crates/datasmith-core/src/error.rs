use thiserror::Error;

/// Core error type shared across Datasmith crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The selected tables' foreign-key graph is not acyclic.
    #[error("cyclic foreign-key dependency among tables: {}", tables.join(", "))]
    CyclicDependency { tables: Vec<String> },
    /// Caller supplied unusable input (empty table set, bad record count).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Schema source or database failure.
    #[error("schema source error: {0}")]
    Source(String),
}

/// Convenience alias for results returned by Datasmith crates.
pub type Result<T> = std::result::Result<T, Error>;
