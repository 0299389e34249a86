//! Crate-wide error types.
//!
//! Each stage of the pipeline (model building, graph construction, rule
//! loading, evaluation) reports failures through its own typed error so
//! callers can match on the stage that failed; the orchestrator wraps
//! them into [`EngineError`] only at the point where it has to aggregate
//! across stages.

use thiserror::Error;

/// Errors raised while normalizing parser facts into a [`crate::model::SourceModel`].
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("duplicate fully-qualified name: {0}")]
    DuplicateFqn(String),

    #[error("method {method} references unknown containing type {containing_type}")]
    DanglingContainingType {
        method: String,
        containing_type: String,
    },

    #[error("parse error in {file}: {message}")]
    ParseFailure { file: String, message: String },
}

/// Result alias for model-building operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while assembling the call graph or package dependency graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("call graph is not yet frozen")]
    NotFrozen,

    #[error("unknown entry point: {0}")]
    UnknownEntryPoint(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while loading or parsing rule definitions.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("malformed rule file {file}: {source}")]
    Malformed {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate rule id: {0}")]
    DuplicateId(String),

    #[error("rule not found: {0}")]
    NotFound(String),
}

pub type RuleResult<T> = Result<T, RuleError>;

/// Top-level error surfaced by the [`crate::orchestrator::Orchestrator`].
///
/// The orchestrator never panics: every failure it cannot route around is
/// folded into this type and returned from `analyze`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("source model construction failed: {0}")]
    Model(#[from] ModelError),

    #[error("graph construction failed: {0}")]
    Graph(#[from] GraphError),

    #[error("rule repository error: {0}")]
    Rule(#[from] RuleError),
}

pub type EngineResult<T> = Result<T, EngineError>;
