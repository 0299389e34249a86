//! # archlint-core
//!
//! A declarative architectural-rule engine for statically-typed
//! object-oriented source code. Given a parsed codebase and a set of
//! JSON-defined rules, it detects violations such as "a transactional
//! method must not transitively call a remote-HTTP client" or "the package
//! graph must be acyclic".
//!
//! This crate is the core pipeline only: the concrete AST parser/symbol
//! solver, rule-file deserialization from disk, report formatting, and any
//! CLI/HTTP surface are external collaborators. What lives here is:
//!
//! - [`model`]: the immutable Source Model and the builder that produces
//!   it from raw parser-adapter facts.
//! - [`graph`]: the Call Graph (with interface-dispatch expansion and
//!   bounded chain search) and the Package Dependency Graph (with cycle
//!   detection).
//! - [`rules`]: the declarative rule schema and the repository contract
//!   rule authors load rules through.
//! - [`evaluators`]: the pluggable evaluator framework and the seven
//!   built-in evaluators.
//! - [`orchestrator`]: the pipeline driver that ties the above together
//!   into a single `analyze` call.
//!
//! ## Example
//!
//! ```
//! use archlint_core::evaluators::EvaluatorRegistry;
//! use archlint_core::model::facts::{FixedParserAdapter, ParseOptions, ParseUnit};
//! use archlint_core::orchestrator::Orchestrator;
//! use archlint_core::rules::InMemoryRuleRepository;
//!
//! let registry = EvaluatorRegistry::with_builtins();
//! let orchestrator = Orchestrator::new(&registry);
//! let adapter = FixedParserAdapter::new().with_unit(ParseUnit::default());
//! let rules = InMemoryRuleRepository::new();
//!
//! let result = orchestrator.analyze(
//!     &adapter,
//!     std::path::Path::new("."),
//!     &ParseOptions::default(),
//!     &rules,
//!     &[],
//!     None,
//!     None,
//! );
//! assert!(result.violations.is_empty());
//! ```

pub mod error;
pub mod evaluators;
pub mod graph;
pub mod logging;
pub mod model;
pub mod orchestrator;
pub mod rules;
pub mod violation;

pub use error::{EngineError, EngineResult, GraphError, GraphResult, ModelError, ModelResult, RuleError, RuleResult};
pub use evaluators::{EvaluationContext, EvaluationResult, Evaluator, EvaluatorRegistry, EvaluatorStatus};
pub use graph::{CallEdge, CallGraph, CallGraphBuilder, CallType, PackageGraph, PackageGraphBuilder};
pub use model::{SourceModel, SourceModelBuilder};
pub use orchestrator::{AnalysisResult, AnalysisStats, CancellationToken, Orchestrator};
pub use rules::{InMemoryRuleRepository, Rule, RuleRepository, Severity};
pub use violation::Violation;
