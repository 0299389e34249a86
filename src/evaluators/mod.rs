//! Evaluator framework (section 4.5): pluggable rule evaluators dispatched
//! by a linear `supports` scan.

pub mod async_in_transaction;
pub mod circular_package_dependency;
pub mod jdbc_rules;
pub mod layered_architecture;
pub mod path_search;
pub mod retry_safety;
pub mod thread_management;
pub mod transaction_boundary;

use std::time::Duration;

use tracing::{instrument, warn};

use crate::graph::{CallGraph, PackageGraph};
use crate::model::SourceModel;
use crate::rules::Rule;
use crate::violation::Violation;

/// `idle -> running -> (success | error | skipped)` (section 4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorStatus {
    Success,
    Error,
    Skipped,
}

/// The read-only context handed to every evaluator run.
pub struct EvaluationContext<'a> {
    pub rule: &'a Rule,
    pub source_model: &'a SourceModel,
    pub call_graph: &'a CallGraph,
    pub package_graph: &'a PackageGraph,
    /// Soft wall-clock budget for this rule's evaluation; evaluators that
    /// perform bounded DFS should check it periodically and return a
    /// `timeout` error result rather than run unbounded.
    pub deadline: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub rule_id: String,
    pub violations: Vec<Violation>,
    pub duration_ms: u128,
    pub nodes_analyzed: usize,
    pub status: EvaluatorStatus,
    pub error_message: Option<String>,
}

impl EvaluationResult {
    pub fn success(rule_id: impl Into<String>, violations: Vec<Violation>, duration_ms: u128, nodes_analyzed: usize) -> Self {
        Self {
            rule_id: rule_id.into(),
            violations,
            duration_ms,
            nodes_analyzed,
            status: EvaluatorStatus::Success,
            error_message: None,
        }
    }

    pub fn error(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            violations: Vec::new(),
            duration_ms: 0,
            nodes_analyzed: 0,
            status: EvaluatorStatus::Error,
            error_message: Some(message.into()),
        }
    }

    pub fn skipped(rule_id: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            violations: Vec::new(),
            duration_ms: 0,
            nodes_analyzed: 0,
            status: EvaluatorStatus::Skipped,
            error_message: None,
        }
    }
}

/// A pluggable rule evaluator. `supports` must be pure and side-effect free:
/// the registry may call it many times while searching for a handler.
pub trait Evaluator: Send + Sync {
    fn name(&self) -> &'static str;
    fn supports(&self, rule: &Rule) -> bool;
    fn evaluate(&self, context: &EvaluationContext) -> EvaluationResult;
}

/// Linear-scan dispatch table: the first registered evaluator whose
/// `supports` returns true handles the rule. At most one evaluator per rule.
#[derive(Default)]
pub struct EvaluatorRegistry {
    evaluators: Vec<Box<dyn Evaluator>>,
}

impl EvaluatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The seven built-in evaluators, registered in the order they appear
    /// in the documented evaluator table.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(transaction_boundary::TransactionBoundaryEvaluator));
        registry.register(Box::new(retry_safety::RetrySafetyEvaluator));
        registry.register(Box::new(jdbc_rules::JdbcInRetryEvaluator));
        registry.register(Box::new(jdbc_rules::JdbcOutsideTransactionEvaluator));
        registry.register(Box::new(thread_management::ThreadManagementEvaluator));
        registry.register(Box::new(async_in_transaction::AsyncInTransactionEvaluator));
        registry.register(Box::new(circular_package_dependency::CircularPackageDependencyEvaluator));
        registry.register(Box::new(layered_architecture::LayeredArchitectureEvaluator));
        registry
    }

    pub fn register(&mut self, evaluator: Box<dyn Evaluator>) {
        self.evaluators.push(evaluator);
    }

    pub fn find_for(&self, rule: &Rule) -> Option<&dyn Evaluator> {
        self.evaluators.iter().find(|e| e.supports(rule)).map(Box::as_ref)
    }

    /// Dispatches `rule` to the first supporting evaluator, wrapping any
    /// panic-free internal failure as an `error` result. Never panics.
    #[instrument(skip(self, context), fields(rule_id = %context.rule.id))]
    pub fn run(&self, context: &EvaluationContext) -> EvaluationResult {
        let rule = context.rule;
        match self.find_for(rule) {
            Some(evaluator) => {
                let started = std::time::Instant::now();
                let mut result = evaluator.evaluate(context);
                if result.duration_ms == 0 {
                    result.duration_ms = started.elapsed().as_millis();
                }
                result
            }
            None => {
                warn!(rule_id = %rule.id, "no evaluator supports this rule");
                EvaluationResult::skipped(rule.id.clone())
            }
        }
    }
}
