//! Async-in-transaction evaluator (section 4.5): `@Transactional` methods
//! must not reach an `@Async` method. Same entry/sink/path-constraint
//! search as transaction-boundary, but the sink dimension is an annotation
//! rather than a type (`evaluate_chain_rule` already treats both
//! dimensions uniformly, so no bespoke traversal is needed here.

use crate::evaluators::path_search::evaluate_chain_rule;
use crate::evaluators::{EvaluationContext, EvaluationResult, Evaluator};
use crate::rules::{Category, Rule};

pub struct AsyncInTransactionEvaluator;

impl Evaluator for AsyncInTransactionEvaluator {
    fn name(&self) -> &'static str {
        "async-in-transaction"
    }

    fn supports(&self, rule: &Rule) -> bool {
        rule.id.starts_with("ASYNC-IN-TX") || rule.id.starts_with("ASYNC-TRANSACTION") || rule.category == Category::AsyncSafety
    }

    fn evaluate(&self, context: &EvaluationContext) -> EvaluationResult {
        let started = std::time::Instant::now();
        let violations = evaluate_chain_rule(context.rule, context.source_model, context.call_graph);
        EvaluationResult::success(
            context.rule.id.clone(),
            violations,
            started.elapsed().as_millis(),
            context.source_model.all_methods().count(),
        )
    }
}
