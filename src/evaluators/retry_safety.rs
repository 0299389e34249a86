//! Retry-safety evaluator (section 4.5): `@Retryable` methods must not
//! invoke a non-idempotent remote operation. Idempotency is expressed
//! through the rule's sink `methodPatterns` (e.g. `post(For.*)?`), not a
//! built-in list, this evaluator is otherwise the same entry/sink/path
//! search as transaction-boundary.

use crate::evaluators::path_search::evaluate_chain_rule;
use crate::evaluators::{EvaluationContext, EvaluationResult, Evaluator};
use crate::rules::{Category, Rule};

pub struct RetrySafetyEvaluator;

impl Evaluator for RetrySafetyEvaluator {
    fn name(&self) -> &'static str {
        "retry-safety"
    }

    fn supports(&self, rule: &Rule) -> bool {
        rule.id.starts_with("RETRY") || rule.id.starts_with("REMOTE-RETRY") || rule.category == Category::RetrySafety
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
