//! Transaction-boundary evaluator (section 4.5): `@Transactional` methods
//! must not reach a remote-call sink.

use crate::evaluators::path_search::evaluate_chain_rule;
use crate::evaluators::{EvaluationContext, EvaluationResult, Evaluator};
use crate::rules::{Category, Rule};

pub struct TransactionBoundaryEvaluator;

impl Evaluator for TransactionBoundaryEvaluator {
    fn name(&self) -> &'static str {
        "transaction-boundary"
    }

    fn supports(&self, rule: &Rule) -> bool {
        rule.id.starts_with("TX-BOUNDARY") || rule.category == Category::TransactionSafety
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
