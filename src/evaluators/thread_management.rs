//! Thread-management evaluator (section 4.5): flags application methods
//! that directly construct or start the standard thread primitive.
//!
//! Unlike the other built-ins this is a single-edge check, not a chain
//! search: every application method is inspected for outgoing call edges
//! whose effective callee is a thread constructor or a `start()` call on a
//! sink type, and each matching call site produces its own violation.

use std::collections::HashMap;

use crate::evaluators::path_search::CompiledFilter;
use crate::evaluators::{EvaluationContext, EvaluationResult, Evaluator};
use crate::graph::CallType;
use crate::model::fqn::split_method_fqn;
use crate::rules::{Category, Rule};
use crate::violation::Violation;

pub struct ThreadManagementEvaluator;

/// True iff `call_type`/`callee_fqn` looks like "new Thread(...)" or
/// "thread.start()" rather than some other call on the same type.
fn is_construction_or_start(call_type: CallType, callee_fqn: &str) -> bool {
    if call_type == CallType::Constructor {
        return true;
    }
    matches!(split_method_fqn(callee_fqn), Some((_, simple_name, _)) if simple_name == "start")
}

impl Evaluator for ThreadManagementEvaluator {
    fn name(&self) -> &'static str {
        "thread-management"
    }

    fn supports(&self, rule: &Rule) -> bool {
        rule.id.starts_with("THREAD-MGMT") || rule.id.starts_with("THREAD-MANAGEMENT") || rule.category == Category::Other("THREAD_MANAGEMENT".into())
    }

    fn evaluate(&self, context: &EvaluationContext) -> EvaluationResult {
        let started = std::time::Instant::now();
        let sink_filter = CompiledFilter::compile(&context.rule.detection.sinks);
        if sink_filter.is_empty() {
            return EvaluationResult::success(context.rule.id.clone(), Vec::new(), started.elapsed().as_millis(), 0);
        }

        let mut methods: Vec<&crate::model::Method> = context.source_model.all_methods().collect();
        methods.sort_by(|a, b| a.fqn.cmp(&b.fqn));

        let mut violations = Vec::new();
        let mut nodes_analyzed = 0usize;

        for method in methods {
            for edge in context.call_graph.outgoing(&method.fqn) {
                nodes_analyzed += 1;
                let callee = edge.effective_callee();
                if !is_construction_or_start(edge.call_type, callee) {
                    continue;
                }
                if !sink_filter.matches_fqn(context.source_model, callee) {
                    continue;
                }

                violations.push(Violation {
                    rule_id: context.rule.id.clone(),
                    rule_name: context.rule.name.clone(),
                    severity: context.rule.severity,
                    message: format!("{} directly manages a thread via {}", method.fqn, callee),
                    location: edge.location.clone(),
                    call_chain: vec![method.fqn.clone()],
                    context: HashMap::new(),
                });
            }
        }

        EvaluationResult::success(context.rule.id.clone(), violations, started.elapsed().as_millis(), nodes_analyzed)
    }
}
