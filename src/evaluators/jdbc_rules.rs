//! JDBC usage evaluators (section 4.5): two rule shapes sharing the same
//! data-access-template sink, differing in how the entry point is chosen:
//! one positive (inside a retry), one negative (outside a transaction).

use crate::evaluators::path_search::CompiledFilter;
use crate::evaluators::{EvaluationContext, EvaluationResult, Evaluator};
use crate::graph::CallGraph;
use crate::model::{Method, SourceModel};
use crate::rules::Rule;
use crate::violation::Violation;
use std::collections::HashMap;

fn run_chain_search(
    rule: &Rule,
    model: &SourceModel,
    call_graph: &CallGraph,
    entry_methods: Vec<&Method>,
) -> Vec<Violation> {
    let sink_filter = CompiledFilter::compile(&rule.detection.sinks);
    if sink_filter.is_empty() {
        return Vec::new();
    }
    let constraints = &rule.detection.path_constraints;
    let mut violations = Vec::new();

    for entry in entry_methods {
        let chains = call_graph.chains_to_sinks(
            &entry.fqn,
            |fqn| sink_filter.matches_fqn(model, fqn),
            constraints.max_depth,
        );
        for chain in chains {
            if !constraints.must_contain.iter().all(|needed| chain.contains(needed)) {
                continue;
            }
            if constraints.must_not_contain.iter().any(|forbidden| chain.contains(forbidden)) {
                continue;
            }
            violations.push(Violation {
                rule_id: rule.id.clone(),
                rule_name: rule.name.clone(),
                severity: rule.severity,
                message: format!("{} reaches a data-access sink via {}", entry.fqn, chain.last().unwrap()),
                location: entry.location.clone(),
                call_chain: chain,
                context: HashMap::new(),
            });
        }
    }
    violations
}

/// Positive filter: entry points are exactly the methods matching
/// `detection.entryPoints` (typically `@Retryable`), same as every other
/// chain-shaped evaluator.
pub struct JdbcInRetryEvaluator;

impl Evaluator for JdbcInRetryEvaluator {
    fn name(&self) -> &'static str {
        "jdbc-in-retry"
    }

    fn supports(&self, rule: &Rule) -> bool {
        rule.id.starts_with("JDBC-IN-RETRY")
    }

    fn evaluate(&self, context: &EvaluationContext) -> EvaluationResult {
        let started = std::time::Instant::now();
        let entry_filter = CompiledFilter::compile(&context.rule.detection.entry_points);
        let mut entries: Vec<&Method> = context
            .source_model
            .all_methods()
            .filter(|m| entry_filter.matches_method(context.source_model, m))
            .collect();
        entries.sort_by(|a, b| a.fqn.cmp(&b.fqn));

        let violations = run_chain_search(context.rule, context.source_model, context.call_graph, entries);
        EvaluationResult::success(
            context.rule.id.clone(),
            violations,
            started.elapsed().as_millis(),
            context.source_model.all_methods().count(),
        )
    }
}

/// Negative filter: entry points are every application method that does
/// *not* carry any of the annotations named in `detection.entryPoints`
/// (read here as the exclusion set: the rule author names the
/// transaction-marking annotation(s), e.g. `Transactional`, to exclude).
pub struct JdbcOutsideTransactionEvaluator;

impl Evaluator for JdbcOutsideTransactionEvaluator {
    fn name(&self) -> &'static str {
        "jdbc-outside-transaction"
    }

    fn supports(&self, rule: &Rule) -> bool {
        rule.id.starts_with("JDBC-OUTSIDE-TX") || rule.id.starts_with("JDBC-OUTSIDE-TRANSACTION")
    }

    fn evaluate(&self, context: &EvaluationContext) -> EvaluationResult {
        let started = std::time::Instant::now();
        let exclusion_filter = CompiledFilter::compile(&context.rule.detection.entry_points);
        let mut entries: Vec<&Method> = context
            .source_model
            .all_methods()
            .filter(|m| !exclusion_filter.has_annotation_dimension(m))
            .collect();
        entries.sort_by(|a, b| a.fqn.cmp(&b.fqn));

        let violations = run_chain_search(context.rule, context.source_model, context.call_graph, entries);
        EvaluationResult::success(
            context.rule.id.clone(),
            violations,
            started.elapsed().as_millis(),
            context.source_model.all_methods().count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CallGraphBuilder;
    use crate::model::facts::{CallFact, CallKind, MethodFact, ParseUnit, TypeFact};
    use crate::model::types::{AnnotationRef, Location, Modifiers, TypeKind, TypeRef};
    use crate::model::SourceModelBuilder;
    use std::path::PathBuf;

    fn loc() -> Location {
        Location::point(PathBuf::from("Foo.java"), 1, 1)
    }

    #[test]
    fn jdbc_outside_transaction_flags_only_the_non_transactional_method() {
        let builder = SourceModelBuilder::new();
        builder.ingest_unit(ParseUnit {
            types: vec![TypeFact {
                fqn: "Repo".into(),
                simple_name: "Repo".into(),
                package: "".into(),
                kind: TypeKind::Class,
                modifiers: Modifiers::default(),
                annotations: vec![],
                supertypes: vec![],
                interfaces: vec![],
                location: loc(),
            }],
            methods: vec![
                MethodFact {
                    fqn: "Repo#safe()".into(),
                    simple_name: "safe".into(),
                    containing_type_fqn: "Repo".into(),
                    return_type: TypeRef::simple("void"),
                    parameters: vec![],
                    modifiers: Modifiers::default(),
                    annotations: vec![AnnotationRef::new(
                        "Transactional",
                        "org.springframework.transaction.annotation.Transactional",
                    )],
                    thrown: vec![],
                    location: loc(),
                },
                MethodFact {
                    fqn: "Repo#unsafe()".into(),
                    simple_name: "unsafe".into(),
                    containing_type_fqn: "Repo".into(),
                    return_type: TypeRef::simple("void"),
                    parameters: vec![],
                    modifiers: Modifiers::default(),
                    annotations: vec![],
                    thrown: vec![],
                    location: loc(),
                },
            ],
            calls: vec![
                CallFact {
                    caller_fqn: "Repo#safe()".into(),
                    callee_fqn: "org.springframework.jdbc.core.JdbcTemplate#query(String)".into(),
                    resolved_callee_fqn: None,
                    call_kind: CallKind::Direct,
                    location: loc(),
                },
                CallFact {
                    caller_fqn: "Repo#unsafe()".into(),
                    callee_fqn: "org.springframework.jdbc.core.JdbcTemplate#query(String)".into(),
                    resolved_callee_fqn: None,
                    call_kind: CallKind::Direct,
                    location: loc(),
                },
            ],
            ..Default::default()
        });
        let call_facts = builder.call_facts();
        let model = builder.freeze();
        let graph = CallGraphBuilder::new(&model).build(call_facts);

        let rule: Rule = serde_json::from_str(
            r#"{
                "id": "JDBC-OUTSIDE-TX-001",
                "name": "JDBC outside a transaction",
                "detection": {
                    "entryPoints": { "annotations": ["Transactional"] },
                    "sinks": { "types": ["org.springframework.jdbc.core.JdbcTemplate"] }
                }
            }"#,
        )
        .unwrap();
        let exclusion_filter = CompiledFilter::compile(&rule.detection.entry_points);
        let entries: Vec<&Method> = model.all_methods().filter(|m| !exclusion_filter.has_annotation_dimension(m)).collect();
        let violations = run_chain_search(&rule, &model, &graph, entries);

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].call_chain.first().unwrap(), "Repo#unsafe()");
    }
}
