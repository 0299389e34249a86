//! Circular-package-dependency evaluator (section 4.5): consumes only the
//! Package Dependency Graph (the Source Model and Call Graph play no part)
//! and reports each cycle Tarjan/DFS finds as its own violation.

use std::collections::HashMap;

use serde_json::Value;

use crate::evaluators::{EvaluationContext, EvaluationResult, Evaluator};
use crate::model::types::Location;
use crate::model::SourceModel;
use crate::rules::{Category, Rule};
use crate::violation::Violation;

pub struct CircularPackageDependencyEvaluator;

/// The location of an arbitrary type declared in `package`, used to anchor
/// a cycle violation somewhere traceable; packages with no known types
/// (third-party buckets swept up by the package graph builder) fall back to
/// an empty location rather than failing the evaluation.
fn anchor_location(model: &SourceModel, package: &str) -> Location {
    model
        .types_in_package(package)
        .first()
        .and_then(|fqn| model.type_by_fqn(fqn))
        .map(|t| t.location.clone())
        .unwrap_or_else(|| Location::point(Default::default(), 0, 0))
}

impl Evaluator for CircularPackageDependencyEvaluator {
    fn name(&self) -> &'static str {
        "circular-package-dependency"
    }

    fn supports(&self, rule: &Rule) -> bool {
        rule.id.starts_with("CIRCULAR-DEP") || rule.id.starts_with("CIRCULAR-PACKAGE") || rule.category == Category::CircularDependency
    }

    fn evaluate(&self, context: &EvaluationContext) -> EvaluationResult {
        let started = std::time::Instant::now();
        let cycles = context.package_graph.find_cycles();

        let violations = cycles
            .into_iter()
            .map(|cycle| {
                let anchor = cycle.first().cloned().unwrap_or_default();
                let mut violation_context: HashMap<String, Value> = HashMap::new();
                violation_context.insert("cycle".to_string(), Value::Array(cycle.iter().cloned().map(Value::String).collect()));

                Violation {
                    rule_id: context.rule.id.clone(),
                    rule_name: context.rule.name.clone(),
                    severity: context.rule.severity,
                    message: format!("circular package dependency: {}", cycle.join(" -> ")),
                    location: anchor_location(context.source_model, &anchor),
                    call_chain: Vec::new(),
                    context: violation_context,
                }
            })
            .collect::<Vec<_>>();

        EvaluationResult::success(
            context.rule.id.clone(),
            violations,
            started.elapsed().as_millis(),
            context.package_graph.packages().count(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PackageGraphBuilder;
    use crate::model::facts::{ParseUnit, TypeFact};
    use crate::model::types::{Modifiers, TypeKind};
    use crate::model::SourceModelBuilder;
    use std::path::PathBuf;

    fn loc() -> Location {
        Location::point(PathBuf::from("Foo.java"), 1, 1)
    }

    fn type_fact(fqn: &str, package: &str, supertypes: Vec<String>) -> TypeFact {
        TypeFact {
            fqn: fqn.into(),
            simple_name: fqn.rsplit('.').next().unwrap().into(),
            package: package.into(),
            kind: TypeKind::Class,
            modifiers: Modifiers::default(),
            annotations: vec![],
            supertypes,
            interfaces: vec![],
            location: loc(),
        }
    }

    /// S4: a two-package cycle produces exactly one violation with the
    /// canonicalized cycle recorded in `context["cycle"]`.
    #[test]
    fn s4_reports_one_violation_with_cycle_context() {
        let builder = SourceModelBuilder::new();
        builder.ingest_unit(ParseUnit {
            types: vec![
                type_fact("p.A", "p", vec!["q.B".into()]),
                type_fact("q.B", "q", vec!["p.A".into()]),
            ],
            ..Default::default()
        });
        let model = builder.freeze();
        let package_graph = PackageGraphBuilder::new(&model).build();
        let call_graph = crate::graph::CallGraphBuilder::new(&model).build(Vec::new());

        let rule: Rule = serde_json::from_str(r#"{"id": "CIRCULAR-DEP-001", "name": "No circular package dependencies"}"#).unwrap();
        let evaluator = CircularPackageDependencyEvaluator;
        let context = EvaluationContext {
            rule: &rule,
            source_model: &model,
            call_graph: &call_graph,
            package_graph: &package_graph,
            deadline: None,
        };
        let result = evaluator.evaluate(&context);
        assert_eq!(result.violations.len(), 1);
        let cycle = result.violations[0].context.get("cycle").unwrap().as_array().unwrap();
        assert_eq!(cycle.first(), cycle.last());
    }
}
