//! Layered-architecture evaluator (section 4.5): verifies that cross-tier
//! package edges only flow in the declared allowed direction.
//!
//! This rule shape has no entry points or sinks, it consumes only the
//! Package Dependency Graph, plus a rule-specific `config` block naming the
//! tiers and the allowed tier-to-tier arrows:
//!
//! ```json
//! "config": {
//!   "layers": [
//!     { "name": "controller", "packages": ["com.acme.web"] },
//!     { "name": "service", "packages": ["com.acme.service"] },
//!     { "name": "repository", "packages": ["com.acme.repository"] }
//!   ],
//!   "allowedDependencies": { "controller": ["service"], "service": ["repository"] }
//! }
//! ```
//!
//! A package not named under any layer is not subject to this rule. Same-tier
//! edges are always allowed; a cross-tier edge is a violation unless the
//! target tier appears in the source tier's allowed list.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::evaluators::{EvaluationContext, EvaluationResult, Evaluator};
use crate::model::types::Location;
use crate::model::SourceModel;
use crate::rules::{Category, Rule};
use crate::violation::Violation;

pub struct LayeredArchitectureEvaluator;

#[derive(Debug, Clone, Deserialize)]
struct LayerDef {
    name: String,
    #[serde(default)]
    packages: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LayeredConfig {
    #[serde(default)]
    layers: Vec<LayerDef>,
    #[serde(default, rename = "allowedDependencies")]
    allowed_dependencies: HashMap<String, Vec<String>>,
}

impl LayeredConfig {
    fn from_rule(rule: &Rule) -> Self {
        let raw = Value::Object(rule.config.clone().into_iter().collect());
        serde_json::from_value(raw).unwrap_or_default()
    }

    /// The tier owning `package`, chosen as the longest matching prefix
    /// across every declared layer (ties broken by declaration order).
    fn tier_of(&self, package: &str) -> Option<&str> {
        self.layers
            .iter()
            .filter_map(|layer| {
                layer
                    .packages
                    .iter()
                    .filter(|p| package == p.as_str() || package.starts_with(&format!("{p}.")))
                    .map(|p| p.len())
                    .max()
                    .map(|best_len| (best_len, layer.name.as_str()))
            })
            .max_by_key(|(len, _)| *len)
            .map(|(_, name)| name)
    }

    fn allows(&self, from_tier: &str, to_tier: &str) -> bool {
        if from_tier == to_tier {
            return true;
        }
        self.allowed_dependencies
            .get(from_tier)
            .map(|allowed| allowed.iter().any(|t| t == to_tier))
            .unwrap_or(false)
    }
}

fn anchor_location(model: &SourceModel, package: &str) -> Location {
    model
        .types_in_package(package)
        .first()
        .and_then(|fqn| model.type_by_fqn(fqn))
        .map(|t| t.location.clone())
        .unwrap_or_else(|| Location::point(Default::default(), 0, 0))
}

impl Evaluator for LayeredArchitectureEvaluator {
    fn name(&self) -> &'static str {
        "layered-architecture"
    }

    fn supports(&self, rule: &Rule) -> bool {
        rule.id.starts_with("LAYERED-ARCH") || rule.category == Category::LayeredArchitecture
    }

    fn evaluate(&self, context: &EvaluationContext) -> EvaluationResult {
        let started = std::time::Instant::now();
        let config = LayeredConfig::from_rule(context.rule);
        if config.layers.is_empty() {
            return EvaluationResult::success(context.rule.id.clone(), Vec::new(), started.elapsed().as_millis(), 0);
        }

        let mut packages: Vec<&str> = context.package_graph.packages().collect();
        packages.sort_unstable();

        let mut violations = Vec::new();
        let mut edges_checked = 0usize;

        for package in packages {
            let Some(from_tier) = config.tier_of(package) else { continue };
            for target in context.package_graph.depends_on(package) {
                edges_checked += 1;
                let Some(to_tier) = config.tier_of(target) else { continue };
                if config.allows(from_tier, to_tier) {
                    continue;
                }
                violations.push(Violation {
                    rule_id: context.rule.id.clone(),
                    rule_name: context.rule.name.clone(),
                    severity: context.rule.severity,
                    message: format!("layer '{from_tier}' ({package}) must not depend on layer '{to_tier}' ({target})"),
                    location: anchor_location(context.source_model, package),
                    call_chain: Vec::new(),
                    context: HashMap::from([
                        ("fromLayer".to_string(), Value::String(from_tier.to_string())),
                        ("toLayer".to_string(), Value::String(to_tier.to_string())),
                        ("fromPackage".to_string(), Value::String(package.to_string())),
                        ("toPackage".to_string(), Value::String(target.to_string())),
                    ]),
                });
            }
        }

        EvaluationResult::success(context.rule.id.clone(), violations, started.elapsed().as_millis(), edges_checked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CallGraphBuilder, PackageGraphBuilder};
    use crate::model::facts::{ParseUnit, TypeFact};
    use crate::model::types::{Modifiers, TypeKind};
    use crate::model::SourceModelBuilder;
    use std::path::PathBuf;

    fn loc() -> crate::model::types::Location {
        crate::model::types::Location::point(PathBuf::from("Foo.java"), 1, 1)
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

    fn rule_with_config(config_json: &str) -> Rule {
        let json = format!(
            r#"{{"id": "LAYERED-ARCH-001", "name": "Layered architecture", "config": {config_json}}}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn reverse_layer_dependency_is_flagged() {
        let builder = SourceModelBuilder::new();
        builder.ingest_unit(ParseUnit {
            types: vec![
                type_fact("com.acme.repository.Repo", "com.acme.repository", vec!["com.acme.web.Controller".into()]),
                type_fact("com.acme.web.Controller", "com.acme.web", vec![]),
            ],
            ..Default::default()
        });
        let model = builder.freeze();
        let package_graph = PackageGraphBuilder::new(&model).build();
        let call_graph = CallGraphBuilder::new(&model).build(Vec::new());

        let rule = rule_with_config(
            r#"{
                "layers": [
                    {"name": "controller", "packages": ["com.acme.web"]},
                    {"name": "repository", "packages": ["com.acme.repository"]}
                ],
                "allowedDependencies": {"controller": ["repository"]}
            }"#,
        );

        let evaluator = LayeredArchitectureEvaluator;
        let context = EvaluationContext {
            rule: &rule,
            source_model: &model,
            call_graph: &call_graph,
            package_graph: &package_graph,
            deadline: None,
        };
        let result = evaluator.evaluate(&context);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].context.get("fromLayer").unwrap(), "repository");
    }

    #[test]
    fn allowed_direction_produces_no_violations() {
        let builder = SourceModelBuilder::new();
        builder.ingest_unit(ParseUnit {
            types: vec![
                type_fact("com.acme.web.Controller", "com.acme.web", vec!["com.acme.repository.Repo".into()]),
                type_fact("com.acme.repository.Repo", "com.acme.repository", vec![]),
            ],
            ..Default::default()
        });
        let model = builder.freeze();
        let package_graph = PackageGraphBuilder::new(&model).build();
        let call_graph = CallGraphBuilder::new(&model).build(Vec::new());

        let rule = rule_with_config(
            r#"{
                "layers": [
                    {"name": "controller", "packages": ["com.acme.web"]},
                    {"name": "repository", "packages": ["com.acme.repository"]}
                ],
                "allowedDependencies": {"controller": ["repository"]}
            }"#,
        );
        let evaluator = LayeredArchitectureEvaluator;
        let context = EvaluationContext {
            rule: &rule,
            source_model: &model,
            call_graph: &call_graph,
            package_graph: &package_graph,
            deadline: None,
        };
        assert!(evaluator.evaluate(&context).violations.is_empty());
    }
}
