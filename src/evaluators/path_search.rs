//! The shared entry-point → sink chain-search algorithm (section 4.4)
//! reused by every built-in evaluator that is shaped as "entry predicate,
//! sink predicate, path constraints".

use std::collections::HashMap;

use regex::Regex;

use crate::graph::{matches_sink_type, CallGraph};
use crate::model::{Method, SourceModel};
use crate::rules::{DetectionFilter, Rule};
use crate::violation::Violation;

/// Compiled view of a [`DetectionFilter`] (method patterns are compiled
/// once per evaluation rather than per candidate method. Shared with the
/// JDBC evaluators, which need the same dimension matching but a different
/// entry-point selection strategy (positive vs. negative annotation filter).
pub(crate) struct CompiledFilter {
    annotations: Vec<String>,
    types: Vec<String>,
    patterns: Vec<Regex>,
}

impl CompiledFilter {
    pub(crate) fn compile(filter: &DetectionFilter) -> Self {
        Self {
            annotations: filter.annotations.clone(),
            types: filter.types.clone(),
            patterns: filter
                .method_patterns
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.types.is_empty() && self.patterns.is_empty()
    }

    pub(crate) fn has_annotation_dimension(&self, method: &Method) -> bool {
        self.annotations.iter().any(|a| method.has_annotation(a))
    }

    /// True if `method` (an application method with a known declaration)
    /// satisfies this filter through any dimension.
    pub(crate) fn matches_method(&self, model: &SourceModel, method: &Method) -> bool {
        if self.annotations.iter().any(|a| method.has_annotation(a)) {
            return true;
        }
        if self.types.iter().any(|t| matches_sink_type(model, &method.fqn, t)) {
            return true;
        }
        self.patterns.iter().any(|re| re.is_match(&method.fqn))
    }

    /// True if `fqn` (which may name a library method with no model entry)
    /// satisfies this filter. Used for sink matching, where the target is
    /// frequently outside the analyzed sources.
    pub(crate) fn matches_fqn(&self, model: &SourceModel, fqn: &str) -> bool {
        if let Some(method) = model.method_by_fqn(fqn) {
            if self.matches_method(model, method) {
                return true;
            }
        }
        if self.types.iter().any(|t| matches_sink_type(model, fqn, t)) {
            return true;
        }
        self.patterns.iter().any(|re| re.is_match(fqn))
    }
}

/// Runs a rule's `{entryPoints, sinks, pathConstraints}` block against
/// `model`/`call_graph` and returns every accepted violation, in the
/// documented DFS discovery order.
pub fn evaluate_chain_rule(rule: &Rule, model: &SourceModel, call_graph: &CallGraph) -> Vec<Violation> {
    let entry_filter = CompiledFilter::compile(&rule.detection.entry_points);
    let sink_filter = CompiledFilter::compile(&rule.detection.sinks);

    if entry_filter.is_empty() || sink_filter.is_empty() {
        return Vec::new();
    }

    let constraints = &rule.detection.path_constraints;
    let mut violations = Vec::new();

    let mut entry_methods: Vec<&Method> = model
        .all_methods()
        .filter(|m| entry_filter.matches_method(model, m))
        .collect();
    entry_methods.sort_by(|a, b| a.fqn.cmp(&b.fqn));

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
                message: format!(
                    "{} reaches a matching sink via {}",
                    entry.fqn,
                    chain.last().expect("chain always has at least the entry point")
                ),
                location: entry.location.clone(),
                call_chain: chain,
                context: HashMap::new(),
            });
        }
    }

    violations
}
