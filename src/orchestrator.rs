//! Evaluation Orchestrator (section 4.6): wires the leaves-first pipeline
//! together (parse, build model, build graphs, load rules, dispatch each
//! rule to an evaluator, aggregate) and produces the final report.
//!
//! Per the concurrency model (section 5), per-rule evaluation is
//! embarrassingly parallel once the Source Model and graphs are frozen, so
//! [`Orchestrator::analyze`] fans the selected rules out across rayon's
//! global pool while preserving result ordering keyed to the input rule
//! list.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::evaluators::{EvaluationContext, EvaluationResult, EvaluatorRegistry};
use crate::graph::{CallGraph, CallGraphBuilder, PackageGraph, PackageGraphBuilder};
use crate::model::facts::{ParseOptions, ParserAdapter};
use crate::model::{SourceModel, SourceModelBuilder};
use crate::rules::{Rule, RuleRepository};
use crate::violation::{dedup_violations, Violation};

/// Aggregate run statistics (section 4.6: `stats{files,types,methods,rules,durationMs}`).
#[derive(Debug, Clone, Default)]
pub struct AnalysisStats {
    pub files: usize,
    pub types: usize,
    pub methods: usize,
    pub rules: usize,
    pub duration_ms: u128,
}

/// The orchestrator's final aggregate: every accepted, deduplicated
/// violation; the per-rule evaluator results (including `skipped`/`error`
/// ones, which are not violations); and run statistics.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    pub violations: Vec<Violation>,
    pub rule_results: Vec<EvaluationResult>,
    pub stats: AnalysisStats,
}

/// Cooperative cancellation handle: when set, in-flight and not-yet-started
/// rule evaluations short-circuit to `skipped` (section 5, "Global
/// cancellation causes all in-flight evaluators to short-circuit").
#[derive(Debug, Default)]
pub struct CancellationToken(AtomicBool);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Leaves-first pipeline driver: parse -> build model -> build graphs ->
/// load rules -> for each rule, pick evaluator -> run -> aggregate.
pub struct Orchestrator<'a> {
    registry: &'a EvaluatorRegistry,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a EvaluatorRegistry) -> Self {
        Self { registry }
    }

    /// Runs the full pipeline against `source_root`, evaluating
    /// `requested_rule_ids` (empty = every enabled rule, per section 4.6).
    ///
    /// `per_rule_deadline` bounds each individual rule's DFS budget;
    /// `cancellation` is checked before each rule starts and causes the
    /// remaining rules to resolve as `skipped` rather than run.
    #[instrument(skip(self, parser, rules, cancellation))]
    pub fn analyze(
        &self,
        parser: &dyn ParserAdapter,
        source_root: &Path,
        parse_options: &ParseOptions,
        rules: &dyn RuleRepository,
        requested_rule_ids: &[String],
        per_rule_deadline: Option<Duration>,
        cancellation: Option<&CancellationToken>,
    ) -> AnalysisResult {
        let started = Instant::now();

        let parse_output = parser.parse(source_root, parse_options);
        for failure in &parse_output.failures {
            warn!(error = %failure, "parser adapter reported a per-file failure");
        }

        let builder = SourceModelBuilder::new();
        builder.ingest_all(parse_output.units);
        let call_facts = builder.call_facts();
        let model = builder.freeze();

        let call_graph = CallGraphBuilder::new(&model).build(call_facts);
        let package_graph = PackageGraphBuilder::new(&model).build();

        let selected_rules = self.select_rules(rules, requested_rule_ids);
        info!(rule_count = selected_rules.len(), "dispatching rule evaluation");

        let rule_results = self.evaluate_rules(&selected_rules, &model, &call_graph, &package_graph, per_rule_deadline, cancellation);

        let violations: Vec<Violation> = rule_results.iter().flat_map(|r| r.violations.clone()).collect();
        let violations = dedup_violations(violations);

        AnalysisResult {
            violations,
            rule_results,
            stats: AnalysisStats {
                files: parse_output.stats.files_scanned,
                types: model.all_types().count(),
                methods: model.all_methods().count(),
                rules: selected_rules.len(),
                duration_ms: started.elapsed().as_millis(),
            },
        }
    }

    /// Rules to evaluate, preserving the caller's requested order; unknown
    /// ids are silently dropped (the caller can detect them by comparing
    /// `requested_rule_ids.len()` against the returned count, if it cares).
    fn select_rules(&self, rules: &dyn RuleRepository, requested_rule_ids: &[String]) -> Vec<Rule> {
        if requested_rule_ids.is_empty() {
            let mut found: Vec<Rule> = rules.find_enabled().into_iter().cloned().collect();
            found.sort_by(|a, b| a.id.cmp(&b.id));
            found
        } else {
            requested_rule_ids
                .iter()
                .filter_map(|id| rules.find_by_id(id).cloned())
                .collect()
        }
    }

    /// Runs every selected rule, in parallel, preserving per-rule result
    /// ordering by zipping back against the input order (section 5:
    /// "per-rule result ordering is preserved by keying results to rule ids").
    fn evaluate_rules(
        &self,
        selected_rules: &[Rule],
        model: &SourceModel,
        call_graph: &CallGraph,
        package_graph: &PackageGraph,
        per_rule_deadline: Option<Duration>,
        cancellation: Option<&CancellationToken>,
    ) -> Vec<EvaluationResult> {
        selected_rules
            .par_iter()
            .map(|rule| {
                if cancellation.is_some_and(CancellationToken::is_cancelled) {
                    return EvaluationResult::skipped(rule.id.clone());
                }
                let context = EvaluationContext {
                    rule,
                    source_model: model,
                    call_graph,
                    package_graph,
                    deadline: per_rule_deadline,
                };
                self.registry.run(&context)
            })
            .collect()
    }
}

/// Exit-code convention (section 6, informational only for a hosting CLI):
/// `0` iff no violation reaches `error` or `blocker` severity.
pub fn has_failing_violations(violations: &[Violation]) -> bool {
    use crate::rules::Severity;
    violations.iter().any(|v| v.severity >= Severity::Error)
}
