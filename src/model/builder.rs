//! Source Model Builder (section 4.1).
//!
//! Consumes a stream of [`ParseUnit`]s (one per compilation unit) and
//! accumulates them into a mutable, thread-safe staging area. Per the
//! concurrency model (section 5), ingestion may happen from multiple
//! parser-adapter worker threads concurrently; `freeze` is the one-way
//! transition into the read-only [`SourceModel`] that the rest of the
//! pipeline shares.

use dashmap::DashMap;
use rayon::prelude::*;

use crate::model::facts::{CallFact, ParseUnit};
use crate::model::fqn::canonicalize;
use crate::model::relationship::{Relationship, RelationshipKind};
use crate::model::source_model::{Diagnostic, SourceModel};
use crate::model::types::{Field, Method, Type};

/// Builder holding mutable, concurrency-safe maps until [`Self::freeze`] is called.
///
/// `is_frozen` is an invariant of the type system, not a runtime check:
/// a `SourceModelBuilder` can only ever be turned into a `SourceModel` by
/// consuming `self`, so there is no way to observe a builder after freeze.
#[derive(Default)]
pub struct SourceModelBuilder {
    types: DashMap<String, Type>,
    methods: DashMap<String, Method>,
    fields: DashMap<String, Field>,
    relationships: DashMap<usize, Relationship>,
    next_relationship_id: std::sync::atomic::AtomicUsize,
    diagnostics: DashMap<usize, Diagnostic>,
    next_diagnostic_id: std::sync::atomic::AtomicUsize,
    calls: DashMap<usize, CallFact>,
    next_call_id: std::sync::atomic::AtomicUsize,
}

impl SourceModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests every unit in `units`, in parallel when more than one is given.
    pub fn ingest_all(&self, units: Vec<ParseUnit>) {
        units.into_par_iter().for_each(|unit| self.ingest_unit(unit));
    }

    /// Ingests a single compilation unit's facts.
    ///
    /// Every incoming FQN is run through [`canonicalize`] first, so adapters
    /// that still emit the historical dotted method form are normalized to
    /// the `#`-separated shape before anything is stored or matched against.
    ///
    /// Duplicate FQNs are never last-write-wins: the first declaration
    /// published wins and every subsequent one is recorded as a diagnostic.
    pub fn ingest_unit(&self, unit: ParseUnit) {
        for mut type_fact in unit.types {
            type_fact.fqn = canonicalize(&type_fact.fqn);
            type_fact.supertypes = type_fact.supertypes.iter().map(|s| canonicalize(s)).collect();
            type_fact.interfaces = type_fact.interfaces.iter().map(|s| canonicalize(s)).collect();
            let fqn = type_fact.fqn.clone();
            let relationships = self.relationships_for_type(&type_fact);
            if self.types.contains_key(&fqn) {
                self.diagnose(Diagnostic::DuplicateFqn { kind: "type", fqn });
                continue;
            }
            self.types.insert(
                fqn.clone(),
                Type {
                    fqn: type_fact.fqn,
                    simple_name: type_fact.simple_name,
                    package: type_fact.package,
                    kind: type_fact.kind,
                    modifiers: type_fact.modifiers,
                    annotations: type_fact.annotations,
                    supertypes: type_fact.supertypes,
                    interfaces: type_fact.interfaces,
                    location: type_fact.location,
                },
            );
            for r in relationships {
                self.push_relationship(r);
            }
        }

        for mut method_fact in unit.methods {
            method_fact.fqn = canonicalize(&method_fact.fqn);
            method_fact.containing_type_fqn = canonicalize(&method_fact.containing_type_fqn);
            let fqn = method_fact.fqn.clone();
            if self.methods.contains_key(&fqn) {
                self.diagnose(Diagnostic::DuplicateFqn { kind: "method", fqn });
                continue;
            }
            self.push_relationship(Relationship::new(
                RelationshipKind::Contains,
                method_fact.containing_type_fqn.clone(),
                fqn.clone(),
            ));
            self.push_relationship(Relationship::new(
                RelationshipKind::UsesType,
                fqn.clone(),
                method_fact.return_type.fqn.clone(),
            ));
            for param in &method_fact.parameters {
                self.push_relationship(Relationship::new(
                    RelationshipKind::UsesType,
                    fqn.clone(),
                    param.type_ref.fqn.clone(),
                ));
            }
            for thrown in &method_fact.thrown {
                self.push_relationship(Relationship::new(RelationshipKind::Throws, fqn.clone(), thrown.clone()));
            }
            for annotation in &method_fact.annotations {
                self.push_relationship(Relationship::new(
                    RelationshipKind::AnnotatedWith,
                    fqn.clone(),
                    annotation.fqn.clone(),
                ));
            }
            self.methods.insert(
                fqn.clone(),
                Method {
                    fqn: method_fact.fqn,
                    simple_name: method_fact.simple_name,
                    containing_type_fqn: method_fact.containing_type_fqn,
                    return_type: method_fact.return_type,
                    parameters: method_fact.parameters,
                    modifiers: method_fact.modifiers,
                    annotations: method_fact.annotations,
                    thrown: method_fact.thrown,
                    location: method_fact.location,
                },
            );
        }

        for mut field_fact in unit.fields {
            field_fact.fqn = canonicalize(&field_fact.fqn);
            field_fact.containing_type_fqn = canonicalize(&field_fact.containing_type_fqn);
            let fqn = field_fact.fqn.clone();
            if self.fields.contains_key(&fqn) {
                self.diagnose(Diagnostic::DuplicateFqn { kind: "field", fqn });
                continue;
            }
            self.push_relationship(Relationship::new(
                RelationshipKind::Contains,
                field_fact.containing_type_fqn.clone(),
                fqn.clone(),
            ));
            self.push_relationship(Relationship::new(
                RelationshipKind::UsesType,
                fqn.clone(),
                field_fact.type_ref.fqn.clone(),
            ));
            self.fields.insert(
                fqn.clone(),
                Field {
                    fqn: field_fact.fqn,
                    simple_name: field_fact.simple_name,
                    containing_type_fqn: field_fact.containing_type_fqn,
                    type_ref: field_fact.type_ref,
                    modifiers: field_fact.modifiers,
                    annotations: field_fact.annotations,
                    location: field_fact.location,
                },
            );
        }

        for mut call_fact in unit.calls {
            call_fact.caller_fqn = canonicalize(&call_fact.caller_fqn);
            call_fact.callee_fqn = canonicalize(&call_fact.callee_fqn);
            call_fact.resolved_callee_fqn = call_fact.resolved_callee_fqn.map(|fqn| canonicalize(&fqn));
            let effective_callee = call_fact
                .resolved_callee_fqn
                .clone()
                .unwrap_or_else(|| call_fact.callee_fqn.clone());
            self.push_relationship(Relationship::new(
                RelationshipKind::Calls,
                call_fact.caller_fqn.clone(),
                effective_callee,
            ));
            let id = self.next_call_id.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            self.calls.insert(id, call_fact);
        }
    }

    /// Raw call facts accumulated so far, in ingestion order. Consumed by
    /// [`crate::graph::call_graph::CallGraphBuilder`] after (or instead of)
    /// freezing the model: call facts carry edge metadata (call kind,
    /// location) the coarser `Relationship` list does not.
    pub fn call_facts(&self) -> Vec<CallFact> {
        let mut ids: Vec<usize> = self.calls.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids.into_iter().map(|id| self.calls.get(&id).unwrap().clone()).collect()
    }

    /// Records a per-file parse failure (never fatal to the overall build).
    pub fn record_parse_failure(&self, file: impl Into<String>, message: impl Into<String>) {
        self.diagnose(Diagnostic::ParseFailure {
            file: file.into(),
            message: message.into(),
        });
    }

    fn relationships_for_type(&self, type_fact: &crate::model::facts::TypeFact) -> Vec<Relationship> {
        let mut out = Vec::new();
        for supertype in &type_fact.supertypes {
            out.push(Relationship::new(
                RelationshipKind::Extends,
                type_fact.fqn.clone(),
                supertype.clone(),
            ));
        }
        for iface in &type_fact.interfaces {
            out.push(Relationship::new(
                RelationshipKind::Implements,
                type_fact.fqn.clone(),
                iface.clone(),
            ));
        }
        for annotation in &type_fact.annotations {
            out.push(Relationship::new(
                RelationshipKind::AnnotatedWith,
                type_fact.fqn.clone(),
                annotation.fqn.clone(),
            ));
        }
        out
    }

    fn push_relationship(&self, relationship: Relationship) {
        let id = self
            .next_relationship_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.relationships.insert(id, relationship);
    }

    fn diagnose(&self, diagnostic: Diagnostic) {
        let id = self
            .next_diagnostic_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.diagnostics.insert(id, diagnostic);
    }

    /// Freezes the builder into a read-only [`SourceModel`], building every index.
    pub fn freeze(self) -> SourceModel {
        let types: std::collections::HashMap<String, Type> = self.types.into_iter().collect();
        let methods: std::collections::HashMap<String, Method> = self.methods.into_iter().collect();
        let fields: std::collections::HashMap<String, Field> = self.fields.into_iter().collect();

        let mut relationship_ids: Vec<usize> = self.relationships.iter().map(|e| *e.key()).collect();
        relationship_ids.sort_unstable();
        let relationships: Vec<Relationship> = relationship_ids
            .into_iter()
            .map(|id| self.relationships.get(&id).unwrap().clone())
            .collect();

        let mut diagnostic_ids: Vec<usize> = self.diagnostics.iter().map(|e| *e.key()).collect();
        diagnostic_ids.sort_unstable();
        let diagnostics: Vec<Diagnostic> = diagnostic_ids
            .into_iter()
            .map(|id| self.diagnostics.get(&id).unwrap().clone())
            .collect();

        let mut types_by_package: std::collections::HashMap<String, Vec<String>> = Default::default();
        let mut types_by_annotation: std::collections::HashMap<String, Vec<String>> = Default::default();
        for t in types.values() {
            types_by_package.entry(t.package.clone()).or_default().push(t.fqn.clone());
            for annotation in &t.annotations {
                types_by_annotation
                    .entry(annotation.simple_name.clone())
                    .or_default()
                    .push(t.fqn.clone());
                if annotation.fqn != annotation.simple_name {
                    types_by_annotation
                        .entry(annotation.fqn.clone())
                        .or_default()
                        .push(t.fqn.clone());
                }
            }
        }

        let mut methods_by_annotation: std::collections::HashMap<String, Vec<String>> = Default::default();
        for m in methods.values() {
            for annotation in &m.annotations {
                methods_by_annotation
                    .entry(annotation.simple_name.clone())
                    .or_default()
                    .push(m.fqn.clone());
                if annotation.fqn != annotation.simple_name {
                    methods_by_annotation
                        .entry(annotation.fqn.clone())
                        .or_default()
                        .push(m.fqn.clone());
                }
            }
        }

        let mut fields_by_annotation: std::collections::HashMap<String, Vec<String>> = Default::default();
        for f in fields.values() {
            for annotation in &f.annotations {
                fields_by_annotation
                    .entry(annotation.simple_name.clone())
                    .or_default()
                    .push(f.fqn.clone());
                if annotation.fqn != annotation.simple_name {
                    fields_by_annotation
                        .entry(annotation.fqn.clone())
                        .or_default()
                        .push(f.fqn.clone());
                }
            }
        }

        let mut relationships_by_source: std::collections::HashMap<String, Vec<usize>> = Default::default();
        let mut relationships_by_target: std::collections::HashMap<String, Vec<usize>> = Default::default();
        for (idx, r) in relationships.iter().enumerate() {
            relationships_by_source.entry(r.source_fqn.clone()).or_default().push(idx);
            relationships_by_target.entry(r.target_fqn.clone()).or_default().push(idx);
        }

        SourceModel {
            types,
            methods,
            fields,
            relationships,
            types_by_package,
            methods_by_annotation,
            types_by_annotation,
            fields_by_annotation,
            relationships_by_source,
            relationships_by_target,
            diagnostics,
        }
    }
}
