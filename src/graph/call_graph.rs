//! Call Graph (section 4.2): directed, bidirectionally indexed caller→callee
//! edges with interface-dispatch expansion and bounded path search.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::facts::{CallFact, CallKind};
use crate::model::types::Location;
use crate::model::SourceModel;

/// How a call site dispatches to its callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallType {
    Direct,
    Virtual,
    Static,
    Constructor,
    Interface,
    Super,
    Lambda,
    MethodRef,
}

impl From<CallKind> for CallType {
    fn from(kind: CallKind) -> Self {
        match kind {
            CallKind::Direct => CallType::Direct,
            CallKind::Virtual => CallType::Virtual,
            CallKind::Static => CallType::Static,
            CallKind::Constructor => CallType::Constructor,
            CallKind::Interface => CallType::Interface,
            CallKind::Super => CallType::Super,
            CallKind::Lambda => CallType::Lambda,
            CallKind::MethodRef => CallType::MethodRef,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallEdge {
    pub caller_fqn: String,
    pub callee_fqn: String,
    pub resolved_callee_fqn: Option<String>,
    pub call_type: CallType,
    pub location: Location,
}

impl CallEdge {
    /// The resolved callee if available, otherwise the declared callee,
    /// the "effective callee" from the glossary.
    pub fn effective_callee(&self) -> &str {
        self.resolved_callee_fqn.as_deref().unwrap_or(&self.callee_fqn)
    }
}

/// The BFS safety ceiling for [`CallGraph::reachable`] (a defensive bound,
/// not a semantic one; legitimate call graphs stay far under it.
const REACHABLE_SAFETY_CEILING: usize = 200_000;

/// Default depth cap for [`CallGraph::chains_to_target`] / [`CallGraph::chains_to_sinks`]
/// when a rule does not specify one (section 4.4: "maxDepth (default 100)").
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Frozen, bidirectionally indexed call graph.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    outgoing: HashMap<String, Vec<CallEdge>>,
    incoming: HashMap<String, Vec<CallEdge>>,
    application_methods: HashSet<String>,
}

impl CallGraph {
    pub fn outgoing(&self, fqn: &str) -> &[CallEdge] {
        self.outgoing.get(fqn).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn incoming(&self, fqn: &str) -> &[CallEdge] {
        self.incoming.get(fqn).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolved callee FQNs reachable from `fqn` via a single call edge.
    pub fn callees(&self, fqn: &str) -> Vec<&str> {
        self.outgoing(fqn).iter().map(|e| e.effective_callee()).collect()
    }

    /// Resolved caller FQNs that call `fqn` via a single call edge.
    pub fn callers(&self, fqn: &str) -> Vec<&str> {
        self.incoming(fqn).iter().map(|e| e.caller_fqn.as_str()).collect()
    }

    pub fn is_application_method(&self, fqn: &str) -> bool {
        self.application_methods.contains(fqn)
    }

    /// BFS from `start`, not descending past library boundaries. Capped at
    /// [`REACHABLE_SAFETY_CEILING`] visited nodes as a defensive backstop.
    pub fn reachable(&self, start: &str) -> HashSet<String> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start.to_string());
        visited.insert(start.to_string());

        while let Some(current) = queue.pop_front() {
            if visited.len() >= REACHABLE_SAFETY_CEILING {
                break;
            }
            if !self.is_application_method(&current) {
                continue;
            }
            for edge in self.outgoing(&current) {
                let callee = edge.effective_callee().to_string();
                if visited.insert(callee.clone()) {
                    queue.push_back(callee);
                }
            }
        }
        visited
    }

    /// All simple paths from `start` to `target_fqn`, depth-bounded by
    /// `max_depth` nodes (not edges), found by DFS with path-local cycle
    /// pruning. Emitted in DFS discovery order.
    pub fn chains_to_target(&self, start: &str, target_fqn: &str, max_depth: usize) -> Vec<Vec<String>> {
        self.chains_to_sinks(start, |fqn| fqn == target_fqn, max_depth)
    }

    /// All simple paths from `start` where the *first* node (including `start`
    /// itself) satisfying `predicate` terminates the chain. Library methods
    /// are not expanded past unless they themselves satisfy `predicate`.
    pub fn chains_to_sinks(
        &self,
        start: &str,
        predicate: impl Fn(&str) -> bool,
        max_depth: usize,
    ) -> Vec<Vec<String>> {
        let mut results = Vec::new();
        let mut path = vec![start.to_string()];
        let mut on_path: HashSet<String> = HashSet::from([start.to_string()]);

        if predicate(start) {
            results.push(path.clone());
            return results;
        }

        self.dfs_chains(start, &predicate, max_depth, &mut path, &mut on_path, &mut results);
        results
    }

    fn dfs_chains(
        &self,
        current: &str,
        predicate: &impl Fn(&str) -> bool,
        max_depth: usize,
        path: &mut Vec<String>,
        on_path: &mut HashSet<String>,
        results: &mut Vec<Vec<String>>,
    ) {
        // `maxDepth` bounds nodes *pushed* onto the path beyond the entry
        // point (section 9's open question: node count, not edge count),
        // `path.len() - 1` is exactly that count.
        if path.len() > max_depth {
            return;
        }
        if !self.is_application_method(current) {
            // Library sinks never expand further; non-matching library
            // methods were already ruled out by the predicate check at the
            // call site that reached them.
            return;
        }

        for edge in self.outgoing(current) {
            let callee = edge.effective_callee().to_string();
            if on_path.contains(&callee) {
                continue; // cycle pruning: backtrack
            }

            path.push(callee.clone());
            on_path.insert(callee.clone());

            if predicate(&callee) {
                results.push(path.clone());
            } else {
                self.dfs_chains(&callee, predicate, max_depth, path, on_path, results);
            }

            on_path.remove(&callee);
            path.pop();
        }
    }
}

/// Builds a [`CallGraph`] from raw [`CallFact`]s, expanding interface
/// dispatch into synthesized virtual edges along the way.
pub struct CallGraphBuilder<'a> {
    model: &'a SourceModel,
}

impl<'a> CallGraphBuilder<'a> {
    pub fn new(model: &'a SourceModel) -> Self {
        Self { model }
    }

    pub fn build(self, call_facts: Vec<CallFact>) -> CallGraph {
        let application_methods: HashSet<String> = self.model.all_methods().map(|m| m.fqn.clone()).collect();

        let mut outgoing: HashMap<String, Vec<CallEdge>> = HashMap::new();
        let mut incoming: HashMap<String, Vec<CallEdge>> = HashMap::new();

        let mut push_edge = |edge: CallEdge| {
            incoming.entry(edge.effective_callee().to_string()).or_default().push(edge.clone());
            outgoing.entry(edge.caller_fqn.clone()).or_default().push(edge);
        };

        for fact in call_facts {
            let synthesized = self.interface_dispatch_expansion(&fact);

            push_edge(CallEdge {
                caller_fqn: fact.caller_fqn.clone(),
                callee_fqn: fact.callee_fqn.clone(),
                resolved_callee_fqn: fact.resolved_callee_fqn.clone(),
                call_type: fact.call_kind.into(),
                location: fact.location.clone(),
            });

            for extra in synthesized {
                push_edge(extra);
            }
        }

        CallGraph {
            outgoing,
            incoming,
            application_methods,
        }
    }

    /// If `fact`'s declared receiver type is an interface/abstract type with
    /// concrete implementations in the model, synthesize a `virtual` edge to
    /// each implementation's same-named, same-signature method (section 4.2).
    fn interface_dispatch_expansion(&self, fact: &CallFact) -> Vec<CallEdge> {
        let Some((declared_type, simple_name, params)) =
            crate::model::fqn::split_method_fqn(&fact.callee_fqn)
        else {
            return Vec::new();
        };

        let Some(declared) = self.model.type_by_fqn(declared_type) else {
            return Vec::new();
        };
        let is_dispatchable = declared.kind == crate::model::types::TypeKind::Interface || declared.modifiers.is_abstract;
        if !is_dispatchable {
            return Vec::new();
        }

        let params: Vec<String> = params.iter().map(|s| s.to_string()).collect();
        self.model
            .implementations_of(declared_type)
            .into_iter()
            .filter_map(|impl_type| {
                let candidate_fqn = crate::model::fqn::method_fqn(&impl_type.fqn, simple_name, &params);
                self.model.method_by_fqn(&candidate_fqn).map(|m| CallEdge {
                    caller_fqn: fact.caller_fqn.clone(),
                    callee_fqn: fact.callee_fqn.clone(),
                    resolved_callee_fqn: Some(m.fqn.clone()),
                    call_type: CallType::Virtual,
                    location: fact.location.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::facts::{FieldFact, MethodFact, ParseUnit, TypeFact};
    use crate::model::types::{AnnotationRef, Location, Modifiers, TypeKind, TypeRef};
    use crate::model::SourceModelBuilder;
    use std::path::PathBuf;

    fn loc() -> Location {
        Location::point(PathBuf::from("Foo.java"), 1, 1)
    }

    fn method(fqn: &str, containing: &str, simple: &str, annotations: Vec<AnnotationRef>) -> MethodFact {
        MethodFact {
            fqn: fqn.into(),
            simple_name: simple.into(),
            containing_type_fqn: containing.into(),
            return_type: TypeRef::simple("void"),
            parameters: vec![],
            modifiers: Modifiers::default(),
            annotations,
            thrown: vec![],
            location: loc(),
        }
    }

    fn call(caller: &str, callee: &str, kind: CallKind) -> CallFact {
        CallFact {
            caller_fqn: caller.into(),
            callee_fqn: callee.into(),
            resolved_callee_fqn: None,
            call_kind: kind,
            location: loc(),
        }
    }

    /// S1: direct transactional call into a remote-HTTP sink.
    #[test]
    fn s1_direct_chain_to_rest_template() {
        let builder = SourceModelBuilder::new();
        builder.ingest_unit(ParseUnit {
            file_path: PathBuf::from("TxService.java"),
            types: vec![TypeFact {
                fqn: "TxService".into(),
                simple_name: "TxService".into(),
                package: "".into(),
                kind: TypeKind::Class,
                modifiers: Modifiers::default(),
                annotations: vec![],
                supertypes: vec![],
                interfaces: vec![],
                location: loc(),
            }],
            methods: vec![method(
                "TxService#txMethod()",
                "TxService",
                "txMethod",
                vec![AnnotationRef::new("Transactional", "org.springframework.transaction.annotation.Transactional")],
            )],
            calls: vec![call(
                "TxService#txMethod()",
                "org.springframework.web.client.RestTemplate#getForObject(String)",
                CallKind::Direct,
            )],
            ..Default::default()
        });
        let call_facts = builder.call_facts();
        let model = builder.freeze();
        let graph = CallGraphBuilder::new(&model).build(call_facts);

        let chains = graph.chains_to_sinks(
            "TxService#txMethod()",
            |fqn| super::super::sink::matches_sink_type(&model, fqn, "org.springframework.web.client.RestTemplate"),
            30,
        );
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].first().unwrap(), "TxService#txMethod()");
        assert!(chains[0].last().unwrap().starts_with("org.springframework.web.client.RestTemplate"));
    }

    /// S2: transaction reaches the sink through an interface dispatch.
    #[test]
    fn s2_interface_dispatch_resolves_to_implementation() {
        let builder = SourceModelBuilder::new();
        builder.ingest_unit(ParseUnit {
            types: vec![
                TypeFact {
                    fqn: "Caller".into(),
                    simple_name: "Caller".into(),
                    package: "".into(),
                    kind: TypeKind::Class,
                    modifiers: Modifiers::default(),
                    annotations: vec![],
                    supertypes: vec![],
                    interfaces: vec![],
                    location: loc(),
                },
                TypeFact {
                    fqn: "Iface".into(),
                    simple_name: "Iface".into(),
                    package: "".into(),
                    kind: TypeKind::Interface,
                    modifiers: Modifiers::default(),
                    annotations: vec![],
                    supertypes: vec![],
                    interfaces: vec![],
                    location: loc(),
                },
                TypeFact {
                    fqn: "Impl".into(),
                    simple_name: "Impl".into(),
                    package: "".into(),
                    kind: TypeKind::Class,
                    modifiers: Modifiers::default(),
                    annotations: vec![],
                    supertypes: vec![],
                    interfaces: vec!["Iface".into()],
                    location: loc(),
                },
            ],
            methods: vec![
                method(
                    "Caller#doTx()",
                    "Caller",
                    "doTx",
                    vec![AnnotationRef::new("Transactional", "org.springframework.transaction.annotation.Transactional")],
                ),
                method("Iface#remote()", "Iface", "remote", vec![]),
                method("Impl#remote()", "Impl", "remote", vec![]),
            ],
            calls: vec![
                call("Caller#doTx()", "Iface#remote()", CallKind::Interface),
                call(
                    "Impl#remote()",
                    "org.springframework.web.client.RestTemplate#getForObject(String)",
                    CallKind::Direct,
                ),
            ],
            ..Default::default()
        });
        let call_facts = builder.call_facts();
        let model = builder.freeze();
        let graph = CallGraphBuilder::new(&model).build(call_facts);

        let chains = graph.chains_to_sinks(
            "Caller#doTx()",
            |fqn| super::super::sink::matches_sink_type(&model, fqn, "org.springframework.web.client.RestTemplate"),
            30,
        );
        assert_eq!(chains.len(), 1);
        assert!(chains[0].contains(&"Impl#remote()".to_string()));
        assert!(chains[0].len() == 3 || chains[0].len() == 4);
    }

    /// S3: a deep chain respects `maxDepth` expressed in node count.
    #[test]
    fn s3_deep_chain_respects_max_depth() {
        let builder = SourceModelBuilder::new();
        builder.ingest_unit(ParseUnit {
            methods: vec![
                method("A#x()", "A", "x", vec![]),
                method("B#y()", "B", "y", vec![]),
                method("C#z()", "C", "z", vec![]),
                method("D#w()", "D", "w", vec![]),
            ],
            calls: vec![
                call("A#x()", "B#y()", CallKind::Direct),
                call("B#y()", "C#z()", CallKind::Direct),
                call("C#z()", "D#w()", CallKind::Direct),
                call(
                    "D#w()",
                    "org.springframework.web.client.RestTemplate#post(String)",
                    CallKind::Direct,
                ),
            ],
            ..Default::default()
        });
        let call_facts = builder.call_facts();
        let model = builder.freeze();
        let graph = CallGraphBuilder::new(&model).build(call_facts);

        let is_sink = |fqn: &str| super::super::sink::matches_sink_type(&model, fqn, "org.springframework.web.client.RestTemplate");

        assert!(graph.chains_to_sinks("A#x()", is_sink, 3).is_empty());
        assert_eq!(graph.chains_to_sinks("A#x()", is_sink, 4).len(), 1);
    }

    #[test]
    fn self_recursive_method_never_repeats_in_a_chain() {
        let builder = SourceModelBuilder::new();
        builder.ingest_unit(ParseUnit {
            methods: vec![method("M#m()", "M", "m", vec![])],
            calls: vec![call("M#m()", "M#m()", CallKind::Direct)],
            ..Default::default()
        });
        let call_facts = builder.call_facts();
        let model = builder.freeze();
        let graph = CallGraphBuilder::new(&model).build(call_facts);

        let chains = graph.chains_to_sinks("M#m()", |fqn| fqn == "does-not-exist", 10);
        assert!(chains.is_empty());
    }

    #[test]
    fn max_depth_zero_yields_single_node_chain_only_if_entry_is_sink() {
        let builder = SourceModelBuilder::new();
        builder.ingest_unit(ParseUnit {
            methods: vec![method("M#m()", "M", "m", vec![])],
            ..Default::default()
        });
        let call_facts = builder.call_facts();
        let model = builder.freeze();
        let graph = CallGraphBuilder::new(&model).build(call_facts);

        let chains = graph.chains_to_sinks("M#m()", |fqn| fqn == "M#m()", 0);
        assert_eq!(chains, vec![vec!["M#m()".to_string()]]);

        let chains_no_match = graph.chains_to_sinks("M#m()", |fqn| fqn == "other", 0);
        assert!(chains_no_match.is_empty());
    }

    // silence unused-import warnings for FieldFact in case future tests need it
    #[allow(dead_code)]
    fn _unused(_f: FieldFact) {}
}
