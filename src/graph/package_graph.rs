//! Package Dependency Graph (section 4.3): a directed graph over packages
//! with cycle detection.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::model::{RelationshipKind, SourceModel};

/// A directed package-to-package dependency, with the relationship kinds
/// that contributed to it (a pair of packages can be linked by more than
/// one kind of relationship; all are kept for diagnostics).
#[derive(Debug, Clone, Default)]
pub struct PackageEdgeKinds {
    pub kinds: HashSet<RelationshipKind>,
}

/// Frozen package dependency graph.
pub struct PackageGraph {
    graph: DiGraph<String, PackageEdgeKinds>,
    index_of: HashMap<String, NodeIndex>,
}

impl PackageGraph {
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    pub fn depends_on(&self, package: &str) -> Vec<&str> {
        let Some(&idx) = self.index_of.get(package) else {
            return Vec::new();
        };
        self.graph
            .edges(idx)
            .map(|edge| self.graph[edge.target()].as_str())
            .collect()
    }

    /// True iff `from` has a (possibly indirect) path to `to` via package edges.
    pub fn depends_transitively_on(&self, from: &str, to: &str) -> bool {
        let Some(&start) = self.index_of.get(from) else {
            return false;
        };
        let Some(target) = self.index_of.get(to) else {
            return false;
        };
        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if node == *target {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            for edge in self.graph.edges(node) {
                stack.push(edge.target());
            }
        }
        false
    }

    /// Every simple cycle in the graph, each reported as an ordered package
    /// list starting and ending at its lexicographically smallest member
    /// (a canonical rotation so the same cycle is never reported twice under
    /// a different starting point).
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut seen_canonical: HashSet<Vec<String>> = HashSet::new();

        for start in self.graph.node_indices() {
            let mut path = vec![start];
            let mut on_path: HashSet<NodeIndex> = HashSet::from([start]);
            self.dfs_cycles(start, start, &mut path, &mut on_path, &mut cycles, &mut seen_canonical);
        }
        cycles
    }

    fn dfs_cycles(
        &self,
        origin: NodeIndex,
        current: NodeIndex,
        path: &mut Vec<NodeIndex>,
        on_path: &mut HashSet<NodeIndex>,
        cycles: &mut Vec<Vec<String>>,
        seen_canonical: &mut HashSet<Vec<String>>,
    ) {
        for edge in self.graph.edges(current) {
            let next = edge.target();
            if next == origin && path.len() > 1 {
                let mut cycle: Vec<String> = path.iter().map(|&idx| self.graph[idx].clone()).collect();
                cycle.push(self.graph[origin].clone());
                let canonical = canonicalize_cycle(&cycle);
                if seen_canonical.insert(canonical.clone()) {
                    cycles.push(canonical);
                }
                continue;
            }
            // Only continue past nodes with a higher index than the origin to
            // avoid rediscovering the same cycle from every one of its nodes.
            if next.index() < origin.index() {
                continue;
            }
            if on_path.contains(&next) {
                continue;
            }
            path.push(next);
            on_path.insert(next);
            self.dfs_cycles(origin, next, path, on_path, cycles, seen_canonical);
            on_path.remove(&next);
            path.pop();
        }
    }
}

/// Rotates a closed cycle (`[a, b, c, a]`) so it starts at its
/// lexicographically smallest member, keeping direction.
fn canonicalize_cycle(cycle: &[String]) -> Vec<String> {
    let body = &cycle[..cycle.len() - 1];
    let min_idx = body
        .iter()
        .enumerate()
        .min_by_key(|(_, name)| name.as_str())
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut rotated: Vec<String> = body[min_idx..].iter().chain(body[..min_idx].iter()).cloned().collect();
    rotated.push(rotated[0].clone());
    rotated
}

/// Builds a [`PackageGraph`] from a frozen [`SourceModel`]'s relationships.
/// Self-edges (a package depending on itself) are suppressed.
pub struct PackageGraphBuilder<'a> {
    model: &'a SourceModel,
}

impl<'a> PackageGraphBuilder<'a> {
    pub fn new(model: &'a SourceModel) -> Self {
        Self { model }
    }

    pub fn build(self) -> PackageGraph {
        let mut graph: DiGraph<String, PackageEdgeKinds> = DiGraph::new();
        let mut index_of: HashMap<String, NodeIndex> = HashMap::new();

        let mut ensure_node = |graph: &mut DiGraph<String, PackageEdgeKinds>, index_of: &mut HashMap<String, NodeIndex>, package: &str| -> NodeIndex {
            *index_of
                .entry(package.to_string())
                .or_insert_with(|| graph.add_node(package.to_string()))
        };

        for ty in self.model.all_types() {
            ensure_node(&mut graph, &mut index_of, &ty.package);
        }

        let interesting = [
            RelationshipKind::Extends,
            RelationshipKind::Implements,
            RelationshipKind::UsesType,
            RelationshipKind::UsesField,
            RelationshipKind::Calls,
        ];

        let mut edge_index: HashMap<(NodeIndex, NodeIndex), petgraph::graph::EdgeIndex> = HashMap::new();

        for ty in self.model.all_types() {
            for relationship in self.model.relationships_from(&ty.fqn) {
                if !interesting.contains(&relationship.kind) {
                    continue;
                }
                let target_package = self.owning_package(&relationship.target_fqn);
                let Some(target_package) = target_package else { continue };
                if target_package == ty.package {
                    continue; // self-edges suppressed
                }
                let from = ensure_node(&mut graph, &mut index_of, &ty.package);
                let to = ensure_node(&mut graph, &mut index_of, &target_package);

                let key = (from, to);
                if let Some(&edge_idx) = edge_index.get(&key) {
                    graph[edge_idx].kinds.insert(relationship.kind);
                } else {
                    let mut kinds = PackageEdgeKinds::default();
                    kinds.kinds.insert(relationship.kind);
                    let edge_idx = graph.add_edge(from, to, kinds);
                    edge_index.insert(key, edge_idx);
                }
            }
        }

        PackageGraph { graph, index_of }
    }

    /// Resolves the owning package of a target FQN that may name a type,
    /// method, or field.
    fn owning_package(&self, target_fqn: &str) -> Option<String> {
        if let Some(t) = self.model.type_by_fqn(target_fqn) {
            return Some(t.package.clone());
        }
        if let Some(m) = self.model.method_by_fqn(target_fqn) {
            return self.model.type_by_fqn(&m.containing_type_fqn).map(|t| t.package.clone());
        }
        if let Some(f) = self.model.field_by_fqn(target_fqn) {
            return self.model.type_by_fqn(&f.containing_type_fqn).map(|t| t.package.clone());
        }
        if let Some((containing_type, _, _)) = crate::model::fqn::split_method_fqn(target_fqn) {
            return self.model.type_by_fqn(containing_type).map(|t| t.package.clone());
        }
        // Unresolved reference (e.g. a third-party library type): bucket it
        // under its dotted-prefix "package" so cross-module edges to known
        // frameworks still show up, without inventing a model entry.
        Some(crate::model::fqn::package_of(target_fqn).to_string())
    }
}
