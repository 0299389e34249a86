//! The frozen, queryable Source Model (section 3).

use std::collections::{HashMap, HashSet};

use crate::model::relationship::{Relationship, RelationshipKind};
use crate::model::types::{Field, Method, Type};

/// A non-fatal issue recorded while building the model (duplicate FQN,
/// unresolved reference, …). Never aborts the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    DuplicateFqn { kind: &'static str, fqn: String },
    ParseFailure { file: String, message: String },
}

/// The immutable, indexed aggregate produced by [`crate::model::SourceModelBuilder::freeze`].
///
/// Every accessor is a read: once constructed, a `SourceModel` has no
/// mutation path, which is what makes it safe to share across evaluators
/// (section 5, "shared, read-only after freeze").
#[derive(Debug, Clone, Default)]
pub struct SourceModel {
    pub(crate) types: HashMap<String, Type>,
    pub(crate) methods: HashMap<String, Method>,
    pub(crate) fields: HashMap<String, Field>,
    pub(crate) relationships: Vec<Relationship>,

    pub(crate) types_by_package: HashMap<String, Vec<String>>,
    pub(crate) methods_by_annotation: HashMap<String, Vec<String>>,
    pub(crate) types_by_annotation: HashMap<String, Vec<String>>,
    pub(crate) fields_by_annotation: HashMap<String, Vec<String>>,
    pub(crate) relationships_by_source: HashMap<String, Vec<usize>>,
    pub(crate) relationships_by_target: HashMap<String, Vec<usize>>,

    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl SourceModel {
    pub fn type_by_fqn(&self, fqn: &str) -> Option<&Type> {
        self.types.get(fqn)
    }

    pub fn method_by_fqn(&self, fqn: &str) -> Option<&Method> {
        self.methods.get(fqn)
    }

    pub fn field_by_fqn(&self, fqn: &str) -> Option<&Field> {
        self.fields.get(fqn)
    }

    pub fn all_types(&self) -> impl Iterator<Item = &Type> {
        self.types.values()
    }

    pub fn all_methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    pub fn all_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// `applicationMethods`: every method FQN defined in the analyzed sources.
    pub fn is_application_method(&self, fqn: &str) -> bool {
        self.methods.contains_key(fqn)
    }

    pub fn types_in_package(&self, package: &str) -> &[String] {
        self.types_by_package
            .get(package)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Methods annotated with `name`, matched by simple name or FQN.
    pub fn methods_with_annotation(&self, name: &str) -> &[String] {
        self.methods_by_annotation
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn types_with_annotation(&self, name: &str) -> &[String] {
        self.types_by_annotation
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn fields_with_annotation(&self, name: &str) -> &[String] {
        self.fields_by_annotation
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn relationships_from(&self, source_fqn: &str) -> impl Iterator<Item = &Relationship> {
        self.relationships_by_source
            .get(source_fqn)
            .into_iter()
            .flatten()
            .map(move |idx| &self.relationships[*idx])
    }

    pub fn relationships_to(&self, target_fqn: &str) -> impl Iterator<Item = &Relationship> {
        self.relationships_by_target
            .get(target_fqn)
            .into_iter()
            .flatten()
            .map(move |idx| &self.relationships[*idx])
    }

    /// Methods declared directly on `type_fqn` (via `CONTAINS` relationships).
    pub fn methods_of_type(&self, type_fqn: &str) -> impl Iterator<Item = &Method> {
        self.relationships_from(type_fqn)
            .filter(|r| r.kind == RelationshipKind::Contains)
            .filter_map(move |r| self.methods.get(&r.target_fqn))
    }

    /// The direct supertype/interface set of `type_fqn`.
    pub fn direct_parents(&self, type_fqn: &str) -> Vec<String> {
        match self.types.get(type_fqn) {
            Some(t) => t
                .supertypes
                .iter()
                .chain(t.interfaces.iter())
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// The transitive supertype/interface closure of `type_fqn`, including itself.
    pub fn inheritance_closure(&self, type_fqn: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut stack = vec![type_fqn.to_string()];
        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            for parent in self.direct_parents(&current) {
                if !seen.contains(&parent) {
                    stack.push(parent);
                }
            }
        }
        seen
    }

    /// True iff `candidate` is `of` or a (transitive) subtype of `of`.
    pub fn is_subtype_of(&self, candidate: &str, of: &str) -> bool {
        if candidate == of {
            return true;
        }
        self.inheritance_closure(candidate).contains(of)
    }

    /// Every concrete (non-interface, non-abstract) type implementing or
    /// extending `type_fqn`, directly or transitively. Used for
    /// interface-dispatch expansion when building the Call Graph.
    pub fn implementations_of(&self, type_fqn: &str) -> Vec<&Type> {
        self.types
            .values()
            .filter(|t| {
                !t.modifiers.is_abstract
                    && t.fqn != type_fqn
                    && self.is_subtype_of(&t.fqn, type_fqn)
            })
            .collect()
    }
}
