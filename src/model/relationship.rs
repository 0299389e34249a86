//! Typed relationships between entities, kept alongside the Call Graph as
//! the Source Model's general-purpose edge list (section 3: "a list of
//! typed relationships"). The Call Graph remains authoritative for call
//! queries; this list backs `uses-type`, `extends`, `implements`, etc.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    Contains,
    Extends,
    Implements,
    UsesType,
    UsesField,
    AnnotatedWith,
    Throws,
    Calls,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub source_fqn: String,
    pub target_fqn: String,
}

impl Relationship {
    pub fn new(kind: RelationshipKind, source_fqn: impl Into<String>, target_fqn: impl Into<String>) -> Self {
        Self {
            kind,
            source_fqn: source_fqn.into(),
            target_fqn: target_fqn.into(),
        }
    }
}
