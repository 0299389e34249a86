//! Immutable entities published by the [`crate::model::SourceModel`].
//!
//! Everything here is a plain value type: once the builder freezes, these
//! structs are never mutated again, so they derive `Clone` freely rather
//! than hiding behind interior mutability.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Where an entity was declared in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file_path: PathBuf,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Location {
    pub fn new(file_path: PathBuf, start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            file_path,
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// A single-point location, useful for synthesized facts in tests.
    pub fn point(file_path: PathBuf, line: u32, col: u32) -> Self {
        Self::new(file_path, line, col, line, col)
    }
}

/// Heterogeneous annotation-attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Int(i64),
    Bool(bool),
    List(Vec<AttributeValue>),
    Map(HashMap<String, AttributeValue>),
}

/// A reference to an annotation/attribute applied to a type, method, or field.
///
/// Per the data model's invariant, a lookup name matches an `AnnotationRef`
/// if it equals *either* the simple name or the fully-qualified name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRef {
    pub simple_name: String,
    pub fqn: String,
    pub attributes: HashMap<String, AttributeValue>,
}

impl AnnotationRef {
    pub fn new(simple_name: impl Into<String>, fqn: impl Into<String>) -> Self {
        Self {
            simple_name: simple_name.into(),
            fqn: fqn.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// True if `name` matches this annotation by simple name or FQN.
    pub fn matches_name(&self, name: &str) -> bool {
        self.simple_name == name || self.fqn == name
    }
}

/// A (possibly unresolved) reference to a type used as a field type, parameter
/// type, or return type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    pub simple_name: String,
    /// Equal to `simple_name` when the parser adapter could not resolve this
    /// reference to a fully-qualified name.
    pub fqn: String,
    pub is_primitive: bool,
    pub is_array: bool,
    pub is_generic: bool,
    pub type_args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn simple(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            fqn: name.clone(),
            simple_name: name,
            is_primitive: false,
            is_array: false,
            is_generic: false,
            type_args: Vec::new(),
        }
    }

    pub fn resolved(simple_name: impl Into<String>, fqn: impl Into<String>) -> Self {
        Self {
            simple_name: simple_name.into(),
            fqn: fqn.into(),
            is_primitive: false,
            is_array: false,
            is_generic: false,
            type_args: Vec::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.fqn != self.simple_name
    }
}

/// Visibility levels, ordered loosely from most to least restrictive access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    PackagePrivate,
    Private,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::PackagePrivate
    }
}

/// Modifier flags shared by types, methods, and fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
}

/// The structural kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// A declared class/interface/enum/record/annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Type {
    pub fqn: String,
    pub simple_name: String,
    pub package: String,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationRef>,
    pub supertypes: Vec<String>,
    pub interfaces: Vec<String>,
    pub location: Location,
}

impl Type {
    /// Any annotation whose simple name matches one of the well-known
    /// framework-component markers (`Component`, `Service`, `Repository`,
    /// `Controller`, `RestController`).
    pub fn is_framework_component_like(&self) -> bool {
        const MARKERS: &[&str] = &[
            "Component",
            "Service",
            "Repository",
            "Controller",
            "RestController",
        ];
        self.annotations
            .iter()
            .any(|a| MARKERS.contains(&a.simple_name.as_str()))
    }

    /// True if this type carries a `@Configuration`-shaped annotation.
    pub fn is_configuration_like(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| a.simple_name == "Configuration")
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.matches_name(name))
    }
}

/// A method or constructor parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_ref: TypeRef,
}

/// A declared method (including constructors, represented with simple name `<init>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub fqn: String,
    pub simple_name: String,
    pub containing_type_fqn: String,
    pub return_type: TypeRef,
    pub parameters: Vec<Parameter>,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationRef>,
    pub thrown: Vec<String>,
    pub location: Location,
}

impl Method {
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.matches_name(name))
    }

    pub fn param_simple_types(&self) -> Vec<String> {
        self.parameters
            .iter()
            .map(|p| p.type_ref.simple_name.clone())
            .collect()
    }
}

/// A declared field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub fqn: String,
    pub simple_name: String,
    pub containing_type_fqn: String,
    pub type_ref: TypeRef,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationRef>,
    pub location: Location,
}

impl Field {
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.matches_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location::point(PathBuf::from("Foo.java"), 1, 1)
    }

    #[test]
    fn annotation_matches_by_simple_or_fqn() {
        let a = AnnotationRef::new("Transactional", "org.springframework.transaction.annotation.Transactional");
        assert!(a.matches_name("Transactional"));
        assert!(a.matches_name("org.springframework.transaction.annotation.Transactional"));
        assert!(!a.matches_name("Async"));
    }

    #[test]
    fn framework_component_detection() {
        let mut ty = Type {
            fqn: "com.acme.FooService".into(),
            simple_name: "FooService".into(),
            package: "com.acme".into(),
            kind: TypeKind::Class,
            modifiers: Modifiers::default(),
            annotations: vec![AnnotationRef::new("Service", "org.springframework.stereotype.Service")],
            supertypes: vec![],
            interfaces: vec![],
            location: loc(),
        };
        assert!(ty.is_framework_component_like());
        assert!(!ty.is_configuration_like());

        ty.annotations = vec![AnnotationRef::new("Configuration", "org.springframework.context.annotation.Configuration")];
        assert!(!ty.is_framework_component_like());
        assert!(ty.is_configuration_like());
    }

    #[test]
    fn type_ref_resolution_flag() {
        let unresolved = TypeRef::simple("Widget");
        assert!(!unresolved.is_resolved());
        let resolved = TypeRef::resolved("Widget", "com.acme.Widget");
        assert!(resolved.is_resolved());
    }
}
