//! The Source Model: immutable entities, indices, and the builder that
//! normalizes raw parser-adapter facts into them (section 3, section 4.1).

pub mod builder;
pub mod facts;
pub mod fqn;
pub mod relationship;
pub mod source_model;
pub mod types;

pub use builder::SourceModelBuilder;
pub use facts::{
    CallFact, CallKind, FieldFact, FixedParserAdapter, MethodFact, ParseOptions, ParseOutput,
    ParseStats, ParseUnit, ParserAdapter, TypeFact,
};
pub use relationship::{Relationship, RelationshipKind};
pub use source_model::{Diagnostic, SourceModel};
pub use types::{
    AnnotationRef, AttributeValue, Field, Location, Method, Modifiers, Parameter, Type, TypeKind,
    TypeRef, Visibility,
};
