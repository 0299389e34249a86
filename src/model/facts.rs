//! The Parser Adapter contract (section 6).
//!
//! The concrete AST parser / symbol solver is explicitly out of scope for
//! this crate: it is "an external collaborator with a specified contract
//! only". This module defines that contract, the raw facts a parser
//! adapter must hand to the [`crate::model::SourceModelBuilder`], plus a
//! trivial in-memory adapter that satisfies it directly from pre-built
//! facts, which is what the test suite (and any caller without a real
//! parser wired up) uses to exercise the rest of the pipeline.

use std::path::{Path, PathBuf};

use crate::error::ModelError;
use crate::model::types::{AnnotationRef, Location, Modifiers, Parameter, TypeKind, TypeRef};

/// One compilation unit's worth of raw facts, as a real parser adapter
/// (tree-sitter, a reflective solver, …) would emit them.
#[derive(Debug, Clone, Default)]
pub struct ParseUnit {
    pub file_path: PathBuf,
    pub types: Vec<TypeFact>,
    pub methods: Vec<MethodFact>,
    pub fields: Vec<FieldFact>,
    pub calls: Vec<CallFact>,
}

#[derive(Debug, Clone)]
pub struct TypeFact {
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

#[derive(Debug, Clone)]
pub struct MethodFact {
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

#[derive(Debug, Clone)]
pub struct FieldFact {
    pub fqn: String,
    pub simple_name: String,
    pub containing_type_fqn: String,
    pub type_ref: TypeRef,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationRef>,
    pub location: Location,
}

/// Call kinds a parser adapter can report; `Lambda`/`MethodRef` resolve to
/// the referenced method when possible (open question in section 9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Direct,
    Virtual,
    Static,
    Constructor,
    Interface,
    Super,
    Lambda,
    MethodRef,
}

#[derive(Debug, Clone)]
pub struct CallFact {
    pub caller_fqn: String,
    pub callee_fqn: String,
    /// Already resolved by the parser adapter's reflective/import-table
    /// solver, if it managed to bind the callee to a concrete method.
    pub resolved_callee_fqn: Option<String>,
    pub call_kind: CallKind,
    pub location: Location,
}

/// Options a caller can request of a parser adapter.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub include_tests: bool,
    pub resolve_symbols: bool,
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ParseStats {
    pub files_scanned: usize,
    pub files_failed: usize,
    pub types_found: usize,
    pub methods_found: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub units: Vec<ParseUnit>,
    pub stats: ParseStats,
    pub failures: Vec<ModelError>,
}

/// The external parser-adapter contract: `parse(sourceRoot, options) ->
/// {units, stats}`. Per-file parse failures are recorded in
/// [`ParseOutput::failures`] and the file is skipped (they are never
/// fatal to the call.
pub trait ParserAdapter {
    fn parse(&self, source_root: &Path, options: &ParseOptions) -> ParseOutput;
}

/// An in-memory adapter that simply replays facts handed to it. Stands in
/// for a real tree-sitter/symbol-solver backed adapter in tests and in any
/// embedding where the caller already has facts (e.g. from a cached index).
#[derive(Debug, Clone, Default)]
pub struct FixedParserAdapter {
    units: Vec<ParseUnit>,
}

impl FixedParserAdapter {
    pub fn new() -> Self {
        Self { units: Vec::new() }
    }

    pub fn with_unit(mut self, unit: ParseUnit) -> Self {
        self.units.push(unit);
        self
    }
}

impl ParserAdapter for FixedParserAdapter {
    fn parse(&self, _source_root: &Path, _options: &ParseOptions) -> ParseOutput {
        let stats = ParseStats {
            files_scanned: self.units.len(),
            files_failed: 0,
            types_found: self.units.iter().map(|u| u.types.len()).sum(),
            methods_found: self.units.iter().map(|u| u.methods.len()).sum(),
        };
        ParseOutput {
            units: self.units.clone(),
            stats,
            failures: Vec::new(),
        }
    }
}
