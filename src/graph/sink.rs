//! Type-prefix sink matching shared by call-chain search and the built-in
//! evaluators (section 4.2, "Sink matching for rules").
//!
//! Resolved per the spec's Open Question: a callee matches a sink type
//! both via resolved subtype polymorphism *and* via literal FQN prefix,
//! whichever fires first is enough.

use crate::model::{fqn, SourceModel};

/// True iff the method `callee_fqn` (`C#m(...)`) matches sink type `sink_type`:
/// `C == sink_type`, or `C` is a subtype of `sink_type` in the Source Model's
/// inheritance closure, or `callee_fqn` literally starts with `sink_type.` or
/// `sink_type#`.
pub fn matches_sink_type(model: &SourceModel, callee_fqn: &str, sink_type: &str) -> bool {
    if let Some((containing_type, _, _)) = fqn::split_method_fqn(callee_fqn) {
        if containing_type == sink_type {
            return true;
        }
        if model.type_by_fqn(containing_type).is_some() && model.is_subtype_of(containing_type, sink_type) {
            return true;
        }
    }
    callee_fqn.starts_with(&format!("{sink_type}.")) || callee_fqn.starts_with(&format!("{sink_type}#"))
}
