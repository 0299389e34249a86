//! Violation output shape (section 3, section 6).

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Location;
use crate::rules::Severity;

/// One accepted rule violation.
///
/// Deduplicated via `(ruleId, location, context-hash)`: two violations for
/// the same rule, at the same location, carrying the same context are the
/// same violation even if reached by different chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    pub call_chain: Vec<String>,
    pub context: HashMap<String, Value>,
}

impl Violation {
    /// Renders `callChain` using the documented ` → ` separator.
    pub fn render_chain(&self) -> String {
        self.call_chain.join(" → ")
    }

    pub fn dedup_key(&self) -> (String, String, u64) {
        let mut hasher = DefaultHasher::new();
        let mut keys: Vec<&String> = self.context.keys().collect();
        keys.sort();
        for key in keys {
            key.hash(&mut hasher);
            self.context[key].to_string().hash(&mut hasher);
        }
        (self.rule_id.clone(), format!("{:?}", self.location), hasher.finish())
    }
}

/// Deduplicates `violations` in place, keeping first occurrence order.
pub fn dedup_violations(violations: Vec<Violation>) -> Vec<Violation> {
    let mut seen = std::collections::HashSet::new();
    violations
        .into_iter()
        .filter(|v| seen.insert(v.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn violation(chain: Vec<&str>) -> Violation {
        Violation {
            rule_id: "TX-BOUNDARY-001".into(),
            rule_name: "no remote calls in a transaction".into(),
            severity: Severity::Error,
            message: "m".into(),
            location: Location::point(PathBuf::from("Foo.java"), 1, 1),
            call_chain: chain.into_iter().map(String::from).collect(),
            context: HashMap::new(),
        }
    }

    #[test]
    fn identical_rule_location_and_context_dedups_even_with_different_chains() {
        let a = violation(vec!["A#x()", "B#y()"]);
        let b = violation(vec!["A#x()", "C#z()"]);
        let deduped = dedup_violations(vec![a, b]);
        assert_eq!(deduped.len(), 1);
    }

    #[test]
    fn render_chain_uses_documented_separator() {
        let v = violation(vec!["A#x()", "B#y()"]);
        assert_eq!(v.render_chain(), "A#x() → B#y()");
    }
}
