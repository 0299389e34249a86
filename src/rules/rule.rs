//! Rule definitions (section 4.4, section 6): the declarative shape an
//! evaluator is handed at runtime. Deserialization (not rule-file I/O, a
//! parser adapter's job elsewhere) lives here because the JSON shape *is*
//! the public contract this crate exposes to rule authors.

use std::collections::HashMap;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered `blocker > error > warn > info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
    Blocker,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Error
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.to_ascii_uppercase().as_str() {
            "BLOCKER" => Ok(Severity::Blocker),
            "ERROR" => Ok(Severity::Error),
            "WARN" => Ok(Severity::Warn),
            "INFO" => Ok(Severity::Info),
            other => Err(de::Error::custom(format!("unknown severity: {other}"))),
        }
    }
}

/// A free enum: the well-known tokens from the rule-file format, plus
/// `Other` for anything a rule author invents. Tokens are matched
/// case-insensitively with hyphens and spaces treated as underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    TransactionSafety,
    AsyncSafety,
    RetrySafety,
    CircularDependency,
    LayeredArchitecture,
    Security,
    Performance,
    Custom,
    Other(String),
}

impl Default for Category {
    fn default() -> Self {
        Category::Custom
    }
}

impl Category {
    fn normalize(raw: &str) -> String {
        raw.to_ascii_uppercase().replace(['-', ' '], "_")
    }

    fn from_token(raw: &str) -> Self {
        match Self::normalize(raw).as_str() {
            "TRANSACTION_SAFETY" => Category::TransactionSafety,
            "ASYNC_SAFETY" => Category::AsyncSafety,
            "RETRY_SAFETY" => Category::RetrySafety,
            "CIRCULAR_DEPENDENCY" => Category::CircularDependency,
            "LAYERED_ARCHITECTURE" => Category::LayeredArchitecture,
            "SECURITY" => Category::Security,
            "PERFORMANCE" => Category::Performance,
            "CUSTOM" => Category::Custom,
            other => Category::Other(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Category::from_token(&raw))
    }
}

/// One dimension-set shared by both `entryPoints` and `sinks`: a method or
/// FQN matches if it satisfies *any* non-empty dimension. All-empty never
/// matches anything (section 8, "empty predicate produces zero violations").
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionFilter {
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub method_patterns: Vec<String>,
}

impl DetectionFilter {
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.types.is_empty() && self.method_patterns.is_empty()
    }
}

fn default_max_depth() -> usize {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathConstraints {
    #[serde(default)]
    pub must_contain: Vec<String>,
    #[serde(default)]
    pub must_not_contain: Vec<String>,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for PathConstraints {
    fn default() -> Self {
        Self {
            must_contain: Vec::new(),
            must_not_contain: Vec::new(),
            max_depth: default_max_depth(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    #[serde(default)]
    pub entry_points: DetectionFilter,
    #[serde(default)]
    pub sinks: DetectionFilter,
    #[serde(default)]
    pub path_constraints: PathConstraints,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Remediation {
    #[serde(default)]
    pub quick_fix: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub references: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// A declarative rule, as deserialized from the external rule repository.
///
/// Unknown top-level keys are ignored (serde's default behavior, no
/// `deny_unknown_fields` here on purpose).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub detection: Detection,
    #[serde(default)]
    pub remediation: Remediation,
    #[serde(default)]
    pub config: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_fields_fall_back_to_documented_defaults() {
        let rule: Rule = serde_json::from_str(
            r#"{"id": "TX-BOUNDARY-001", "name": "No remote calls in a transaction"}"#,
        )
        .unwrap();
        assert_eq!(rule.severity, Severity::Error);
        assert_eq!(rule.category, Category::Custom);
        assert!(rule.enabled);
        assert_eq!(rule.detection.path_constraints.max_depth, 100);
        assert!(rule.detection.entry_points.is_empty());
    }

    #[test]
    fn severity_and_category_tokens_are_case_and_punctuation_insensitive() {
        let rule: Rule = serde_json::from_str(
            r#"{
                "id": "X", "name": "x",
                "severity": "blocker",
                "category": "circular-dependency"
            }"#,
        )
        .unwrap();
        assert_eq!(rule.severity, Severity::Blocker);
        assert_eq!(rule.category, Category::CircularDependency);
    }

    #[test]
    fn unrecognized_category_token_is_preserved_verbatim() {
        let rule: Rule = serde_json::from_str(r#"{"id": "X", "name": "x", "category": "naming"}"#).unwrap();
        assert_eq!(rule.category, Category::Other("NAMING".into()));
    }

    #[test]
    fn full_shape_round_trips_from_the_documented_example() {
        let json = r#"{
            "id": "TX-BOUNDARY-001",
            "name": "No remote calls in a transaction",
            "description": "desc",
            "severity": "ERROR",
            "category": "TRANSACTION_SAFETY",
            "enabled": true,
            "detection": {
                "entryPoints": { "annotations": ["Transactional"] },
                "sinks": { "types": ["RestTemplate"] },
                "pathConstraints": { "maxDepth": 30 }
            },
            "remediation": { "quickFix": "use events" },
            "config": { "strict": true }
        }"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.detection.entry_points.annotations, vec!["Transactional"]);
        assert_eq!(rule.detection.sinks.types, vec!["RestTemplate"]);
        assert_eq!(rule.detection.path_constraints.max_depth, 30);
        assert_eq!(rule.remediation.quick_fix, "use events");
    }
}
