//! Rule definitions and the repository contract that loads them (section 4.4, section 6).

pub mod repository;
pub mod rule;

pub use repository::{InMemoryRuleRepository, RuleRepository};
pub use rule::{Category, Detection, DetectionFilter, PathConstraints, Remediation, Rule, Severity};
