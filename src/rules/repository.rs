//! Rule Repository contract (section 6).
//!
//! Loading rule files from disk is the concrete, swappable implementation;
//! the trait is what the rest of the engine depends on. `InMemoryRuleRepository`
//! is the trivial implementation used throughout the test suite and by any
//! embedder that already has `Rule`s in hand.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::RuleError;
use crate::rules::rule::{Category, Rule};

/// `findAll/findById/findByCategory/findEnabled` (section 6).
pub trait RuleRepository {
    fn find_all(&self) -> Vec<&Rule>;
    fn find_by_id(&self, id: &str) -> Option<&Rule>;
    fn find_by_category(&self, category: &Category) -> Vec<&Rule>;
    fn find_enabled(&self) -> Vec<&Rule>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRuleRepository {
    rules: HashMap<String, Rule>,
    order: Vec<String>,
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `rule`, returning an error without discarding prior state if
    /// its id is already present.
    pub fn insert(&mut self, rule: Rule) -> Result<(), RuleError> {
        if self.rules.contains_key(&rule.id) {
            return Err(RuleError::DuplicateId(rule.id));
        }
        self.order.push(rule.id.clone());
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    /// Loads every `*.json` file directly under `dir` as a [`Rule`]. A
    /// malformed file is recorded and skipped (bulk load never aborts on
    /// one bad file (section 6, "surface per-file errors without aborting").
    pub fn load_dir(dir: &Path) -> (Self, Vec<RuleError>) {
        let mut repository = Self::new();
        let mut errors = Vec::new();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                errors.push(RuleError::NotFound(format!("{}: {err}", dir.display())));
                return (repository, errors);
            }
        };

        let mut paths: Vec<_> = entries.filter_map(Result::ok).map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match fs::read_to_string(&path).map_err(|err| RuleError::Malformed {
                file: path.display().to_string(),
                source: serde_json::Error::io(err),
            }) {
                Err(err) => errors.push(err),
                Ok(contents) => match serde_json::from_str::<Rule>(&contents) {
                    Ok(rule) => {
                        if let Err(dup) = repository.insert(rule) {
                            errors.push(dup);
                        }
                    }
                    Err(source) => errors.push(RuleError::Malformed {
                        file: path.display().to_string(),
                        source,
                    }),
                },
            }
        }

        (repository, errors)
    }
}

impl RuleRepository for InMemoryRuleRepository {
    fn find_all(&self) -> Vec<&Rule> {
        self.order.iter().filter_map(|id| self.rules.get(id)).collect()
    }

    fn find_by_id(&self, id: &str) -> Option<&Rule> {
        self.rules.get(id)
    }

    fn find_by_category(&self, category: &Category) -> Vec<&Rule> {
        self.find_all().into_iter().filter(|r| &r.category == category).collect()
    }

    fn find_enabled(&self) -> Vec<&Rule> {
        self.find_all().into_iter().filter(|r| r.enabled).collect()
    }
}
