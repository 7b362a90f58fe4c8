//! Run configuration and checklist loading
//!
//! A run is described by an [`AuditConfig`] (where things live) and a
//! [`Checklist`] (what the corpus must satisfy). The checklist is read
//! from a YAML file keyed by park; anything the file leaves out falls
//! back to the built-in registry in [`crate::registry`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::engine::CheckKind;
use crate::error::{AuditError, Result};
use crate::registry;

/// Default corpus root, relative to the base directory
pub const DEFAULT_CORPUS_ROOT: &str = "kb/nn";
/// Default checklist location, relative to the base directory
pub const DEFAULT_CHECKLIST: &str = "kb/_checklists/nn.yml";
/// Default park key inside the checklist
pub const DEFAULT_PARK: &str = "nn";

/// Locations used by a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Project base; every other path is relative to it
    pub base_dir: PathBuf,
    pub corpus_root: String,
    pub checklist: String,
    pub park: String,
    /// Report path override; `None` uses the checker's default
    pub output: Option<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            corpus_root: DEFAULT_CORPUS_ROOT.to_string(),
            checklist: DEFAULT_CHECKLIST.to_string(),
            park: DEFAULT_PARK.to_string(),
            output: None,
        }
    }
}

impl AuditConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_corpus_root(mut self, root: impl Into<String>) -> Self {
        self.corpus_root = root.into();
        self
    }

    pub fn with_checklist(mut self, checklist: impl Into<String>) -> Self {
        self.checklist = checklist.into();
        self
    }

    pub fn with_park(mut self, park: impl Into<String>) -> Self {
        self.park = park.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Absolute-or-base-joined path of the report for `kind`
    pub fn report_path(&self, kind: CheckKind) -> PathBuf {
        let relative = self
            .output
            .clone()
            .unwrap_or_else(|| kind.default_report_path().to_string());
        self.base_dir.join(relative)
    }
}

/// Structural rules for required documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRules {
    /// Minimum trimmed length in characters
    pub min_chars: usize,
    /// Exact substrings, order-independent
    pub required_headings: Vec<String>,
    /// Case-insensitive substrings
    pub forbidden_phrases: Vec<String>,
}

/// Uncompiled fact pattern as written in a checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactPatternSpec {
    pub id: String,
    pub pattern: String,
    /// Document where the fact should be added when missing
    pub recommended: String,
}

/// Resolved checklist for one park
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub required_files: Vec<String>,
    pub rules: ContentRules,
    pub facts: Vec<FactPatternSpec>,
}

impl Default for Checklist {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ChecklistFile {
    #[serde(default)]
    parks: BTreeMap<String, ParkSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ParkSection {
    required_files: Option<Vec<String>>,
    content_rules: Option<RulesSection>,
    facts: Option<Vec<FactPatternSpec>>,
}

#[derive(Debug, Default, Deserialize)]
struct RulesSection {
    min_chars_per_file: Option<usize>,
    must_have_headings: Option<Vec<String>>,
    forbid_phrases: Option<Vec<String>>,
}

/// Where the checklist in use came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecklistSource {
    BuiltIn,
    File(String),
}

/// Checklist plus the configuration error that forced a fallback, if any
#[derive(Debug)]
pub struct ChecklistLoad {
    pub checklist: Checklist,
    pub source: ChecklistSource,
    pub error: Option<AuditError>,
}

impl Checklist {
    /// The built-in registry
    pub fn builtin() -> Self {
        Self {
            required_files: registry::required_documents(),
            rules: registry::content_rules(),
            facts: registry::fact_patterns(),
        }
    }

    /// Parse a checklist document and resolve `park` against built-ins
    pub fn from_yaml(content: &str, park: &str) -> Result<Self> {
        let mut file: ChecklistFile = serde_yaml::from_str(content)?;
        let section = file
            .parks
            .remove(park)
            .ok_or_else(|| AuditError::checklist(format!("park '{}' is not defined", park)))?;

        let builtin = Self::builtin();
        let rules = section.content_rules.unwrap_or_default();

        Ok(Self {
            required_files: dedup_preserving_order(
                section.required_files.unwrap_or(builtin.required_files),
            ),
            rules: ContentRules {
                min_chars: rules.min_chars_per_file.unwrap_or(builtin.rules.min_chars),
                required_headings: rules
                    .must_have_headings
                    .unwrap_or(builtin.rules.required_headings),
                forbidden_phrases: rules
                    .forbid_phrases
                    .unwrap_or(builtin.rules.forbidden_phrases),
            },
            facts: section.facts.unwrap_or(builtin.facts),
        })
    }

    /// Load the checklist named by `config`, never failing the run
    ///
    /// A missing file means built-ins. A malformed file also means
    /// built-ins, with the error kept for the report.
    pub fn load(config: &AuditConfig) -> ChecklistLoad {
        let path = config.base_dir.join(&config.checklist);
        match fs::read_to_string(&path) {
            Ok(content) => match Self::from_yaml(&content, &config.park) {
                Ok(checklist) => {
                    debug!(path = %path.display(), "loaded checklist");
                    ChecklistLoad {
                        checklist,
                        source: ChecklistSource::File(config.checklist.clone()),
                        error: None,
                    }
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "checklist rejected, using built-in registry");
                    ChecklistLoad {
                        checklist: Self::builtin(),
                        source: ChecklistSource::BuiltIn,
                        error: Some(err),
                    }
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no checklist found, using built-in registry");
                ChecklistLoad {
                    checklist: Self::builtin(),
                    source: ChecklistSource::BuiltIn,
                    error: None,
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "checklist unreadable, using built-in registry");
                ChecklistLoad {
                    checklist: Self::builtin(),
                    source: ChecklistSource::BuiltIn,
                    error: Some(AuditError::checklist(format!(
                        "cannot read '{}': {}",
                        config.checklist, err
                    ))),
                }
            }
        }
    }
}

fn dedup_preserving_order(paths: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CHECKLIST: &str = r#"
parks:
  nn:
    required_files:
      - kb/nn/prices.md
      - kb/nn/hours.md
      - kb/nn/prices.md
    content_rules:
      min_chars_per_file: 50
      forbid_phrases: ["скоро"]
"#;

    #[test]
    fn test_from_yaml_merges_with_builtin() {
        let checklist = Checklist::from_yaml(CHECKLIST, "nn").unwrap();
        assert_eq!(
            checklist.required_files,
            vec!["kb/nn/prices.md", "kb/nn/hours.md"]
        );
        assert_eq!(checklist.rules.min_chars, 50);
        assert_eq!(checklist.rules.forbidden_phrases, vec!["скоро"]);
        assert_eq!(
            checklist.rules.required_headings,
            registry::content_rules().required_headings
        );
        assert_eq!(checklist.facts, registry::fact_patterns());
    }

    #[test]
    fn test_unknown_park_is_error() {
        let err = Checklist::from_yaml(CHECKLIST, "msk").unwrap_err();
        assert!(err.to_string().contains("msk"));
    }

    #[test]
    fn test_load_missing_file_uses_builtin() {
        let temp_dir = TempDir::new().unwrap();
        let load = Checklist::load(&AuditConfig::new(temp_dir.path()));
        assert_eq!(load.source, ChecklistSource::BuiltIn);
        assert!(load.error.is_none());
        assert_eq!(load.checklist, Checklist::builtin());
    }

    #[test]
    fn test_load_malformed_file_keeps_error() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("kb/_checklists");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("nn.yml"), "parks: [unclosed").unwrap();

        let load = Checklist::load(&AuditConfig::new(temp_dir.path()));
        assert_eq!(load.source, ChecklistSource::BuiltIn);
        assert!(matches!(load.error, Some(AuditError::Checklist(_))));
    }

    #[test]
    fn test_report_path_override() {
        let config = AuditConfig::new("/srv/kb");
        assert_eq!(
            config.report_path(CheckKind::Facts),
            PathBuf::from("/srv/kb/reports/kb_facts_nn.md")
        );
        let config = config.with_output("out/r.md");
        assert_eq!(
            config.report_path(CheckKind::Facts),
            PathBuf::from("/srv/kb/out/r.md")
        );
    }
}
