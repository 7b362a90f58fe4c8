//! Audit engine
//!
//! Three independent checks run over the same corpus:
//!
//! - [`structure`]: required documents, length, headings, forbidden phrases
//! - [`facts`]: critical fact patterns across every document
//! - [`numbers`]: prices, percentages and phones aggregated by canonical key
//!
//! Each check produces its own outcome and report. They share the corpus
//! loader and the renderer but no mutable state.

pub mod facts;
pub mod numbers;
pub mod occurrence;
pub mod structure;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::info;

use crate::config::{AuditConfig, Checklist, ChecklistLoad};
use crate::corpus::Corpus;
use crate::error::{AuditError, Result};
use crate::report::{write_report, Report, Section, SectionBody};

use facts::{FactOutcome, FactScanner, PatternRegistry};
use numbers::{NumericAuditor, NumericOutcome};
use structure::{StructuralValidator, StructureOutcome};

/// The available checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Structure,
    Facts,
    Numbers,
}

impl CheckKind {
    pub const ALL: [CheckKind; 3] = [CheckKind::Structure, CheckKind::Facts, CheckKind::Numbers];

    /// Report location relative to the base directory
    pub fn default_report_path(&self) -> &'static str {
        match self {
            CheckKind::Structure => "reports/kb_audit_nn.md",
            CheckKind::Facts => "reports/kb_facts_nn.md",
            CheckKind::Numbers => "reports/kb_numbers_nn.md",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CheckKind::Structure => "Knowledge base structure report",
            CheckKind::Facts => "Knowledge base critical facts report",
            CheckKind::Numbers => "Knowledge base prices, discounts and phones report",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckKind::Structure => write!(f, "structure"),
            CheckKind::Facts => write!(f, "facts"),
            CheckKind::Numbers => write!(f, "numbers"),
        }
    }
}

/// A single audit over a corpus
///
/// Checks are constructed with their registries and never mutate them;
/// running the same check twice over an unchanged corpus yields equal
/// outcomes.
pub trait Check {
    type Outcome;

    fn kind(&self) -> CheckKind;

    fn check(&self, corpus: &Corpus) -> Self::Outcome;
}

/// Outcome of any check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "check")]
pub enum Outcome {
    Structure(StructureOutcome),
    Facts(FactOutcome),
    Numbers(NumericOutcome),
}

impl Outcome {
    pub fn kind(&self) -> CheckKind {
        match self {
            Outcome::Structure(_) => CheckKind::Structure,
            Outcome::Facts(_) => CheckKind::Facts,
            Outcome::Numbers(_) => CheckKind::Numbers,
        }
    }

    pub fn has_findings(&self) -> bool {
        match self {
            Outcome::Structure(o) => o.has_findings(),
            Outcome::Facts(o) => o.has_findings(),
            Outcome::Numbers(o) => o.has_findings(),
        }
    }

    /// True when the corpus root itself could not be opened
    pub fn corpus_unavailable(&self) -> bool {
        match self {
            Outcome::Structure(_) => false,
            Outcome::Facts(o) => o.corpus_unavailable,
            Outcome::Numbers(o) => o.corpus_unavailable,
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        match self {
            Outcome::Structure(o) => o.summary_lines(),
            Outcome::Facts(o) => o.summary_lines(),
            Outcome::Numbers(o) => o.summary_lines(),
        }
    }

    pub fn to_report(&self, generated_at: &DateTime<FixedOffset>) -> Report {
        match self {
            Outcome::Structure(o) => o.to_report(generated_at),
            Outcome::Facts(o) => o.to_report(generated_at),
            Outcome::Numbers(o) => o.to_report(generated_at),
        }
    }
}

/// A completed run: outcome plus where its report went
#[derive(Debug, Clone, Serialize)]
pub struct CheckRun {
    pub outcome: Outcome,
    pub report_path: PathBuf,
}

/// Runs checks for one configuration
#[derive(Debug)]
pub struct Auditor {
    config: AuditConfig,
    corpus: Corpus,
    checklist: Checklist,
    checklist_error: Option<AuditError>,
}

impl Auditor {
    /// Build an auditor, loading the checklist named by `config`
    pub fn new(config: AuditConfig) -> Self {
        let ChecklistLoad {
            checklist, error, ..
        } = Checklist::load(&config);
        Self {
            corpus: Corpus::new(config.base_dir.clone()),
            config,
            checklist,
            checklist_error: error,
        }
    }

    /// Build an auditor with an explicit checklist
    pub fn with_checklist(config: AuditConfig, checklist: Checklist) -> Self {
        Self {
            corpus: Corpus::new(config.base_dir.clone()),
            config,
            checklist,
            checklist_error: None,
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    /// Run one check without rendering or writing
    pub fn check(&self, kind: CheckKind) -> Outcome {
        match kind {
            CheckKind::Structure => Outcome::Structure(
                StructuralValidator::new(
                    self.checklist.required_files.clone(),
                    self.checklist.rules.clone(),
                )
                .check(&self.corpus),
            ),
            CheckKind::Facts => Outcome::Facts(
                FactScanner::new(
                    PatternRegistry::compile(&self.checklist.facts),
                    self.config.corpus_root.clone(),
                )
                .check(&self.corpus),
            ),
            CheckKind::Numbers => Outcome::Numbers(
                NumericAuditor::new(self.config.corpus_root.clone()).check(&self.corpus),
            ),
        }
    }

    /// Render an outcome, adding the checklist error section if any
    pub fn render(&self, outcome: &Outcome, generated_at: &DateTime<FixedOffset>) -> Report {
        let mut report = outcome.to_report(generated_at);
        if let Some(error) = &self.checklist_error {
            report.insert_after_summary(Section {
                heading: "Audit errors".to_string(),
                body: SectionBody::Paragraphs(vec![
                    format!("Checklist could not be used: {}", error),
                    String::new(),
                    format!(
                        "Built-in rules were applied instead. Check `{}` (park `{}`).",
                        self.config.checklist, self.config.park
                    ),
                ]),
            });
        }
        report
    }

    /// Check, render and persist
    pub fn run(&self, kind: CheckKind, generated_at: &DateTime<FixedOffset>) -> Result<CheckRun> {
        let outcome = self.check(kind);
        let report = self.render(&outcome, generated_at);
        let report_path = self.config.report_path(kind);
        write_report(&report_path, &report.render())?;
        info!(check = %kind, path = %report_path.display(), "audit run finished");
        Ok(CheckRun {
            outcome,
            report_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_paths_are_distinct() {
        let mut paths: Vec<_> = CheckKind::ALL
            .iter()
            .map(|k| k.default_report_path())
            .collect();
        paths.dedup();
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(CheckKind::Structure.to_string(), "structure");
        assert_eq!(CheckKind::Numbers.to_string(), "numbers");
    }
}
