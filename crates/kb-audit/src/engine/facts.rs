//! Critical fact scanning
//!
//! Each registered fact is a pattern that must match at least one
//! document of the corpus. Patterns are written with `\w`/`\W`
//! placeholders; [`unicode_word_classes`] rewrites them into explicit
//! letter-or-digit classes covering every script before compilation, so
//! Cyrillic text matches the same way Latin text does.

use chrono::{DateTime, FixedOffset};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::occurrence::OccurrenceIndex;
use super::{Check, CheckKind};
use crate::config::FactPatternSpec;
use crate::corpus::{Corpus, LoadedCorpus, TraversalError};
use crate::error::{AuditError, Result};
use crate::report::{code, paths_cell, Bullet, Report, SUMMARY_HEADING};

const WORD_CLASS: &str = r"[\p{L}\p{N}_]";
const WORD_CLASS_ITEMS: &str = r"\p{L}\p{N}_";
const NON_WORD_CLASS: &str = r"[^\p{L}\p{N}_]";

/// Rewrite `\w` and `\W` into full-Unicode classes
///
/// Escaped backslashes are left alone (`\\w` stays a literal backslash
/// followed by `w`). Inside a bracket class `\w` expands to its members
/// and `\W` to a nested negated class.
pub fn unicode_word_classes(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 16);
    let mut chars = source.chars().peekable();
    let mut class_depth = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('w') if class_depth > 0 => out.push_str(WORD_CLASS_ITEMS),
                Some('w') => out.push_str(WORD_CLASS),
                Some('W') => out.push_str(NON_WORD_CLASS),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '[' => {
                class_depth += 1;
                out.push('[');
                if chars.peek() == Some(&'^') {
                    out.push('^');
                    chars.next();
                }
                // a leading `]` is a literal member
                if chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if class_depth > 0 => {
                class_depth -= 1;
                out.push(']');
            }
            _ => out.push(c),
        }
    }

    out
}

/// A compiled critical-fact pattern
#[derive(Debug, Clone)]
pub struct FactPattern {
    pub id: String,
    matcher: Regex,
    pub recommended_document: String,
}

impl FactPattern {
    /// Compile a pattern with Unicode word classes, case-insensitively
    pub fn compile(spec: &FactPatternSpec) -> Result<Self> {
        let source = unicode_word_classes(&spec.pattern);
        let matcher = RegexBuilder::new(&source)
            .unicode(true)
            .case_insensitive(true)
            .build()
            .map_err(|e| AuditError::pattern(&spec.id, e.to_string()))?;

        Ok(Self {
            id: spec.id.clone(),
            matcher,
            recommended_document: spec.recommended.clone(),
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// Compiled registry; patterns that failed to compile are kept aside
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    patterns: Vec<FactPattern>,
    rejected: Vec<(FactPatternSpec, String)>,
}

impl PatternRegistry {
    pub fn compile(specs: &[FactPatternSpec]) -> Self {
        let mut registry = Self::default();
        for spec in specs {
            match FactPattern::compile(spec) {
                Ok(pattern) => registry.patterns.push(pattern),
                Err(err) => {
                    warn!(id = %spec.id, error = %err, "fact pattern rejected");
                    registry.rejected.push((spec.clone(), err.to_string()));
                }
            }
        }
        registry
    }

    pub fn patterns(&self) -> &[FactPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fact found in at least one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundFact {
    pub id: String,
    /// Sorted
    pub documents: Vec<String>,
}

/// A fact no document states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingFact {
    pub id: String,
    pub recommended_document: String,
}

/// Result of a fact scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactOutcome {
    pub documents_scanned: usize,
    pub total_patterns: usize,
    /// Registry order
    pub found: Vec<FoundFact>,
    /// Registry order
    pub missing: Vec<MissingFact>,
    pub read_errors: Vec<TraversalError>,
    pub corpus_unavailable: bool,
}

impl FactOutcome {
    pub fn has_findings(&self) -> bool {
        !self.missing.is_empty()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Documents scanned: {}", self.documents_scanned),
            format!("Facts found: {} / {}", self.found.len(), self.total_patterns),
        ]
    }

    pub fn to_report(&self, generated_at: &DateTime<FixedOffset>) -> Report {
        let found = self
            .found
            .iter()
            .map(|fact| format!("{}: {}", code(&fact.id), paths_cell(&fact.documents)));
        let missing = self.missing.iter().map(|fact| {
            format!(
                "{}: add to {}",
                code(&fact.id),
                code(&fact.recommended_document)
            )
        });

        Report::new(CheckKind::Facts.title(), generated_at)
            .bullets(SUMMARY_HEADING, self.summary_lines())
            .read_errors(
                self.read_errors
                    .iter()
                    .map(|e| Bullet::new(format!("{}: {}", code(&e.path), e.message))),
            )
            .bullets("Found facts", found)
            .bullets("Missing facts", missing)
    }
}

/// Matches every registered fact against every document
#[derive(Debug, Clone)]
pub struct FactScanner {
    registry: PatternRegistry,
    root: String,
}

impl FactScanner {
    pub fn new(registry: PatternRegistry, root: impl Into<String>) -> Self {
        Self {
            registry,
            root: root.into(),
        }
    }

    /// Scan an already-loaded corpus
    pub fn scan(&self, corpus: &LoadedCorpus) -> FactOutcome {
        let index: OccurrenceIndex = self
            .registry
            .patterns
            .iter()
            .flat_map(|pattern| {
                corpus
                    .texts()
                    .filter(move |(_, text)| pattern.is_match(text))
                    .map(move |(path, _)| (pattern.id.as_str(), path))
            })
            .collect();

        let mut found = Vec::new();
        let mut missing = Vec::new();
        for pattern in &self.registry.patterns {
            match index.get(&pattern.id) {
                Some(documents) => {
                    debug!(id = %pattern.id, matches = documents.len(), "fact found");
                    found.push(FoundFact {
                        id: pattern.id.clone(),
                        documents: documents.iter().cloned().collect(),
                    });
                }
                None => missing.push(MissingFact {
                    id: pattern.id.clone(),
                    recommended_document: pattern.recommended_document.clone(),
                }),
            }
        }

        let mut read_errors = corpus.errors.clone();
        for (spec, message) in &self.registry.rejected {
            missing.push(MissingFact {
                id: spec.id.clone(),
                recommended_document: spec.recommended.clone(),
            });
            read_errors.push(TraversalError {
                path: format!("pattern:{}", spec.id),
                message: message.clone(),
            });
        }

        FactOutcome {
            documents_scanned: corpus.len(),
            total_patterns: self.registry.len(),
            found,
            missing,
            read_errors,
            corpus_unavailable: corpus.root_unavailable,
        }
    }
}

impl Check for FactScanner {
    type Outcome = FactOutcome;

    fn kind(&self) -> CheckKind {
        CheckKind::Facts
    }

    fn check(&self, corpus: &Corpus) -> FactOutcome {
        let loaded = corpus.load_all(&self.root);
        let outcome = self.scan(&loaded);
        info!(
            documents = outcome.documents_scanned,
            found = outcome.found.len(),
            total = outcome.total_patterns,
            "fact scan complete"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{KnowledgeDocument, LoadOutcome};

    fn spec(id: &str, pattern: &str, recommended: &str) -> FactPatternSpec {
        FactPatternSpec {
            id: id.into(),
            pattern: pattern.into(),
            recommended: recommended.into(),
        }
    }

    fn corpus(docs: &[(&str, &str)]) -> LoadedCorpus {
        LoadedCorpus {
            documents: docs
                .iter()
                .map(|(path, text)| KnowledgeDocument {
                    path: path.to_string(),
                    outcome: LoadOutcome::Loaded(text.to_string()),
                })
                .collect(),
            errors: Vec::new(),
            root_unavailable: false,
        }
    }

    #[test]
    fn test_rewrites_word_classes() {
        assert_eq!(unicode_word_classes(r"a\w+b"), r"a[\p{L}\p{N}_]+b");
        assert_eq!(unicode_word_classes(r"\W"), r"[^\p{L}\p{N}_]");
        assert_eq!(unicode_word_classes(r"[\w-]"), r"[\p{L}\p{N}_-]");
        assert_eq!(unicode_word_classes(r"[^\W\d]"), r"[^[^\p{L}\p{N}_]\d]");
    }

    #[test]
    fn test_rewrite_leaves_other_escapes() {
        assert_eq!(unicode_word_classes(r"\\w"), r"\\w");
        assert_eq!(unicode_word_classes(r"\d\s\."), r"\d\s\.");
        assert_eq!(unicode_word_classes(r"[]\w]x\w"), r"[]\p{L}\p{N}_]x[\p{L}\p{N}_]");
    }

    #[test]
    fn test_placeholder_matches_cyrillic() {
        let pattern = FactPattern::compile(&spec("p", r"именин\w+\s+50%", "x.md")).unwrap();
        assert!(pattern.is_match("Скидка: ИМЕНИННИКУ 50% весь день"));
        assert!(!pattern.is_match("именин 50%"));
    }

    #[test]
    fn test_case_insensitive_latin_and_cyrillic() {
        let pattern = FactPattern::compile(&spec("vr", r"vr\W+не\s+входит", "vr.md")).unwrap();
        assert!(pattern.is_match("VR — не входит в безлимит"));
    }

    #[test]
    fn test_scan_records_every_matching_document() {
        let registry = PatternRegistry::compile(&[
            spec("socks", r"только\s+в\s+носках", "kb/nn/rules.md"),
            spec("email", r"prazdnik52@jucity\.ru", "kb/nn/contacts.md"),
        ]);
        let scanner = FactScanner::new(registry, "kb/nn");
        let outcome = scanner.scan(&corpus(&[
            ("kb/nn/rules.md", "Заходить только в носках."),
            ("kb/nn/faq.md", "Только  в  НОСКАХ!"),
            ("kb/nn/hours.md", "пн 12:00–22:00"),
        ]));

        assert_eq!(outcome.documents_scanned, 3);
        assert_eq!(outcome.total_patterns, 2);
        assert_eq!(
            outcome.found,
            vec![FoundFact {
                id: "socks".into(),
                documents: vec!["kb/nn/faq.md".into(), "kb/nn/rules.md".into()],
            }]
        );
        assert_eq!(
            outcome.missing,
            vec![MissingFact {
                id: "email".into(),
                recommended_document: "kb/nn/contacts.md".into(),
            }]
        );
    }

    #[test]
    fn test_invalid_pattern_is_missing_and_reported() {
        let registry = PatternRegistry::compile(&[spec("broken", r"(unclosed", "kb/nn/x.md")]);
        let outcome = FactScanner::new(registry, "kb/nn").scan(&corpus(&[("a.md", "text")]));

        assert_eq!(outcome.missing.len(), 1);
        assert_eq!(outcome.read_errors.len(), 1);
        assert_eq!(outcome.read_errors[0].path, "pattern:broken");
    }

    #[test]
    fn test_missing_fact_listed_once_in_report() {
        use chrono::TimeZone;
        let registry = PatternRegistry::compile(&[spec("email", r"prazdnik52@", "kb/nn/contacts.md")]);
        let outcome = FactScanner::new(registry, "kb/nn")
            .scan(&corpus(&[("kb/nn/a.md", "x"), ("kb/nn/b.md", "y")]));
        let generated_at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .unwrap();
        let text = outcome.to_report(&generated_at).render();

        assert_eq!(text.matches("`email`").count(), 1);
        assert!(text.contains("- `email`: add to `kb/nn/contacts.md`"));
    }

    #[test]
    fn test_builtin_registry_compiles() {
        let registry = PatternRegistry::compile(&crate::registry::fact_patterns());
        assert!(registry.rejected.is_empty());
        assert_eq!(registry.patterns().len(), crate::registry::fact_patterns().len());
    }
}
