//! Structural validation of required documents
//!
//! Every required path must load, be long enough once trimmed, contain
//! every required heading and none of the forbidden phrases. All
//! violations of a document are collected, not just the first.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

use super::{Check, CheckKind};
use crate::config::ContentRules;
use crate::corpus::{Corpus, KnowledgeDocument, LoadOutcome, TraversalError};
use crate::report::{code, Bullet, Report, SUMMARY_HEADING};

/// One structural violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Issue {
    TooShort { length: usize, min: usize },
    MissingHeadings { headings: Vec<String> },
    ForbiddenPhrases { phrases: Vec<String> },
}

impl Issue {
    /// Short tag used on the problem line
    pub fn tag(&self) -> &'static str {
        match self {
            Issue::TooShort { .. } => "too short",
            Issue::MissingHeadings { .. } => "missing heading(s)",
            Issue::ForbiddenPhrases { .. } => "forbidden phrase(s)",
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::TooShort { length, min } => {
                write!(f, "too short: {} < {} characters", length, min)
            }
            Issue::MissingHeadings { headings } => {
                write!(f, "missing heading(s): {}", headings.join(", "))
            }
            Issue::ForbiddenPhrases { phrases } => {
                write!(f, "forbidden phrase(s): {}", phrases.join(", "))
            }
        }
    }
}

/// Problems found in one required document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub document: String,
    pub issues: Vec<Issue>,
}

/// Result of a structural validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureOutcome {
    pub total: usize,
    pub present: usize,
    /// Required order
    pub missing: Vec<String>,
    /// Required order, documents with at least one issue
    pub problems: Vec<Finding>,
    /// Required documents that exist but could not be read
    pub read_errors: Vec<TraversalError>,
    pub min_chars: usize,
}

impl StructureOutcome {
    pub fn has_findings(&self) -> bool {
        !self.missing.is_empty() || !self.problems.is_empty()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Present: {} / {}", self.present, self.total),
            format!("Missing: {}", self.missing.len()),
            format!("Documents with problems: {}", self.problems.len()),
        ]
    }

    pub fn to_report(&self, generated_at: &DateTime<FixedOffset>) -> Report {
        let missing = self.missing.iter().map(|p| Bullet::new(code(p)));
        let problems = self.problems.iter().map(problem_bullet);

        Report::new(CheckKind::Structure.title(), generated_at)
            .bullets(SUMMARY_HEADING, self.summary_lines())
            .read_errors(self.read_errors.iter().map(|e| format!("{}: {}", code(&e.path), e.message)))
            .bullets("Missing documents", missing)
            .bullets("Documents with problems", problems)
            .bullets("Recommendations", self.recommendations())
    }

    fn recommendations(&self) -> Vec<String> {
        let create = self.missing.iter().map(|p| {
            format!(
                "{}: create the file from the template (essence, facts, nuances, answer script).",
                code(p)
            )
        });
        let fix = self.problems.iter().map(|finding| {
            let parts: Vec<String> = finding
                .issues
                .iter()
                .map(|issue| match issue {
                    Issue::TooShort { min, .. } => format!(
                        "Extend the text to at least {} characters (facts, nuances, phrasings).",
                        min
                    ),
                    Issue::MissingHeadings { headings } => {
                        format!("Add sections: {}.", headings.join(", "))
                    }
                    Issue::ForbiddenPhrases { phrases } => {
                        format!("Remove or rephrase: {}.", unique_sorted(phrases).join(", "))
                    }
                })
                .collect();
            format!("{}: {}", code(&finding.document), parts.join(" "))
        });
        create.chain(fix).collect()
    }
}

fn problem_bullet(finding: &Finding) -> Bullet {
    let tags: Vec<&str> = finding.issues.iter().map(Issue::tag).collect();
    let mut bullet = Bullet::new(format!("{}: {}", code(&finding.document), tags.join(", ")));
    for issue in &finding.issues {
        match issue {
            Issue::TooShort { length, min } => {
                bullet = bullet.with_child(format!("Length: {} of {} characters", length, min));
            }
            Issue::MissingHeadings { headings } => {
                bullet = bullet.with_child(format!("Missing: {}", headings.join(", ")));
            }
            Issue::ForbiddenPhrases { phrases } => {
                bullet = bullet.with_child(format!("Found: {}", unique_sorted(phrases).join(", ")));
            }
        }
    }
    bullet
}

fn unique_sorted(items: &[String]) -> Vec<String> {
    items
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Checks required documents against [`ContentRules`]
#[derive(Debug, Clone)]
pub struct StructuralValidator {
    required: Vec<String>,
    rules: ContentRules,
}

impl StructuralValidator {
    pub fn new(required: Vec<String>, rules: ContentRules) -> Self {
        Self { required, rules }
    }

    /// Evaluate the three checks against one text
    pub fn inspect(&self, text: &str) -> Vec<Issue> {
        let mut issues = Vec::new();

        let length = text.trim().chars().count();
        if length < self.rules.min_chars {
            issues.push(Issue::TooShort {
                length,
                min: self.rules.min_chars,
            });
        }

        let missing: Vec<String> = self
            .rules
            .required_headings
            .iter()
            .filter(|heading| !text.contains(heading.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            issues.push(Issue::MissingHeadings { headings: missing });
        }

        let lower = text.to_lowercase();
        let forbidden: Vec<String> = self
            .rules
            .forbidden_phrases
            .iter()
            .filter(|phrase| lower.contains(&phrase.to_lowercase()))
            .cloned()
            .collect();
        if !forbidden.is_empty() {
            issues.push(Issue::ForbiddenPhrases { phrases: forbidden });
        }

        issues
    }

    /// Validate already-loaded documents, given in required order
    pub fn validate_documents(&self, documents: &[KnowledgeDocument]) -> StructureOutcome {
        let mut missing = Vec::new();
        let mut problems = Vec::new();
        let mut read_errors = Vec::new();

        for document in documents {
            match &document.outcome {
                LoadOutcome::Loaded(text) => {
                    let issues = self.inspect(text);
                    debug!(path = %document.path, issues = issues.len(), "validated document");
                    if !issues.is_empty() {
                        problems.push(Finding {
                            document: document.path.clone(),
                            issues,
                        });
                    }
                }
                LoadOutcome::Missing => missing.push(document.path.clone()),
                LoadOutcome::Unreadable(message) => {
                    missing.push(document.path.clone());
                    read_errors.push(TraversalError {
                        path: document.path.clone(),
                        message: message.clone(),
                    });
                }
            }
        }

        StructureOutcome {
            total: documents.len(),
            present: documents.len() - missing.len(),
            missing,
            problems,
            read_errors,
            min_chars: self.rules.min_chars,
        }
    }
}

impl Check for StructuralValidator {
    type Outcome = StructureOutcome;

    fn kind(&self) -> CheckKind {
        CheckKind::Structure
    }

    fn check(&self, corpus: &Corpus) -> StructureOutcome {
        let documents: Vec<KnowledgeDocument> =
            self.required.iter().map(|path| corpus.load(path)).collect();
        let outcome = self.validate_documents(&documents);
        info!(
            present = outcome.present,
            total = outcome.total,
            problems = outcome.problems.len(),
            "structure audit complete"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ContentRules {
        ContentRules {
            min_chars: 20,
            required_headings: vec!["## Суть".into(), "## Факты".into()],
            forbidden_phrases: vec!["Уточните на сайте".into()],
        }
    }

    fn loaded(path: &str, text: &str) -> KnowledgeDocument {
        KnowledgeDocument {
            path: path.to_string(),
            outcome: LoadOutcome::Loaded(text.to_string()),
        }
    }

    const GOOD: &str = "## Суть\nБилеты продаются на ресепшн.\n## Факты\nЦена 990 ₽.";

    #[test]
    fn test_compliant_text_has_no_issues() {
        let validator = StructuralValidator::new(vec![], rules());
        assert!(validator.inspect(GOOD).is_empty());
    }

    #[test]
    fn test_short_text_reports_too_short_alongside_others() {
        let validator = StructuralValidator::new(vec![], rules());
        let issues = validator.inspect("   уточните НА сайте   ");

        assert_eq!(
            issues[0],
            Issue::TooShort {
                length: 17,
                min: 20
            }
        );
        assert_eq!(
            issues[1],
            Issue::MissingHeadings {
                headings: vec!["## Суть".into(), "## Факты".into()]
            }
        );
        assert_eq!(
            issues[2],
            Issue::ForbiddenPhrases {
                phrases: vec!["Уточните на сайте".into()]
            }
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let validator = StructuralValidator::new(vec![], rules());
        // 19 characters, well over 20 bytes
        let text = format!("## Суть## Факты{}", "ж".repeat(4));
        assert_eq!(
            validator.inspect(&text),
            vec![Issue::TooShort {
                length: 19,
                min: 20
            }]
        );
        let text = format!("## Суть## Факты{}", "ж".repeat(5));
        assert!(validator.inspect(&text).is_empty());
    }

    #[test]
    fn test_validate_documents_orders_and_counts() {
        let validator = StructuralValidator::new(vec![], rules());
        let documents = vec![
            loaded("kb/nn/b.md", GOOD),
            KnowledgeDocument {
                path: "kb/nn/a.md".into(),
                outcome: LoadOutcome::Missing,
            },
            loaded("kb/nn/c.md", "## Суть\nБез второго заголовка, но длинный текст."),
            KnowledgeDocument {
                path: "kb/nn/d.md".into(),
                outcome: LoadOutcome::Unreadable("permission denied".into()),
            },
        ];

        let outcome = validator.validate_documents(&documents);
        assert_eq!(outcome.total, 4);
        assert_eq!(outcome.present, 2);
        assert_eq!(outcome.missing, vec!["kb/nn/a.md", "kb/nn/d.md"]);
        assert_eq!(outcome.problems.len(), 1);
        assert_eq!(outcome.problems[0].document, "kb/nn/c.md");
        assert_eq!(outcome.read_errors.len(), 1);
        assert!(outcome.has_findings());
    }

    #[test]
    fn test_issue_display() {
        let issue = Issue::MissingHeadings {
            headings: vec!["## Нюансы".into(), "## Скрипт ответа".into()],
        };
        assert_eq!(
            issue.to_string(),
            "missing heading(s): ## Нюансы, ## Скрипт ответа"
        );
    }
}
