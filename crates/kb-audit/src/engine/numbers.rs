//! Numeric and contact consistency
//!
//! Prices, percentages and phone numbers are pulled out of every
//! document, reduced to a canonical key and aggregated per key, so that
//! the same value written differently lands in one row and conflicting
//! values stand next to each other.

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

use super::occurrence::{Occurrence, OccurrenceIndex};
use super::{Check, CheckKind};
use crate::corpus::{Corpus, LoadedCorpus, TraversalError};
use crate::report::{code, paths_cell, Bullet, Report, SUMMARY_HEADING};

/// Currency symbol appended to canonical amounts
pub const CURRENCY_SYMBOL: &str = "₽";
/// Country code digit of recognised phone numbers
pub const COUNTRY_DIGIT: char = '7';
/// Digits expected after the country digit
pub const NATIONAL_DIGITS: usize = 10;

/// Amount in capture group 1; the leading group keeps times (`22:00`),
/// decimals and longer numbers from being glued onto the amount
fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // plain-space grouping only after a single digit ("1 000"), so
        // "до 14 990 ₽" stays 990; no-break spaces group up to three
        Regex::new(concat!(
            r"(?:^|[^\p{L}\p{N}_:.,])",
            r"((?:[1-9](?: [0-9]{3})+",
            r"|[1-9][0-9]{0,2}(?:[\u{00A0}\u{202F}][0-9]{3})+",
            r"|[1-9][0-9]{1,4})",
            r"[ \t\u{00A0}\u{202F}]*₽)",
        ))
        .expect("currency pattern is valid")
    })
}

fn percent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[0-9]{1,3}[ \t\u{00A0}\u{202F}]*%").expect("percent pattern is valid")
    })
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\+7[\s\-]*\(?[0-9]{3}\)?[\s\-]*[0-9]{3}[\s\-]*[0-9]{2}(?:[\s\-]*[0-9]{2})?",
        )
        .expect("phone pattern is valid")
    })
}

fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// `"1 000₽"` -> `"1000 ₽"`
pub fn canonical_currency(raw: &str) -> String {
    format!("{} {}", digits(raw), CURRENCY_SYMBOL)
}

/// `"30 %"` -> `"30%"`
pub fn canonical_percent(raw: &str) -> String {
    format!("{}%", digits(raw))
}

/// Canonical form of a phone number, or the text it fell back to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "form", content = "key")]
pub enum PhoneKey {
    /// `+7` followed by exactly ten digits
    Canonical(String),
    /// Trimmed original text; digit count did not validate
    Verbatim(String),
}

impl PhoneKey {
    pub fn key(&self) -> &str {
        match self {
            PhoneKey::Canonical(key) | PhoneKey::Verbatim(key) => key,
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, PhoneKey::Canonical(_))
    }
}

/// `"+7 (831) 123-45-67"` -> `"+78311234567"`
pub fn canonical_phone(raw: &str) -> PhoneKey {
    let all = digits(raw);
    match all.strip_prefix(COUNTRY_DIGIT) {
        Some(national) if national.len() == NATIONAL_DIGITS => {
            PhoneKey::Canonical(format!("+{}{}", COUNTRY_DIGIT, national))
        }
        _ => PhoneKey::Verbatim(raw.trim().to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Currency,
    Percent,
    Phone,
}

/// One extracted value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub kind: ValueKind,
    /// Matched text, trimmed
    pub raw: String,
    pub key: String,
    /// False only for phones kept verbatim
    pub normalized: bool,
}

/// Apply the three extraction rules to one text
pub fn extract(text: &str) -> Vec<Observation> {
    let currency = currency_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| Observation {
            kind: ValueKind::Currency,
            raw: m.as_str().trim().to_string(),
            key: canonical_currency(m.as_str()),
            normalized: true,
        });
    let percent = percent_re().find_iter(text).map(|m| Observation {
        kind: ValueKind::Percent,
        raw: m.as_str().trim().to_string(),
        key: canonical_percent(m.as_str()),
        normalized: true,
    });
    let phones = phone_re().find_iter(text).map(|m| {
        let phone = canonical_phone(m.as_str());
        Observation {
            kind: ValueKind::Phone,
            raw: m.as_str().trim().to_string(),
            normalized: phone.is_canonical(),
            key: phone.key().to_string(),
        }
    });

    currency.chain(percent).chain(phones).collect()
}

/// Currency before percent, then numeric magnitude, then text
pub fn compare_value_keys(a: &str, b: &str) -> Ordering {
    value_sort_key(a).cmp(&value_sort_key(b))
}

fn value_sort_key(key: &str) -> (u8, u128, &str) {
    let rank = if key.ends_with(CURRENCY_SYMBOL) {
        0
    } else if key.ends_with('%') {
        1
    } else {
        2
    };
    let magnitude = digits(key).parse::<u128>().unwrap_or(u128::MAX);
    (rank, magnitude, key)
}

/// Aggregate of every observation in a corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericIndex {
    /// Currency and percent keys share one space
    pub values: OccurrenceIndex,
    pub phones: OccurrenceIndex,
    /// Distinct raw spellings per value key
    pub spellings: BTreeMap<String, BTreeSet<String>>,
    /// Phone keys that were kept verbatim
    pub unnormalized_phones: BTreeSet<String>,
}

impl NumericIndex {
    /// Fold per-document observations into the aggregate
    pub fn fold<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Vec<Observation>)>,
    {
        let mut values = Vec::new();
        let mut phones = Vec::new();
        let mut spellings: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut unnormalized_phones = BTreeSet::new();

        for (path, observations) in documents {
            for observation in observations {
                match observation.kind {
                    ValueKind::Phone => {
                        if !observation.normalized {
                            warn!(%path, phone = %observation.key, "phone number kept verbatim");
                            unnormalized_phones.insert(observation.key.clone());
                        }
                        phones.push((observation.key, path));
                    }
                    ValueKind::Currency | ValueKind::Percent => {
                        spellings
                            .entry(observation.key.clone())
                            .or_default()
                            .insert(observation.raw);
                        values.push((observation.key, path));
                    }
                }
            }
        }

        Self {
            values: OccurrenceIndex::fold(values),
            phones: OccurrenceIndex::fold(phones),
            spellings,
            unnormalized_phones,
        }
    }
}

/// A value written in more than one way
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub key: String,
    pub spellings: Vec<String>,
}

/// Result of a numeric audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericOutcome {
    pub documents_scanned: usize,
    /// Currency then percent, ascending magnitude
    pub values: Vec<Occurrence>,
    /// Lexicographic
    pub phones: Vec<Occurrence>,
    pub variants: Vec<Variant>,
    pub phones_needing_review: Vec<String>,
    pub read_errors: Vec<TraversalError>,
    pub corpus_unavailable: bool,
}

impl NumericOutcome {
    pub fn from_index(index: &NumericIndex, corpus: &LoadedCorpus) -> Self {
        let mut variants: Vec<Variant> = index
            .spellings
            .iter()
            .filter(|(_, spellings)| spellings.len() > 1)
            .map(|(key, spellings)| Variant {
                key: key.clone(),
                spellings: spellings.iter().cloned().collect(),
            })
            .collect();
        variants.sort_by(|a, b| compare_value_keys(&a.key, &b.key));

        Self {
            documents_scanned: corpus.len(),
            values: index.values.occurrences_by(compare_value_keys),
            phones: index.phones.occurrences(),
            variants,
            phones_needing_review: index.unnormalized_phones.iter().cloned().collect(),
            read_errors: corpus.errors.clone(),
            corpus_unavailable: corpus.root_unavailable,
        }
    }

    /// Non-canonical phones or values with several spellings
    pub fn has_findings(&self) -> bool {
        !self.variants.is_empty() || !self.phones_needing_review.is_empty()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Documents scanned: {}", self.documents_scanned),
            format!("Distinct prices and percentages: {}", self.values.len()),
            format!("Distinct phone numbers: {}", self.phones.len()),
        ]
    }

    pub fn to_report(&self, generated_at: &DateTime<FixedOffset>) -> Report {
        let rows = |occurrences: &[Occurrence]| -> Vec<[String; 2]> {
            occurrences
                .iter()
                .map(|o| [o.key.clone(), paths_cell(&o.document_paths)])
                .collect()
        };
        let variants = self.variants.iter().map(|v| {
            let spellings: Vec<String> = v.spellings.iter().map(|s| code(s)).collect();
            format!("{}: {}", v.key, spellings.join(", "))
        });
        let review = self
            .phones_needing_review
            .iter()
            .map(|p| format!("{}: expected +{} and {} digits", code(p), COUNTRY_DIGIT, NATIONAL_DIGITS));

        Report::new(CheckKind::Numbers.title(), generated_at)
            .bullets(SUMMARY_HEADING, self.summary_lines())
            .read_errors(
                self.read_errors
                    .iter()
                    .map(|e| Bullet::new(format!("{}: {}", code(&e.path), e.message))),
            )
            .table("Prices and percentages", ["Value", "Documents"], rows(&self.values))
            .table("Phone numbers", ["Phone", "Documents"], rows(&self.phones))
            .bullets("Variant spellings", variants)
            .bullets("Phones needing review", review)
    }
}

/// Extracts and aggregates numeric values across the corpus
#[derive(Debug, Clone)]
pub struct NumericAuditor {
    root: String,
}

impl NumericAuditor {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn audit(&self, corpus: &LoadedCorpus) -> NumericOutcome {
        let index = NumericIndex::fold(corpus.texts().map(|(path, text)| {
            let observations = extract(text);
            debug!(%path, count = observations.len(), "extracted values");
            (path, observations)
        }));
        NumericOutcome::from_index(&index, corpus)
    }
}

impl Check for NumericAuditor {
    type Outcome = NumericOutcome;

    fn kind(&self) -> CheckKind {
        CheckKind::Numbers
    }

    fn check(&self, corpus: &Corpus) -> NumericOutcome {
        let loaded = corpus.load_all(&self.root);
        let outcome = self.audit(&loaded);
        info!(
            documents = outcome.documents_scanned,
            values = outcome.values.len(),
            phones = outcome.phones.len(),
            "numeric audit complete"
        );
        outcome
    }
}
