//! Occurrence sets
//!
//! An [`OccurrenceIndex`] maps a key (fact id or canonical value) to the
//! set of documents where it was observed. It is built in one fold over
//! `(key, document)` observations and is read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One key and every document it was observed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub key: String,
    /// Sorted, duplicate-free
    pub document_paths: Vec<String>,
}

/// Immutable key -> documents aggregate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceIndex {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl OccurrenceIndex {
    /// Fold observations into an index
    ///
    /// Repeated `(key, document)` pairs collapse, so the same value seen
    /// twice in one document is recorded once.
    pub fn fold<I, K, D>(observations: I) -> Self
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<String>,
    {
        let entries = observations.into_iter().fold(
            BTreeMap::<String, BTreeSet<String>>::new(),
            |mut acc, (key, document)| {
                acc.entry(key.into()).or_default().insert(document.into());
                acc
            },
        );
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in lexicographic key order
    pub fn occurrences(&self) -> Vec<Occurrence> {
        self.entries
            .iter()
            .map(|(key, docs)| Occurrence {
                key: key.clone(),
                document_paths: docs.iter().cloned().collect(),
            })
            .collect()
    }

    /// Entries ordered by a caller-supplied key comparison
    pub fn occurrences_by<F>(&self, mut compare: F) -> Vec<Occurrence>
    where
        F: FnMut(&str, &str) -> std::cmp::Ordering,
    {
        let mut occurrences = self.occurrences();
        occurrences.sort_by(|a, b| compare(&a.key, &b.key));
        occurrences
    }
}

impl<K: Into<String>, D: Into<String>> FromIterator<(K, D)> for OccurrenceIndex {
    fn from_iter<T: IntoIterator<Item = (K, D)>>(iter: T) -> Self {
        Self::fold(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_collapses_duplicates() {
        let index = OccurrenceIndex::fold([
            ("1000 ₽", "kb/nn/b.md"),
            ("1000 ₽", "kb/nn/a.md"),
            ("1000 ₽", "kb/nn/b.md"),
            ("30%", "kb/nn/a.md"),
        ]);

        assert_eq!(index.len(), 2);
        let docs: Vec<_> = index.get("1000 ₽").unwrap().iter().collect();
        assert_eq!(docs, vec!["kb/nn/a.md", "kb/nn/b.md"]);
    }

    #[test]
    fn test_fold_is_order_independent() {
        let forward = OccurrenceIndex::fold([("k", "a"), ("j", "b"), ("k", "c")]);
        let backward = OccurrenceIndex::fold([("k", "c"), ("j", "b"), ("k", "a")]);
        assert_eq!(forward, backward);
        assert_eq!(forward.occurrences(), backward.occurrences());
    }

    #[test]
    fn test_occurrences_by_custom_order() {
        let index: OccurrenceIndex = [("b", "x"), ("a", "y")].into_iter().collect();
        let ordered = index.occurrences_by(|a, b| b.cmp(a));
        assert_eq!(ordered[0].key, "b");
        assert_eq!(ordered[1].document_paths, vec!["y"]);
    }
}
