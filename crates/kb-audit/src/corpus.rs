//! Corpus loading
//!
//! Enumerates knowledge documents under a content root and reads their
//! text. Individual failures are returned as data: a document that cannot
//! be read becomes [`LoadOutcome::Unreadable`], a directory that cannot be
//! walked becomes a [`TraversalError`]. Nothing here aborts a run.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File extension of knowledge documents
pub const CONTENT_EXTENSION: &str = "md";

/// Outcome of reading one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum LoadOutcome {
    /// Full text of the document
    Loaded(String),
    /// Path does not exist
    Missing,
    /// Path exists but could not be read (permissions, encoding, ...)
    Unreadable(String),
}

/// A document path together with its load outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    /// Path relative to the project base, `/`-separated
    pub path: String,
    pub outcome: LoadOutcome,
}

impl KnowledgeDocument {
    /// Text of the document, `None` when it failed to load
    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            LoadOutcome::Loaded(text) => Some(text),
            _ => None,
        }
    }
}

/// A traversal or read failure, reported in the "Read errors" section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for TraversalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Paths found by a traversal, in walk order
#[derive(Debug, Default)]
pub struct Collected {
    pub paths: Vec<PathBuf>,
    pub errors: Vec<TraversalError>,
    /// Set when the root itself could not be opened
    pub root_unavailable: bool,
}

/// Every readable document under a root, sorted by path
#[derive(Debug, Default)]
pub struct LoadedCorpus {
    pub documents: Vec<KnowledgeDocument>,
    pub errors: Vec<TraversalError>,
    pub root_unavailable: bool,
}

impl LoadedCorpus {
    /// `(path, text)` pairs of the loaded documents
    pub fn texts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documents
            .iter()
            .filter_map(|doc| doc.text().map(|text| (doc.path.as_str(), text)))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Reads documents relative to a project base directory
#[derive(Debug, Clone)]
pub struct Corpus {
    base: PathBuf,
}

impl Corpus {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Render `path` relative to the base with `/` separators
    pub fn display_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.base).unwrap_or(path);
        relative
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Enumerate every content file below `root` (relative to the base)
    ///
    /// Order is whatever the filesystem yields; callers sort.
    pub fn collect(&self, root: &str) -> Collected {
        let root_path = self.base.join(root);
        let mut collected = Collected::default();

        if !root_path.is_dir() {
            warn!(root = %root_path.display(), "corpus root is not a readable directory");
            collected.root_unavailable = true;
            collected.errors.push(TraversalError {
                path: self.display_path(&root_path),
                message: "corpus root does not exist or is not a directory".to_string(),
            });
            return collected;
        }

        for entry in WalkDir::new(&root_path).follow_links(true) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && has_content_extension(entry.path()) {
                        collected.paths.push(entry.into_path());
                    }
                }
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| self.display_path(p))
                        .unwrap_or_else(|| self.display_path(&root_path));
                    warn!(%path, error = %err, "failed to traverse corpus entry");
                    collected.errors.push(TraversalError {
                        path,
                        message: err.to_string(),
                    });
                }
            }
        }

        debug!(count = collected.paths.len(), "collected corpus documents");
        collected
    }

    /// Read one document by its base-relative path
    pub fn load(&self, relative: &str) -> KnowledgeDocument {
        let path = self.base.join(relative);
        KnowledgeDocument {
            path: relative.to_string(),
            outcome: read_outcome(&path),
        }
    }

    /// Collect and read every document under `root`
    ///
    /// Unreadable documents are moved to `errors`; only loaded documents
    /// remain in `documents`, sorted by path.
    pub fn load_all(&self, root: &str) -> LoadedCorpus {
        let Collected {
            paths,
            mut errors,
            root_unavailable,
        } = self.collect(root);

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let display = self.display_path(&path);
            match read_outcome(&path) {
                LoadOutcome::Loaded(text) => documents.push(KnowledgeDocument {
                    path: display,
                    outcome: LoadOutcome::Loaded(text),
                }),
                LoadOutcome::Missing => errors.push(TraversalError {
                    path: display,
                    message: "file disappeared during the run".to_string(),
                }),
                LoadOutcome::Unreadable(message) => {
                    errors.push(TraversalError { path: display, message })
                }
            }
        }

        documents.sort_by(|a, b| a.path.cmp(&b.path));
        errors.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.message.cmp(&b.message)));

        LoadedCorpus {
            documents,
            errors,
            root_unavailable,
        }
    }
}

fn has_content_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(CONTENT_EXTENSION))
}

fn read_outcome(path: &Path) -> LoadOutcome {
    match fs::read_to_string(path) {
        Ok(text) => LoadOutcome::Loaded(text),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "document not found");
            LoadOutcome::Missing
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "document is unreadable");
            LoadOutcome::Unreadable(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &[u8]) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collect_is_recursive_and_filters_extension() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "kb/nn/prices.md", b"a");
        write(temp_dir.path(), "kb/nn/deep/er/rules.md", b"b");
        write(temp_dir.path(), "kb/nn/notes.txt", b"c");

        let corpus = Corpus::new(temp_dir.path());
        let collected = corpus.collect("kb/nn");
        let mut paths: Vec<_> = collected
            .paths
            .iter()
            .map(|p| corpus.display_path(p))
            .collect();
        paths.sort();

        assert_eq!(paths, vec!["kb/nn/deep/er/rules.md", "kb/nn/prices.md"]);
        assert!(collected.errors.is_empty());
        assert!(!collected.root_unavailable);
    }

    #[test]
    fn test_missing_root_is_single_error() {
        let temp_dir = TempDir::new().unwrap();
        let corpus = Corpus::new(temp_dir.path());

        let loaded = corpus.load_all("kb/absent");
        assert!(loaded.is_empty());
        assert!(loaded.root_unavailable);
        assert_eq!(loaded.errors.len(), 1);
        assert_eq!(loaded.errors[0].path, "kb/absent");
    }

    #[test]
    fn test_load_reports_missing_and_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "kb/nn/bad.md", &[0xff, 0xfe, 0xfd]);
        let corpus = Corpus::new(temp_dir.path());

        assert_eq!(corpus.load("kb/nn/none.md").outcome, LoadOutcome::Missing);
        assert!(matches!(
            corpus.load("kb/nn/bad.md").outcome,
            LoadOutcome::Unreadable(_)
        ));
    }

    #[test]
    fn test_load_all_moves_unreadable_to_errors() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "kb/nn/b.md", "Цены".as_bytes());
        write(temp_dir.path(), "kb/nn/a.md", b"ok");
        write(temp_dir.path(), "kb/nn/bad.md", &[0xc3, 0x28]);

        let loaded = Corpus::new(temp_dir.path()).load_all("kb/nn");
        let paths: Vec<_> = loaded.texts().map(|(p, _)| p).collect();

        assert_eq!(paths, vec!["kb/nn/a.md", "kb/nn/b.md"]);
        assert_eq!(loaded.errors.len(), 1);
        assert_eq!(loaded.errors[0].path, "kb/nn/bad.md");
    }

    #[test]
    fn test_display_path_strips_curdir() {
        let corpus = Corpus::new(".");
        assert_eq!(
            corpus.display_path(Path::new("./kb/nn/prices.md")),
            "kb/nn/prices.md"
        );
    }
}
