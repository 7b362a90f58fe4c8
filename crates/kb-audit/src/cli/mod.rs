//! CLI module for the knowledge base auditor
//!
//! One multi-command binary (`kb-audit`) plus a standalone binary per
//! check. All of them share [`RunOptions`] and the exit code mapping below.

pub mod commands;
pub mod output;

pub use commands::{AuditCli, AuditCommands, CheckCli, RunOptions};
pub use output::{OutputFormat, RunOutput};

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::engine::{CheckKind, Outcome};
use crate::error::AuditError;

/// Exit codes for CLI operations
///
/// Ordered by severity so several runs can be folded with `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i32)]
pub enum ExitCode {
    /// Reports written
    Success = 0,
    /// Findings present and `--strict` was given
    FindingsPresent = 1,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// Corpus root missing or unreadable; report still written
    CorpusUnavailable = 4,
    /// Internal error, e.g. the report could not be written
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Determine exit code from a check outcome
    pub fn from_outcome(outcome: &Outcome, strict: bool) -> Self {
        if outcome.corpus_unavailable() {
            ExitCode::CorpusUnavailable
        } else if strict && outcome.has_findings() {
            ExitCode::FindingsPresent
        } else {
            ExitCode::Success
        }
    }

    /// Determine exit code from an error that aborted a run
    pub fn from_error(error: &AuditError) -> Self {
        if error.is_user_error() {
            ExitCode::InvalidInput
        } else {
            ExitCode::InternalError
        }
    }
}

/// Install the global tracing subscriber
///
/// `RUST_LOG` wins when set; otherwise `-v` flags raise the level from
/// the default `warn` and `--quiet` lowers it to `error`.
pub fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the multi-command CLI and return the exit code
pub fn run(cli: AuditCli) -> Result<ExitCode, AuditError> {
    commands::execute(&cli.command.kinds(), &cli.options)
}

/// Run a single check from a standalone binary
pub fn run_check(kind: CheckKind, cli: CheckCli) -> Result<ExitCode, AuditError> {
    commands::execute(&[kind], &cli.options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::facts::FactOutcome;

    fn facts(found: usize, missing: usize, unavailable: bool) -> Outcome {
        use crate::engine::facts::{FoundFact, MissingFact};
        Outcome::Facts(FactOutcome {
            documents_scanned: 0,
            total_patterns: found + missing,
            found: (0..found)
                .map(|i| FoundFact {
                    id: format!("f{}", i),
                    documents: vec![],
                })
                .collect(),
            missing: (0..missing)
                .map(|i| MissingFact {
                    id: format!("m{}", i),
                    recommended_document: "kb/nn/prices.md".into(),
                })
                .collect(),
            read_errors: vec![],
            corpus_unavailable: unavailable,
        })
    }

    #[test]
    fn test_exit_code_conversion() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::FindingsPresent), 1);
        assert_eq!(i32::from(ExitCode::CorpusUnavailable), 4);
        assert_eq!(i32::from(ExitCode::InternalError), 10);
    }

    #[test]
    fn test_exit_code_from_outcome() {
        assert_eq!(ExitCode::from_outcome(&facts(1, 1, false), false), ExitCode::Success);
        assert_eq!(
            ExitCode::from_outcome(&facts(1, 1, false), true),
            ExitCode::FindingsPresent
        );
        assert_eq!(ExitCode::from_outcome(&facts(2, 0, false), true), ExitCode::Success);
        assert_eq!(
            ExitCode::from_outcome(&facts(0, 2, true), false),
            ExitCode::CorpusUnavailable
        );
    }

    #[test]
    fn test_exit_code_severity_order() {
        assert_eq!(
            ExitCode::FindingsPresent.max(ExitCode::CorpusUnavailable),
            ExitCode::CorpusUnavailable
        );
        assert!(ExitCode::Success < ExitCode::FindingsPresent);
    }

    #[test]
    fn test_exit_code_from_error() {
        assert_eq!(
            ExitCode::from_error(&AuditError::invalid_input("bad")),
            ExitCode::InvalidInput
        );
        assert_eq!(
            ExitCode::from_error(&AuditError::Io("disk full".into())),
            ExitCode::InternalError
        );
    }
}
