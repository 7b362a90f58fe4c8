//! CLI command definitions
//!
//! Every option has a default, so each check can be run with no
//! arguments from the project root.

use chrono::{DateTime, FixedOffset, Local};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::output::{print_run, OutputFormat};
use super::ExitCode;
use crate::config::{AuditConfig, DEFAULT_CHECKLIST, DEFAULT_CORPUS_ROOT, DEFAULT_PARK};
use crate::engine::{Auditor, CheckKind};
use crate::error::{AuditError, Result};

/// Knowledge base auditor
///
/// Checks the knowledge-base corpus for missing documents, missing
/// critical facts and inconsistent prices, discounts and phones.
#[derive(Parser, Debug)]
#[command(name = "kb-audit")]
#[command(about = "Audit knowledge-base documents before indexing", long_about = None)]
#[command(version)]
pub struct AuditCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub options: RunOptions,

    #[command(subcommand)]
    pub command: AuditCommands,
}

/// Single-check CLI used by the standalone binaries
#[derive(Parser, Debug)]
#[command(version, about = "Run one knowledge-base check", long_about = None)]
pub struct CheckCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    #[command(flatten)]
    pub options: RunOptions,
}

/// Options shared by every check
#[derive(Args, Debug, Clone)]
pub struct RunOptions {
    /// Project base directory; other paths are relative to it
    #[arg(long, env = "KB_AUDIT_BASE_DIR", default_value = ".", global = true)]
    pub base_dir: PathBuf,

    /// Corpus root to traverse
    #[arg(long, env = "KB_AUDIT_CORPUS", default_value = DEFAULT_CORPUS_ROOT, global = true)]
    pub corpus: String,

    /// Checklist file (YAML)
    #[arg(long, env = "KB_AUDIT_CHECKLIST", default_value = DEFAULT_CHECKLIST, global = true)]
    pub checklist: String,

    /// Park key inside the checklist
    #[arg(long, env = "KB_AUDIT_PARK", default_value = DEFAULT_PARK, global = true)]
    pub park: String,

    /// Report path (defaults to the check's conventional location)
    #[arg(short, long, env = "KB_AUDIT_OUTPUT", global = true)]
    pub output: Option<String>,

    /// Console output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Exit with a failure code when findings are present
    #[arg(long, global = true)]
    pub strict: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            corpus: DEFAULT_CORPUS_ROOT.to_string(),
            checklist: DEFAULT_CHECKLIST.to_string(),
            park: DEFAULT_PARK.to_string(),
            output: None,
            format: OutputFormat::Table,
            strict: false,
        }
    }
}

impl RunOptions {
    pub fn to_config(&self) -> AuditConfig {
        let config = AuditConfig::new(self.base_dir.clone())
            .with_corpus_root(self.corpus.clone())
            .with_checklist(self.checklist.clone())
            .with_park(self.park.clone());
        match &self.output {
            Some(output) => config.with_output(output.clone()),
            None => config,
        }
    }
}

/// Available checks
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum AuditCommands {
    /// Required documents: presence, length, headings, forbidden phrases
    Structure,

    /// Critical fact patterns across the whole corpus
    Facts,

    /// Prices, percentages and phone numbers aggregated by canonical value
    Numbers,

    /// All three checks, each writing its own report
    All,
}

impl AuditCommands {
    pub fn kinds(&self) -> Vec<CheckKind> {
        match self {
            AuditCommands::Structure => vec![CheckKind::Structure],
            AuditCommands::Facts => vec![CheckKind::Facts],
            AuditCommands::Numbers => vec![CheckKind::Numbers],
            AuditCommands::All => CheckKind::ALL.to_vec(),
        }
    }
}

/// Execute `kinds` in order; exit code is the most severe of the runs
pub fn execute(kinds: &[CheckKind], options: &RunOptions) -> Result<ExitCode> {
    if kinds.len() > 1 && options.output.is_some() {
        return Err(AuditError::invalid_input(
            "--output names a single report; it cannot be combined with `all`",
        ));
    }

    let auditor = Auditor::new(options.to_config());
    let generated_at: DateTime<FixedOffset> = Local::now().fixed_offset();

    let mut exit = ExitCode::Success;
    for &kind in kinds {
        let run = auditor.run(kind, &generated_at)?;
        print_run(&run, options.format)?;
        exit = exit.max(ExitCode::from_outcome(&run.outcome, options.strict));
    }
    Ok(exit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        AuditCli::command().debug_assert();
        CheckCli::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let cli = AuditCli::try_parse_from(["kb-audit", "facts"]).unwrap();
        assert!(matches!(cli.command, AuditCommands::Facts));
        assert_eq!(cli.options.corpus, DEFAULT_CORPUS_ROOT);
        assert_eq!(cli.options.format, OutputFormat::Table);
        assert!(!cli.options.strict);
    }

    #[test]
    fn test_options_after_subcommand() {
        let cli = AuditCli::try_parse_from([
            "kb-audit", "numbers", "--base-dir", "/srv/kb", "--format", "json", "--strict",
        ])
        .unwrap();
        assert_eq!(cli.options.base_dir, PathBuf::from("/srv/kb"));
        assert_eq!(cli.options.format, OutputFormat::Json);
        assert!(cli.options.strict);
    }

    #[test]
    fn test_all_runs_every_kind() {
        assert_eq!(AuditCommands::All.kinds(), CheckKind::ALL.to_vec());
    }

    #[test]
    fn test_output_rejected_with_all() {
        let options = RunOptions {
            output: Some("r.md".into()),
            ..RunOptions::default()
        };
        let err = execute(&CheckKind::ALL, &options).unwrap_err();
        assert!(matches!(err, AuditError::InvalidInput(_)));
    }
}
