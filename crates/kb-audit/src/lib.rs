//! Knowledge Base Auditor
//!
//! Audits a directory of Markdown knowledge documents before they are
//! indexed for retrieval, and writes one Markdown report per check.
//!
//! ## Checks
//!
//! - **Structure**: every required document exists, is long enough, has
//!   the required section headings and none of the forbidden placeholder
//!   phrases.
//! - **Facts**: every critical fact pattern (price, hours, address, phone,
//!   ...) matches somewhere in the corpus; missing facts name the document
//!   that should carry them.
//! - **Numbers**: prices, percentages and phone numbers are extracted,
//!   reduced to a canonical form and listed with the documents mentioning
//!   them, so conflicting values are visible side by side.
//!
//! ## Architecture
//!
//! 1. **Config** (`config`): base directory, corpus root, report paths and
//!    the optional YAML checklist overriding the built-in registry.
//! 2. **Corpus** (`corpus`): traversal and reading; failures are data.
//! 3. **Engine** (`engine/`): the three checks behind the [`Check`] trait,
//!    plus the [`Auditor`] that runs, renders and persists them.
//! 4. **Report** (`report`): deterministic Markdown rendering.
//! 5. **CLI** (`cli/`): `kb-audit` with one subcommand per check, and a
//!    standalone binary per check.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Structure report for kb/nn, written to reports/kb_audit_nn.md
//! kb-audit structure
//!
//! # All three reports for another project, failing on findings
//! kb-audit all --base-dir /srv/park --strict
//!
//! # Numeric summary as JSON
//! kb-audit-numbers --format json
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use kb_audit::{AuditConfig, Auditor, CheckKind};
//!
//! let auditor = Auditor::new(AuditConfig::new("."));
//! let outcome = auditor.check(CheckKind::Facts);
//! for line in outcome.summary_lines() {
//!     println!("{}", line);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod registry;
pub mod report;

// Re-export CLI types for command-line usage
pub use cli::{AuditCli, AuditCommands, CheckCli, ExitCode, OutputFormat, RunOptions};

pub use config::{AuditConfig, Checklist, ContentRules, FactPatternSpec};
pub use corpus::{Corpus, KnowledgeDocument, LoadOutcome, LoadedCorpus, TraversalError};
pub use engine::facts::{FactOutcome, FactScanner, PatternRegistry};
pub use engine::numbers::{NumericAuditor, NumericOutcome};
pub use engine::structure::{Issue, StructuralValidator, StructureOutcome};
pub use engine::{Auditor, Check, CheckKind, CheckRun, Outcome};
pub use error::{AuditError, Result};
pub use report::Report;

/// Run the multi-command CLI
///
/// This is the main entry point for the `kb-audit` binary.
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use kb_audit::{AuditCli, run_cli};
///
/// fn main() {
///     let cli = AuditCli::parse();
///     let exit_code = run_cli(cli);
///     std::process::exit(exit_code.into());
/// }
/// ```
pub fn run_cli(cli: AuditCli) -> ExitCode {
    cli::init_tracing(cli.verbose, cli.quiet);
    report_failure(cli::run(cli))
}

/// Run one check; entry point of the standalone binaries
pub fn run_standalone(kind: CheckKind, cli: CheckCli) -> ExitCode {
    cli::init_tracing(cli.verbose, cli.quiet);
    report_failure(cli::run_check(kind, cli))
}

fn report_failure(result: Result<ExitCode>) -> ExitCode {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from_error(&e)
        }
    }
}
