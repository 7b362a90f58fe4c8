//! Knowledge Base Auditor CLI
//!
//! # Usage
//!
//! ```bash
//! # Structure, facts or numbers report
//! kb-audit structure
//! kb-audit facts --corpus kb/nn
//! kb-audit numbers --format json
//!
//! # Every report, failing when findings are present
//! kb-audit all --strict
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success - reports written
//! - 1: Findings present (only with --strict)
//! - 3: Invalid input or arguments
//! - 4: Corpus root missing or unreadable (report still written)
//! - 10: Internal error

use clap::Parser;
use kb_audit::{run_cli, AuditCli};

fn main() {
    let cli = AuditCli::parse();

    // Tracing is initialised inside run_cli once -v/--quiet are known
    let exit_code = run_cli(cli);
    std::process::exit(exit_code.into());
}
