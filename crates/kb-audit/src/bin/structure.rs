//! Structure report of the required knowledge documents
//!
//! Same options as `kb-audit structure`; writes `reports/kb_audit_nn.md` by default.

use clap::Parser;
use kb_audit::{run_standalone, CheckCli, CheckKind};

fn main() {
    let cli = CheckCli::parse();
    let exit_code = run_standalone(CheckKind::Structure, cli);
    std::process::exit(exit_code.into());
}
