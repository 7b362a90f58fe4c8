//! Critical facts report
//!
//! Same options as `kb-audit facts`; writes `reports/kb_facts_nn.md` by default.

use clap::Parser;
use kb_audit::{run_standalone, CheckCli, CheckKind};

fn main() {
    let cli = CheckCli::parse();
    let exit_code = run_standalone(CheckKind::Facts, cli);
    std::process::exit(exit_code.into());
}
