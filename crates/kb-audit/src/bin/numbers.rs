//! Prices, discounts and phones report
//!
//! Same options as `kb-audit numbers`; writes `reports/kb_numbers_nn.md` by default.

use clap::Parser;
use kb_audit::{run_standalone, CheckCli, CheckKind};

fn main() {
    let cli = CheckCli::parse();
    let exit_code = run_standalone(CheckKind::Numbers, cli);
    std::process::exit(exit_code.into());
}
