//! Console output for audit runs
//!
//! The Markdown report on disk is the primary artifact; this is the short
//! summary printed after each run, as a colored table or as JSON/YAML.

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

use crate::engine::{CheckKind, CheckRun, Outcome};
use crate::error::{AuditError, Result};

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable summary with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

/// Console view of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput<'a> {
    pub check: CheckKind,
    pub report_path: String,
    pub has_findings: bool,
    pub corpus_unavailable: bool,
    pub summary: Vec<String>,
    pub outcome: &'a Outcome,
}

impl<'a> RunOutput<'a> {
    pub fn from_run(run: &'a CheckRun) -> Self {
        Self {
            check: run.outcome.kind(),
            report_path: run.report_path.display().to_string(),
            has_findings: run.outcome.has_findings(),
            corpus_unavailable: run.outcome.corpus_unavailable(),
            summary: run.outcome.summary_lines(),
            outcome: &run.outcome,
        }
    }

    /// Render output in the specified format
    pub fn render(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(self)
                    .map_err(|e| AuditError::Serialization(e.to_string()))?;
                println!("{}", json);
                Ok(())
            }
            OutputFormat::Yaml => {
                let yaml = serde_yaml::to_string(self)
                    .map_err(|e| AuditError::Serialization(e.to_string()))?;
                println!("{}", yaml);
                Ok(())
            }
            OutputFormat::Table => {
                self.render_table();
                Ok(())
            }
        }
    }

    fn render_table(&self) {
        let mut stdout = io::stdout();

        writeln!(stdout).ok();
        writeln!(stdout, "{}", self.check.title().cyan().bold()).ok();
        writeln!(stdout, "{}", "=".repeat(60)).ok();

        for line in &self.summary {
            writeln!(stdout, "  {}", line).ok();
        }
        writeln!(stdout).ok();

        let status = if self.corpus_unavailable {
            format!("{} corpus root unavailable", "x".red())
        } else if self.has_findings {
            format!("{} findings present", "!".yellow())
        } else {
            format!("{} no findings", "+".green())
        };
        writeln!(stdout, "{}", status).ok();
        writeln!(stdout, "Report: {}", self.report_path.bold()).ok();
    }
}

/// Print the console summary of a run
pub fn print_run(run: &CheckRun, format: OutputFormat) -> Result<()> {
    RunOutput::from_run(run).render(format)
}
