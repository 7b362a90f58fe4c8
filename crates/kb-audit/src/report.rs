//! Report model and Markdown rendering
//!
//! Rendering is pure: a [`Report`] is assembled from a checker's
//! structured output plus an injected timestamp, and [`Report::render`]
//! turns it into text. Writing to disk is the separate
//! [`write_report`] step.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::error::Result;

/// Placeholder line for an empty list
pub const EMPTY_MARKER: &str = "- None.";

/// Heading of the counts section
pub const SUMMARY_HEADING: &str = "Summary";
/// Heading of the traversal/read failures section
pub const READ_ERRORS_HEADING: &str = "Read errors";

/// A bulleted item with optional nested detail lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    pub text: String,
    pub children: Vec<String>,
}

impl Bullet {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: impl Into<String>) -> Self {
        self.children.push(child.into());
        self
    }
}

impl From<String> for Bullet {
    fn from(text: String) -> Self {
        Bullet::new(text)
    }
}

impl From<&str> for Bullet {
    fn from(text: &str) -> Self {
        Bullet::new(text)
    }
}

/// Two-column table: value on the left, documents on the right
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: [String; 2],
    pub rows: Vec<[String; 2]>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionBody {
    Bullets(Vec<Bullet>),
    Table(Table),
    Paragraphs(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: SectionBody,
}

/// A rendered-once audit report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub generated_at: String,
    pub sections: Vec<Section>,
}

impl Report {
    pub fn new(title: impl Into<String>, generated_at: &DateTime<FixedOffset>) -> Self {
        Self {
            title: title.into(),
            generated_at: format_timestamp(generated_at),
            sections: Vec::new(),
        }
    }

    pub fn bullets<I, B>(mut self, heading: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bullet>,
    {
        self.sections.push(Section {
            heading: heading.into(),
            body: SectionBody::Bullets(items.into_iter().map(Into::into).collect()),
        });
        self
    }

    pub fn table(
        mut self,
        heading: impl Into<String>,
        headers: [&str; 2],
        rows: Vec<[String; 2]>,
    ) -> Self {
        self.sections.push(Section {
            heading: heading.into(),
            body: SectionBody::Table(Table {
                headers: headers.map(String::from),
                rows,
            }),
        });
        self
    }

    /// "Read errors" section, omitted when there are none
    pub fn read_errors<I, B>(self, errors: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bullet>,
    {
        let items: Vec<Bullet> = errors.into_iter().map(Into::into).collect();
        if items.is_empty() {
            self
        } else {
            self.bullets(READ_ERRORS_HEADING, items)
        }
    }

    /// Insert a section directly after the summary (or first, if none)
    pub fn insert_after_summary(&mut self, section: Section) {
        let position = self
            .sections
            .iter()
            .position(|s| s.heading == SUMMARY_HEADING)
            .map_or(0, |i| i + 1);
        self.sections.insert(position, section);
    }

    /// Render as Markdown
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("_Generated: {}_\n", self.generated_at));

        for section in &self.sections {
            out.push_str(&format!("\n## {}\n", section.heading));
            match &section.body {
                SectionBody::Bullets(items) => render_bullets(&mut out, items),
                SectionBody::Table(table) => render_table(&mut out, table),
                SectionBody::Paragraphs(lines) => {
                    for line in lines {
                        out.push_str(line);
                        out.push('\n');
                    }
                }
            }
        }

        out
    }
}

fn render_bullets(out: &mut String, items: &[Bullet]) {
    if items.is_empty() {
        out.push_str(EMPTY_MARKER);
        out.push('\n');
        return;
    }
    for item in items {
        out.push_str(&format!("- {}\n", item.text));
        for child in &item.children {
            out.push_str(&format!("  - {}\n", child));
        }
    }
}

fn render_table(out: &mut String, table: &Table) {
    if table.rows.is_empty() {
        out.push_str(EMPTY_MARKER);
        out.push('\n');
        return;
    }
    out.push_str(&format!(
        "| {} | {} |\n|---|---|\n",
        escape_cell(&table.headers[0]),
        escape_cell(&table.headers[1])
    ));
    for [left, right] in &table.rows {
        out.push_str(&format!("| {} | {} |\n", escape_cell(left), escape_cell(right)));
    }
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
}

/// Timestamp line format
pub fn format_timestamp(generated_at: &DateTime<FixedOffset>) -> String {
    generated_at.format("%Y-%m-%d %H:%M:%S %:z").to_string()
}

/// Wrap a path in backticks
pub fn code(path: &str) -> String {
    format!("`{}`", path)
}

/// Comma-separated, backtick-quoted, sorted document list
pub fn paths_cell<'a, I>(paths: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let mut sorted: Vec<&String> = paths.into_iter().collect();
    sorted.sort();
    sorted.dedup();
    sorted
        .into_iter()
        .map(|p| code(p))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Persist a rendered report in one write
///
/// Parent directories are created. The file handle is scoped to this
/// call and flushed before returning.
pub fn write_report(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content.as_bytes())?;
    writer.flush()?;
    info!(path = %path.display(), bytes = content.len(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_render_layout() {
        let report = Report::new("Numbers", &fixed_time())
            .bullets(SUMMARY_HEADING, ["Documents scanned: 2"])
            .read_errors(Vec::<String>::new())
            .table(
                "Values",
                ["Value", "Documents"],
                vec![["1000 ₽".to_string(), "`a.md`, `b.md`".to_string()]],
            )
            .bullets("Phones", Vec::<Bullet>::new());

        let expected = "# Numbers\n\n\
                        _Generated: 2024-05-01 09:30:00 +03:00_\n\
                        \n## Summary\n- Documents scanned: 2\n\
                        \n## Values\n| Value | Documents |\n|---|---|\n| 1000 ₽ | `a.md`, `b.md` |\n\
                        \n## Phones\n- None.\n";
        assert_eq!(report.render(), expected);
    }

    #[test]
    fn test_nested_bullets_and_escaping() {
        let report = Report::new("T", &fixed_time())
            .bullets(
                "Problems",
                [Bullet::new("`a.md`: too short").with_child("Missing: ## Факты")],
            )
            .table("T", ["A", "B"], vec![["a|b".to_string(), "c".to_string()]]);
        let text = report.render();
        assert!(text.contains("- `a.md`: too short\n  - Missing: ## Факты\n"));
        assert!(text.contains("| a\\|b | c |"));
    }

    #[test]
    fn test_insert_after_summary() {
        let mut report = Report::new("T", &fixed_time())
            .bullets(SUMMARY_HEADING, ["x"])
            .bullets("Findings", ["y"]);
        report.insert_after_summary(Section {
            heading: "Audit errors".to_string(),
            body: SectionBody::Paragraphs(vec!["bad".to_string()]),
        });
        let headings: Vec<_> = report.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec![SUMMARY_HEADING, "Audit errors", "Findings"]);
    }

    #[test]
    fn test_paths_cell_sorts() {
        let paths = vec!["kb/b.md".to_string(), "kb/a.md".to_string()];
        assert_eq!(paths_cell(&paths), "`kb/a.md`, `kb/b.md`");
    }

    #[test]
    fn test_write_report_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reports/nested/r.md");
        write_report(&path, "# R\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "# R\n");
    }
}
