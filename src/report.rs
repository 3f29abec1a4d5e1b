// 📄 Report Writers - CSV + HTML participation lists
//
// Two report shapes:
//   resolution: Student Number | Student Name | Original Input   (one run)
//   merge:      Student Number | Student Name                    (many runs)
//
// HTML is a single self-contained page with inline styling. Everything a
// student typed is escaped before it lands in the page.

use crate::aggregate::AggregateReport;
use crate::pipeline::ResolutionReport;
use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::path::Path;
use tracing::info;

pub const RESOLUTION_TITLE: &str = "Participants List";
pub const MERGE_TITLE: &str = "Merged Participants List";

// ============================================================================
// CSV ROWS
// ============================================================================

#[derive(Debug, Serialize)]
struct ResolutionRow<'a> {
    #[serde(rename = "Student Number")]
    id: &'a str,

    #[serde(rename = "Student Name")]
    name: &'a str,

    #[serde(rename = "Original Input")]
    original_input: &'a str,
}

#[derive(Debug, Serialize)]
struct MergeRow<'a> {
    #[serde(rename = "Student Number")]
    id: &'a str,

    #[serde(rename = "Student Name")]
    name: &'a str,
}

// ============================================================================
// RESOLUTION REPORT
// ============================================================================

pub fn write_resolution_csv(path: &Path, report: &ResolutionReport, unknown: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for record in report.records() {
        writer.serialize(ResolutionRow {
            id: &record.id,
            name: record.display_name(unknown),
            original_input: &record.original_input,
        })?;
    }

    // An empty report still gets its header row
    if report.records().is_empty() {
        writer.write_record(["Student Number", "Student Name", "Original Input"])?;
    }

    writer.flush()?;
    info!("Wrote {} rows to {}", report.matched_count(), path.display());
    Ok(())
}

pub fn render_resolution_html(report: &ResolutionReport, unknown: &str) -> String {
    let rows: Vec<[&str; 3]> = report
        .records()
        .iter()
        .map(|r| [r.id.as_str(), r.display_name(unknown), r.original_input.as_str()])
        .collect();

    render_html(
        RESOLUTION_TITLE,
        &["Student Number", "Student Name", "Original Input"],
        rows.iter().map(|r| &r[..]),
    )
}

pub fn write_resolution_html(path: &Path, report: &ResolutionReport, unknown: &str) -> Result<()> {
    let html = render_resolution_html(report, unknown);
    std::fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote HTML report to {}", path.display());
    Ok(())
}

/// Console summary: counts, then every unmatched entry
pub fn resolution_summary(report: &ResolutionReport) -> String {
    let mut out = format!(
        "Total responses in export: {}\nTotal matched responses: {}\nTotal unmatched responses: {}\n",
        report.total_inputs(),
        report.matched_count(),
        report.unmatched_count()
    );

    if !report.unmatched().is_empty() {
        out.push_str("Unmatched entries:\n");
        for entry in report.unmatched() {
            out.push_str(&format!(" - {}\n", entry));
        }
    }

    out
}

// ============================================================================
// MERGE REPORT
// ============================================================================

pub fn write_merge_csv(path: &Path, report: &AggregateReport, unknown: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for (id, name) in &report.students {
        writer.serialize(MergeRow {
            id,
            name: name.as_deref().unwrap_or(unknown),
        })?;
    }

    if report.students.is_empty() {
        writer.write_record(["Student Number", "Student Name"])?;
    }

    writer.flush()?;
    info!("Wrote {} rows to {}", report.students.len(), path.display());
    Ok(())
}

pub fn render_merge_html(report: &AggregateReport, unknown: &str) -> String {
    let rows: Vec<[&str; 2]> = report
        .students
        .iter()
        .map(|(id, name)| [id.as_str(), name.as_deref().unwrap_or(unknown)])
        .collect();

    render_html(
        MERGE_TITLE,
        &["Student Number", "Student Name"],
        rows.iter().map(|r| &r[..]),
    )
}

pub fn write_merge_html(path: &Path, report: &AggregateReport, unknown: &str) -> Result<()> {
    let html = render_merge_html(report, unknown);
    std::fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote HTML report to {}", path.display());
    Ok(())
}

// ============================================================================
// HTML
// ============================================================================

const STYLE: &str = "\
        body { font-family: Arial, sans-serif; }
        table { border-collapse: collapse; width: 50%; margin: 20px auto; }
        th, td { border: 1px solid black; padding: 10px; text-align: left; }
        th { background-color: #f2f2f2; }
        footer { text-align: center; color: #777; font-size: small; }";

fn render_html<'a, R>(title: &str, headers: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = &'a [&'a str]>,
{
    let title = escape_html(title);
    let mut html = format!(
        "<!DOCTYPE html>
<html>
<head>
    <meta charset=\"utf-8\">
    <title>{title}</title>
    <style>
{style}
    </style>
</head>
<body>
    <h2 style=\"text-align:center;\">{title}</h2>
    <table>
",
        title = title,
        style = STYLE
    );

    let header_cells: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape_html(h)))
        .collect();
    html.push_str(&format!("        <tr>{}</tr>\n", header_cells));

    for row in rows {
        let cells: String = row
            .iter()
            .map(|c| format!("<td>{}</td>", escape_html(c)))
            .collect();
        html.push_str(&format!("        <tr>{}</tr>\n", cells));
    }

    html.push_str(&format!(
        "    </table>
    <footer>Generated {}</footer>
</body>
</html>
",
        Local::now().format("%Y-%m-%d %H:%M")
    ));

    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::pipeline::resolve_all;
    use crate::roster::{Roster, RosterEntry};
    use tempfile::tempdir;

    fn sample_roster() -> Roster {
        Roster::from_entries(vec![
            RosterEntry::new("1002013", "Ana Pereira"),
            RosterEntry::new("1002099", "Bruno Costa"),
        ])
    }

    #[test]
    fn test_resolution_csv() {
        let roster = sample_roster();
        let report = resolve_all(["Bruno, C", "7777777", "zz"], &roster);

        let dir = tempdir().unwrap();
        let path = dir.path().join("quiz.csv");
        write_resolution_csv(&path, &report, "Unknown").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Student Number,Student Name,Original Input");
        assert_eq!(lines[1], "1002099,Bruno Costa,\"Bruno, C\"");
        assert_eq!(lines[2], "7777777,Unknown,7777777");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_resolution_csv_has_header() {
        let roster = sample_roster();
        let report = resolve_all(["zz"], &roster);

        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_resolution_csv(&path, &report, "Unknown").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim(), "Student Number,Student Name,Original Input");
    }

    #[test]
    fn test_html_escapes_student_input() {
        let roster = sample_roster();
        let report = resolve_all(["<b>1002013</b> & co"], &roster);

        let html = render_resolution_html(&report, "Unknown");

        assert!(html.contains("<title>Participants List</title>"));
        assert!(html.contains("<th>Student Number</th><th>Student Name</th><th>Original Input</th>"));
        assert!(html.contains("<td>&lt;b&gt;1002013&lt;/b&gt; &amp; co</td>"));
        assert!(!html.contains("<b>1002013</b>"));
    }

    #[test]
    fn test_merge_outputs() {
        let roster = sample_roster();
        let report = AggregateReport {
            students: aggregate(
                &roster,
                vec![vec!["1002099".to_string(), "1000001".to_string()]],
            ),
            sources_read: 1,
            skipped: Vec::new(),
        };

        let dir = tempdir().unwrap();
        let path = dir.path().join("merged.csv");
        write_merge_csv(&path, &report, "Unknown").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["Student Number,Student Name", "1000001,Unknown", "1002099,Bruno Costa"]
        );

        let html = render_merge_html(&report, "Unknown");
        assert!(html.contains("Merged Participants List"));
        assert!(html.contains("<tr><td>1000001</td><td>Unknown</td></tr>"));
    }

    #[test]
    fn test_summary_lists_unmatched() {
        let roster = sample_roster();
        let report = resolve_all(["1002013", "??", "Bruno C"], &roster);

        let summary = resolution_summary(&report);
        assert!(summary.contains("Total responses in export: 3"));
        assert!(summary.contains("Total matched responses: 2"));
        assert!(summary.contains("Total unmatched responses: 1"));
        assert!(summary.contains(" - ??"));
    }

    #[test]
    fn test_summary_exact_text() {
        let roster = sample_roster();

        let report = resolve_all(["1002013", "??"], &roster);
        assert_eq!(
            resolution_summary(&report),
            "Total responses in export: 2\n\
             Total matched responses: 1\n\
             Total unmatched responses: 1\n\
             Unmatched entries:\n - ??\n"
        );

        let clean = resolve_all(["1002099"], &roster);
        assert!(!resolution_summary(&clean).contains("Unmatched entries"));
    }

    #[test]
    fn test_html_page_is_complete() {
        let html = render_html("A & B", &["Col"], [&["x"][..], &["y"][..]]);

        assert!(html.starts_with("<!DOCTYPE html>\n<html>\n<head>\n"));
        assert!(html.ends_with("</body>\n</html>\n"));
        assert_eq!(html.matches("A &amp; B").count(), 2);
        assert!(html.contains("        <tr><td>x</td></tr>\n        <tr><td>y</td></tr>\n    </table>"));
        assert!(html.contains("<footer>Generated "));
    }
}
