//! Report writers: a human-readable text report and a fixed-schema CSV
//! report, both consuming the same deterministically sorted finding list.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::models::finding::{sort_findings, Finding, FindingKind};

/// The seven-column CSV schema every report shares.
const CSV_HEADER: &[&str] = &[
    "Type",
    "Name",
    "Description",
    "File",
    "Module/Class",
    "Line Number",
    "Severity",
];

/// Writes `findings` to `path` as CSV, sorted into deterministic order first.
///
/// `findings` is sorted in place so the text report (if also written from the
/// same slice) sees the identical ordering.
pub fn write_csv(findings: &mut [Finding], path: &Path) -> Result<()> {
    sort_findings(findings);
    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for finding in findings.iter() {
        writer.write_record(&[
            finding.kind.as_str(),
            &finding.name,
            &finding.description,
            &finding.file_path.to_string_lossy(),
            &finding.module_or_class,
            &finding.line_number.to_string(),
            finding.severity.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `findings` to `path` as a grouped, human-readable text report.
pub fn write_text(findings: &mut [Finding], path: &Path) -> Result<()> {
    sort_findings(findings);
    let mut out = String::new();
    render_text(findings, &mut out);
    std::fs::write(path, out)?;
    Ok(())
}

/// Renders the text report body (used directly by tests and by
/// [`write_text`]) without touching the filesystem.
///
/// Three sections in a fixed order (Structural, Code, Architectural), each a
/// plain "- name: description" line per finding; structural findings also get
/// `Severity`/`File`/`Line` sub-lines. A summary footer totals each family.
pub fn render_text(findings: &[Finding], out: &mut String) {
    let structural: Vec<&Finding> =
        findings.iter().filter(|f| f.kind == FindingKind::Structural).collect();
    let code: Vec<&Finding> = findings.iter().filter(|f| f.kind == FindingKind::Code).collect();
    let architectural: Vec<&Finding> =
        findings.iter().filter(|f| f.kind == FindingKind::Architectural).collect();

    render_section(out, "Structural", &structural, true);
    render_section(out, "Code", &code, false);
    render_section(out, "Architectural", &architectural, false);

    out.push_str(&format!(
        "Summary: {} structural, {} code, {} architectural ({} total)\n",
        structural.len(),
        code.len(),
        architectural.len(),
        findings.len(),
    ));
}

fn render_section(out: &mut String, label: &str, findings: &[&Finding], with_detail: bool) {
    out.push_str(&format!("== {label} ==\n"));
    if findings.is_empty() {
        out.push_str(&format!("No {} smells detected.\n", label.to_lowercase()));
        return;
    }
    for finding in findings {
        out.push_str(&format!("- {}: {}\n", finding.name, finding.description));
        if with_detail {
            out.push_str(&format!("  Severity: {}\n", finding.severity.as_str()));
            out.push_str(&format!("  File: {}\n", finding.file_path.display()));
            out.push_str(&format!("  Line: {}\n", finding.line_number));
        }
    }
}

/// Writes a one-line batch summary to stderr, matching the spec's
/// "every non-fatal error is summarized with counts" requirement.
pub fn write_summary_line(
    writer: &mut impl Write,
    files_attempted: usize,
    files_succeeded: usize,
    error_count: usize,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "parsed {files_succeeded}/{files_attempted} files ({error_count} error(s))"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::finding::{FindingKind, Severity};
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn sample() -> Vec<Finding> {
        vec![
            Finding::new(
                FindingKind::Code,
                "Long Method",
                "too long",
                PathBuf::from("a.py"),
                "Widget.run",
                12,
                Severity::High,
            ),
            Finding::new(
                FindingKind::Structural,
                "High NOM",
                "too many methods",
                PathBuf::from("a.py"),
                "Widget",
                1,
                Severity::Medium,
            ),
        ]
    }

    #[test]
    fn csv_round_trips_through_seven_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&mut sample(), &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 7);

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        // Structural sorts before Code per FindingKind's declaration order.
        assert_eq!(records[0][0], "Structural");
        assert_eq!(records[1][0], "Code");
    }

    #[test]
    fn text_report_groups_by_family_in_fixed_order() {
        let mut out = String::new();
        render_text(&sample(), &mut out);
        let structural_at = out.find("== Structural ==").unwrap();
        let code_at = out.find("== Code ==").unwrap();
        let architectural_at = out.find("== Architectural ==").unwrap();
        assert!(structural_at < code_at);
        assert!(code_at < architectural_at);
        assert!(out.contains("- High NOM: too many methods"));
        assert!(out.contains("  Severity: Medium"));
        assert!(out.contains("- Long Method: too long"));
        assert!(out.contains("No architectural smells detected."));
        assert!(out.contains("Summary: 1 structural, 1 code, 0 architectural (2 total)"));
    }

    #[test]
    fn empty_findings_produce_per_section_placeholder_text() {
        let mut out = String::new();
        render_text(&[], &mut out);
        assert!(out.contains("No structural smells detected."));
        assert!(out.contains("No code smells detected."));
        assert!(out.contains("No architectural smells detected."));
        assert!(out.contains("Summary: 0 structural, 0 code, 0 architectural (0 total)"));
    }

    #[test]
    fn summary_line_reports_counts() {
        let mut buf = Vec::new();
        write_summary_line(&mut buf, 10, 8, 2).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "parsed 8/10 files (2 error(s))\n");
    }
}
