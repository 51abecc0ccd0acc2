//! The single output record every detector emits.

use serde::Serialize;
use std::cmp::Ordering;
use std::path::PathBuf;

/// Which detector stage produced a finding.
///
/// Declaration order is the report order: structural, then code, then
/// architectural (spec-mandated CSV/text grouping), and `Ord` derives from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum FindingKind {
    Structural,
    Code,
    Architectural,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::Structural => "Structural",
            FindingKind::Code => "Code",
            FindingKind::Architectural => "Architectural",
        }
    }
}

/// A finding's severity, escalated from a rule's raw measurement against its
/// threshold: `High` above 1.5x threshold, `Medium` otherwise, `Low` for rules
/// that are intrinsically advisory regardless of measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        }
    }

    /// Escalates a raw measurement against `threshold` to Medium/High. Callers
    /// for intrinsically-advisory rules should use `Severity::Low` directly
    /// instead of calling this.
    pub fn from_measurement(value: f64, threshold: f64) -> Self {
        if threshold > 0.0 && value > threshold * 1.5 {
            Severity::High
        } else {
            Severity::Medium
        }
    }
}

/// A single detector output, matching the seven-column CSV schema:
/// `Type, Name, Description, File, Module/Class, Line Number, Severity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub name: String,
    pub description: String,
    pub file_path: PathBuf,
    pub module_or_class: String,
    pub line_number: u32,
    pub severity: Severity,
}

impl Finding {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: FindingKind,
        name: impl Into<String>,
        description: impl Into<String>,
        file_path: impl Into<PathBuf>,
        module_or_class: impl Into<String>,
        line_number: u32,
        severity: Severity,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            file_path: file_path.into(),
            module_or_class: module_or_class.into(),
            line_number,
            severity,
        }
    }

    /// The sort key used before report writing: kind, then file, then line,
    /// then rule name, giving a fully deterministic output order.
    fn sort_key(&self) -> (FindingKind, &PathBuf, u32, &str) {
        (self.kind, &self.file_path, self.line_number, self.name.as_str())
    }
}

impl PartialOrd for Finding {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Finding {}

impl Ord for Finding {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Sorts `findings` in place into the deterministic report order.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(kind: FindingKind, file: &str, line: u32, name: &str) -> Finding {
        Finding::new(kind, name, "desc", PathBuf::from(file), "Mod", line, Severity::Medium)
    }

    #[test]
    fn sorts_by_kind_then_file_then_line_then_name() {
        let mut findings = vec![
            f(FindingKind::Structural, "b.py", 1, "Z"),
            f(FindingKind::Code, "b.py", 2, "A"),
            f(FindingKind::Code, "a.py", 10, "B"),
            f(FindingKind::Code, "a.py", 10, "A"),
        ];
        sort_findings(&mut findings);
        let ordered: Vec<(&str, u32, &str)> = findings
            .iter()
            .map(|f| (f.file_path.to_str().unwrap(), f.line_number, f.name.as_str()))
            .collect();
        // Structural sorts before Code (spec-mandated kind order), then by file/line/name.
        assert_eq!(
            ordered,
            vec![("b.py", 1, "Z"), ("a.py", 10, "A"), ("a.py", 10, "B"), ("b.py", 2, "A")]
        );
    }

    #[test]
    fn severity_escalates_above_one_point_five_times_threshold() {
        assert_eq!(Severity::from_measurement(10.0, 10.0), Severity::Medium);
        assert_eq!(Severity::from_measurement(16.0, 10.0), Severity::High);
        assert_eq!(Severity::from_measurement(15.0, 10.0), Severity::Medium);
    }
}
