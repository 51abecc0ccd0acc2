//! Error taxonomy for the analysis pipeline.
//!
//! `AnalysisError` is the one error kind the engine signals, per the documented
//! taxonomy: `FileRead`, `Parse`, `RuleInternal`, `ConfigInvalid`. `FileRead` and
//! `Parse` reduce to a per-file skip at the file-loop boundary; `RuleInternal`
//! reduces to a missing finding at the rule boundary; `ConfigInvalid` is fatal.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The taxonomy of conditions `AnalysisError` can signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisErrorKind {
    FileRead,
    Parse,
    RuleInternal,
    ConfigInvalid,
}

impl fmt::Display for AnalysisErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnalysisErrorKind::FileRead => "file-read",
            AnalysisErrorKind::Parse => "parse",
            AnalysisErrorKind::RuleInternal => "rule-internal",
            AnalysisErrorKind::ConfigInvalid => "config-invalid",
        };
        f.write_str(s)
    }
}

/// A single non-fatal (or, for `ConfigInvalid`, fatal) analysis failure.
#[derive(Error, Debug, Clone)]
#[error("{kind}: {message}{}{}{}",
    .file_path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default(),
    .line_number.map(|l| format!(" (line: {l})")).unwrap_or_default(),
    .function_name.as_ref().map(|f| format!(" (in: {f})")).unwrap_or_default(),
)]
pub struct AnalysisError {
    pub kind: AnalysisErrorKind,
    pub message: String,
    pub file_path: Option<PathBuf>,
    pub line_number: Option<u32>,
    pub function_name: Option<String>,
}

impl AnalysisError {
    pub fn file_read(message: impl Into<String>, file_path: PathBuf) -> Self {
        Self {
            kind: AnalysisErrorKind::FileRead,
            message: message.into(),
            file_path: Some(file_path),
            line_number: None,
            function_name: None,
        }
    }

    pub fn parse(message: impl Into<String>, file_path: PathBuf, line_number: Option<u32>) -> Self {
        Self {
            kind: AnalysisErrorKind::Parse,
            message: message.into(),
            file_path: Some(file_path),
            line_number,
            function_name: None,
        }
    }

    pub fn rule_internal(
        message: impl Into<String>,
        file_path: PathBuf,
        function_name: impl Into<String>,
    ) -> Self {
        Self {
            kind: AnalysisErrorKind::RuleInternal,
            message: message.into(),
            file_path: Some(file_path),
            line_number: None,
            function_name: Some(function_name.into()),
        }
    }

    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self {
            kind: AnalysisErrorKind::ConfigInvalid,
            message: message.into(),
            file_path: None,
            line_number: None,
            function_name: None,
        }
    }
}

/// Summary of a completed file-loop pass, surfaced to the user per the spec's
/// "every non-fatal error is summarized with counts" requirement.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub files_attempted: usize,
    pub files_succeeded: usize,
    pub errors: Vec<AnalysisError>,
}

impl BatchSummary {
    pub fn success_rate(&self) -> f64 {
        if self.files_attempted == 0 {
            1.0
        } else {
            self.files_succeeded as f64 / self.files_attempted as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_handles_empty_batch() {
        let summary = BatchSummary::default();
        assert_eq!(summary.success_rate(), 1.0);
    }

    #[test]
    fn success_rate_computes_ratio() {
        let summary = BatchSummary {
            files_attempted: 4,
            files_succeeded: 3,
            errors: vec![],
        };
        assert_eq!(summary.success_rate(), 0.75);
    }

    #[test]
    fn display_includes_context() {
        let err = AnalysisError::parse("bad syntax", PathBuf::from("a.py"), Some(12));
        let rendered = err.to_string();
        assert!(rendered.contains("bad syntax"));
        assert!(rendered.contains("a.py"));
        assert!(rendered.contains("12"));
    }
}
