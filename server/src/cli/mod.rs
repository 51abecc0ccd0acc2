//! Command-line surface: one `analyze` command plus three convenience
//! wrappers that pin `--type`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "smellscan",
    about = "Static-analysis engine for code, structural, and architectural smells in Python codebases",
    version,
    long_about = None
)]
pub struct Cli {
    /// Enable debug-level logging (overridden by RUST_LOG if set)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum SmellType {
    Code,
    Structural,
    Architectural,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full analysis pipeline (or a single detector with --type)
    Analyze {
        /// Directory of Python source to analyze
        directory: PathBuf,

        /// Path to a threshold configuration YAML document
        #[arg(long)]
        config: Option<PathBuf>,

        /// Base path for report output (writes `<base>.txt` and `<base>.csv`)
        #[arg(long, default_value = "code_quality_report")]
        output: PathBuf,

        /// Restrict analysis to a single detector
        #[arg(long, value_enum)]
        r#type: Option<SmellType>,
    },

    /// Shortcut for `analyze --type code`
    AnalyzeCode {
        directory: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "code_quality_report")]
        output: PathBuf,
    },

    /// Shortcut for `analyze --type structural`
    AnalyzeStructural {
        directory: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "code_quality_report")]
        output: PathBuf,
    },

    /// Shortcut for `analyze --type architectural`
    AnalyzeArchitectural {
        directory: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "code_quality_report")]
        output: PathBuf,
    },
}

/// Normalizes one of the three shortcut subcommands into the same
/// `(directory, config, output, type)` tuple `Analyze` carries, so
/// `main` only needs a single dispatch path.
pub struct ResolvedAnalyze {
    pub directory: PathBuf,
    pub config: Option<PathBuf>,
    pub output: PathBuf,
    pub smell_type: Option<SmellType>,
}

impl Commands {
    pub fn resolve(self) -> ResolvedAnalyze {
        match self {
            Commands::Analyze { directory, config, output, r#type } => {
                ResolvedAnalyze { directory, config, output, smell_type: r#type }
            }
            Commands::AnalyzeCode { directory, config, output } => {
                ResolvedAnalyze { directory, config, output, smell_type: Some(SmellType::Code) }
            }
            Commands::AnalyzeStructural { directory, config, output } => {
                ResolvedAnalyze { directory, config, output, smell_type: Some(SmellType::Structural) }
            }
            Commands::AnalyzeArchitectural { directory, config, output } => {
                ResolvedAnalyze { directory, config, output, smell_type: Some(SmellType::Architectural) }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_shortcut_pins_type() {
        let cli = Cli::parse_from(["smellscan", "analyze-code", "."]);
        let resolved = cli.command.resolve();
        assert_eq!(resolved.smell_type, Some(SmellType::Code));
    }

    #[test]
    fn plain_analyze_defaults_to_full_run() {
        let cli = Cli::parse_from(["smellscan", "analyze", "."]);
        let resolved = cli.command.resolve();
        assert_eq!(resolved.smell_type, None);
    }

    #[test]
    fn analyze_accepts_explicit_type() {
        let cli = Cli::parse_from(["smellscan", "analyze", ".", "--type", "structural"]);
        let resolved = cli.command.resolve();
        assert_eq!(resolved.smell_type, Some(SmellType::Structural));
    }
}
