use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use smellscan::cli::{Cli, ResolvedAnalyze, SmellType};
use smellscan::models::config::Config;
use smellscan::models::finding::Finding;
use smellscan::services::{
    architectural_smell_detector, code_smell_detector, project_model_builder, report_writer,
    structural_smell_detector,
};

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "smellscan=debug" } else { "smellscan=info" })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let resolved = cli.command.resolve();
    match run(resolved) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(resolved: ResolvedAnalyze) -> Result<()> {
    let config = match &resolved.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    info!(directory = %resolved.directory.display(), "starting analysis");
    let (model, summary) = project_model_builder::build_project_model(&resolved.directory);

    if !summary.errors.is_empty() {
        warn!(
            failed = summary.errors.len(),
            attempted = summary.files_attempted,
            "some files could not be parsed"
        );
    }
    report_writer::write_summary_line(
        &mut std::io::stderr(),
        summary.files_attempted,
        summary.files_succeeded,
        summary.errors.len(),
    )?;

    let mut findings: Vec<Finding> = match resolved.smell_type {
        Some(SmellType::Code) => code_smell_detector::detect(&model, &config.code_smells),
        Some(SmellType::Structural) => {
            structural_smell_detector::detect(&model, &config.structural_smells)
        }
        Some(SmellType::Architectural) => {
            architectural_smell_detector::detect(&model, &config.architectural_smells)
        }
        None => {
            let mut all = code_smell_detector::detect(&model, &config.code_smells);
            all.extend(structural_smell_detector::detect(&model, &config.structural_smells));
            all.extend(architectural_smell_detector::detect(
                &model,
                &config.architectural_smells,
            ));
            all
        }
    };

    let text_path = with_extension(&resolved.output, "txt");
    let csv_path = with_extension(&resolved.output, "csv");
    report_writer::write_text(&mut findings, &text_path)?;
    report_writer::write_csv(&mut findings, &csv_path)?;

    info!(
        findings = findings.len(),
        text_report = %text_path.display(),
        csv_report = %csv_path.display(),
        "analysis complete"
    );
    Ok(())
}

fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    path.set_extension(ext);
    path
}
