//! End-to-end boundary scenarios driving the full pipeline (parse -> model ->
//! detectors -> report) against small on-disk fixtures.

use std::fs;

use smellscan::models::config::Config;
use smellscan::models::finding::Severity;
use smellscan::services::{
    architectural_smell_detector, code_smell_detector, project_model_builder, report_writer,
    structural_smell_detector,
};
use tempfile::tempdir;

fn all_findings(
    root: &std::path::Path,
    config: &Config,
) -> (Vec<smellscan::models::finding::Finding>, smellscan::models::error::BatchSummary) {
    let (model, summary) = project_model_builder::build_project_model(root);
    let mut findings = code_smell_detector::detect(&model, &config.code_smells);
    findings.extend(structural_smell_detector::detect(&model, &config.structural_smells));
    findings.extend(architectural_smell_detector::detect(
        &model,
        &config.architectural_smells,
    ));
    (findings, summary)
}

#[test]
fn empty_directory_produces_empty_reports_and_placeholder_text() {
    let dir = tempdir().unwrap();
    let config = Config::default();
    let (mut findings, summary) = all_findings(dir.path(), &config);
    assert_eq!(summary.files_attempted, 0);
    assert!(findings.is_empty());

    let mut out = String::new();
    report_writer::render_text(&findings, &mut out);
    assert!(out.contains("No structural smells detected."));
    assert!(out.contains("No code smells detected."));
    assert!(out.contains("No architectural smells detected."));

    let csv_path = dir.path().join("report.csv");
    report_writer::write_csv(&mut findings, &csv_path).unwrap();
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    assert_eq!(reader.headers().unwrap().len(), 7);
    assert_eq!(reader.records().count(), 0);
}

#[test]
fn single_file_parse_error_is_logged_but_does_not_fail_the_run() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("broken.py"), "def f(:\n").unwrap();

    let config = Config::default();
    let (findings, summary) = all_findings(dir.path(), &config);
    assert_eq!(summary.files_attempted, 1);
    assert_eq!(summary.files_succeeded, 0);
    assert_eq!(summary.errors.len(), 1);
    assert!(findings.is_empty());
}

#[test]
fn s1_mutual_imports_produce_exactly_one_cyclic_dependency_finding() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.py"), "import b\n").unwrap();
    fs::write(dir.path().join("b.py"), "import a\n").unwrap();

    let mut config = Config::default();
    config.architectural_smells.min_project_size = 2.0;
    let (findings, _) = all_findings(dir.path(), &config);

    let cycles: Vec<_> = findings.iter().filter(|f| f.name == "Cyclic Dependency").collect();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].severity, Severity::Medium);
}

#[test]
fn s3_class_with_30_methods_triggers_nom_and_large_class() {
    let dir = tempdir().unwrap();
    let mut source = String::from("class Big:\n");
    for i in 0..30 {
        source.push_str(&format!("    def m{i}(self):\n        return {i}\n"));
    }
    fs::write(dir.path().join("big.py"), source).unwrap();

    let config = Config::default();
    let (findings, _) = all_findings(dir.path(), &config);

    let nom = findings.iter().find(|f| f.name == "High Number of Methods (NOM)");
    let large_class = findings.iter().find(|f| f.name == "Large Class");
    assert!(nom.is_some(), "expected a structural NOM finding");
    assert!(large_class.is_some(), "expected a code-smell Large Class finding");
    assert_eq!(nom.unwrap().severity, Severity::High);
    assert_eq!(large_class.unwrap().severity, Severity::High);
}

#[test]
fn s6_stdlib_imports_excluded_project_imports_counted_as_fanout() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("pkg")).unwrap();
    fs::write(
        dir.path().join("m.py"),
        "import sys\nimport os\nimport json\nimport pkg.x\nimport pkg.y\nimport pkg.z\n",
    )
    .unwrap();
    fs::write(dir.path().join("pkg").join("__init__.py"), "").unwrap();
    fs::write(dir.path().join("pkg").join("x.py"), "").unwrap();
    fs::write(dir.path().join("pkg").join("y.py"), "").unwrap();
    fs::write(dir.path().join("pkg").join("z.py"), "").unwrap();

    let (model, _summary) = project_model_builder::build_project_model(dir.path());
    let m = model.modules.iter().find(|mod_| mod_.dotted_name == "m").unwrap();
    assert_eq!(model.dependency_graph.fan_out(m.id), 3);
}

#[test]
fn empty_class_produces_no_structural_findings() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("e.py"), "class Empty:\n    pass\n").unwrap();

    let config = Config::default();
    let (model, _) = project_model_builder::build_project_model(dir.path());
    let findings = structural_smell_detector::detect(&model, &config.structural_smells);
    let non_isolated: Vec<_> = findings.iter().filter(|f| f.name != "Isolated Class").collect();
    assert!(non_isolated.is_empty());
}
