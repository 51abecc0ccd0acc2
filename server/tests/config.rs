//! Exercises `Config::load` against real files on disk (the `parse` half is
//! covered extensively by unit tests in `models::config`).

use std::fs;

use smellscan::models::config::Config;
use smellscan::models::error::AnalysisErrorKind;
use tempfile::tempdir;

#[test]
fn loads_thresholds_from_a_real_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("thresholds.yaml");
    fs::write(
        &path,
        r#"
code_smells:
  LONG_METHOD_LINES: { value: 5 }
structural_smells:
  NOM_THRESHOLD: { value: 3 }
architectural_smells: {}
"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.code_smells.long_method_lines, 5.0);
    assert_eq!(config.structural_smells.nom_threshold, 3.0);
}

#[test]
fn missing_file_is_a_config_invalid_error() {
    let dir = tempdir().unwrap();
    let err = Config::load(&dir.path().join("does_not_exist.yaml")).unwrap_err();
    assert_eq!(err.kind, AnalysisErrorKind::ConfigInvalid);
}
