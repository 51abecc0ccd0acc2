//! Threshold configuration store.
//!
//! Loads one YAML document with three sub-mappings (`code_smells`,
//! `structural_smells`, `architectural_smells`). Each entry is a mapping with at
//! least a numeric `value`; unknown entries are accepted and ignored. Missing
//! *structural* threshold keys fall back to defaults with a warning (per spec);
//! missing code/architectural keys simply take their struct default silently,
//! since the spec only names the structural keys as mandatory.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::models::error::AnalysisError;

/// A single threshold entry in the YAML document: `{value: <number>, ...}`.
/// Extra keys (e.g. a human-readable `description`) are accepted and dropped.
#[derive(Debug, Clone, Deserialize)]
struct RawThreshold {
    value: f64,
}

/// The raw document shape, before threshold extraction.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    code_smells: HashMap<String, RawThreshold>,
    #[serde(default)]
    structural_smells: HashMap<String, RawThreshold>,
    #[serde(default)]
    architectural_smells: HashMap<String, RawThreshold>,
}

/// The eleven structural thresholds the spec requires to be present.
const REQUIRED_STRUCTURAL_KEYS: &[&str] = &[
    "NOM_THRESHOLD",
    "WMPC1_THRESHOLD",
    "WMPC2_THRESHOLD",
    "SIZE2_THRESHOLD",
    "WAC_THRESHOLD",
    "LCOM_THRESHOLD",
    "RFC_THRESHOLD",
    "NOCC_THRESHOLD",
    "DIT_THRESHOLD",
    "LOC_THRESHOLD",
    "CBO_THRESHOLD",
];

macro_rules! threshold_bundle {
    ($name:ident { $($field:ident : $key:expr => $default:expr),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            $(pub $field: f64,)+
        }

        impl Default for $name {
            fn default() -> Self {
                Self { $($field: $default,)+ }
            }
        }

        impl $name {
            fn from_raw(raw: &HashMap<String, RawThreshold>, warn_missing: bool) -> Self {
                let defaults = Self::default();
                Self {
                    $($field: resolve_value(raw, $key, defaults.$field, warn_missing),)+
                }
            }
        }
    };
}

fn resolve_value(
    raw: &HashMap<String, RawThreshold>,
    key: &str,
    default: f64,
    warn_missing: bool,
) -> f64 {
    match raw.get(key) {
        Some(t) if t.value > 0.0 && t.value.is_finite() => t.value,
        Some(t) => {
            warn!(
                threshold = key,
                value = t.value,
                "invalid threshold value, falling back to default"
            );
            default
        }
        None => {
            if warn_missing {
                warn!(threshold = key, "missing required threshold, using default");
            }
            default
        }
    }
}

threshold_bundle!(CodeSmellThresholds {
    long_method_lines: "LONG_METHOD_LINES" => 30.0,
    large_class_methods: "LARGE_CLASS_METHODS" => 15.0,
    primitive_obsession_count: "PRIMITIVE_OBSESSION_COUNT" => 3.0,
    long_parameter_list: "LONG_PARAMETER_LIST" => 4.0,
    data_clumps_threshold: "DATA_CLUMPS_THRESHOLD" => 3.0,
    complex_conditional: "COMPLEX_CONDITIONAL" => 3.0,
    temporary_field_threshold: "TEMPORARY_FIELD_THRESHOLD" => 2.0,
    alternative_classes_threshold: "ALTERNATIVE_CLASSES_THRESHOLD" => 2.0,
    divergent_change_prefixes: "DIVERGENT_CHANGE_PREFIXES" => 3.0,
    divergent_change_methods: "DIVERGENT_CHANGE_METHODS" => 5.0,
    shotgun_surgery_calls: "SHOTGUN_SURGERY_CALLS" => 5.0,
    shotgun_surgery_contexts: "SHOTGUN_SURGERY_CONTEXTS" => 3.0,
    excessive_comments_ratio: "EXCESSIVE_COMMENTS_RATIO" => 0.3,
    large_comment_blocks: "LARGE_COMMENT_BLOCKS" => 3.0,
    duplicate_code_threshold: "DUPLICATE_CODE_THRESHOLD" => 2.0,
    duplicate_code_min_lines: "DUPLICATE_CODE_MIN_LINES" => 4.0,
    speculative_generality_threshold: "SPECULATIVE_GENERALITY_THRESHOLD" => 2.0,
    unused_parameters_threshold: "UNUSED_PARAMETERS_THRESHOLD" => 3.0,
    feature_envy_calls: "FEATURE_ENVY_CALLS" => 5.0,
    inappropriate_intimacy_shared: "INAPPROPRIATE_INTIMACY_SHARED" => 3.0,
    message_chain_length: "MESSAGE_CHAIN_LENGTH" => 3.0,
    middle_man_ratio: "MIDDLE_MAN_RATIO" => 0.6,
    data_class_methods: "DATA_CLASS_METHODS" => 4.0,
    lazy_class_methods: "LAZY_CLASS_METHODS" => 2.0,
    lazy_class_lines: "LAZY_CLASS_LINES" => 10.0,
});

threshold_bundle!(StructuralThresholds {
    nom_threshold: "NOM_THRESHOLD" => 10.0,
    wmpc1_threshold: "WMPC1_THRESHOLD" => 50.0,
    wmpc2_threshold: "WMPC2_THRESHOLD" => 50.0,
    size2_threshold: "SIZE2_THRESHOLD" => 30.0,
    wac_threshold: "WAC_THRESHOLD" => 10.0,
    lcom_threshold: "LCOM_THRESHOLD" => 5.0,
    rfc_threshold: "RFC_THRESHOLD" => 40.0,
    nocc_threshold: "NOCC_THRESHOLD" => 10.0,
    dit_threshold: "DIT_THRESHOLD" => 5.0,
    loc_threshold: "LOC_THRESHOLD" => 200.0,
    cbo_threshold: "CBO_THRESHOLD" => 14.0,
    mpc_threshold: "MPC_THRESHOLD" => 20.0,
    noc_threshold: "NOC_THRESHOLD" => 20.0,
    cyclomatic_complexity_threshold: "CYCLOMATIC_COMPLEXITY_THRESHOLD" => 10.0,
    max_fanout: "MAX_FANOUT" => 15.0,
    max_fanin: "MAX_FANIN" => 15.0,
    max_file_length: "MAX_FILE_LENGTH" => 250.0,
    max_branches: "MAX_BRANCHES" => 10.0,
});

threshold_bundle!(ArchitecturalThresholds {
    hub_like_dependency_threshold: "HUB_LIKE_DEPENDENCY_THRESHOLD" => 0.5,
    min_hub_connections: "MIN_HUB_CONNECTIONS" => 5.0,
    min_scattered_occurrences: "MIN_SCATTERED_OCCURRENCES" => 3.0,
    redundant_similarity_threshold: "REDUNDANT_SIMILARITY_THRESHOLD" => 0.8,
    min_god_object_functions: "MIN_GOD_OBJECT_FUNCTIONS" => 5.0,
    god_object_functions: "GOD_OBJECT_FUNCTIONS" => 10.0,
    min_api_calls: "MIN_API_CALLS" => 10.0,
    api_repetition_threshold: "API_REPETITION_THRESHOLD" => 0.4,
    min_project_size: "MIN_PROJECT_SIZE" => 3.0,
    min_cycle_size: "MIN_CYCLE_SIZE" => 2.0,
    max_cycle_size: "MAX_CYCLE_SIZE" => 5.0,
    min_dependencies: "MIN_DEPENDENCIES" => 5.0,
    unstable_dependency_threshold: "UNSTABLE_DEPENDENCY_THRESHOLD" => 0.8,
});

/// The full set of threshold bundles loaded from one configuration document.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub code_smells: CodeSmellThresholds,
    pub structural_smells: StructuralThresholds,
    pub architectural_smells: ArchitecturalThresholds,
}

impl Config {
    /// Loads and validates a configuration document from `path`.
    ///
    /// A missing file or malformed YAML document is fatal (`ConfigInvalid`).
    /// Missing required structural keys or non-positive values only warn and
    /// fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::config_invalid(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, AnalysisError> {
        let raw: RawConfig = serde_yaml::from_str(text)
            .map_err(|e| AnalysisError::config_invalid(format!("malformed config document: {e}")))?;

        for key in REQUIRED_STRUCTURAL_KEYS {
            if !raw.structural_smells.contains_key(*key) {
                warn!(threshold = *key, "required structural threshold absent");
            }
        }

        Ok(Self {
            code_smells: CodeSmellThresholds::from_raw(&raw.code_smells, false),
            structural_smells: StructuralThresholds::from_raw(&raw.structural_smells, true),
            architectural_smells: ArchitecturalThresholds::from_raw(&raw.architectural_smells, false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_document_is_empty() {
        let cfg = Config::parse("code_smells: {}\nstructural_smells: {}\narchitectural_smells: {}\n")
            .unwrap();
        assert_eq!(cfg.structural_smells.nom_threshold, 10.0);
        assert_eq!(cfg.code_smells.long_method_lines, 30.0);
    }

    #[test]
    fn reads_explicit_values() {
        let yaml = r#"
structural_smells:
  NOM_THRESHOLD: { value: 99 }
code_smells: {}
architectural_smells: {}
"#;
        let cfg = Config::parse(yaml).unwrap();
        assert_eq!(cfg.structural_smells.nom_threshold, 99.0);
    }

    #[test]
    fn non_positive_value_falls_back_to_default() {
        let yaml = r#"
structural_smells:
  NOM_THRESHOLD: { value: -5 }
code_smells: {}
architectural_smells: {}
"#;
        let cfg = Config::parse(yaml).unwrap();
        assert_eq!(cfg.structural_smells.nom_threshold, 10.0);
    }

    #[test]
    fn malformed_document_is_fatal() {
        let err = Config::parse("not: [valid, yaml: structure").unwrap_err();
        assert_eq!(err.kind, crate::models::error::AnalysisErrorKind::ConfigInvalid);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let yaml = r#"
structural_smells:
  NOM_THRESHOLD: { value: 12 }
  SOME_UNKNOWN_KEY: { value: 1 }
code_smells: {}
architectural_smells: {}
"#;
        let cfg = Config::parse(yaml).unwrap();
        assert_eq!(cfg.structural_smells.nom_threshold, 12.0);
    }
}
