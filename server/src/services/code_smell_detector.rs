//! The 21 code-smell rules, each a pure function over the [`ProjectModel`]
//! and [`CodeSmellThresholds`], returning zero or more [`Finding`]s.
//!
//! Exclusion lists (`logger`, `config`, `utils`, `helper`, `cache`, `_cache`)
//! and decorator checks (`@property`, `@dataclass`, `@staticmethod`) mirror
//! the Python original this engine was distilled from.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::config::CodeSmellThresholds;
use crate::models::finding::{Finding, FindingKind, Severity};
use crate::models::project_model::{ClassInfo, ClassKind, MethodInfo, ModuleInfo, ProjectModel};

const UTILITY_NAME_FRAGMENTS: &[&str] = &["logger", "config", "utils", "helper", "cache", "_cache"];

fn is_utility_call(name: &str) -> bool {
    let lower = name.to_lowercase();
    UTILITY_NAME_FRAGMENTS.iter().any(|frag| lower.contains(frag))
}

fn is_magic(method: &MethodInfo) -> bool {
    method.name.starts_with("__") && method.name.ends_with("__")
}

pub fn detect(model: &ProjectModel, thresholds: &CodeSmellThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();

    for module in &model.modules {
        findings.extend(excessive_comments(module, thresholds));
        findings.extend(duplicate_code(module, thresholds));
        findings.extend(alternative_classes(module, thresholds));
        findings.extend(divergent_change(module, thresholds));

        for class in &module.classes {
            findings.extend(long_method(module, &class.name, &class.methods, thresholds));
            findings.extend(large_class(module, class, thresholds));
            findings.extend(primitive_obsession(module, &class.name, &class.methods, thresholds));
            findings.extend(long_parameter_list(module, &class.name, &class.methods, thresholds));
            findings.extend(data_clumps(module, &class.name, &class.methods, thresholds));
            findings.extend(switch_statements(module, &class.name, &class.methods, thresholds));
            findings.extend(temporary_field(module, class, thresholds));
            findings.extend(speculative_generality(module, class, thresholds));
            findings.extend(feature_envy(module, class, thresholds));
            findings.extend(inappropriate_intimacy(module, class, thresholds));
            findings.extend(message_chains(module, class, thresholds));
            findings.extend(middle_man(module, class, thresholds));
            findings.extend(data_class(module, class, thresholds));
            findings.extend(lazy_class(module, class, thresholds));
        }

        // These five rules are scoped to "every function definition" in the
        // spec, not just methods, so they also run once over the module's
        // top-level functions.
        findings.extend(long_method(module, &module.dotted_name, &module.free_functions, thresholds));
        findings.extend(primitive_obsession(module, &module.dotted_name, &module.free_functions, thresholds));
        findings.extend(long_parameter_list(module, &module.dotted_name, &module.free_functions, thresholds));
        findings.extend(data_clumps(module, &module.dotted_name, &module.free_functions, thresholds));
        findings.extend(switch_statements(module, &module.dotted_name, &module.free_functions, thresholds));

        findings.extend(dead_code(module, thresholds));
    }

    findings.extend(shotgun_surgery(model, thresholds));
    findings.extend(parallel_inheritance(model));

    findings
}

fn long_method(
    module: &ModuleInfo,
    context: &str,
    methods: &[MethodInfo],
    t: &CodeSmellThresholds,
) -> Vec<Finding> {
    methods
        .iter()
        .filter(|m| !is_magic(m) && m.line_count() as f64 > t.long_method_lines)
        .map(|m| {
            Finding::new(
                FindingKind::Code,
                "Long Method",
                format!("Method '{}' has {} lines", m.name, m.line_count()),
                module.path.clone(),
                context.to_string(),
                m.start_line,
                Severity::from_measurement(m.line_count() as f64, t.long_method_lines),
            )
        })
        .collect()
}

fn large_class(module: &ModuleInfo, class: &ClassInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    let count = class.method_count() as f64;
    if count > t.large_class_methods {
        vec![Finding::new(
            FindingKind::Code,
            "Large Class",
            format!("Class '{}' has {} methods", class.name, class.method_count()),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            Severity::from_measurement(count, t.large_class_methods),
        )]
    } else {
        vec![]
    }
}

/// Annotation names treated as "primitive" for the Primitive Obsession rule.
const PRIMITIVE_TYPE_NAMES: &[&str] = &["int", "str", "float", "bool"];

/// A function taking more than 3 parameters, most of which are bare
/// `int`/`str`/`float`/`bool`, instead of a wrapping value object.
fn primitive_obsession(
    module: &ModuleInfo,
    context: &str,
    methods: &[MethodInfo],
    t: &CodeSmellThresholds,
) -> Vec<Finding> {
    let mut findings = Vec::new();
    for m in methods {
        if m.parameter_count <= 3 {
            continue;
        }
        let primitive_count = m
            .parameter_annotations
            .iter()
            .filter(|a| a.as_deref().is_some_and(|name| PRIMITIVE_TYPE_NAMES.contains(&name)))
            .count();
        let ratio = primitive_count as f64 / m.parameter_count as f64;
        if primitive_count as f64 > t.primitive_obsession_count && ratio > 0.7 {
            findings.push(Finding::new(
                FindingKind::Code,
                "Primitive Obsession",
                format!(
                    "Function '{}' takes {primitive_count} primitive-typed parameters out of {} ({:.0}%)",
                    m.name, m.parameter_count, ratio * 100.0
                ),
                module.path.clone(),
                context.to_string(),
                m.start_line,
                Severity::from_measurement(primitive_count as f64, t.primitive_obsession_count),
            ));
        }
    }
    findings
}

fn long_parameter_list(
    module: &ModuleInfo,
    context: &str,
    methods: &[MethodInfo],
    t: &CodeSmellThresholds,
) -> Vec<Finding> {
    methods
        .iter()
        .filter(|m| m.name != "__init__")
        .filter_map(|m| {
            let adjusted =
                if m.has_var_args || m.has_kwargs { t.long_parameter_list + 2.0 } else { t.long_parameter_list };
            if m.parameter_count as f64 > adjusted {
                Some(Finding::new(
                    FindingKind::Code,
                    "Long Parameter List",
                    format!("Method '{}' takes {} parameters", m.name, m.parameter_count),
                    module.path.clone(),
                    context.to_string(),
                    m.start_line,
                    Severity::from_measurement(m.parameter_count as f64, adjusted),
                ))
            } else {
                None
            }
        })
        .collect()
}

fn data_clumps(
    module: &ModuleInfo,
    context: &str,
    methods: &[MethodInfo],
    t: &CodeSmellThresholds,
) -> Vec<Finding> {
    let mut groups: FxHashMap<Vec<String>, Vec<&MethodInfo>> = FxHashMap::default();
    for method in methods {
        if method.parameter_names.len() < 2 {
            continue;
        }
        let mut sorted = method.parameter_names.clone();
        sorted.sort();
        groups.entry(sorted).or_default().push(method);
    }

    let mut findings = Vec::new();
    for (params, group) in groups {
        if group.len() as f64 >= t.data_clumps_threshold {
            findings.push(Finding::new(
                FindingKind::Code,
                "Data Clumps",
                format!(
                    "Parameters {:?} repeat together across {} methods in '{context}'",
                    params, group.len()
                ),
                module.path.clone(),
                context.to_string(),
                group[0].start_line,
                Severity::from_measurement(group.len() as f64, t.data_clumps_threshold),
            ));
        }
    }
    findings
}

fn switch_statements(
    module: &ModuleInfo,
    context: &str,
    methods: &[MethodInfo],
    t: &CodeSmellThresholds,
) -> Vec<Finding> {
    methods
        .iter()
        .filter(|m| m.branch_count as f64 > t.complex_conditional)
        .map(|m| {
            Finding::new(
                FindingKind::Code,
                "Switch Statements",
                format!("Method '{}' has a {}-way conditional chain", m.name, m.branch_count),
                module.path.clone(),
                context.to_string(),
                m.start_line,
                Severity::from_measurement(m.branch_count as f64, t.complex_conditional),
            )
        })
        .collect()
}

fn temporary_field(module: &ModuleInfo, class: &ClassInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    if class.methods.len() < 2 {
        return vec![];
    }
    let mut findings = Vec::new();
    for field in &class.fields {
        let usage_count = class
            .methods
            .iter()
            .filter(|m| m.referenced_fields.iter().any(|f| f == field))
            .count();
        if usage_count > 0 && (usage_count as f64) < t.temporary_field_threshold {
            findings.push(Finding::new(
                FindingKind::Code,
                "Temporary Field",
                format!("Field '{field}' in class '{}' is only used by {usage_count} of {} methods", class.name, class.methods.len()),
                module.path.clone(),
                class.name.clone(),
                class.start_line,
                Severity::Low,
            ));
        }
    }
    findings
}

fn alternative_classes(module: &ModuleInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    for i in 0..module.classes.len() {
        for j in (i + 1)..module.classes.len() {
            let a = &module.classes[i];
            let b = &module.classes[j];
            let names_a: FxHashSet<&str> = a.methods.iter().map(|m| m.name.as_str()).collect();
            let names_b: FxHashSet<&str> = b.methods.iter().map(|m| m.name.as_str()).collect();
            let shared = names_a.intersection(&names_b).count();
            if shared as f64 >= t.alternative_classes_threshold {
                findings.push(Finding::new(
                    FindingKind::Code,
                    "Alternative Classes with Different Interfaces",
                    format!("Classes '{}' and '{}' share {shared} method names but aren't related", a.name, b.name),
                    module.path.clone(),
                    a.name.clone(),
                    a.start_line,
                    Severity::Low,
                ));
            }
        }
    }
    findings
}

fn divergent_change(module: &ModuleInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    for class in &module.classes {
        if (class.methods.len() as f64) < t.divergent_change_methods {
            continue;
        }
        let distinct_call_prefixes: FxHashSet<String> = class
            .methods
            .iter()
            .flat_map(|m| m.calls.iter())
            .filter(|c| !is_utility_call(c))
            .map(|c| c.chars().take(1).collect())
            .collect();
        if distinct_call_prefixes.len() as f64 >= t.divergent_change_prefixes {
            findings.push(Finding::new(
                FindingKind::Code,
                "Divergent Change",
                format!(
                    "Class '{}' changes for {} unrelated reasons ({} methods, {} distinct call families)",
                    class.name, distinct_call_prefixes.len(), class.methods.len(), distinct_call_prefixes.len()
                ),
                module.path.clone(),
                class.name.clone(),
                class.start_line,
                Severity::Medium,
            ));
        }
    }
    findings
}

fn shotgun_surgery(model: &ProjectModel, t: &CodeSmellThresholds) -> Vec<Finding> {
    let mut call_sites: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
    let mut call_counts: FxHashMap<String, u32> = FxHashMap::default();

    for module in &model.modules {
        for class in &module.classes {
            for method in &class.methods {
                for call in &method.calls {
                    if is_utility_call(call) {
                        continue;
                    }
                    call_sites.entry(call.clone()).or_default().insert(class.name.clone());
                    *call_counts.entry(call.clone()).or_insert(0) += 1;
                }
            }
        }
    }

    let mut findings = Vec::new();
    for (call_name, contexts) in call_sites {
        let total_calls = *call_counts.get(&call_name).unwrap_or(&0);
        if contexts.len() as f64 >= t.shotgun_surgery_contexts && total_calls as f64 >= t.shotgun_surgery_calls {
            if let Some(module) = model.modules.first() {
                findings.push(Finding::new(
                    FindingKind::Code,
                    "Shotgun Surgery",
                    format!(
                        "Method '{call_name}' is called from {} distinct classes ({} call sites); a change to it ripples widely",
                        contexts.len(), total_calls
                    ),
                    module.path.clone(),
                    contexts.iter().next().cloned().unwrap_or_default(),
                    0,
                    Severity::Medium,
                ));
            }
        }
    }
    findings
}

fn excessive_comments(module: &ModuleInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    let code_lines = module.loc.code_lines.max(1) as f64;
    let ratio = module.loc.comment_lines as f64 / code_lines;
    if ratio > t.excessive_comments_ratio && module.loc.large_comment_blocks as f64 > t.large_comment_blocks {
        vec![Finding::new(
            FindingKind::Code,
            "Excessive Comments",
            format!(
                "Module has {:.0}% comment lines relative to code, across {} large comment block(s)",
                ratio * 100.0,
                module.loc.large_comment_blocks
            ),
            module.path.clone(),
            module.dotted_name.clone(),
            1,
            Severity::Low,
        )]
    } else {
        vec![]
    }
}

/// Structural-shape fingerprint of a method, used to find duplicate code
/// without comparing raw source text: the sequence of statement-kind tags
/// plus call names, with identifiers dropped.
fn method_shape(method: &MethodInfo) -> String {
    format!(
        "branches={}|calls={}|params={}",
        method.branch_count,
        method.calls.len(),
        method.parameter_count
    )
}

fn duplicate_code(module: &ModuleInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    let mut shapes: FxHashMap<String, Vec<(&str, &MethodInfo)>> = FxHashMap::default();
    for class in &module.classes {
        for method in &class.methods {
            if method.line_count() as f64 >= t.duplicate_code_min_lines && !is_magic(method) {
                shapes
                    .entry(method_shape(method))
                    .or_default()
                    .push((class.name.as_str(), method));
            }
        }
    }

    let mut findings = Vec::new();
    for (_, occurrences) in shapes {
        if occurrences.len() as f64 >= t.duplicate_code_threshold {
            let (class_name, method) = occurrences[0];
            findings.push(Finding::new(
                FindingKind::Code,
                "Duplicate Code",
                format!(
                    "Method '{}' has the same structural shape as {} other method(s)",
                    method.name,
                    occurrences.len() - 1
                ),
                module.path.clone(),
                class_name.to_string(),
                method.start_line,
                Severity::Medium,
            ));
        }
    }
    findings
}

fn speculative_generality(module: &ModuleInfo, class: &ClassInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    let unused_hooks = class
        .methods
        .iter()
        .filter(|m| !is_magic(m) && m.calls.is_empty() && m.accessed_attrs.is_empty() && m.line_count() <= 2)
        .count();
    if unused_hooks as f64 >= t.speculative_generality_threshold {
        vec![Finding::new(
            FindingKind::Code,
            "Speculative Generality",
            format!("Class '{}' has {unused_hooks} trivial/unused extension points", class.name),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            Severity::Low,
        )]
    } else {
        vec![]
    }
}

fn feature_envy(module: &ModuleInfo, class: &ClassInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    for method in &class.methods {
        if is_magic(method) {
            continue;
        }
        let own_field_calls = method.referenced_fields.len();
        let external_calls = method
            .calls
            .iter()
            .filter(|c| !is_utility_call(c) && !method.referenced_fields.contains(c))
            .count();
        if external_calls as f64 >= t.feature_envy_calls && external_calls > own_field_calls {
            findings.push(Finding::new(
                FindingKind::Code,
                "Feature Envy",
                format!("Method '{}' makes {external_calls} external calls vs {own_field_calls} on its own fields", method.name),
                module.path.clone(),
                class.name.clone(),
                method.start_line,
                Severity::Medium,
            ));
        }
    }
    findings
}

fn inappropriate_intimacy(module: &ModuleInfo, class: &ClassInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    for other in &module.classes {
        if other.name == class.name {
            continue;
        }
        let shared_fields: usize = class
            .fields
            .iter()
            .filter(|f| other.fields.contains(f))
            .count();
        if shared_fields as f64 >= t.inappropriate_intimacy_shared {
            findings.push(Finding::new(
                FindingKind::Code,
                "Inappropriate Intimacy",
                format!("Classes '{}' and '{}' share {shared_fields} field names", class.name, other.name),
                module.path.clone(),
                class.name.clone(),
                class.start_line,
                Severity::Low,
            ));
        }
    }
    findings
}

fn message_chains(module: &ModuleInfo, class: &ClassInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    class
        .methods
        .iter()
        .filter(|m| m.max_chain_length as f64 > t.message_chain_length)
        .map(|m| {
            Finding::new(
                FindingKind::Code,
                "Message Chains",
                format!("Method '{}' has a chain of length {}", m.name, m.max_chain_length),
                module.path.clone(),
                class.name.clone(),
                m.start_line,
                Severity::from_measurement(m.max_chain_length as f64, t.message_chain_length),
            )
        })
        .collect()
}

fn middle_man(module: &ModuleInfo, class: &ClassInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    let real_methods: Vec<&MethodInfo> = class.methods.iter().filter(|m| !is_magic(m)).collect();
    if real_methods.len() < 2 {
        return vec![];
    }
    let delegating = real_methods
        .iter()
        .filter(|m| m.calls.len() == 1 && m.line_count() <= 3)
        .count();
    let ratio = delegating as f64 / real_methods.len() as f64;
    if ratio >= t.middle_man_ratio {
        vec![Finding::new(
            FindingKind::Code,
            "Middle Man",
            format!("Class '{}' delegates {:.0}% of its methods with no added logic", class.name, ratio * 100.0),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            Severity::Low,
        )]
    } else {
        vec![]
    }
}

fn data_class(module: &ModuleInfo, class: &ClassInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    if class.is_dataclass || class.kind == ClassKind::Data {
        return vec![];
    }
    if ["DTO", "Model", "Entity", "Record"].iter().any(|s| class.name.ends_with(s)) {
        return vec![];
    }
    let non_magic: Vec<&MethodInfo> = class.methods.iter().filter(|m| !is_magic(m)).collect();
    if non_magic.is_empty() {
        return vec![];
    }
    let all_trivial_accessors = non_magic.iter().all(|m| {
        (m.name.starts_with("get_") || m.name.starts_with("set_")) && m.line_count() <= 2
    });
    if all_trivial_accessors && (non_magic.len() as f64) <= t.data_class_methods {
        vec![Finding::new(
            FindingKind::Code,
            "Data Class",
            format!("Class '{}' only exposes getters/setters with no behavior", class.name),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            Severity::Low,
        )]
    } else {
        vec![]
    }
}

fn lazy_class(module: &ModuleInfo, class: &ClassInfo, t: &CodeSmellThresholds) -> Vec<Finding> {
    if class.is_dataclass {
        return vec![];
    }
    if ["Exception", "Error", "Mixin", "Interface", "Abstract", "Base"]
        .iter()
        .any(|s| class.name.ends_with(s))
    {
        return vec![];
    }
    let non_magic_count = class.methods.iter().filter(|m| !is_magic(m)).count();
    let total_lines = class.total_method_lines();
    if (non_magic_count as f64) <= t.lazy_class_methods && (total_lines as f64) <= t.lazy_class_lines {
        vec![Finding::new(
            FindingKind::Code,
            "Lazy Class",
            format!("Class '{}' has only {non_magic_count} non-trivial method(s) totalling {total_lines} lines", class.name),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            Severity::Low,
        )]
    } else {
        vec![]
    }
}

fn dead_code(module: &ModuleInfo, _t: &CodeSmellThresholds) -> Vec<Finding> {
    let defined: FxHashSet<&str> = module.free_functions.iter().map(|f| f.name.as_str()).collect();
    let mut referenced: FxHashSet<&str> = FxHashSet::default();
    for class in &module.classes {
        for method in &class.methods {
            for call in &method.calls {
                referenced.insert(call.as_str());
            }
        }
    }
    for func in &module.free_functions {
        for call in &func.calls {
            referenced.insert(call.as_str());
        }
    }

    let mut findings = Vec::new();
    for func in &module.free_functions {
        if defined.contains(func.name.as_str())
            && !referenced.contains(func.name.as_str())
            && !func.name.starts_with('_')
            && !func.is_decorated
        {
            findings.push(Finding::new(
                FindingKind::Code,
                "Dead Code",
                format!("Function '{}' is never referenced in this module", func.name),
                module.path.clone(),
                module.dotted_name.clone(),
                func.start_line,
                Severity::Low,
            ));
        }
    }
    findings
}

/// Two or more independent class hierarchies whose subclasses grow in
/// lockstep (same child count, same name-suffix families) tend to require
/// parallel edits; a heuristic proxy for the classic Parallel Inheritance smell.
fn parallel_inheritance(model: &ProjectModel) -> Vec<Finding> {
    let mut roots_by_child_count: FxHashMap<usize, Vec<u32>> = FxHashMap::default();
    for &node in model.inheritance_graph.node_by_class_id.keys() {
        let children = model.inheritance_graph.number_of_children(node);
        if children >= 2 {
            roots_by_child_count.entry(children).or_default().push(node);
        }
    }

    let mut findings = Vec::new();
    for (count, roots) in roots_by_child_count {
        if roots.len() >= 2 {
            if let Some(module) = model.modules.first() {
                findings.push(Finding::new(
                    FindingKind::Code,
                    "Parallel Inheritance Hierarchies",
                    format!("{} class hierarchies each have {count} subclasses and may be evolving in lockstep", roots.len()),
                    module.path.clone(),
                    module.dotted_name.clone(),
                    1,
                    Severity::Low,
                ));
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::python_parser;
    use std::path::Path;

    fn module_from(source: &str) -> ModuleInfo {
        python_parser::parse_file(Path::new("t.py"), "t", source).unwrap().info
    }

    #[test]
    fn long_method_triggers_above_threshold() {
        let mut thresholds = CodeSmellThresholds::default();
        thresholds.long_method_lines = 3.0;
        let source = "class C:\n    def m(self):\n        a = 1\n        b = 2\n        c = 3\n        return a\n";
        let module = module_from(source);
        let findings = long_method(&module, "C", &module.classes[0].methods, &thresholds);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].name, "Long Method");
    }

    #[test]
    fn long_method_does_not_trigger_below_threshold() {
        let thresholds = CodeSmellThresholds::default();
        let source = "class C:\n    def m(self):\n        return 1\n";
        let module = module_from(source);
        assert!(long_method(&module, "C", &module.classes[0].methods, &thresholds).is_empty());
    }

    #[test]
    fn long_parameter_list_counts_non_self_params() {
        let mut thresholds = CodeSmellThresholds::default();
        thresholds.long_parameter_list = 2.0;
        let source = "class C:\n    def m(self, a, b, c):\n        return a\n";
        let module = module_from(source);
        let findings = long_parameter_list(&module, "C", &module.classes[0].methods, &thresholds);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn long_parameter_list_skips_constructor() {
        let mut thresholds = CodeSmellThresholds::default();
        thresholds.long_parameter_list = 2.0;
        let source = "class C:\n    def __init__(self, a, b, c):\n        pass\n";
        let module = module_from(source);
        assert!(long_parameter_list(&module, "C", &module.classes[0].methods, &thresholds).is_empty());
    }

    #[test]
    fn long_parameter_list_raises_threshold_for_var_args() {
        let mut thresholds = CodeSmellThresholds::default();
        thresholds.long_parameter_list = 2.0;
        let source = "class C:\n    def m(self, a, b, c, *args):\n        pass\n";
        let module = module_from(source);
        assert!(long_parameter_list(&module, "C", &module.classes[0].methods, &thresholds).is_empty());
    }

    #[test]
    fn primitive_obsession_triggers_above_count_and_ratio() {
        let thresholds = CodeSmellThresholds::default();
        let source =
            "class C:\n    def m(self, a: int, b: str, c: float, d: bool, e: object):\n        pass\n";
        let module = module_from(source);
        let findings = primitive_obsession(&module, "C", &module.classes[0].methods, &thresholds);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].name, "Primitive Obsession");
    }

    #[test]
    fn primitive_obsession_skips_functions_with_four_or_fewer_params() {
        let thresholds = CodeSmellThresholds::default();
        let source = "class C:\n    def m(self, a: int, b: str, c: float):\n        pass\n";
        let module = module_from(source);
        assert!(primitive_obsession(&module, "C", &module.classes[0].methods, &thresholds).is_empty());
    }

    #[test]
    fn excessive_comments_requires_both_ratio_and_block_count() {
        let mut thresholds = CodeSmellThresholds::default();
        thresholds.excessive_comments_ratio = 0.1;
        thresholds.large_comment_blocks = 0.0;
        let source = "def f():\n    return 1\n# c1\n# c2\n# c3\n# c4\n# c5\n# c6\n";
        let module = module_from(source);
        let findings = excessive_comments(&module, &thresholds);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Low);
    }

    #[test]
    fn excessive_comments_skips_when_no_large_block_present() {
        let mut thresholds = CodeSmellThresholds::default();
        thresholds.excessive_comments_ratio = 0.1;
        thresholds.large_comment_blocks = 0.0;
        let source = "def f():\n    return 1\n# c1\n# c2\n";
        let module = module_from(source);
        assert!(excessive_comments(&module, &thresholds).is_empty());
    }

    #[test]
    fn data_class_skips_classes_with_real_behavior() {
        let thresholds = CodeSmellThresholds::default();
        let source = "class C:\n    def compute(self):\n        if self.x:\n            return self.y\n        return 0\n";
        let module = module_from(source);
        assert!(data_class(&module, &module.classes[0], &thresholds).is_empty());
    }

    #[test]
    fn lazy_class_triggers_for_near_empty_class() {
        let mut thresholds = CodeSmellThresholds::default();
        thresholds.lazy_class_methods = 1.0;
        thresholds.lazy_class_lines = 5.0;
        let source = "class C:\n    def m(self):\n        return 1\n";
        let module = module_from(source);
        assert_eq!(lazy_class(&module, &module.classes[0], &thresholds).len(), 1);
    }
}
