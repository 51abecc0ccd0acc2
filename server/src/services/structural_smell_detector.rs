//! Structural-smell rules (NOM, WMPC, SIZE2, WAC, LCOM, RFC, NOCC, DIT, LOC,
//! MPC, CBO, NOC, cyclomatic complexity, fan-out, fan-in, file length,
//! branches) over the assembled [`ProjectModel`].

use rustc_hash::FxHashSet;

use crate::models::config::StructuralThresholds;
use crate::models::finding::{Finding, FindingKind, Severity};
use crate::models::project_model::{ClassInfo, MethodInfo, ModuleInfo, ProjectModel};
use crate::services::stdlib::is_stdlib_module;

fn is_magic(method: &MethodInfo) -> bool {
    method.name.starts_with("__") && method.name.ends_with("__")
}

fn is_simple_accessor(method: &MethodInfo) -> bool {
    method.branch_count == 0
}

pub fn detect(model: &ProjectModel, t: &StructuralThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();

    for module in &model.modules {
        for class in &module.classes {
            findings.extend(nom(module, class, t));
            findings.extend(wmpc(module, class, t));
            findings.extend(size2(module, class, t));
            findings.extend(wac(module, class, t));
            findings.extend(lcom(module, class, t));
            findings.extend(rfc(module, class, t));
            findings.extend(mpc(module, class, t));
            findings.extend(cbo(module, class, t));
            findings.extend(cyclomatic_complexity(module, class, t));
            findings.extend(branches(module, class, t));
        }
        findings.extend(loc(module, t));
        findings.extend(file_length(module, t));
        findings.extend(fanout(module, model, t));
        findings.extend(fanin(module, model, t));
    }

    findings.extend(nocc(model, t));
    findings.extend(dit(model, t));
    findings.extend(noc(model, t));

    findings
}

fn nom(module: &ModuleInfo, class: &ClassInfo, t: &StructuralThresholds) -> Vec<Finding> {
    let count = class
        .methods
        .iter()
        .filter(|m| !is_magic(m) && !m.decorator_names.iter().any(|d| d == "property"))
        .count();
    if count as f64 > t.nom_threshold {
        vec![Finding::new(
            FindingKind::Structural,
            "High Number of Methods (NOM)",
            format!("Class '{}' has {count} methods (excluding special methods and properties)", class.name),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            Severity::from_measurement(count as f64, t.nom_threshold),
        )]
    } else {
        vec![]
    }
}

fn wmpc(module: &ModuleInfo, class: &ClassInfo, t: &StructuralThresholds) -> Vec<Finding> {
    let complex_methods: Vec<&MethodInfo> = class
        .methods
        .iter()
        .filter(|m| !is_magic(m) && !is_simple_accessor(m))
        .collect();
    let wmpc1: u32 = complex_methods.iter().map(|m| m.cyclomatic_complexity).sum();
    let wmpc2: u32 = complex_methods.iter().map(|m| m.parameter_count).sum();

    if wmpc1 as f64 > t.wmpc1_threshold || wmpc2 as f64 > t.wmpc2_threshold {
        let severity = if wmpc1 as f64 > t.wmpc1_threshold * 1.5 || wmpc2 as f64 > t.wmpc2_threshold * 1.5 {
            Severity::High
        } else {
            Severity::Medium
        };
        vec![Finding::new(
            FindingKind::Structural,
            "High Weighted Methods per Class (WMPC)",
            format!("Class '{}' has complex methods (WMPC1: {wmpc1}, WMPC2: {wmpc2})", class.name),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            severity,
        )]
    } else {
        vec![]
    }
}

fn size2(module: &ModuleInfo, class: &ClassInfo, t: &StructuralThresholds) -> Vec<Finding> {
    let significant_methods = class
        .methods
        .iter()
        .filter(|m| !m.name.starts_with('_') || class.methods.iter().any(|o| o.calls.contains(&m.name)))
        .count();
    let significant_fields = class
        .fields
        .iter()
        .filter(|f| !f.starts_with('_') || class.methods.iter().any(|m| m.accessed_attrs.contains(f)))
        .count();
    let size2 = significant_methods + significant_fields;
    if size2 as f64 > t.size2_threshold {
        vec![Finding::new(
            FindingKind::Structural,
            "Large Class (SIZE2)",
            format!(
                "Class '{}' has {size2} significant members (methods: {significant_methods}, fields: {significant_fields})",
                class.name
            ),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            Severity::from_measurement(size2 as f64, t.size2_threshold),
        )]
    } else {
        vec![]
    }
}

fn wac(module: &ModuleInfo, class: &ClassInfo, t: &StructuralThresholds) -> Vec<Finding> {
    let significant_fields: Vec<&String> = class
        .fields
        .iter()
        .filter(|f| !f.chars().all(|c| c.is_uppercase() || c == '_'))
        .filter(|f| {
            let usage = class.methods.iter().filter(|m| m.referenced_fields.contains(f)).count();
            !f.starts_with('_') || usage > 1
        })
        .collect();
    let wac = significant_fields.len();
    if wac as f64 > t.wac_threshold {
        vec![Finding::new(
            FindingKind::Structural,
            "High Weight of a Class (WAC)",
            format!("Class '{}' has {wac} significant attributes", class.name),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            Severity::from_measurement(wac as f64, t.wac_threshold),
        )]
    } else {
        vec![]
    }
}

fn lcom(module: &ModuleInfo, class: &ClassInfo, t: &StructuralThresholds) -> Vec<Finding> {
    let regular_methods: Vec<&MethodInfo> = class
        .methods
        .iter()
        .filter(|m| !is_magic(m) && !m.decorator_names.iter().any(|d| d == "property"))
        .collect();
    if regular_methods.len() < 2 {
        return vec![];
    }

    let mut non_cohesive = 0u32;
    let mut cohesive = 0u32;
    for i in 0..regular_methods.len() {
        for j in (i + 1)..regular_methods.len() {
            let a = regular_methods[i];
            let b = regular_methods[j];
            if a.name.starts_with('_') && b.name.starts_with('_') {
                continue;
            }
            let a_fields: FxHashSet<&String> = a.referenced_fields.iter().collect();
            let shares = b.referenced_fields.iter().any(|f| a_fields.contains(f));
            if shares {
                cohesive += 1;
            } else {
                non_cohesive += 1;
            }
        }
    }
    if non_cohesive == 0 && cohesive == 0 {
        return vec![];
    }
    let lcom = non_cohesive.saturating_sub(cohesive);
    if lcom as f64 > t.lcom_threshold {
        vec![Finding::new(
            FindingKind::Structural,
            "High Lack of Cohesion of Methods (LCOM)",
            format!("Class '{}' has LCOM of {lcom} (non-cohesive: {non_cohesive}, cohesive: {cohesive})", class.name),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            Severity::from_measurement(lcom as f64, t.lcom_threshold),
        )]
    } else {
        vec![]
    }
}

fn rfc(module: &ModuleInfo, class: &ClassInfo, t: &StructuralThresholds) -> Vec<Finding> {
    let significant_methods = class
        .methods
        .iter()
        .filter(|m| !is_magic(m) && (!is_simple_accessor(m) || !m.name.starts_with('_')))
        .count();

    let own_names: FxHashSet<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
    let external_calls: FxHashSet<&str> = class
        .methods
        .iter()
        .flat_map(|m| m.calls.iter())
        .map(|s| s.as_str())
        .filter(|c| !is_stdlib_module(c) && !own_names.contains(c))
        .collect();

    let rfc_value = significant_methods + external_calls.len();
    if rfc_value as f64 > t.rfc_threshold {
        vec![Finding::new(
            FindingKind::Structural,
            "High Response for a Class (RFC)",
            format!(
                "Class '{}' has RFC of {rfc_value} (methods: {significant_methods}, external calls: {})",
                class.name, external_calls.len()
            ),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            Severity::from_measurement(rfc_value as f64, t.rfc_threshold),
        )]
    } else {
        vec![]
    }
}

fn mpc(module: &ModuleInfo, class: &ClassInfo, t: &StructuralThresholds) -> Vec<Finding> {
    let own_names: FxHashSet<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
    let mut external_freq: std::collections::HashMap<&str, u32> = std::collections::HashMap::new();
    let mut internal: FxHashSet<&str> = FxHashSet::default();

    for method in &class.methods {
        for call in &method.calls {
            if is_stdlib_module(call) {
                continue;
            }
            if own_names.contains(call.as_str()) {
                internal.insert(call.as_str());
            } else {
                *external_freq.entry(call.as_str()).or_insert(0) += 1;
            }
        }
    }

    let external_mpc: u32 = external_freq.values().sum();
    let internal_mpc = internal.len() as u32;
    let weighted = external_mpc as f64 * 1.5 + internal_mpc as f64;

    if weighted > t.mpc_threshold {
        vec![Finding::new(
            FindingKind::Structural,
            "High Message Passing Coupling (MPC)",
            format!(
                "Class '{}' has weighted MPC of {weighted:.1} (external calls: {external_mpc}, internal: {internal_mpc})",
                class.name
            ),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            Severity::from_measurement(weighted, t.mpc_threshold),
        )]
    } else {
        vec![]
    }
}

fn cbo(module: &ModuleInfo, class: &ClassInfo, t: &StructuralThresholds) -> Vec<Finding> {
    let mut direct: FxHashSet<&str> = FxHashSet::default();
    let mut indirect: FxHashSet<&str> = FxHashSet::default();

    for method in &class.methods {
        for call in &method.calls {
            if !is_stdlib_module(call) && !call.to_lowercase().contains("util") && !call.to_lowercase().contains("helper") {
                direct.insert(call.as_str());
            }
        }
        for attr in &method.accessed_attrs {
            if !is_stdlib_module(attr) {
                indirect.insert(attr.as_str());
            }
        }
    }
    for base in &class.base_names {
        if !is_stdlib_module(base) {
            direct.insert(base.as_str());
        }
    }

    let weighted = direct.len() as f64 * 1.5 + indirect.len() as f64 * 0.5;
    if weighted > t.cbo_threshold {
        let severity = if weighted > t.cbo_threshold * 2.0 {
            Severity::High
        } else if weighted > t.cbo_threshold * 1.5 {
            Severity::Medium
        } else {
            Severity::Low
        };
        vec![Finding::new(
            FindingKind::Structural,
            "High Coupling Between Object Classes (CBO)",
            format!(
                "Class '{}' has weighted CBO of {weighted:.1} (direct: {}, indirect: {})",
                class.name, direct.len(), indirect.len()
            ),
            module.path.clone(),
            class.name.clone(),
            class.start_line,
            severity,
        )]
    } else {
        vec![]
    }
}

fn cyclomatic_complexity(module: &ModuleInfo, class: &ClassInfo, t: &StructuralThresholds) -> Vec<Finding> {
    class
        .methods
        .iter()
        .filter(|m| !is_magic(m) && m.cyclomatic_complexity as f64 > t.cyclomatic_complexity_threshold)
        .map(|m| {
            Finding::new(
                FindingKind::Structural,
                "High Cyclomatic Complexity",
                format!("Method '{}' has cyclomatic complexity of {}", m.name, m.cyclomatic_complexity),
                module.path.clone(),
                class.name.clone(),
                m.start_line,
                Severity::from_measurement(m.cyclomatic_complexity as f64, t.cyclomatic_complexity_threshold),
            )
        })
        .collect()
}

fn branches(module: &ModuleInfo, class: &ClassInfo, t: &StructuralThresholds) -> Vec<Finding> {
    class
        .methods
        .iter()
        .filter(|m| {
            !m.decorator_names.iter().any(|d| d == "property")
                && !m.name.starts_with("get_")
                && !m.name.starts_with("set_")
                && !m.name.starts_with("is_")
        })
        .filter(|m| m.branch_count as f64 > t.max_branches || m.max_nesting_depth > 3)
        .map(|m| {
            Finding::new(
                FindingKind::Structural,
                "Too Many Branches",
                format!(
                    "Method '{}' has {} branches with max nesting of {}",
                    m.name, m.branch_count, m.max_nesting_depth
                ),
                module.path.clone(),
                class.name.clone(),
                m.start_line,
                Severity::from_measurement(m.branch_count as f64, t.max_branches),
            )
        })
        .collect()
}

fn loc(module: &ModuleInfo, t: &StructuralThresholds) -> Vec<Finding> {
    let effective = module.loc.code_lines as f64;
    let non_blank = (module.loc.total_lines - module.loc.blank_lines).max(1) as f64;
    let complexity_ratio = effective / non_blank;

    let mut threshold = t.loc_threshold;
    if module.dotted_name.to_lowercase().contains("test") {
        threshold *= 1.5;
    }
    if complexity_ratio < 0.5 {
        threshold *= 1.3;
    }

    if effective > threshold {
        vec![Finding::new(
            FindingKind::Structural,
            "High Lines of Code (LOC)",
            format!(
                "Module '{}' has {} effective code lines (total {}, doc {}, import {}, blank {})",
                module.dotted_name, module.loc.code_lines, module.loc.total_lines,
                module.loc.docstring_lines, module.loc.import_lines, module.loc.blank_lines
            ),
            module.path.clone(),
            module.dotted_name.clone(),
            1,
            Severity::from_measurement(effective, threshold),
        )]
    } else {
        vec![]
    }
}

fn file_length(module: &ModuleInfo, t: &StructuralThresholds) -> Vec<Finding> {
    let meaningful = module.loc.code_lines + module.loc.import_lines;
    if meaningful as f64 > t.max_file_length {
        vec![Finding::new(
            FindingKind::Structural,
            "Long File",
            format!("File '{}' has {meaningful} meaningful lines of code", module.dotted_name),
            module.path.clone(),
            module.dotted_name.clone(),
            1,
            Severity::from_measurement(meaningful as f64, t.max_file_length),
        )]
    } else {
        vec![]
    }
}

fn fanout(module: &ModuleInfo, model: &ProjectModel, t: &StructuralThresholds) -> Vec<Finding> {
    if module.dotted_name.to_lowercase().contains("test") {
        return vec![];
    }
    let value = model.dependency_graph.fan_out(module.id);
    if value as f64 > t.max_fanout {
        vec![Finding::new(
            FindingKind::Structural,
            "High Fan-out",
            format!("Module '{}' has {value} significant outgoing dependencies", module.dotted_name),
            module.path.clone(),
            module.dotted_name.clone(),
            1,
            Severity::from_measurement(value as f64, t.max_fanout),
        )]
    } else {
        vec![]
    }
}

fn fanin(module: &ModuleInfo, model: &ProjectModel, t: &StructuralThresholds) -> Vec<Finding> {
    let lower = module.dotted_name.to_lowercase();
    if ["util", "base", "common", "interface"].iter().any(|p| lower.contains(p)) {
        return vec![];
    }
    let value = model.dependency_graph.fan_in(module.id);
    if value as f64 > t.max_fanin {
        vec![Finding::new(
            FindingKind::Structural,
            "High Fan-in",
            format!("Module '{}' has {value} incoming dependencies", module.dotted_name),
            module.path.clone(),
            module.dotted_name.clone(),
            1,
            Severity::from_measurement(value as f64, t.max_fanin),
        )]
    } else {
        vec![]
    }
}

fn nocc(model: &ProjectModel, t: &StructuralThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    for module in &model.modules {
        let significant: Vec<&ClassInfo> = module
            .classes
            .iter()
            .filter(|c| !c.name.to_lowercase().contains("test"))
            .filter(|c| !c.base_names.iter().any(|b| b.ends_with("Exception")))
            .collect();
        if significant.is_empty() {
            continue;
        }
        let avg_weight: f64 = significant
            .iter()
            .map(|c| (c.method_count() + c.fields.len() + c.methods.iter().map(|m| m.cyclomatic_complexity as usize).sum::<usize>()) as f64 / 3.0)
            .sum::<f64>()
            / significant.len() as f64;

        let mut adjusted = t.nocc_threshold;
        if avg_weight < 5.0 {
            adjusted *= 1.5;
        } else if avg_weight > 15.0 {
            adjusted *= 0.7;
        }

        if significant.len() as f64 > adjusted {
            findings.push(Finding::new(
                FindingKind::Structural,
                "High Number of Classes (NOCC)",
                format!("Module '{}' has {} significant classes (avg complexity: {avg_weight:.1})", module.dotted_name, significant.len()),
                module.path.clone(),
                module.dotted_name.clone(),
                1,
                Severity::from_measurement(significant.len() as f64, adjusted),
            ));
        }
    }
    findings
}

fn dit(model: &ProjectModel, t: &StructuralThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    for module in &model.modules {
        for class in &module.classes {
            let depth = match class.graph_node {
                Some(node) => model.inheritance_graph.depth_from_node(node),
                None => 0,
            };
            if depth == 0 {
                let has_any_member = !class.methods.is_empty() || !class.fields.is_empty();
                if has_any_member && class.base_names.is_empty() && class.methods.len() <= 1 {
                    findings.push(Finding::new(
                        FindingKind::Structural,
                        "Isolated Class",
                        format!("Class '{}' has no inheritance relationships and minimal behavior", class.name),
                        module.path.clone(),
                        class.name.clone(),
                        class.start_line,
                        Severity::Low,
                    ));
                }
                continue;
            }
            if depth as f64 > t.dit_threshold {
                findings.push(Finding::new(
                    FindingKind::Structural,
                    "Deep Inheritance Tree (DIT)",
                    format!("Class '{}' has DIT of {depth}", class.name),
                    module.path.clone(),
                    class.name.clone(),
                    class.start_line,
                    Severity::from_measurement(depth as f64, t.dit_threshold),
                ));
            }
        }
    }
    findings
}

fn noc(model: &ProjectModel, t: &StructuralThresholds) -> Vec<Finding> {
    let mut regular = 0usize;
    let mut abstract_count = 0usize;
    let mut utility = 0usize;
    let mut test_count = 0usize;

    for module in &model.modules {
        for class in &module.classes {
            let lower = class.name.to_lowercase();
            if lower.contains("test") || lower.contains("mock") {
                test_count += 1;
            } else if lower.contains("util") || lower.contains("helper") || lower.contains("base") {
                utility += 1;
            } else if class.name.contains("Abstract") || class.name.contains("Interface") {
                abstract_count += 1;
            } else {
                regular += 1;
            }
        }
    }

    let weighted = regular as f64 + abstract_count as f64 * 0.5 + utility as f64 * 0.3;
    let total_loc: u32 = model
        .modules
        .iter()
        .filter(|m| !m.dotted_name.to_lowercase().contains("test"))
        .map(|m| m.loc.total_lines)
        .sum();

    let mut adjusted = t.noc_threshold;
    if total_loc > 10_000 {
        adjusted *= 1.5;
    } else if total_loc > 5_000 {
        adjusted *= 1.2;
    }

    if weighted > adjusted {
        if let Some(module) = model.modules.first() {
            return vec![Finding::new(
                FindingKind::Structural,
                "High Number of Classes (NOC)",
                format!(
                    "Project has {weighted:.1} weighted classes (regular {regular}, abstract {abstract_count}, utility {utility}, test {test_count})"
                ),
                module.path.clone(),
                "Project".to_string(),
                1,
                Severity::from_measurement(weighted, adjusted),
            )];
        }
    }
    vec![]
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
    fn nom_triggers_above_threshold() {
        let mut t = StructuralThresholds::default();
        t.nom_threshold = 1.0;
        let source = "class C:\n    def a(self):\n        return 1\n    def b(self):\n        return 2\n";
        let module = module_from(source);
        assert_eq!(nom(&module, &module.classes[0], &t).len(), 1);
    }

    #[test]
    fn cyclomatic_complexity_triggers_above_threshold() {
        let mut t = StructuralThresholds::default();
        t.cyclomatic_complexity_threshold = 1.0;
        let source = "class C:\n    def m(self, a):\n        if a:\n            return 1\n        return 0\n";
        let module = module_from(source);
        assert_eq!(cyclomatic_complexity(&module, &module.classes[0], &t).len(), 1);
    }

    #[test]
    fn file_length_respects_threshold() {
        let t = StructuralThresholds::default();
        let module = module_from("x = 1\n");
        assert!(file_length(&module, &t).is_empty());
    }
}
