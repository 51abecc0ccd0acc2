//! Architectural-smell rules (Hub-like Dependency, Scattered Functionality,
//! Redundant Abstractions, God Objects, Improper API Usage, Orphan Modules,
//! Cyclic Dependencies, Unstable Dependencies) over the project-wide module
//! dependency graph.

use petgraph::graph::NodeIndex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::config::ArchitecturalThresholds;
use crate::models::finding::{Finding, FindingKind, Severity};
use crate::models::project_model::{DependencyGraph, ModuleInfo, ProjectModel};
use crate::services::stdlib::is_stdlib_module;

pub fn detect(model: &ProjectModel, t: &ArchitecturalThresholds) -> Vec<Finding> {
    if model.modules.len() < t.min_project_size as usize {
        return vec![];
    }

    let mut findings = Vec::new();
    findings.extend(hub_like_dependency(model, t));
    findings.extend(scattered_functionality(model, t));
    findings.extend(redundant_abstractions(model, t));
    findings.extend(god_objects(model, t));
    findings.extend(improper_api_usage(model, t));
    findings.extend(orphan_modules(model, t));
    findings.extend(cyclic_dependencies(model, t));
    findings.extend(unstable_dependencies(model, t));
    findings
}

fn hub_like_dependency(model: &ProjectModel, t: &ArchitecturalThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    let total = model.modules.len().max(1);
    for module in &model.modules {
        let fan_in = model.dependency_graph.fan_in(module.id);
        let fan_out = model.dependency_graph.fan_out(module.id);
        let connections = fan_in + fan_out;
        let ratio = connections as f64 / total as f64;
        if connections as f64 >= t.min_hub_connections && ratio > t.hub_like_dependency_threshold {
            findings.push(Finding::new(
                FindingKind::Architectural,
                "Hub-like Dependency",
                format!(
                    "Module '{}' is a dependency hub with {connections} connections ({fan_in} in, {fan_out} out)",
                    module.dotted_name
                ),
                module.path.clone(),
                module.dotted_name.clone(),
                1,
                Severity::from_measurement(ratio, t.hub_like_dependency_threshold),
            ));
        }
    }
    findings
}

fn scattered_functionality(model: &ProjectModel, t: &ArchitecturalThresholds) -> Vec<Finding> {
    let mut by_concern: FxHashMap<&str, Vec<&ModuleInfo>> = FxHashMap::default();
    const CONCERNS: &[&str] = &["log", "valid", "auth", "cache", "serial", "config"];

    for module in &model.modules {
        let lower = module.dotted_name.to_lowercase();
        for concern in CONCERNS {
            if lower.contains(concern)
                || module.free_functions.iter().any(|f| f.name.to_lowercase().contains(concern))
            {
                by_concern.entry(concern).or_default().push(module);
            }
        }
    }

    let mut findings = Vec::new();
    for (concern, modules) in by_concern {
        if modules.len() as f64 >= t.min_scattered_occurrences {
            let mut sorted = modules.clone();
            sorted.sort_by(|a, b| a.dotted_name.cmp(&b.dotted_name));
            if let Some(first) = sorted.first() {
                let names: Vec<&str> = sorted.iter().map(|m| m.dotted_name.as_str()).collect();
                findings.push(Finding::new(
                    FindingKind::Architectural,
                    "Scattered Functionality",
                    format!("Concern '{concern}' is scattered across {} modules: {}", names.len(), names.join(", ")),
                    first.path.clone(),
                    first.dotted_name.clone(),
                    1,
                    Severity::from_measurement(modules.len() as f64, t.min_scattered_occurrences),
                ));
            }
        }
    }
    findings
}

fn redundant_abstractions(model: &ProjectModel, t: &ArchitecturalThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut classes: Vec<(&ModuleInfo, &crate::models::project_model::ClassInfo)> = Vec::new();
    for module in &model.modules {
        for class in &module.classes {
            classes.push((module, class));
        }
    }

    for i in 0..classes.len() {
        for j in (i + 1)..classes.len() {
            let (mod_a, a) = classes[i];
            let (mod_b, b) = classes[j];
            let names_a: FxHashSet<&str> = a.methods.iter().map(|m| m.name.as_str()).collect();
            let names_b: FxHashSet<&str> = b.methods.iter().map(|m| m.name.as_str()).collect();
            if names_a.is_empty() || names_b.is_empty() {
                continue;
            }
            let shared = names_a.intersection(&names_b).count();
            let union = names_a.union(&names_b).count();
            let similarity = shared as f64 / union.max(1) as f64;
            if similarity >= t.redundant_similarity_threshold {
                findings.push(Finding::new(
                    FindingKind::Architectural,
                    "Redundant Abstractions",
                    format!(
                        "Classes '{}' and '{}' share {:.0}% of their method signatures",
                        a.name, b.name, similarity * 100.0
                    ),
                    mod_a.path.clone(),
                    a.name.clone(),
                    a.start_line,
                    Severity::from_measurement(similarity, t.redundant_similarity_threshold),
                ));
                let _ = mod_b;
            }
        }
    }
    findings
}

fn god_objects(model: &ProjectModel, t: &ArchitecturalThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    for module in &model.modules {
        for class in &module.classes {
            let count = class.methods.len();
            if count as f64 >= t.min_god_object_functions {
                let fan_out = model.dependency_graph.fan_out(module.id);
                let severity = if count as f64 > t.god_object_functions && fan_out > 5 {
                    Severity::High
                } else if count as f64 > t.god_object_functions {
                    Severity::Medium
                } else {
                    Severity::Low
                };
                findings.push(Finding::new(
                    FindingKind::Architectural,
                    "God Object",
                    format!("Class '{}' has {count} methods and touches {fan_out} other modules", class.name),
                    module.path.clone(),
                    class.name.clone(),
                    class.start_line,
                    severity,
                ));
            }
        }
    }
    findings
}

fn improper_api_usage(model: &ProjectModel, t: &ArchitecturalThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    for module in &model.modules {
        let mut call_freq: FxHashMap<&str, u32> = FxHashMap::default();
        let mut total_calls = 0u32;
        for class in &module.classes {
            for method in &class.methods {
                for call in &method.calls {
                    if is_stdlib_module(call) {
                        continue;
                    }
                    *call_freq.entry(call.as_str()).or_insert(0) += 1;
                    total_calls += 1;
                }
            }
        }
        for func in &module.free_functions {
            for call in &func.calls {
                if is_stdlib_module(call) {
                    continue;
                }
                *call_freq.entry(call.as_str()).or_insert(0) += 1;
                total_calls += 1;
            }
        }

        if total_calls as f64 >= t.min_api_calls {
            if let Some((&api, &freq)) = call_freq.iter().max_by_key(|(_, &f)| f) {
                let ratio = freq as f64 / total_calls as f64;
                if ratio > t.api_repetition_threshold {
                    findings.push(Finding::new(
                        FindingKind::Architectural,
                        "Improper API Usage",
                        format!(
                            "Module '{}' calls '{api}' {freq} times out of {total_calls} external calls ({:.0}%)",
                            module.dotted_name, ratio * 100.0
                        ),
                        module.path.clone(),
                        module.dotted_name.clone(),
                        1,
                        Severity::from_measurement(ratio, t.api_repetition_threshold),
                    ));
                }
            }
        }
    }
    findings
}

fn orphan_modules(model: &ProjectModel, _t: &ArchitecturalThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    for module in &model.modules {
        if module.dotted_name.ends_with("__init__") || module.dotted_name.to_lowercase().contains("main") {
            continue;
        }
        let has_content = !module.classes.is_empty() || !module.free_functions.is_empty();
        if !has_content {
            continue;
        }
        let fan_in = model.dependency_graph.fan_in(module.id);
        let fan_out = model.dependency_graph.fan_out(module.id);
        if fan_in == 0 && fan_out == 0 {
            findings.push(Finding::new(
                FindingKind::Architectural,
                "Orphan Module",
                format!("Module '{}' has no incoming or outgoing project dependencies", module.dotted_name),
                module.path.clone(),
                module.dotted_name.clone(),
                1,
                Severity::Low,
            ));
        }
    }
    findings
}

fn unstable_dependencies(model: &ProjectModel, t: &ArchitecturalThresholds) -> Vec<Finding> {
    let mut findings = Vec::new();
    for module in &model.modules {
        let fan_in = model.dependency_graph.fan_in(module.id) as f64;
        let fan_out = model.dependency_graph.fan_out(module.id) as f64;
        if fan_in + fan_out < t.min_dependencies {
            continue;
        }
        let instability = fan_out / (fan_in + fan_out);
        if instability > t.unstable_dependency_threshold {
            findings.push(Finding::new(
                FindingKind::Architectural,
                "Unstable Dependency",
                format!(
                    "Module '{}' has instability {instability:.2} (fan-in {fan_in:.0}, fan-out {fan_out:.0})",
                    module.dotted_name
                ),
                module.path.clone(),
                module.dotted_name.clone(),
                1,
                Severity::from_measurement(instability, t.unstable_dependency_threshold),
            ));
        }
    }
    findings
}

/// Names excluded from Cyclic Dependency reporting (substring, case-insensitive).
const CYCLE_EXCLUDED_NAMES: &[&str] = &["__init__", "utils", "common", "base", "core"];

fn cycle_touches_excluded_name(model: &ProjectModel, cycle: &[u32]) -> bool {
    cycle.iter().any(|&id| {
        model.module_by_id(id).is_some_and(|m| {
            let lower = m.dotted_name.to_lowercase();
            CYCLE_EXCLUDED_NAMES.iter().any(|name| lower.contains(name))
        })
    })
}

/// Counts distinct simple paths from `from_id` to `to_id` in `graph`, bounded
/// to `max_len` nodes so the search terminates on dense graphs.
fn count_simple_paths(graph: &DependencyGraph, from_id: u32, to_id: u32, max_len: usize) -> usize {
    let (Some(&start), Some(&target)) =
        (graph.node_by_module_id.get(&from_id), graph.node_by_module_id.get(&to_id))
    else {
        return 0;
    };
    let mut visited = vec![start];
    count_paths_dfs(graph, start, target, &mut visited, max_len)
}

fn count_paths_dfs(
    graph: &DependencyGraph,
    current: NodeIndex,
    target: NodeIndex,
    visited: &mut Vec<NodeIndex>,
    max_len: usize,
) -> usize {
    if visited.len() > max_len {
        return 0;
    }
    let mut count = 0;
    for next in graph.graph.neighbors(current) {
        if next == target {
            count += 1;
            continue;
        }
        if visited.contains(&next) {
            continue;
        }
        visited.push(next);
        count += count_paths_dfs(graph, next, target, visited, max_len);
        visited.pop();
    }
    count
}

/// Sum over adjacent cycle pairs (wrapping) of the count of distinct simple
/// paths between them in the full dependency graph.
fn cycle_strength(graph: &DependencyGraph, cycle: &[u32], max_len: usize) -> usize {
    let n = cycle.len();
    (0..n)
        .map(|i| count_simple_paths(graph, cycle[i], cycle[(i + 1) % n], max_len))
        .sum()
}

fn cyclic_dependencies(model: &ProjectModel, t: &ArchitecturalThresholds) -> Vec<Finding> {
    let max_len = t.max_cycle_size as usize;
    let cycles: Vec<Vec<u32>> = simple_cycles(&model.dependency_graph, max_len)
        .into_iter()
        .filter(|c| c.len() >= t.min_cycle_size as usize)
        .filter(|c| !cycle_touches_excluded_name(model, c))
        .collect();

    let mut groups: FxHashMap<Vec<u32>, Vec<Vec<u32>>> = FxHashMap::default();
    for cycle in cycles {
        let mut node_set = cycle.clone();
        node_set.sort_unstable();
        node_set.dedup();
        groups.entry(node_set).or_default().push(cycle);
    }

    let mut group_keys: Vec<Vec<u32>> = groups.keys().cloned().collect();
    group_keys.sort();

    let mut findings = Vec::new();
    for key in group_keys {
        let variants = &groups[&key];
        let Some((best_cycle, strength)) = variants
            .iter()
            .map(|c| (c, cycle_strength(&model.dependency_graph, c, max_len)))
            .max_by_key(|(_, strength)| *strength)
        else {
            continue;
        };

        let names: Vec<String> = best_cycle
            .iter()
            .filter_map(|&id| model.module_by_id(id).map(|m| m.dotted_name.clone()))
            .collect();
        let Some(&first_id) = best_cycle.first() else { continue };
        let Some(first_module) = model.module_by_id(first_id) else { continue };

        let severity =
            if best_cycle.len() >= 3 && strength >= 3 { Severity::High } else { Severity::Medium };

        findings.push(Finding::new(
            FindingKind::Architectural,
            "Cyclic Dependency",
            format!("Modules form a dependency cycle: {}", names.join(" -> ")),
            first_module.path.clone(),
            first_module.dotted_name.clone(),
            1,
            severity,
        ));
    }
    findings
}

/// Enumerates simple cycles in `graph` up to `max_len` nodes via bounded DFS.
///
/// `petgraph` has no equivalent of networkx's `simple_cycles`; this explores
/// outgoing edges depth-first from every node, only continuing a path while
/// it stays below `max_len` and only closing a cycle back at the path's
/// smallest module id (by id, not graph index) so each cycle is reported once
/// regardless of which node the search started from.
fn simple_cycles(graph: &DependencyGraph, max_len: usize) -> Vec<Vec<u32>> {
    let mut cycles = Vec::new();
    let mut module_ids: Vec<u32> = graph.node_by_module_id.keys().copied().collect();
    module_ids.sort_unstable();

    for &start_id in &module_ids {
        let Some(&start_node) = graph.node_by_module_id.get(&start_id) else {
            continue;
        };
        let mut path = vec![start_node];
        let mut path_ids = vec![start_id];
        dfs_cycles(graph, start_node, start_id, &mut path, &mut path_ids, max_len, &mut cycles);
    }
    cycles
}

fn dfs_cycles(
    graph: &DependencyGraph,
    current: NodeIndex,
    start_id: u32,
    path: &mut Vec<NodeIndex>,
    path_ids: &mut Vec<u32>,
    max_len: usize,
    cycles: &mut Vec<Vec<u32>>,
) {
    if path.len() >= max_len {
        return;
    }
    for next in graph.graph.neighbors(current) {
        let next_id = graph.graph[next];
        if next_id == start_id {
            if path_ids.len() >= 2 {
                cycles.push(path_ids.clone());
            }
            continue;
        }
        // Only explore ids greater than start_id to dedupe rotations of the
        // same cycle (the smallest id in a cycle is always its start).
        if next_id <= start_id || path.contains(&next) {
            continue;
        }
        path.push(next);
        path_ids.push(next_id);
        dfs_cycles(graph, next, start_id, path, path_ids, max_len, cycles);
        path.pop();
        path_ids.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project_model::{DependencyGraph, LocBreakdown, ModuleInfo};
    use std::path::PathBuf;

    fn module(id: u32, dotted_name: &str) -> ModuleInfo {
        ModuleInfo {
            id,
            path: PathBuf::from(format!("{dotted_name}.py")),
            dotted_name: dotted_name.to_string(),
            imports: vec![],
            classes: vec![],
            free_functions: vec![],
            loc: LocBreakdown::default(),
            graph_node: None,
        }
    }

    fn model_with_cycle(names: &[&str]) -> ProjectModel {
        let mut model = ProjectModel::default();
        for (i, name) in names.iter().enumerate() {
            model.modules.push(module(i as u32 + 1, name));
        }
        for i in 0..names.len() {
            let from = i as u32 + 1;
            let to = ((i + 1) % names.len()) as u32 + 1;
            model.dependency_graph.add_dependency(from, to);
        }
        model
    }

    #[test]
    fn simple_cycles_finds_two_node_cycle() {
        let mut g = DependencyGraph::default();
        g.add_dependency(1, 2);
        g.add_dependency(2, 1);
        let cycles = simple_cycles(&g, 5);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0], vec![1, 2]);
    }

    #[test]
    fn simple_cycles_ignores_non_cyclic_graph() {
        let mut g = DependencyGraph::default();
        g.add_dependency(1, 2);
        g.add_dependency(2, 3);
        let cycles = simple_cycles(&g, 5);
        assert!(cycles.is_empty());
    }

    #[test]
    fn simple_cycles_respects_max_len() {
        let mut g = DependencyGraph::default();
        g.add_dependency(1, 2);
        g.add_dependency(2, 3);
        g.add_dependency(3, 1);
        assert!(simple_cycles(&g, 2).is_empty());
        assert_eq!(simple_cycles(&g, 3).len(), 1);
    }

    #[test]
    fn cycle_strength_counts_direct_edges_for_a_bare_cycle() {
        let model = model_with_cycle(&["a", "b", "c"]);
        let strength = cycle_strength(&model.dependency_graph, &[1, 2, 3], 5);
        assert_eq!(strength, 3);
    }

    #[test]
    fn cyclic_dependencies_drops_cycles_touching_excluded_names() {
        let model = model_with_cycle(&["pkg.utils", "pkg.b", "pkg.c"]);
        let t = ArchitecturalThresholds { min_cycle_size: 2.0, max_cycle_size: 5.0, ..Default::default() };
        assert!(cyclic_dependencies(&model, &t).is_empty());
    }

    #[test]
    fn cyclic_dependencies_reports_one_finding_per_node_set() {
        let model = model_with_cycle(&["a", "b", "c"]);
        let t = ArchitecturalThresholds { min_cycle_size: 3.0, max_cycle_size: 5.0, ..Default::default() };
        let findings = cyclic_dependencies(&model, &t);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }
}
