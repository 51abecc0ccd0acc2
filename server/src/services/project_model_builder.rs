//! Assembles the cross-file [`ProjectModel`] from a directory of Python files.
//!
//! Per the concurrency model, file parsing is parallelized with `rayon`; every
//! step after that (module-id assignment, graph construction) runs
//! single-threaded over the sorted parse results so the final model is
//! identical regardless of how many threads did the parsing.

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::path::Path;

use crate::models::error::{AnalysisError, BatchSummary};
use crate::models::project_model::ProjectModel;
use crate::services::file_walker::discover_python_files;
use crate::services::{encoding, python_parser, stdlib};

/// Parses every `.py` file under `root` and assembles the project model.
///
/// Per-file read/parse failures are collected into the returned
/// [`BatchSummary`] and the file is skipped; this function only fails outright
/// if something about the root itself is unusable (it currently never does,
/// matching the spec's "an empty or all-failing directory still produces an
/// empty report, not a crash" invariant).
pub fn build_project_model(root: &Path) -> (ProjectModel, BatchSummary) {
    let files = discover_python_files(root);

    let parse_results: Vec<Result<python_parser::ParsedModule, AnalysisError>> = files
        .par_iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .map_err(|e| AnalysisError::file_read(e.to_string(), path.clone()))?;
            let source = encoding::decode_source(&bytes);
            let dotted_name = python_parser::dotted_module_name(path, root);
            python_parser::parse_file(path, &dotted_name, &source)
        })
        .collect();

    // Re-pair with paths (sorted, since `files` was sorted) for deterministic
    // collision resolution: first-wins by sorted path.
    let mut summary = BatchSummary {
        files_attempted: files.len(),
        files_succeeded: 0,
        errors: Vec::new(),
    };

    let mut parsed_modules = Vec::new();
    for result in parse_results {
        match result {
            Ok(parsed) => {
                summary.files_succeeded += 1;
                parsed_modules.push(parsed);
            }
            Err(e) => summary.errors.push(e),
        }
    }

    let mut model = ProjectModel::default();
    let mut dotted_to_id: FxHashMap<String, u32> = FxHashMap::default();

    for (idx, parsed) in parsed_modules.iter_mut().enumerate() {
        let id = idx as u32;
        if dotted_to_id.contains_key(&parsed.info.dotted_name) {
            // Collision: a later (lexically larger) path loses its module
            // identity but is still kept as a distinct module entry so its
            // findings are still reported; only the dependency graph favors
            // the first-registered id for that dotted name.
            continue;
        }
        dotted_to_id.insert(parsed.info.dotted_name.clone(), id);
        parsed.info.id = id;
        model.dependency_graph.add_module(id);
    }

    // Resolve import edges against the dotted-name table; anything not found
    // there is either stdlib or third-party and is dropped from the graph.
    for parsed in &parsed_modules {
        if dotted_to_id.get(&parsed.info.dotted_name) != Some(&parsed.info.id) {
            continue;
        }
        for raw_import in &parsed.raw_imports {
            if stdlib::is_stdlib_module(raw_import) {
                continue;
            }
            if let Some(&target_id) = resolve_import(raw_import, &dotted_to_id) {
                model.dependency_graph.add_dependency(parsed.info.id, target_id);
            }
        }
    }

    // Assign project-wide unique class ids and build the inheritance graph.
    let mut class_id_by_qualified_name: FxHashMap<String, u32> = FxHashMap::default();
    let mut next_class_id = 0u32;
    for parsed in &parsed_modules {
        for class in &parsed.info.classes {
            let qualified = format!("{}.{}", parsed.info.dotted_name, class.name);
            class_id_by_qualified_name.insert(qualified, next_class_id);
            next_class_id += 1;
        }
    }

    for parsed in &mut parsed_modules {
        let dotted_name = parsed.info.dotted_name.clone();
        for class in &mut parsed.info.classes {
            let qualified = format!("{dotted_name}.{}", class.name);
            let Some(&subclass_id) = class_id_by_qualified_name.get(&qualified) else {
                continue;
            };
            let node = model.inheritance_graph.add_class(subclass_id);
            class.graph_node = Some(node);
            for base in &class.base_names {
                // Only intra-project bases resolve to a graph edge; a base
                // that isn't any known class name in the project (framework
                // classes, third-party bases) is left unresolved.
                if let Some(&superclass_id) = class_id_by_qualified_name
                    .iter()
                    .find(|(name, _)| name.ends_with(&format!(".{base}")) || *name == base)
                    .map(|(_, id)| id)
                {
                    model.inheritance_graph.add_inheritance(subclass_id, superclass_id);
                }
            }
        }
    }

    model.modules = parsed_modules.into_iter().map(|p| p.info).collect();

    (model, summary)
}

fn resolve_import<'a>(
    raw_import: &str,
    dotted_to_id: &'a FxHashMap<String, u32>,
) -> Option<&'a u32> {
    if let Some(id) = dotted_to_id.get(raw_import) {
        return Some(id);
    }
    // Fall back to the longest known module prefix, e.g. `pkg.sub` resolving
    // an import of `pkg.sub.thing` when `thing` isn't itself a module.
    dotted_to_id
        .iter()
        .filter(|(name, _)| raw_import.starts_with(name.as_str()))
        .max_by_key(|(name, _)| name.len())
        .map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn builds_model_with_intra_project_dependency_edge() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "import b\n").unwrap();
        fs::write(dir.path().join("b.py"), "x = 1\n").unwrap();

        let (model, summary) = build_project_model(dir.path());
        assert_eq!(summary.files_attempted, 2);
        assert_eq!(summary.files_succeeded, 2);
        assert_eq!(model.modules.len(), 2);

        let a = model.modules.iter().find(|m| m.dotted_name == "a").unwrap();
        assert_eq!(model.dependency_graph.fan_out(a.id), 1);
    }

    #[test]
    fn skips_unparseable_files_without_failing_the_batch() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("good.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("bad.py"), "def f(:\n").unwrap();

        let (model, summary) = build_project_model(dir.path());
        assert_eq!(summary.files_attempted, 2);
        assert_eq!(summary.files_succeeded, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(model.modules.len(), 1);
    }

    #[test]
    fn empty_directory_produces_empty_model() {
        let dir = tempdir().unwrap();
        let (model, summary) = build_project_model(dir.path());
        assert_eq!(summary.files_attempted, 0);
        assert!(model.modules.is_empty());
    }
}
