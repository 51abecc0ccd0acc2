//! Parses one Python source file into a [`ModuleInfo`], using `rustpython_parser`
//! for the AST and [`LineIndex`] to turn byte ranges into line numbers.

use rustc_hash::FxHashSet;
use rustpython_parser::ast::{self, Expr, Stmt, Suite};
use rustpython_parser::{parse, Mode};
use std::path::{Path, PathBuf};

use crate::models::error::AnalysisError;
use crate::models::project_model::{ClassInfo, ClassKind, LocBreakdown, MethodInfo, MethodKind, ModuleInfo};
use crate::services::line_index::LineIndex;

/// One module's raw import edges, before they're resolved against the rest of
/// the project (see `project_model_builder`).
pub struct ParsedModule {
    pub info: ModuleInfo,
    /// Dotted names this module imports, in source order, as written.
    pub raw_imports: Vec<String>,
}

pub fn parse_file(path: &Path, dotted_name: &str, source: &str) -> Result<ParsedModule, AnalysisError> {
    let ast_module = parse(source, Mode::Module, &path.to_string_lossy()).map_err(|e| {
        AnalysisError::parse(e.to_string(), path.to_path_buf(), None)
    })?;

    let body: Suite = match ast_module {
        ast::Mod::Module(m) => m.body,
        _ => Vec::new(),
    };

    let index = LineIndex::new(source);
    let mut imports = Vec::new();
    let mut classes = Vec::new();
    let mut free_functions = Vec::new();

    for stmt in &body {
        match stmt {
            Stmt::Import(import) => {
                for alias in &import.names {
                    imports.push(alias.name.to_string());
                }
            }
            Stmt::ImportFrom(import_from) => {
                if let Some(module) = &import_from.module {
                    imports.push(module.to_string());
                }
            }
            Stmt::ClassDef(class_def) => {
                classes.push(build_class_info(class_def, &index));
            }
            Stmt::FunctionDef(func_def) => {
                free_functions.push(build_method_info(func_def, &index));
            }
            _ => {}
        }
    }

    let loc = compute_loc_breakdown(source);

    Ok(ParsedModule {
        info: ModuleInfo {
            id: 0,
            path: path.to_path_buf(),
            dotted_name: dotted_name.to_string(),
            imports: imports.clone(),
            classes,
            free_functions,
            loc,
            graph_node: None,
        },
        raw_imports: imports,
    })
}

fn build_class_info(class_def: &ast::StmtClassDef, index: &LineIndex) -> ClassInfo {
    let base_names: Vec<String> = class_def
        .bases
        .iter()
        .map(resolve_base_name)
        .collect();

    let decorator_names: Vec<String> = class_def
        .decorator_list
        .iter()
        .filter_map(expr_simple_name)
        .collect();

    let is_dataclass = decorator_names.iter().any(|d| d == "dataclass");

    let mut methods = Vec::new();
    let mut fields = Vec::new();

    for stmt in &class_def.body {
        match stmt {
            Stmt::FunctionDef(func_def) => methods.push(build_method_info(func_def, index)),
            Stmt::Assign(assign) => {
                for target in &assign.targets {
                    if let Expr::Name(name) = target {
                        fields.push(name.id.to_string());
                    }
                }
            }
            Stmt::AnnAssign(ann) => {
                if let Expr::Name(name) = ann.target.as_ref() {
                    fields.push(name.id.to_string());
                }
            }
            _ => {}
        }
    }

    let kind = classify_class(&class_def.name, &base_names, is_dataclass);

    ClassInfo {
        name: class_def.name.to_string(),
        kind,
        start_line: index.line_at(u32::from(class_def.range.start())),
        end_line: index.line_at(u32::from(class_def.range.end())),
        base_names,
        methods,
        fields,
        is_dataclass,
        decorator_names,
        graph_node: None,
    }
}

fn classify_class(name: &str, bases: &[String], is_dataclass: bool) -> ClassKind {
    if is_dataclass {
        return ClassKind::Data;
    }
    if name.ends_with("Error") || name.ends_with("Exception") || bases.iter().any(|b| b.ends_with("Exception") || b.ends_with("Error")) {
        return ClassKind::Exception;
    }
    if name.contains("Abstract") || name.contains("Interface") || bases.iter().any(|b| b.contains("ABC")) {
        return ClassKind::Abstract;
    }
    if name.ends_with("Mixin") {
        return ClassKind::Mixin;
    }
    if name.to_lowercase().contains("test") {
        return ClassKind::Test;
    }
    if name.to_lowercase().contains("util") || name.to_lowercase().contains("helper") {
        return ClassKind::Utility;
    }
    ClassKind::Regular
}

fn build_method_info(func_def: &ast::StmtFunctionDef, index: &LineIndex) -> MethodInfo {
    let decorator_names: Vec<String> = func_def
        .decorator_list
        .iter()
        .filter_map(expr_simple_name)
        .collect();

    let is_static_or_class_method = decorator_names
        .iter()
        .any(|d| d == "staticmethod" || d == "classmethod");

    let is_property = decorator_names.iter().any(|d| d == "property");
    let is_magic = func_def.name.starts_with("__") && func_def.name.ends_with("__");

    let kind = if is_magic {
        MethodKind::Magic
    } else if is_property {
        MethodKind::Property
    } else if func_def.name.starts_with("get_") || func_def.name.starts_with("set_") || func_def.name.starts_with("is_") {
        MethodKind::Accessor
    } else {
        MethodKind::Regular
    };

    let args = &func_def.args;
    let raw_params: Vec<(String, Option<String>)> = args
        .posonlyargs
        .iter()
        .chain(args.args.iter())
        .chain(args.kwonlyargs.iter())
        .map(|a| {
            let annotation = a.def.annotation.as_deref().and_then(expr_simple_name);
            (a.def.arg.to_string(), annotation)
        })
        .filter(|(name, _)| name != "self" && name != "cls")
        .collect();
    let parameter_names: Vec<String> = raw_params.iter().map(|(name, _)| name.clone()).collect();
    let parameter_annotations: Vec<Option<String>> =
        raw_params.iter().map(|(_, ann)| ann.clone()).collect();
    let parameter_count = parameter_names.len() as u32;
    let has_var_args = args.vararg.is_some();
    let has_kwargs = args.kwarg.is_some();

    let mut calls = Vec::new();
    let mut accessed_attrs = Vec::new();
    let mut referenced_fields = Vec::new();
    let mut cyclomatic_complexity = 1u32;
    let mut branch_count = 0u32;
    let mut max_nesting_depth = 0u32;

    walk_stmts(&func_def.body, 0, &mut |stmt, depth| {
        max_nesting_depth = max_nesting_depth.max(depth);
        match stmt {
            Stmt::If(if_stmt) => {
                cyclomatic_complexity += 1;
                branch_count += 1;
                cyclomatic_complexity += if_stmt
                    .orelse
                    .iter()
                    .filter(|s| matches!(s, Stmt::If(_)))
                    .count() as u32;
            }
            Stmt::For(_) | Stmt::While(_) => {
                cyclomatic_complexity += 1;
                branch_count += 1;
            }
            Stmt::Try(try_stmt) => {
                cyclomatic_complexity += try_stmt.handlers.len() as u32;
                branch_count += try_stmt.handlers.len() as u32;
            }
            _ => {}
        }
    });

    let mut max_chain_length = 0u32;

    walk_exprs_in_stmts(&func_def.body, &mut |expr| {
        match expr {
            Expr::BoolOp(bool_op) => {
                cyclomatic_complexity += bool_op.values.len().saturating_sub(1) as u32;
            }
            Expr::Call(call) => {
                if let Expr::Attribute(attr) = call.func.as_ref() {
                    calls.push(attr.attr.to_string());
                    if is_self_attribute(attr) {
                        referenced_fields.push(attr.attr.to_string());
                    }
                } else if let Some(name) = expr_simple_name(&call.func) {
                    calls.push(name);
                }
                max_chain_length = max_chain_length.max(attribute_chain_depth(&call.func));
            }
            Expr::Attribute(attr) => {
                accessed_attrs.push(attr.attr.to_string());
                if is_self_attribute(attr) {
                    referenced_fields.push(attr.attr.to_string());
                }
                max_chain_length = max_chain_length.max(attribute_chain_depth(expr));
            }
            _ => {}
        }
    });

    let mut local_field_like_vars: FxHashSet<String> = FxHashSet::default();
    for stmt in &func_def.body {
        if let Stmt::Assign(assign) = stmt {
            for target in &assign.targets {
                if let Expr::Name(name) = target {
                    local_field_like_vars.insert(name.id.to_string());
                }
            }
        }
    }

    MethodInfo {
        name: func_def.name.to_string(),
        kind,
        start_line: index.line_at(u32::from(func_def.range.start())),
        end_line: index.line_at(u32::from(func_def.range.end())),
        parameter_count,
        parameter_names,
        parameter_annotations,
        has_var_args,
        has_kwargs,
        cyclomatic_complexity,
        max_nesting_depth,
        branch_count,
        calls,
        accessed_attrs,
        is_decorated: !decorator_names.is_empty(),
        decorator_names,
        is_static_or_class_method,
        referenced_fields,
        local_field_like_vars: local_field_like_vars.into_iter().collect(),
        max_chain_length,
    }
}

/// Length of an attribute/call chain, e.g. `a.b.c.d()` has depth 4. Used by
/// the Message Chains rule.
fn attribute_chain_depth(expr: &Expr) -> u32 {
    match expr {
        Expr::Attribute(attr) => 1 + attribute_chain_depth(&attr.value),
        Expr::Call(call) => attribute_chain_depth(&call.func),
        _ => 0,
    }
}

fn is_self_attribute(attr: &ast::ExprAttribute) -> bool {
    matches!(attr.value.as_ref(), Expr::Name(name) if name.id.as_str() == "self")
}

fn expr_simple_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Name(name) => Some(name.id.to_string()),
        Expr::Call(call) => expr_simple_name(&call.func),
        Expr::Attribute(attr) => Some(attr.attr.to_string()),
        _ => None,
    }
}

fn resolve_base_name(expr: &Expr) -> String {
    match expr {
        Expr::Name(name) => name.id.to_string(),
        Expr::Attribute(attr) => {
            let base = expr_simple_name(attr.value.as_ref()).unwrap_or_default();
            if base.is_empty() {
                attr.attr.to_string()
            } else {
                format!("{base}.{}", attr.attr)
            }
        }
        _ => "Unknown".to_string(),
    }
}

/// Walks every statement in `stmts` (recursively, tracking nesting depth) and
/// invokes `visit` for each. Nested function/class bodies are still walked
/// (matching the original's `ast.walk`), but their own complexity is counted
/// separately when `build_method_info` is called on them directly.
fn walk_stmts(stmts: &[Stmt], depth: u32, visit: &mut impl FnMut(&Stmt, u32)) {
    for stmt in stmts {
        visit(stmt, depth);
        let next_depth = depth + 1;
        match stmt {
            Stmt::If(s) => {
                walk_stmts(&s.body, next_depth, visit);
                walk_stmts(&s.orelse, next_depth, visit);
            }
            Stmt::For(s) => {
                walk_stmts(&s.body, next_depth, visit);
                walk_stmts(&s.orelse, next_depth, visit);
            }
            Stmt::While(s) => {
                walk_stmts(&s.body, next_depth, visit);
                walk_stmts(&s.orelse, next_depth, visit);
            }
            Stmt::Try(s) => {
                walk_stmts(&s.body, next_depth, visit);
                for handler in &s.handlers {
                    let ast::ExceptHandler::ExceptHandler(eh) = handler;
                    walk_stmts(&eh.body, next_depth, visit);
                }
                walk_stmts(&s.orelse, next_depth, visit);
                walk_stmts(&s.finalbody, next_depth, visit);
            }
            Stmt::With(s) => walk_stmts(&s.body, next_depth, visit),
            _ => {}
        }
    }
}

fn walk_exprs_in_stmts(stmts: &[Stmt], visit: &mut impl FnMut(&Expr)) {
    for stmt in stmts {
        walk_stmt_exprs(stmt, visit);
    }
}

fn walk_stmt_exprs(stmt: &Stmt, visit: &mut impl FnMut(&Expr)) {
    match stmt {
        Stmt::Expr(s) => walk_expr(&s.value, visit),
        Stmt::Assign(s) => {
            walk_expr(&s.value, visit);
            for t in &s.targets {
                walk_expr(t, visit);
            }
        }
        Stmt::AugAssign(s) => walk_expr(&s.value, visit),
        Stmt::AnnAssign(s) => {
            if let Some(v) = &s.value {
                walk_expr(v, visit);
            }
        }
        Stmt::Return(s) => {
            if let Some(v) = &s.value {
                walk_expr(v, visit);
            }
        }
        Stmt::If(s) => {
            walk_expr(&s.test, visit);
            walk_exprs_in_stmts(&s.body, visit);
            walk_exprs_in_stmts(&s.orelse, visit);
        }
        Stmt::For(s) => {
            walk_expr(&s.iter, visit);
            walk_exprs_in_stmts(&s.body, visit);
            walk_exprs_in_stmts(&s.orelse, visit);
        }
        Stmt::While(s) => {
            walk_expr(&s.test, visit);
            walk_exprs_in_stmts(&s.body, visit);
            walk_exprs_in_stmts(&s.orelse, visit);
        }
        Stmt::Try(s) => {
            walk_exprs_in_stmts(&s.body, visit);
            for handler in &s.handlers {
                let ast::ExceptHandler::ExceptHandler(eh) = handler;
                walk_exprs_in_stmts(&eh.body, visit);
            }
            walk_exprs_in_stmts(&s.orelse, visit);
            walk_exprs_in_stmts(&s.finalbody, visit);
        }
        Stmt::With(s) => {
            for item in &s.items {
                walk_expr(&item.context_expr, visit);
            }
            walk_exprs_in_stmts(&s.body, visit);
        }
        _ => {}
    }
}

fn walk_expr(expr: &Expr, visit: &mut impl FnMut(&Expr)) {
    visit(expr);
    match expr {
        Expr::Call(call) => {
            walk_expr(&call.func, visit);
            for arg in &call.args {
                walk_expr(arg, visit);
            }
        }
        Expr::Attribute(attr) => walk_expr(&attr.value, visit),
        Expr::BoolOp(b) => {
            for v in &b.values {
                walk_expr(v, visit);
            }
        }
        Expr::BinOp(b) => {
            walk_expr(&b.left, visit);
            walk_expr(&b.right, visit);
        }
        Expr::UnaryOp(u) => walk_expr(&u.operand, visit),
        Expr::Compare(c) => {
            walk_expr(&c.left, visit);
            for comparator in &c.comparators {
                walk_expr(comparator, visit);
            }
        }
        Expr::Subscript(s) => {
            walk_expr(&s.value, visit);
            walk_expr(&s.slice, visit);
        }
        _ => {}
    }
}

/// Closes out a run of contiguous `#`-comment lines: the file-leading block
/// (one starting at line 0) is dropped entirely, matching the original's
/// license/header skip; any other run of length > 5 counts as a "large
/// comment block" for the Excessive Comments rule.
fn flush_comment_run(breakdown: &mut LocBreakdown, run: u32, started_at_zero: bool) {
    if run == 0 || started_at_zero {
        return;
    }
    breakdown.comment_lines += run;
    if run > 5 {
        breakdown.large_comment_blocks += 1;
    }
}

fn compute_loc_breakdown(source: &str) -> LocBreakdown {
    let mut breakdown = LocBreakdown::default();
    let mut in_docstring = false;
    let mut comment_run = 0u32;
    let mut comment_run_started_at_zero = false;

    for (i, line) in source.lines().enumerate() {
        breakdown.total_lines += 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush_comment_run(&mut breakdown, comment_run, comment_run_started_at_zero);
            comment_run = 0;
            breakdown.blank_lines += 1;
            continue;
        }
        if trimmed.starts_with("\"\"\"") || trimmed.starts_with("'''") {
            flush_comment_run(&mut breakdown, comment_run, comment_run_started_at_zero);
            comment_run = 0;
            in_docstring = !in_docstring;
            breakdown.docstring_lines += 1;
            continue;
        }
        if in_docstring {
            breakdown.docstring_lines += 1;
            continue;
        }
        if trimmed.starts_with("import ") || trimmed.starts_with("from ") {
            flush_comment_run(&mut breakdown, comment_run, comment_run_started_at_zero);
            comment_run = 0;
            breakdown.import_lines += 1;
            continue;
        }
        if trimmed.starts_with('#') {
            if comment_run == 0 {
                comment_run_started_at_zero = i == 0;
            }
            comment_run += 1;
            continue;
        }
        flush_comment_run(&mut breakdown, comment_run, comment_run_started_at_zero);
        comment_run = 0;
        breakdown.code_lines += 1;
    }
    flush_comment_run(&mut breakdown, comment_run, comment_run_started_at_zero);

    breakdown
}

/// Converts a filesystem path relative to `root` into a dotted module name,
/// e.g. `pkg/sub/mod.py` -> `pkg.sub.mod`.
pub fn dotted_module_name(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(".")
}

#[allow(dead_code)]
pub(crate) fn path_buf(s: &str) -> PathBuf {
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_module_with_class_and_function() {
        let source = r#"
import os
from collections import defaultdict

class Foo:
    def __init__(self):
        self.x = 1

    def bar(self, a, b):
        if a:
            return self.x
        return b
"#;
        let parsed = parse_file(Path::new("foo.py"), "foo", source).unwrap();
        assert_eq!(parsed.info.classes.len(), 1);
        assert_eq!(parsed.info.classes[0].name, "Foo");
        assert_eq!(parsed.info.classes[0].methods.len(), 2);
        let bar = &parsed.info.classes[0].methods[1];
        assert_eq!(bar.name, "bar");
        assert_eq!(bar.parameter_count, 2);
        assert!(bar.cyclomatic_complexity >= 2);
        assert!(parsed.raw_imports.contains(&"os".to_string()));
        assert!(parsed.raw_imports.contains(&"collections".to_string()));
    }

    #[test]
    fn dataclass_decorator_marks_data_class() {
        let source = "@dataclass\nclass Point:\n    x: int\n    y: int\n";
        let parsed = parse_file(Path::new("pt.py"), "pt", source).unwrap();
        assert_eq!(parsed.info.classes[0].kind, ClassKind::Data);
    }

    #[test]
    fn syntax_error_becomes_parse_error() {
        let err = parse_file(Path::new("bad.py"), "bad", "def f(:\n").unwrap_err();
        assert_eq!(err.kind, crate::models::error::AnalysisErrorKind::Parse);
    }

    #[test]
    fn dotted_name_strips_extension_and_joins_components() {
        let root = Path::new("/proj");
        let path = Path::new("/proj/pkg/sub/mod.py");
        assert_eq!(dotted_module_name(path, root), "pkg.sub.mod");
    }

    #[test]
    fn leading_comment_block_is_dropped_from_breakdown() {
        let source = "# license header\n# line 2\n# line 3\ndef f():\n    return 1\n";
        let breakdown = compute_loc_breakdown(source);
        assert_eq!(breakdown.comment_lines, 0);
        assert_eq!(breakdown.large_comment_blocks, 0);
        assert_eq!(breakdown.code_lines, 2);
    }

    #[test]
    fn large_trailing_comment_block_is_counted() {
        let source = "def f():\n    return 1\n# c1\n# c2\n# c3\n# c4\n# c5\n# c6\n";
        let breakdown = compute_loc_breakdown(source);
        assert_eq!(breakdown.comment_lines, 6);
        assert_eq!(breakdown.large_comment_blocks, 1);
    }

    #[test]
    fn small_non_leading_comment_run_is_not_a_large_block() {
        let source = "def f():\n    return 1\n# c1\n# c2\ndef g():\n    return 2\n";
        let breakdown = compute_loc_breakdown(source);
        assert_eq!(breakdown.comment_lines, 2);
        assert_eq!(breakdown.large_comment_blocks, 0);
    }
}
