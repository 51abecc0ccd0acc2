//! The cross-file model every detector reads from: one entry per module, one
//! per class, one per method, plus the two project-wide graphs (module
//! dependencies and class inheritance).

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use std::path::PathBuf;

/// A coarse classification of what a class is *for*, used by several
/// structural/architectural rules to exclude or weight classes differently
/// (e.g. a `Data` class is exempt from Data Class / Lazy Class exclusions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Regular,
    Data,
    Exception,
    Abstract,
    Utility,
    Mixin,
    Test,
}

/// A coarse classification of a method's role, used by WMPC/RFC/MPC-style
/// weighting rules that count "real" methods differently from accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Magic,
    Property,
    Accessor,
    Regular,
}

/// Per-module line-count breakdown, shared by the LOC, File Length, and
/// Excessive Comments rules so each rule doesn't re-walk the source lines.
///
/// `comment_lines` and `large_comment_blocks` both exclude the file-leading
/// comment block (license/header), which is dropped entirely rather than
/// counted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocBreakdown {
    pub total_lines: u32,
    pub blank_lines: u32,
    pub comment_lines: u32,
    pub docstring_lines: u32,
    pub import_lines: u32,
    pub code_lines: u32,
    pub large_comment_blocks: u32,
}

/// A single method or free function, with enough AST-derived metadata for
/// every code-smell rule to operate without re-walking the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    pub name: String,
    pub kind: MethodKind,
    pub start_line: u32,
    pub end_line: u32,
    pub parameter_count: u32,
    pub parameter_names: Vec<String>,
    /// One entry per `parameter_names`, the annotation's simple name (e.g.
    /// `int`) when it resolves to one, else `None`.
    pub parameter_annotations: Vec<Option<String>>,
    pub has_var_args: bool,
    pub has_kwargs: bool,
    pub cyclomatic_complexity: u32,
    pub max_nesting_depth: u32,
    pub branch_count: u32,
    pub calls: Vec<String>,
    pub accessed_attrs: Vec<String>,
    pub is_decorated: bool,
    pub decorator_names: Vec<String>,
    pub is_static_or_class_method: bool,
    pub referenced_fields: Vec<String>,
    pub local_field_like_vars: Vec<String>,
    pub max_chain_length: u32,
}

impl MethodInfo {
    pub fn line_count(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// A single class, with its methods and structural metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub kind: ClassKind,
    pub start_line: u32,
    pub end_line: u32,
    pub base_names: Vec<String>,
    pub methods: Vec<MethodInfo>,
    pub fields: Vec<String>,
    pub is_dataclass: bool,
    pub decorator_names: Vec<String>,
    /// Index into the module-level `InheritanceGraph` once the project model
    /// has been fully assembled.
    pub graph_node: Option<NodeIndex>,
}

impl ClassInfo {
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    pub fn total_method_lines(&self) -> u32 {
        self.methods.iter().map(MethodInfo::line_count).sum()
    }
}

/// One parsed Python source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    pub id: u32,
    pub path: PathBuf,
    /// Dotted module path relative to the analyzed root, e.g. `pkg.sub.mod`.
    pub dotted_name: String,
    pub imports: Vec<String>,
    pub classes: Vec<ClassInfo>,
    pub free_functions: Vec<MethodInfo>,
    pub loc: LocBreakdown,
    /// Index into the project-level `DependencyGraph`.
    pub graph_node: Option<NodeIndex>,
}

/// Directed module-dependency graph: an edge `a -> b` means module `a`
/// imports module `b`. Only intra-project edges are stored; imports that
/// resolve to the standard library or third-party packages are dropped at
/// build time (they still count toward a module's fan-out tally separately).
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub graph: DiGraph<u32, ()>,
    pub node_by_module_id: FxHashMap<u32, NodeIndex>,
}

impl DependencyGraph {
    pub fn add_module(&mut self, module_id: u32) -> NodeIndex {
        *self
            .node_by_module_id
            .entry(module_id)
            .or_insert_with(|| self.graph.add_node(module_id))
    }

    pub fn add_dependency(&mut self, from: u32, to: u32) {
        let a = self.add_module(from);
        let b = self.add_module(to);
        if !self.graph.contains_edge(a, b) {
            self.graph.add_edge(a, b, ());
        }
    }

    pub fn fan_out(&self, module_id: u32) -> usize {
        self.node_by_module_id
            .get(&module_id)
            .map(|&n| self.graph.neighbors(n).count())
            .unwrap_or(0)
    }

    pub fn fan_in(&self, module_id: u32) -> usize {
        let Some(&n) = self.node_by_module_id.get(&module_id) else {
            return 0;
        };
        self.graph
            .neighbors_directed(n, petgraph::Direction::Incoming)
            .count()
    }
}

/// Directed class-inheritance graph: an edge `a -> b` means class `a`
/// (the subclass) inherits from class `b`. Keyed by a project-wide unique
/// class index, not by name, since two modules may define same-named classes.
#[derive(Debug, Clone, Default)]
pub struct InheritanceGraph {
    pub graph: DiGraph<u32, ()>,
    pub node_by_class_id: FxHashMap<u32, NodeIndex>,
}

impl InheritanceGraph {
    pub fn add_class(&mut self, class_id: u32) -> NodeIndex {
        *self
            .node_by_class_id
            .entry(class_id)
            .or_insert_with(|| self.graph.add_node(class_id))
    }

    pub fn add_inheritance(&mut self, subclass: u32, superclass: u32) {
        let a = self.add_class(subclass);
        let b = self.add_class(superclass);
        if !self.graph.contains_edge(a, b) {
            self.graph.add_edge(a, b, ());
        }
    }

    /// Depth of inheritance tree: longest path from `class_id` to a class
    /// with no recorded superclass in the project.
    pub fn depth_of_inheritance(&self, class_id: u32) -> u32 {
        let Some(&start) = self.node_by_class_id.get(&class_id) else {
            return 0;
        };
        let mut best = 0;
        let mut stack = vec![(start, 0u32)];
        let mut visited = std::collections::HashSet::new();
        while let Some((node, depth)) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            best = best.max(depth);
            for next in self.graph.neighbors(node) {
                stack.push((next, depth + 1));
            }
        }
        best
    }

    pub fn number_of_children(&self, class_id: u32) -> usize {
        let Some(&n) = self.node_by_class_id.get(&class_id) else {
            return 0;
        };
        self.graph
            .neighbors_directed(n, petgraph::Direction::Incoming)
            .count()
    }

    /// Same as [`Self::depth_of_inheritance`] but starting from a graph node
    /// directly, for callers that already hold a `ClassInfo::graph_node`.
    pub fn depth_from_node(&self, start: NodeIndex) -> u32 {
        let mut best = 0;
        let mut stack = vec![(start, 0u32)];
        let mut visited = std::collections::HashSet::new();
        while let Some((node, depth)) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            best = best.max(depth);
            for next in self.graph.neighbors(node) {
                stack.push((next, depth + 1));
            }
        }
        best
    }

    pub fn children_of_node(&self, node: NodeIndex) -> usize {
        self.graph
            .neighbors_directed(node, petgraph::Direction::Incoming)
            .count()
    }
}

/// The fully assembled, read-only model every detector runs against.
#[derive(Debug, Clone, Default)]
pub struct ProjectModel {
    pub modules: Vec<ModuleInfo>,
    pub dependency_graph: DependencyGraph,
    pub inheritance_graph: InheritanceGraph,
}

impl ProjectModel {
    pub fn total_classes(&self) -> usize {
        self.modules.iter().map(|m| m.classes.len()).sum()
    }

    pub fn module_by_id(&self, id: u32) -> Option<&ModuleInfo> {
        self.modules.iter().find(|m| m.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_graph_tracks_fan_in_and_out() {
        let mut g = DependencyGraph::default();
        g.add_dependency(1, 2);
        g.add_dependency(1, 3);
        g.add_dependency(2, 3);
        assert_eq!(g.fan_out(1), 2);
        assert_eq!(g.fan_in(3), 2);
        assert_eq!(g.fan_in(1), 0);
    }

    #[test]
    fn inheritance_graph_computes_depth_and_children() {
        let mut g = InheritanceGraph::default();
        g.add_inheritance(2, 1); // 2 extends 1
        g.add_inheritance(3, 2); // 3 extends 2
        assert_eq!(g.depth_of_inheritance(3), 2);
        assert_eq!(g.depth_of_inheritance(1), 0);
        assert_eq!(g.number_of_children(1), 1);
        assert_eq!(g.number_of_children(2), 1);
    }

    #[test]
    fn method_line_count_is_inclusive() {
        let m = MethodInfo {
            name: "f".into(),
            kind: MethodKind::Regular,
            start_line: 10,
            end_line: 12,
            parameter_count: 0,
            parameter_names: vec![],
            parameter_annotations: vec![],
            has_var_args: false,
            has_kwargs: false,
            cyclomatic_complexity: 1,
            max_nesting_depth: 0,
            branch_count: 0,
            calls: vec![],
            accessed_attrs: vec![],
            is_decorated: false,
            decorator_names: vec![],
            is_static_or_class_method: false,
            referenced_fields: vec![],
            local_field_like_vars: vec![],
            max_chain_length: 0,
        };
        assert_eq!(m.line_count(), 3);
    }
}
