//! Module dependency graph.
//!
//! Nodes are modules; edges are import/export/re-export relations, each
//! tagged with whether the target is needed as a runtime value or only for
//! static checking. The graph answers the two questions the rewriter cares
//! about: which modules a file must force-load, and what the named export
//! surface of a module is once `export *` chains are expanded.

use crate::symbols::SymbolId;
use clz_common::diagnostics::{DiagnosticBag, DiagnosticCode};
use clz_common::span::Position;
use clz_common::{Atom, Interner};
use rustc_hash::{FxHashMap, FxHashSet};

/// Unique identifier for a module in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

impl ModuleId {
    pub const NONE: ModuleId = ModuleId(u32::MAX);

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// How an import/export edge uses its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// The target must be loaded at runtime.
    ValueNeeded,
    /// Needed solely for static checking; never forces a load by itself.
    TypeOnly,
}

/// A dependency edge in the module graph.
#[derive(Debug, Clone)]
pub struct DependencyEdge {
    pub from: ModuleId,
    pub to: ModuleId,
    pub kind: EdgeKind,
}

/// One name on a module's export surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportEntry {
    pub exported: Atom,
    pub symbol: SymbolId,
    pub type_only: bool,
}

/// Information about a module in the dependency graph.
#[derive(Debug)]
pub struct ModuleInfo {
    pub id: ModuleId,
    /// Source path as the frontend resolved it.
    pub path: String,
    /// Downstream namespace this module rewrites into.
    pub namespace: String,
    /// Locally declared exports, in declaration order.
    pub exports: Vec<ExportEntry>,
    /// Targets of `export * from X`, in declaration order.
    pub star_exports: Vec<ModuleId>,
}

impl ModuleInfo {
    fn new(id: ModuleId, path: &str, namespace: &str) -> Self {
        ModuleInfo {
            id,
            path: path.to_string(),
            namespace: namespace.to_string(),
            exports: Vec::new(),
            star_exports: Vec::new(),
        }
    }

    /// Whether every export of this module is type-only.
    pub fn is_types_only(&self) -> bool {
        !self.exports.is_empty() && self.exports.iter().all(|e| e.type_only)
    }
}

/// Whole-program module graph.
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: Vec<ModuleInfo>,
    path_to_id: FxHashMap<String, ModuleId>,
    edges: Vec<DependencyEdge>,
}

impl ModuleGraph {
    pub fn new() -> Self {
        ModuleGraph::default()
    }

    /// Add or get a module by path.
    pub fn add_module(&mut self, path: &str, namespace: &str) -> ModuleId {
        if let Some(&id) = self.path_to_id.get(path) {
            return id;
        }
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(ModuleInfo::new(id, path, namespace));
        self.path_to_id.insert(path.to_string(), id);
        id
    }

    pub fn get_module(&self, id: ModuleId) -> Option<&ModuleInfo> {
        self.modules.get(id.0 as usize)
    }

    pub fn get_module_mut(&mut self, id: ModuleId) -> Option<&mut ModuleInfo> {
        self.modules.get_mut(id.0 as usize)
    }

    pub fn get_module_by_path(&self, path: &str) -> Option<&ModuleInfo> {
        self.path_to_id
            .get(path)
            .and_then(|id| self.get_module(*id))
    }

    pub fn namespace_of(&self, id: ModuleId) -> &str {
        self.get_module(id).map(|m| m.namespace.as_str()).unwrap_or("")
    }

    pub fn add_edge(&mut self, from: ModuleId, to: ModuleId, kind: EdgeKind) {
        self.edges.push(DependencyEdge { from, to, kind });
    }

    pub fn add_export(&mut self, module: ModuleId, entry: ExportEntry) {
        if let Some(info) = self.get_module_mut(module) {
            info.exports.push(entry);
        }
    }

    pub fn add_star_export(&mut self, module: ModuleId, target: ModuleId) {
        if let Some(info) = self.get_module_mut(module) {
            info.star_exports.push(target);
        }
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleInfo> {
        self.modules.iter()
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Whether any module in the program needs `target` as a runtime value.
    pub fn has_value_edge_to(&self, target: ModuleId) -> bool {
        self.edges
            .iter()
            .any(|e| e.to == target && e.kind == EdgeKind::ValueNeeded)
    }

    /// The modules `from` must force-load, sorted by target namespace so the
    /// emitted require list is reproducible.
    ///
    /// A value edge always forces its target, once, no matter how many
    /// symbols ride on it. A type-only edge never does - except when the
    /// target exports nothing but types and no module anywhere value-requires
    /// it; then the dependency edge still has to be recorded downstream, so
    /// the importer force-loads it.
    pub fn force_load_set(&self, from: ModuleId) -> Vec<ModuleId> {
        let mut seen = FxHashSet::default();
        let mut result = Vec::new();
        for edge in self.edges.iter().filter(|e| e.from == from) {
            let forced = match edge.kind {
                EdgeKind::ValueNeeded => true,
                EdgeKind::TypeOnly => {
                    self.get_module(edge.to)
                        .map(|m| m.is_types_only())
                        .unwrap_or(false)
                        && !self.has_value_edge_to(edge.to)
                }
            };
            if forced && seen.insert(edge.to) {
                result.push(edge.to);
            }
        }
        result.sort_by(|a, b| self.namespace_of(*a).cmp(self.namespace_of(*b)));
        result
    }

    /// The full named export surface of `module` with `export *` chains
    /// expanded. A locally declared export always wins over a star-imported
    /// name of the same identifier; the dropped name gets a diagnostic.
    pub fn expand_star_exports(
        &self,
        module: ModuleId,
        interner: &Interner,
        diagnostics: &mut DiagnosticBag,
    ) -> Vec<ExportEntry> {
        let Some(info) = self.get_module(module) else {
            return Vec::new();
        };
        let mut surface = info.exports.clone();
        let mut names: FxHashSet<Atom> = surface.iter().map(|e| e.exported).collect();
        let mut visited = FxHashSet::default();
        visited.insert(module);

        for &target in &info.star_exports {
            self.collect_star_surface(
                target,
                module,
                interner,
                &mut surface,
                &mut names,
                &mut visited,
                diagnostics,
            );
        }
        surface
    }

    fn collect_star_surface(
        &self,
        target: ModuleId,
        origin: ModuleId,
        interner: &Interner,
        surface: &mut Vec<ExportEntry>,
        names: &mut FxHashSet<Atom>,
        visited: &mut FxHashSet<ModuleId>,
        diagnostics: &mut DiagnosticBag,
    ) {
        if !visited.insert(target) {
            return;
        }
        let Some(info) = self.get_module(target) else {
            return;
        };
        for entry in &info.exports {
            if names.insert(entry.exported) {
                surface.push(*entry);
            } else {
                let origin_path = self
                    .get_module(origin)
                    .map(|m| m.path.clone())
                    .unwrap_or_default();
                diagnostics.warning(
                    DiagnosticCode::StarExportShadowed,
                    origin_path,
                    Position::new(1, 1),
                    format!(
                        "star re-export of '{}' from '{}' is shadowed by a local declaration",
                        interner.resolve(entry.exported),
                        info.path
                    ),
                );
            }
        }
        // Star chains nest.
        let targets = info.star_exports.clone();
        for next in targets {
            self.collect_star_surface(
                next, origin, interner, surface, names, visited, diagnostics,
            );
        }
    }
}
