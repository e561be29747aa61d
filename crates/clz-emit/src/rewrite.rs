//! Module/Namespace Rewriter.
//!
//! Turns one ES-module-shaped source module into the downstream namespace
//! idiom: a `goog.module` header, `goog.require`/`goog.requireType` imports
//! classified by value-vs-type use, `exports` assignments, and lowered
//! declaration forms (enums as frozen ordinal maps, interfaces as records,
//! merged namespaces as member attachments onto one binding).
//!
//! Declarations sharing an exported name go through a merge arena: the first
//! contributor emits the initializing assignment, later contributors only
//! attach members. That is what keeps `enum Color` + `namespace Color` one
//! binding instead of two competing ones.

use crate::casts::CastPass;
use crate::ir::{JsDoc, JsExpr, JsStmt};
use crate::jsdoc::{SynthCtx, UNKNOWN};
use clz_common::diagnostics::{DiagnosticBag, DiagnosticCode};
use clz_common::span::Position;
use clz_common::{Atom, EmitOptions, Interner};
use clz_sema::module_graph::{ModuleGraph, ModuleId};
use clz_sema::{
    DeclDetail, DeclStmt, EnumMemberValue, ExportSpecifier, Expr, ImportBinding, ImportDecl,
    Mutability, SemanticType, SourceModule, Stmt, SymbolId, SymbolKind, SymbolTable,
};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// The rewriter's per-module output.
#[derive(Debug)]
pub struct RewriteResult {
    pub statements: Vec<JsStmt>,
    /// Namespaces this module must load for side effects or value
    /// availability, beyond what its own requires already pull in.
    pub force_load: Vec<String>,
    /// Local name to fully qualified downstream name.
    pub resolutions: IndexMap<String, String>,
}

/// Rewrites one module against the whole-program graph and symbol table.
pub struct ModuleRewriter<'a> {
    module: &'a SourceModule,
    symbols: &'a SymbolTable,
    graph: &'a ModuleGraph,
    interner: &'a Interner,
    options: &'a EmitOptions,
    diagnostics: &'a mut DiagnosticBag,

    namespace: String,
    header: Vec<JsStmt>,
    body: Vec<JsStmt>,
    resolutions: IndexMap<String, String>,
    /// Modules already value-required, with their binding variable.
    required: FxHashMap<ModuleId, String>,
    type_required: FxHashSet<ModuleId>,
    bare_required: FxHashSet<ModuleId>,
    require_counter: u32,
    /// Merge arena: qualified paths whose initializer has been emitted.
    initialized: FxHashSet<String>,
    /// Paths whose previous initializer came from a namespace declaration.
    namespace_initialized: FxHashSet<String>,
    /// Top-level names contributed by more than one declaration.
    merged: FxHashSet<Atom>,
    /// Names already bound on `exports`; merged declarations export once.
    exported_names: FxHashSet<String>,
    star_expanded: bool,
}

impl<'a> ModuleRewriter<'a> {
    pub fn new(
        module: &'a SourceModule,
        symbols: &'a SymbolTable,
        graph: &'a ModuleGraph,
        interner: &'a Interner,
        options: &'a EmitOptions,
        diagnostics: &'a mut DiagnosticBag,
    ) -> Self {
        let namespace = qualify(&options.module_prefix, graph.namespace_of(module.id));
        ModuleRewriter {
            module,
            symbols,
            graph,
            interner,
            options,
            diagnostics,
            namespace,
            header: Vec::new(),
            body: Vec::new(),
            resolutions: IndexMap::new(),
            required: FxHashMap::default(),
            type_required: FxHashSet::default(),
            bare_required: FxHashSet::default(),
            require_counter: 0,
            initialized: FxHashSet::default(),
            namespace_initialized: FxHashSet::default(),
            merged: FxHashSet::default(),
            exported_names: FxHashSet::default(),
            star_expanded: false,
        }
    }

    pub fn rewrite(mut self) -> RewriteResult {
        debug!(path = %self.module.path, namespace = %self.namespace, "rewriting module");
        self.header.push(JsStmt::GoogModule(self.namespace.clone()));
        self.collect_merged_names();

        for stmt in &self.module.statements {
            match stmt {
                Stmt::Import(decl) => self.emit_import(decl),
                Stmt::SideEffectImport { from, .. } => {
                    self.emit_bare_require(*from);
                }
                Stmt::ExportNamed { specifiers, from, .. } => {
                    self.emit_export_named(specifiers, *from);
                }
                Stmt::ExportStar { .. } => self.emit_export_star(),
                Stmt::Decl(decl) => self.emit_decl(decl, None),
                Stmt::Expr { expr, .. } => {
                    let rewritten = self.rewrite_expr(expr);
                    self.body.push(JsStmt::expr(rewritten));
                }
            }
        }

        let force_load = self.emit_force_loads();

        let mut statements = self.header;
        statements.extend(self.body);
        RewriteResult {
            statements,
            force_load,
            resolutions: self.resolutions,
        }
    }

    /// Names contributed by more than one top-level declaration merge into
    /// one binding; enum lowering needs to know this up front to keep the
    /// container reassignable.
    fn collect_merged_names(&mut self) {
        let mut counts: FxHashMap<Atom, u32> = FxHashMap::default();
        for stmt in &self.module.statements {
            if let Stmt::Decl(decl) = stmt {
                if let Some(symbol) = self.symbols.get(decl.symbol) {
                    *counts.entry(symbol.name).or_insert(0) += 1;
                }
            }
        }
        self.merged = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name)
            .collect();
    }

    // -------------------------------------------------------------------------
    // Imports and requires
    // -------------------------------------------------------------------------

    fn emit_import(&mut self, decl: &ImportDecl) {
        for binding in &decl.bindings {
            match binding {
                ImportBinding::Named {
                    imported,
                    local,
                    type_only,
                } => {
                    let imported_name = self.interner.resolve(*imported).to_string();
                    let local_name = self.interner.resolve(*local).to_string();
                    let qualified =
                        format!("{}.{}", self.module_namespace(decl.from), imported_name);
                    if decl.type_only || *type_only {
                        self.ensure_require_type(decl.from);
                    } else {
                        let var = self.ensure_require(decl.from);
                        self.header.push(JsStmt::ConstDecl {
                            jsdoc: None,
                            name: local_name.clone(),
                            init: JsExpr::member(JsExpr::ident(var), imported_name),
                        });
                    }
                    self.resolutions.insert(local_name, qualified);
                }
                // Default and namespace bindings both resolve to the bare
                // module binding; the default value IS the module export.
                ImportBinding::Default { local } | ImportBinding::Namespace { local } => {
                    let local_name = self.interner.resolve(*local).to_string();
                    let qualified = self.module_namespace(decl.from);
                    if decl.type_only {
                        self.ensure_require_type(decl.from);
                    } else if let Some(var) = self.required.get(&decl.from).cloned() {
                        self.header.push(JsStmt::ConstDecl {
                            jsdoc: None,
                            name: local_name.clone(),
                            init: JsExpr::ident(var),
                        });
                    } else {
                        self.header.push(JsStmt::Require {
                            var_name: Some(local_name.clone()),
                            namespace: qualified.clone(),
                            type_only: false,
                        });
                        self.required.insert(decl.from, local_name.clone());
                    }
                    self.resolutions.insert(local_name, qualified);
                }
            }
        }
    }

    fn module_namespace(&self, id: ModuleId) -> String {
        qualify(&self.options.module_prefix, self.graph.namespace_of(id))
    }

    fn ensure_require(&mut self, target: ModuleId) -> String {
        if let Some(var) = self.required.get(&target) {
            return var.clone();
        }
        let ns = self.module_namespace(target);
        self.require_counter += 1;
        let var = format!("{}_{}", sanitize(last_segment(&ns)), self.require_counter);
        self.header.push(JsStmt::Require {
            var_name: Some(var.clone()),
            namespace: ns,
            type_only: false,
        });
        self.required.insert(target, var.clone());
        var
    }

    fn ensure_require_type(&mut self, target: ModuleId) {
        if self.required.contains_key(&target) || !self.type_required.insert(target) {
            return;
        }
        self.header.push(JsStmt::Require {
            var_name: None,
            namespace: self.module_namespace(target),
            type_only: true,
        });
    }

    fn emit_bare_require(&mut self, target: ModuleId) {
        if self.required.contains_key(&target) || !self.bare_required.insert(target) {
            return;
        }
        self.header.push(JsStmt::Require {
            var_name: None,
            namespace: self.module_namespace(target),
            type_only: false,
        });
    }

    fn emit_force_loads(&mut self) -> Vec<String> {
        let mut namespaces = Vec::new();
        for target in self.graph.force_load_set(self.module.id) {
            let ns = self.module_namespace(target);
            if !self.required.contains_key(&target) && self.bare_required.insert(target) {
                self.header.push(JsStmt::Require {
                    var_name: None,
                    namespace: ns.clone(),
                    type_only: false,
                });
            }
            namespaces.push(ns);
        }
        namespaces
    }

    // -------------------------------------------------------------------------
    // Re-exports
    // -------------------------------------------------------------------------

    fn emit_export_named(&mut self, specifiers: &[ExportSpecifier], from: Option<ModuleId>) {
        for spec in specifiers {
            let local = self.interner.resolve(spec.local).to_string();
            let exported = self.interner.resolve(spec.exported).to_string();
            match from {
                Some(origin) => {
                    let origin_qualified =
                        format!("{}.{}", self.module_namespace(origin), local);
                    if spec.type_only {
                        // Alias the origin type; a fresh declaration would be
                        // an unrelated type to the downstream checker.
                        let nominal = self
                            .symbols
                            .lookup(origin, spec.local)
                            .is_some_and(|id| self.origin_is_nominal(id));
                        self.ensure_require_type(origin);
                        self.push_type_reexport(&exported, &origin_qualified, nominal);
                    } else {
                        let var = self.ensure_require(origin);
                        self.body.push(JsStmt::expr(JsExpr::assign(
                            JsExpr::member(JsExpr::ident("exports"), exported),
                            JsExpr::member(JsExpr::ident(var), local),
                        )));
                    }
                }
                None => {
                    if spec.type_only {
                        let nominal = self
                            .symbols
                            .lookup(self.module.id, spec.local)
                            .is_some_and(|id| self.origin_is_nominal(id));
                        self.push_type_reexport(&exported, &local, nominal);
                    } else {
                        self.body.push(JsStmt::expr(JsExpr::assign(
                            JsExpr::member(JsExpr::ident("exports"), exported),
                            JsExpr::ident(local),
                        )));
                    }
                }
            }
        }
    }

    /// The `!` prefix only applies to nominal object types; primitive and
    /// union typedefs are referenced bare.
    fn push_type_reexport(&mut self, exported: &str, origin: &str, nominal: bool) {
        let ty = if nominal {
            format!("!{}", origin)
        } else {
            origin.to_string()
        };
        self.push_typedef_export(exported, ty);
    }

    fn push_typedef_export(&mut self, exported: &str, ty: String) {
        self.body.push(JsStmt::Typedef {
            jsdoc: JsDoc::typedef(ty),
            target: JsExpr::member(JsExpr::ident("exports"), exported),
        });
    }

    fn origin_is_nominal(&self, id: SymbolId) -> bool {
        let Some(symbol) = self.symbols.get(id) else {
            return false;
        };
        match symbol.kind {
            SymbolKind::Class | SymbolKind::Interface => true,
            SymbolKind::TypeAlias => {
                let body = self
                    .symbols
                    .alias_def(id)
                    .map(|def| &def.body)
                    .or(symbol.type_side.as_ref());
                matches!(
                    body,
                    Some(SemanticType::Record(_)) | Some(SemanticType::ClassRef(_))
                )
            }
            _ => false,
        }
    }

    fn emit_export_star(&mut self) {
        // One expansion covers every `export *` in the module.
        if self.star_expanded {
            return;
        }
        self.star_expanded = true;
        let surface =
            self.graph
                .expand_star_exports(self.module.id, self.interner, self.diagnostics);
        for entry in surface {
            let Some(symbol) = self.symbols.get(entry.symbol) else {
                continue;
            };
            // Locally declared exports are emitted by their own declarations.
            if symbol.module == self.module.id {
                continue;
            }
            let exported = self.interner.resolve(entry.exported).to_string();
            if entry.type_only {
                let origin = qualify(
                    &self.options.module_prefix,
                    &self.symbols.qualified_name(entry.symbol, self.graph, self.interner),
                );
                let nominal = self.origin_is_nominal(entry.symbol);
                self.ensure_require_type(symbol.module);
                self.push_type_reexport(&exported, &origin, nominal);
            } else {
                let name = self.interner.resolve(symbol.name).to_string();
                let var = self.ensure_require(symbol.module);
                self.body.push(JsStmt::expr(JsExpr::assign(
                    JsExpr::member(JsExpr::ident("exports"), exported),
                    JsExpr::member(JsExpr::ident(var), name),
                )));
            }
        }
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    fn emit_decl(&mut self, decl: &DeclStmt, prefix: Option<&str>) {
        let Some(symbol) = self.symbols.get(decl.symbol) else {
            return;
        };
        let name = self.interner.resolve(symbol.name).to_string();
        let type_only = symbol.kind.is_type_only();
        let mutability = symbol.mutability;
        let position = self.module.position(decl.span);
        let path = match prefix {
            Some(p) => format!("{}.{}", p, name),
            None => name.clone(),
        };

        let mut degraded_type = false;
        match &decl.detail {
            DeclDetail::Var { declared_type, init } => {
                self.emit_var(decl, mutability, &name, prefix, declared_type, init, position);
            }
            DeclDetail::Function { params, body } => {
                self.emit_function(decl, &name, prefix, params, body, position);
            }
            DeclDetail::Class { body } => {
                self.emit_class(&path, prefix, body);
            }
            DeclDetail::Enum { members } => {
                self.emit_enum(&path, symbol.name, members);
            }
            DeclDetail::Namespace { members } => {
                self.emit_namespace(&path, members, position);
            }
            DeclDetail::Interface => {
                let (type_side, degraded) = self.resolve_type_side(decl, position);
                degraded_type = degraded;
                // A conflicting runtime binding owns the name; the record
                // shape is dropped with it.
                if !degraded {
                    self.emit_interface(&path, prefix, type_side, position);
                }
            }
            DeclDetail::TypeAlias => {
                let (type_side, degraded) = self.resolve_type_side(decl, position);
                degraded_type = degraded;
                self.emit_type_alias(decl, &path, type_side, degraded, position);
            }
        }

        if prefix.is_none() {
            self.record_resolution(decl, &name);
            self.emit_export_binding(decl, type_only, degraded_type, &name);
        }
    }

    /// Resolved type side of a declaration. `true` means an incompatible
    /// value binding shares the name and the type side degraded to the
    /// unknown marker.
    fn resolve_type_side(
        &mut self,
        decl: &DeclStmt,
        position: Position,
    ) -> (Option<SemanticType>, bool) {
        let (type_side, value_side) = self.symbols.resolve_duality(
            decl.symbol,
            &self.module.path,
            position,
            self.interner,
            self.diagnostics,
        );
        let degraded = value_side.is_some() && matches!(type_side, Some(SemanticType::Unknown));
        (type_side, degraded)
    }

    fn record_resolution(&mut self, decl: &DeclStmt, name: &str) {
        let qualified = if decl.default_export {
            self.namespace.clone()
        } else {
            format!("{}.{}", self.namespace, name)
        };
        self.resolutions.insert(name.to_string(), qualified);
    }

    fn emit_export_binding(
        &mut self,
        decl: &DeclStmt,
        type_only: bool,
        degraded_type: bool,
        name: &str,
    ) {
        if decl.default_export {
            // Bare qualified name: never a `.default` property hop.
            self.body.push(JsStmt::expr(JsExpr::assign(
                JsExpr::ident("exports"),
                JsExpr::ident(name),
            )));
        } else if decl.exported {
            if !self.exported_names.insert(name.to_string()) {
                return;
            }
            if degraded_type {
                self.push_typedef_export(name, UNKNOWN.to_string());
            } else if type_only {
                let nominal = self.origin_is_nominal(decl.symbol);
                self.push_type_reexport(name, name, nominal);
            } else {
                self.body.push(JsStmt::expr(JsExpr::assign(
                    JsExpr::member(JsExpr::ident("exports"), name),
                    JsExpr::ident(name),
                )));
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_var(
        &mut self,
        decl: &DeclStmt,
        mutability: Mutability,
        name: &str,
        prefix: Option<&str>,
        declared_type: &Option<SemanticType>,
        init: &Option<Expr>,
        position: Position,
    ) {
        let annotated = declared_type.is_some();
        let init_js = init.as_ref().map(|e| {
            let mut pass = CastPass::new(
                self.symbols,
                self.interner,
                self.options,
                &self.module.path,
                &self.module.line_map,
                self.diagnostics,
            );
            pass.rewrite_init(e, annotated)
        });
        let ty = declared_type
            .as_ref()
            .map(|t| self.synth(t, position))
            .or_else(|| {
                self.symbols
                    .get(decl.symbol)
                    .and_then(|s| s.signatures.first().cloned())
                    .map(|t| self.synth(&t, position))
            });

        if let Some(p) = prefix {
            let jsdoc = ty.map(JsDoc::type_tag);
            let target = JsExpr::path(&format!("{}.{}", p, name));
            match init_js {
                Some(init) => self.body.push(JsStmt::Expr {
                    jsdoc,
                    expr: JsExpr::assign(target, init),
                }),
                None => self.body.push(JsStmt::Expr { jsdoc, expr: target }),
            }
            return;
        }

        match (mutability, init_js) {
            (Mutability::Const, Some(init)) => {
                self.body.push(JsStmt::ConstDecl {
                    jsdoc: Some(JsDoc::const_tag(ty.as_deref())),
                    name: name.to_string(),
                    init,
                });
            }
            (_, init) => {
                self.body.push(JsStmt::VarDecl {
                    jsdoc: ty.map(JsDoc::type_tag),
                    name: name.to_string(),
                    init,
                });
            }
        }
    }

    fn emit_function(
        &mut self,
        decl: &DeclStmt,
        name: &str,
        prefix: Option<&str>,
        params: &[Atom],
        body: &str,
        position: Position,
    ) {
        let jsdoc = self.function_doc(decl, params, position);
        let param_names: Vec<String> = params
            .iter()
            .map(|p| self.interner.resolve(*p).to_string())
            .collect();
        match prefix {
            None => self.body.push(JsStmt::FunctionDecl {
                jsdoc,
                name: name.to_string(),
                params: param_names,
                body: body.to_string(),
            }),
            Some(p) => self.body.push(JsStmt::Expr {
                jsdoc,
                expr: JsExpr::assign(
                    JsExpr::path(&format!("{}.{}", p, name)),
                    JsExpr::Raw(format!("function({}) {}", param_names.join(", "), body)),
                ),
            }),
        }
    }

    fn function_doc(
        &mut self,
        decl: &DeclStmt,
        params: &[Atom],
        position: Position,
    ) -> Option<JsDoc> {
        let func = match self.symbols.get(decl.symbol)?.declared_type() {
            SemanticType::Function(f) => f.clone(),
            _ => return None,
        };
        let mut ctx = SynthCtx::new(
            self.symbols,
            self.interner,
            self.options,
            &self.module.path,
            position,
            self.diagnostics,
        );
        let tags = ctx.function_tags(&func, params);
        if tags.is_empty() {
            None
        } else {
            Some(JsDoc::new(tags))
        }
    }

    fn emit_class(&mut self, path: &str, prefix: Option<&str>, body: &str) {
        self.initialized.insert(path.to_string());
        match prefix {
            None => self.body.push(JsStmt::Raw(body.to_string())),
            Some(_) => self.body.push(JsStmt::expr(JsExpr::assign(
                JsExpr::path(path),
                JsExpr::Raw(body.to_string()),
            ))),
        }
    }

    fn emit_enum(&mut self, path: &str, name: Atom, members: &[clz_sema::EnumMemberDecl]) {
        let numeric = members
            .iter()
            .all(|m| matches!(m.value, EnumMemberValue::Number(_)));
        let member_expr = |value: &EnumMemberValue| match value {
            EnumMemberValue::Number(n) => JsExpr::Number(n.to_string()),
            EnumMemberValue::String(s) => JsExpr::string(s.clone()),
        };

        if !self.initialized.insert(path.to_string()) {
            // A merged container already holds the binding; attach members
            // individually, skip reverse entries and freezing.
            for member in members {
                let mname = self.interner.resolve(member.name).to_string();
                self.body.push(JsStmt::expr(JsExpr::assign(
                    JsExpr::path(&format!("{}.{}", path, mname)),
                    member_expr(&member.value),
                )));
            }
            return;
        }

        let props: Vec<(String, JsExpr)> = members
            .iter()
            .map(|m| {
                (
                    self.interner.resolve(m.name).to_string(),
                    member_expr(&m.value),
                )
            })
            .collect();
        let jsdoc = JsDoc::enum_tag(if numeric { "number" } else { "string" });
        if path.contains('.') {
            self.body.push(JsStmt::Expr {
                jsdoc: Some(jsdoc),
                expr: JsExpr::assign(JsExpr::path(path), JsExpr::Object(props)),
            });
        } else {
            self.body.push(JsStmt::VarDecl {
                jsdoc: Some(jsdoc),
                name: path.to_string(),
                init: Some(JsExpr::Object(props)),
            });
        }

        // A merged binding stays reassignable: no reverse map, no freeze.
        if self.merged.contains(&name) {
            return;
        }
        if numeric {
            for member in members {
                let EnumMemberValue::Number(ordinal) = member.value else {
                    continue;
                };
                let mname = self.interner.resolve(member.name).to_string();
                self.body.push(JsStmt::expr(JsExpr::assign(
                    JsExpr::index(JsExpr::path(path), JsExpr::Number(ordinal.to_string())),
                    JsExpr::string(mname),
                )));
            }
        }
        self.body.push(JsStmt::expr(JsExpr::call(
            JsExpr::path("Object.freeze"),
            vec![JsExpr::path(path)],
        )));
    }

    fn emit_namespace(&mut self, path: &str, members: &[DeclStmt], position: Position) {
        if self.initialized.insert(path.to_string()) {
            self.namespace_initialized.insert(path.to_string());
            if path.contains('.') {
                self.body.push(JsStmt::Expr {
                    jsdoc: Some(JsDoc::const_tag(None)),
                    expr: JsExpr::assign(JsExpr::path(path), JsExpr::Object(vec![])),
                });
            } else {
                self.body.push(JsStmt::ConstDecl {
                    jsdoc: Some(JsDoc::const_tag(None)),
                    name: path.to_string(),
                    init: JsExpr::Object(vec![]),
                });
            }
        } else if self.namespace_initialized.contains(path) {
            // Re-opened namespace: the repeated initializer idiom is
            // recognized and suppressed, keeping a single binding.
            self.diagnostics.warning(
                DiagnosticCode::NamespaceReopened,
                self.module.path.clone(),
                position,
                format!("namespace '{}' re-opened; duplicate initializer suppressed", path),
            );
        }
        for member in members {
            self.emit_decl(member, Some(path));
        }
    }

    fn emit_interface(
        &mut self,
        path: &str,
        prefix: Option<&str>,
        type_side: Option<SemanticType>,
        position: Position,
    ) {
        let record_doc = JsDoc::new(vec!["@record".to_string()]);
        match prefix {
            None => self.body.push(JsStmt::FunctionDecl {
                jsdoc: Some(record_doc),
                name: path.to_string(),
                params: vec![],
                body: "{}".to_string(),
            }),
            Some(_) => self.body.push(JsStmt::Expr {
                jsdoc: Some(record_doc),
                expr: JsExpr::assign(JsExpr::path(path), JsExpr::Raw("function() {}".to_string())),
            }),
        }
        let fields = match type_side {
            Some(SemanticType::Record(fields)) => fields,
            _ => return,
        };
        for field in fields {
            let fname = self.interner.resolve(field.name).to_string();
            let ty = if field.optional {
                self.synth(&SemanticType::optional(field.ty.clone()), position)
            } else {
                self.synth(&field.ty, position)
            };
            self.body.push(JsStmt::Expr {
                jsdoc: Some(JsDoc::type_tag(ty)),
                expr: JsExpr::path(&format!("{}.prototype.{}", path, fname)),
            });
        }
    }

    fn emit_type_alias(
        &mut self,
        decl: &DeclStmt,
        path: &str,
        type_side: Option<SemanticType>,
        degraded: bool,
        position: Position,
    ) {
        let body = if degraded {
            SemanticType::Unknown
        } else {
            self.symbols
                .alias_def(decl.symbol)
                .map(|def| def.body.clone())
                .or(type_side)
                .unwrap_or(SemanticType::Unknown)
        };
        let ty = self.synth(&body, position);
        self.body.push(JsStmt::Typedef {
            jsdoc: JsDoc::typedef(ty),
            target: if path.contains('.') {
                JsExpr::path(path)
            } else {
                JsExpr::Raw(format!("var {}", path))
            },
        });
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn synth(&mut self, ty: &SemanticType, position: Position) -> String {
        let mut ctx = SynthCtx::new(
            self.symbols,
            self.interner,
            self.options,
            &self.module.path,
            position,
            self.diagnostics,
        );
        ctx.synthesize(ty)
    }

    fn rewrite_expr(&mut self, expr: &Expr) -> JsExpr {
        let mut pass = CastPass::new(
            self.symbols,
            self.interner,
            self.options,
            &self.module.path,
            &self.module.line_map,
            self.diagnostics,
        );
        pass.rewrite(expr)
    }
}

fn qualify(prefix: &str, namespace: &str) -> String {
    if prefix.is_empty() {
        namespace.to_string()
    } else {
        format!("{}.{}", prefix, namespace)
    }
}

fn last_segment(namespace: &str) -> &str {
    namespace.rsplit('.').next().unwrap_or(namespace)
}

fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
