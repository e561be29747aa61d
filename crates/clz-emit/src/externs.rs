//! Ambient/Externs Declaration Emitter.
//!
//! Projects the global declaration forest into one flat artifact: every
//! namespace path segment declared as a property container exactly once,
//! classes as annotated constructor functions, interfaces as records with
//! their members listed below. The tree arrives pre-sorted by qualified name,
//! so the artifact is identical no matter which files contributed first.

use crate::ir::{JsDoc, JsExpr, JsStmt};
use crate::jsdoc::SynthCtx;
use crate::printer::print_stmts;
use clz_common::diagnostics::{DiagnosticBag, DiagnosticCode};
use clz_common::{Atom, EmitOptions, Interner};
use clz_sema::{
    AmbientDecl, AmbientDeclarationTree, AmbientKind, AmbientMember, AmbientSignature,
    FunctionType, Param, SemanticType, SymbolTable,
};
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;
use tracing::debug;

/// Globals the downstream environment already declares. Re-declaring one of
/// these roots is a conflict; user members on them still attach.
static BUILTIN_GLOBALS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "Object", "Array", "Function", "Error", "String", "Number", "Boolean", "Math", "JSON",
        "Date", "RegExp", "Promise", "Symbol", "Map", "Set", "WeakMap", "WeakSet", "globalThis",
        "window", "document",
    ]
    .into_iter()
    .collect()
});

/// Emit the aggregated externs artifact.
pub fn emit_externs(
    tree: &AmbientDeclarationTree,
    symbols: &SymbolTable,
    interner: &Interner,
    options: &EmitOptions,
    diagnostics: &mut DiagnosticBag,
) -> String {
    debug!(decls = tree.len(), "emitting externs artifact");
    let mut emitter = ExternsEmitter {
        symbols,
        interner,
        options,
        diagnostics,
        declared: FxHashSet::default(),
        out: Vec::new(),
    };
    for decl in tree.sorted() {
        emitter.emit_decl(decl);
    }
    print_stmts(&emitter.out)
}

struct ExternsEmitter<'a> {
    symbols: &'a SymbolTable,
    interner: &'a Interner,
    options: &'a EmitOptions,
    diagnostics: &'a mut DiagnosticBag,
    declared: FxHashSet<String>,
    out: Vec<JsStmt>,
}

impl<'a> ExternsEmitter<'a> {
    fn emit_decl(&mut self, decl: &AmbientDecl) {
        if decl.quoted_module {
            self.diagnostics.warning(
                DiagnosticCode::NonReferencableModuleOmitted,
                decl.file.clone(),
                decl.position,
                format!(
                    "quoted module '{}' is not referencable from global scope; omitted",
                    decl.path
                ),
            );
            return;
        }

        let root = decl.path.split('.').next().unwrap_or(&decl.path);
        let builtin_root = BUILTIN_GLOBALS.contains(root) && decl.path == root;

        self.declare_ancestors(&decl.path);

        match &decl.kind {
            AmbientKind::Namespace => {
                if builtin_root {
                    self.skip_builtin(decl);
                } else {
                    self.declare_container(&decl.path);
                }
            }
            AmbientKind::Class { ctors, members } => {
                if builtin_root {
                    self.skip_builtin(decl);
                    self.declared.insert(decl.path.clone());
                } else if self.declared.insert(decl.path.clone()) {
                    let (func, names) = self.collapse(ctors, decl);
                    let mut tags = vec!["@constructor".to_string()];
                    tags.extend(self.function_tags(&func, &names, decl));
                    self.push_function(&decl.path, JsDoc::new(tags), &func, &names);
                }
                self.emit_members(&decl.path, members, decl);
            }
            AmbientKind::Interface { members } => {
                if builtin_root {
                    self.skip_builtin(decl);
                    self.declared.insert(decl.path.clone());
                } else if self.declared.insert(decl.path.clone()) {
                    self.push_function(
                        &decl.path,
                        JsDoc::new(vec!["@record".to_string()]),
                        &FunctionType::new(vec![], SemanticType::void()),
                        &[],
                    );
                }
                self.emit_members(&decl.path, members, decl);
            }
            AmbientKind::Function { signatures } => {
                if builtin_root {
                    self.skip_builtin(decl);
                } else if self.declared.insert(decl.path.clone()) {
                    let (func, names) = self.collapse(signatures, decl);
                    let tags = self.function_tags(&func, &names, decl);
                    self.push_function(&decl.path, JsDoc::new(tags), &func, &names);
                }
            }
            AmbientKind::Variable { ty } => {
                if builtin_root {
                    self.skip_builtin(decl);
                } else if self.declared.insert(decl.path.clone()) {
                    let annotation = self.synth(ty, decl);
                    if decl.path.contains('.') {
                        self.out.push(JsStmt::Expr {
                            jsdoc: Some(JsDoc::type_tag(annotation)),
                            expr: JsExpr::path(&decl.path),
                        });
                    } else {
                        self.out.push(JsStmt::VarDecl {
                            jsdoc: Some(JsDoc::type_tag(annotation)),
                            name: decl.path.clone(),
                            init: None,
                        });
                    }
                }
            }
        }
    }

    fn skip_builtin(&mut self, decl: &AmbientDecl) {
        self.diagnostics.warning(
            DiagnosticCode::BuiltinExternSkipped,
            decl.file.clone(),
            decl.position,
            format!(
                "'{}' matches a builtin global; its declaration is not repeated",
                decl.path
            ),
        );
    }

    /// Declare the container chain above `path`, each segment at most once.
    /// Builtin roots are assumed present downstream and never re-declared.
    fn declare_ancestors(&mut self, path: &str) {
        let segments: Vec<&str> = path.split('.').collect();
        let mut current = String::new();
        for segment in &segments[..segments.len().saturating_sub(1)] {
            if current.is_empty() {
                current = (*segment).to_string();
            } else {
                current = format!("{}.{}", current, segment);
            }
            self.declare_container(&current);
        }
    }

    fn declare_container(&mut self, path: &str) {
        if !self.declared.insert(path.to_string()) {
            return;
        }
        if !path.contains('.') {
            if BUILTIN_GLOBALS.contains(path) {
                return;
            }
            self.out.push(JsStmt::VarDecl {
                jsdoc: Some(JsDoc::const_tag(None)),
                name: path.to_string(),
                init: Some(JsExpr::Object(vec![])),
            });
        } else {
            self.out.push(JsStmt::Expr {
                jsdoc: Some(JsDoc::const_tag(None)),
                expr: JsExpr::assign(JsExpr::path(path), JsExpr::Object(vec![])),
            });
        }
    }

    fn emit_members(&mut self, path: &str, members: &[AmbientMember], decl: &AmbientDecl) {
        for member in members {
            if let Some(key) = &member.inexpressible_key {
                self.out.push(JsStmt::Comment(format!(
                    "member with inexpressible key {} dropped",
                    key
                )));
                self.diagnostics.warning(
                    DiagnosticCode::InexpressiblePropertyKey,
                    decl.file.clone(),
                    decl.position,
                    format!("property key {} cannot be written; member dropped", key),
                );
                continue;
            }
            let name = self.interner.resolve(member.name).to_string();
            let ty = if member.optional {
                self.synth(&SemanticType::optional(member.ty.clone()), decl)
            } else {
                self.synth(&member.ty, decl)
            };
            let target = if member.is_static {
                format!("{}.{}", path, name)
            } else {
                format!("{}.prototype.{}", path, name)
            };
            self.out.push(JsStmt::Expr {
                jsdoc: Some(JsDoc::type_tag(ty)),
                expr: JsExpr::path(&target),
            });
        }
    }

    fn push_function(&mut self, path: &str, jsdoc: JsDoc, func: &FunctionType, names: &[Atom]) {
        let params: Vec<String> = (0..func.params.len())
            .map(|i| self.param_name(names, i))
            .collect();
        if path.contains('.') {
            self.out.push(JsStmt::Expr {
                jsdoc: Some(jsdoc),
                expr: JsExpr::assign(
                    JsExpr::path(path),
                    JsExpr::Raw(format!("function({}) {{}}", params.join(", "))),
                ),
            });
        } else {
            self.out.push(JsStmt::FunctionDecl {
                jsdoc: Some(jsdoc),
                name: path.to_string(),
                params,
                body: "{}".to_string(),
            });
        }
    }

    fn param_name(&self, names: &[Atom], index: usize) -> String {
        names
            .get(index)
            .map(|a| self.interner.resolve(*a).to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("p{}", index))
    }

    /// Collapse an overload set into one signature: positional parameter
    /// types union, arity differences widen to optional, the first overload
    /// contributes the parameter names. Lossy, so each collapse is surfaced.
    fn collapse(
        &mut self,
        signatures: &[AmbientSignature],
        decl: &AmbientDecl,
    ) -> (FunctionType, Vec<Atom>) {
        match signatures {
            [] => (FunctionType::new(vec![], SemanticType::void()), Vec::new()),
            [only] => (only.func.clone(), only.param_names.clone()),
            _ => {
                self.diagnostics.warning(
                    DiagnosticCode::OverloadsCollapsed,
                    decl.file.clone(),
                    decl.position,
                    format!(
                        "{} overload signatures of '{}' collapsed into one",
                        signatures.len(),
                        decl.path
                    ),
                );
                let max_arity = signatures
                    .iter()
                    .map(|s| s.func.params.len())
                    .max()
                    .unwrap_or(0);
                let mut params = Vec::with_capacity(max_arity);
                for i in 0..max_arity {
                    let mut types: Vec<SemanticType> = Vec::new();
                    let mut optional = false;
                    for sig in signatures {
                        match sig.func.params.get(i) {
                            Some(p) => {
                                optional |= p.optional;
                                if !types.contains(&p.ty) {
                                    types.push(p.ty.clone());
                                }
                            }
                            None => optional = true,
                        }
                    }
                    let ty = if types.len() == 1 {
                        types.into_iter().next().unwrap_or(SemanticType::Unknown)
                    } else {
                        SemanticType::Union(types)
                    };
                    params.push(Param { ty, optional });
                }

                let mut returns: Vec<SemanticType> = Vec::new();
                for sig in signatures {
                    if !returns.contains(&sig.func.returns) {
                        returns.push(sig.func.returns.clone());
                    }
                }
                let returns = if returns.len() == 1 {
                    returns.into_iter().next().unwrap_or(SemanticType::void())
                } else {
                    SemanticType::Union(returns)
                };

                let func = FunctionType {
                    this_param: signatures[0].func.this_param.clone(),
                    params,
                    rest: signatures.iter().find_map(|s| s.func.rest.clone()),
                    returns,
                };
                (func, signatures[0].param_names.clone())
            }
        }
    }

    fn function_tags(
        &mut self,
        func: &FunctionType,
        names: &[Atom],
        decl: &AmbientDecl,
    ) -> Vec<String> {
        let mut ctx = SynthCtx::new(
            self.symbols,
            self.interner,
            self.options,
            &decl.file,
            decl.position,
            self.diagnostics,
        );
        ctx.function_tags(func, names)
    }

    fn synth(&mut self, ty: &SemanticType, decl: &AmbientDecl) -> String {
        let mut ctx = SynthCtx::new(
            self.symbols,
            self.interner,
            self.options,
            &decl.file,
            decl.position,
            self.diagnostics,
        );
        ctx.synthesize(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_covers_error_and_object() {
        assert!(BUILTIN_GLOBALS.contains("Error"));
        assert!(BUILTIN_GLOBALS.contains("Object"));
        assert!(!BUILTIN_GLOBALS.contains("MyLib"));
    }
}
