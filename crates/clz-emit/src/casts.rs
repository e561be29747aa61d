//! Cast Insertion Pass.
//!
//! Re-asserts narrowing facts the downstream checker would otherwise lose by
//! wrapping the minimal subexpression in an annotated cast. Narrowing arrives
//! from the frontend as `Expr::Narrow` nodes; this pass decides which of them
//! become casts in the output and which are dropped.

use crate::ir::JsExpr;
use crate::jsdoc::SynthCtx;
use clz_common::diagnostics::{DiagnosticBag, DiagnosticCode};
use clz_common::span::{LineMap, Position, Span};
use clz_common::{EmitOptions, Interner};
use clz_sema::{Expr, SemanticType, SymbolTable};
use rustc_hash::FxHashSet;

/// Rewrites one module's expressions, inserting casts at narrowing points.
pub struct CastPass<'a> {
    symbols: &'a SymbolTable,
    interner: &'a Interner,
    options: &'a EmitOptions,
    file: &'a str,
    line_map: &'a LineMap,
    diagnostics: &'a mut DiagnosticBag,
}

impl<'a> CastPass<'a> {
    pub fn new(
        symbols: &'a SymbolTable,
        interner: &'a Interner,
        options: &'a EmitOptions,
        file: &'a str,
        line_map: &'a LineMap,
        diagnostics: &'a mut DiagnosticBag,
    ) -> Self {
        CastPass {
            symbols,
            interner,
            options,
            file,
            line_map,
            diagnostics,
        }
    }

    /// Rewrite an expression statement or initializer.
    pub fn rewrite(&mut self, expr: &Expr) -> JsExpr {
        self.rewrite_expr(expr, false)
    }

    /// Rewrite a variable initializer. When the binding carries an explicit
    /// type annotation, a top-level narrowing fact needs no cast: the
    /// annotation on the fresh local already re-asserts it.
    pub fn rewrite_init(&mut self, expr: &Expr, annotated: bool) -> JsExpr {
        if annotated {
            if let Expr::Narrow { expr: inner, .. } = expr {
                return self.rewrite_expr(inner, false);
            }
        }
        self.rewrite_expr(expr, false)
    }

    fn rewrite_expr(&mut self, expr: &Expr, in_optional_chain: bool) -> JsExpr {
        match expr {
            Expr::Ident(name) => JsExpr::Ident(self.interner.resolve(*name).to_string()),
            Expr::Member { object, property } => JsExpr::Member {
                object: Box::new(self.rewrite_expr(object, in_optional_chain)),
                property: self.interner.resolve(*property).to_string(),
            },
            Expr::Index { object, index } => JsExpr::Index {
                object: Box::new(self.rewrite_expr(object, in_optional_chain)),
                index: Box::new(self.rewrite_expr(index, false)),
            },
            Expr::Call { callee, args } => JsExpr::Call {
                callee: Box::new(self.rewrite_expr(callee, in_optional_chain)),
                args: self.rewrite_args(args),
            },
            Expr::New { callee, args } => JsExpr::New {
                callee: Box::new(self.rewrite_expr(callee, false)),
                args: self.rewrite_args(args),
            },
            Expr::OptionalMember { object, property } => JsExpr::OptionalMember {
                object: Box::new(self.rewrite_expr(object, true)),
                property: self.interner.resolve(*property).to_string(),
            },
            Expr::OptionalCall { callee, args } => JsExpr::OptionalCall {
                callee: Box::new(self.rewrite_expr(callee, true)),
                args: self.rewrite_args(args),
            },
            Expr::Assign { target, value } => JsExpr::Assign {
                target: Box::new(self.rewrite_expr(target, false)),
                value: Box::new(self.rewrite_expr(value, false)),
            },
            Expr::StringLit(s) => JsExpr::String(s.clone()),
            Expr::NumberLit(n) => JsExpr::Number(format_number(*n)),
            Expr::BoolLit(b) => JsExpr::Bool(*b),
            Expr::NullLit => JsExpr::Null,
            Expr::Narrow {
                expr: inner,
                target,
                span,
                ..
            } => self.rewrite_narrow(inner, target, *span, in_optional_chain),
            Expr::Raw(text) => JsExpr::Raw(text.clone()),
        }
    }

    fn rewrite_args(&mut self, args: &[Expr]) -> Vec<JsExpr> {
        args.iter().map(|a| self.rewrite_expr(a, false)).collect()
    }

    fn rewrite_narrow(
        &mut self,
        inner: &Expr,
        target: &SemanticType,
        span: Span,
        in_optional_chain: bool,
    ) -> JsExpr {
        if in_optional_chain {
            // Parenthesizing inside the chain would change short-circuit
            // order; the lost precision is accepted and surfaced.
            self.diagnostics.warning(
                DiagnosticCode::OptionalChainNarrowingLost,
                self.file,
                self.position(span),
                "narrowing inside an optional chain is not re-asserted",
            );
            return self.rewrite_expr(inner, true);
        }

        // Collapse chained casts through fully-erased intermediates: the
        // innermost narrowed expression is cast directly to the final type.
        let mut subject = inner;
        while let Expr::Narrow {
            expr: deeper,
            target: intermediate,
            ..
        } = subject
        {
            if !self.is_erased(intermediate) {
                break;
            }
            subject = deeper;
        }

        let position = self.position(span);
        let ty = self.synthesize(target, position);
        JsExpr::Cast {
            ty,
            expr: Box::new(self.rewrite_expr(subject, false)),
        }
    }

    fn synthesize(&mut self, ty: &SemanticType, position: Position) -> String {
        let mut ctx = SynthCtx::new(
            self.symbols,
            self.interner,
            self.options,
            self.file,
            position,
            self.diagnostics,
        );
        ctx.synthesize(ty)
    }

    /// Whether a cast through this type carries no information, resolving
    /// local aliases of erased types along the way.
    fn is_erased(&self, ty: &SemanticType) -> bool {
        let mut visited = FxHashSet::default();
        let mut current = ty.clone();
        loop {
            if current.is_erased() {
                return true;
            }
            let SemanticType::Generic { name, args } = &current else {
                return false;
            };
            if !args.is_empty() {
                return false;
            }
            let Some(id) = self.symbols.lookup_type(*name) else {
                return false;
            };
            if !visited.insert(id) {
                return false;
            }
            match self.symbols.alias_def(id) {
                Some(def) if def.params.is_empty() => current = def.body.clone(),
                _ => return false,
            }
        }
    }

    fn position(&self, span: Span) -> Position {
        self.line_map.position(span.start)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_expr;
    use clz_sema::module_graph::ModuleId;
    use clz_sema::{AliasDef, NarrowKind, Symbol, SymbolKind};

    struct Fixture {
        symbols: SymbolTable,
        interner: Interner,
        options: EmitOptions,
        line_map: LineMap,
        diagnostics: DiagnosticBag,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                symbols: SymbolTable::new(),
                interner: Interner::with_common(),
                options: EmitOptions::default(),
                line_map: LineMap::new("x\n"),
                diagnostics: DiagnosticBag::new(),
            }
        }

        fn rewrite(&mut self, expr: &Expr) -> String {
            let mut pass = CastPass::new(
                &self.symbols,
                &self.interner,
                &self.options,
                "test.ts",
                &self.line_map,
                &mut self.diagnostics,
            );
            print_expr(&pass.rewrite(expr))
        }
    }

    #[test]
    fn test_simple_cast() {
        let mut f = Fixture::new();
        let x = f.interner.intern("x");
        let foo = f.interner.intern("Foo");
        let e = Expr::narrow(
            NarrowKind::AsCast,
            Expr::ident(x),
            SemanticType::ClassRef(foo),
        );
        assert_eq!(f.rewrite(&e), "/** @type {!Foo} */ (x)");
    }

    #[test]
    fn test_erased_intermediate_collapses() {
        let mut f = Fixture::new();
        let x = f.interner.intern("x");
        let foo = f.interner.intern("Foo");
        // x as unknown as Foo
        let e = Expr::narrow(
            NarrowKind::AsCast,
            Expr::narrow(NarrowKind::AsCast, Expr::ident(x), SemanticType::Unknown),
            SemanticType::ClassRef(foo),
        );
        assert_eq!(f.rewrite(&e), "/** @type {!Foo} */ (x)");
    }

    #[test]
    fn test_erased_alias_intermediate_collapses() {
        let mut f = Fixture::new();
        let x = f.interner.intern("x");
        let foo = f.interner.intern("Foo");
        let anyish = f.interner.intern("Anyish");
        let mut sym = Symbol::new(anyish, SymbolKind::TypeAlias, ModuleId(0));
        sym.type_side = Some(SemanticType::Unknown);
        let id = f.symbols.add(sym);
        f.symbols.define_alias(
            id,
            AliasDef {
                params: vec![],
                body: SemanticType::Unknown,
            },
        );
        let e = Expr::narrow(
            NarrowKind::AsCast,
            Expr::narrow(
                NarrowKind::AsCast,
                Expr::ident(x),
                SemanticType::Generic {
                    name: anyish,
                    args: vec![],
                },
            ),
            SemanticType::ClassRef(foo),
        );
        assert_eq!(f.rewrite(&e), "/** @type {!Foo} */ (x)");
    }

    #[test]
    fn test_non_erased_intermediate_keeps_both_layers() {
        let mut f = Fixture::new();
        let x = f.interner.intern("x");
        let a = f.interner.intern("a");
        let foo = f.interner.intern("Foo");
        let record = SemanticType::Record(vec![clz_sema::RecordField::new(
            a,
            SemanticType::number(),
        )]);
        let e = Expr::narrow(
            NarrowKind::AsCast,
            Expr::narrow(NarrowKind::AsCast, Expr::ident(x), record),
            SemanticType::ClassRef(foo),
        );
        assert_eq!(
            f.rewrite(&e),
            "/** @type {!Foo} */ (/** @type {{a: number}} */ (x))"
        );
    }

    #[test]
    fn test_no_cast_inside_optional_chain() {
        let mut f = Fixture::new();
        let x = f.interner.intern("x");
        let b = f.interner.intern("b");
        let foo = f.interner.intern("Foo");
        let e = Expr::OptionalMember {
            object: Box::new(Expr::narrow(
                NarrowKind::NonNullAssertion,
                Expr::ident(x),
                SemanticType::ClassRef(foo),
            )),
            property: b,
        };
        assert_eq!(f.rewrite(&e), "x?.b");
        let diags: Vec<_> = f.diagnostics.iter().collect();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::OptionalChainNarrowingLost);
    }

    #[test]
    fn test_cast_allowed_in_optional_call_argument() {
        let mut f = Fixture::new();
        let g = f.interner.intern("g");
        let x = f.interner.intern("x");
        let foo = f.interner.intern("Foo");
        let e = Expr::OptionalCall {
            callee: Box::new(Expr::ident(g)),
            args: vec![Expr::narrow(
                NarrowKind::AsCast,
                Expr::ident(x),
                SemanticType::ClassRef(foo),
            )],
        };
        assert_eq!(f.rewrite(&e), "g?.(/** @type {!Foo} */ (x))");
        assert!(f.diagnostics.is_empty());
    }

    #[test]
    fn test_annotated_local_needs_no_cast() {
        let mut f = Fixture::new();
        let x = f.interner.intern("x");
        let foo = f.interner.intern("Foo");
        let init = Expr::narrow(
            NarrowKind::NonNullAssertion,
            Expr::ident(x),
            SemanticType::ClassRef(foo),
        );
        let mut pass = CastPass::new(
            &f.symbols,
            &f.interner,
            &f.options,
            "test.ts",
            &f.line_map,
            &mut f.diagnostics,
        );
        assert_eq!(print_expr(&pass.rewrite_init(&init, true)), "x");
        assert_eq!(
            print_expr(&pass.rewrite_init(&init, false)),
            "/** @type {!Foo} */ (x)"
        );
    }

    #[test]
    fn test_cast_in_member_chain_wraps_minimal_subexpression() {
        let mut f = Fixture::new();
        let x = f.interner.intern("x");
        let y = f.interner.intern("y");
        let foo = f.interner.intern("Foo");
        let e = Expr::member(
            Expr::narrow(
                NarrowKind::AsCast,
                Expr::ident(x),
                SemanticType::ClassRef(foo),
            ),
            y,
        );
        assert_eq!(f.rewrite(&e), "(/** @type {!Foo} */ (x)).y");
    }
}
