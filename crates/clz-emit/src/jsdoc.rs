//! Type Expression Synthesizer.
//!
//! Converts a `SemanticType` descriptor into Closure annotation text. The
//! synthesizer is total: every construct the annotation language cannot
//! express maps to the unknown marker `?` plus a position-tagged diagnostic,
//! never a panic or an unparseable string.
//!
//! Alias expansion threads an explicit in-progress set through the calls so
//! recursive aliases are broken at the cycle point rather than detected by
//! stack depth.

use clz_common::diagnostics::{DiagnosticBag, DiagnosticCode};
use clz_common::span::Position;
use clz_common::{Atom, EmitOptions, Interner};
use clz_sema::{FunctionType, SemanticType, SymbolId, SymbolTable};
use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// The unknown marker in the annotation language.
pub const UNKNOWN: &str = "?";

/// One alias expansion frame: the alias's own parameters and the arguments
/// they resolved to at the instantiation site.
struct SubstFrame {
    params: Vec<Atom>,
    args: FxHashMap<Atom, SemanticType>,
}

/// Naming and diagnostic context for one synthesis site.
///
/// One context is built per declaration being emitted; `position` points at
/// that declaration so every degradation diagnostic lands on it.
pub struct SynthCtx<'a> {
    symbols: &'a SymbolTable,
    interner: &'a Interner,
    options: &'a EmitOptions,
    file: &'a str,
    position: Position,
    diagnostics: &'a mut DiagnosticBag,
    /// Alias symbols currently being expanded.
    in_progress: FxHashSet<SymbolId>,
    /// Alias expansion frames, innermost last.
    subst_stack: Vec<SubstFrame>,
}

impl<'a> SynthCtx<'a> {
    pub fn new(
        symbols: &'a SymbolTable,
        interner: &'a Interner,
        options: &'a EmitOptions,
        file: &'a str,
        position: Position,
        diagnostics: &'a mut DiagnosticBag,
    ) -> Self {
        SynthCtx {
            symbols,
            interner,
            options,
            file,
            position,
            diagnostics,
            in_progress: FxHashSet::default(),
            subst_stack: Vec::new(),
        }
    }

    fn degrade(&mut self, code: DiagnosticCode, message: String) -> String {
        self.diagnostics
            .warning(code, self.file, self.position, message);
        UNKNOWN.to_string()
    }

    /// Synthesize the annotation text for a type.
    ///
    /// In untyped mode every call returns `?` and records nothing.
    pub fn synthesize(&mut self, ty: &SemanticType) -> String {
        if !self.options.typed {
            return UNKNOWN.to_string();
        }
        self.synth(ty)
    }

    fn synth(&mut self, ty: &SemanticType) -> String {
        match ty {
            SemanticType::Primitive(kind) => kind.name().to_string(),
            SemanticType::Unknown => UNKNOWN.to_string(),

            SemanticType::Nullable(_) | SemanticType::Optional(_) | SemanticType::Union(_) => {
                let mut members: SmallVec<[String; 4]> = SmallVec::new();
                self.union_members(ty, &mut members);
                match members.len() {
                    0 => UNKNOWN.to_string(),
                    1 => members.into_iter().next().unwrap_or_default(),
                    _ => format!("({})", members.join("|")),
                }
            }

            SemanticType::ClassRef(name) => {
                format!("!{}", self.interner.resolve(*name))
            }
            SemanticType::EnumRef(name) => self.interner.resolve(*name).to_string(),

            SemanticType::Record(fields) => {
                if fields.is_empty() {
                    return "!Object".to_string();
                }
                let mut parts = Vec::with_capacity(fields.len());
                for field in fields {
                    let field_ty = if field.optional {
                        self.synth(&SemanticType::optional(field.ty.clone()))
                    } else {
                        self.synth(&field.ty)
                    };
                    parts.push(format!("{}: {}", self.interner.resolve(field.name), field_ty));
                }
                format!("{{{}}}", parts.join(", "))
            }

            SemanticType::Intersection(members) => self.synth_intersection(members),

            SemanticType::Tuple(_) => {
                self.diagnostics.warning(
                    DiagnosticCode::TupleDegraded,
                    self.file,
                    self.position,
                    "tuple type has no fixed-length sequence form; degraded to !Array<?>",
                );
                "!Array<?>".to_string()
            }

            SemanticType::Function(func) => self.synth_function(func),

            SemanticType::Generic { name, args } => self.synth_generic(*name, args),

            SemanticType::TypeParam(name) => self.synth_type_param(*name),

            // Deliberate exception: strips nullability instead of degrading
            // like other utility aliases.
            SemanticType::NonNullable(inner) => self.synth(&inner.strip_nullish()),

            SemanticType::StringTransform(_) => "string".to_string(),

            SemanticType::This => "THIS".to_string(),
        }
    }

    /// Flatten a union-shaped type into deduplicated member strings in
    /// declared order. Wrapper-contributed `null`/`undefined` land at the
    /// wrapper's position in that order.
    fn union_members(&mut self, ty: &SemanticType, out: &mut SmallVec<[String; 4]>) {
        match ty {
            SemanticType::Union(members) => {
                for member in members {
                    self.union_members(member, out);
                }
            }
            SemanticType::Nullable(inner) => {
                self.union_members(inner, out);
                push_unique(out, "null".to_string());
            }
            SemanticType::Optional(inner) => {
                self.union_members(inner, out);
                push_unique(out, "undefined".to_string());
            }
            other => {
                let text = self.synth(other);
                push_unique(out, text);
            }
        }
    }

    fn synth_intersection(&mut self, members: &[SemanticType]) -> String {
        let mut merged: Vec<(Atom, SemanticType, bool)> = Vec::new();
        for member in members {
            let SemanticType::Record(fields) = member else {
                return self.degrade(
                    DiagnosticCode::IntersectionDegraded,
                    "intersection with a non-record member cannot be merged".to_string(),
                );
            };
            for field in fields {
                match merged.iter().find(|(name, ..)| *name == field.name) {
                    Some((_, existing, _)) if *existing != field.ty => {
                        let name = self.interner.resolve(field.name).to_string();
                        return self.degrade(
                            DiagnosticCode::IntersectionDegraded,
                            format!("intersection members disagree on field '{}'", name),
                        );
                    }
                    Some(_) => {}
                    None => merged.push((field.name, field.ty.clone(), field.optional)),
                }
            }
        }
        let fields = merged
            .into_iter()
            .map(|(name, ty, optional)| clz_sema::RecordField { name, ty, optional })
            .collect();
        self.synth(&SemanticType::Record(fields))
    }

    fn synth_function(&mut self, func: &FunctionType) -> String {
        let mut parts = Vec::with_capacity(func.params.len() + 2);
        if let Some(this_ty) = &func.this_param {
            parts.push(format!("this:{}", self.synth(this_ty)));
        }
        for param in &func.params {
            let mut text = self.synth(&param.ty);
            if param.optional {
                text.push('=');
            }
            parts.push(text);
        }
        if let Some(rest) = &func.rest {
            parts.push(self.synth_rest(rest));
        }
        let returns = self.synth(&func.returns);
        format!("function({}): {}", parts.join(", "), returns)
    }

    fn synth_rest(&mut self, element: &SemanticType) -> String {
        // Variadic tuple shapes have no element type to name.
        if matches!(element, SemanticType::Tuple(_)) {
            self.diagnostics.warning(
                DiagnosticCode::RestParameterDegraded,
                self.file,
                self.position,
                "rest parameter shape cannot be expressed; degraded to ...?",
            );
            return "...?".to_string();
        }
        format!("...{}", self.synth(element))
    }

    fn synth_generic(&mut self, name: Atom, args: &[SemanticType]) -> String {
        if let Some(id) = self.symbols.lookup_type(name) {
            if let Some(def) = self.symbols.alias_def(id) {
                if self.in_progress.contains(&id) {
                    let alias = self.interner.resolve(name).to_string();
                    return self.degrade(
                        DiagnosticCode::RecursiveTypeAlias,
                        format!("type alias '{}' is recursive; broken at the cycle point", alias),
                    );
                }
                let mut resolved = FxHashMap::default();
                for (param, arg) in def.params.iter().zip(args.iter()) {
                    resolved.insert(*param, arg.clone());
                }
                let body = def.body.clone();
                self.in_progress.insert(id);
                self.subst_stack.push(SubstFrame {
                    params: def.params.clone(),
                    args: resolved,
                });
                let text = self.synth(&body);
                self.subst_stack.pop();
                self.in_progress.remove(&id);
                return text;
            }
        }
        // Nominal generic: resolved arguments repeat positionally at every
        // use site.
        let base = self.interner.resolve(name).to_string();
        if args.is_empty() {
            format!("!{}", base)
        } else {
            let args: Vec<String> = args.iter().map(|a| self.synth(a)).collect();
            format!("!{}<{}>", base, args.join(", "))
        }
    }

    fn synth_type_param(&mut self, name: Atom) -> String {
        for frame in self.subst_stack.iter().rev() {
            if let Some(substituted) = frame.args.get(&name) {
                let substituted = substituted.clone();
                return self.synth(&substituted);
            }
        }
        // A name declared by an enclosing alias but given no argument has
        // nothing to print. Any other name is an in-scope class/method
        // template parameter and passes through verbatim.
        if self.subst_stack.iter().any(|f| f.params.contains(&name)) {
            let param = self.interner.resolve(name).to_string();
            self.degrade(
                DiagnosticCode::GenericAliasDegraded,
                format!("generic alias parameter '{}' has no resolved argument", param),
            )
        } else {
            self.interner.resolve(name).to_string()
        }
    }

    /// JSDoc tag lines for a function or method declaration.
    ///
    /// Receiver-returning methods get a dedicated self-type template so
    /// subclass call sites keep the subclass's own type.
    pub fn function_tags(&mut self, func: &FunctionType, param_names: &[Atom]) -> Vec<String> {
        let mut tags = Vec::new();
        let self_typed = func.returns_this();
        if self_typed {
            tags.push("@template THIS".to_string());
            tags.push("@this {!THIS}".to_string());
        } else if let Some(this_ty) = &func.this_param {
            tags.push(format!("@this {{{}}}", self.synthesize(this_ty)));
        }
        for (i, param) in func.params.iter().enumerate() {
            let name = param_names
                .get(i)
                .map(|a| self.interner.resolve(*a).to_string())
                .unwrap_or_else(|| format!("p{}", i));
            let mut ty = self.synthesize(&param.ty);
            if param.optional {
                ty.push('=');
            }
            tags.push(format!("@param {{{}}} {}", ty, name));
        }
        if let Some(rest) = &func.rest {
            let ty = if self.options.typed {
                self.synth_rest(rest)
            } else {
                format!("...{}", UNKNOWN)
            };
            let name = param_names
                .get(func.params.len())
                .map(|a| self.interner.resolve(*a).to_string())
                .unwrap_or_else(|| "rest".to_string());
            tags.push(format!("@param {{{}}} {}", ty, name));
        }
        if self_typed {
            tags.push("@return {!THIS}".to_string());
        } else if func.returns != SemanticType::void() {
            tags.push(format!("@return {{{}}}", self.synthesize(&func.returns)));
        }
        tags
    }
}

fn push_unique(out: &mut SmallVec<[String; 4]>, text: String) {
    if !out.contains(&text) {
        out.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clz_sema::{AliasDef, Param, RecordField, Symbol, SymbolKind};
    use clz_sema::module_graph::ModuleId;

    struct Fixture {
        symbols: SymbolTable,
        interner: Interner,
        options: EmitOptions,
        diagnostics: DiagnosticBag,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                symbols: SymbolTable::new(),
                interner: Interner::with_common(),
                options: EmitOptions::default(),
                diagnostics: DiagnosticBag::new(),
            }
        }

        fn synth(&mut self, ty: &SemanticType) -> String {
            let mut ctx = SynthCtx::new(
                &self.symbols,
                &self.interner,
                &self.options,
                "test.ts",
                Position::new(1, 1),
                &mut self.diagnostics,
            );
            ctx.synthesize(ty)
        }
    }

    #[test]
    fn test_primitives_never_prefixed() {
        let mut f = Fixture::new();
        assert_eq!(f.synth(&SemanticType::string()), "string");
        assert_eq!(f.synth(&SemanticType::number()), "number");
        assert_eq!(f.synth(&SemanticType::boolean()), "boolean");
        assert_eq!(f.synth(&SemanticType::void()), "void");
    }

    #[test]
    fn test_class_ref_is_non_null_by_default() {
        let mut f = Fixture::new();
        let name = f.interner.intern("Widget");
        assert_eq!(f.synth(&SemanticType::ClassRef(name)), "!Widget");
    }

    #[test]
    fn test_nullable_unions_in_null() {
        let mut f = Fixture::new();
        let name = f.interner.intern("Widget");
        let ty = SemanticType::nullable(SemanticType::ClassRef(name));
        assert_eq!(f.synth(&ty), "(!Widget|null)");
    }

    #[test]
    fn test_union_keeps_declared_order_and_dedups() {
        let mut f = Fixture::new();
        let ty = SemanticType::Union(vec![
            SemanticType::string(),
            SemanticType::number(),
            SemanticType::string(),
        ]);
        assert_eq!(f.synth(&ty), "(string|number)");
    }

    #[test]
    fn test_nullable_wrapper_absorbed_into_one_null_member() {
        let mut f = Fixture::new();
        let ty = SemanticType::nullable(SemanticType::Union(vec![
            SemanticType::nullable(SemanticType::string()),
            SemanticType::number(),
        ]));
        assert_eq!(f.synth(&ty), "(string|null|number)");
    }

    #[test]
    fn test_single_member_union_unparenthesized() {
        let mut f = Fixture::new();
        let ty = SemanticType::Union(vec![SemanticType::string(), SemanticType::string()]);
        assert_eq!(f.synth(&ty), "string");
    }

    #[test]
    fn test_record_with_optional_field() {
        let mut f = Fixture::new();
        let a = f.interner.intern("a");
        let b = f.interner.intern("b");
        let ty = SemanticType::Record(vec![
            RecordField::new(a, SemanticType::number()),
            RecordField {
                name: b,
                ty: SemanticType::string(),
                optional: true,
            },
        ]);
        assert_eq!(f.synth(&ty), "{a: number, b: (string|undefined)}");
    }

    #[test]
    fn test_empty_record_is_object() {
        let mut f = Fixture::new();
        assert_eq!(f.synth(&SemanticType::Record(vec![])), "!Object");
    }

    #[test]
    fn test_tuple_degrades_with_diagnostic() {
        let mut f = Fixture::new();
        let ty = SemanticType::Tuple(vec![SemanticType::string(), SemanticType::number()]);
        assert_eq!(f.synth(&ty), "!Array<?>");
        assert_eq!(
            f.diagnostics.iter().next().map(|d| d.code),
            Some(DiagnosticCode::TupleDegraded)
        );
    }

    #[test]
    fn test_intersection_of_records_merges() {
        let mut f = Fixture::new();
        let a = f.interner.intern("a");
        let b = f.interner.intern("b");
        let ty = SemanticType::Intersection(vec![
            SemanticType::Record(vec![RecordField::new(a, SemanticType::number())]),
            SemanticType::Record(vec![RecordField::new(b, SemanticType::string())]),
        ]);
        assert_eq!(f.synth(&ty), "{a: number, b: string}");
        assert!(f.diagnostics.is_empty());
    }

    #[test]
    fn test_conflicting_intersection_degrades() {
        let mut f = Fixture::new();
        let a = f.interner.intern("a");
        let ty = SemanticType::Intersection(vec![
            SemanticType::Record(vec![RecordField::new(a, SemanticType::number())]),
            SemanticType::Record(vec![RecordField::new(a, SemanticType::string())]),
        ]);
        assert_eq!(f.synth(&ty), "?");
        assert_eq!(
            f.diagnostics.iter().next().map(|d| d.code),
            Some(DiagnosticCode::IntersectionDegraded)
        );
    }

    #[test]
    fn test_intersection_with_non_record_degrades() {
        let mut f = Fixture::new();
        let a = f.interner.intern("a");
        let ty = SemanticType::Intersection(vec![
            SemanticType::Record(vec![RecordField::new(a, SemanticType::number())]),
            SemanticType::string(),
        ]);
        assert_eq!(f.synth(&ty), "?");
    }

    #[test]
    fn test_function_with_this_optional_and_rest() {
        let mut f = Fixture::new();
        let widget = f.interner.intern("Widget");
        let func = FunctionType {
            this_param: Some(SemanticType::ClassRef(widget)),
            params: vec![
                Param::required(SemanticType::number()),
                Param::optional(SemanticType::string()),
            ],
            rest: Some(SemanticType::boolean()),
            returns: SemanticType::void(),
        };
        assert_eq!(
            f.synth(&SemanticType::func(func)),
            "function(this:!Widget, number, string=, ...boolean): void"
        );
    }

    #[test]
    fn test_inexpressible_rest_degrades() {
        let mut f = Fixture::new();
        let func = FunctionType {
            this_param: None,
            params: vec![],
            rest: Some(SemanticType::Tuple(vec![SemanticType::string()])),
            returns: SemanticType::void(),
        };
        assert_eq!(f.synth(&SemanticType::func(func)), "function(...?): void");
        assert_eq!(
            f.diagnostics.iter().next().map(|d| d.code),
            Some(DiagnosticCode::RestParameterDegraded)
        );
    }

    #[test]
    fn test_generic_alias_expansion_with_substitution() {
        let mut f = Fixture::new();
        let box_name = f.interner.intern("Box");
        let t = f.interner.intern("T");
        let value = f.interner.intern("value");
        let mut sym = Symbol::new(box_name, SymbolKind::TypeAlias, ModuleId(0));
        sym.type_side = Some(SemanticType::Unknown);
        let id = f.symbols.add(sym);
        f.symbols.define_alias(
            id,
            AliasDef {
                params: vec![t],
                body: SemanticType::Record(vec![RecordField::new(
                    value,
                    SemanticType::TypeParam(t),
                )]),
            },
        );
        let ty = SemanticType::Generic {
            name: box_name,
            args: vec![SemanticType::number()],
        };
        assert_eq!(f.synth(&ty), "{value: number}");
    }

    #[test]
    fn test_recursive_alias_terminates_with_unknown() {
        let mut f = Fixture::new();
        let list = f.interner.intern("List");
        let t = f.interner.intern("T");
        let head = f.interner.intern("head");
        let next = f.interner.intern("next");
        let mut sym = Symbol::new(list, SymbolKind::TypeAlias, ModuleId(0));
        sym.type_side = Some(SemanticType::Unknown);
        let id = f.symbols.add(sym);
        f.symbols.define_alias(
            id,
            AliasDef {
                params: vec![t],
                body: SemanticType::Record(vec![
                    RecordField::new(head, SemanticType::TypeParam(t)),
                    RecordField::new(
                        next,
                        SemanticType::Generic {
                            name: list,
                            args: vec![SemanticType::TypeParam(t)],
                        },
                    ),
                ]),
            },
        );
        let ty = SemanticType::Generic {
            name: list,
            args: vec![SemanticType::number()],
        };
        assert_eq!(f.synth(&ty), "{head: number, next: ?}");
        assert_eq!(
            f.diagnostics.iter().next().map(|d| d.code),
            Some(DiagnosticCode::RecursiveTypeAlias)
        );
    }

    #[test]
    fn test_foreign_template_param_survives_alias_expansion() {
        let mut f = Fixture::new();
        let box_name = f.interner.intern("Box");
        let t = f.interner.intern("T");
        let u = f.interner.intern("U");
        let value = f.interner.intern("value");
        let mut sym = Symbol::new(box_name, SymbolKind::TypeAlias, ModuleId(0));
        sym.type_side = Some(SemanticType::Unknown);
        let id = f.symbols.add(sym);
        f.symbols.define_alias(
            id,
            AliasDef {
                params: vec![t],
                body: SemanticType::Record(vec![RecordField::new(
                    value,
                    SemanticType::TypeParam(t),
                )]),
            },
        );
        let ty = SemanticType::Generic {
            name: box_name,
            args: vec![SemanticType::TypeParam(u)],
        };
        assert_eq!(f.synth(&ty), "{value: U}");
        assert!(f.diagnostics.is_empty());
    }

    #[test]
    fn test_alias_param_without_argument_degrades() {
        let mut f = Fixture::new();
        let pair = f.interner.intern("Pair");
        let a = f.interner.intern("A");
        let b = f.interner.intern("B");
        let first = f.interner.intern("first");
        let second = f.interner.intern("second");
        let mut sym = Symbol::new(pair, SymbolKind::TypeAlias, ModuleId(0));
        sym.type_side = Some(SemanticType::Unknown);
        let id = f.symbols.add(sym);
        f.symbols.define_alias(
            id,
            AliasDef {
                params: vec![a, b],
                body: SemanticType::Record(vec![
                    RecordField::new(first, SemanticType::TypeParam(a)),
                    RecordField::new(second, SemanticType::TypeParam(b)),
                ]),
            },
        );
        let ty = SemanticType::Generic {
            name: pair,
            args: vec![SemanticType::number()],
        };
        assert_eq!(f.synth(&ty), "{first: number, second: ?}");
        assert_eq!(
            f.diagnostics.iter().next().map(|d| d.code),
            Some(DiagnosticCode::GenericAliasDegraded)
        );
    }

    #[test]
    fn test_nominal_generic_repeats_args_positionally() {
        let mut f = Fixture::new();
        let map = f.interner.intern("Map");
        let ty = SemanticType::Generic {
            name: map,
            args: vec![SemanticType::string(), SemanticType::number()],
        };
        assert_eq!(f.synth(&ty), "!Map<string, number>");
    }

    #[test]
    fn test_non_nullable_strips_instead_of_degrading() {
        let mut f = Fixture::new();
        let widget = f.interner.intern("Widget");
        let ty = SemanticType::NonNullable(Box::new(SemanticType::nullable(
            SemanticType::ClassRef(widget),
        )));
        assert_eq!(f.synth(&ty), "!Widget");
        assert!(f.diagnostics.is_empty());
    }

    #[test]
    fn test_string_transform_is_plain_string() {
        let mut f = Fixture::new();
        let ty = SemanticType::StringTransform(Box::new(SemanticType::Union(vec![
            SemanticType::string(),
        ])));
        assert_eq!(f.synth(&ty), "string");
    }

    #[test]
    fn test_untyped_mode_is_always_unknown_and_silent() {
        let mut f = Fixture::new();
        f.options = EmitOptions::untyped();
        let ty = SemanticType::Tuple(vec![SemanticType::string()]);
        assert_eq!(f.synth(&ty), "?");
        assert!(f.diagnostics.is_empty());
    }

    #[test]
    fn test_resynthesis_is_byte_identical() {
        let mut f = Fixture::new();
        let widget = f.interner.intern("Widget");
        let ty = SemanticType::Union(vec![
            SemanticType::nullable(SemanticType::ClassRef(widget)),
            SemanticType::string(),
        ]);
        let first = f.synth(&ty);
        let second = f.synth(&ty);
        assert_eq!(first, second);
    }

    #[test]
    fn test_self_typed_method_gets_this_template() {
        let mut f = Fixture::new();
        let c = f.interner.intern("c");
        let func = FunctionType {
            this_param: None,
            params: vec![Param::required(SemanticType::number())],
            rest: None,
            returns: SemanticType::This,
        };
        let mut ctx = SynthCtx::new(
            &f.symbols,
            &f.interner,
            &f.options,
            "test.ts",
            Position::new(1, 1),
            &mut f.diagnostics,
        );
        let tags = ctx.function_tags(&func, &[c]);
        assert_eq!(
            tags,
            vec![
                "@template THIS",
                "@this {!THIS}",
                "@param {number} c",
                "@return {!THIS}",
            ]
        );
    }
}
