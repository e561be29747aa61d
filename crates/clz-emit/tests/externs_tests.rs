//! Externs artifact emission: container declarations, overload collapse,
//! builtin collisions, and ordering determinism.

use clz_common::diagnostics::{DiagnosticBag, DiagnosticCode};
use clz_common::{EmitOptions, Interner};
use clz_emit::emit_externs;
use clz_sema::{
    AmbientDecl, AmbientDeclarationTree, AmbientKind, AmbientMember, AmbientSignature,
    FunctionType, Param, SemanticType, SymbolTable,
};

struct Harness {
    interner: Interner,
    symbols: SymbolTable,
    options: EmitOptions,
    diagnostics: DiagnosticBag,
}

impl Harness {
    fn new() -> Self {
        Harness {
            interner: Interner::with_common(),
            symbols: SymbolTable::new(),
            options: EmitOptions::default(),
            diagnostics: DiagnosticBag::new(),
        }
    }

    fn emit(&mut self, tree: &AmbientDeclarationTree) -> String {
        emit_externs(
            tree,
            &self.symbols,
            &self.interner,
            &self.options,
            &mut self.diagnostics,
        )
    }

    fn codes(&self) -> Vec<DiagnosticCode> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }
}

#[test]
fn containers_declared_exactly_once() {
    let mut h = Harness::new();
    let mut tree = AmbientDeclarationTree::new();
    // Two files contribute under the same namespace chain.
    tree.add(AmbientDecl::new(
        "acme.core.A",
        AmbientKind::Variable {
            ty: SemanticType::number(),
        },
        "a.ts",
    ));
    tree.add(AmbientDecl::new(
        "acme.core.B",
        AmbientKind::Variable {
            ty: SemanticType::string(),
        },
        "b.ts",
    ));
    tree.add(AmbientDecl::new("acme", AmbientKind::Namespace, "b.ts"));

    let text = h.emit(&tree);
    assert_eq!(text.matches("var acme = {};").count(), 1);
    assert_eq!(text.matches("acme.core = {};").count(), 1);
    assert!(text.contains("/** @type {number} */\nacme.core.A;"));
    assert!(text.contains("/** @type {string} */\nacme.core.B;"));
}

#[test]
fn class_with_overloads_collapses_to_one_signature() {
    let mut h = Harness::new();
    let a = h.interner.intern("a");
    let b = h.interner.intern("b");
    let count = h.interner.intern("count");
    let mut tree = AmbientDeclarationTree::new();
    tree.add(AmbientDecl::new(
        "acme.Widget",
        AmbientKind::Class {
            ctors: vec![
                AmbientSignature::new(
                    FunctionType::new(
                        vec![Param::required(SemanticType::string())],
                        SemanticType::void(),
                    ),
                    vec![a],
                ),
                AmbientSignature::new(
                    FunctionType::new(
                        vec![
                            Param::required(SemanticType::number()),
                            Param::required(SemanticType::boolean()),
                        ],
                        SemanticType::void(),
                    ),
                    vec![a, b],
                ),
            ],
            members: vec![AmbientMember::new(count, SemanticType::number())],
        },
        "widget.d.ts",
    ));

    let text = h.emit(&tree);
    // Positional union, arity widening to optional, first overload's names.
    assert!(text.contains("@param {(string|number)} a"));
    assert!(text.contains("@param {boolean=} p1"));
    assert!(text.contains("@constructor"));
    assert!(text.contains("acme.Widget = function(a, p1) {};"));
    assert!(text.contains("/** @type {number} */\nacme.Widget.prototype.count;"));
    assert_eq!(h.codes(), vec![DiagnosticCode::OverloadsCollapsed]);
}

#[test]
fn builtin_root_dropped_but_members_attach() {
    let mut h = Harness::new();
    let stack_detail = h.interner.intern("stackDetail");
    let mut tree = AmbientDeclarationTree::new();
    tree.add(AmbientDecl::new(
        "Error",
        AmbientKind::Class {
            ctors: vec![],
            members: vec![AmbientMember::new(stack_detail, SemanticType::string())],
        },
        "patch.d.ts",
    ));

    let text = h.emit(&tree);
    // No re-declaration of the builtin itself.
    assert!(!text.contains("Error = function"));
    assert!(!text.contains("var Error"));
    // The user member still lands on the existing declaration.
    assert!(text.contains("/** @type {string} */\nError.prototype.stackDetail;"));
    assert_eq!(h.codes(), vec![DiagnosticCode::BuiltinExternSkipped]);
}

#[test]
fn quoted_module_omitted_entirely() {
    let mut h = Harness::new();
    let mut tree = AmbientDeclarationTree::new();
    let mut decl = AmbientDecl::new("legacy/impl", AmbientKind::Namespace, "legacy.d.ts");
    decl.quoted_module = true;
    tree.add(decl);

    let text = h.emit(&tree);
    assert!(text.is_empty());
    assert_eq!(h.codes(), vec![DiagnosticCode::NonReferencableModuleOmitted]);
}

#[test]
fn inexpressible_member_dropped_with_marker() {
    let mut h = Harness::new();
    let ok = h.interner.intern("ok");
    let mut bad = AmbientMember::new(h.interner.intern("bad"), SemanticType::number());
    bad.inexpressible_key = Some("[Symbol.iterator]".to_string());
    let mut tree = AmbientDeclarationTree::new();
    tree.add(AmbientDecl::new(
        "acme.Iter",
        AmbientKind::Interface {
            members: vec![AmbientMember::new(ok, SemanticType::number()), bad],
        },
        "iter.d.ts",
    ));

    let text = h.emit(&tree);
    assert!(text.contains("acme.Iter.prototype.ok;"));
    assert!(!text.contains("prototype.bad"));
    assert!(text.contains("// member with inexpressible key [Symbol.iterator] dropped"));
    assert_eq!(h.codes(), vec![DiagnosticCode::InexpressiblePropertyKey]);
}

#[test]
fn output_is_sorted_by_qualified_name_regardless_of_insertion() {
    let mut h = Harness::new();
    let mut forward = AmbientDeclarationTree::new();
    forward.add(AmbientDecl::new(
        "a.First",
        AmbientKind::Variable {
            ty: SemanticType::number(),
        },
        "1.ts",
    ));
    forward.add(AmbientDecl::new(
        "z.Last",
        AmbientKind::Variable {
            ty: SemanticType::number(),
        },
        "2.ts",
    ));
    let mut reversed = AmbientDeclarationTree::new();
    reversed.add(AmbientDecl::new(
        "z.Last",
        AmbientKind::Variable {
            ty: SemanticType::number(),
        },
        "2.ts",
    ));
    reversed.add(AmbientDecl::new(
        "a.First",
        AmbientKind::Variable {
            ty: SemanticType::number(),
        },
        "1.ts",
    ));

    let first = h.emit(&forward);
    let second = h.emit(&reversed);
    assert_eq!(first, second);
    let a_pos = first.find("a.First").expect("a.First emitted");
    let z_pos = first.find("z.Last").expect("z.Last emitted");
    assert!(a_pos < z_pos);
}

#[test]
fn free_function_and_static_member_forms() {
    let mut h = Harness::new();
    let input = h.interner.intern("input");
    let version = h.interner.intern("version");
    let mut tree = AmbientDeclarationTree::new();
    tree.add(AmbientDecl::new(
        "parseThing",
        AmbientKind::Function {
            signatures: vec![AmbientSignature::new(
                FunctionType::new(
                    vec![Param::required(SemanticType::string())],
                    SemanticType::boolean(),
                ),
                vec![input],
            )],
        },
        "globals.d.ts",
    ));
    let mut member = AmbientMember::new(version, SemanticType::string());
    member.is_static = true;
    tree.add(AmbientDecl::new(
        "acme.Widget",
        AmbientKind::Class {
            ctors: vec![],
            members: vec![member],
        },
        "widget.d.ts",
    ));

    let text = h.emit(&tree);
    assert!(text.contains("function parseThing(input) {}"));
    assert!(text.contains("@param {string} input"));
    assert!(text.contains("@return {boolean}"));
    assert!(text.contains("/** @type {string} */\nacme.Widget.version;"));
    assert!(h.diagnostics.is_empty());
}
