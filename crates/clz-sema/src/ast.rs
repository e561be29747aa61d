//! Typed input AST.
//!
//! This is the shape the external frontend hands the engine per module:
//! import/export declarations, symbol-bearing declarations, and expression
//! statements. Function and class bodies arrive as already-lowered raw
//! JavaScript text - the engine's job is the annotations and the module
//! plumbing around them, not general code generation.

use crate::module_graph::ModuleId;
use crate::symbols::SymbolId;
use crate::types::SemanticType;
use clz_common::span::{LineMap, Position, Span};
use clz_common::Atom;

/// One source module as supplied by the frontend.
#[derive(Debug)]
pub struct SourceModule {
    pub id: ModuleId,
    pub path: String,
    pub statements: Vec<Stmt>,
    /// Line starts of the original source, for span-to-position diagnostics.
    pub line_map: LineMap,
}

impl SourceModule {
    pub fn new(id: ModuleId, path: impl Into<String>) -> Self {
        SourceModule {
            id,
            path: path.into(),
            statements: Vec::new(),
            line_map: LineMap::default(),
        }
    }

    pub fn position(&self, span: Span) -> Position {
        self.line_map.position(span.start)
    }
}

/// A single binding introduced by an import declaration.
#[derive(Debug, Clone)]
pub enum ImportBinding {
    Named {
        imported: Atom,
        local: Atom,
        type_only: bool,
    },
    Default {
        local: Atom,
    },
    Namespace {
        local: Atom,
    },
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub from: ModuleId,
    pub bindings: Vec<ImportBinding>,
    /// `import type { ... }` - the whole declaration is type-only.
    pub type_only: bool,
    pub span: Span,
}

/// One name in an `export { ... }` clause.
#[derive(Debug, Clone, Copy)]
pub struct ExportSpecifier {
    pub local: Atom,
    pub exported: Atom,
    pub type_only: bool,
}

/// Enum member initializer value.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumMemberValue {
    /// Auto-incremented or explicit ordinal.
    Number(i64),
    String(String),
}

#[derive(Debug, Clone)]
pub struct EnumMemberDecl {
    pub name: Atom,
    pub value: EnumMemberValue,
}

/// Kind-specific payload of a declaration statement.
#[derive(Debug)]
pub enum DeclDetail {
    Var {
        declared_type: Option<SemanticType>,
        init: Option<Expr>,
    },
    Function {
        /// Parameter names, positionally matching the symbol's signature.
        params: Vec<Atom>,
        /// Raw lowered body text, braces included.
        body: String,
    },
    Class {
        /// Raw lowered class text starting at the `class` keyword.
        body: String,
    },
    Enum {
        members: Vec<EnumMemberDecl>,
    },
    Namespace {
        members: Vec<DeclStmt>,
    },
    Interface,
    TypeAlias,
}

/// A declaration statement referencing its symbol-table entry.
#[derive(Debug)]
pub struct DeclStmt {
    pub symbol: SymbolId,
    pub exported: bool,
    pub default_export: bool,
    pub detail: DeclDetail,
    pub span: Span,
}

/// Module-level statements.
#[derive(Debug)]
pub enum Stmt {
    Import(ImportDecl),
    /// `import "x";` - load for side effects only.
    SideEffectImport { from: ModuleId, span: Span },
    /// `export { a, b as c }` possibly `from` another module.
    ExportNamed {
        specifiers: Vec<ExportSpecifier>,
        from: Option<ModuleId>,
        span: Span,
    },
    /// `export * from X`
    ExportStar { from: ModuleId, span: Span },
    Decl(DeclStmt),
    Expr { expr: Expr, span: Span },
}

/// The narrowing event kinds the cast pass re-asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrowKind {
    /// `x!`
    NonNullAssertion,
    /// `x as T`
    AsCast,
    /// A property or parameter use narrowed by a preceding guard call.
    GuardedUse,
}

/// Expressions, minimal but closed over what the cast pass rewrites.
#[derive(Debug, Clone)]
pub enum Expr {
    Ident(Atom),
    Member {
        object: Box<Expr>,
        property: Atom,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `a?.b` - casts are never inserted inside these (parenthesizing would
    /// change short-circuit order).
    OptionalMember {
        object: Box<Expr>,
        property: Atom,
    },
    /// `a?.()`
    OptionalCall {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    StringLit(String),
    NumberLit(f64),
    BoolLit(bool),
    NullLit,
    /// A source-level narrowing event with its narrowed-to type.
    Narrow {
        kind: NarrowKind,
        expr: Box<Expr>,
        target: SemanticType,
        span: Span,
    },
    /// Escape hatch for expression forms the engine passes through verbatim.
    Raw(String),
}

impl Expr {
    pub fn ident(name: Atom) -> Self {
        Expr::Ident(name)
    }

    pub fn member(object: Expr, property: Atom) -> Self {
        Expr::Member {
            object: Box::new(object),
            property,
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn narrow(kind: NarrowKind, expr: Expr, target: SemanticType) -> Self {
        Expr::Narrow {
            kind,
            expr: Box::new(expr),
            target,
            span: Span::EMPTY,
        }
    }
}
