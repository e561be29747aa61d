//! Semantic data model for the closurize annotation engine.
//!
//! Everything in this crate is a derived, read-only view over the typed AST
//! supplied by the external frontend for one whole-program compilation. The
//! entities are rebuilt per run and hold no state across runs:
//!
//! - `SemanticType` - the type descriptors the synthesizer consumes
//! - `Symbol` / `SymbolTable` - declarations with type/value duality
//! - `ModuleGraph` - import/export/re-export relations with typed edges
//! - `AmbientDeclarationTree` - global declarations keyed by dotted path
//! - `ast` - the per-module statement/expression input shape

pub mod types;
pub use types::{FunctionType, Param, PrimitiveKind, RecordField, SemanticType};

pub mod symbols;
pub use symbols::{
    AliasDef, Mutability, Symbol, SymbolFlags, SymbolId, SymbolKind, SymbolTable, ValueBinding,
    Visibility,
};

pub mod module_graph;
pub use module_graph::{DependencyEdge, EdgeKind, ExportEntry, ModuleGraph, ModuleId, ModuleInfo};

pub mod ambient;
pub use ambient::{AmbientDecl, AmbientDeclarationTree, AmbientKind, AmbientMember, AmbientSignature};

pub mod ast;
pub use ast::{
    DeclDetail, DeclStmt, EnumMemberDecl, EnumMemberValue, ExportSpecifier, Expr, ImportBinding,
    ImportDecl, NarrowKind, SourceModule, Stmt,
};
