//! Annotation synthesis and module rewrite engine.
//!
//! Takes the typed-AST view of a program (see `clz-sema`) and emits
//! JavaScript in the downstream checker's conventions:
//!
//! - `jsdoc` - type descriptors to annotation text
//! - `rewrite` - ES-module shape to `goog.module` namespace modules
//! - `externs` - ambient/global declarations to one flat artifact
//! - `casts` - narrowing facts to annotated cast expressions
//! - `pipeline` - the whole-program driver, parallel per file
//!
//! Transforms build `ir` trees; `printer` turns them into text.

pub mod writer;

pub mod ir;
pub use ir::{JsDoc, JsExpr, JsStmt};

pub mod printer;
pub use printer::{print_expr, print_stmts};

pub mod jsdoc;
pub use jsdoc::SynthCtx;

pub mod casts;
pub use casts::CastPass;

pub mod rewrite;
pub use rewrite::{ModuleRewriter, RewriteResult};

pub mod externs;
pub use externs::emit_externs;

pub mod pipeline;
pub use pipeline::{emit_program, EmitOutput, EmittedFile, Program};
