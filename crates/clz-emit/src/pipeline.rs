//! Whole-program emission driver.
//!
//! The frontend's synchronous resolution pass produces a `Program`; after
//! that, per-file rewriting is a pure function of (that file, the shared
//! tables) and runs in parallel. Everything observable in the output is
//! aggregated deterministically afterwards: files sorted by path,
//! diagnostics sorted by (file, position, code), externs sorted by
//! qualified name inside the tree itself.

use crate::externs::emit_externs;
use crate::printer::print_stmts;
use crate::rewrite::ModuleRewriter;
use clz_common::diagnostics::{Diagnostic, DiagnosticBag, DiagnosticSeverity, FatalError};
use clz_common::{EmitOptions, Interner};
use clz_sema::{AmbientDeclarationTree, ModuleGraph, SourceModule, SymbolTable};
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, info};

/// The whole-program input, assembled by the external frontend.
pub struct Program {
    pub modules: Vec<SourceModule>,
    pub symbols: SymbolTable,
    pub graph: ModuleGraph,
    pub ambient: AmbientDeclarationTree,
    pub interner: Interner,
}

/// One rewritten source file.
#[derive(Debug)]
pub struct EmittedFile {
    pub path: String,
    pub text: String,
    /// Namespaces this file must load for side effects or value availability.
    pub force_load: Vec<String>,
    /// Local name to fully qualified downstream name.
    pub resolutions: IndexMap<String, String>,
}

/// The run's complete output.
#[derive(Debug)]
pub struct EmitOutput {
    pub files: Vec<EmittedFile>,
    pub externs: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Rewrite every module and aggregate the externs artifact.
///
/// Returns no partial output on a fatal result: an unusable input program
/// aborts before emission, and `fatal_warnings` discards the emitted text
/// when any degradation warning was recorded.
pub fn emit_program(program: &Program, options: &EmitOptions) -> Result<EmitOutput, FatalError> {
    for module in &program.modules {
        if program.graph.get_module(module.id).is_none() {
            return Err(FatalError::InvalidInput(format!(
                "module '{}' is not registered in the module graph",
                module.path
            )));
        }
    }

    info!(modules = program.modules.len(), "starting emission");

    let per_file: Vec<(EmittedFile, DiagnosticBag)> = program
        .modules
        .par_iter()
        .map(|module| {
            let mut bag = DiagnosticBag::new();
            let rewriter = ModuleRewriter::new(
                module,
                &program.symbols,
                &program.graph,
                &program.interner,
                options,
                &mut bag,
            );
            let result = rewriter.rewrite();
            let file = EmittedFile {
                path: module.path.clone(),
                text: print_stmts(&result.statements),
                force_load: result.force_load,
                resolutions: result.resolutions,
            };
            (file, bag)
        })
        .collect();

    let mut diagnostics = DiagnosticBag::new();
    let mut files = Vec::with_capacity(per_file.len());
    for (file, bag) in per_file {
        diagnostics.extend(bag);
        files.push(file);
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let externs = if options.externs_output && !program.ambient.is_empty() {
        let text = emit_externs(
            &program.ambient,
            &program.symbols,
            &program.interner,
            options,
            &mut diagnostics,
        );
        Some(text)
    } else {
        None
    };

    let diagnostics = diagnostics.into_sorted();
    debug!(
        files = files.len(),
        diagnostics = diagnostics.len(),
        "emission finished"
    );

    if options.fatal_warnings {
        let degradations: Vec<Diagnostic> = diagnostics
            .iter()
            .filter(|d| d.severity <= DiagnosticSeverity::Warning)
            .cloned()
            .collect();
        if !degradations.is_empty() {
            return Err(FatalError::FatalWarnings(degradations));
        }
    }

    Ok(EmitOutput {
        files,
        externs,
        diagnostics,
    })
}
