//! Diagnostic infrastructure.
//!
//! Every degradation the engine performs (a type it cannot express, a
//! collapsed overload set, a dropped extern) is recorded here rather than
//! silently applied. Diagnostics are position-tagged and carry a stable code
//! so downstream tooling can filter or escalate them.
//!
//! # Components
//!
//! - `Diagnostic` - a single message with location, severity, and code
//! - `DiagnosticBag` - a per-file collection, merged deterministically
//! - `DiagnosticSeverity` - Error, Warning, or Hint
//! - `DiagnosticCode` - stable codes grouped by the error taxonomy:
//!   representation gaps (92xx), conflicts (93xx), structural
//!   impossibilities (94xx), dropped/omitted declarations (95xx)
//! - `FatalError` - the single non-recoverable result of a run

use crate::span::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Severity
// =============================================================================

/// The severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Accepted precision loss, informational only
    Hint = 3,
    /// A degradation that changed the emitted annotation
    Warning = 2,
    /// A condition the engine recovered from but callers should not ignore
    Error = 1,
}

impl DiagnosticSeverity {
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Hint => "hint",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DiagnosticSeverity::Error)
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Codes
// =============================================================================

/// Stable diagnostic codes.
///
/// The numeric values are part of the tool's external contract; add new codes
/// at the end of the relevant block, never renumber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // Representation gaps: construct has no downstream equivalent.
    /// Tuple types have no fixed-length sequence form downstream.
    TupleDegraded = 9201,
    /// A rest parameter whose element shape cannot be expressed.
    RestParameterDegraded = 9202,
    /// Recursive type alias broken with the unknown marker.
    RecursiveTypeAlias = 9203,
    /// Intersection with conflicting or non-record members.
    IntersectionDegraded = 9204,
    /// Multiple overload signatures collapsed into one.
    OverloadsCollapsed = 9205,
    /// Generic alias over unresolved parameters degraded.
    GenericAliasDegraded = 9206,

    // Conflicts: two declarations claim one qualified name incompatibly.
    /// Exported name is both a type and an incompatible value.
    TypeValueConflict = 9301,
    /// Star re-export shadowed by a local declaration of the same name.
    StarExportShadowed = 9302,
    /// Repeated namespace initializer suppressed.
    NamespaceReopened = 9303,

    // Structural impossibilities: member dropped, declaration kept.
    /// Property key cannot be written in the annotation language.
    InexpressiblePropertyKey = 9401,

    // Dropped or omitted declarations.
    /// Extern matching a downstream builtin global was not re-declared.
    BuiltinExternSkipped = 9501,
    /// Quoted module name is not referencable from global scope.
    NonReferencableModuleOmitted = 9502,

    // Accepted precision loss.
    /// Narrowing inside an optional chain was not re-asserted.
    OptionalChainNarrowingLost = 9601,
}

impl DiagnosticCode {
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Default severity for this code.
    pub fn severity(self) -> DiagnosticSeverity {
        match self {
            DiagnosticCode::OptionalChainNarrowingLost | DiagnosticCode::NamespaceReopened => {
                DiagnosticSeverity::Hint
            }
            _ => DiagnosticSeverity::Warning,
        }
    }
}

// =============================================================================
// Diagnostic
// =============================================================================

/// A diagnostic message with location, severity, and stable code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: DiagnosticCode,
    /// File the diagnostic points into.
    pub file: String,
    /// One-based line/column position.
    pub position: Position,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        code: DiagnosticCode,
        file: impl Into<String>,
        position: Position,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            severity: code.severity(),
            code,
            file: file.into(),
            position,
            message: message.into(),
        }
    }

    pub fn with_severity(mut self, severity: DiagnosticSeverity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} CLZ{}: {}",
            self.file,
            self.position,
            self.severity,
            self.code.code(),
            self.message
        )
    }
}

// =============================================================================
// DiagnosticBag
// =============================================================================

/// A collection of diagnostics for one emission unit.
///
/// Bags are per-file during the parallel pass and merged afterwards; `drain`
/// returns the contents in a deterministic order regardless of insertion
/// order.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        DiagnosticBag {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn warning(
        &mut self,
        code: DiagnosticCode,
        file: impl Into<String>,
        position: Position,
        message: impl Into<String>,
    ) {
        self.add(Diagnostic::new(code, file, position, message));
    }

    pub fn error(
        &mut self,
        code: DiagnosticCode,
        file: impl Into<String>,
        position: Position,
        message: impl Into<String>,
    ) {
        self.add(
            Diagnostic::new(code, file, position, message)
                .with_severity(DiagnosticSeverity::Error),
        );
    }

    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Drain into a sorted vector: (file, position, code) order, so merged
    /// output does not depend on file-processing order.
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by(|a, b| {
                (&a.file, a.position, a.code.code()).cmp(&(&b.file, b.position, b.code.code()))
            });
        self.diagnostics
    }
}

// =============================================================================
// FatalError
// =============================================================================

/// A non-recoverable run result. No partial output accompanies it.
#[derive(Debug)]
pub enum FatalError {
    /// The external frontend handed the engine an unusable program.
    InvalidInput(String),
    /// `fatal_warnings` was set and degradations occurred.
    FatalWarnings(Vec<Diagnostic>),
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::InvalidInput(msg) => write!(f, "invalid input program: {}", msg),
            FatalError::FatalWarnings(diags) => write!(
                f,
                "run aborted: {} degradation(s) with fatal warnings enabled",
                diags.len()
            ),
        }
    }
}

impl std::error::Error for FatalError {}
