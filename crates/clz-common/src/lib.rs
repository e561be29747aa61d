//! Common types and utilities for the closurize annotation engine.
//!
//! This crate provides the foundational types used across all closurize
//! crates:
//! - String interning (`Atom`, `Interner`)
//! - Source spans and line/column positions (`Span`, `Position`, `LineMap`)
//! - Diagnostics with stable codes (`Diagnostic`, `DiagnosticBag`)
//! - The engine configuration surface (`EmitOptions`)

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Span - source location tracking (byte offsets)
pub mod span;
pub use span::{Position, Span};
pub use span::LineMap;

// Diagnostic infrastructure
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticCode, DiagnosticSeverity};

// Engine configuration
pub mod options;
pub use options::EmitOptions;
