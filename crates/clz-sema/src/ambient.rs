//! Ambient (global) declaration aggregation.
//!
//! Declarations marked ambient/global do not belong to any module; they
//! describe pre-existing runtime state and are projected into one flat
//! externs artifact. Contributions arrive from many files, so the tree is an
//! explicit externally-owned aggregation structure with a defined merge
//! order (sorted by qualified name) - output never depends on which file was
//! processed first.

use crate::types::{FunctionType, SemanticType};
use clz_common::span::Position;
use clz_common::Atom;

/// A member of an ambient class or interface.
#[derive(Debug, Clone)]
pub struct AmbientMember {
    pub name: Atom,
    pub ty: SemanticType,
    pub is_static: bool,
    pub optional: bool,
    /// Set when the source key cannot be written as an identifier or string
    /// property downstream (e.g. a computed symbol key). The member is then
    /// dropped with a comment marker instead of being emitted.
    pub inexpressible_key: Option<String>,
}

impl AmbientMember {
    pub fn new(name: Atom, ty: SemanticType) -> Self {
        AmbientMember {
            name,
            ty,
            is_static: false,
            optional: false,
            inexpressible_key: None,
        }
    }
}

/// A callable signature with its source parameter names.
#[derive(Debug, Clone)]
pub struct AmbientSignature {
    pub func: FunctionType,
    pub param_names: Vec<Atom>,
}

impl AmbientSignature {
    pub fn new(func: FunctionType, param_names: Vec<Atom>) -> Self {
        AmbientSignature { func, param_names }
    }
}

/// What an ambient declaration declares at its dotted path.
#[derive(Debug, Clone)]
pub enum AmbientKind {
    /// A pure container segment (`declare namespace a.b`).
    Namespace,
    /// A class: constructor overloads plus members.
    Class {
        ctors: Vec<AmbientSignature>,
        members: Vec<AmbientMember>,
    },
    /// An interface: structural record declaration.
    Interface { members: Vec<AmbientMember> },
    /// A free function, possibly overloaded.
    Function { signatures: Vec<AmbientSignature> },
    /// A global variable.
    Variable { ty: SemanticType },
}

/// One global declaration keyed by dotted path (`a.b.Class`).
#[derive(Debug, Clone)]
pub struct AmbientDecl {
    pub path: String,
    pub kind: AmbientKind,
    /// Contributing file, for diagnostics.
    pub file: String,
    pub position: Position,
    /// True for `declare module "name"` forms with a quoted, non-importable
    /// name; these cannot be referenced from global scope and are omitted
    /// from the artifact.
    pub quoted_module: bool,
}

impl AmbientDecl {
    pub fn new(path: impl Into<String>, kind: AmbientKind, file: impl Into<String>) -> Self {
        AmbientDecl {
            path: path.into(),
            kind,
            file: file.into(),
            position: Position::new(1, 1),
            quoted_module: false,
        }
    }
}

/// The forest of global declarations for one compilation run.
#[derive(Debug, Default)]
pub struct AmbientDeclarationTree {
    decls: Vec<AmbientDecl>,
}

impl AmbientDeclarationTree {
    pub fn new() -> Self {
        AmbientDeclarationTree::default()
    }

    pub fn add(&mut self, decl: AmbientDecl) {
        self.decls.push(decl);
    }

    /// Merge another file's contributions.
    pub fn merge(&mut self, other: AmbientDeclarationTree) {
        self.decls.extend(other.decls);
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Declarations in emission order: sorted by qualified path, stable for
    /// same-path contributions (multiple files reopening one namespace).
    pub fn sorted(&self) -> Vec<&AmbientDecl> {
        let mut out: Vec<&AmbientDecl> = self.decls.iter().collect();
        out.sort_by(|a, b| a.path.cmp(&b.path));
        out
    }
}
