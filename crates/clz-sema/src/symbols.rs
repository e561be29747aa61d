//! Symbols and the whole-program symbol table.
//!
//! A `Symbol` is one named declaration with its declared type(s), visibility,
//! mutability, and the type/value duality pair. The table doubles as the
//! naming oracle the emitter crates use to turn a `SymbolId` into the fully
//! qualified downstream name.

use crate::module_graph::{ModuleGraph, ModuleId};
use crate::types::SemanticType;
use bitflags::bitflags;
use clz_common::diagnostics::{DiagnosticBag, DiagnosticCode};
use clz_common::span::{Position, Span};
use clz_common::{Atom, Interner};
use rustc_hash::FxHashMap;

/// Unique identifier for a symbol in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const NONE: SymbolId = SymbolId(u32::MAX);

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    Interface,
    Function,
    Enum,
    Namespace,
    Variable,
    TypeAlias,
}

impl SymbolKind {
    /// Whether declarations of this kind exist only in type space.
    pub fn is_type_only(self) -> bool {
        matches!(self, SymbolKind::Interface | SymbolKind::TypeAlias)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mutability {
    Const,
    Readonly,
    #[default]
    Mutable,
}

bitflags! {
    /// Modifier flags on a declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SymbolFlags: u8 {
        const EXPORTED = 1 << 0;
        const AMBIENT = 1 << 1;
        const DEFAULT_EXPORT = 1 << 2;
        /// Lives outside any module (contributes to the externs artifact).
        const GLOBAL = 1 << 3;
    }
}

/// The runtime half of a dual symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueBinding {
    pub kind: SymbolKind,
    pub ty: SemanticType,
}

/// A named declaration.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: Atom,
    pub kind: SymbolKind,
    pub module: ModuleId,
    pub visibility: Visibility,
    pub mutability: Mutability,
    pub flags: SymbolFlags,
    /// Declared type(s); functions may carry one entry per overload.
    pub signatures: Vec<SemanticType>,
    /// The type this name denotes in type position, if any.
    pub type_side: Option<SemanticType>,
    /// The binding this name denotes in value position, if any.
    pub value_side: Option<ValueBinding>,
    pub span: Span,
}

impl Symbol {
    pub fn new(name: Atom, kind: SymbolKind, module: ModuleId) -> Self {
        Symbol {
            name,
            kind,
            module,
            visibility: Visibility::default(),
            mutability: Mutability::default(),
            flags: SymbolFlags::default(),
            signatures: Vec::new(),
            type_side: None,
            value_side: None,
            span: Span::EMPTY,
        }
    }

    pub fn is_exported(&self) -> bool {
        self.flags.contains(SymbolFlags::EXPORTED)
    }

    /// Whether this name simultaneously denotes a type and a runtime value.
    pub fn is_dual(&self) -> bool {
        self.type_side.is_some() && self.value_side.is_some()
    }

    /// The declared type, first overload if several.
    pub fn declared_type(&self) -> &SemanticType {
        self.signatures.first().unwrap_or(&SemanticType::Unknown)
    }
}

/// Body of a type alias, kept separately so the synthesizer can expand alias
/// instantiations with an explicit in-progress set.
#[derive(Debug, Clone)]
pub struct AliasDef {
    pub params: Vec<Atom>,
    pub body: SemanticType,
}

/// Whole-program symbol table and naming oracle.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    /// Module-scoped name lookup.
    by_name: FxHashMap<(ModuleId, Atom), SymbolId>,
    /// Type-name lookup across the program, for alias resolution.
    type_names: FxHashMap<Atom, SymbolId>,
    aliases: FxHashMap<SymbolId, AliasDef>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn add(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.by_name.insert((symbol.module, symbol.name), id);
        if symbol.kind.is_type_only()
            || symbol.type_side.is_some()
            || matches!(symbol.kind, SymbolKind::Class | SymbolKind::Enum)
        {
            self.type_names.entry(symbol.name).or_insert(id);
        }
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.0 as usize)
    }

    pub fn lookup(&self, module: ModuleId, name: Atom) -> Option<SymbolId> {
        self.by_name.get(&(module, name)).copied()
    }

    /// Resolve a name used in type position to its defining symbol.
    pub fn lookup_type(&self, name: Atom) -> Option<SymbolId> {
        self.type_names.get(&name).copied()
    }

    pub fn define_alias(&mut self, id: SymbolId, def: AliasDef) {
        self.aliases.insert(id, def);
    }

    pub fn alias_def(&self, id: SymbolId) -> Option<&AliasDef> {
        self.aliases.get(&id)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Fully qualified downstream name: `<module namespace>.<name>`, or the
    /// bare module namespace for a default export.
    pub fn qualified_name(
        &self,
        id: SymbolId,
        graph: &ModuleGraph,
        interner: &Interner,
    ) -> String {
        let Some(symbol) = self.get(id) else {
            return String::new();
        };
        let ns = graph
            .get_module(symbol.module)
            .map(|m| m.namespace.as_str())
            .unwrap_or("");
        if symbol.flags.contains(SymbolFlags::DEFAULT_EXPORT) {
            // Default exports resolve to the bare qualified name, never a
            // `.default` property hop.
            return ns.to_string();
        }
        let name = interner.resolve(symbol.name);
        if ns.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", ns, name)
        }
    }

    /// Resolve the duality pair for an exported name.
    ///
    /// Precedence table, not first-found lookup:
    /// - class/enum value bindings are the runtime side of their own nominal
    ///   type: both sides survive
    /// - a namespace value merged under a type name survives alongside it
    /// - any other pairing is incompatible: the value side wins the runtime
    ///   binding and the type side degrades to `Unknown` with a conflict
    ///   diagnostic
    pub fn resolve_duality(
        &self,
        id: SymbolId,
        file: &str,
        position: Position,
        interner: &Interner,
        diagnostics: &mut DiagnosticBag,
    ) -> (Option<SemanticType>, Option<ValueBinding>) {
        let Some(symbol) = self.get(id) else {
            return (None, None);
        };
        let type_side = symbol.type_side.clone();
        let value_side = symbol.value_side.clone();
        let (Some(ty), Some(value)) = (&type_side, &value_side) else {
            return (type_side, value_side);
        };

        let compatible = match value.kind {
            SymbolKind::Class => matches!(ty, SemanticType::ClassRef(n) if *n == symbol.name),
            SymbolKind::Enum => matches!(ty, SemanticType::EnumRef(n) if *n == symbol.name),
            SymbolKind::Namespace => true,
            _ => false,
        };
        if compatible {
            (type_side, value_side)
        } else {
            diagnostics.warning(
                DiagnosticCode::TypeValueConflict,
                file,
                position,
                format!(
                    "'{}' denotes both a type and an incompatible value; \
                     the type side degrades to the unknown marker",
                    interner.resolve(symbol.name)
                ),
            );
            (Some(SemanticType::Unknown), value_side)
        }
    }
}
