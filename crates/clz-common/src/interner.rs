//! String interner for identifier deduplication.
//!
//! Identifier and qualified-name strings repeat heavily across a program
//! (member names, namespace segments, `exports`, builtin globals). Interning
//! them into a pool and passing around `Atom` handles makes comparisons O(1)
//! integer compares and removes duplicate allocations.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with `==` in
/// O(1). To get the actual string, use `Interner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// Sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Identifiers that show up in virtually every rewritten module. Pre-interned
/// so that the engine's own emitted names hit the fast path.
const COMMON_STRINGS: &[&str] = &[
    "exports",
    "goog",
    "module",
    "require",
    "requireType",
    "default",
    "prototype",
    "constructor",
    "this",
    "null",
    "undefined",
    "string",
    "number",
    "boolean",
    "symbol",
    "void",
    "Array",
    "Object",
    "Function",
    "Error",
    "Promise",
    "Map",
    "Set",
    "freeze",
    "name",
    "value",
    "length",
];

/// String interner that deduplicates strings and returns `Atom` handles.
///
/// # Example
/// ```
/// use clz_common::interner::Interner;
/// let mut interner = Interner::new();
/// let a1 = interner.intern("exports");
/// let a2 = interner.intern("exports");
/// assert_eq!(a1, a2);
/// assert_eq!(interner.resolve(a1), "exports");
/// ```
#[derive(Default)]
pub struct Interner {
    /// Map from string to atom index
    map: FxHashMap<Arc<str>, Atom>,
    /// Vector of all interned strings (index 0 is the empty string)
    strings: Vec<Arc<str>>,
}

impl Interner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut interner = Interner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        let empty: Arc<str> = Arc::from("");
        interner.strings.push(empty.clone());
        interner.map.insert(empty, Atom::NONE);
        interner
    }

    /// Create an interner with the common emitted identifiers pre-interned.
    pub fn with_common() -> Self {
        let mut interner = Self::new();
        for s in COMMON_STRINGS {
            interner.intern(s);
        }
        interner
    }

    /// Intern a string, returning its `Atom` handle.
    /// If the string was already interned, returns the existing atom.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s);
        self.strings.push(owned.clone());
        self.map.insert(owned, atom);
        atom
    }

    /// Resolve an atom back to its string value.
    /// Returns the empty string if the atom is out of bounds (error recovery).
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.strings
            .get(atom.0 as usize)
            .map(|s| s.as_ref())
            .unwrap_or("")
    }

    /// Try to resolve an atom, returning `None` if invalid.
    #[inline]
    pub fn try_resolve(&self, atom: Atom) -> Option<&str> {
        self.strings.get(atom.0 as usize).map(|s| s.as_ref())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        let c = interner.intern("bar");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "foo");
        assert_eq!(interner.resolve(c), "bar");
    }

    #[test]
    fn test_empty_atom() {
        let mut interner = Interner::new();
        assert_eq!(interner.intern(""), Atom::NONE);
        assert_eq!(interner.resolve(Atom::NONE), "");
        assert!(Atom::NONE.is_none());
    }

    #[test]
    fn test_out_of_bounds_resolve() {
        let interner = Interner::new();
        assert_eq!(interner.resolve(Atom(9999)), "");
        assert!(interner.try_resolve(Atom(9999)).is_none());
    }

    #[test]
    fn test_with_common() {
        let interner = Interner::with_common();
        assert!(!interner.is_empty());
    }
}
