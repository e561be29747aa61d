//! Semantic type descriptors.
//!
//! `SemanticType` is the tagged descriptor the frontend resolves for every
//! declaration and the synthesizer turns into annotation text. The shape is
//! deliberately closed: constructs the downstream type language cannot
//! express at all arrive here already as `Unknown`, everything else keeps
//! enough structure for the synthesizer to make its own degradation call.

use clz_common::Atom;
use serde::Serialize;

/// Primitive kinds. Never prefixed with a nullability sigil downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Symbol,
    Void,
    Null,
    Undefined,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Symbol => "symbol",
            PrimitiveKind::Void => "void",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Undefined => "undefined",
        }
    }
}

/// A named field of a record/object-literal type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordField {
    pub name: Atom,
    pub ty: SemanticType,
    pub optional: bool,
}

impl RecordField {
    pub fn new(name: Atom, ty: SemanticType) -> Self {
        RecordField {
            name,
            ty,
            optional: false,
        }
    }
}

/// A function parameter type with its optionality.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Param {
    pub ty: SemanticType,
    pub optional: bool,
}

impl Param {
    pub fn required(ty: SemanticType) -> Self {
        Param {
            ty,
            optional: false,
        }
    }

    pub fn optional(ty: SemanticType) -> Self {
        Param { ty, optional: true }
    }
}

/// A function/method type: receiver, positional parameters, rest, return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FunctionType {
    /// Explicit receiver type. Synthesized as a bound-this annotation,
    /// never as a positional parameter.
    pub this_param: Option<SemanticType>,
    pub params: Vec<Param>,
    pub rest: Option<SemanticType>,
    pub returns: SemanticType,
}

impl FunctionType {
    pub fn new(params: Vec<Param>, returns: SemanticType) -> Self {
        FunctionType {
            this_param: None,
            params,
            rest: None,
            returns,
        }
    }

    /// Whether the return type is the receiver's own type.
    pub fn returns_this(&self) -> bool {
        matches!(self.returns, SemanticType::This)
    }
}

/// A semantic type descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SemanticType {
    Primitive(PrimitiveKind),
    /// `T | null`
    Nullable(Box<SemanticType>),
    /// `T | undefined`
    Optional(Box<SemanticType>),
    /// Declared-order union of two or more constituents.
    Union(Vec<SemanticType>),
    /// Only expressible downstream as a merged record; degrades otherwise.
    Intersection(Vec<SemanticType>),
    /// No fixed-length sequence construct downstream; degrades.
    Tuple(Vec<SemanticType>),
    Function(Box<FunctionType>),
    /// Instantiation of a named generic (class, interface, builtin, alias).
    Generic { name: Atom, args: Vec<SemanticType> },
    /// Structural object literal type.
    Record(Vec<RecordField>),
    EnumRef(Atom),
    ClassRef(Atom),
    /// Reference to an in-scope template parameter.
    TypeParam(Atom),
    /// Utility transform stripping nullability from its argument. Kept as a
    /// distinct node so the synthesizer can special-case it instead of
    /// degrading like other generic aliases.
    NonNullable(Box<SemanticType>),
    /// Uppercase/Lowercase-style string literal operators.
    StringTransform(Box<SemanticType>),
    /// The receiver's own type in a method signature.
    This,
    /// The explicit downstream unknown marker.
    Unknown,
}

impl SemanticType {
    pub fn string() -> Self {
        SemanticType::Primitive(PrimitiveKind::String)
    }

    pub fn number() -> Self {
        SemanticType::Primitive(PrimitiveKind::Number)
    }

    pub fn boolean() -> Self {
        SemanticType::Primitive(PrimitiveKind::Boolean)
    }

    pub fn void() -> Self {
        SemanticType::Primitive(PrimitiveKind::Void)
    }

    pub fn null() -> Self {
        SemanticType::Primitive(PrimitiveKind::Null)
    }

    pub fn undefined() -> Self {
        SemanticType::Primitive(PrimitiveKind::Undefined)
    }

    pub fn nullable(inner: SemanticType) -> Self {
        SemanticType::Nullable(Box::new(inner))
    }

    pub fn optional(inner: SemanticType) -> Self {
        SemanticType::Optional(Box::new(inner))
    }

    pub fn func(f: FunctionType) -> Self {
        SemanticType::Function(Box::new(f))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, SemanticType::Primitive(_))
    }

    pub fn is_record(&self) -> bool {
        matches!(self, SemanticType::Record(_))
    }

    /// Whether a cast through this type carries no information: the unknown
    /// marker or the empty object type. Aliases to these are resolved by the
    /// caller before asking.
    pub fn is_erased(&self) -> bool {
        match self {
            SemanticType::Unknown => true,
            SemanticType::Record(fields) => fields.is_empty(),
            _ => false,
        }
    }

    /// Strip `null`/`undefined` from this type: unwrap nullable/optional
    /// wrappers and drop nullish union members. Used by the NonNullable
    /// special case.
    pub fn strip_nullish(&self) -> SemanticType {
        match self {
            SemanticType::Nullable(inner) | SemanticType::Optional(inner) => inner.strip_nullish(),
            SemanticType::Union(members) => {
                let kept: Vec<SemanticType> = members
                    .iter()
                    .filter(|m| {
                        !matches!(
                            m,
                            SemanticType::Primitive(PrimitiveKind::Null)
                                | SemanticType::Primitive(PrimitiveKind::Undefined)
                        )
                    })
                    .map(|m| m.strip_nullish())
                    .collect();
                match kept.len() {
                    0 => SemanticType::Unknown,
                    1 => kept.into_iter().next().unwrap_or(SemanticType::Unknown),
                    _ => SemanticType::Union(kept),
                }
            }
            SemanticType::NonNullable(inner) => inner.strip_nullish(),
            other => other.clone(),
        }
    }
}
