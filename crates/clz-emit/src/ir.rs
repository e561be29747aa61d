//! Output IR for rewritten JavaScript.
//!
//! The rewriter and cast pass produce these trees instead of strings; the
//! printer walks them and emits text. This keeps transform logic testable
//! independently of formatting and lets the printer attach JSDoc blocks
//! consistently.

/// A JSDoc block: tag lines without the comment delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsDoc {
    pub tags: Vec<String>,
}

impl JsDoc {
    pub fn new(tags: Vec<String>) -> Self {
        JsDoc { tags }
    }

    /// `@type {T}`
    pub fn type_tag(ty: impl Into<String>) -> Self {
        JsDoc {
            tags: vec![format!("@type {{{}}}", ty.into())],
        }
    }

    /// `@const` or `@const {T}`
    pub fn const_tag(ty: Option<&str>) -> Self {
        let tag = match ty {
            Some(t) => format!("@const {{{}}}", t),
            None => "@const".to_string(),
        };
        JsDoc { tags: vec![tag] }
    }

    /// `@typedef {T}`
    pub fn typedef(ty: impl Into<String>) -> Self {
        JsDoc {
            tags: vec![format!("@typedef {{{}}}", ty.into())],
        }
    }

    /// `@enum {T}`
    pub fn enum_tag(ty: impl Into<String>) -> Self {
        JsDoc {
            tags: vec![format!("@enum {{{}}}", ty.into())],
        }
    }

    pub fn push(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
    }

    pub fn is_single(&self) -> bool {
        self.tags.len() == 1
    }
}

/// Expressions in the rewritten output.
#[derive(Debug, Clone, PartialEq)]
pub enum JsExpr {
    Ident(String),
    Member {
        object: Box<JsExpr>,
        property: String,
    },
    Index {
        object: Box<JsExpr>,
        index: Box<JsExpr>,
    },
    Call {
        callee: Box<JsExpr>,
        args: Vec<JsExpr>,
    },
    New {
        callee: Box<JsExpr>,
        args: Vec<JsExpr>,
    },
    OptionalMember {
        object: Box<JsExpr>,
        property: String,
    },
    OptionalCall {
        callee: Box<JsExpr>,
        args: Vec<JsExpr>,
    },
    Assign {
        target: Box<JsExpr>,
        value: Box<JsExpr>,
    },
    String(String),
    Number(String),
    Bool(bool),
    Null,
    /// An annotated cast: `/** @type {T} */ (expr)`.
    Cast {
        ty: String,
        expr: Box<JsExpr>,
    },
    /// `{ key: value, ... }`
    Object(Vec<(String, JsExpr)>),
    Raw(String),
}

impl JsExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        JsExpr::Ident(name.into())
    }

    pub fn member(object: JsExpr, property: impl Into<String>) -> Self {
        JsExpr::Member {
            object: Box::new(object),
            property: property.into(),
        }
    }

    /// Build a dotted path expression: `a.b.c`.
    pub fn path(qualified: &str) -> Self {
        let mut parts = qualified.split('.');
        let mut expr = JsExpr::ident(parts.next().unwrap_or_default());
        for part in parts {
            expr = JsExpr::member(expr, part);
        }
        expr
    }

    pub fn call(callee: JsExpr, args: Vec<JsExpr>) -> Self {
        JsExpr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn assign(target: JsExpr, value: JsExpr) -> Self {
        JsExpr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn string(s: impl Into<String>) -> Self {
        JsExpr::String(s.into())
    }

    pub fn number(n: i64) -> Self {
        JsExpr::Number(n.to_string())
    }

    pub fn cast(ty: impl Into<String>, expr: JsExpr) -> Self {
        JsExpr::Cast {
            ty: ty.into(),
            expr: Box::new(expr),
        }
    }

    pub fn index(object: JsExpr, index: JsExpr) -> Self {
        JsExpr::Index {
            object: Box::new(object),
            index: Box::new(index),
        }
    }
}

/// Statements in the rewritten output.
#[derive(Debug, Clone, PartialEq)]
pub enum JsStmt {
    /// `goog.module('ns');`
    GoogModule(String),
    /// `const name = goog.require('ns');`, `goog.requireType('ns');`, or a
    /// bare `goog.require('ns');` force-load when `var_name` is None.
    Require {
        var_name: Option<String>,
        namespace: String,
        type_only: bool,
    },
    /// `var name = init;` with an optional JSDoc block.
    VarDecl {
        jsdoc: Option<JsDoc>,
        name: String,
        init: Option<JsExpr>,
    },
    /// `const name = init;`
    ConstDecl {
        jsdoc: Option<JsDoc>,
        name: String,
        init: JsExpr,
    },
    /// `function name(params) { ... }` with raw body text.
    FunctionDecl {
        jsdoc: Option<JsDoc>,
        name: String,
        params: Vec<String>,
        body: String,
    },
    /// An expression statement, optionally JSDoc-annotated.
    Expr {
        jsdoc: Option<JsDoc>,
        expr: JsExpr,
    },
    /// `/** @typedef {...} */ target;` - declares a type name without a
    /// runtime binding.
    Typedef { jsdoc: JsDoc, target: JsExpr },
    Comment(String),
    Raw(String),
}

impl JsStmt {
    pub fn expr(expr: JsExpr) -> Self {
        JsStmt::Expr { jsdoc: None, expr }
    }

    pub fn annotated(jsdoc: JsDoc, expr: JsExpr) -> Self {
        JsStmt::Expr {
            jsdoc: Some(jsdoc),
            expr,
        }
    }
}
