//! Printer for the output IR.
//!
//! Walks `JsStmt`/`JsExpr` trees and emits JavaScript text. All formatting
//! decisions live here; the rewriter never concatenates output strings
//! itself.

use crate::ir::{JsDoc, JsExpr, JsStmt};
use crate::writer::CodeWriter;

/// Print a statement list into a single output string.
pub fn print_stmts(stmts: &[JsStmt]) -> String {
    let mut w = CodeWriter::with_capacity(4096);
    for stmt in stmts {
        print_stmt(&mut w, stmt);
    }
    w.into_string()
}

fn print_jsdoc(w: &mut CodeWriter, jsdoc: &JsDoc) {
    if jsdoc.is_single() {
        w.line(&format!("/** {} */", jsdoc.tags[0]));
    } else {
        w.line("/**");
        for tag in &jsdoc.tags {
            w.line(&format!(" * {}", tag));
        }
        w.line(" */");
    }
}

fn print_stmt(w: &mut CodeWriter, stmt: &JsStmt) {
    match stmt {
        JsStmt::GoogModule(ns) => {
            w.line(&format!("goog.module('{}');", ns));
        }
        JsStmt::Require {
            var_name,
            namespace,
            type_only,
        } => {
            let call = if *type_only { "requireType" } else { "require" };
            match var_name {
                Some(name) => w.line(&format!("const {} = goog.{}('{}');", name, call, namespace)),
                None => w.line(&format!("goog.{}('{}');", call, namespace)),
            }
        }
        JsStmt::VarDecl { jsdoc, name, init } => {
            if let Some(doc) = jsdoc {
                print_jsdoc(w, doc);
            }
            match init {
                Some(init) => w.line(&format!("var {} = {};", name, print_expr(init))),
                None => w.line(&format!("var {};", name)),
            }
        }
        JsStmt::ConstDecl { jsdoc, name, init } => {
            if let Some(doc) = jsdoc {
                print_jsdoc(w, doc);
            }
            w.line(&format!("const {} = {};", name, print_expr(init)));
        }
        JsStmt::FunctionDecl {
            jsdoc,
            name,
            params,
            body,
        } => {
            if let Some(doc) = jsdoc {
                print_jsdoc(w, doc);
            }
            w.line(&format!("function {}({}) {}", name, params.join(", "), body));
        }
        JsStmt::Expr { jsdoc, expr } => {
            if let Some(doc) = jsdoc {
                print_jsdoc(w, doc);
            }
            w.line(&format!("{};", print_expr(expr)));
        }
        JsStmt::Typedef { jsdoc, target } => {
            print_jsdoc(w, jsdoc);
            w.line(&format!("{};", print_expr(target)));
        }
        JsStmt::Comment(text) => {
            w.line(&format!("// {}", text));
        }
        JsStmt::Raw(text) => {
            for line in text.lines() {
                w.line(line);
            }
        }
    }
}

/// Print an expression tree.
pub fn print_expr(expr: &JsExpr) -> String {
    match expr {
        JsExpr::Ident(name) => name.clone(),
        JsExpr::Member { object, property } => {
            format!("{}.{}", print_operand(object), property)
        }
        JsExpr::Index { object, index } => {
            format!("{}[{}]", print_operand(object), print_expr(index))
        }
        JsExpr::Call { callee, args } => {
            format!("{}({})", print_operand(callee), print_args(args))
        }
        JsExpr::New { callee, args } => {
            format!("new {}({})", print_operand(callee), print_args(args))
        }
        JsExpr::OptionalMember { object, property } => {
            format!("{}?.{}", print_operand(object), property)
        }
        JsExpr::OptionalCall { callee, args } => {
            format!("{}?.({})", print_operand(callee), print_args(args))
        }
        JsExpr::Assign { target, value } => {
            format!("{} = {}", print_expr(target), print_expr(value))
        }
        JsExpr::String(s) => format!("'{}'", escape_string(s)),
        JsExpr::Number(n) => n.clone(),
        JsExpr::Bool(b) => b.to_string(),
        JsExpr::Null => "null".to_string(),
        JsExpr::Cast { ty, expr } => {
            format!("/** @type {{{}}} */ ({})", ty, print_expr(expr))
        }
        JsExpr::Object(props) => {
            if props.is_empty() {
                "{}".to_string()
            } else {
                let inner: Vec<String> = props
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, print_expr(v)))
                    .collect();
                format!("{{ {} }}", inner.join(", "))
            }
        }
        JsExpr::Raw(text) => text.clone(),
    }
}

/// Print a subexpression in operand position, parenthesizing forms that
/// would otherwise bind wrong under member/call access.
fn print_operand(expr: &JsExpr) -> String {
    match expr {
        JsExpr::Assign { .. } | JsExpr::Cast { .. } | JsExpr::Object(_) => {
            format!("({})", print_expr(expr))
        }
        _ => print_expr(expr),
    }
}

fn print_args(args: &[JsExpr]) -> String {
    args.iter()
        .map(print_expr)
        .collect::<Vec<_>>()
        .join(", ")
}

fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_goog_module_header() {
        let out = print_stmts(&[
            JsStmt::GoogModule("p.a".into()),
            JsStmt::Require {
                var_name: Some("b_1".into()),
                namespace: "p.b".into(),
                type_only: false,
            },
            JsStmt::Require {
                var_name: None,
                namespace: "p.c".into(),
                type_only: true,
            },
        ]);
        assert_eq!(
            out,
            "goog.module('p.a');\nconst b_1 = goog.require('p.b');\ngoog.requireType('p.c');\n"
        );
    }

    #[test]
    fn test_print_cast() {
        let e = JsExpr::cast("!Foo", JsExpr::ident("x"));
        assert_eq!(print_expr(&e), "/** @type {!Foo} */ (x)");
    }

    #[test]
    fn test_cast_in_member_position_is_parenthesized() {
        let e = JsExpr::member(JsExpr::cast("!Foo", JsExpr::ident("x")), "y");
        assert_eq!(print_expr(&e), "(/** @type {!Foo} */ (x)).y");
    }

    #[test]
    fn test_print_multi_tag_jsdoc() {
        let out = print_stmts(&[JsStmt::FunctionDecl {
            jsdoc: Some(JsDoc::new(vec![
                "@param {number} a".into(),
                "@return {string}".into(),
            ])),
            name: "f".into(),
            params: vec!["a".into()],
            body: "{ return String(a); }".into(),
        }]);
        assert_eq!(
            out,
            "/**\n * @param {number} a\n * @return {string}\n */\nfunction f(a) { return String(a); }\n"
        );
    }

    #[test]
    fn test_print_object_and_path() {
        let e = JsExpr::assign(
            JsExpr::path("a.b.c"),
            JsExpr::Object(vec![("RED".into(), JsExpr::number(0))]),
        );
        assert_eq!(print_expr(&e), "a.b.c = { RED: 0 }");
    }

    #[test]
    fn test_optional_chain_printing() {
        let e = JsExpr::OptionalMember {
            object: Box::new(JsExpr::ident("a")),
            property: "b".into(),
        };
        assert_eq!(print_expr(&e), "a?.b");
    }
}
