//! Free-form S-expressions and the shared pretty-printer.
//!
//! [`SExpr`] is the portable textual dialect: an atom or a list of
//! S-expressions. The [`ToSExpression`] trait renders any dialect with
//! the same conventions: `(lambda [x y] body)`, `(op name)`, decimal
//! integers, `#t`/`#f` booleans, and double-quoted strings with
//! backslash escaping of `"` and `\`. Output is stable: structurally
//! equal expressions render identically.

use std::fmt;

use crate::atom::Atom;

/// An atom or a list of S-expressions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SExpr {
    Atomic(Atom<SExpr>),
    List(Vec<SExpr>),
}

impl SExpr {
    pub fn list(children: Vec<SExpr>) -> Self {
        SExpr::List(children)
    }
}

impl From<Atom<SExpr>> for SExpr {
    fn from(atom: Atom<SExpr>) -> Self {
        SExpr::Atomic(atom)
    }
}

/// Render as a stable S-expression string.
pub trait ToSExpression {
    fn to_s_expression(&self) -> String;
}

impl<E: ToSExpression> ToSExpression for Atom<E> {
    fn to_s_expression(&self) -> String {
        match self {
            Atom::Var(name) => name.clone(),
            Atom::Bool(true) => "#t".to_string(),
            Atom::Bool(false) => "#f".to_string(),
            Atom::Int64(value) => value.to_string(),
            Atom::Str(value) => quote_string(value),
            Atom::Op(op) => format!("(op {})", op.name),
            Atom::Lambda(lambda) => format!(
                "(lambda [{}] {})",
                lambda.args.join(" "),
                lambda.body.to_s_expression()
            ),
        }
    }
}

impl ToSExpression for SExpr {
    fn to_s_expression(&self) -> String {
        match self {
            SExpr::Atomic(atom) => atom.to_s_expression(),
            SExpr::List(children) => {
                let rendered: Vec<String> = children
                    .iter()
                    .map(ToSExpression::to_s_expression)
                    .collect();
                format!("({})", rendered.join(" "))
            }
        }
    }
}

impl fmt::Display for SExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_s_expression())
    }
}

/// Double-quote `s`, escaping `"` and `\` with a backslash.
fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn atoms_render_with_scheme_conventions() {
        assert_eq!(Atom::<SExpr>::var("x").to_s_expression(), "x");
        assert_eq!(Atom::<SExpr>::Bool(true).to_s_expression(), "#t");
        assert_eq!(Atom::<SExpr>::Bool(false).to_s_expression(), "#f");
        assert_eq!(Atom::<SExpr>::int64(-3).to_s_expression(), "-3");
        assert_eq!(Atom::<SExpr>::string("hi").to_s_expression(), "\"hi\"");
        assert_eq!(Atom::<SExpr>::op("+").to_s_expression(), "(op +)");
    }

    #[test]
    fn strings_escape_quotes_and_backslashes() {
        assert_eq!(
            Atom::<SExpr>::string("a\"b\\c").to_s_expression(),
            "\"a\\\"b\\\\c\""
        );
    }

    #[test]
    fn lambda_renders_bracketed_args() {
        let lambda = Atom::lambda(vec!["x".to_string()], SExpr::from(Atom::var("x")));
        assert_eq!(lambda.to_s_expression(), "(lambda [x] x)");
    }

    #[test]
    fn lists_render_space_separated() {
        let expr = SExpr::list(vec![
            SExpr::from(Atom::op("+")),
            SExpr::from(Atom::var("x")),
            SExpr::from(Atom::int64(1)),
        ]);
        assert_eq!(expr.to_s_expression(), "((op +) x 1)");
        assert_eq!(expr.to_string(), expr.to_s_expression());
    }
}
