//! CoreExpr dialect: continuation-passing style in a single call shape.
//!
//! `ComposedCall(outer, inner, args)` means "apply `inner` to `args`,
//! then pass the result to the continuation `outer`". A whole lowered
//! program is one composed call (or a bare atom); nested computation is
//! expressed by the choice of continuation.

use std::fmt;

use crate::atom::Atom;
use crate::sexpr::ToSExpression;

/// `(outer_func (inner_func args...))` with the outer atom understood as
/// a continuation applied to the inner call's result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposedCall<E> {
    /// Continuation receiving the inner call's result. Serialized under
    /// the historic `outter_func` key; see the JSON codec.
    pub outer_func: Atom<E>,
    pub inner_func: Atom<E>,
    pub args: Vec<Atom<E>>,
}

/// Expression in the composed-call core dialect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreExpr {
    Atomic(Atom<CoreExpr>),
    ComposedCall(ComposedCall<CoreExpr>),
}

impl CoreExpr {
    pub fn composed_call(
        outer_func: Atom<CoreExpr>,
        inner_func: Atom<CoreExpr>,
        args: Vec<Atom<CoreExpr>>,
    ) -> Self {
        CoreExpr::ComposedCall(ComposedCall {
            outer_func,
            inner_func,
            args,
        })
    }

    /// The atom, if this expression is a bare atom.
    pub fn as_atomic(&self) -> Option<&Atom<CoreExpr>> {
        match self {
            CoreExpr::Atomic(atom) => Some(atom),
            CoreExpr::ComposedCall(_) => None,
        }
    }

    pub fn into_atomic(self) -> Option<Atom<CoreExpr>> {
        match self {
            CoreExpr::Atomic(atom) => Some(atom),
            CoreExpr::ComposedCall(_) => None,
        }
    }
}

impl From<Atom<CoreExpr>> for CoreExpr {
    fn from(atom: Atom<CoreExpr>) -> Self {
        CoreExpr::Atomic(atom)
    }
}

impl From<ComposedCall<CoreExpr>> for CoreExpr {
    fn from(call: ComposedCall<CoreExpr>) -> Self {
        CoreExpr::ComposedCall(call)
    }
}

impl ToSExpression for CoreExpr {
    fn to_s_expression(&self) -> String {
        match self {
            CoreExpr::Atomic(atom) => atom.to_s_expression(),
            CoreExpr::ComposedCall(call) => {
                let mut out = format!(
                    "({} {}",
                    call.outer_func.to_s_expression(),
                    call.inner_func.to_s_expression()
                );
                for arg in &call.args {
                    out.push(' ');
                    out.push_str(&arg.to_s_expression());
                }
                out.push(')');
                out
            }
        }
    }
}

impl fmt::Display for CoreExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_s_expression())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::BUILTIN_IDENTITY;

    #[test]
    fn composed_call_renders_outer_then_inner_then_args() {
        let expr = CoreExpr::composed_call(
            Atom::var(BUILTIN_IDENTITY),
            Atom::op("+"),
            vec![Atom::var("x"), Atom::int64(1)],
        );
        assert_eq!(
            expr.to_s_expression(),
            "(__builtin_identity__ (op +) x 1)"
        );
    }

    #[test]
    fn nested_lambda_continuation_renders_recursively() {
        let inner = CoreExpr::composed_call(
            Atom::var(BUILTIN_IDENTITY),
            Atom::var(BUILTIN_IDENTITY),
            vec![Atom::var("x")],
        );
        let expr = CoreExpr::composed_call(
            Atom::lambda(vec!["x".to_string()], inner),
            Atom::var("f"),
            vec![Atom::int64(1)],
        );
        assert_eq!(
            expr.to_s_expression(),
            "((lambda [x] (__builtin_identity__ __builtin_identity__ x)) f 1)"
        );
    }

    #[test]
    fn equal_expressions_render_identically() {
        let expr = CoreExpr::composed_call(Atom::var("k"), Atom::var("f"), vec![]);
        assert_eq!(expr.to_s_expression(), expr.clone().to_s_expression());
    }
}
