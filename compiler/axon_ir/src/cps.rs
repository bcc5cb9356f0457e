//! Continuation-passing-style dialect.
//!
//! Every call is a tail call and the final positional argument is always
//! a continuation; there is no implicit return.

use std::fmt;

use crate::atom::{Atom, Call};
use crate::sexpr::ToSExpression;

/// Expression in continuation-passing style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CpsExpr {
    Atomic(Atom<CpsExpr>),
    Call(Call<CpsExpr>),
}

impl CpsExpr {
    pub fn call(func: Atom<CpsExpr>, args: Vec<Atom<CpsExpr>>) -> Self {
        CpsExpr::Call(Call { func, args })
    }

    pub fn as_atomic(&self) -> Option<&Atom<CpsExpr>> {
        match self {
            CpsExpr::Atomic(atom) => Some(atom),
            CpsExpr::Call(_) => None,
        }
    }
}

impl From<Atom<CpsExpr>> for CpsExpr {
    fn from(atom: Atom<CpsExpr>) -> Self {
        CpsExpr::Atomic(atom)
    }
}

impl From<Call<CpsExpr>> for CpsExpr {
    fn from(call: Call<CpsExpr>) -> Self {
        CpsExpr::Call(call)
    }
}

impl ToSExpression for CpsExpr {
    fn to_s_expression(&self) -> String {
        match self {
            CpsExpr::Atomic(atom) => atom.to_s_expression(),
            CpsExpr::Call(call) => {
                let mut out = format!("({}", call.func.to_s_expression());
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

impl fmt::Display for CpsExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_s_expression())
    }
}
