//! Shared leaf grammar for every expression dialect.
//!
//! An [`Atom`] is a term that may appear in argument position in ANF:
//! variable references, constants, primitive-operator names, and
//! lambdas. The type is generic over the enclosing expression dialect
//! `E`, so the same leaves serve ANF, CoreExpr, CpsExpr, and SExpr.

/// Name of a primitive operator (`+`, `matmul`, ...).
///
/// Primitive ops are opaque to the IR core; the host context decides how
/// to apply one when it appears in operator position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrimOp {
    pub name: String,
}

impl PrimOp {
    pub fn new(name: impl Into<String>) -> Self {
        PrimOp { name: name.into() }
    }
}

/// Anonymous function over the dialect `E`.
///
/// The body is uniquely owned by the lambda; builders never produce
/// shared substructure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lambda<E> {
    /// Ordered argument names.
    pub args: Vec<String>,
    pub body: Box<E>,
}

/// Application of an atomic callee to atomic arguments.
///
/// Serves both the ANF `call` combined form and the uniform CpsExpr call
/// shape (where the final argument is always a continuation).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call<E> {
    pub func: Atom<E>,
    pub args: Vec<Atom<E>>,
}

/// Leaf term shared by every dialect.
///
/// Equality is structural and recursive through lambda bodies. `Var`
/// equality is nominal: two variables are equal exactly when their
/// identifier strings are equal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Atom<E> {
    /// Variable reference, compared by name.
    Var(String),
    Bool(bool),
    Int64(i64),
    Str(String),
    /// Primitive-operator name.
    Op(PrimOp),
    Lambda(Lambda<E>),
}

impl<E> Atom<E> {
    pub fn var(name: impl Into<String>) -> Self {
        Atom::Var(name.into())
    }

    pub fn int64(value: i64) -> Self {
        Atom::Int64(value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Atom::Str(value.into())
    }

    pub fn op(name: impl Into<String>) -> Self {
        Atom::Op(PrimOp::new(name))
    }

    pub fn lambda(args: Vec<String>, body: E) -> Self {
        Atom::Lambda(Lambda {
            args,
            body: Box::new(body),
        })
    }

    /// The variable name, if this atom is a `Var`.
    pub fn as_var(&self) -> Option<&str> {
        match self {
            Atom::Var(name) => Some(name),
            _ => None,
        }
    }
}
