//! Runtime values for the interpreter frameworks.

use axon_ir::{Lambda, PrimOp};

use crate::env::SharedEnv;

/// Runtime value, generic over the expression dialect `E` and a custom
/// foreign value `C` supplied by the host.
///
/// The core never inspects `Custom` values; attribute access and
/// operator application on them are deferred to the host's method-class
/// layer. Lowering passes reuse this sum with `C` set to their partial
/// continuations.
#[derive(Clone, Debug)]
pub enum Value<E, C> {
    /// Opaque host value.
    Custom(C),
    Int64(i64),
    Str(String),
    Bool(bool),
    Op(PrimOp),
    Closure(Closure<E, C>),
    List(Vec<Value<E, C>>),
}

/// A lambda paired with the lexical environment it was defined in.
///
/// The environment reference is strong; see
/// [`EnvironmentManager`](crate::EnvironmentManager) for the rule that
/// breaks the resulting cycles.
#[derive(Clone, Debug)]
pub struct Closure<E, C> {
    pub lambda: Lambda<E>,
    pub env: SharedEnv<E, C>,
}

impl<E, C> Value<E, C> {
    /// Kind name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Custom(_) => "custom",
            Value::Int64(_) => "int64",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Op(_) => "op",
            Value::Closure(_) => "closure",
            Value::List(_) => "list",
        }
    }
}
