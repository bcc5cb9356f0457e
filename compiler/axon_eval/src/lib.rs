//! Interpreter framework for the Axon expression IR.
//!
//! The framework owns dispatch and the user context owns semantics: a
//! tree walk over [`AnfExpr`](axon_ir::AnfExpr) or
//! [`CoreExpr`](axon_ir::CoreExpr) delegates each node kind to a
//! context method. Lexically chained environments are created through an
//! [`EnvironmentManager`] whose teardown breaks the reference cycles
//! closures would otherwise keep alive.
//!
//! The interpreter is single-threaded: no operation suspends, there is
//! no trampoline and no parallelism. Evaluation order is strict and
//! left-to-right within argument and binding lists.

mod anf_interpreter;
mod core_interpreter;
mod env;
mod errors;
mod method_class;
mod stack;
mod value;

pub use anf_interpreter::{AnfContext, AnfInterpreter};
pub use core_interpreter::{CoreContext, CoreExprInterpreter};
pub use env::{Environment, EnvironmentManager, Frame, SharedEnv};
pub use errors::{EvalError, EvalResult};
pub use method_class::{AttrGetter, BinaryFunc, MethodClass, MethodClassRegistry, UnaryFunc};
pub use stack::ensure_sufficient_stack;
pub use value::{Closure, Value};
