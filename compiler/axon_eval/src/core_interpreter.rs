//! Visitor framework over CoreExpr.
//!
//! Same shape as the ANF framework: the interpreter owns dispatch, a
//! [`CoreContext`] owns semantics. Composed-call nodes dispatch to
//! `interpret_composed_call` with the node itself.

use axon_ir::{Atom, ComposedCall, CoreExpr, Lambda, PrimOp, ARGV};

use crate::env::{EnvironmentManager, SharedEnv};
use crate::errors::EvalResult;
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;

/// User-supplied semantics for interpreting CoreExpr.
pub trait CoreContext {
    /// Custom foreign value injected at interpreter boundaries.
    type Custom: Clone;

    fn interpret_var(
        &mut self,
        name: &str,
        env: &SharedEnv<CoreExpr, Self::Custom>,
    ) -> EvalResult<Value<CoreExpr, Self::Custom>>;

    fn interpret_bool(
        &mut self,
        value: bool,
        env: &SharedEnv<CoreExpr, Self::Custom>,
    ) -> EvalResult<Value<CoreExpr, Self::Custom>>;

    fn interpret_int64(
        &mut self,
        value: i64,
        env: &SharedEnv<CoreExpr, Self::Custom>,
    ) -> EvalResult<Value<CoreExpr, Self::Custom>>;

    fn interpret_string(
        &mut self,
        value: &str,
        env: &SharedEnv<CoreExpr, Self::Custom>,
    ) -> EvalResult<Value<CoreExpr, Self::Custom>>;

    fn interpret_op(
        &mut self,
        op: &PrimOp,
        env: &SharedEnv<CoreExpr, Self::Custom>,
    ) -> EvalResult<Value<CoreExpr, Self::Custom>>;

    fn interpret_lambda(
        &mut self,
        lambda: &Lambda<CoreExpr>,
        env: &SharedEnv<CoreExpr, Self::Custom>,
        interpreter: &CoreExprInterpreter<'_, Self::Custom>,
    ) -> EvalResult<Value<CoreExpr, Self::Custom>>;

    fn interpret_composed_call(
        &mut self,
        call: &ComposedCall<CoreExpr>,
        env: &SharedEnv<CoreExpr, Self::Custom>,
        interpreter: &CoreExprInterpreter<'_, Self::Custom>,
    ) -> EvalResult<Value<CoreExpr, Self::Custom>>;
}

/// Dispatch-only tree walker over [`CoreExpr`].
pub struct CoreExprInterpreter<'m, C> {
    env_mgr: &'m EnvironmentManager<CoreExpr, C>,
}

impl<'m, Cu: Clone> CoreExprInterpreter<'m, Cu> {
    pub fn new(env_mgr: &'m EnvironmentManager<CoreExpr, Cu>) -> Self {
        CoreExprInterpreter { env_mgr }
    }

    /// Create a child environment through the manager.
    pub fn new_env(&self, parent: Option<&SharedEnv<CoreExpr, Cu>>) -> SharedEnv<CoreExpr, Cu> {
        self.env_mgr.new_env(parent)
    }

    /// Entry point: evaluate `expr` in a fresh root environment with the
    /// reserved name `ARGV` bound to `argv`.
    pub fn run<C>(
        &self,
        ctx: &mut C,
        expr: &CoreExpr,
        argv: Value<CoreExpr, Cu>,
    ) -> EvalResult<Value<CoreExpr, Cu>>
    where
        C: CoreContext<Custom = Cu>,
    {
        let env = self.new_env(None);
        env.set(ARGV, argv);
        self.interpret(ctx, expr, &env)
    }

    pub fn interpret<C>(
        &self,
        ctx: &mut C,
        expr: &CoreExpr,
        env: &SharedEnv<CoreExpr, Cu>,
    ) -> EvalResult<Value<CoreExpr, Cu>>
    where
        C: CoreContext<Custom = Cu>,
    {
        ensure_sufficient_stack(|| match expr {
            CoreExpr::Atomic(atom) => self.interpret_atomic(ctx, atom, env),
            CoreExpr::ComposedCall(call) => ctx.interpret_composed_call(call, env, self),
        })
    }

    pub fn interpret_atomic<C>(
        &self,
        ctx: &mut C,
        atom: &Atom<CoreExpr>,
        env: &SharedEnv<CoreExpr, Cu>,
    ) -> EvalResult<Value<CoreExpr, Cu>>
    where
        C: CoreContext<Custom = Cu>,
    {
        match atom {
            Atom::Var(name) => ctx.interpret_var(name, env),
            Atom::Bool(value) => ctx.interpret_bool(*value, env),
            Atom::Int64(value) => ctx.interpret_int64(*value, env),
            Atom::Str(value) => ctx.interpret_string(value, env),
            Atom::Op(op) => ctx.interpret_op(op, env),
            Atom::Lambda(lambda) => ctx.interpret_lambda(lambda, env, self),
        }
    }
}

#[cfg(test)]
mod tests {
    use axon_ir::{Atom, ComposedCall, CoreExpr};
    use pretty_assertions::assert_eq;

    use super::*;

    /// Context that records which composed call it was handed.
    struct Recorder {
        seen: Vec<ComposedCall<CoreExpr>>,
    }

    type V = Value<CoreExpr, ()>;
    type Env = SharedEnv<CoreExpr, ()>;

    impl CoreContext for Recorder {
        type Custom = ();

        fn interpret_var(&mut self, name: &str, _env: &Env) -> EvalResult<V> {
            Ok(Value::Str(name.to_string()))
        }

        fn interpret_bool(&mut self, value: bool, _env: &Env) -> EvalResult<V> {
            Ok(Value::Bool(value))
        }

        fn interpret_int64(&mut self, value: i64, _env: &Env) -> EvalResult<V> {
            Ok(Value::Int64(value))
        }

        fn interpret_string(&mut self, value: &str, _env: &Env) -> EvalResult<V> {
            Ok(Value::Str(value.to_string()))
        }

        fn interpret_op(&mut self, op: &axon_ir::PrimOp, _env: &Env) -> EvalResult<V> {
            Ok(Value::Op(op.clone()))
        }

        fn interpret_lambda(
            &mut self,
            _lambda: &axon_ir::Lambda<CoreExpr>,
            _env: &Env,
            _interpreter: &CoreExprInterpreter<'_, ()>,
        ) -> EvalResult<V> {
            Ok(Value::Bool(false))
        }

        fn interpret_composed_call(
            &mut self,
            call: &ComposedCall<CoreExpr>,
            _env: &Env,
            _interpreter: &CoreExprInterpreter<'_, ()>,
        ) -> EvalResult<V> {
            self.seen.push(call.clone());
            Ok(Value::Int64(call.args.len() as i64))
        }
    }

    #[test]
    fn composed_calls_dispatch_with_the_node_itself() {
        let call = ComposedCall {
            outer_func: Atom::var("k"),
            inner_func: Atom::var("f"),
            args: vec![Atom::int64(1), Atom::int64(2)],
        };
        let expr = CoreExpr::ComposedCall(call.clone());

        let env_mgr = EnvironmentManager::new();
        let interpreter = CoreExprInterpreter::new(&env_mgr);
        let mut ctx = Recorder { seen: Vec::new() };
        let result = interpreter.run(&mut ctx, &expr, Value::Int64(0));

        assert!(matches!(result, Ok(Value::Int64(2))));
        assert_eq!(ctx.seen, vec![call]);
    }

    #[test]
    fn atoms_dispatch_to_the_matching_method() {
        let env_mgr = EnvironmentManager::new();
        let interpreter = CoreExprInterpreter::new(&env_mgr);
        let mut ctx = Recorder { seen: Vec::new() };

        let result = interpreter.run(&mut ctx, &CoreExpr::from(Atom::int64(5)), Value::Int64(0));
        assert!(matches!(result, Ok(Value::Int64(5))));
        assert!(ctx.seen.is_empty());
    }
}
