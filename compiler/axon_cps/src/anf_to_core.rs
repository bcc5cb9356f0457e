//! ANF to CoreExpr lowering.
//!
//! Transforms an arbitrary ANF term into a single composed-call tree
//! whose outer atoms are continuation lambdas and whose inner atoms are
//! the original callees. Rules:
//!
//! - literals, variables, and ops lower to eager atoms;
//! - a lambda lowers to an atom whose body is the lowered body applied
//!   to the identity continuation;
//! - a call lowers to `k -> ComposedCall(k, f, args)`;
//! - an `if` wraps its branches in zero-argument thunks and lowers to
//!   `k -> ComposedCall(k, if, [c, thunk_t, thunk_f])`;
//! - a `let` folds its bindings right to left, wrapping each
//!   predecessor's continuation as `lambda x_i. body_i(k)`, with the
//!   body treated as a final binding without a variable;
//! - an eager atom in combined position is coerced through the identity
//!   builtin: `k -> ComposedCall(k, __builtin_identity__, [a])`.

use std::rc::Rc;

use axon_eval::{
    AnfContext, AnfInterpreter, EnvironmentManager, EvalError, EvalResult, SharedEnv, Value,
};
use axon_ir::{
    AnfExpr, Atom, Call, ComposedCall, CoreExpr, If, Lambda, Let, PrimOp, ARGV, BUILTIN_IDENTITY,
    BUILTIN_IF,
};

/// A CoreExpr fragment awaiting the rest of the program: a function from
/// the continuation atom to a concrete composed call.
#[derive(Clone)]
struct LazyCoreExpr(Rc<dyn Fn(Atom<CoreExpr>) -> ComposedCall<CoreExpr>>);

impl LazyCoreExpr {
    fn new(f: impl Fn(Atom<CoreExpr>) -> ComposedCall<CoreExpr> + 'static) -> Self {
        LazyCoreExpr(Rc::new(f))
    }

    fn apply(&self, continuation: Atom<CoreExpr>) -> ComposedCall<CoreExpr> {
        (self.0)(continuation)
    }
}

/// Converter value: an already-lowered CoreExpr or a partial
/// continuation.
#[derive(Clone)]
enum MaybeLazyCoreExpr {
    Eager(CoreExpr),
    Lazy(LazyCoreExpr),
}

type CoreValue = Value<AnfExpr, MaybeLazyCoreExpr>;
type CoreEnv = SharedEnv<AnfExpr, MaybeLazyCoreExpr>;
type CoreItp<'m> = AnfInterpreter<'m, MaybeLazyCoreExpr>;

fn eager_atom(atom: Atom<CoreExpr>) -> CoreValue {
    Value::Custom(MaybeLazyCoreExpr::Eager(CoreExpr::Atomic(atom)))
}

fn lazy_value(lazy: LazyCoreExpr) -> CoreValue {
    Value::Custom(MaybeLazyCoreExpr::Lazy(lazy))
}

/// Unwrap a value produced for an atomic position.
fn into_atom(value: CoreValue) -> EvalResult<Atom<CoreExpr>> {
    match value {
        Value::Custom(MaybeLazyCoreExpr::Eager(CoreExpr::Atomic(atom))) => Ok(atom),
        Value::Custom(MaybeLazyCoreExpr::Eager(_)) => Err(EvalError::invalid_argument(
            "atomic position lowered to a non-atomic core expression",
        )),
        other => Err(EvalError::invalid_argument(format!(
            "atomic position lowered to a {} value instead of a core atom",
            other.kind_name()
        ))),
    }
}

/// Unwrap or coerce a value into a partial continuation. Eager atoms are
/// routed through the identity builtin.
fn into_lazy(value: CoreValue) -> EvalResult<LazyCoreExpr> {
    match value {
        Value::Custom(MaybeLazyCoreExpr::Lazy(lazy)) => Ok(lazy),
        Value::Custom(MaybeLazyCoreExpr::Eager(CoreExpr::Atomic(atom))) => {
            Ok(LazyCoreExpr::new(move |continuation| ComposedCall {
                outer_func: continuation,
                inner_func: Atom::var(BUILTIN_IDENTITY),
                args: vec![atom.clone()],
            }))
        }
        _ => Err(EvalError::invalid_argument(
            "expression lowered to neither a partial continuation nor a core atom",
        )),
    }
}

/// Conversion context. The environment is used only to track variables
/// renamed or rebound during conversion (always variable atoms); free
/// variables keep their names.
struct AnfToCoreConverter;

impl AnfToCoreConverter {
    fn interpret_atom(
        &mut self,
        atom: &Atom<AnfExpr>,
        env: &CoreEnv,
        interpreter: &CoreItp<'_>,
    ) -> EvalResult<Atom<CoreExpr>> {
        let value = interpreter.interpret_atomic(self, atom, env)?;
        into_atom(value)
    }

    fn interpret_combined_lazy(
        &mut self,
        combined: &axon_ir::Combined<AnfExpr>,
        env: &CoreEnv,
        interpreter: &CoreItp<'_>,
    ) -> EvalResult<LazyCoreExpr> {
        match interpreter.interpret_combined(self, combined, env)? {
            Value::Custom(MaybeLazyCoreExpr::Lazy(lazy)) => Ok(lazy),
            _ => Err(EvalError::invalid_argument(
                "combined expression must lower to a partial continuation",
            )),
        }
    }
}

impl AnfContext for AnfToCoreConverter {
    type Custom = MaybeLazyCoreExpr;

    fn interpret_var(&mut self, name: &str, env: &CoreEnv) -> EvalResult<CoreValue> {
        let Some(value) = env.get(name) else {
            // Free variable: lower to a variable of the same name.
            return Ok(eager_atom(Atom::var(name)));
        };
        if matches!(
            &value,
            Value::Custom(MaybeLazyCoreExpr::Eager(CoreExpr::Atomic(Atom::Var(_))))
        ) {
            Ok(value)
        } else {
            Err(EvalError::invalid_argument(format!(
                "conversion-time binding for `{name}` is not a variable atom"
            )))
        }
    }

    fn interpret_bool(&mut self, value: bool, _env: &CoreEnv) -> EvalResult<CoreValue> {
        Ok(eager_atom(Atom::Bool(value)))
    }

    fn interpret_int64(&mut self, value: i64, _env: &CoreEnv) -> EvalResult<CoreValue> {
        Ok(eager_atom(Atom::int64(value)))
    }

    fn interpret_string(&mut self, value: &str, _env: &CoreEnv) -> EvalResult<CoreValue> {
        Ok(eager_atom(Atom::string(value)))
    }

    fn interpret_op(&mut self, op: &PrimOp, _env: &CoreEnv) -> EvalResult<CoreValue> {
        Ok(eager_atom(Atom::Op(op.clone())))
    }

    fn interpret_lambda(
        &mut self,
        lambda: &Lambda<AnfExpr>,
        env: &CoreEnv,
        interpreter: &CoreItp<'_>,
    ) -> EvalResult<CoreValue> {
        let lambda_env = interpreter.new_env(Some(env));
        let body_value = interpreter.interpret(self, &lambda.body, &lambda_env)?;
        let lazy_body = into_lazy(body_value)?;
        let core_body = CoreExpr::from(lazy_body.apply(Atom::var(BUILTIN_IDENTITY)));
        // Source argument names are kept as-is.
        Ok(eager_atom(Atom::lambda(lambda.args.clone(), core_body)))
    }

    fn interpret_call(
        &mut self,
        call: &Call<AnfExpr>,
        env: &CoreEnv,
        interpreter: &CoreItp<'_>,
    ) -> EvalResult<CoreValue> {
        let inner_func = self.interpret_atom(&call.func, env, interpreter)?;
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.interpret_atom(arg, env, interpreter)?);
        }
        Ok(lazy_value(LazyCoreExpr::new(move |continuation| {
            ComposedCall {
                outer_func: continuation,
                inner_func: inner_func.clone(),
                args: args.clone(),
            }
        })))
    }

    fn interpret_if(
        &mut self,
        if_expr: &If<AnfExpr>,
        env: &CoreEnv,
        interpreter: &CoreItp<'_>,
    ) -> EvalResult<CoreValue> {
        let cond = self.interpret_atom(&if_expr.cond, env, interpreter)?;
        // Branches become zero-argument thunks so that lowering the
        // lambdas turns them into atoms.
        let true_thunk = self.interpret_atom(
            &Atom::lambda(vec![], if_expr.true_expr.as_ref().clone()),
            env,
            interpreter,
        )?;
        let false_thunk = self.interpret_atom(
            &Atom::lambda(vec![], if_expr.false_expr.as_ref().clone()),
            env,
            interpreter,
        )?;
        Ok(lazy_value(LazyCoreExpr::new(move |continuation| {
            ComposedCall {
                outer_func: continuation,
                inner_func: Atom::var(BUILTIN_IF),
                args: vec![cond.clone(), true_thunk.clone(), false_thunk.clone()],
            }
        })))
    }

    fn interpret_let(
        &mut self,
        let_expr: &Let<AnfExpr>,
        env: &CoreEnv,
        interpreter: &CoreItp<'_>,
    ) -> EvalResult<CoreValue> {
        let let_env = interpreter.new_env(Some(env));
        let mut names = Vec::with_capacity(let_expr.bindings.len());
        let mut lazies = Vec::with_capacity(let_expr.bindings.len() + 1);
        for binding in &let_expr.bindings {
            names.push(binding.var.clone());
            lazies.push(self.interpret_combined_lazy(&binding.val, &let_env, interpreter)?);
        }
        // The body acts as the last binding, without an associated
        // variable.
        let body_value = interpreter.interpret(self, &let_expr.body, &let_env)?;
        lazies.push(into_lazy(body_value)?);

        Ok(lazy_value(LazyCoreExpr::new(move |continuation| {
            let mut continuation = continuation;
            for i in (1..lazies.len()).rev() {
                let body = CoreExpr::from(lazies[i].apply(continuation));
                continuation = Atom::lambda(vec![names[i - 1].clone()], body);
            }
            lazies[0].apply(continuation)
        })))
    }
}

/// Lower an ANF program to a single CoreExpr.
///
/// The program is evaluated under a root environment binding `ARGV` to
/// the sentinel variable of the same name; the resulting partial
/// continuation is applied to the identity continuation.
pub fn anf_to_core(anf: &AnfExpr) -> EvalResult<CoreExpr> {
    let env_mgr = EnvironmentManager::new();
    let interpreter = AnfInterpreter::new(&env_mgr);
    let mut converter = AnfToCoreConverter;
    let argv = eager_atom(Atom::var(ARGV));
    let result = interpreter.run(&mut converter, anf, argv)?;
    let lazy = into_lazy(result)?;
    let core = CoreExpr::from(lazy.apply(Atom::var(BUILTIN_IDENTITY)));
    tracing::debug!(core = %core, "lowered ANF program to CoreExpr");
    Ok(core)
}
