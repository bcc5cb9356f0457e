//! ANF to CpsExpr lowering.
//!
//! Analogous to the CoreExpr pass, but the target has a uniform call
//! shape `f(args..., k)`: every source lambda gains a fresh continuation
//! parameter (prefix `k`, monotonic counter), calls append the current
//! continuation as their final argument, `if` becomes
//! `if(c, thunk_t, thunk_f, k)`, and the top-level program is wrapped in
//! `lambda [return] body`.

use std::rc::Rc;

use axon_eval::{
    AnfContext, AnfInterpreter, EnvironmentManager, EvalError, EvalResult, SharedEnv, Value,
};
use axon_ir::{
    AnfExpr, Atom, Call, CpsExpr, If, Lambda, Let, NameGenerator, PrimOp, ARGV, BUILTIN_IDENTITY,
    BUILTIN_IF, RETURN_CONTINUATION,
};

/// A CpsExpr fragment awaiting the rest of the program.
#[derive(Clone)]
struct LazyCpsExpr(Rc<dyn Fn(Atom<CpsExpr>) -> Call<CpsExpr>>);

impl LazyCpsExpr {
    fn new(f: impl Fn(Atom<CpsExpr>) -> Call<CpsExpr> + 'static) -> Self {
        LazyCpsExpr(Rc::new(f))
    }

    fn apply(&self, continuation: Atom<CpsExpr>) -> Call<CpsExpr> {
        (self.0)(continuation)
    }
}

/// Converter value: an already-lowered CpsExpr or a partial
/// continuation.
#[derive(Clone)]
enum MaybeLazyCpsExpr {
    Eager(CpsExpr),
    Lazy(LazyCpsExpr),
}

type CpsValue = Value<AnfExpr, MaybeLazyCpsExpr>;
type CpsEnv = SharedEnv<AnfExpr, MaybeLazyCpsExpr>;
type CpsItp<'m> = AnfInterpreter<'m, MaybeLazyCpsExpr>;

fn eager_atom(atom: Atom<CpsExpr>) -> CpsValue {
    Value::Custom(MaybeLazyCpsExpr::Eager(CpsExpr::Atomic(atom)))
}

fn lazy_value(lazy: LazyCpsExpr) -> CpsValue {
    Value::Custom(MaybeLazyCpsExpr::Lazy(lazy))
}

fn into_atom(value: CpsValue) -> EvalResult<Atom<CpsExpr>> {
    match value {
        Value::Custom(MaybeLazyCpsExpr::Eager(CpsExpr::Atomic(atom))) => Ok(atom),
        Value::Custom(MaybeLazyCpsExpr::Eager(_)) => Err(EvalError::invalid_argument(
            "atomic position lowered to a non-atomic cps expression",
        )),
        other => Err(EvalError::invalid_argument(format!(
            "atomic position lowered to a {} value instead of a cps atom",
            other.kind_name()
        ))),
    }
}

fn into_lazy(value: CpsValue) -> EvalResult<LazyCpsExpr> {
    match value {
        Value::Custom(MaybeLazyCpsExpr::Lazy(lazy)) => Ok(lazy),
        Value::Custom(MaybeLazyCpsExpr::Eager(CpsExpr::Atomic(atom))) => {
            Ok(LazyCpsExpr::new(move |continuation| Call {
                func: Atom::var(BUILTIN_IDENTITY),
                args: vec![atom.clone(), continuation],
            }))
        }
        _ => Err(EvalError::invalid_argument(
            "expression lowered to neither a partial continuation nor a cps atom",
        )),
    }
}

/// Conversion context holding the continuation-name generator.
struct AnfToCpsConverter {
    continuations: NameGenerator,
}

impl AnfToCpsConverter {
    fn new() -> Self {
        AnfToCpsConverter {
            continuations: NameGenerator::new("k"),
        }
    }

    fn interpret_atom(
        &mut self,
        atom: &Atom<AnfExpr>,
        env: &CpsEnv,
        interpreter: &CpsItp<'_>,
    ) -> EvalResult<Atom<CpsExpr>> {
        let value = interpreter.interpret_atomic(self, atom, env)?;
        into_atom(value)
    }

    fn interpret_combined_lazy(
        &mut self,
        combined: &axon_ir::Combined<AnfExpr>,
        env: &CpsEnv,
        interpreter: &CpsItp<'_>,
    ) -> EvalResult<LazyCpsExpr> {
        match interpreter.interpret_combined(self, combined, env)? {
            Value::Custom(MaybeLazyCpsExpr::Lazy(lazy)) => Ok(lazy),
            _ => Err(EvalError::invalid_argument(
                "combined expression must lower to a partial continuation",
            )),
        }
    }
}

impl AnfContext for AnfToCpsConverter {
    type Custom = MaybeLazyCpsExpr;

    fn interpret_var(&mut self, name: &str, env: &CpsEnv) -> EvalResult<CpsValue> {
        let Some(value) = env.get(name) else {
            return Ok(eager_atom(Atom::var(name)));
        };
        if matches!(
            &value,
            Value::Custom(MaybeLazyCpsExpr::Eager(CpsExpr::Atomic(Atom::Var(_))))
        ) {
            Ok(value)
        } else {
            Err(EvalError::invalid_argument(format!(
                "conversion-time binding for `{name}` is not a variable atom"
            )))
        }
    }

    fn interpret_bool(&mut self, value: bool, _env: &CpsEnv) -> EvalResult<CpsValue> {
        Ok(eager_atom(Atom::Bool(value)))
    }

    fn interpret_int64(&mut self, value: i64, _env: &CpsEnv) -> EvalResult<CpsValue> {
        Ok(eager_atom(Atom::int64(value)))
    }

    fn interpret_string(&mut self, value: &str, _env: &CpsEnv) -> EvalResult<CpsValue> {
        Ok(eager_atom(Atom::string(value)))
    }

    fn interpret_op(&mut self, op: &PrimOp, _env: &CpsEnv) -> EvalResult<CpsValue> {
        Ok(eager_atom(Atom::Op(op.clone())))
    }

    fn interpret_lambda(
        &mut self,
        lambda: &Lambda<AnfExpr>,
        env: &CpsEnv,
        interpreter: &CpsItp<'_>,
    ) -> EvalResult<CpsValue> {
        let lambda_env = interpreter.new_env(Some(env));
        // Source lambda (lambda [a b] body) becomes
        // (lambda [a b k] body[k]) with a fresh continuation name.
        let continuation_name = self.continuations.fresh();
        let mut args = lambda.args.clone();
        args.push(continuation_name.clone());
        let body_value = interpreter.interpret(self, &lambda.body, &lambda_env)?;
        let lazy_body = into_lazy(body_value)?;
        let cps_body = CpsExpr::from(lazy_body.apply(Atom::var(continuation_name)));
        Ok(eager_atom(Atom::lambda(args, cps_body)))
    }

    fn interpret_call(
        &mut self,
        call: &Call<AnfExpr>,
        env: &CpsEnv,
        interpreter: &CpsItp<'_>,
    ) -> EvalResult<CpsValue> {
        let func = self.interpret_atom(&call.func, env, interpreter)?;
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.interpret_atom(arg, env, interpreter)?);
        }
        Ok(lazy_value(LazyCpsExpr::new(move |continuation| {
            let mut call_args = args.clone();
            call_args.push(continuation);
            Call {
                func: func.clone(),
                args: call_args,
            }
        })))
    }

    fn interpret_if(
        &mut self,
        if_expr: &If<AnfExpr>,
        env: &CpsEnv,
        interpreter: &CpsItp<'_>,
    ) -> EvalResult<CpsValue> {
        let cond = self.interpret_atom(&if_expr.cond, env, interpreter)?;
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
        Ok(lazy_value(LazyCpsExpr::new(move |continuation| Call {
            func: Atom::var(BUILTIN_IF),
            args: vec![
                cond.clone(),
                true_thunk.clone(),
                false_thunk.clone(),
                continuation,
            ],
        })))
    }

    fn interpret_let(
        &mut self,
        let_expr: &Let<AnfExpr>,
        env: &CpsEnv,
        interpreter: &CpsItp<'_>,
    ) -> EvalResult<CpsValue> {
        let let_env = interpreter.new_env(Some(env));
        let mut names = Vec::with_capacity(let_expr.bindings.len());
        let mut lazies = Vec::with_capacity(let_expr.bindings.len() + 1);
        for binding in &let_expr.bindings {
            names.push(binding.var.clone());
            lazies.push(self.interpret_combined_lazy(&binding.val, &let_env, interpreter)?);
        }
        let body_value = interpreter.interpret(self, &let_expr.body, &let_env)?;
        lazies.push(into_lazy(body_value)?);

        Ok(lazy_value(LazyCpsExpr::new(move |continuation| {
            let mut continuation = continuation;
            for i in (1..lazies.len()).rev() {
                let body = CpsExpr::from(lazies[i].apply(continuation));
                continuation = Atom::lambda(vec![names[i - 1].clone()], body);
            }
            lazies[0].apply(continuation)
        })))
    }
}

/// Lower an ANF program to a CpsExpr wrapped in the top-level
/// `lambda [return]` continuation binder.
pub fn anf_to_cps(anf: &AnfExpr) -> EvalResult<CpsExpr> {
    let env_mgr = EnvironmentManager::new();
    let interpreter = AnfInterpreter::new(&env_mgr);
    let mut converter = AnfToCpsConverter::new();
    let argv = eager_atom(Atom::var(ARGV));
    let result = interpreter.run(&mut converter, anf, argv)?;
    let lazy = into_lazy(result)?;
    let body = CpsExpr::from(lazy.apply(Atom::var(RETURN_CONTINUATION)));
    let program = CpsExpr::from(Atom::lambda(vec![RETURN_CONTINUATION.to_string()], body));
    tracing::debug!(cps = %program, "lowered ANF program to CpsExpr");
    Ok(program)
}

#[cfg(test)]
mod tests {
    use axon_ir::{Bind, Combined, ToSExpression};
    use pretty_assertions::assert_eq;

    use super::*;

    fn lower(anf: &AnfExpr) -> CpsExpr {
        match anf_to_cps(anf) {
            Ok(cps) => cps,
            Err(err) => panic!("lowering failed: {err}"),
        }
    }

    #[test]
    fn lambda_gains_a_fresh_continuation_parameter() {
        // (lambda [x] (f x))
        let anf = AnfExpr::from(Atom::lambda(
            vec!["x".to_string()],
            AnfExpr::from(Combined::call(Atom::var("f"), vec![Atom::var("x")])),
        ));
        let cps = lower(&anf);
        assert_eq!(
            cps.to_s_expression(),
            "(lambda [return] (__builtin_identity__ (lambda [x k0] (f x k0)) return))"
        );
    }

    #[test]
    fn calls_append_the_current_continuation() {
        let anf = AnfExpr::from(Combined::call(
            Atom::var("f"),
            vec![Atom::int64(1), Atom::var("y")],
        ));
        let cps = lower(&anf);
        assert_eq!(cps.to_s_expression(), "(lambda [return] (f 1 y return))");
    }

    #[test]
    fn if_threads_the_continuation_after_both_thunks() {
        let anf = AnfExpr::from(Combined::if_(
            Atom::var("c"),
            AnfExpr::from(Atom::var("u")),
            AnfExpr::from(Atom::var("v")),
        ));
        let cps = lower(&anf);
        assert_eq!(
            cps.to_s_expression(),
            "(lambda [return] (if c \
             (lambda [k0] (__builtin_identity__ u k0)) \
             (lambda [k1] (__builtin_identity__ v k1)) return))"
        );
    }

    #[test]
    fn let_bindings_thread_right_to_left() {
        // let a = f(1) in a
        let anf = AnfExpr::let_(
            vec![Bind::new(
                "a",
                Combined::call(Atom::var("f"), vec![Atom::int64(1)]),
            )],
            AnfExpr::from(Atom::var("a")),
        );
        let cps = lower(&anf);
        assert_eq!(
            cps.to_s_expression(),
            "(lambda [return] (f 1 (lambda [a] (__builtin_identity__ a return))))"
        );
    }

    #[test]
    fn continuation_names_are_reproducible_per_conversion() {
        let anf = AnfExpr::from(Atom::lambda(
            vec!["x".to_string()],
            AnfExpr::from(Atom::var("x")),
        ));
        let first = lower(&anf).to_s_expression();
        let second = lower(&anf).to_s_expression();
        assert_eq!(first, second);
    }
}
