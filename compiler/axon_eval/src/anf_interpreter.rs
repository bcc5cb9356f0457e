//! Visitor framework over ANF expressions.
//!
//! The framework owns dispatch and an [`AnfContext`] owns semantics:
//! every node kind is delegated to the matching context method. Methods
//! handling binders (`lambda`, `call`, `if`, `let`) receive the
//! interpreter back so they can recurse and create child environments
//! through the manager.
//!
//! The contract a runtime context is expected to honor: strict
//! left-to-right evaluation of argument and binding lists, `let*`
//! sequencing for bindings, lexical capture for lambdas, a lazily
//! evaluated untaken `if` branch, and host-decided application of
//! primitive ops. Conversion contexts (see the lowering crate) use the
//! same dispatch to build target-dialect fragments instead of values.

use axon_ir::{AnfExpr, Atom, Call, Combined, If, Lambda, Let, PrimOp, ARGV};

use crate::env::{EnvironmentManager, SharedEnv};
use crate::errors::EvalResult;
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;

/// User-supplied semantics for interpreting ANF.
pub trait AnfContext {
    /// Custom foreign value injected at interpreter boundaries.
    type Custom: Clone;

    fn interpret_var(
        &mut self,
        name: &str,
        env: &SharedEnv<AnfExpr, Self::Custom>,
    ) -> EvalResult<Value<AnfExpr, Self::Custom>>;

    fn interpret_bool(
        &mut self,
        value: bool,
        env: &SharedEnv<AnfExpr, Self::Custom>,
    ) -> EvalResult<Value<AnfExpr, Self::Custom>>;

    fn interpret_int64(
        &mut self,
        value: i64,
        env: &SharedEnv<AnfExpr, Self::Custom>,
    ) -> EvalResult<Value<AnfExpr, Self::Custom>>;

    fn interpret_string(
        &mut self,
        value: &str,
        env: &SharedEnv<AnfExpr, Self::Custom>,
    ) -> EvalResult<Value<AnfExpr, Self::Custom>>;

    fn interpret_op(
        &mut self,
        op: &PrimOp,
        env: &SharedEnv<AnfExpr, Self::Custom>,
    ) -> EvalResult<Value<AnfExpr, Self::Custom>>;

    fn interpret_lambda(
        &mut self,
        lambda: &Lambda<AnfExpr>,
        env: &SharedEnv<AnfExpr, Self::Custom>,
        interpreter: &AnfInterpreter<'_, Self::Custom>,
    ) -> EvalResult<Value<AnfExpr, Self::Custom>>;

    fn interpret_call(
        &mut self,
        call: &Call<AnfExpr>,
        env: &SharedEnv<AnfExpr, Self::Custom>,
        interpreter: &AnfInterpreter<'_, Self::Custom>,
    ) -> EvalResult<Value<AnfExpr, Self::Custom>>;

    fn interpret_if(
        &mut self,
        if_expr: &If<AnfExpr>,
        env: &SharedEnv<AnfExpr, Self::Custom>,
        interpreter: &AnfInterpreter<'_, Self::Custom>,
    ) -> EvalResult<Value<AnfExpr, Self::Custom>>;

    fn interpret_let(
        &mut self,
        let_expr: &Let<AnfExpr>,
        env: &SharedEnv<AnfExpr, Self::Custom>,
        interpreter: &AnfInterpreter<'_, Self::Custom>,
    ) -> EvalResult<Value<AnfExpr, Self::Custom>>;
}

/// Dispatch-only tree walker over [`AnfExpr`].
pub struct AnfInterpreter<'m, C> {
    env_mgr: &'m EnvironmentManager<AnfExpr, C>,
}

impl<'m, Cu: Clone> AnfInterpreter<'m, Cu> {
    pub fn new(env_mgr: &'m EnvironmentManager<AnfExpr, Cu>) -> Self {
        AnfInterpreter { env_mgr }
    }

    /// Create a child environment through the manager.
    pub fn new_env(&self, parent: Option<&SharedEnv<AnfExpr, Cu>>) -> SharedEnv<AnfExpr, Cu> {
        self.env_mgr.new_env(parent)
    }

    /// Entry point: evaluate `expr` in a fresh root environment with the
    /// reserved name `ARGV` bound to `argv`.
    pub fn run<C>(
        &self,
        ctx: &mut C,
        expr: &AnfExpr,
        argv: Value<AnfExpr, Cu>,
    ) -> EvalResult<Value<AnfExpr, Cu>>
    where
        C: AnfContext<Custom = Cu>,
    {
        let env = self.new_env(None);
        env.set(ARGV, argv);
        self.interpret(ctx, expr, &env)
    }

    pub fn interpret<C>(
        &self,
        ctx: &mut C,
        expr: &AnfExpr,
        env: &SharedEnv<AnfExpr, Cu>,
    ) -> EvalResult<Value<AnfExpr, Cu>>
    where
        C: AnfContext<Custom = Cu>,
    {
        ensure_sufficient_stack(|| match expr {
            AnfExpr::Atomic(atom) => self.interpret_atomic(ctx, atom, env),
            AnfExpr::Combined(combined) => self.interpret_combined(ctx, combined, env),
            AnfExpr::Let(let_expr) => ctx.interpret_let(let_expr, env, self),
        })
    }

    pub fn interpret_atomic<C>(
        &self,
        ctx: &mut C,
        atom: &Atom<AnfExpr>,
        env: &SharedEnv<AnfExpr, Cu>,
    ) -> EvalResult<Value<AnfExpr, Cu>>
    where
        C: AnfContext<Custom = Cu>,
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

    pub fn interpret_combined<C>(
        &self,
        ctx: &mut C,
        combined: &Combined<AnfExpr>,
        env: &SharedEnv<AnfExpr, Cu>,
    ) -> EvalResult<Value<AnfExpr, Cu>>
    where
        C: AnfContext<Custom = Cu>,
    {
        match combined {
            Combined::Call(call) => ctx.interpret_call(call, env, self),
            Combined::If(if_expr) => ctx.interpret_if(if_expr, env, self),
        }
    }
}

#[cfg(test)]
mod tests {
    use axon_ir::{AnfExpr, Atom, Bind, Combined, PrimOp};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::errors::EvalError;
    use crate::value::Closure;

    type V = Value<AnfExpr, ()>;
    type Env = SharedEnv<AnfExpr, ()>;

    /// Reference evaluator over integers and booleans, exercising the
    /// execution semantics the lowering must preserve.
    struct ArithContext;

    impl ArithContext {
        fn apply(
            &mut self,
            func: V,
            args: Vec<V>,
            interpreter: &AnfInterpreter<'_, ()>,
        ) -> EvalResult<V> {
            match func {
                Value::Closure(closure) => {
                    if closure.lambda.args.len() != args.len() {
                        return Err(EvalError::invalid_argument(format!(
                            "closure takes {} arguments but {} were given",
                            closure.lambda.args.len(),
                            args.len()
                        )));
                    }
                    let call_env = interpreter.new_env(Some(&closure.env));
                    for (name, value) in closure.lambda.args.iter().zip(args) {
                        call_env.set(name.clone(), value);
                    }
                    interpreter.interpret(self, &closure.lambda.body, &call_env)
                }
                Value::Op(op) => builtin(&op.name, &args),
                other => Err(EvalError::type_mismatch("closure or op", other.kind_name())),
            }
        }
    }

    fn builtin(name: &str, args: &[V]) -> EvalResult<V> {
        match (name, args) {
            ("+", [Value::Int64(a), Value::Int64(b)]) => Ok(Value::Int64(a + b)),
            ("-", [Value::Int64(a), Value::Int64(b)]) => Ok(Value::Int64(a - b)),
            ("*", [Value::Int64(a), Value::Int64(b)]) => Ok(Value::Int64(a * b)),
            ("<", [Value::Int64(a), Value::Int64(b)]) => Ok(Value::Bool(a < b)),
            _ => Err(EvalError::type_mismatch(
                "int64 operands for a known op",
                name,
            )),
        }
    }

    impl AnfContext for ArithContext {
        type Custom = ();

        fn interpret_var(&mut self, name: &str, env: &Env) -> EvalResult<V> {
            env.get(name)
                .ok_or_else(|| EvalError::invalid_argument(format!("undefined variable `{name}`")))
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

        fn interpret_op(&mut self, op: &PrimOp, _env: &Env) -> EvalResult<V> {
            Ok(Value::Op(op.clone()))
        }

        fn interpret_lambda(
            &mut self,
            lambda: &axon_ir::Lambda<AnfExpr>,
            env: &Env,
            _interpreter: &AnfInterpreter<'_, ()>,
        ) -> EvalResult<V> {
            Ok(Value::Closure(Closure {
                lambda: lambda.clone(),
                env: env.clone(),
            }))
        }

        fn interpret_call(
            &mut self,
            call: &axon_ir::Call<AnfExpr>,
            env: &Env,
            interpreter: &AnfInterpreter<'_, ()>,
        ) -> EvalResult<V> {
            let func = interpreter.interpret_atomic(self, &call.func, env)?;
            let mut args = Vec::with_capacity(call.args.len());
            for arg in &call.args {
                args.push(interpreter.interpret_atomic(self, arg, env)?);
            }
            self.apply(func, args, interpreter)
        }

        fn interpret_if(
            &mut self,
            if_expr: &axon_ir::If<AnfExpr>,
            env: &Env,
            interpreter: &AnfInterpreter<'_, ()>,
        ) -> EvalResult<V> {
            match interpreter.interpret_atomic(self, &if_expr.cond, env)? {
                Value::Bool(true) => interpreter.interpret(self, &if_expr.true_expr, env),
                Value::Bool(false) => interpreter.interpret(self, &if_expr.false_expr, env),
                other => Err(EvalError::type_mismatch("bool", other.kind_name())),
            }
        }

        fn interpret_let(
            &mut self,
            let_expr: &axon_ir::Let<AnfExpr>,
            env: &Env,
            interpreter: &AnfInterpreter<'_, ()>,
        ) -> EvalResult<V> {
            let let_env = interpreter.new_env(Some(env));
            for binding in &let_expr.bindings {
                let value = interpreter.interpret_combined(self, &binding.val, &let_env)?;
                if !let_env.set(binding.var.clone(), value) {
                    return Err(EvalError::invalid_argument(format!(
                        "rebinding of `{}` in the same frame",
                        binding.var
                    )));
                }
            }
            interpreter.interpret(self, &let_expr.body, &let_env)
        }
    }

    fn eval(expr: &AnfExpr, argv: V) -> EvalResult<V> {
        let env_mgr = EnvironmentManager::new();
        let interpreter = AnfInterpreter::new(&env_mgr);
        let mut ctx = ArithContext;
        interpreter.run(&mut ctx, expr, argv)
    }

    fn eval_int(expr: &AnfExpr) -> i64 {
        match eval(expr, Value::Int64(0)) {
            Ok(Value::Int64(n)) => n,
            other => panic!("expected int64 result, got {other:?}"),
        }
    }

    #[test]
    fn let_bindings_evaluate_sequentially() {
        // let v0 = (+ 1 2), v1 = (* v0 3) in v1
        let expr = AnfExpr::let_(
            vec![
                Bind::new(
                    "v0",
                    Combined::call(Atom::op("+"), vec![Atom::int64(1), Atom::int64(2)]),
                ),
                Bind::new(
                    "v1",
                    Combined::call(Atom::op("*"), vec![Atom::var("v0"), Atom::int64(3)]),
                ),
            ],
            AnfExpr::from(Atom::var("v1")),
        );
        assert_eq!(eval_int(&expr), 9);
    }

    #[test]
    fn shadowed_variable_resolves_to_the_inner_binding() {
        // ((lambda [x] ((lambda [x] x) 2)) 1)
        let inner = Combined::call(
            Atom::lambda(vec!["x".to_string()], AnfExpr::from(Atom::var("x"))),
            vec![Atom::int64(2)],
        );
        let expr = AnfExpr::from(Combined::call(
            Atom::lambda(vec!["x".to_string()], AnfExpr::from(inner)),
            vec![Atom::int64(1)],
        ));
        assert_eq!(eval_int(&expr), 2);
    }

    #[test]
    fn closures_capture_their_defining_environment() {
        // ((lambda [a] ((lambda [b] (+ a b)) 2)) 40)
        let add = Combined::call(Atom::op("+"), vec![Atom::var("a"), Atom::var("b")]);
        let inner = Combined::call(
            Atom::lambda(vec!["b".to_string()], AnfExpr::from(add)),
            vec![Atom::int64(2)],
        );
        let expr = AnfExpr::from(Combined::call(
            Atom::lambda(vec!["a".to_string()], AnfExpr::from(inner)),
            vec![Atom::int64(40)],
        ));
        assert_eq!(eval_int(&expr), 42);
    }

    #[test]
    fn lambdas_are_first_class_arguments() {
        // ((lambda [f] (f 3)) (lambda [x] (+ x 1)))
        let body = Combined::call(Atom::var("f"), vec![Atom::int64(3)]);
        let expr = AnfExpr::from(Combined::call(
            Atom::lambda(vec!["f".to_string()], AnfExpr::from(body)),
            vec![Atom::lambda(
                vec!["x".to_string()],
                AnfExpr::from(Combined::call(
                    Atom::op("+"),
                    vec![Atom::var("x"), Atom::int64(1)],
                )),
            )],
        ));
        assert_eq!(eval_int(&expr), 4);
    }

    #[test]
    fn untaken_branch_is_never_evaluated() {
        // if #t then 1 else (boom), where boom is unbound
        let expr = AnfExpr::from(Combined::if_(
            Atom::Bool(true),
            AnfExpr::from(Atom::int64(1)),
            AnfExpr::from(Combined::call(Atom::var("boom"), vec![])),
        ));
        assert_eq!(eval_int(&expr), 1);
    }

    #[test]
    fn non_bool_condition_is_a_type_error() {
        let expr = AnfExpr::from(Combined::if_(
            Atom::int64(1),
            AnfExpr::from(Atom::int64(1)),
            AnfExpr::from(Atom::int64(2)),
        ));
        assert!(matches!(
            eval(&expr, Value::Int64(0)),
            Err(EvalError::Type { .. })
        ));
    }

    #[test]
    fn argv_is_bound_in_the_root_environment() {
        let expr = AnfExpr::from(Atom::var(ARGV));
        match eval(&expr, Value::Int64(7)) {
            Ok(Value::Int64(7)) => {}
            other => panic!("expected ARGV to evaluate to 7, got {other:?}"),
        }
    }

    #[test]
    fn free_variables_are_reported() {
        let expr = AnfExpr::from(Atom::var("nope"));
        assert!(matches!(
            eval(&expr, Value::Int64(0)),
            Err(EvalError::InvalidArgument(_))
        ));
    }
}
