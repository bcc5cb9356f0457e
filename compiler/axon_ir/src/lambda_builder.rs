//! Fluent construction of ANF lambdas from host code.
//!
//! [`LambdaExprBuilder`] synthesizes (possibly curried) lambdas whose
//! bodies are emitted through a [`LetContext`]: every call or branch the
//! body requests is named by a fresh `let` temporary, so the result is
//! in A-Normal Form by construction. Hosts use this to assemble
//! tensor-index lambdas over grouped argument lists without tracking
//! temporaries themselves.

use crate::anf::{AnfExpr, Bind, Combined};
use crate::atom::Atom;
use crate::fresh::NameGenerator;

/// Accumulates `let` bindings while a builder body runs.
///
/// Binding operations are total: they always succeed and return the
/// freshly bound variable as an atom, usable in later bindings or the
/// final body.
pub struct LetContext<'a> {
    names: &'a mut NameGenerator,
    bindings: Vec<Bind<AnfExpr>>,
}

impl LetContext<'_> {
    /// Emit `fresh = func(args...)` and return the bound variable.
    pub fn call(&mut self, func: Atom<AnfExpr>, args: Vec<Atom<AnfExpr>>) -> Atom<AnfExpr> {
        self.bind(Combined::call(func, args))
    }

    /// Emit `fresh = if cond then true_expr else false_expr` and return
    /// the bound variable.
    pub fn if_(
        &mut self,
        cond: Atom<AnfExpr>,
        true_expr: AnfExpr,
        false_expr: AnfExpr,
    ) -> Atom<AnfExpr> {
        self.bind(Combined::if_(cond, true_expr, false_expr))
    }

    fn bind(&mut self, val: Combined<AnfExpr>) -> Atom<AnfExpr> {
        let name = self.names.fresh();
        self.bindings.push(Bind::new(name.clone(), val));
        Atom::var(name)
    }

    fn finish(self, body: AnfExpr) -> AnfExpr {
        if self.bindings.is_empty() {
            body
        } else {
            AnfExpr::let_(self.bindings, body)
        }
    }
}

/// Builds ANF lambdas with automatic fresh-name generation.
pub struct LambdaExprBuilder {
    names: NameGenerator,
}

impl LambdaExprBuilder {
    /// Builder with the default `v0, v1, ...` temporary names.
    pub fn new() -> Self {
        LambdaExprBuilder {
            names: NameGenerator::default(),
        }
    }

    /// Builder over a caller-seeded generator, for reproducible
    /// temporaries across independently built programs.
    pub fn with_name_generator(names: NameGenerator) -> Self {
        LambdaExprBuilder { names }
    }

    /// `lambda [args] body`, with the body emitted through a
    /// [`LetContext`].
    pub fn lambda(
        &mut self,
        args: Vec<String>,
        body_fn: impl FnOnce(&mut LetContext<'_>) -> AnfExpr,
    ) -> AnfExpr {
        self.nested_lambda(vec![args], body_fn)
    }

    /// Curried lambda over argument groups: given `[g1, g2, ..., gk]`
    /// this yields `lambda g1. lambda g2. ... lambda gk. body`.
    pub fn nested_lambda(
        &mut self,
        arg_groups: Vec<Vec<String>>,
        body_fn: impl FnOnce(&mut LetContext<'_>) -> AnfExpr,
    ) -> AnfExpr {
        let mut ctx = LetContext {
            names: &mut self.names,
            bindings: Vec::new(),
        };
        let body = body_fn(&mut ctx);
        let mut expr = ctx.finish(body);
        for group in arg_groups.into_iter().rev() {
            expr = AnfExpr::from(Atom::lambda(group, expr));
        }
        expr
    }
}

impl Default for LambdaExprBuilder {
    fn default() -> Self {
        LambdaExprBuilder::new()
    }
}
