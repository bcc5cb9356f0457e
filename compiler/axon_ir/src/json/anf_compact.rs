//! Compact positional JSON codec for ANF, the preferred encoding.
//!
//! Parsing tries the alternatives in a fixed order (lambda, if, let,
//! call, var, bool, int64, string, op), mirroring the dump shapes: the
//! keyword-headed arrays are more specific than a bare call, so they
//! must win first.

use serde_json::{Map, Value as Json};

use super::ParseError;
use crate::anf::{AnfExpr, Bind, Combined, Let};
use crate::atom::Atom;

const STR_KEY: &str = "str";
const OP_KEY: &str = "op";
const LAMBDA_TAG: &str = "lambda";
const IF_TAG: &str = "if";
const LET_TAG: &str = "let";

impl AnfExpr {
    /// Encode in the compact positional form.
    pub fn to_json_string(&self) -> String {
        dump_expr(self).to_string()
    }

    /// Encode in the compact positional form with indentation.
    pub fn to_json_string_pretty(&self) -> String {
        format!("{:#}", dump_expr(self))
    }

    /// Decode from the compact positional form.
    pub fn from_json_str(text: &str) -> Result<AnfExpr, ParseError> {
        let json: Json = serde_json::from_str(text).map_err(|e| ParseError::json(&e))?;
        parse_expr(&json).ok_or(ParseError::Shape { dialect: "ANF" })
    }
}

fn dump_expr(expr: &AnfExpr) -> Json {
    match expr {
        AnfExpr::Atomic(atom) => dump_atom(atom),
        AnfExpr::Combined(combined) => dump_combined(combined),
        AnfExpr::Let(let_expr) => dump_let(let_expr),
    }
}

fn dump_atom(atom: &Atom<AnfExpr>) -> Json {
    match atom {
        Atom::Var(name) => Json::String(name.clone()),
        Atom::Bool(value) => Json::Bool(*value),
        Atom::Int64(value) => Json::from(*value),
        Atom::Str(value) => single_entry(STR_KEY, Json::String(value.clone())),
        Atom::Op(op) => single_entry(OP_KEY, Json::String(op.name.clone())),
        Atom::Lambda(lambda) => Json::Array(vec![
            Json::String(LAMBDA_TAG.to_string()),
            Json::Array(
                lambda
                    .args
                    .iter()
                    .map(|arg| Json::String(arg.clone()))
                    .collect(),
            ),
            dump_expr(&lambda.body),
        ]),
    }
}

fn dump_combined(combined: &Combined<AnfExpr>) -> Json {
    match combined {
        Combined::Call(call) => {
            let mut items = Vec::with_capacity(call.args.len() + 1);
            items.push(dump_atom(&call.func));
            items.extend(call.args.iter().map(dump_atom));
            Json::Array(items)
        }
        Combined::If(if_expr) => Json::Array(vec![
            Json::String(IF_TAG.to_string()),
            dump_atom(&if_expr.cond),
            dump_expr(&if_expr.true_expr),
            dump_expr(&if_expr.false_expr),
        ]),
    }
}

fn dump_let(let_expr: &Let<AnfExpr>) -> Json {
    let mut items = Vec::with_capacity(let_expr.bindings.len() + 2);
    items.push(Json::String(LET_TAG.to_string()));
    for binding in &let_expr.bindings {
        items.push(Json::Array(vec![
            Json::String(binding.var.clone()),
            dump_combined(&binding.val),
        ]));
    }
    items.push(dump_expr(&let_expr.body));
    Json::Array(items)
}

fn single_entry(key: &str, value: Json) -> Json {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Json::Object(map)
}

fn parse_expr(json: &Json) -> Option<AnfExpr> {
    parse_lambda(json)
        .or_else(|| parse_if(json))
        .or_else(|| parse_let(json))
        .or_else(|| parse_call(json))
        .or_else(|| parse_var(json))
        .or_else(|| parse_bool(json))
        .or_else(|| parse_int64(json))
        .or_else(|| parse_string(json))
        .or_else(|| parse_op(json))
}

fn parse_atom(json: &Json) -> Option<Atom<AnfExpr>> {
    parse_expr(json)?.into_atomic()
}

fn parse_lambda(json: &Json) -> Option<AnfExpr> {
    let items = json.as_array()?;
    if items.len() != 3 || items[0] != LAMBDA_TAG {
        return None;
    }
    let args = parse_arg_names(&items[1])?;
    let body = parse_expr(&items[2])?;
    Some(AnfExpr::from(Atom::lambda(args, body)))
}

fn parse_arg_names(json: &Json) -> Option<Vec<String>> {
    let items = json.as_array()?;
    let mut names = Vec::with_capacity(items.len());
    for item in items {
        names.push(item.as_str()?.to_string());
    }
    Some(names)
}

fn parse_if(json: &Json) -> Option<AnfExpr> {
    let items = json.as_array()?;
    if items.len() != 4 || items[0] != IF_TAG {
        return None;
    }
    let cond = parse_atom(&items[1])?;
    let true_expr = parse_expr(&items[2])?;
    let false_expr = parse_expr(&items[3])?;
    Some(AnfExpr::from(Combined::if_(cond, true_expr, false_expr)))
}

fn parse_let(json: &Json) -> Option<AnfExpr> {
    let items = json.as_array()?;
    if items.len() < 2 || items[0] != LET_TAG {
        return None;
    }
    let mut bindings = Vec::with_capacity(items.len() - 2);
    for item in &items[1..items.len() - 1] {
        bindings.push(parse_binding(item)?);
    }
    let body = parse_expr(&items[items.len() - 1])?;
    Some(AnfExpr::let_(bindings, body))
}

fn parse_binding(json: &Json) -> Option<Bind<AnfExpr>> {
    let pair = json.as_array()?;
    if pair.len() != 2 {
        return None;
    }
    let var = pair[0].as_str()?;
    let val = parse_expr(&pair[1])?.into_combined()?;
    Some(Bind::new(var, val))
}

fn parse_call(json: &Json) -> Option<AnfExpr> {
    let items = json.as_array()?;
    let (func_json, arg_jsons) = items.split_first()?;
    let func = parse_atom(func_json)?;
    let mut args = Vec::with_capacity(arg_jsons.len());
    for arg in arg_jsons {
        args.push(parse_atom(arg)?);
    }
    Some(AnfExpr::from(Combined::call(func, args)))
}

fn parse_var(json: &Json) -> Option<AnfExpr> {
    Some(AnfExpr::from(Atom::var(json.as_str()?)))
}

fn parse_bool(json: &Json) -> Option<AnfExpr> {
    Some(AnfExpr::from(Atom::Bool(json.as_bool()?)))
}

fn parse_int64(json: &Json) -> Option<AnfExpr> {
    Some(AnfExpr::from(Atom::int64(json.as_i64()?)))
}

fn parse_string(json: &Json) -> Option<AnfExpr> {
    Some(AnfExpr::from(Atom::string(single_key_str(json, STR_KEY)?)))
}

fn parse_op(json: &Json) -> Option<AnfExpr> {
    Some(AnfExpr::from(Atom::op(single_key_str(json, OP_KEY)?)))
}

fn single_key_str<'a>(json: &'a Json, key: &str) -> Option<&'a str> {
    let map = json.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get(key)?.as_str()
}
