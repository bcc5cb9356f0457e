//! Tagged JSON codec for ANF, kept as the legacy encoding.
//!
//! Every node is an object `{"type": T, ...fields}`. Historic ANF dumps
//! use this form; new documents should prefer the compact codec.

use serde_json::{Map, Value as Json};

use super::ParseError;
use crate::anf::{AnfExpr, Bind, Combined, Let};
use crate::atom::Atom;

impl AnfExpr {
    /// Encode in the legacy tagged form.
    pub fn to_tagged_json_string(&self) -> String {
        dump_expr(self).to_string()
    }

    /// Decode from the legacy tagged form.
    pub fn from_tagged_json_str(text: &str) -> Result<AnfExpr, ParseError> {
        let json: Json = serde_json::from_str(text).map_err(|e| ParseError::json(&e))?;
        parse_expr(&json).ok_or(ParseError::Shape { dialect: "tagged ANF" })
    }
}

fn node(node_type: &str, fields: Vec<(&str, Json)>) -> Json {
    let mut map = Map::with_capacity(fields.len() + 1);
    map.insert("type".to_string(), Json::String(node_type.to_string()));
    for (key, value) in fields {
        map.insert(key.to_string(), value);
    }
    Json::Object(map)
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
        Atom::Var(name) => node("symbol", vec![("data", Json::String(name.clone()))]),
        Atom::Bool(value) => node("bool", vec![("data", Json::Bool(*value))]),
        Atom::Int64(value) => node("int64", vec![("data", Json::from(*value))]),
        Atom::Str(value) => node("string", vec![("data", Json::String(value.clone()))]),
        Atom::Op(op) => node("op", vec![("data", Json::String(op.name.clone()))]),
        Atom::Lambda(lambda) => node(
            "lambda",
            vec![
                (
                    "args",
                    Json::Array(
                        lambda
                            .args
                            .iter()
                            .map(|arg| Json::String(arg.clone()))
                            .collect(),
                    ),
                ),
                ("body", dump_expr(&lambda.body)),
            ],
        ),
    }
}

fn dump_combined(combined: &Combined<AnfExpr>) -> Json {
    match combined {
        Combined::Call(call) => node(
            "call",
            vec![
                ("func", dump_atom(&call.func)),
                (
                    "args",
                    Json::Array(call.args.iter().map(dump_atom).collect()),
                ),
            ],
        ),
        Combined::If(if_expr) => node(
            "if",
            vec![
                ("c", dump_atom(&if_expr.cond)),
                ("t", dump_expr(&if_expr.true_expr)),
                ("f", dump_expr(&if_expr.false_expr)),
            ],
        ),
    }
}

fn dump_let(let_expr: &Let<AnfExpr>) -> Json {
    let bindings = let_expr
        .bindings
        .iter()
        .map(|binding| {
            Json::Array(vec![
                Json::String(binding.var.clone()),
                dump_combined(&binding.val),
            ])
        })
        .collect();
    node(
        "let",
        vec![
            ("bindings", Json::Array(bindings)),
            ("body", dump_expr(&let_expr.body)),
        ],
    )
}

fn parse_expr(json: &Json) -> Option<AnfExpr> {
    let map = json.as_object()?;
    let node_type = map.get("type")?.as_str()?;
    match node_type {
        "symbol" => Some(AnfExpr::from(Atom::var(data_str(map)?))),
        "bool" => Some(AnfExpr::from(Atom::Bool(map.get("data")?.as_bool()?))),
        "int64" => Some(AnfExpr::from(Atom::int64(map.get("data")?.as_i64()?))),
        "string" => Some(AnfExpr::from(Atom::string(data_str(map)?))),
        "op" => Some(AnfExpr::from(Atom::op(data_str(map)?))),
        "lambda" => parse_lambda(map),
        "call" => parse_call(map),
        "if" => parse_if(map),
        "let" => parse_let(map),
        _ => None,
    }
}

fn parse_atom(json: &Json) -> Option<Atom<AnfExpr>> {
    parse_expr(json)?.into_atomic()
}

fn data_str(map: &Map<String, Json>) -> Option<&str> {
    map.get("data")?.as_str()
}

fn parse_lambda(map: &Map<String, Json>) -> Option<AnfExpr> {
    let args = map.get("args")?.as_array()?;
    let mut names = Vec::with_capacity(args.len());
    for arg in args {
        names.push(arg.as_str()?.to_string());
    }
    let body = parse_expr(map.get("body")?)?;
    Some(AnfExpr::from(Atom::lambda(names, body)))
}

fn parse_call(map: &Map<String, Json>) -> Option<AnfExpr> {
    let func = parse_atom(map.get("func")?)?;
    let arg_jsons = map.get("args")?.as_array()?;
    let mut args = Vec::with_capacity(arg_jsons.len());
    for arg in arg_jsons {
        args.push(parse_atom(arg)?);
    }
    Some(AnfExpr::from(Combined::call(func, args)))
}

fn parse_if(map: &Map<String, Json>) -> Option<AnfExpr> {
    let cond = parse_atom(map.get("c")?)?;
    let true_expr = parse_expr(map.get("t")?)?;
    let false_expr = parse_expr(map.get("f")?)?;
    Some(AnfExpr::from(Combined::if_(cond, true_expr, false_expr)))
}

fn parse_let(map: &Map<String, Json>) -> Option<AnfExpr> {
    let binding_jsons = map.get("bindings")?.as_array()?;
    let mut bindings = Vec::with_capacity(binding_jsons.len());
    for binding in binding_jsons {
        let pair = binding.as_array()?;
        if pair.len() != 2 {
            return None;
        }
        let var = pair[0].as_str()?;
        let val = parse_expr(&pair[1])?.into_combined()?;
        bindings.push(Bind::new(var, val));
    }
    let body = parse_expr(map.get("body")?)?;
    Some(AnfExpr::let_(bindings, body))
}
