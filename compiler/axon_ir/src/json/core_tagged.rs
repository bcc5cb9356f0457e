//! Tagged JSON codec for CoreExpr.

use serde_json::{Map, Value as Json};

use super::ParseError;
use crate::atom::Atom;
use crate::core_expr::{ComposedCall, CoreExpr};

impl CoreExpr {
    /// Encode in the tagged form.
    pub fn to_json_string(&self) -> String {
        dump_expr(self).to_string()
    }

    /// Decode from the tagged form.
    pub fn from_json_str(text: &str) -> Result<CoreExpr, ParseError> {
        let json: Json = serde_json::from_str(text).map_err(|e| ParseError::json(&e))?;
        parse_expr(&json).ok_or(ParseError::Shape { dialect: "CoreExpr" })
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

fn dump_expr(expr: &CoreExpr) -> Json {
    match expr {
        CoreExpr::Atomic(atom) => dump_atom(atom),
        CoreExpr::ComposedCall(call) => dump_composed_call(call),
    }
}

fn dump_atom(atom: &Atom<CoreExpr>) -> Json {
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

fn dump_composed_call(call: &ComposedCall<CoreExpr>) -> Json {
    // "outter_func" is the historic wire spelling; kept for compatibility
    // with existing dumps.
    node(
        "composed_call",
        vec![
            ("outter_func", dump_atom(&call.outer_func)),
            ("inner_func", dump_atom(&call.inner_func)),
            (
                "args",
                Json::Array(call.args.iter().map(dump_atom).collect()),
            ),
        ],
    )
}

fn parse_expr(json: &Json) -> Option<CoreExpr> {
    let map = json.as_object()?;
    let node_type = map.get("type")?.as_str()?;
    match node_type {
        "symbol" => Some(CoreExpr::from(Atom::var(data_str(map)?))),
        "bool" => Some(CoreExpr::from(Atom::Bool(map.get("data")?.as_bool()?))),
        "int64" => Some(CoreExpr::from(Atom::int64(map.get("data")?.as_i64()?))),
        "string" => Some(CoreExpr::from(Atom::string(data_str(map)?))),
        "op" => Some(CoreExpr::from(Atom::op(data_str(map)?))),
        "lambda" => parse_lambda(map),
        "composed_call" => parse_composed_call(map),
        _ => None,
    }
}

fn parse_atom(json: &Json) -> Option<Atom<CoreExpr>> {
    parse_expr(json)?.into_atomic()
}

fn data_str(map: &Map<String, Json>) -> Option<&str> {
    map.get("data")?.as_str()
}

fn parse_lambda(map: &Map<String, Json>) -> Option<CoreExpr> {
    let args = map.get("args")?.as_array()?;
    let mut names = Vec::with_capacity(args.len());
    for arg in args {
        names.push(arg.as_str()?.to_string());
    }
    let body = parse_expr(map.get("body")?)?;
    Some(CoreExpr::from(Atom::lambda(names, body)))
}

fn parse_composed_call(map: &Map<String, Json>) -> Option<CoreExpr> {
    let outer_func = parse_atom(map.get("outter_func")?)?;
    let inner_func = parse_atom(map.get("inner_func")?)?;
    let arg_jsons = map.get("args")?.as_array()?;
    let mut args = Vec::with_capacity(arg_jsons.len());
    for arg in arg_jsons {
        args.push(parse_atom(arg)?);
    }
    Some(CoreExpr::composed_call(outer_func, inner_func, args))
}
