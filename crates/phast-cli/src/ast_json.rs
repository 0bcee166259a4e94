//! Reading AST dumps.
//!
//! The embedding parser serializes each file's tree as JSON:
//!
//! ```json
//! {
//!   "kind": "Assign", "flags": 0, "line": 3,
//!   "doc": "/** @var int $x */",
//!   "children": { "var": { "kind": "Var", ... }, "expr": 1 }
//! }
//! ```
//!
//! Children are a JSON object for named children or an array for
//! ordered children; scalar child slots are JSON scalars.

use phast_ast::{Child, Kind, Node};
use serde_json::Value;
use std::fmt;

#[derive(Debug)]
pub struct AstJsonError(pub String);

impl fmt::Display for AstJsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed AST dump: {}", self.0)
    }
}

impl std::error::Error for AstJsonError {}

/// Child-name strings appear per node; the node map wants `&'static`
/// keys. The well-known names avoid leaking.
fn static_child_name(name: &str) -> &'static str {
    const KNOWN: &[&str] = &[
        "name", "extends", "implements", "uses", "stmts", "params", "returnType", "default",
        "type", "props", "value", "key", "expr", "var", "left", "right", "cond", "true", "false",
        "class", "method", "prop", "const", "args", "dim", "alias", "prefix", "try", "catches",
        "finally", "classes", "init", "loop", "strict_types",
    ];
    for known in KNOWN {
        if *known == name {
            return known;
        }
    }
    Box::leak(name.to_owned().into_boxed_str())
}

pub fn node_from_json(value: &Value) -> Result<Node, AstJsonError> {
    let object = value
        .as_object()
        .ok_or_else(|| AstJsonError("node is not an object".to_owned()))?;
    let kind_name = object
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| AstJsonError("node without kind".to_owned()))?;
    let kind = Kind::from_name(kind_name)
        .ok_or_else(|| AstJsonError(format!("unknown node kind {kind_name:?}")))?;
    let flags = object
        .get("flags")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;
    let line = object.get("line").and_then(Value::as_u64).unwrap_or(0) as u32;

    let mut node = Node::new(kind, flags, line);
    if let Some(doc) = object.get("doc").and_then(Value::as_str) {
        node = node.with_doc(doc);
    }
    match object.get("children") {
        None | Some(Value::Null) => Ok(node),
        Some(Value::Array(items)) => {
            let children = items
                .iter()
                .map(child_from_json)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(node.with_list(children))
        }
        Some(Value::Object(map)) => {
            for (name, value) in map {
                node = node.with_child(static_child_name(name), child_from_json(value)?);
            }
            Ok(node)
        }
        Some(other) => Err(AstJsonError(format!(
            "children must be an array or object, got {other}"
        ))),
    }
}

fn child_from_json(value: &Value) -> Result<Child, AstJsonError> {
    Ok(match value {
        Value::Null => Child::Null,
        Value::Bool(b) => Child::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Child::Int(i)
            } else {
                Child::Float(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => Child::Str(s.clone()),
        Value::Object(_) => Child::Node(node_from_json(value)?),
        Value::Array(_) => {
            return Err(AstJsonError("unexpected array child".to_owned()));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_small_tree() {
        let json: Value = serde_json::from_str(
            r#"{
                "kind": "StmtList", "line": 1,
                "children": [
                    {
                        "kind": "Assign", "line": 1,
                        "children": {
                            "var": { "kind": "Var", "line": 1, "children": { "name": "x" } },
                            "expr": 42
                        }
                    }
                ]
            }"#,
        )
        .unwrap();
        let node = node_from_json(&json).unwrap();
        assert_eq!(node.kind, Kind::StmtList);
        let assign = node.list()[0].as_node().unwrap();
        assert_eq!(assign.kind, Kind::Assign);
        assert_eq!(
            assign.child_node("var").unwrap().child_str("name"),
            Some("x")
        );
        assert!(matches!(assign.child("expr"), Some(Child::Int(42))));
    }

    #[test]
    fn rejects_unknown_kinds() {
        let json: Value = serde_json::from_str(r#"{"kind": "Wat", "line": 1}"#).unwrap();
        assert!(node_from_json(&json).is_err());
    }
}
