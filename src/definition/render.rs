use crate::definition::expression::Expression;
use serde_json::{Map, Value};

/// A parameter tree whose leaves may be dynamic expressions.
///
/// Task nodes assemble their parameters as `ParamValue`s; [`render_object`]
/// resolves the tree into the final serialized form when the definition
/// document is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// A leaf expression, resolved by [`Expression::render`]
    Expr(Expression),
    /// Nested parameter object, entries kept in authoring order
    Object(Vec<(String, ParamValue)>),
    /// Nested parameter list
    Array(Vec<ParamValue>),
}

impl ParamValue {
    /// Build an object node from key/value entries
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ParamValue)>,
    {
        ParamValue::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }
}

impl From<Expression> for ParamValue {
    fn from(expr: Expression) -> Self {
        ParamValue::Expr(expr)
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::Expr(Expression::Literal(value))
    }
}

/// Recursively resolve a parameter tree into its serialized form.
///
/// Expressions render per their own convention (paths and the root-of-input
/// sentinel become strings, literals pass through unchanged); objects and
/// arrays are walked depth-first.
pub fn render_object(value: &ParamValue) -> Value {
    match value {
        ParamValue::Expr(expr) => expr.render(),
        ParamValue::Object(entries) => {
            let mut map = Map::new();
            for (key, entry) in entries {
                map.insert(key.clone(), render_object(entry));
            }
            Value::Object(map)
        }
        ParamValue::Array(items) => Value::Array(items.iter().map(render_object).collect()),
    }
}
