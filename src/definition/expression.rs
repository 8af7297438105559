use crate::definition::error::{DefinitionError, Result};
use serde_json::Value;

/// Reference syntax for "root of input" in the definition language
pub const ROOT_PATH: &str = "$";

/// A dynamic value embedded in a workflow definition.
///
/// Expressions are opaque to the nodes that carry them: a task node decides
/// only between "the configured payload" and "the whole input", never
/// inspecting literal or path contents. Resolution happens at rendering
/// time, when the definition document is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A fixed value, embedded in the definition unchanged
    Literal(Value),
    /// A path reference resolved against the execution input at runtime
    JsonPath(String),
    /// The entire current input, unmodified
    RootInput,
}

impl Expression {
    /// Wrap a fixed value
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    /// Reference a runtime value by JSON path, e.g. `"$.input.message"`
    pub fn json_path(path: impl Into<String>) -> Self {
        Expression::JsonPath(path.into())
    }

    /// Build a `States.Format` intrinsic call.
    ///
    /// Each `{}` placeholder in the template consumes one argument; `\{}`
    /// is an escaped placeholder and consumes none. Object and array
    /// literals are not valid arguments.
    pub fn format(template: &str, args: &[Expression]) -> Result<Self> {
        let placeholders = count_placeholders(template);
        if placeholders != args.len() {
            return Err(DefinitionError::Format(format!(
                "template has {} placeholder(s) but {} argument(s) were given",
                placeholders,
                args.len()
            )));
        }

        let mut call = String::from("States.Format('");
        call.push_str(template);
        call.push('\'');
        for arg in args {
            call.push_str(", ");
            call.push_str(&render_format_arg(arg)?);
        }
        call.push(')');

        Ok(Expression::Literal(Value::String(call)))
    }

    /// Render to the serialized form understood by the definition language
    pub fn render(&self) -> Value {
        match self {
            Expression::Literal(value) => value.clone(),
            Expression::JsonPath(path) => Value::String(path.clone()),
            Expression::RootInput => Value::String(ROOT_PATH.to_string()),
        }
    }
}

/// Count unescaped `{}` placeholders; every `\{}` contains a `{}` match
fn count_placeholders(template: &str) -> usize {
    let total = template.matches("{}").count();
    let escaped = template.matches("\\{}").count();
    total.saturating_sub(escaped)
}

fn render_format_arg(arg: &Expression) -> Result<String> {
    match arg {
        Expression::JsonPath(path) => Ok(path.clone()),
        Expression::RootInput => Ok(ROOT_PATH.to_string()),
        Expression::Literal(Value::String(s)) => Ok(format!("'{s}'")),
        Expression::Literal(value) if value.is_object() || value.is_array() => Err(
            DefinitionError::Format("object and array arguments are not supported".to_string()),
        ),
        Expression::Literal(value) => Ok(value.to_string()),
    }
}
