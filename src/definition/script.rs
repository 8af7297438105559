use crate::definition::expression::Expression;
use crate::definition::render::{ParamValue, render_object};
use crate::definition::task::{TaskDescriptor, TaskNode};

/// Resource type prefix for script task resources
pub const SCRIPT_RESOURCE_PREFIX: &str = "script:";

/// Configuration for a script task.
///
/// Created once at definition time and never mutated. `script_path` is
/// forwarded into the resource string as-is; existence and reachability of
/// the script are checked by the orchestration engine at execution time,
/// not here.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptTaskConfig {
    /// Identifier of the script resource, appended to the fixed prefix
    pub script_path: String,
    /// Input for the script; absent means the entire current input
    pub payload: Option<Expression>,
}

impl ScriptTaskConfig {
    pub fn new(script_path: impl Into<String>) -> Self {
        ScriptTaskConfig {
            script_path: script_path.into(),
            payload: None,
        }
    }

    /// Pass an explicit payload expression instead of the whole input
    pub fn with_payload(mut self, payload: Expression) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// A workflow task that invokes an external script resource.
///
/// The descriptor is a pure function of the configuration: the resource is
/// the fixed prefix concatenated with the unmodified script path, and the
/// `Payload` parameter is either the configured payload expression or the
/// root-of-input sentinel. The payload is passed through unexamined.
#[derive(Debug, Clone)]
pub struct ScriptTask {
    id: String,
    config: ScriptTaskConfig,
}

impl ScriptTask {
    pub fn new(id: impl Into<String>, config: ScriptTaskConfig) -> Self {
        ScriptTask {
            id: id.into(),
            config,
        }
    }

    pub fn config(&self) -> &ScriptTaskConfig {
        &self.config
    }
}

impl TaskNode for ScriptTask {
    fn state_id(&self) -> &str {
        &self.id
    }

    fn render_descriptor(&self) -> TaskDescriptor {
        let payload = match &self.config.payload {
            Some(expression) => expression.clone(),
            None => Expression::RootInput,
        };

        TaskDescriptor {
            resource: format!("{SCRIPT_RESOURCE_PREFIX}{}", self.config.script_path),
            parameters: render_object(&ParamValue::object([(
                "Payload",
                ParamValue::from(payload),
            )])),
        }
    }
}
