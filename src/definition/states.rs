use crate::definition::error::{DefinitionError, Result};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Fields shared by every state definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommonState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub end: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl CommonState {
    /// Common fields for a state transitioning to `next`
    pub fn next_to(next: impl Into<String>) -> Self {
        CommonState {
            next: Some(next.into()),
            ..CommonState::default()
        }
    }

    /// Common fields for a terminal state
    pub fn end() -> Self {
        CommonState {
            end: true,
            ..CommonState::default()
        }
    }
}

/// Forwards its input to its output, optionally injecting a fixed result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PassState {
    #[serde(flatten)]
    pub common: CommonState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// Invokes an external resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskState {
    #[serde(flatten)]
    pub common: CommonState,
    pub resource: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
}

/// Branches on data-test rules evaluated against the current input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChoiceState {
    #[serde(flatten)]
    pub common: CommonState,
    pub choices: Vec<ChoiceRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// A single data-test rule: a variable with one comparison, or a
/// combinator over nested rules. Top-level rules carry the transition
/// target; nested rules do not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChoiceRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_equals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_equals: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_less_than: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numeric_greater_than: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_equals: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_present: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<ChoiceRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<ChoiceRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<ChoiceRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

/// Delays the transition by a duration or until a timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WaitState {
    #[serde(flatten)]
    pub common: CommonState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_path: Option<String>,
}

/// Terminates the machine successfully
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SucceedState {
    #[serde(flatten)]
    pub common: CommonState,
}

/// Terminates the machine unsuccessfully
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FailState {
    #[serde(flatten)]
    pub common: CommonState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

/// Runs branches concurrently over the same input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParallelState {
    #[serde(flatten)]
    pub common: CommonState,
    pub branches: Vec<Branch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
}

/// Applies an iterator branch to each element of an input array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MapState {
    #[serde(flatten)]
    pub common: CommonState,
    pub iterator: Branch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
}

/// A nested state graph owned by a Parallel branch or Map iterator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Branch {
    pub start_at: String,
    pub states: HashMap<String, StateDefinition>,
}

/// A state definition, tagged by `Type` in the serialized document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum StateDefinition {
    Pass(PassState),
    Task(TaskState),
    Choice(ChoiceState),
    Wait(WaitState),
    Succeed(SucceedState),
    Fail(FailState),
    Parallel(ParallelState),
    Map(MapState),
}

const KNOWN_STATE_TYPES: [&str; 8] = [
    "Pass", "Task", "Choice", "Wait", "Succeed", "Fail", "Parallel", "Map",
];

impl StateDefinition {
    pub fn state_type(&self) -> &'static str {
        match self {
            StateDefinition::Pass(_) => "Pass",
            StateDefinition::Task(_) => "Task",
            StateDefinition::Choice(_) => "Choice",
            StateDefinition::Wait(_) => "Wait",
            StateDefinition::Succeed(_) => "Succeed",
            StateDefinition::Fail(_) => "Fail",
            StateDefinition::Parallel(_) => "Parallel",
            StateDefinition::Map(_) => "Map",
        }
    }

    /// Fields shared by every state type
    pub fn common(&self) -> &CommonState {
        match self {
            StateDefinition::Pass(state) => &state.common,
            StateDefinition::Task(state) => &state.common,
            StateDefinition::Choice(state) => &state.common,
            StateDefinition::Wait(state) => &state.common,
            StateDefinition::Succeed(state) => &state.common,
            StateDefinition::Fail(state) => &state.common,
            StateDefinition::Parallel(state) => &state.common,
            StateDefinition::Map(state) => &state.common,
        }
    }

    /// States that stop the machine rather than transition onwards
    pub fn is_terminal_type(&self) -> bool {
        matches!(
            self,
            StateDefinition::Succeed(_) | StateDefinition::Fail(_)
        )
    }
}

/// Decode one state from its raw JSON definition, dispatching on the
/// `Type` tag. Unknown types are rejected rather than carried opaquely.
pub fn decode_state(name: &str, raw: &Value) -> Result<StateDefinition> {
    let state_type = raw
        .get("Type")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            DefinitionError::Deserialization(format!("state {name} has no Type field"))
        })?;

    if !KNOWN_STATE_TYPES.contains(&state_type) {
        return Err(DefinitionError::UnknownStateType(state_type.to_string()));
    }

    debug!("Decoding state {name} of type {state_type}");
    serde_json::from_value(raw.clone()).map_err(DefinitionError::from_serde)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_pass_state() {
        let raw = json!({
            "Type": "Pass",
            "Result": {"ok": true},
            "ResultPath": "$.check",
            "Next": "Done"
        });

        let state = decode_state("Check", &raw).unwrap();
        match state {
            StateDefinition::Pass(pass) => {
                assert_eq!(pass.result, Some(json!({"ok": true})));
                assert_eq!(pass.common.next.as_deref(), Some("Done"));
                assert!(!pass.common.end);
            }
            other => panic!("expected Pass, got {}", other.state_type()),
        }
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let raw = json!({"Type": "Loop", "Next": "Done"});
        assert_eq!(
            decode_state("Bad", &raw).unwrap_err(),
            DefinitionError::UnknownStateType("Loop".to_string())
        );
    }

    #[test]
    fn test_decode_rejects_missing_type() {
        let raw = json!({"Next": "Done"});
        assert!(matches!(
            decode_state("Bad", &raw).unwrap_err(),
            DefinitionError::Deserialization(_)
        ));
    }

    #[test]
    fn test_task_state_round_trips_through_json() {
        let raw = json!({
            "Type": "Task",
            "Resource": "script:notify.sh",
            "Parameters": {"Payload": "$"},
            "End": true
        });

        let state = decode_state("Notify", &raw).unwrap();
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
    }

    #[test]
    fn test_decode_map_state_recurses_into_iterator() {
        let raw = json!({
            "Type": "Map",
            "ItemsPath": "$.records",
            "MaxConcurrency": 4,
            "Iterator": {
                "StartAt": "Each",
                "States": {
                    "Each": {"Type": "Pass", "End": true}
                }
            },
            "End": true
        });

        let state = decode_state("FanOut", &raw).unwrap();
        match state {
            StateDefinition::Map(map) => {
                assert_eq!(map.iterator.start_at, "Each");
                assert!(map.iterator.states.contains_key("Each"));
                assert_eq!(map.max_concurrency, Some(4));
            }
            other => panic!("expected Map, got {}", other.state_type()),
        }
    }

    #[test]
    fn test_wait_state_timestamp_parses_rfc3339() {
        let raw = json!({
            "Type": "Wait",
            "Timestamp": "2026-03-01T08:00:00Z",
            "Next": "Go"
        });

        let state = decode_state("Hold", &raw).unwrap();
        match state {
            StateDefinition::Wait(wait) => {
                let ts = wait.timestamp.unwrap();
                assert_eq!(ts.to_rfc3339(), "2026-03-01T08:00:00+00:00");
                assert!(wait.seconds.is_none());
            }
            other => panic!("expected Wait, got {}", other.state_type()),
        }
    }

    #[test]
    fn test_common_state_helpers() {
        assert_eq!(CommonState::next_to("Go").next.as_deref(), Some("Go"));
        assert!(CommonState::end().end);
        assert!(!CommonState::next_to("Go").end);
    }

    #[test]
    fn test_choice_rule_serializes_only_set_fields() {
        let rule = ChoiceRule {
            variable: Some("$.status".to_string()),
            string_equals: Some("ready".to_string()),
            next: Some("Run".to_string()),
            ..ChoiceRule::default()
        };

        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({
                "Variable": "$.status",
                "StringEquals": "ready",
                "Next": "Run"
            })
        );
    }
}
