use crate::definition::error::{DefinitionError, Result};
use crate::definition::states::{StateDefinition, TaskState, decode_state};
use crate::definition::task::{TaskExtensions, TaskNode};
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// A complete workflow definition document.
///
/// Holds the decoded or authored state graph together with the document
/// header fields. Each machine gets a generated id when it is created, used
/// only for correlating log output.
#[derive(Debug, Clone)]
pub struct StateMachine {
    pub id: String,
    pub comment: Option<String>,
    pub start_at: String,
    pub timeout_seconds: Option<i64>,
    pub version: Option<i64>,
    pub states: HashMap<String, StateDefinition>,
    /// Extension points collected from placed task nodes, keyed by state
    /// name; handed to the hosting framework at deployment time
    pub extensions: HashMap<String, TaskExtensions>,
}

/// Raw document shape; states are decoded individually afterwards
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Document {
    #[serde(default)]
    comment: Option<String>,
    start_at: String,
    #[serde(default)]
    timeout_seconds: Option<i64>,
    #[serde(default)]
    version: Option<i64>,
    states: HashMap<String, Value>,
}

impl StateMachine {
    /// Decode a definition document from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self> {
        let document: Document =
            serde_json::from_str(json_str).map_err(DefinitionError::from_serde)?;

        let mut states = HashMap::new();
        for (name, raw) in &document.states {
            states.insert(name.clone(), decode_state(name, raw)?);
        }

        let machine = StateMachine {
            id: Uuid::new_v4().to_string(),
            comment: document.comment,
            start_at: document.start_at,
            timeout_seconds: document.timeout_seconds,
            version: document.version,
            states,
            extensions: HashMap::new(),
        };

        debug!(
            "Decoded state machine {} with {} state(s), StartAt {}",
            machine.id,
            machine.states.len(),
            machine.start_at
        );

        machine.validate()?;
        Ok(machine)
    }

    /// Decode a definition document from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json_str = fs::read_to_string(path).map_err(DefinitionError::from_io)?;
        Self::from_json(&json_str)
    }

    /// Check graph consistency: StartAt and every transition target must
    /// name a known state, and every non-terminal state must either
    /// transition or end. Branches are checked recursively. Resource
    /// strings are never inspected.
    pub fn validate(&self) -> Result<()> {
        validate_states(&self.states, &self.start_at)
    }

    /// Render the definition document consumed by the orchestration engine
    pub fn render(&self) -> Result<Value> {
        let mut document = Map::new();
        if let Some(comment) = &self.comment {
            document.insert("Comment".to_string(), Value::String(comment.clone()));
        }
        document.insert("StartAt".to_string(), Value::String(self.start_at.clone()));
        if let Some(timeout) = self.timeout_seconds {
            document.insert("TimeoutSeconds".to_string(), timeout.into());
        }
        if let Some(version) = self.version {
            document.insert("Version".to_string(), version.into());
        }
        document.insert(
            "States".to_string(),
            serde_json::to_value(&self.states).map_err(DefinitionError::from_serde)?,
        );
        Ok(Value::Object(document))
    }
}

fn validate_states(states: &HashMap<String, StateDefinition>, start_at: &str) -> Result<()> {
    if !states.contains_key(start_at) {
        return Err(DefinitionError::InvalidStartAt(start_at.to_string()));
    }

    for (name, state) in states {
        for target in transition_targets(state) {
            if !states.contains_key(target) {
                warn!("State {name} transitions to unknown state {target}");
                return Err(DefinitionError::UnknownStateName(target.to_string()));
            }
        }

        if !has_outcome(state) {
            return Err(DefinitionError::BlankNext(name.clone()));
        }

        match state {
            StateDefinition::Parallel(parallel) => {
                for branch in &parallel.branches {
                    validate_states(&branch.states, &branch.start_at)?;
                }
            }
            StateDefinition::Map(map) => {
                validate_states(&map.iterator.states, &map.iterator.start_at)?;
            }
            _ => {}
        }
    }

    Ok(())
}

/// Every state name this state may hand control to
fn transition_targets(state: &StateDefinition) -> Vec<&str> {
    let mut targets = Vec::new();
    if let Some(next) = &state.common().next {
        targets.push(next.as_str());
    }
    if let StateDefinition::Choice(choice) = state {
        for rule in &choice.choices {
            if let Some(next) = &rule.next {
                targets.push(next.as_str());
            }
        }
        if let Some(default) = &choice.default {
            targets.push(default.as_str());
        }
    }
    targets
}

/// Whether the state either terminates the machine or hands control on
fn has_outcome(state: &StateDefinition) -> bool {
    if state.is_terminal_type() {
        return true;
    }
    if let StateDefinition::Choice(choice) = state {
        return choice.default.is_some() || choice.choices.iter().any(|rule| rule.next.is_some());
    }
    state.common().end || state.common().next.is_some()
}

/// Where a placed task node hands off control
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Transition to the named state
    Next(String),
    /// Terminate the machine after this state
    End,
}

impl Transition {
    pub fn next(name: impl Into<String>) -> Self {
        Transition::Next(name.into())
    }
}

/// Authoring scope for a workflow definition.
///
/// States are placed under unique names; custom task nodes are placed via
/// their descriptor. `build` checks the assembled graph and produces a
/// [`StateMachine`].
#[derive(Debug, Default)]
pub struct StateMachineBuilder {
    comment: Option<String>,
    start_at: Option<String>,
    timeout_seconds: Option<i64>,
    version: Option<i64>,
    states: Vec<(String, StateDefinition)>,
    extensions: Vec<(String, TaskExtensions)>,
}

impl StateMachineBuilder {
    pub fn new() -> Self {
        StateMachineBuilder::default()
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn start_at(mut self, name: impl Into<String>) -> Self {
        self.start_at = Some(name.into());
        self
    }

    pub fn timeout_seconds(mut self, seconds: i64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn version(mut self, version: i64) -> Self {
        self.version = Some(version);
        self
    }

    /// Place a typed state under the given name
    pub fn state(mut self, name: impl Into<String>, state: StateDefinition) -> Self {
        self.states.push((name.into(), state));
        self
    }

    /// Place a custom task node, rendering its descriptor into a Task state
    pub fn task(mut self, node: &dyn TaskNode, transition: Transition) -> Self {
        let descriptor = node.render_descriptor();
        let mut task = TaskState {
            resource: descriptor.resource,
            parameters: Some(descriptor.parameters),
            ..TaskState::default()
        };
        match transition {
            Transition::Next(next) => task.common.next = Some(next),
            Transition::End => task.common.end = true,
        }

        let name = node.state_id().to_string();
        self.extensions.push((name.clone(), node.extensions()));
        self.states.push((name, StateDefinition::Task(task)));
        self
    }

    /// Check the assembled graph and produce the definition
    pub fn build(self) -> Result<StateMachine> {
        let start_at = self
            .start_at
            .ok_or_else(|| DefinitionError::InvalidStartAt("StartAt is not set".to_string()))?;

        let mut states = HashMap::new();
        for (name, state) in self.states {
            if states.insert(name.clone(), state).is_some() {
                return Err(DefinitionError::DuplicateStateName(name));
            }
        }

        let machine = StateMachine {
            id: Uuid::new_v4().to_string(),
            comment: self.comment,
            start_at,
            timeout_seconds: self.timeout_seconds,
            version: self.version,
            states,
            extensions: self.extensions.into_iter().collect(),
        };

        machine.validate()?;
        Ok(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::states::{CommonState, PassState, SucceedState};
    use serde_json::json;

    fn pass_to(next: &str) -> StateDefinition {
        StateDefinition::Pass(PassState {
            common: CommonState::next_to(next),
            ..PassState::default()
        })
    }

    fn succeed() -> StateDefinition {
        StateDefinition::Succeed(SucceedState {
            common: CommonState::default(),
        })
    }

    #[test]
    fn test_build_and_render_document() {
        let machine = StateMachineBuilder::new()
            .comment("two step")
            .start_at("First")
            .state("First", pass_to("Done"))
            .state("Done", succeed())
            .build()
            .unwrap();

        assert_eq!(
            machine.render().unwrap(),
            json!({
                "Comment": "two step",
                "StartAt": "First",
                "States": {
                    "First": {"Type": "Pass", "Next": "Done"},
                    "Done": {"Type": "Succeed"}
                }
            })
        );
    }

    #[test]
    fn test_build_rejects_missing_start_at() {
        let err = StateMachineBuilder::new()
            .state("Only", succeed())
            .build()
            .unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidStartAt(_)));
    }

    #[test]
    fn test_build_rejects_duplicate_state_name() {
        let err = StateMachineBuilder::new()
            .start_at("Twice")
            .state("Twice", pass_to("Twice"))
            .state("Twice", succeed())
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::DuplicateStateName("Twice".to_string()));
    }

    #[test]
    fn test_build_rejects_unknown_transition_target() {
        let err = StateMachineBuilder::new()
            .start_at("First")
            .state("First", pass_to("Nowhere"))
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::UnknownStateName("Nowhere".to_string()));
    }

    #[test]
    fn test_build_rejects_state_without_outcome() {
        let dangling = StateDefinition::Pass(PassState::default());
        let err = StateMachineBuilder::new()
            .start_at("Stuck")
            .state("Stuck", dangling)
            .build()
            .unwrap_err();
        assert_eq!(err, DefinitionError::BlankNext("Stuck".to_string()));
    }

    #[test]
    fn test_from_json_assigns_distinct_ids() {
        let doc = json!({
            "StartAt": "Done",
            "States": {"Done": {"Type": "Succeed"}}
        })
        .to_string();

        let first = StateMachine::from_json(&doc).unwrap();
        let second = StateMachine::from_json(&doc).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_from_json_rejects_bad_start_at() {
        let doc = json!({
            "StartAt": "Missing",
            "States": {"Done": {"Type": "Succeed"}}
        })
        .to_string();

        assert_eq!(
            StateMachine::from_json(&doc).unwrap_err(),
            DefinitionError::InvalidStartAt("Missing".to_string())
        );
    }

    #[test]
    fn test_validate_recurses_into_branches() {
        let doc = json!({
            "StartAt": "FanOut",
            "States": {
                "FanOut": {
                    "Type": "Map",
                    "Iterator": {
                        "StartAt": "Gone",
                        "States": {"Each": {"Type": "Pass", "End": true}}
                    },
                    "End": true
                }
            }
        })
        .to_string();

        assert_eq!(
            StateMachine::from_json(&doc).unwrap_err(),
            DefinitionError::InvalidStartAt("Gone".to_string())
        );
    }
}
