/*!
# Stepflow-rs

A lightweight library for authoring state-machine workflow definitions in Rust.

## Overview

Stepflow-rs builds the JSON definition documents consumed by a managed
state-machine orchestration engine. Definitions are assembled from typed
states (Pass, Task, Choice, Wait, Succeed, Fail, Parallel, Map) and from
custom task nodes that render themselves into Task states. The library
owns definition-time concerns only: building, decoding, validating, and
serializing documents. Execution, retries, and timeouts belong to the
hosting engine.

## Key Components

* **StateMachineBuilder**: the authoring scope into which states and task
  nodes are placed by name
* **StateMachine**: a decoded or authored definition document, validated
  and renderable to JSON
* **TaskNode**: a trait implemented by custom task types to produce their
  `{Resource, Parameters}` descriptor
* **ScriptTask**: the built-in custom task that invokes an external script
  resource by path
* **Expression**: a dynamic value, either a literal, a JSON path reference,
  or the whole current input

## Usage Example

```rust
use stepflow_rs::{ScriptTask, ScriptTaskConfig, StateMachineBuilder, Transition};

fn main() -> stepflow_rs::Result<()> {
    // A task invoking a script with the entire current input as payload
    let clean = ScriptTask::new("CleanInput", ScriptTaskConfig::new("transform/clean.py"));

    let machine = StateMachineBuilder::new()
        .comment("Nightly cleanup")
        .start_at("CleanInput")
        .task(&clean, Transition::End)
        .build()?;

    println!("{}", machine.render()?);
    Ok(())
}
```

## Explicit Payloads

A task payload may reference part of the runtime input instead of the
whole of it; the expression is forwarded unexamined:

```rust
use stepflow_rs::{Expression, ScriptTask, ScriptTaskConfig, TaskNode};

let config = ScriptTaskConfig::new("notify.sh")
    .with_payload(Expression::json_path("$.input.message"));
let notify = ScriptTask::new("Notify", config);

let descriptor = notify.render_descriptor();
assert_eq!(descriptor.resource, "script:notify.sh");
```

## Decoding Existing Documents

Existing definition documents decode into the same typed model and are
validated on load:

```rust
use stepflow_rs::StateMachine;

let machine = StateMachine::from_json(
    r#"{
        "StartAt": "Done",
        "States": { "Done": { "Type": "Succeed" } }
    }"#,
)
.unwrap();
assert_eq!(machine.start_at, "Done");
```
*/

pub mod definition;

// Re-export all public APIs for easier access
pub use definition::error::{DefinitionError, Result};
pub use definition::expression::{Expression, ROOT_PATH};
pub use definition::render::{ParamValue, render_object};
pub use definition::script::{SCRIPT_RESOURCE_PREFIX, ScriptTask, ScriptTaskConfig};
pub use definition::state_machine::{StateMachine, StateMachineBuilder, Transition};
pub use definition::states::{
    Branch, ChoiceRule, ChoiceState, CommonState, FailState, MapState, ParallelState, PassState,
    StateDefinition, SucceedState, TaskState, WaitState,
};
pub use definition::task::{
    Effect, PolicyStatement, TaskDescriptor, TaskExtensions, TaskMetrics, TaskNode,
};
