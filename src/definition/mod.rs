pub mod error;
pub mod expression;
pub mod render;
pub mod script;
pub mod state_machine;
pub mod states;
pub mod task;

// Re-export key types for easier access
pub use error::{DefinitionError, Result};
pub use expression::{Expression, ROOT_PATH};
pub use render::{ParamValue, render_object};
pub use script::{SCRIPT_RESOURCE_PREFIX, ScriptTask, ScriptTaskConfig};
pub use state_machine::{StateMachine, StateMachineBuilder, Transition};
pub use states::{
    Branch, ChoiceRule, ChoiceState, CommonState, FailState, MapState, ParallelState, PassState,
    StateDefinition, SucceedState, TaskState, WaitState, decode_state,
};
pub use task::{Effect, PolicyStatement, TaskDescriptor, TaskExtensions, TaskMetrics, TaskNode};
