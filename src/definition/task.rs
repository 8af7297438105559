use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serializable record describing a task node's resource and parameters.
///
/// Produced on demand by [`TaskNode::render_descriptor`] and consumed by
/// definition rendering; not retained afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskDescriptor {
    /// Resource reference string, e.g. `"script:transform/clean.py"`
    pub resource: String,
    /// Parameters object with all dynamic expressions already resolved
    pub parameters: Value,
}

/// Runtime metric emission settings a task node may request from the
/// hosting framework
#[derive(Debug, Clone, PartialEq)]
pub struct TaskMetrics {
    pub prefix: String,
    pub dimensions: Vec<(String, String)>,
}

/// An IAM-like policy statement a task node may require at deployment time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Optional extension points a task node may populate.
///
/// Declining an extension is an explicit choice, not an absent field:
/// nodes that want neither return [`TaskExtensions::none`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskExtensions {
    pub metrics: Option<TaskMetrics>,
    pub policies: Option<Vec<PolicyStatement>>,
}

impl TaskExtensions {
    /// The explicit "no metrics, no policies" choice
    pub fn none() -> Self {
        TaskExtensions {
            metrics: None,
            policies: None,
        }
    }
}

/// A custom task type placeable in a workflow graph.
///
/// Implementors supply an identity for placement and a descriptor; the
/// hosting framework consumes any value satisfying this interface, so no
/// base type is extended.
pub trait TaskNode {
    /// Identity under which the node is placed in the workflow graph
    fn state_id(&self) -> &str;

    /// Deterministically produce the descriptor for this node
    fn render_descriptor(&self) -> TaskDescriptor;

    /// Extension points consumed at deployment time; defaults to
    /// declining both
    fn extensions(&self) -> TaskExtensions {
        TaskExtensions::none()
    }
}
