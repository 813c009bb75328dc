//! Lifecycle events emitted while a preservation run executes.
//!
//! Every event carries a scope: the list of recipe names identifying the
//! recipe it belongs to (single-element in the current design). The whole
//! run is observable as one ordered sequence of these events, so a consumer
//! can reconstruct per-recipe progress without polling recipe internals.

use serde::Serialize;

/// Identifies which recipe an event belongs to.
pub type Scope = Vec<String>;

/// Opaque per-recipe result, visible to recipes executed later in the plan.
pub type Label = serde_json::Value;

/// Progress state of a declared step.
///
/// Recipes report steps only once finished, so the executor emits
/// `Completed` exclusively. `Running` exists for consumers that replay
/// or synthesize step events of their own, and renderers accept both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepStatus {
    Running,
    Completed,
}

/// An element of the emitted lifecycle stream.
///
/// Failures are carried as the rendered error chain rather than a live error
/// value so events stay cloneable and comparable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Event {
    /// A recipe started executing.
    Begin { scope: Scope },
    /// Free-form progress message from inside a recipe.
    Log { scope: Scope, message: String },
    /// A recipe announced a step it intends to perform.
    Declare { scope: Scope, step: String },
    /// Status change for a previously declared step.
    Step {
        scope: Scope,
        step: String,
        status: StepStatus,
    },
    /// A recipe completed and produced its label.
    Succeed { scope: Scope, label: Label },
    /// A recipe raised an error; the run halts after this event.
    Fail { scope: Scope, error: String },
}

impl Event {
    /// The scope this event belongs to.
    pub fn scope(&self) -> &Scope {
        match self {
            Event::Begin { scope }
            | Event::Log { scope, .. }
            | Event::Declare { scope, .. }
            | Event::Step { scope, .. }
            | Event::Succeed { scope, .. }
            | Event::Fail { scope, .. } => scope,
        }
    }

    /// Whether this event ends its recipe's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Succeed { .. } | Event::Fail { .. })
    }
}
