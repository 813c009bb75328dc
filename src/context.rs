//! Execution context handed to each recipe.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;

use crate::controller::StepHandle;
use crate::event::Label;

/// Everything a recipe sees while it runs: the shared target, a snapshot of
/// the labels recorded so far, its own settings payload, and the step handle
/// for reporting progress.
///
/// The labels snapshot is taken when the recipe starts; a dependency's label
/// is present only if that recipe already completed successfully. The
/// snapshot is never updated mid-recipe.
pub struct Context<T> {
    target: Rc<T>,
    labels: BTreeMap<String, Label>,
    settings: Value,
    steps: StepHandle,
}

impl<T> Context<T> {
    pub(crate) fn new(
        target: Rc<T>,
        labels: BTreeMap<String, Label>,
        settings: Value,
        steps: StepHandle,
    ) -> Self {
        Self {
            target,
            labels,
            settings,
            steps,
        }
    }

    /// The target acquired by the loader, shared read-only across the run.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// A shared handle to the target, for tasks that need to keep it.
    pub fn share_target(&self) -> Rc<T> {
        Rc::clone(&self.target)
    }

    /// Labels of recipes that completed before this one started.
    pub fn labels(&self) -> &BTreeMap<String, Label> {
        &self.labels
    }

    /// The label a named recipe produced, if it has completed.
    pub fn label(&self, recipe: &str) -> Option<&Label> {
        self.labels.get(recipe)
    }

    /// This recipe's settings payload; `Null` when the request carried none.
    pub fn settings(&self) -> &Value {
        &self.settings
    }

    /// Handle for `log`/`declare`/`step` progress reporting.
    pub fn steps(&self) -> &StepHandle {
        &self.steps
    }
}
