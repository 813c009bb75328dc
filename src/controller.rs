//! Per-recipe step lifecycle state machine.
//!
//! One controller exists per executing recipe. It is the sole source of
//! emitted events: the executor drives `begin`/`succeed`/`fail`, the recipe
//! drives `log`/`declare`/`step` through its [`StepHandle`]. After a
//! successful completion the executor consults the controller's state; only
//! the terminal [`ControllerState::Done`] confirms a consistent lifecycle
//! (every declared step finished, nothing stepped that was never declared).

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::event::{Event, Label, Scope, StepStatus};

/// Lifecycle state of a recipe's controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Created, `begin` not yet called.
    Pending,
    /// Executing. Also the resting state after an inconsistent completion.
    Running,
    /// Terminal: completed with a consistent step lifecycle.
    Done,
    /// Terminal: the recipe raised an error.
    Failed,
}

/// State machine tracking one recipe's step lifecycle.
#[derive(Debug)]
pub struct StepController {
    scope: Scope,
    state: ControllerState,
    outstanding: Vec<String>,
    consistent: bool,
}

impl StepController {
    pub fn new(recipe: &str) -> Self {
        Self {
            scope: vec![recipe.to_string()],
            state: ControllerState::Pending,
            outstanding: Vec::new(),
            consistent: true,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Steps declared but not yet finished.
    pub fn outstanding(&self) -> &[String] {
        &self.outstanding
    }

    pub fn begin(&mut self) -> Vec<Event> {
        self.state = ControllerState::Running;
        vec![Event::Begin {
            scope: self.scope.clone(),
        }]
    }

    pub fn log(&self, message: impl Into<String>) -> Vec<Event> {
        vec![Event::Log {
            scope: self.scope.clone(),
            message: message.into(),
        }]
    }

    /// Announce a step; it must be finished via [`step`](Self::step) before
    /// the recipe completes, or the controller will refuse to reach `Done`.
    pub fn declare(&mut self, step: impl Into<String>) -> Vec<Event> {
        let step = step.into();
        self.outstanding.push(step.clone());
        vec![Event::Declare {
            scope: self.scope.clone(),
            step,
        }]
    }

    /// Mark a declared step finished. Finishing a step that was never
    /// declared is remembered as an inconsistency.
    pub fn step(&mut self, step: &str) -> Vec<Event> {
        match self.outstanding.iter().position(|s| s == step) {
            Some(pos) => {
                self.outstanding.remove(pos);
            }
            None => self.consistent = false,
        }
        vec![Event::Step {
            scope: self.scope.clone(),
            step: step.to_string(),
            status: StepStatus::Completed,
        }]
    }

    /// Record successful completion. Transitions to `Done` only when the
    /// step lifecycle was consistent; otherwise the state stays `Running`
    /// and the executor aborts the run silently.
    pub fn succeed(&mut self, label: Label) -> Vec<Event> {
        if self.state == ControllerState::Running && self.consistent && self.outstanding.is_empty()
        {
            self.state = ControllerState::Done;
        }
        vec![Event::Succeed {
            scope: self.scope.clone(),
            label,
        }]
    }

    pub fn fail(&mut self, error: &anyhow::Error) -> Vec<Event> {
        self.state = ControllerState::Failed;
        vec![Event::Fail {
            scope: self.scope.clone(),
            error: format!("{error:#}"),
        }]
    }
}

/// Recipe-facing view of a [`StepController`].
///
/// Cheaply cloneable; events produced by controller calls are queued into
/// the run's shared outbox and surface in the output stream in call order.
/// Single logical thread of control, so plain `Rc`/`RefCell` suffices.
#[derive(Clone)]
pub struct StepHandle {
    controller: Rc<RefCell<StepController>>,
    outbox: Rc<RefCell<VecDeque<Event>>>,
}

impl StepHandle {
    pub(crate) fn new(
        controller: Rc<RefCell<StepController>>,
        outbox: Rc<RefCell<VecDeque<Event>>>,
    ) -> Self {
        Self { controller, outbox }
    }

    /// Emit a progress message.
    pub fn log(&self, message: impl Into<String>) {
        let events = self.controller.borrow().log(message);
        self.outbox.borrow_mut().extend(events);
    }

    /// Announce a step this recipe intends to perform.
    pub fn declare(&self, step: impl Into<String>) {
        let events = self.controller.borrow_mut().declare(step);
        self.outbox.borrow_mut().extend(events);
    }

    /// Mark a declared step finished.
    pub fn step(&self, step: &str) {
        let events = self.controller.borrow_mut().step(step);
        self.outbox.borrow_mut().extend(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_lifecycle_reaches_done() {
        let mut c = StepController::new("inventory");
        assert_eq!(c.state(), ControllerState::Pending);

        let begin = c.begin();
        assert!(matches!(begin[0], Event::Begin { .. }));
        assert_eq!(c.state(), ControllerState::Running);

        c.declare("scan");
        c.step("scan");
        c.succeed(json!("ok"));
        assert_eq!(c.state(), ControllerState::Done);
    }

    #[test]
    fn test_succeed_without_steps_is_done() {
        let mut c = StepController::new("trivial");
        c.begin();
        let events = c.succeed(Label::Null);
        assert!(matches!(events[0], Event::Succeed { .. }));
        assert_eq!(c.state(), ControllerState::Done);
    }

    #[test]
    fn test_undone_declared_step_blocks_done() {
        let mut c = StepController::new("checksum");
        c.begin();
        c.declare("verify");
        c.succeed(json!("partial"));
        assert_eq!(c.state(), ControllerState::Running);
        assert_eq!(c.outstanding(), ["verify"]);
    }

    #[test]
    fn test_undeclared_step_blocks_done() {
        let mut c = StepController::new("checksum");
        c.begin();
        c.step("surprise");
        c.succeed(Label::Null);
        assert_eq!(c.state(), ControllerState::Running);
    }

    #[test]
    fn test_fail_is_terminal() {
        let mut c = StepController::new("mirror");
        c.begin();
        let events = c.fail(&anyhow::anyhow!("remote gone"));
        match &events[0] {
            Event::Fail { scope, error } => {
                assert_eq!(scope, &vec!["mirror".to_string()]);
                assert!(error.contains("remote gone"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(c.state(), ControllerState::Failed);
    }

    #[test]
    fn test_handle_queues_events_in_call_order() {
        let controller = Rc::new(RefCell::new(StepController::new("a")));
        let outbox = Rc::new(RefCell::new(VecDeque::new()));
        let handle = StepHandle::new(Rc::clone(&controller), Rc::clone(&outbox));

        handle.log("starting");
        handle.declare("copy");
        handle.step("copy");

        let events: Vec<Event> = outbox.borrow_mut().drain(..).collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Event::Log { .. }));
        assert!(matches!(events[1], Event::Declare { .. }));
        assert!(matches!(
            events[2],
            Event::Step {
                status: StepStatus::Completed,
                ..
            }
        ));
        assert_eq!(controller.borrow().outstanding().len(), 0);
    }
}
