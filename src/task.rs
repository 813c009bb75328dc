//! Suspendable recipe computations.
//!
//! A recipe's work is modelled as an explicit state machine the executor
//! resumes one slice at a time, rather than a generator: each `resume` call
//! performs a bounded amount of work and reports what happened. Nothing runs
//! ahead of the consumer pulling on the event stream.

use std::collections::VecDeque;

use anyhow::anyhow;

use crate::event::Label;

/// Outcome of one `resume` call.
#[derive(Debug)]
pub enum TaskState {
    /// Progress was made; resume again.
    Running,
    /// The task handed control back after emitting events; resume again.
    Yielded,
    /// The task finished and produced its label.
    Completed(Label),
    /// The task raised an error; the run halts.
    Failed(anyhow::Error),
}

/// A resumable unit of recipe work.
///
/// Implementations own their context (captured when the recipe's `preserve`
/// constructed them) and report intermediate events through the context's
/// step handle, not through the return value.
pub trait PreserveTask {
    fn resume(&mut self) -> TaskState;
}

impl<F: FnMut() -> TaskState> PreserveTask for F {
    fn resume(&mut self) -> TaskState {
        self()
    }
}

/// Adapter for recipes that do all their work in a single resume.
pub struct Once<F> {
    work: Option<F>,
}

impl<F> Once<F>
where
    F: FnOnce() -> anyhow::Result<Label>,
{
    pub fn new(work: F) -> Self {
        Self { work: Some(work) }
    }
}

impl<F> PreserveTask for Once<F>
where
    F: FnOnce() -> anyhow::Result<Label>,
{
    fn resume(&mut self) -> TaskState {
        match self.work.take() {
            Some(work) => match work() {
                Ok(label) => TaskState::Completed(label),
                Err(err) => TaskState::Failed(err),
            },
            None => TaskState::Failed(anyhow!("task resumed after completion")),
        }
    }
}

/// Adapter for recipes that work in discrete stages.
///
/// Each `then` stage runs in its own resume and the task yields control
/// back to the executor between stages, so events queued by a stage drain
/// before the next stage runs. The `finish` stage produces the label.
#[derive(Default)]
pub struct Steps {
    work: VecDeque<Box<dyn FnOnce() -> anyhow::Result<()>>>,
    finish: Option<Box<dyn FnOnce() -> anyhow::Result<Label>>>,
}

impl Steps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an intermediate stage.
    pub fn then(mut self, stage: impl FnOnce() -> anyhow::Result<()> + 'static) -> Self {
        self.work.push_back(Box::new(stage));
        self
    }

    /// Set the completion stage. A task without one fails when it runs out
    /// of intermediate stages.
    pub fn finish(mut self, stage: impl FnOnce() -> anyhow::Result<Label> + 'static) -> Self {
        self.finish = Some(Box::new(stage));
        self
    }
}

impl PreserveTask for Steps {
    fn resume(&mut self) -> TaskState {
        if let Some(stage) = self.work.pop_front() {
            return match stage() {
                Ok(()) => TaskState::Yielded,
                Err(err) => TaskState::Failed(err),
            };
        }
        match self.finish.take() {
            Some(stage) => match stage() {
                Ok(label) => TaskState::Completed(label),
                Err(err) => TaskState::Failed(err),
            },
            None => TaskState::Failed(anyhow!("task has no completion stage")),
        }
    }
}
