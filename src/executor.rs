//! The orchestration function and the pull-driven event stream it returns.
//!
//! [`run`] validates the request and builds the plan eagerly, then hands
//! back a [`Run`]: a lazy iterator over lifecycle events. Nothing beyond
//! validation and planning executes ahead of the consumer's demand for the
//! next event. The loader runs on the first pull; each recipe's task is
//! resumed only while the consumer keeps pulling. Dropping the iterator
//! abandons whatever has not run yet.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::context::Context;
use crate::controller::{ControllerState, StepController, StepHandle};
use crate::error::Error;
use crate::event::{Event, Label};
use crate::planner;
use crate::registry::{Loader, LoaderRegistry, RecipeRegistry};
use crate::request::Request;
use crate::task::{PreserveTask, TaskState};

/// Validate a request and prepare its execution.
///
/// Fails without emitting any event if the loader, the root recipe, or any
/// transitively referenced recipe is missing from its registry, or if the
/// reachable recipe graph contains a cycle. On success the returned [`Run`]
/// performs all remaining work lazily.
pub fn run<'a, T>(
    request: Request,
    loaders: &'a LoaderRegistry<T>,
    recipes: &'a RecipeRegistry<T>,
) -> Result<Run<'a, T>, Error> {
    let loader = loaders.lookup(&request.loader)?;
    recipes.lookup(&request.recipe)?;
    let plan = planner::plan(&request.recipe, recipes)?;

    Ok(Run {
        request,
        loader,
        recipes,
        plan,
        labels: BTreeMap::new(),
        pending: Rc::new(RefCell::new(VecDeque::new())),
        phase: Phase::Load,
    })
}

/// Execution phase. The target is acquired by `Load` and threaded through
/// every later phase, so a recipe can only ever start with a target in
/// hand.
enum Phase<T> {
    /// Acquire the target on the next pull.
    Load,
    /// Start the plan entry at this index.
    Next { index: usize, target: Rc<T> },
    /// Resume the in-flight recipe task.
    Drive {
        index: usize,
        target: Rc<T>,
        task: Box<dyn PreserveTask>,
        controller: Rc<RefCell<StepController>>,
    },
    /// Terminated: success, failure, or silent abort.
    Finished,
}

/// An in-progress preservation run, consumed as an ordered event stream.
///
/// The stream is finite and ends in exactly one of: a `Succeed` event for
/// the root recipe (success), a `Fail` event for some recipe (failure), or
/// truncation after a `Succeed` whose controller never reached `Done`
/// (silent abort — no terminal event beyond that `Succeed`, callers infer
/// the abort from the truncation). A loader failure surfaces as the
/// stream's single `Err` item.
pub struct Run<'a, T> {
    request: Request,
    loader: &'a dyn Loader<T>,
    recipes: &'a RecipeRegistry<T>,
    plan: Vec<String>,
    labels: BTreeMap<String, Label>,
    /// Shared outbox: step handles push into it mid-resume, the iterator
    /// pops from it one event per pull.
    pending: Rc<RefCell<VecDeque<Event>>>,
    phase: Phase<T>,
}

impl<T> std::fmt::Debug for Run<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Run")
            .field("request", &self.request)
            .field("plan", &self.plan)
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

impl<T> Run<'_, T> {
    /// The dependency-ordered plan this run executes.
    pub fn plan(&self) -> &[String] {
        &self.plan
    }

    /// Labels recorded so far; one entry per successfully completed recipe.
    pub fn labels(&self) -> &BTreeMap<String, Label> {
        &self.labels
    }

    /// Consume the run, keeping the recorded labels.
    pub fn into_labels(self) -> BTreeMap<String, Label> {
        self.labels
    }

    fn start_recipe(&mut self, index: usize, target: Rc<T>) -> Result<Phase<T>, Error> {
        let name = self.plan[index].clone();
        let recipe = self.recipes.lookup(&name)?;

        let controller = Rc::new(RefCell::new(StepController::new(&name)));
        let begin = controller.borrow_mut().begin();
        self.pending.borrow_mut().extend(begin);

        let ctx = Context::new(
            Rc::clone(&target),
            self.labels.clone(),
            self.request.settings_for(&name),
            StepHandle::new(Rc::clone(&controller), Rc::clone(&self.pending)),
        );
        let task = recipe.preserve(ctx);

        Ok(Phase::Drive {
            index,
            target,
            task,
            controller,
        })
    }
}

impl<T> Iterator for Run<'_, T> {
    type Item = Result<Event, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.pending.borrow_mut().pop_front() {
                return Some(Ok(event));
            }

            match std::mem::replace(&mut self.phase, Phase::Finished) {
                Phase::Load => {
                    let settings = self.request.settings_for(&self.request.loader);
                    match self.loader.load(&settings) {
                        Ok(target) => {
                            self.phase = Phase::Next {
                                index: 0,
                                target: Rc::new(target),
                            };
                        }
                        Err(error) => {
                            return Some(Err(Error::LoadFailed {
                                loader: self.request.loader.clone(),
                                error,
                            }));
                        }
                    }
                }
                Phase::Next { index, target } => {
                    if index >= self.plan.len() {
                        return None;
                    }
                    match self.start_recipe(index, target) {
                        Ok(phase) => self.phase = phase,
                        Err(err) => return Some(Err(err)),
                    }
                }
                Phase::Drive {
                    index,
                    target,
                    mut task,
                    controller,
                } => match task.resume() {
                    TaskState::Running | TaskState::Yielded => {
                        self.phase = Phase::Drive {
                            index,
                            target,
                            task,
                            controller,
                        };
                    }
                    TaskState::Completed(label) => {
                        let mut ctrl = controller.borrow_mut();
                        let events = ctrl.succeed(label.clone());
                        self.pending.borrow_mut().extend(events);
                        if ctrl.state() == ControllerState::Done {
                            self.labels.insert(self.plan[index].clone(), label);
                            self.phase = Phase::Next {
                                index: index + 1,
                                target,
                            };
                        }
                        // Not Done: inconsistent step lifecycle. The queued
                        // Succeed still drains, then the stream ends with no
                        // label recorded and nothing further executed.
                    }
                    TaskState::Failed(error) => {
                        let events = controller.borrow_mut().fail(&error);
                        self.pending.borrow_mut().extend(events);
                        // The Fail event drains, then the stream ends.
                    }
                },
                Phase::Finished => return None,
            }
        }
    }
}
