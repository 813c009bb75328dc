//! Shared fixtures for preservation run tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::anyhow;
use conserva::{Context, Error, Event, Label, Loader, PreserveTask, Recipe, Run, TaskState};
use serde_json::Value;

/// Loader producing a fixed string target, counting invocations.
pub struct StaticLoader {
    target: &'static str,
    pub calls: Rc<Cell<usize>>,
}

impl StaticLoader {
    pub fn new(target: &'static str) -> Self {
        Self {
            target,
            calls: Rc::new(Cell::new(0)),
        }
    }
}

impl Loader<String> for StaticLoader {
    fn load(&self, _settings: &Value) -> anyhow::Result<String> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.target.to_string())
    }
}

/// Loader that always fails.
pub struct BrokenLoader;

impl Loader<String> for BrokenLoader {
    fn load(&self, _settings: &Value) -> anyhow::Result<String> {
        Err(anyhow!("target unreachable"))
    }
}

/// One scripted action performed per resume of a [`ScriptRecipe`] task.
#[derive(Clone)]
pub enum Action {
    Log(&'static str),
    Declare(&'static str),
    Step(&'static str),
    Yield,
    Fail(&'static str),
}

/// Recipe that replays a fixed action script, then completes with `label`.
pub struct ScriptRecipe {
    name: &'static str,
    deps: Vec<&'static str>,
    script: Vec<Action>,
    label: Label,
}

impl ScriptRecipe {
    pub fn new(name: &'static str, deps: &[&'static str], label: Label) -> Box<Self> {
        Box::new(Self {
            name,
            deps: deps.to_vec(),
            script: Vec::new(),
            label,
        })
    }

    pub fn with_script(mut self: Box<Self>, script: &[Action]) -> Box<Self> {
        self.script = script.to_vec();
        self
    }
}

impl Recipe<String> for ScriptRecipe {
    fn name(&self) -> &str {
        self.name
    }

    fn dependencies(&self) -> Vec<String> {
        self.deps.iter().map(|d| d.to_string()).collect()
    }

    fn preserve(&self, ctx: Context<String>) -> Box<dyn PreserveTask> {
        Box::new(ScriptTask {
            ctx,
            script: self.script.iter().cloned().collect(),
            label: self.label.clone(),
        })
    }
}

struct ScriptTask {
    ctx: Context<String>,
    script: VecDeque<Action>,
    label: Label,
}

impl PreserveTask for ScriptTask {
    fn resume(&mut self) -> TaskState {
        match self.script.pop_front() {
            Some(Action::Log(message)) => {
                self.ctx.steps().log(message);
                TaskState::Running
            }
            Some(Action::Declare(step)) => {
                self.ctx.steps().declare(step);
                TaskState::Running
            }
            Some(Action::Step(step)) => {
                self.ctx.steps().step(step);
                TaskState::Running
            }
            Some(Action::Yield) => TaskState::Yielded,
            Some(Action::Fail(message)) => TaskState::Failed(anyhow!(message)),
            None => TaskState::Completed(self.label.clone()),
        }
    }
}

/// Drain a run to exhaustion, panicking on stream-level errors.
pub fn drain(run: &mut Run<'_, String>) -> Vec<Event> {
    run.map(|item| item.expect("unexpected stream error"))
        .collect()
}

/// Drain a run, returning events and the final stream-level error, if any.
pub fn drain_with_errors(run: &mut Run<'_, String>) -> (Vec<Event>, Vec<Error>) {
    let mut events = Vec::new();
    let mut errors = Vec::new();
    for item in run {
        match item {
            Ok(event) => events.push(event),
            Err(err) => errors.push(err),
        }
    }
    (events, errors)
}

/// Names of the recipes whose events appear, in first-appearance order.
pub fn scopes_seen(events: &[Event]) -> Vec<String> {
    let mut seen = Vec::new();
    for event in events {
        if let Some(name) = event.scope().first() {
            if !seen.contains(name) {
                seen.push(name.clone());
            }
        }
    }
    seen
}
