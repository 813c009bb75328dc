//! Pluggable preservation pipeline.
//!
//! A preservation request names a loader and a root recipe. The loader
//! acquires the target resource; the planner resolves the recipe's
//! dependency graph into an ordered plan; the executor runs every required
//! recipe in dependency order, streaming lifecycle events to the caller as
//! a lazy, pull-driven sequence. Each recipe produces an opaque label that
//! recipes executed later can read.
//!
//! Loaders and recipes are supplied by name through explicit registries;
//! the core never inspects their settings payloads.
//!
//! # Example
//!
//! ```
//! use conserva::{task, Context, Event, Loader, LoaderRegistry, PreserveTask,
//!                Recipe, RecipeRegistry, Request};
//! use serde_json::{json, Value};
//!
//! struct DirLoader;
//!
//! impl Loader<String> for DirLoader {
//!     fn load(&self, _settings: &Value) -> anyhow::Result<String> {
//!         Ok("corpus".to_string())
//!     }
//! }
//!
//! struct Inventory;
//!
//! impl Recipe<String> for Inventory {
//!     fn name(&self) -> &str {
//!         "inventory"
//!     }
//!
//!     fn preserve(&self, ctx: Context<String>) -> Box<dyn PreserveTask> {
//!         Box::new(task::Once::new(move || {
//!             ctx.steps().log(format!("scanning {}", ctx.target()));
//!             Ok(json!({ "files": 3 }))
//!         }))
//!     }
//! }
//!
//! # fn main() -> Result<(), conserva::Error> {
//! let mut loaders = LoaderRegistry::<String>::new();
//! loaders.insert("dir", Box::new(DirLoader));
//! let mut recipes = RecipeRegistry::<String>::new();
//! recipes.add(Box::new(Inventory));
//!
//! let mut run = conserva::run(Request::new("dir", "inventory"), &loaders, &recipes)?;
//! let events: Vec<Event> = run.by_ref().collect::<Result<_, _>>()?;
//!
//! assert!(matches!(events.first(), Some(Event::Begin { .. })));
//! assert!(matches!(events.last(), Some(Event::Succeed { .. })));
//! assert_eq!(run.labels()["inventory"], json!({ "files": 3 }));
//! # Ok(())
//! # }
//! ```

mod context;
mod controller;
mod error;
mod event;
mod executor;
mod planner;
mod registry;
mod request;

pub mod report;
pub mod task;

pub use context::Context;
pub use controller::{ControllerState, StepController, StepHandle};
pub use error::{Error, ModuleKind};
pub use event::{Event, Label, Scope, StepStatus};
pub use executor::{run, Run};
pub use planner::plan;
pub use registry::{Loader, LoaderRegistry, Recipe, RecipeRegistry, Registry};
pub use request::Request;
pub use task::{PreserveTask, TaskState};
