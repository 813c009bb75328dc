//! Plugin traits and the name-keyed registries they are served from.
//!
//! Registration is explicit: the embedding application constructs the
//! registries and inserts every loader and recipe by name. Lookup failures
//! name the missing identifier and list every valid alternative, so a typo
//! in a request or a dependency array is diagnosable without reading code.

use std::collections::HashMap;

use serde_json::Value;

use crate::context::Context;
use crate::error::{Error, ModuleKind};
use crate::task::PreserveTask;

/// Acquires the target resource for a run.
///
/// `T` is the target type, chosen by the embedding application. The loader
/// runs once per request, lazily, when the consumer first pulls on the event
/// stream.
pub trait Loader<T> {
    /// Acquire the target. `settings` is this loader's entry from the
    /// request's settings map, or `Null` when none was supplied.
    fn load(&self, settings: &Value) -> anyhow::Result<T>;
}

/// A named unit of preservation work with declared dependencies.
pub trait Recipe<T> {
    /// Registry key; also the single element of this recipe's event scope.
    fn name(&self) -> &str;

    /// Names of recipes that must run before this one.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Start this recipe's computation. The returned task is resumed by the
    /// executor until it completes with a label or fails.
    fn preserve(&self, ctx: Context<T>) -> Box<dyn PreserveTask>;
}

impl<T> std::fmt::Debug for dyn Recipe<T> + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recipe").field("name", &self.name()).finish()
    }
}

/// Name-keyed plugin registry.
pub struct Registry<P: ?Sized> {
    kind: ModuleKind,
    entries: HashMap<String, Box<P>>,
}

/// Registry of loaders producing targets of type `T`.
pub type LoaderRegistry<T> = Registry<dyn Loader<T>>;

/// Registry of recipes operating on targets of type `T`.
pub type RecipeRegistry<T> = Registry<dyn Recipe<T>>;

impl<P: ?Sized> Registry<P> {
    fn with_kind(kind: ModuleKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    /// Register a plugin under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, plugin: Box<P>) {
        self.entries.insert(name.into(), plugin);
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetch a plugin, failing with a diagnostic that names the missing
    /// identifier and every valid alternative.
    pub fn lookup(&self, name: &str) -> Result<&P, Error> {
        match self.entries.get(name) {
            Some(plugin) => Ok(plugin.as_ref()),
            None => Err(Error::UnknownModule {
                kind: self.kind,
                name: name.to_string(),
                available: self.names(),
            }),
        }
    }
}

impl<T> Registry<dyn Loader<T>> {
    pub fn new() -> Self {
        Self::with_kind(ModuleKind::Loader)
    }
}

impl<T> Default for Registry<dyn Loader<T>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<dyn Recipe<T>> {
    pub fn new() -> Self {
        Self::with_kind(ModuleKind::Recipe)
    }

    /// Register a recipe under its own name.
    pub fn add(&mut self, recipe: Box<dyn Recipe<T>>) {
        self.insert(recipe.name().to_string(), recipe);
    }
}

impl<T> Default for Registry<dyn Recipe<T>> {
    fn default() -> Self {
        Self::new()
    }
}
