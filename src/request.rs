//! The preservation request: which loader and root recipe to run, plus
//! opaque per-plugin settings.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// A single preservation invocation.
///
/// `settings` maps plugin names (loader or recipe) to an opaque payload the
/// core never inspects; each plugin interprets and validates its own entry.
/// An absent map is treated as empty.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// Name of the loader that acquires the target.
    pub loader: String,
    /// Name of the root recipe; its transitive dependencies run first.
    pub recipe: String,
    /// Per-plugin settings, keyed by plugin name.
    #[serde(default)]
    pub settings: BTreeMap<String, Value>,
}

impl Request {
    /// Create a request with no settings.
    pub fn new(loader: impl Into<String>, recipe: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            recipe: recipe.into(),
            settings: BTreeMap::new(),
        }
    }

    /// Attach a settings payload for one plugin.
    pub fn with_setting(mut self, plugin: impl Into<String>, value: Value) -> Self {
        self.settings.insert(plugin.into(), value);
        self
    }

    /// Parse a request from operator-facing TOML.
    ///
    /// ```toml
    /// loader = "dir"
    /// recipe = "inventory"
    ///
    /// [settings.dir]
    /// path = "/srv/corpus"
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse preservation request")
    }

    /// The settings payload for `plugin`, or `Null` when none was supplied.
    pub fn settings_for(&self, plugin: &str) -> Value {
        self.settings.get(plugin).cloned().unwrap_or(Value::Null)
    }
}
