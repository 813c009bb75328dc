//! Error types for the preservation pipeline.

use std::fmt;

use thiserror::Error;

/// Which registry a name was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Loader,
    Recipe,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleKind::Loader => write!(f, "loader"),
            ModuleKind::Recipe => write!(f, "recipe"),
        }
    }
}

/// Errors that abort a run before or outside recipe execution.
///
/// Errors raised *inside* a recipe are not represented here; they surface as
/// a `Fail` event in the output stream instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A requested or referenced plugin name is absent from its registry.
    #[error("unknown {kind} '{name}' (available: {})", .available.join(", "))]
    UnknownModule {
        kind: ModuleKind,
        name: String,
        available: Vec<String>,
    },

    /// The recipe graph contains a cycle reachable from the requested root.
    #[error("dependency cycle detected: '{from}' -> '{to}'")]
    DependencyCycle { from: String, to: String },

    /// The loader failed to acquire the target.
    #[error("loader '{loader}' failed: {error:#}")]
    LoadFailed {
        loader: String,
        error: anyhow::Error,
    },
}
