//! # Calcshell Plugins
//!
//! Plugin system for the calcshell calculator. A plugin unit is a
//! sub-directory (or a native shared library) under the plugins root; every
//! command a unit exports is registered under the unit's own name.
//!
//! Units are resolved through a [`PluginCatalog`] of compiled-in constructors,
//! or through a native library declared in the unit's `plugin.toml`.

pub mod catalog;
pub mod greet;
pub mod loader;
pub mod manifest;
pub mod native;

use calcshell_core::Command;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

pub use catalog::{PluginCatalog, PluginConstructor};
pub use greet::{GreetCommand, GreetPlugin};
pub use loader::{LoadReport, PluginLoader, discover};
pub use manifest::{MANIFEST_FILE, PluginManifest};
pub use native::{NativePluginLoader, PLUGIN_CREATE_SYMBOL};

/// Errors from plugin operations.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Plugin not found: {0}")]
    NotFound(String),
    #[error("Plugin already loaded: {0}")]
    AlreadyLoaded(String),
    #[error("Plugin disabled by manifest: {0}")]
    Disabled(String),
    #[error("Failed to load plugin: {0}")]
    LoadFailed(String),
    #[error("Invalid plugin manifest {path}: {reason}")]
    InvalidManifest { path: PathBuf, reason: String },
    #[error("Plugin exports no commands: {0}")]
    NoCommands(String),
}

/// The Plugin trait that all plugins must implement.
pub trait Plugin: Send + Sync {
    /// Commands exported by this plugin, in enumeration order.
    fn commands(&self) -> Vec<Arc<dyn Command>>;

    /// Human-readable description.
    fn description(&self) -> &str {
        ""
    }
}

/// How a unit was found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// A sub-directory of the plugins root.
    Directory,
    /// A shared library directly inside the plugins root.
    Library,
}

/// A named, loadable unit discovered under the plugins root.
#[derive(Debug, Clone)]
pub struct PluginUnit {
    /// Registry key for the unit's commands.
    pub name: String,
    pub path: PathBuf,
    pub kind: UnitKind,
    pub loaded: bool,
    pub loaded_at: Option<DateTime<Utc>>,
}

impl PluginUnit {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: UnitKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            loaded: false,
            loaded_at: None,
        }
    }
}
