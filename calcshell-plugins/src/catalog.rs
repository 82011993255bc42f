//! Table of compiled-in plugin constructors, keyed by unit name.

use crate::Plugin;
use crate::greet::GreetPlugin;
use std::collections::HashMap;

/// Builds a fresh plugin instance.
pub type PluginConstructor = fn() -> Box<dyn Plugin>;

/// Compiled-in plugins that a unit directory can refer to by name.
#[derive(Default)]
pub struct PluginCatalog {
    constructors: HashMap<String, PluginConstructor>,
}

impl PluginCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Create a catalog with every plugin bundled in this crate.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register("greet", new_greet);
        catalog
    }

    /// Add a constructor. Replaces any constructor with the same name.
    pub fn register(&mut self, name: &str, constructor: PluginConstructor) {
        self.constructors.insert(name.to_lowercase(), constructor);
    }

    /// Instantiate the plugin registered under `name`.
    pub fn create(&self, name: &str) -> Option<Box<dyn Plugin>> {
        self.constructors
            .get(&name.to_lowercase())
            .map(|construct| construct())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(&name.to_lowercase())
    }

    /// Sorted constructor names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn new_greet() -> Box<dyn Plugin> {
    Box::new(GreetPlugin)
}
