//! Plugin discovery and registration.
//!
//! Discovery lists the immediate entries of the plugins root. Loading turns
//! each unit into a [`Plugin`] and registers every command it exports under
//! the unit's name. Failures are logged per unit and never stop the scan.

use crate::manifest::PluginManifest;
use crate::native::{NativePluginLoader, is_plugin_library, library_unit_name};
use crate::{Plugin, PluginCatalog, PluginError, PluginUnit, UnitKind};
use calcshell_core::CommandRegistry;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// List the plugin units directly under `root`, sorted by name.
///
/// A missing or unreadable root yields no units and a warning.
pub fn discover(root: &Path) -> Vec<PluginUnit> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(root = %root.display(), error = %e, "Plugins directory not found");
            return Vec::new();
        }
    };

    let mut units: Vec<PluginUnit> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            let file_name = entry.file_name();
            let file_name = file_name.to_str()?;
            if file_name.starts_with('.') || file_name.starts_with('_') {
                return None;
            }
            if path.is_dir() {
                Some(PluginUnit::new(file_name, path, UnitKind::Directory))
            } else if is_plugin_library(&path) {
                let name = library_unit_name(&path)?;
                Some(PluginUnit::new(name, path, UnitKind::Library))
            } else {
                None
            }
        })
        .collect();

    units.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(root = %root.display(), count = units.len(), "Discovered plugin units");
    units
}

/// Outcome of a full load pass.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Units whose commands were registered.
    pub loaded: Vec<String>,
    /// Units disabled by their manifest.
    pub skipped: Vec<String>,
    /// Units that failed, with the reason.
    pub failed: Vec<(String, PluginError)>,
}

/// Discovers plugin units and registers their commands.
pub struct PluginLoader {
    root: PathBuf,
    catalog: PluginCatalog,
    native: NativePluginLoader,
    units: Vec<PluginUnit>,
    has_run: bool,
}

impl PluginLoader {
    pub fn new(root: impl Into<PathBuf>, catalog: PluginCatalog) -> Self {
        Self {
            root: root.into(),
            catalog,
            native: NativePluginLoader::new(),
            units: Vec::new(),
            has_run: false,
        }
    }

    /// Get the plugins root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Units seen by the last [`load_all`](Self::load_all) pass.
    pub fn units(&self) -> &[PluginUnit] {
        &self.units
    }

    /// Describe where a unit's code would come from, without loading it.
    pub fn source_of(&self, unit: &PluginUnit) -> String {
        match unit.kind {
            UnitKind::Library => format!("native library {}", unit.path.display()),
            UnitKind::Directory => match PluginManifest::load(&unit.path) {
                Ok(Some(manifest)) if !manifest.enabled => "disabled".into(),
                Ok(Some(manifest)) => match manifest.library_path(&unit.path) {
                    Some(lib) => format!("native library {}", lib.display()),
                    None => self.catalog_source(&unit.name),
                },
                Ok(None) => self.catalog_source(&unit.name),
                Err(e) => format!("invalid manifest ({e})"),
            },
        }
    }

    fn catalog_source(&self, name: &str) -> String {
        if self.catalog.contains(name) {
            "bundled".into()
        } else {
            "unknown".into()
        }
    }

    /// Discover every unit under the root and register its commands.
    ///
    /// Runs once per loader; later calls return an empty report.
    pub fn load_all(&mut self, registry: &mut CommandRegistry) -> LoadReport {
        let mut report = LoadReport::default();
        if self.has_run {
            debug!("Plugins already loaded, skipping");
            return report;
        }
        self.has_run = true;

        let mut units = discover(&self.root);
        for unit in &mut units {
            match self.load_and_register(unit, registry) {
                Ok(count) => {
                    info!(plugin = %unit.name, commands = count, "Plugin registered");
                    report.loaded.push(unit.name.clone());
                }
                Err(PluginError::Disabled(name)) => {
                    info!(plugin = %name, "Plugin disabled, skipping");
                    report.skipped.push(name);
                }
                Err(e) => {
                    error!(plugin = %unit.name, error = %e, "Failed to load plugin");
                    report.failed.push((unit.name.clone(), e));
                }
            }
        }
        self.units = units;
        report
    }

    /// Instantiate `unit` and register every exported command under the
    /// unit's own name.
    ///
    /// When a unit exports several commands they all land on the same key
    /// and the last one wins; a warning is logged. Returns the number of
    /// exported commands.
    pub fn load_and_register(
        &self,
        unit: &mut PluginUnit,
        registry: &mut CommandRegistry,
    ) -> Result<usize, PluginError> {
        if unit.loaded {
            return Err(PluginError::AlreadyLoaded(unit.name.clone()));
        }

        let plugin = catch_unwind(AssertUnwindSafe(|| self.instantiate(unit))).map_err(|_| {
            PluginError::LoadFailed(format!("plugin '{}' panicked while loading", unit.name))
        })??;

        debug!(plugin = %unit.name, description = plugin.description(), "Plugin instantiated");
        let commands = plugin.commands();
        if commands.is_empty() {
            return Err(PluginError::NoCommands(unit.name.clone()));
        }
        if commands.len() > 1 {
            warn!(
                plugin = %unit.name,
                exported = commands.len(),
                "Plugin exports several commands; only the last is reachable under its name"
            );
        }

        let count = commands.len();
        for command in commands {
            registry.register(&unit.name, command);
        }

        unit.loaded = true;
        unit.loaded_at = Some(chrono::Utc::now());
        Ok(count)
    }

    fn instantiate(&self, unit: &PluginUnit) -> Result<Box<dyn Plugin>, PluginError> {
        match unit.kind {
            // SAFETY: plugins are trusted local code.
            UnitKind::Library => unsafe { self.native.load(&unit.path) },
            UnitKind::Directory => {
                let manifest = PluginManifest::load(&unit.path)?.unwrap_or_default();
                if !manifest.enabled {
                    return Err(PluginError::Disabled(unit.name.clone()));
                }
                if let Some(library) = manifest.library_path(&unit.path) {
                    // SAFETY: plugins are trusted local code.
                    return unsafe { self.native.load(&library) };
                }
                self.catalog.create(&unit.name).ok_or_else(|| {
                    PluginError::NotFound(format!(
                        "'{}' is not a bundled plugin and declares no library",
                        unit.name
                    ))
                })
            }
        }
    }
}
