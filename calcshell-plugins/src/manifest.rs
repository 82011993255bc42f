//! Optional per-unit `plugin.toml`.

use crate::PluginError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name of the manifest inside a unit directory.
pub const MANIFEST_FILE: &str = "plugin.toml";

/// Manifest describing how to load a unit directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginManifest {
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Disabled units are discovered but never loaded.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Native library implementing the unit, relative to the unit directory.
    #[serde(default)]
    pub library: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

impl Default for PluginManifest {
    fn default() -> Self {
        Self {
            description: None,
            enabled: true,
            library: None,
        }
    }
}

impl PluginManifest {
    /// Read `plugin.toml` from `unit_dir`. Returns `Ok(None)` when the unit
    /// has no manifest.
    pub fn load(unit_dir: &Path) -> Result<Option<Self>, PluginError> {
        let path = unit_dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path).map_err(|e| PluginError::InvalidManifest {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let manifest = toml::from_str(&data).map_err(|e| PluginError::InvalidManifest {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Some(manifest))
    }

    /// Absolute path of the declared library, if any.
    pub fn library_path(&self, unit_dir: &Path) -> Option<PathBuf> {
        self.library.as_ref().map(|lib| {
            if lib.is_absolute() {
                lib.clone()
            } else {
                unit_dir.join(lib)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        assert_eq!(PluginManifest::load(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_manifest_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "description = \"hi\"\n").unwrap();
        let manifest = PluginManifest::load(dir.path()).unwrap().unwrap();
        assert!(manifest.enabled);
        assert_eq!(manifest.description.as_deref(), Some("hi"));
        assert_eq!(manifest.library_path(dir.path()), None);
    }

    #[test]
    fn test_manifest_library_resolves_relative() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            "library = \"target/libstats.so\"\nenabled = false\n",
        )
        .unwrap();
        let manifest = PluginManifest::load(dir.path()).unwrap().unwrap();
        assert!(!manifest.enabled);
        assert_eq!(
            manifest.library_path(dir.path()),
            Some(dir.path().join("target/libstats.so"))
        );
    }

    #[test]
    fn test_manifest_rejects_unknown_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "entry = \"main\"\n").unwrap();
        let err = PluginManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, PluginError::InvalidManifest { .. }));
    }
}
