//! Native plugin loading: .so/.dll/.dylib libraries via libloading.
//!
//! A native plugin exposes a `calcshell_plugin_create` symbol returning a
//! boxed [`Plugin`] trait object. The library must be built with the same
//! compiler and `calcshell-core` version as the host.

use crate::{Plugin, PluginError};
use std::path::Path;

/// Symbol every native plugin library must export.
pub const PLUGIN_CREATE_SYMBOL: &[u8] = b"calcshell_plugin_create";

/// Loader for native dynamic library plugins.
#[derive(Debug, Default)]
pub struct NativePluginLoader;

impl NativePluginLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a plugin from a dynamic library path.
    ///
    /// # Safety
    ///
    /// Loading native plugins executes arbitrary code. Only load trusted plugins.
    pub unsafe fn load(&self, path: &Path) -> Result<Box<dyn Plugin>, PluginError> {
        if !path.exists() {
            return Err(PluginError::LoadFailed(format!(
                "library {} does not exist",
                path.display()
            )));
        }

        let lib = unsafe { libloading::Library::new(path) }
            .map_err(|e| PluginError::LoadFailed(format!("{}: {}", path.display(), e)))?;

        let raw = {
            let create_fn: libloading::Symbol<unsafe extern "C" fn() -> *mut dyn Plugin> =
                unsafe { lib.get(PLUGIN_CREATE_SYMBOL) }.map_err(|e| {
                    PluginError::LoadFailed(format!(
                        "Symbol 'calcshell_plugin_create' not found in {}: {}",
                        path.display(),
                        e
                    ))
                })?;
            unsafe { create_fn() }
        };

        if raw.is_null() {
            return Err(PluginError::LoadFailed(
                "Plugin creation function returned null".into(),
            ));
        }

        let plugin = unsafe { Box::from_raw(raw) };

        // Commands keep pointing into the library for the rest of the process.
        std::mem::forget(lib);

        Ok(plugin)
    }
}

/// Check if a file path looks like a plugin shared library.
pub fn is_plugin_library(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    matches!(ext, "so" | "dll" | "dylib")
}

/// Unit name for a library file: the file stem without a `lib` prefix.
pub fn library_unit_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let name = stem.strip_prefix("lib").unwrap_or(stem);
    (!name.is_empty()).then(|| name.to_string())
}
