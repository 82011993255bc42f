//! Configuration system for calcshell.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/calcshell/config.toml` and/or `calcshell.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// Name of the environment variable selecting the active profile.
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Profile reported when `ENVIRONMENT` is not set.
pub const DEFAULT_ENVIRONMENT: &str = "PRODUCTION";

/// Name of the workspace-level config file.
pub const WORKSPACE_CONFIG_FILE: &str = "calcshell.toml";

/// Active deployment profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Environment {
    Development,
    Testing,
    #[default]
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Testing => write!(f, "testing"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!(
                "unknown environment '{other}' (expected development, testing or production)"
            )),
        }
    }
}

impl Environment {
    /// Profile named by a free-form setting such as the `ENVIRONMENT`
    /// variable. Unrecognised values fall back to `Production`.
    pub fn from_setting(value: &str) -> Self {
        value.parse().unwrap_or_else(|e: String| {
            warn!(value, error = %e, "Unrecognised environment, using production");
            Environment::Production
        })
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Environment> for String {
    fn from(env: Environment) -> Self {
        env.to_string()
    }
}

/// Shell configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Active profile.
    pub environment: Environment,
    /// Prompt printed before each read.
    pub prompt: String,
    /// Root directory scanned for plugin units.
    pub plugins_dir: PathBuf,
    /// Persisted history table.
    pub history_file: PathBuf,
    /// Directory holding `app.log`.
    pub logs_dir: PathBuf,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            prompt: ">>> ".into(),
            plugins_dir: PathBuf::from("plugins"),
            history_file: PathBuf::from("history.csv"),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

impl ShellConfig {
    /// Path of the application log file.
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir.join("app.log")
    }

    /// Resolve relative paths against `workspace`.
    pub fn resolve_paths(mut self, workspace: &Path) -> Self {
        for path in [
            &mut self.plugins_dir,
            &mut self.history_file,
            &mut self.logs_dir,
        ] {
            if path.is_relative() {
                *path = workspace.join(&*path);
            }
        }
        self
    }
}

/// Explicit overrides, typically from the command line. Unset fields leave
/// lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs_dir: Option<PathBuf>,
}

/// Path of the user-level config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "calcshell", "calcshell")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. The plain `ENVIRONMENT` variable (profile only, unknown values mean production)
/// 3. Environment variables (prefixed with `CALCSHELL_`)
/// 4. Workspace-local config (`calcshell.toml`)
/// 5. User config (`~/.config/calcshell/config.toml`)
/// 6. Built-in defaults
///
/// Relative paths in the result are resolved against `workspace`.
pub fn load_config(
    workspace: &Path,
    overrides: Option<&ConfigOverrides>,
) -> Result<ShellConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(ShellConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    let ws_config = workspace.join(WORKSPACE_CONFIG_FILE);
    if ws_config.exists() {
        figment = figment.merge(Toml::file(&ws_config));
    }

    // CALCSHELL_PROMPT, CALCSHELL_HISTORY_FILE, etc.
    figment = figment.merge(Env::prefixed("CALCSHELL_"));

    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let mut config: ShellConfig = figment.extract().map_err(Box::new)?;
    // The plain variable is shared with other tools, so it never fails the load.
    if let Ok(raw) = std::env::var(ENVIRONMENT_VAR) {
        config.environment = Environment::from_setting(&raw);
    }
    Ok(config.resolve_paths(workspace))
}

/// Snapshot of the process environment with plain string lookups.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Capture the current process environment.
    pub fn from_env() -> Self {
        Self {
            values: std::env::vars().collect(),
        }
    }

    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Look up a setting by exact key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The active profile name; [`DEFAULT_ENVIRONMENT`] when unset.
    pub fn environment(&self) -> &str {
        self.get(ENVIRONMENT_VAR).unwrap_or(DEFAULT_ENVIRONMENT)
    }

    /// Whether the profile name is one of the known [`Environment`]s.
    pub fn is_known_environment(&self) -> bool {
        self.environment().parse::<Environment>().is_ok()
    }
}
