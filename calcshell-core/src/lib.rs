//! # Calcshell Core
//!
//! Core library for the calcshell interactive calculator.
//! Provides the command trait and registry, the persisted history store,
//! built-in commands, configuration and error types.

pub mod command;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;

// Re-export commonly used types at the crate root.
pub use command::{Command, CommandRegistry};
pub use commands::register_builtins;
pub use config::{ConfigOverrides, Environment, Settings, ShellConfig, load_config};
pub use error::{CalcError, CommandError, HistoryError, Result};
pub use history::{HistoryRecord, HistoryStore, Operation, Outcome};
