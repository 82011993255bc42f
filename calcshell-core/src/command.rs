//! Command registry: maps lowercased command names to handlers and dispatches raw input.
//!
//! The registry is populated at startup (built-ins first, then plugins) and
//! consulted once per input line. Registration never fails: a second command
//! registered under an existing name replaces the first.

use crate::error::CommandError;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Trait that all commands must implement.
pub trait Command: Send + Sync {
    /// Run the command with the positional arguments that followed its name.
    ///
    /// Output meant for the user goes to `out`. Problems the command can
    /// explain to the user (bad operands, zero divisor) should be written to
    /// `out` and reported as `Ok(())`; an `Err` is surfaced by the shell.
    fn execute(&self, args: &[&str], out: &mut dyn Write) -> Result<(), CommandError>;

    /// One-line description shown by `menu`.
    fn description(&self) -> &str {
        ""
    }
}

/// The command registry holds every registered command keyed by lowercase name.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register a command under `name`, lowercased.
    ///
    /// Any command already registered under the same key is replaced and
    /// returned.
    pub fn register(
        &mut self,
        name: &str,
        command: Arc<dyn Command>,
    ) -> Option<Arc<dyn Command>> {
        let key = name.to_lowercase();
        let previous = self.commands.insert(key.clone(), command);
        if previous.is_some() {
            debug!(command = %key, "Replaced existing command");
        } else {
            debug!(command = %key, "Registered command");
        }
        previous
    }

    /// Resolve the first whitespace-delimited token of `raw_input` and run it.
    ///
    /// Returns `Ok(false)` for blank input or an unknown name and `Ok(true)`
    /// once a handler has run. Only the command name is lowercased; argument
    /// tokens are passed through untouched. Errors returned by the command
    /// are propagated to the caller.
    pub fn dispatch(&self, raw_input: &str, out: &mut dyn Write) -> Result<bool, CommandError> {
        let mut tokens = raw_input.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(false);
        };
        let Some(command) = self.commands.get(&name.to_lowercase()) else {
            return Ok(false);
        };

        let args: Vec<&str> = tokens.collect();
        debug!(command = %name, args = args.len(), "Dispatching command");
        command.execute(&args, out)?;
        Ok(true)
    }

    /// Get a command by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(&name.to_lowercase()).cloned()
    }

    /// Whether a command is registered under `name` (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_lowercase())
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    /// Sorted `(name, description)` pairs for help output.
    pub fn describe(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .commands
            .iter()
            .map(|(name, cmd)| (name.clone(), cmd.description().to_string()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
