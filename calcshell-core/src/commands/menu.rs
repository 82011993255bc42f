//! `menu`: lists every available command.

use crate::command::{Command, CommandRegistry};
use crate::error::CommandError;
use std::io::Write;

/// Prints the command list captured when the menu was built.
///
/// The menu is registered last, after plugins, so the snapshot covers every
/// command that can be dispatched in the session.
pub struct MenuCommand {
    entries: Vec<(String, String)>,
}

impl MenuCommand {
    /// Snapshot `registry`, adding the menu itself and any shell-level
    /// commands handled outside the registry (such as `exit`).
    pub fn from_registry(registry: &CommandRegistry, extra: &[(&str, &str)]) -> Self {
        let mut entries = registry.describe();
        entries.push(("menu".into(), "List all available commands".into()));
        for (name, description) in extra {
            entries.push((name.to_string(), description.to_string()));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.dedup_by(|a, b| a.0 == b.0);
        Self { entries }
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl Command for MenuCommand {
    fn execute(&self, _args: &[&str], out: &mut dyn Write) -> Result<(), CommandError> {
        writeln!(out, "Available commands: {}", self.names().join(", "))?;
        let width = self.entries.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        for (name, description) in &self.entries {
            if description.is_empty() {
                writeln!(out, "  {name}")?;
            } else {
                writeln!(out, "  {name:<width$}  {description}")?;
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "List all available commands"
    }
}
