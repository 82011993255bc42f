//! Built-in commands.

pub mod arithmetic;
pub mod history;
pub mod logs;
pub mod menu;

pub use arithmetic::ArithmeticCommand;
pub use history::{ClearHistoryCommand, ShowHistoryCommand};
pub use logs::{ClearLogsCommand, ShowLogsCommand};
pub use menu::MenuCommand;

use crate::command::CommandRegistry;
use crate::history::{HistoryStore, Operation};
use std::path::Path;
use std::sync::Arc;

/// Register the arithmetic, history and log commands.
///
/// `menu` is not included: it snapshots the registry and has to be added
/// after plugins are loaded.
pub fn register_builtins(registry: &mut CommandRegistry, history: Arc<HistoryStore>, log_file: &Path) {
    for op in [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ] {
        let cmd = ArithmeticCommand::new(op, history.clone());
        registry.register(cmd.name(), Arc::new(cmd));
    }
    registry.register("history", Arc::new(ShowHistoryCommand::new(history.clone())));
    registry.register("clear_history", Arc::new(ClearHistoryCommand::new(history)));
    registry.register("logs", Arc::new(ShowLogsCommand::new(log_file)));
    registry.register("clear_logs", Arc::new(ClearLogsCommand::new(log_file)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_register_builtins() {
        let dir = TempDir::new().unwrap();
        let history = Arc::new(HistoryStore::open(dir.path().join("h.csv")).unwrap());
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry, history, &dir.path().join("app.log"));

        assert_eq!(
            registry.names(),
            vec![
                "add",
                "clear_history",
                "clear_logs",
                "divide",
                "history",
                "logs",
                "multiply",
                "subtract",
            ]
        );
    }
}
