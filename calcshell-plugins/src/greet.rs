//! Bundled `greet` plugin.

use crate::Plugin;
use calcshell_core::{Command, CommandError};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

pub struct GreetPlugin;

impl Plugin for GreetPlugin {
    fn commands(&self) -> Vec<Arc<dyn Command>> {
        vec![Arc::new(GreetCommand)]
    }

    fn description(&self) -> &str {
        "Prints a greeting"
    }
}

pub struct GreetCommand;

impl Command for GreetCommand {
    fn execute(&self, _args: &[&str], out: &mut dyn Write) -> Result<(), CommandError> {
        info!("Hello, World!");
        writeln!(out, "Hello, World!")?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Print a greeting"
    }
}
