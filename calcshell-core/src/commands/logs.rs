//! `logs` and `clear_logs`: read or truncate the application log file.

use crate::command::Command;
use crate::error::CommandError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub struct ShowLogsCommand {
    log_file: PathBuf,
}

impl ShowLogsCommand {
    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        Self {
            log_file: log_file.into(),
        }
    }
}

impl Command for ShowLogsCommand {
    fn execute(&self, _args: &[&str], out: &mut dyn Write) -> Result<(), CommandError> {
        let contents = match std::fs::read_to_string(&self.log_file) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(CommandError::Execution {
                    command: "logs".into(),
                    message: format!("cannot read {}: {e}", self.log_file.display()),
                });
            }
        };

        if contents.trim().is_empty() {
            writeln!(out, "Log file is empty.")?;
        } else {
            writeln!(out, "Application Log History:")?;
            write!(out, "{contents}")?;
            if !contents.ends_with('\n') {
                writeln!(out)?;
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Show the application log"
    }
}

pub struct ClearLogsCommand {
    log_file: PathBuf,
}

impl ClearLogsCommand {
    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        Self {
            log_file: log_file.into(),
        }
    }
}

impl Command for ClearLogsCommand {
    fn execute(&self, _args: &[&str], out: &mut dyn Write) -> Result<(), CommandError> {
        // Truncate in place: the log writer keeps its append-mode handle.
        OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&self.log_file)
            .map_err(|e| CommandError::Execution {
                command: "clear_logs".into(),
                message: format!("cannot truncate {}: {e}", self.log_file.display()),
            })?;
        writeln!(out, "Application log history cleared.")?;
        info!("Application log cleared");
        Ok(())
    }

    fn description(&self) -> &str {
        "Clear the application log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn output(cmd: &dyn Command) -> String {
        let mut out = Vec::new();
        cmd.execute(&[], &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_logs_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let cmd = ShowLogsCommand::new(dir.path().join("app.log"));
        assert_eq!(output(&cmd), "Log file is empty.\n");
    }

    #[test]
    fn test_logs_prints_contents() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("app.log");
        std::fs::write(&log, "INFO started\nERROR Unknown command: foo").unwrap();

        let text = output(&ShowLogsCommand::new(&log));
        assert!(text.starts_with("Application Log History:\n"));
        assert!(text.contains("ERROR Unknown command: foo\n"));
    }

    #[test]
    fn test_clear_logs_truncates() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("app.log");
        std::fs::write(&log, "Test log entry\n").unwrap();

        let text = output(&ClearLogsCommand::new(&log));
        assert_eq!(text, "Application log history cleared.\n");
        assert_eq!(std::fs::read_to_string(&log).unwrap(), "");
        assert_eq!(output(&ShowLogsCommand::new(&log)), "Log file is empty.\n");
    }

    #[test]
    fn test_clear_logs_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let cmd = ClearLogsCommand::new(dir.path().join("missing").join("app.log"));
        let mut out = Vec::new();
        assert!(matches!(
            cmd.execute(&[], &mut out),
            Err(CommandError::Execution { .. })
        ));
    }
}
