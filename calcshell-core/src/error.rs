//! Error types for the calcshell core library.
//!
//! Uses `thiserror` for public API error types, split by the subsystem that
//! raises them: command execution, history persistence and configuration.

use std::path::PathBuf;

/// Top-level error type for the calcshell core library.
#[derive(Debug, thiserror::Error)]
pub enum CalcError {
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while executing a command.
///
/// Only errors returned from `Command::execute` reach the shell. Recoverable
/// user mistakes (bad operands, zero divisor) are reported by the command
/// itself and never travel this far.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid arguments for '{command}': {reason}")]
    InvalidArguments { command: String, reason: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Command '{command}' failed: {message}")]
    Execution { command: String, message: String },

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from loading or writing the persisted history file.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("History file {path} could not be accessed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed history record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("History file is missing the header row")]
    MissingHeader,
}

/// Convenience type alias for core results.
pub type Result<T> = std::result::Result<T, CalcError>;
