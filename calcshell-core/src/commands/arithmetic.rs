//! Binary arithmetic commands backed by the history store.

use crate::command::Command;
use crate::error::CommandError;
use crate::history::{HistoryStore, Operation, format_number};
use std::io::Write;
use std::sync::Arc;
use tracing::{error, info, warn};

/// `add x y`, `subtract x y`, `multiply x y` or `divide x y`.
pub struct ArithmeticCommand {
    operation: Operation,
    history: Arc<HistoryStore>,
}

impl ArithmeticCommand {
    pub fn new(operation: Operation, history: Arc<HistoryStore>) -> Self {
        Self { operation, history }
    }

    /// The registry name for this command (`add`, `subtract`, ...).
    pub fn name(&self) -> &'static str {
        match self.operation {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }

    fn parse_operands(&self, args: &[&str]) -> Result<(f64, f64), CommandError> {
        let invalid = |reason: String| CommandError::InvalidArguments {
            command: self.name().to_string(),
            reason,
        };

        let [lhs, rhs] = args else {
            return Err(invalid(format!(
                "expected 2 operands, got {}",
                args.len()
            )));
        };
        let lhs = lhs
            .parse::<f64>()
            .map_err(|_| invalid(format!("'{lhs}' is not a number")))?;
        let rhs = rhs
            .parse::<f64>()
            .map_err(|_| invalid(format!("'{rhs}' is not a number")))?;
        Ok((lhs, rhs))
    }

    fn evaluate(&self, args: &[&str]) -> Result<(f64, f64, f64), CommandError> {
        let (lhs, rhs) = self.parse_operands(args)?;
        if self.operation == Operation::Divide && rhs == 0.0 {
            return Err(CommandError::DivisionByZero);
        }
        Ok((lhs, rhs, self.operation.apply(lhs, rhs)))
    }
}

impl Command for ArithmeticCommand {
    fn execute(&self, args: &[&str], out: &mut dyn Write) -> Result<(), CommandError> {
        let (lhs, rhs, result) = match self.evaluate(args) {
            Ok(values) => values,
            Err(CommandError::DivisionByZero) => {
                error!("Attempted division by zero");
                writeln!(out, "Error: Division by zero")?;
                return Ok(());
            }
            Err(e @ CommandError::InvalidArguments { .. }) => {
                warn!(error = %e, "Rejected arithmetic input");
                writeln!(out, "Invalid input. {e}")?;
                writeln!(out, "Usage: {} <number> <number>", self.name())?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        info!(operation = %self.operation, lhs, rhs, result, "Computed");
        writeln!(out, "Result: {}", format_number(result))?;

        if let Err(e) = self.history.append(self.operation, lhs, rhs, result) {
            writeln!(out, "Warning: result not saved to history: {e}")?;
        }
        Ok(())
    }

    fn description(&self) -> &str {
        match self.operation {
            Operation::Add => "Add two numbers: add x y",
            Operation::Subtract => "Subtract y from x: subtract x y",
            Operation::Multiply => "Multiply two numbers: multiply x y",
            Operation::Divide => "Divide x by y: divide x y",
        }
    }
}
