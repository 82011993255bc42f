//! `history` and `clear_history`.

use crate::command::Command;
use crate::error::CommandError;
use crate::history::{HistoryRecord, HistoryStore, format_number};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

/// Prints every recorded operation as a table.
pub struct ShowHistoryCommand {
    history: Arc<HistoryStore>,
}

impl ShowHistoryCommand {
    pub fn new(history: Arc<HistoryStore>) -> Self {
        Self { history }
    }
}

impl Command for ShowHistoryCommand {
    fn execute(&self, _args: &[&str], out: &mut dyn Write) -> Result<(), CommandError> {
        let records = self.history.read_all();
        if records.is_empty() {
            writeln!(out, "No history recorded.")?;
        } else {
            write!(out, "{}", render_table(&records))?;
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Display calculation history"
    }
}

/// Empties the history and its file.
pub struct ClearHistoryCommand {
    history: Arc<HistoryStore>,
}

impl ClearHistoryCommand {
    pub fn new(history: Arc<HistoryStore>) -> Self {
        Self { history }
    }
}

impl Command for ClearHistoryCommand {
    fn execute(&self, _args: &[&str], out: &mut dyn Write) -> Result<(), CommandError> {
        match self.history.clear() {
            Ok(()) => {
                info!("History cleared");
                writeln!(out, "History cleared.")?;
            }
            Err(e) => {
                writeln!(out, "History cleared in memory, but the file was not updated: {e}")?;
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Clear all history records"
    }
}

/// Render records as a fixed-width table with a leading index column.
pub fn render_table(records: &[HistoryRecord]) -> String {
    let headers = ["#", "operation", "operand1", "operand2", "result"];
    let rows: Vec<[String; 5]> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            [
                i.to_string(),
                r.operation.to_string(),
                format_number(r.operand1),
                format_number(r.operand2),
                r.result.to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut table = String::new();
    let header_cells: Vec<String> = headers
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{h:>w$}"))
        .collect();
    table.push_str(header_cells.join("  ").trim_end());
    table.push('\n');
    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:>w$}"))
            .collect();
        table.push_str(&cells.join("  "));
        table.push('\n');
    }
    table
}
