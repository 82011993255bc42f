//! Persisted log of arithmetic operations.
//!
//! The store keeps the full history in memory and rewrites the backing file
//! after every mutation. The file is a flat table with the header
//! `operation,operand1,operand2,result` followed by one row per record in
//! insertion order. Rewrites go through a `.tmp` sibling that is renamed into
//! place, so a crash mid-write leaves the previous file intact.
//!
//! One store is constructed per process and shared as `Arc<HistoryStore>`.
//! The disk is read exactly once, in [`HistoryStore::open`]; nothing reloads
//! it afterwards, so later appends can never be clobbered by a stale read.

use crate::error::HistoryError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Header row of the history file.
pub const HISTORY_HEADER: &str = "operation,operand1,operand2,result";

/// The arithmetic operation a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Add => "Add",
            Operation::Subtract => "Subtract",
            Operation::Multiply => "Multiply",
            Operation::Divide => "Divide",
        }
    }

    /// Apply the operation. Division by zero yields infinity or NaN here;
    /// callers check the divisor first.
    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operation::Add => lhs + rhs,
            Operation::Subtract => lhs - rhs,
            Operation::Multiply => lhs * rhs,
            Operation::Divide => lhs / rhs,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(Operation::Add),
            "subtract" => Ok(Operation::Subtract),
            "multiply" => Ok(Operation::Multiply),
            "divide" => Ok(Operation::Divide),
            other => Err(format!("unknown operation '{other}'")),
        }
    }
}

/// The result column: a number, or an error marker carried over from the file.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Value(f64),
    Error(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(v) => write!(f, "{}", format_number(*v)),
            Outcome::Error(marker) => write!(f, "{marker}"),
        }
    }
}

/// One logged arithmetic operation.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub operation: Operation,
    pub operand1: f64,
    pub operand2: f64,
    pub result: Outcome,
}

impl HistoryRecord {
    fn to_row(&self) -> String {
        let result = match &self.result {
            Outcome::Value(v) => format_number(*v),
            Outcome::Error(marker) => marker.replace([',', '\n', '\r'], " "),
        };
        format!(
            "{},{},{},{}",
            self.operation,
            format_number(self.operand1),
            format_number(self.operand2),
            result
        )
    }

    fn from_row(line_no: usize, row: &str) -> Result<Self, HistoryError> {
        let malformed = |reason: String| HistoryError::MalformedRecord {
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        let [operation, operand1, operand2, result] = fields.as_slice() else {
            return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
        };

        let operation = operation.parse::<Operation>().map_err(malformed)?;
        let operand1 = operand1
            .parse::<f64>()
            .map_err(|e| malformed(format!("operand1 '{operand1}': {e}")))?;
        let operand2 = operand2
            .parse::<f64>()
            .map_err(|e| malformed(format!("operand2 '{operand2}': {e}")))?;
        let result = match result.parse::<f64>() {
            Ok(v) => Outcome::Value(v),
            Err(_) => Outcome::Error(result.to_string()),
        };

        Ok(Self {
            operation,
            operand1,
            operand2,
            result,
        })
    }
}

/// Format a number the way the calculator prints it: whole values keep one
/// decimal place (`9.0`), everything else uses shortest round-trip form.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Serialize records into the on-disk table format.
fn encode(records: &[HistoryRecord]) -> String {
    let mut data = String::with_capacity(HISTORY_HEADER.len() + 1 + records.len() * 32);
    data.push_str(HISTORY_HEADER);
    data.push('\n');
    for record in records {
        data.push_str(&record.to_row());
        data.push('\n');
    }
    data
}

/// Parse the on-disk table format. Blank lines are ignored.
fn decode(data: &str) -> Result<Vec<HistoryRecord>, HistoryError> {
    let mut lines = data
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    match lines.next() {
        Some((_, header)) if header.trim() == HISTORY_HEADER => {}
        Some(_) => return Err(HistoryError::MissingHeader),
        None => return Ok(Vec::new()),
    }

    lines
        .map(|(idx, line)| HistoryRecord::from_row(idx + 1, line))
        .collect()
}

/// Write to a `.tmp` sibling, then rename over the target.
fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Shared, file-backed history of arithmetic operations.
pub struct HistoryStore {
    path: PathBuf,
    records: Mutex<Vec<HistoryRecord>>,
}

impl HistoryStore {
    /// Open the store at `path`, loading any existing records.
    ///
    /// A missing file yields an empty store. An unreadable or malformed file
    /// is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        let records = match std::fs::read_to_string(&path) {
            Ok(data) => decode(&data)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(HistoryError::Io { path, source }),
        };
        debug!(path = %path.display(), records = records.len(), "History loaded");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Open the store, falling back to an empty in-memory history if the
    /// existing file cannot be loaded. The failure is logged and returned
    /// alongside the store so the caller can show it.
    pub fn open_or_empty(path: impl Into<PathBuf>) -> (Self, Option<HistoryError>) {
        let path = path.into();
        match Self::open(path.clone()) {
            Ok(store) => (store, None),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not load history, starting empty");
                (
                    Self {
                        path,
                        records: Mutex::new(Vec::new()),
                    },
                    Some(e),
                )
            }
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record and rewrite the file.
    ///
    /// The record is kept in memory even if the write fails; the write error
    /// is returned so the caller can warn about it.
    pub fn append(
        &self,
        operation: Operation,
        operand1: f64,
        operand2: f64,
        result: f64,
    ) -> Result<(), HistoryError> {
        let mut records = self.lock();
        records.push(HistoryRecord {
            operation,
            operand1,
            operand2,
            result: Outcome::Value(result),
        });
        self.persist(&records)
    }

    /// Drop every record and rewrite the file with just the header.
    pub fn clear(&self) -> Result<(), HistoryError> {
        let mut records = self.lock();
        records.clear();
        self.persist(&records)
    }

    /// Snapshot of every record in insertion order.
    pub fn read_all(&self) -> Vec<HistoryRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // The lock is held across the write so concurrent callers never
    // interleave partial files.
    fn persist(&self, records: &[HistoryRecord]) -> Result<(), HistoryError> {
        atomic_write(&self.path, encode(records).as_bytes()).map_err(|source| {
            warn!(path = %self.path.display(), error = %source, "Failed to persist history");
            HistoryError::Io {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::open(dir.path().join("history.csv")).unwrap();
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_append_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");
        let store = HistoryStore::open(&path).unwrap();

        store.append(Operation::Add, 4.0, 5.0, 9.0).unwrap();
        store.append(Operation::Divide, 1.0, 4.0, 0.25).unwrap();

        let data = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            data,
            "operation,operand1,operand2,result\nAdd,4.0,5.0,9.0\nDivide,1.0,4.0,0.25\n"
        );
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_clear_leaves_only_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");
        let store = HistoryStore::open(&path).unwrap();
        store.append(Operation::Multiply, 2.0, 6.0, 12.0).unwrap();

        store.clear().unwrap();
        assert!(store.read_all().is_empty());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("{HISTORY_HEADER}\n")
        );
    }

    #[test]
    fn test_read_all_preserves_order() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::open(dir.path().join("h.csv")).unwrap();
        store.append(Operation::Subtract, 10.0, 3.0, 7.0).unwrap();
        store.append(Operation::Add, 1.0, 1.0, 2.0).unwrap();

        let ops: Vec<Operation> = store.read_all().iter().map(|r| r.operation).collect();
        assert_eq!(ops, vec![Operation::Subtract, Operation::Add]);
    }

    #[test]
    fn test_decode_keeps_error_marker() {
        let data = "operation,operand1,operand2,result\nDivide,10,0,Error: Division by zero\n";
        let records = decode(data).unwrap();
        assert_eq!(
            records[0].result,
            Outcome::Error("Error: Division by zero".into())
        );
        assert_eq!(records[0].operand1, 10.0);
    }

    #[test]
    fn test_decode_rejects_missing_header() {
        let err = decode("Add,1,2,3\n").unwrap_err();
        assert!(matches!(err, HistoryError::MissingHeader));
    }

    #[test]
    fn test_decode_reports_line_number() {
        let data = "operation,operand1,operand2,result\nAdd,1,2,3\nAdd,x,2,3\n";
        match decode(data).unwrap_err() {
            HistoryError::MalformedRecord { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_empty_file() {
        assert!(decode("").unwrap().is_empty());
        assert!(decode("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_open_or_empty_degrades_on_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");
        std::fs::write(&path, "garbage\n").unwrap();

        let (store, err) = HistoryStore::open_or_empty(&path);
        assert!(err.is_some());
        assert!(store.is_empty());

        store.append(Operation::Add, 1.0, 2.0, 3.0).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_failed_write_keeps_record_in_memory() {
        let dir = TempDir::new().unwrap();
        // A directory at the target path makes the rename fail.
        let path = dir.path().join("history.csv");
        std::fs::create_dir(&path).unwrap();

        let store = HistoryStore {
            path: path.clone(),
            records: Mutex::new(Vec::new()),
        };
        let result = store.append(Operation::Add, 1.0, 2.0, 3.0);
        assert!(matches!(result, Err(HistoryError::Io { .. })));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(9.0), "9.0");
        assert_eq!(format_number(-3.0), "-3.0");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(f64::INFINITY), "inf");
    }

    #[test]
    fn test_operation_parse_is_case_insensitive() {
        assert_eq!("ADD".parse::<Operation>().unwrap(), Operation::Add);
        assert_eq!(" divide ".parse::<Operation>().unwrap(), Operation::Divide);
        assert!("modulo".parse::<Operation>().is_err());
    }
}
