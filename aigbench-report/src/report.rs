//! Report Data Structures

use aigbench_logs::{Cell, ParseFailure};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cell text of a case whose tool exited with a non-zero status
pub const ERROR: &str = "ERROR";
/// Cell text of a case killed at the wall-clock limit
pub const TIMEOUT: &str = "TIMEOUT";

/// Complete run report
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub rows: Vec<Row>,
}

/// One case's result: the case id followed by parser-specific cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub case: String,
    pub cells: Vec<Cell>,
}

impl Row {
    /// Row of parsed cells
    pub fn new(case: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            case: case.into(),
            cells,
        }
    }

    /// `[case, "ERROR"]`
    pub fn error(case: impl Into<String>) -> Self {
        Self::new(case, vec![Cell::text(ERROR)])
    }

    /// `[case, "TIMEOUT"]`
    pub fn timeout(case: impl Into<String>) -> Self {
        Self::new(case, vec![Cell::text(TIMEOUT)])
    }

    /// Single-cell row tagging a rejected log with the failed check
    pub fn diagnostic(case: impl Into<String>, failure: &ParseFailure) -> Self {
        Self::new(
            case,
            vec![Cell::text(format!("PARSE_ERROR({})", failure.code()))],
        )
    }

    /// Whether the cells are a harness status or diagnostic rather than parsed data
    pub fn is_status(&self) -> bool {
        match self.cells.as_slice() {
            [Cell::Text(text)] => {
                text == ERROR || text == TIMEOUT || text.starts_with("PARSE_ERROR(")
            }
            _ => false,
        }
    }

    /// All fields as text, case id first
    pub fn fields(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.case.clone()).chain(self.cells.iter().map(ToString::to_string))
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub system: SystemInfo,
    pub config: ReportConfig,
}

/// Run configuration captured in report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub method: String,
    pub executable: String,
    pub parser: String,
    pub option: String,
    pub before_command: String,
    pub after_command: String,
    pub timeout_secs: f64,
    pub jobs: usize,
    pub input_directory: String,
    pub log_directory: String,
    pub suffix: String,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu: String,
    pub cpu_cores: u32,
    pub memory_gb: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use aigbench_logs::ParserKind;

    #[test]
    fn test_status_rows() {
        let row = Row::error("a.aig");
        assert_eq!(row.fields().collect::<Vec<_>>(), vec!["a.aig", "ERROR"]);
        assert!(row.is_status());
        assert!(Row::timeout("b.aig").is_status());
    }

    #[test]
    fn test_diagnostic_row_is_single_cell() {
        let failure = ParserKind::AbcCheck.parse("").unwrap_err();
        let row = Row::diagnostic("c.aig", &failure);
        assert_eq!(row.cells.len(), 1);
        assert_eq!(row.cells[0].to_string(), "PARSE_ERROR(abc-check/missing/verdict)");
        assert!(row.is_status());
    }

    #[test]
    fn test_parsed_row_is_not_status() {
        let row = Row::new("d.aig", vec![Cell::text("UNSAT"), Cell::Seconds(1.0)]);
        assert!(!row.is_status());
        assert_eq!(row.fields().collect::<Vec<_>>(), vec!["d.aig", "UNSAT", "1.00"]);
    }
}
