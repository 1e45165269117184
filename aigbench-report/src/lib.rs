#![warn(missing_docs)]
//! AIGBench Report - Result Rows and Output
//!
//! Generates the result file of a run:
//! - CSV (one headerless line per case, the classic result sheet)
//! - JSON (rows plus run metadata)

mod csv;
mod json;
mod report;

pub use csv::{generate_csv_report, generate_csv_rows};
pub use json::generate_json_report;
pub use report::{ERROR, Report, ReportConfig, ReportMeta, Row, SystemInfo, TIMEOUT};

use serde::{Deserialize, Serialize};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Headerless CSV rows
    #[default]
    Csv,
    /// JSON with rows and metadata
    Json,
}

impl OutputFormat {
    /// Render a report in this format
    pub fn render(self, report: &Report) -> Result<String, serde_json::Error> {
        match self {
            OutputFormat::Csv => Ok(generate_csv_report(report)),
            OutputFormat::Json => generate_json_report(report),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
