//! JSON Output

use crate::report::Report;

/// Generate a prettified JSON report.
///
/// Unlike CSV, the JSON form carries the run metadata alongside the rows.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
