//! CSV Output
//!
//! One line per row, case id first, no header: column meaning depends on the
//! method that produced the rows. Fields are quoted only when they contain a
//! delimiter, a quote or a line break.

use crate::report::{Report, Row};

/// Generate CSV text for all rows of a report
pub fn generate_csv_report(report: &Report) -> String {
    generate_csv_rows(&report.rows)
}

/// Generate CSV text for a slice of rows
pub fn generate_csv_rows(rows: &[Row]) -> String {
    let mut output = String::new();
    for row in rows {
        let line: Vec<String> = row.fields().map(|f| escape_field(&f)).collect();
        output.push_str(&line.join(","));
        output.push('\n');
    }
    output
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aigbench_logs::Cell;

    #[test]
    fn test_rows_render_in_order() {
        let rows = vec![
            Row::new("a.aig", vec![Cell::text("UNSAT"), Cell::Seconds(12.34)]),
            Row::error("b.aig"),
            Row::new(
                "c.aig",
                vec![Cell::text("SAT"), Cell::text("No TerSim"), Cell::Empty],
            ),
        ];
        assert_eq!(
            generate_csv_rows(&rows),
            "a.aig,UNSAT,12.34\nb.aig,ERROR\nc.aig,SAT,No TerSim,\n"
        );
    }

    #[test]
    fn test_quoting() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }
}
