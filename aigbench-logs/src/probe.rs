//! Network Probes
//!
//! Probes read a value printed on a line at a fixed distance below a command
//! echo, so they walk the log with lookahead instead of a rule table.

use crate::cell::Cell;
use crate::failure::{Field, Violation};
use crate::matcher::int_at;

const AND_COUNT_MARKER: &str = "ia2b> test network -and";
const LEVEL_MARKER: &str = "ia2b> print network -le";

/// Distance from the level marker to the line carrying the level count
const LEVEL_LINE_OFFSET: usize = 2;
/// Byte offset where the level count starts on its line
const LEVEL_VALUE_START: usize = 6;
/// The balance script prints the network before and after balancing
const LEVEL_REPORTS: usize = 2;

/// AND count printed on the line right after the first `test network -and`
pub(crate) fn parse_and_count(log: &str) -> Result<Vec<Cell>, Violation> {
    let mut lines = log.lines();
    while let Some(line) = lines.next() {
        if line == AND_COUNT_MARKER {
            let value = lines.next().ok_or(Violation::Truncated(Field::AndCount))?;
            let count = int_at(value, 0, 0, Field::AndCount)?;
            return Ok(vec![Cell::Int(count)]);
        }
    }
    Err(Violation::Missing(Field::AndCount))
}

/// Level counts before and after balancing
pub(crate) fn parse_balance_levels(log: &str) -> Result<Vec<Cell>, Violation> {
    let lines: Vec<&str> = log.lines().collect();
    let mut levels = Vec::with_capacity(LEVEL_REPORTS);

    let mut i = 0;
    while i < lines.len() {
        if lines[i] == LEVEL_MARKER {
            i += LEVEL_LINE_OFFSET;
            let report = lines
                .get(i)
                .ok_or(Violation::Truncated(Field::LevelCount))?;
            levels.push(level_count(report)?);
        }
        i += 1;
    }

    if levels.len() != LEVEL_REPORTS {
        return Err(Violation::Occurrences {
            field: Field::LevelCount,
            expected: LEVEL_REPORTS,
            found: levels.len(),
        });
    }
    Ok(levels.into_iter().map(Cell::Int).collect())
}

/// `Level: 12, ...` → 12
fn level_count(line: &str) -> Result<i64, Violation> {
    let comma = line.find(',').ok_or_else(|| Violation::Malformed {
        field: Field::LevelCount,
        text: line.to_string(),
    })?;
    int_at(&line[..comma], LEVEL_VALUE_START, 0, Field::LevelCount)
}
