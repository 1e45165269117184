//! Result Cells
//!
//! A cell is one column value of a result row. Formatting is fixed per
//! variant so that a row renders identically in CSV, JSON and on the console.

use serde::{Serialize, Serializer};
use std::fmt;

/// A single extracted field
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Categorical value or sentinel (`"UNSAT"`, `"No TerSim"`, ...)
    Text(String),
    /// Integer counter
    Int(i64),
    /// Floating point counter or timing, shortest round-trip form (`12.0`, `0.25`)
    Float(f64),
    /// Elapsed seconds, always rendered with two decimals
    Seconds(f64),
    /// Placeholder for a field suppressed by a feature gate
    Empty,
}

impl Cell {
    /// Build a text cell
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Whether this cell is an empty placeholder
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Int(n) => write!(f, "{}", n),
            Cell::Float(x) => write_float(f, *x),
            Cell::Seconds(x) => write!(f, "{:.2}", x),
            Cell::Empty => Ok(()),
        }
    }
}

/// Shortest round-trip form with a signed, two-digit exponent (`1e-07`, `1.5e+16`)
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("nan");
    }
    let repr = format!("{:?}", x);
    match repr.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            write!(f, "{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => f.write_str(&repr),
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
