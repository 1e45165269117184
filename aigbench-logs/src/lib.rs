#![warn(missing_docs)]
//! AIGBench Logs - Model-Checker Output Parsers
//!
//! Turns the free-form console output of a verification tool into the cells
//! of one result row. Parsers are pure: a log either yields exactly the
//! number of cells its [`ParserKind`] promises, or a [`ParseFailure`] naming
//! the structural check that rejected it.
//!
//! ```
//! use aigbench_logs::ParserKind;
//!
//! let log = "Property proved\nelapse: 12.34 seconds, total: 12.40 seconds\n";
//! let cells = ParserKind::AbcCheck.parse(log).unwrap();
//! assert_eq!(cells[0].to_string(), "UNSAT");
//! assert_eq!(cells[1].to_string(), "12.34");
//! ```

mod cell;
mod failure;
mod matcher;
mod pdr;
mod probe;
mod summary;
mod verdict;

pub use cell::Cell;
pub use failure::{Field, Gate, ParseFailure, Violation};
pub use matcher::{Marker, Rule, Slot, float_at, int_at, scan, window};
pub use pdr::PDR_ROW_LEN;
pub use verdict::{Verdict, VerdictSlot};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParserKind {
    /// AND count after `test network -and`
    AndCount,
    /// Level counts before and after balancing
    BalanceLevels,
    /// V3 verdict and total time
    V3Check,
    /// ABC verdict and elapsed time
    AbcCheck,
    /// Instrumented PDR: verdict, time and ten gated statistics
    PdrDetail,
    /// Property-bound checking verdict and time
    PbcCheck,
}

impl ParserKind {
    /// Every parser, in declaration order
    pub const ALL: [ParserKind; 6] = [
        ParserKind::AndCount,
        ParserKind::BalanceLevels,
        ParserKind::V3Check,
        ParserKind::AbcCheck,
        ParserKind::PdrDetail,
        ParserKind::PbcCheck,
    ];

    /// Configuration name
    pub fn name(self) -> &'static str {
        match self {
            ParserKind::AndCount => "and-count",
            ParserKind::BalanceLevels => "balance-levels",
            ParserKind::V3Check => "v3-check",
            ParserKind::AbcCheck => "abc-check",
            ParserKind::PdrDetail => "pdr-detail",
            ParserKind::PbcCheck => "pbc-check",
        }
    }

    /// Number of cells a successful parse yields
    pub fn arity(self) -> usize {
        match self {
            ParserKind::AndCount => 1,
            ParserKind::PdrDetail => PDR_ROW_LEN,
            _ => 2,
        }
    }

    /// Extract the row cells from a complete log
    pub fn parse(self, log: &str) -> Result<Vec<Cell>, ParseFailure> {
        let parsed = match self {
            ParserKind::AndCount => probe::parse_and_count(log),
            ParserKind::BalanceLevels => probe::parse_balance_levels(log),
            ParserKind::V3Check => summary::parse_v3(log),
            ParserKind::AbcCheck => summary::parse_abc(log),
            ParserKind::PdrDetail => pdr::parse_pdr(log),
            ParserKind::PbcCheck => summary::parse_pbc(log),
        };
        parsed.map_err(|violation| ParseFailure {
            parser: self,
            violation,
        })
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParserKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParserKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("Unknown parser: {}", s))
    }
}
