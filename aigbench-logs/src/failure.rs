//! Parse Failure Taxonomy
//!
//! Every structural check a parser performs has its own [`Violation`] value,
//! and every violation renders to a stable machine code. Paired with the
//! parser that raised it ([`ParseFailure`]) the code identifies the exact
//! check that rejected a log.

use crate::ParserKind;
use crate::verdict::Verdict;
use std::fmt;
use thiserror::Error;

/// A field a parser extracts from a log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Verification verdict
    Verdict,
    /// Overall elapsed time
    Time,
    /// AND-gate count after network simplification
    AndCount,
    /// Logic level count of the network
    LevelCount,
    /// Number of ternary simulations
    TerSimCount,
    /// Average literal count seen by ternary simulation
    TerSimLiterals,
    /// Average literal removal count of ternary simulation
    TerSimRemovals,
    /// Total runtime spent in ternary simulation
    TerSimTotalTime,
    /// Average runtime of one ternary simulation
    TerSimAverageTime,
    /// Total generalization runtime
    TotalRuntime,
    /// Runtime of the literal removal stage
    RemoveStageTime,
    /// Runtime of the push stage
    PushStageTime,
    /// Runtime of UNSAT-core generalization
    UnsatGenTime,
    /// Runtime of cube propagation
    PropagationTime,
}

impl Field {
    /// Stable kebab-case name used in failure codes
    pub fn code(self) -> &'static str {
        match self {
            Field::Verdict => "verdict",
            Field::Time => "time",
            Field::AndCount => "and-count",
            Field::LevelCount => "level-count",
            Field::TerSimCount => "tersim-count",
            Field::TerSimLiterals => "tersim-literals",
            Field::TerSimRemovals => "tersim-removals",
            Field::TerSimTotalTime => "tersim-total-time",
            Field::TerSimAverageTime => "tersim-average-time",
            Field::TotalRuntime => "total-runtime",
            Field::RemoveStageTime => "remove-stage-time",
            Field::PushStageTime => "push-stage-time",
            Field::UnsatGenTime => "unsat-gen-time",
            Field::PropagationTime => "propagation-time",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Feature-gating flags announced by a "feature absent" marker line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// No ternary simulation was performed
    NoTerSim,
    /// The property was reduced to a combinational check
    Combinational,
    /// No UNSAT generalization was performed
    NoUnsatGen,
    /// No cube propagation was performed
    NoPropagation,
}

impl Gate {
    /// Stable kebab-case name used in failure codes
    pub fn code(self) -> &'static str {
        match self {
            Gate::NoTerSim => "no-tersim",
            Gate::Combinational => "combinational",
            Gate::NoUnsatGen => "no-unsat-gen",
            Gate::NoPropagation => "no-propagation",
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A structural invariant broken by a log
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("verdict {incoming} reported after verdict {held}")]
    VerdictConflict { held: Verdict, incoming: Verdict },

    #[error("{0} marker appears more than once")]
    Duplicate(Field),

    #[error("{0} never reported")]
    Missing(Field),

    #[error("{field} value {text:?} is not a valid number")]
    Malformed { field: Field, text: String },

    #[error("{0} marker is not followed by its value line")]
    Truncated(Field),

    #[error("{field} reported {found} time(s), expected exactly {expected}")]
    Occurrences {
        field: Field,
        expected: usize,
        found: usize,
    },

    #[error("{field} reported although the log announces {gate}")]
    GateConflict { gate: Gate, field: Field },
}

impl Violation {
    /// Stable machine code of the violated check
    pub fn code(&self) -> String {
        match self {
            Violation::VerdictConflict { held, incoming } => {
                format!("verdict-conflict/{}-{}", held.code(), incoming.code())
            }
            Violation::Duplicate(field) => format!("duplicate/{}", field),
            Violation::Missing(field) => format!("missing/{}", field),
            Violation::Malformed { field, .. } => format!("malformed/{}", field),
            Violation::Truncated(field) => format!("truncated/{}", field),
            Violation::Occurrences { field, .. } => format!("occurrences/{}", field),
            Violation::GateConflict { gate, field } => {
                format!("gate-conflict/{}/{}", gate, field)
            }
        }
    }
}

/// A rejected log: which parser rejected it and why
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{parser} rejected log ({}): {violation}", .violation.code())]
pub struct ParseFailure {
    /// Parser that performed the failing check
    pub parser: ParserKind,
    /// The violated invariant
    pub violation: Violation,
}

impl ParseFailure {
    /// Unique code `<parser>/<check>`
    pub fn code(&self) -> String {
        format!("{}/{}", self.parser, self.violation.code())
    }
}
