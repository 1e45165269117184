//! Verification Verdicts

use crate::cell::Cell;
use crate::failure::{Field, Violation};
use std::fmt;

/// Categorical outcome reported by a model checker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Property proved
    Unsat,
    /// Counterexample found
    Sat,
    /// Property reduced to a combinational check
    Comb,
    /// Tool gave up on its own internal limit
    Timeout,
}

impl Verdict {
    /// Column text of the verdict
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Unsat => "UNSAT",
            Verdict::Sat => "SAT",
            Verdict::Comb => "COMB",
            Verdict::Timeout => "TIMEOUT",
        }
    }

    pub(crate) fn code(self) -> &'static str {
        match self {
            Verdict::Unsat => "unsat",
            Verdict::Sat => "sat",
            Verdict::Comb => "comb",
            Verdict::Timeout => "timeout",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Verdict> for Cell {
    fn from(verdict: Verdict) -> Self {
        Cell::text(verdict.as_str())
    }
}

/// Single-assignment holder for the verdict of one log.
///
/// All verdict markers of a parser share this slot, so two markers in the
/// same log are always a conflict no matter which ones they are.
#[derive(Debug, Default)]
pub struct VerdictSlot(Option<Verdict>);

impl VerdictSlot {
    /// Record a verdict, rejecting any second assignment
    pub fn assign(&mut self, incoming: Verdict) -> Result<(), Violation> {
        match self.0 {
            Some(held) => Err(Violation::VerdictConflict { held, incoming }),
            None => {
                self.0 = Some(incoming);
                Ok(())
            }
        }
    }

    /// The recorded verdict, or a missing-verdict violation
    pub fn require(&self) -> Result<Verdict, Violation> {
        self.0.ok_or(Violation::Missing(Field::Verdict))
    }
}
