//! Verdict + Elapsed-Time Summaries
//!
//! The V3, ABC and PBC front-ends all end a run with a verdict line and a
//! timing line. They differ only in marker text and in where the number sits.

use crate::cell::Cell;
use crate::failure::{Field, Violation};
use crate::matcher::{Marker, Rule, Slot, float_at, scan};
use crate::verdict::{Verdict, VerdictSlot};

pub(crate) const PROVED: &str = "Property proved";
pub(crate) const COUNTER_EXAMPLE: &str = "Observe a counter example";
pub(crate) const UNDETERMINED: &str = "Cannot determinie the property";
pub(crate) const OVERALL_TIME: &str = "Overall Total Time  :";

/// `Overall Total Time  : 12.34 seconds`
pub(crate) fn overall_time(line: &str) -> Result<f64, Violation> {
    float_at(line, 22, 8, Field::Time)
}

#[derive(Default)]
struct SummaryState {
    verdict: VerdictSlot,
    time: Slot<f64>,
}

impl SummaryState {
    fn finish(self) -> Result<Vec<Cell>, Violation> {
        let verdict = self.verdict.require()?;
        let time = self.time.require(Field::Time)?;
        Ok(vec![verdict.into(), Cell::Seconds(time)])
    }
}

static V3_RULES: &[Rule<SummaryState>] = &[
    Rule::new(Marker::Prefix("Inductive Invariant"), |s, _| {
        s.verdict.assign(Verdict::Unsat)
    }),
    Rule::new(Marker::Prefix("Counter-example"), |s, _| {
        s.verdict.assign(Verdict::Sat)
    }),
    Rule::new(Marker::Prefix("Total time used  :"), |s, l| {
        s.time.fill(Field::Time, || float_at(l, 19, 8, Field::Time))
    }),
];

static ABC_RULES: &[Rule<SummaryState>] = &[
    Rule::new(Marker::Prefix(PROVED), |s, _| s.verdict.assign(Verdict::Unsat)),
    Rule::new(Marker::Contains("asserted"), |s, _| {
        s.verdict.assign(Verdict::Sat)
    }),
    Rule::new(Marker::Prefix("elapse:"), |s, l| {
        s.time.fill(Field::Time, || abc_elapse(l))
    }),
    Rule::new(Marker::Contains("combinational"), |s, _| {
        s.verdict.assign(Verdict::Comb)
    }),
    Rule::new(Marker::Prefix("Reached timeout"), |s, _| {
        s.verdict.assign(Verdict::Timeout)
    }),
];

static PBC_RULES: &[Rule<SummaryState>] = &[
    Rule::new(Marker::Prefix(PROVED), |s, _| s.verdict.assign(Verdict::Unsat)),
    Rule::new(Marker::Prefix(COUNTER_EXAMPLE), |s, _| {
        s.verdict.assign(Verdict::Sat)
    }),
    Rule::new(Marker::Exact(UNDETERMINED), |s, _| {
        s.verdict.assign(Verdict::Timeout)
    }),
    Rule::new(Marker::Prefix(OVERALL_TIME), |s, l| {
        s.time.fill(Field::Time, || overall_time(l))
    }),
];

/// ABC's `time` command: `elapse: 3.14 seconds, total: 3.20 seconds`.
/// The number runs from offset 8 to the next space.
fn abc_elapse(line: &str) -> Result<f64, Violation> {
    let rest = line.get(8..).unwrap_or("");
    let malformed = || Violation::Malformed {
        field: Field::Time,
        text: rest.to_string(),
    };
    let end = rest.find(' ').ok_or_else(malformed)?;
    rest[..end].trim().parse().map_err(|_| malformed())
}

fn parse_with(log: &str, rules: &[Rule<SummaryState>]) -> Result<Vec<Cell>, Violation> {
    let mut state = SummaryState::default();
    scan(log, rules, &mut state)?;
    state.finish()
}

pub(crate) fn parse_v3(log: &str) -> Result<Vec<Cell>, Violation> {
    parse_with(log, V3_RULES)
}

pub(crate) fn parse_abc(log: &str) -> Result<Vec<Cell>, Violation> {
    parse_with(log, ABC_RULES)
}

pub(crate) fn parse_pbc(log: &str) -> Result<Vec<Cell>, Violation> {
    parse_with(log, PBC_RULES)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(cells: &[Cell]) -> Vec<String> {
        cells.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_abc_proved() {
        let log = "\
abc 01> pdr
Property proved.  Time =     0.42 sec
abc 01> time
elapse: 12.34 seconds, total: 12.40 seconds
";
        assert_eq!(texts(&parse_abc(log).unwrap()), vec!["UNSAT", "12.34"]);
    }

    #[test]
    fn test_abc_asserted_and_comb() {
        let sat = "Output 0 of miter \"foo\" was asserted in frame 7.\nelapse: 0.5 seconds\n";
        assert_eq!(texts(&parse_abc(sat).unwrap()), vec!["SAT", "0.50"]);

        let comb = "The network is combinational.\nelapse: 1 seconds\n";
        assert_eq!(texts(&parse_abc(comb).unwrap()), vec!["COMB", "1.00"]);
    }

    #[test]
    fn test_abc_duplicate_proved() {
        let log = "Property proved.\nProperty proved.\nelapse: 12.34 seconds\n";
        assert_eq!(
            parse_abc(log).unwrap_err(),
            Violation::VerdictConflict {
                held: Verdict::Unsat,
                incoming: Verdict::Unsat
            }
        );
    }

    #[test]
    fn test_abc_timeout_cannot_overwrite() {
        let log = "Output 0 was asserted.\nReached timeout (60 seconds).\nelapse: 60.00 seconds\n";
        assert_eq!(
            parse_abc(log).unwrap_err(),
            Violation::VerdictConflict {
                held: Verdict::Sat,
                incoming: Verdict::Timeout
            }
        );

        let alone = "Reached timeout (60 seconds).\nelapse: 60.01 seconds\n";
        assert_eq!(texts(&parse_abc(alone).unwrap()), vec!["TIMEOUT", "60.01"]);
    }

    #[test]
    fn test_abc_elapse_failures() {
        assert_eq!(
            parse_abc("Property proved\n").unwrap_err(),
            Violation::Missing(Field::Time)
        );
        assert_eq!(
            parse_abc("elapse: 1.0 seconds\n").unwrap_err(),
            Violation::Missing(Field::Verdict)
        );
        assert!(matches!(
            parse_abc("Property proved\nelapse: 1.0\n").unwrap_err(),
            Violation::Malformed {
                field: Field::Time,
                ..
            }
        ));
        assert!(matches!(
            parse_abc("Property proved\nelapse: n/a seconds\n").unwrap_err(),
            Violation::Malformed {
                field: Field::Time,
                ..
            }
        ));
        assert_eq!(
            parse_abc("elapse: 1 s\nelapse: 2 s\n").unwrap_err(),
            Violation::Duplicate(Field::Time)
        );
    }

    #[test]
    fn test_v3_summary() {
        let log = "\
v3> verify pdr p1 -m 50000
Inductive Invariant found by PDR at frame 5
v3> usage
Period time used : 1.00 seconds
Total time used  : 3.456 seconds
";
        assert_eq!(texts(&parse_v3(log).unwrap()), vec!["UNSAT", "3.46"]);
    }

    #[test]
    fn test_v3_conflict_and_malformed() {
        let both = "Counter-example found at depth 3\nInductive Invariant found\n";
        assert_eq!(
            parse_v3(both).unwrap_err(),
            Violation::VerdictConflict {
                held: Verdict::Sat,
                incoming: Verdict::Unsat
            }
        );
        let bad = "Counter-example found\nTotal time used  : ?? seconds\n";
        assert!(matches!(
            parse_v3(bad).unwrap_err(),
            Violation::Malformed {
                field: Field::Time,
                ..
            }
        ));
    }

    #[test]
    fn test_pbc_summary() {
        let log = "\
Observe a counter example at frame 12
ia2b> time
Overall Total Time  : 0.126 seconds
";
        assert_eq!(texts(&parse_pbc(log).unwrap()), vec!["SAT", "0.13"]);

        let undetermined = "Cannot determinie the property\nOverall Total Time  : 3600.00 seconds\n";
        assert_eq!(
            texts(&parse_pbc(undetermined).unwrap()),
            vec!["TIMEOUT", "3600.00"]
        );
    }

    #[test]
    fn test_pbc_undetermined_is_exact() {
        let log = "Cannot determinie the property yet\nOverall Total Time  : 1.00 seconds\n";
        assert_eq!(
            parse_pbc(log).unwrap_err(),
            Violation::Missing(Field::Verdict)
        );
    }
}
