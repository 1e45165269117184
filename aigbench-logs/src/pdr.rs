//! Detailed PDR Statistics
//!
//! Besides verdict and overall time, the instrumented PDR engine prints ten
//! secondary statistics. Four "feature absent" lines gate them:
//!
//! | Gate line                    | Cells  | Sentinel       |
//! |------------------------------|--------|----------------|
//! | `No ternary simulation!`     | 2..=6  | `No TerSim`    |
//! | `No UNSAT generalization!`   | 8..=10 | `No UNSAT Gen` |
//! | `No cube propagation!`       | 11     | `No Prop`      |
//! | combinational reduction      | 2..=11 | `Comb`         |
//!
//! A gated group must be entirely absent when its gate line is present and
//! entirely present otherwise. Cell 7 (total runtime) has no gate of its own
//! and is mandatory unless the property was reduced to a combinational check.

use crate::cell::Cell;
use crate::failure::{Field, Gate, Violation};
use crate::matcher::{Marker, Rule, Slot, float_at, int_at, scan};
use crate::summary::{COUNTER_EXAMPLE, OVERALL_TIME, PROVED, UNDETERMINED, overall_time};
use crate::verdict::{Verdict, VerdictSlot};

const TERSIM_COUNT: &str = "Number of ternary simulation   = ";
const TERSIM_LITERALS: &str = "Average literal count (TerSim) = ";
const TERSIM_REMOVALS: &str = "Average removal count (TerSim) = ";
const TERSIM_TOTAL: &str = "Total runtime on TerSim        = ";
const TERSIM_AVERAGE: &str = "Average runtime on TerSim      = ";
const TOTAL_RUNTIME: &str = "Total runtime     = ";
const REMOVE_STAGE: &str = "Runtime on remove stage          = ";
const PUSH_STAGE: &str = "Runtime on push stage            = ";
const UNSAT_GEN: &str = "Runtime on UNSAT Gen             = ";
const PROPAGATION: &str = "Runtime on cube propagation = ";

const NO_TERSIM: &str = "No ternary simulation!";
const COMBINATIONAL: &str = "No latch related to the property. Reduce to combinational checker!";
const NO_UNSAT_GEN: &str = "No UNSAT generalization!";
const NO_PROPAGATION: &str = "No cube propagation!";

/// Timings end in a two-character unit suffix
const UNIT_TAIL: usize = 2;

/// Number of cells in a detailed PDR row
pub const PDR_ROW_LEN: usize = 12;

#[derive(Debug, Default)]
struct Gates {
    no_tersim: bool,
    combinational: bool,
    no_unsat_gen: bool,
    no_propagation: bool,
}

#[derive(Debug, Default)]
struct PdrState {
    verdict: VerdictSlot,
    time: Slot<f64>,
    tersim_count: Slot<i64>,
    tersim_literals: Slot<f64>,
    tersim_removals: Slot<f64>,
    tersim_total: Slot<f64>,
    tersim_average: Slot<f64>,
    total_runtime: Slot<f64>,
    remove_stage: Slot<f64>,
    push_stage: Slot<f64>,
    unsat_gen: Slot<f64>,
    propagation: Slot<f64>,
    gates: Gates,
}

fn timing(slot: &mut Slot<f64>, line: &str, marker: &str, field: Field) -> Result<(), Violation> {
    slot.fill(field, || float_at(line, marker.len(), UNIT_TAIL, field))
}

static PDR_RULES: &[Rule<PdrState>] = &[
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
    Rule::new(Marker::Prefix(TERSIM_COUNT), |s, l| {
        s.tersim_count.fill(Field::TerSimCount, || {
            int_at(l, TERSIM_COUNT.len(), 0, Field::TerSimCount)
        })
    }),
    Rule::new(Marker::Prefix(TERSIM_LITERALS), |s, l| {
        s.tersim_literals.fill(Field::TerSimLiterals, || {
            float_at(l, TERSIM_LITERALS.len(), 0, Field::TerSimLiterals)
        })
    }),
    Rule::new(Marker::Prefix(TERSIM_REMOVALS), |s, l| {
        s.tersim_removals.fill(Field::TerSimRemovals, || {
            float_at(l, TERSIM_REMOVALS.len(), 0, Field::TerSimRemovals)
        })
    }),
    Rule::new(Marker::Prefix(TERSIM_TOTAL), |s, l| {
        timing(&mut s.tersim_total, l, TERSIM_TOTAL, Field::TerSimTotalTime)
    }),
    Rule::new(Marker::Prefix(TERSIM_AVERAGE), |s, l| {
        timing(&mut s.tersim_average, l, TERSIM_AVERAGE, Field::TerSimAverageTime)
    }),
    Rule::new(Marker::Prefix(TOTAL_RUNTIME), |s, l| {
        timing(&mut s.total_runtime, l, TOTAL_RUNTIME, Field::TotalRuntime)
    }),
    Rule::new(Marker::Prefix(REMOVE_STAGE), |s, l| {
        timing(&mut s.remove_stage, l, REMOVE_STAGE, Field::RemoveStageTime)
    }),
    Rule::new(Marker::Prefix(PUSH_STAGE), |s, l| {
        timing(&mut s.push_stage, l, PUSH_STAGE, Field::PushStageTime)
    }),
    Rule::new(Marker::Prefix(UNSAT_GEN), |s, l| {
        timing(&mut s.unsat_gen, l, UNSAT_GEN, Field::UnsatGenTime)
    }),
    Rule::new(Marker::Prefix(PROPAGATION), |s, l| {
        timing(&mut s.propagation, l, PROPAGATION, Field::PropagationTime)
    }),
    Rule::new(Marker::Exact(NO_TERSIM), |s, _| {
        s.gates.no_tersim = true;
        Ok(())
    }),
    Rule::new(Marker::Exact(COMBINATIONAL), |s, _| {
        s.gates.combinational = true;
        Ok(())
    }),
    Rule::new(Marker::Exact(NO_UNSAT_GEN), |s, _| {
        s.gates.no_unsat_gen = true;
        Ok(())
    }),
    Rule::new(Marker::Exact(NO_PROPAGATION), |s, _| {
        s.gates.no_propagation = true;
        Ok(())
    }),
];

type Member = (Field, Option<Cell>);

fn float_cell(slot: &Slot<f64>) -> Option<Cell> {
    slot.get().map(|x| Cell::Float(*x))
}

/// Resolve one gated group to its output cells
fn gated_group(
    gate: Gate,
    absent: bool,
    members: &[Member],
    sentinel: &str,
) -> Result<Vec<Cell>, Violation> {
    if absent {
        if let Some((field, _)) = members.iter().find(|(_, cell)| cell.is_some()) {
            return Err(Violation::GateConflict { gate, field: *field });
        }
        let mut cells = vec![Cell::text(sentinel)];
        cells.resize(members.len(), Cell::Empty);
        Ok(cells)
    } else {
        members
            .iter()
            .map(|(field, cell)| cell.clone().ok_or(Violation::Missing(*field)))
            .collect()
    }
}

impl PdrState {
    /// Cells 2..=11 in row order
    fn secondary(&self) -> [Member; 10] {
        [
            (
                Field::TerSimCount,
                self.tersim_count.get().map(|n| Cell::Int(*n)),
            ),
            (Field::TerSimLiterals, float_cell(&self.tersim_literals)),
            (Field::TerSimRemovals, float_cell(&self.tersim_removals)),
            (Field::TerSimTotalTime, float_cell(&self.tersim_total)),
            (Field::TerSimAverageTime, float_cell(&self.tersim_average)),
            (Field::TotalRuntime, float_cell(&self.total_runtime)),
            (Field::RemoveStageTime, float_cell(&self.remove_stage)),
            (Field::PushStageTime, float_cell(&self.push_stage)),
            (Field::UnsatGenTime, float_cell(&self.unsat_gen)),
            (Field::PropagationTime, float_cell(&self.propagation)),
        ]
    }

    fn finish(self) -> Result<Vec<Cell>, Violation> {
        let verdict = self.verdict.require()?;
        let time = self.time.require(Field::Time)?;
        let secondary = self.secondary();

        let mut row = Vec::with_capacity(PDR_ROW_LEN);
        row.push(verdict.into());
        row.push(Cell::Seconds(time));

        if self.gates.combinational {
            row.extend(gated_group(Gate::Combinational, true, &secondary, "Comb")?);
            return Ok(row);
        }

        let total_runtime = self.total_runtime.require(Field::TotalRuntime)?;
        let (tersim, rest) = secondary.split_at(5);
        let (generalization, propagation) = rest[1..].split_at(3);

        row.extend(gated_group(
            Gate::NoTerSim,
            self.gates.no_tersim,
            tersim,
            "No TerSim",
        )?);
        row.push(Cell::Float(total_runtime));
        row.extend(gated_group(
            Gate::NoUnsatGen,
            self.gates.no_unsat_gen,
            generalization,
            "No UNSAT Gen",
        )?);
        row.extend(gated_group(
            Gate::NoPropagation,
            self.gates.no_propagation,
            propagation,
            "No Prop",
        )?);
        Ok(row)
    }
}

pub(crate) fn parse_pdr(log: &str) -> Result<Vec<Cell>, Violation> {
    let mut state = PdrState::default();
    scan(log, PDR_RULES, &mut state)?;
    state.finish()
}
