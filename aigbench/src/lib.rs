#![warn(missing_docs)]
//! # AIGBench
//!
//! Benchmark harness for hardware model checkers working on AIG circuits.
//!
//! AIGBench drives an external verification tool once per benchmark case:
//! - **Bounded runs**: every case gets a generated command script on stdin, a
//!   wall-clock limit and its own process group, killed as a whole on timeout
//! - **Strict extraction**: per-tool parsers turn free-form logs into fixed-width
//!   rows and reject duplicated, missing or contradictory fields with a
//!   diagnostic code instead of guessing
//! - **Parallel and deterministic**: a bounded worker pool, results sorted by
//!   case id regardless of completion order
//! - **Layered configuration**: CLI flags over `aigbench.toml` over defaults
//!
//! ## Quick Start
//!
//! ```text
//! aigbench AbcPdr --id tests/hwmcc/ --od tests/log/ -t 900 -p 4 -r pdr.csv
//! ```
//!
//! ## Parsing a log directly
//!
//! ```
//! use aigbench::ParserKind;
//!
//! let cells = ParserKind::V3Check
//!     .parse("Inductive Invariant found\nTotal time used  : 3.46 seconds\n")
//!     .unwrap();
//! assert_eq!(cells[0].to_string(), "UNSAT");
//! assert_eq!(cells[1].to_string(), "3.46");
//! ```

// Re-export parser types
pub use aigbench_logs::{Cell, Field, Gate, ParseFailure, ParserKind, Verdict, Violation};

// Re-export report types
pub use aigbench_report::{
    OutputFormat, Report, ReportConfig, ReportMeta, Row, SystemInfo, generate_csv_report,
    generate_json_report,
};

// Re-export harness types
pub use aigbench_cli::{
    BenchConfig, CaseReport, CaseRunner, Cli, ConfigError, Invocation, MethodDef, Registry,
    RunCase, RunOutcome, RunSettings, RunnerError, Scheduler, SchedulerError, ScriptTemplate,
    TemplateError, run_with_cli,
};

/// Run the AIGBench CLI harness.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     aigbench::run()
/// }
/// ```
pub use aigbench_cli::run;
