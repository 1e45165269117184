//! Scheduler
//!
//! Runs every case on a fixed pool of worker threads. Each case is one task
//! that sends its [`CaseReport`] back over a channel; the calling thread
//! collects reports as they finish, drives the progress bar and prints any
//! console dumps, so output of concurrent cases never interleaves. Rows are
//! sorted by case id once all of them are in.

use crate::runner::{CaseReport, RunCase};
use aigbench_report::Row;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::mpsc;
use thiserror::Error;

/// Largest accepted worker count
pub const MAX_JOBS: usize = 10;

/// Batch-level failures; any of these aborts the run
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Worker count outside `1..=MAX_JOBS`
    #[error("Invalid process count {0}: expected 1 to 10")]
    InvalidJobs(usize),

    /// Thread pool construction failed
    #[error("Failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// A worker dropped its result
    #[error("Internal error: expected {expected} results, got {got}")]
    Incomplete {
        /// Cases submitted
        expected: usize,
        /// Reports received
        got: usize,
    },
}

/// Check a worker count against the accepted range
pub fn validate_jobs(jobs: usize) -> Result<usize, SchedulerError> {
    if (1..=MAX_JOBS).contains(&jobs) {
        Ok(jobs)
    } else {
        Err(SchedulerError::InvalidJobs(jobs))
    }
}

/// Fixed-size worker pool bound to one runner
pub struct Scheduler<R> {
    runner: R,
    pool: ThreadPool,
    jobs: usize,
    show_progress: bool,
}

impl<R: RunCase> Scheduler<R> {
    /// Build the pool; fails before any case runs if `jobs` is out of range
    pub fn new(runner: R, jobs: usize) -> Result<Self, SchedulerError> {
        let jobs = validate_jobs(jobs)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("aigbench-worker-{}", i))
            .build()?;
        Ok(Self {
            runner,
            pool,
            jobs,
            show_progress: true,
        })
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Worker count of the pool
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Run all cases, one row per case, sorted by case id
    pub fn run_all(&self, cases: &[String]) -> Result<Vec<Row>, SchedulerError> {
        let pb = self.progress_bar(cases.len());
        let (tx, rx) = mpsc::channel::<CaseReport>();
        let runner = &self.runner;

        let mut rows = self.pool.in_place_scope(|scope| {
            for case in cases {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let report = runner.run_case(case);
                    // The collector only hangs up after every sender is gone.
                    let _ = tx.send(report);
                });
            }
            drop(tx);

            let mut rows = Vec::with_capacity(cases.len());
            for report in rx {
                if let Some(text) = &report.console {
                    pb.suspend(|| println!("\n{}\n", text.trim_end()));
                }
                pb.set_message(report.row.case.clone());
                pb.inc(1);
                rows.push(report.row);
            }
            rows
        });
        pb.finish_with_message("Complete");

        if rows.len() != cases.len() {
            return Err(SchedulerError::Incomplete {
                expected: cases.len(),
                got: rows.len(),
            });
        }

        rows.sort_by(|a, b| a.case.cmp(&b.case));
        Ok(rows)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::with_draw_target(Some(len as u64), ProgressDrawTarget::hidden());
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aigbench_logs::Cell;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Longer case ids finish sooner; records calls and peak concurrency
    struct FakeRunner {
        calls: Mutex<Vec<String>>,
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeRunner {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                running: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl RunCase for FakeRunner {
        fn run_case(&self, case: &str) -> CaseReport {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let delay = 40u64.saturating_sub(case.len() as u64 * 3);
            std::thread::sleep(Duration::from_millis(delay));
            self.calls.lock().unwrap().push(case.to_string());
            self.running.fetch_sub(1, Ordering::SeqCst);
            CaseReport {
                row: Row::new(case, vec![Cell::Int(case.len() as i64)]),
                console: (case.len() % 2 == 0).then(|| format!("dump of {}", case)),
            }
        }
    }

    fn cases(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_jobs_range() {
        for jobs in [0, 11, 100] {
            assert!(matches!(
                Scheduler::new(FakeRunner::new(), jobs),
                Err(SchedulerError::InvalidJobs(j)) if j == jobs
            ));
        }
        for jobs in [1, 10] {
            assert_eq!(Scheduler::new(FakeRunner::new(), jobs).unwrap().jobs(), jobs);
        }
    }

    #[test]
    fn test_one_row_per_case_sorted() {
        let input = cases(&["d.aig", "bb.aig", "a.aig", "ccc.aig", "eeee.aig"]);
        let scheduler = Scheduler::new(FakeRunner::new(), 3)
            .unwrap()
            .with_progress(false);
        let rows = scheduler.run_all(&input).unwrap();

        let ids: Vec<_> = rows.iter().map(|r| r.case.as_str()).collect();
        assert_eq!(ids, vec!["a.aig", "bb.aig", "ccc.aig", "d.aig", "eeee.aig"]);
        assert_eq!(scheduler.runner.calls.lock().unwrap().len(), input.len());
    }

    #[test]
    fn test_order_independent_of_jobs() {
        let input = cases(&["x3.aig", "x1.aig", "x22.aig", "x0.aig", "x10.aig", "x2.aig"]);
        let serial = Scheduler::new(FakeRunner::new(), 1)
            .unwrap()
            .with_progress(false)
            .run_all(&input)
            .unwrap();
        let parallel = Scheduler::new(FakeRunner::new(), 4)
            .unwrap()
            .with_progress(false)
            .run_all(&input)
            .unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_concurrency_is_bounded() {
        let input: Vec<String> = (0..12).map(|i| format!("case{:02}.aig", i)).collect();
        let scheduler = Scheduler::new(FakeRunner::new(), 2)
            .unwrap()
            .with_progress(false);
        scheduler.run_all(&input).unwrap();
        assert!(scheduler.runner.peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_empty_case_list() {
        let scheduler = Scheduler::new(FakeRunner::new(), 2)
            .unwrap()
            .with_progress(false);
        assert!(scheduler.run_all(&[]).unwrap().is_empty());
    }
}
