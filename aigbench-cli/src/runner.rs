//! Case Runner
//!
//! Runs the verification tool once for one case: the rendered command script
//! is fed on stdin from an anonymous temporary file, stdout and stderr are
//! both captured in `<log_dir>/<case>.log`, and the child gets its own process
//! group so a timeout can take down everything it spawned.

use crate::registry::{MethodDef, ScriptArgs};
use aigbench_report::Row;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use wait_timeout::ChildExt;

/// Harness-side failures of a single case
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Temporary stdin file could not be written
    #[error("Failed to prepare command script: {0}")]
    Script(#[source] std::io::Error),

    /// `<case>.log` could not be opened for the child
    #[error("Failed to create log file {}: {source}", .path.display())]
    LogFile {
        /// Log file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The tool did not start
    #[error("Failed to spawn {executable}: {source}")]
    Spawn {
        /// Tool that was launched
        executable: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Waiting on the child failed; it has been killed
    #[error("Failed waiting for {executable}: {source}")]
    Wait {
        /// Tool that was launched
        executable: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The finished case's log could not be read back
    #[error("Failed to read log file {}: {source}", .path.display())]
    ReadLog {
        /// Log file path
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// How a tool invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Exit status zero, with the captured output
    Success(String),
    /// Non-zero exit or death by signal, with the captured output
    NonZeroExit(String),
    /// Killed at the wall-clock limit
    TimedOut,
}

/// Result of one case as seen by the scheduler
#[derive(Debug, Clone)]
pub struct CaseReport {
    /// Result row
    pub row: Row,
    /// Text to show the operator, if any
    pub console: Option<String>,
}

/// Anything that turns a case id into a result row
pub trait RunCase: Sync {
    /// Run one case to completion. Never fails: every problem becomes a row.
    fn run_case(&self, case: &str) -> CaseReport;
}

/// Per-run settings shared by every case
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Directory holding the case files
    pub input_directory: PathBuf,
    /// Directory receiving `<case>.log`
    pub log_directory: PathBuf,
    /// Wall-clock limit per case
    pub timeout: Duration,
    /// Text for the `{option}` slot
    pub option: String,
    /// Text for the `{pre}` slot
    pub before_command: String,
    /// Text for the `{post}` slot
    pub after_command: String,
}

/// Runs a method's tool on single cases
#[derive(Debug, Clone)]
pub struct CaseRunner {
    method: MethodDef,
    settings: RunSettings,
}

impl CaseRunner {
    /// Bind a resolved method to the run settings
    pub fn new(method: MethodDef, settings: RunSettings) -> Self {
        Self { method, settings }
    }

    /// Full input path of a case
    pub fn input_path(&self, case: &str) -> PathBuf {
        self.settings.input_directory.join(case)
    }

    /// Log file of a case
    pub fn log_path(&self, case: &str) -> PathBuf {
        self.settings.log_directory.join(format!("{}.log", case))
    }

    /// Command script fed to the tool for a case
    pub fn script_for(&self, case: &str) -> String {
        let input = self.input_path(case);
        let input = input.to_string_lossy();
        self.method.template.render(&ScriptArgs {
            input: &input,
            pre: &self.settings.before_command,
            option: &self.settings.option,
            post: &self.settings.after_command,
        })
    }

    /// Launch the tool and wait for it, killing it at the time limit
    pub fn execute(&self, case: &str) -> Result<RunOutcome, RunnerError> {
        let executable = &self.method.executable;

        let mut script = tempfile::tempfile().map_err(RunnerError::Script)?;
        script
            .write_all(self.script_for(case).as_bytes())
            .map_err(RunnerError::Script)?;
        script
            .seek(SeekFrom::Start(0))
            .map_err(RunnerError::Script)?;

        let log_path = self.log_path(case);
        let log_err = |source: std::io::Error| RunnerError::LogFile {
            path: log_path.clone(),
            source,
        };
        let log = File::create(&log_path).map_err(log_err)?;
        let log_stderr = log.try_clone().map_err(log_err)?;

        let mut command = Command::new(executable);
        command
            .stdin(Stdio::from(script))
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_stderr));
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| RunnerError::Spawn {
            executable: executable.clone(),
            source,
        })?;
        tracing::debug!("{}: spawned {} (pid {})", case, executable, child.id());

        let waited = child.wait_timeout(self.settings.timeout);
        let status = match waited {
            Ok(Some(status)) => status,
            Ok(None) => {
                kill_process_group(&mut child);
                tracing::debug!("{}: killed after {:.2?}", case, started.elapsed());
                return Ok(RunOutcome::TimedOut);
            }
            Err(source) => {
                kill_process_group(&mut child);
                return Err(RunnerError::Wait {
                    executable: executable.clone(),
                    source,
                });
            }
        };
        tracing::debug!("{}: {} after {:.2?}", case, status, started.elapsed());

        let text = read_log(&log_path)?;
        if status.success() {
            Ok(RunOutcome::Success(text))
        } else {
            Ok(RunOutcome::NonZeroExit(text))
        }
    }
}

impl RunCase for CaseRunner {
    fn run_case(&self, case: &str) -> CaseReport {
        match self.execute(case) {
            Ok(RunOutcome::Success(log)) => match self.method.parser.parse(&log) {
                Ok(cells) => {
                    debug_assert_eq!(cells.len(), self.method.parser.arity());
                    CaseReport {
                        row: Row::new(case, cells),
                        console: None,
                    }
                }
                Err(failure) => {
                    tracing::warn!("{}: {}", case, failure);
                    CaseReport {
                        row: Row::diagnostic(case, &failure),
                        console: Some(format!("[{}] {}\n{}", case, failure, log)),
                    }
                }
            },
            Ok(RunOutcome::NonZeroExit(log)) => {
                tracing::warn!("{}: {} exited with an error", case, self.method.executable);
                CaseReport {
                    row: Row::error(case),
                    console: Some(format!("[{}] ERROR\n{}", case, log)),
                }
            }
            Ok(RunOutcome::TimedOut) => {
                tracing::info!("{}: timed out after {:?}", case, self.settings.timeout);
                CaseReport {
                    row: Row::timeout(case),
                    console: None,
                }
            }
            Err(e) => {
                tracing::error!("{}: {}", case, e);
                CaseReport {
                    row: Row::error(case),
                    console: Some(format!("[{}] ERROR\n{}", case, e)),
                }
            }
        }
    }
}

fn read_log(path: &Path) -> Result<String, RunnerError> {
    std::fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|source| RunnerError::ReadLog {
            path: path.to_path_buf(),
            source,
        })
}

/// SIGKILL the child's whole process group, then reap the child
#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;
    let ret = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if ret == -1 {
        tracing::debug!(
            "killpg({}) failed: {}",
            pgid,
            std::io::Error::last_os_error()
        );
        let _ = child.kill();
    }
    let _ = child.wait();
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use aigbench_logs::{Cell, ParserKind};
    use crate::registry::ScriptTemplate;

    struct Fixture {
        _input: tempfile::TempDir,
        logs: tempfile::TempDir,
        runner: CaseRunner,
    }

    /// `/bin/sh` reading the rendered script; `{option}` carries the shell body
    fn sh_runner(body: &str, timeout: Duration) -> Fixture {
        let input = tempfile::tempdir().unwrap();
        let logs = tempfile::tempdir().unwrap();
        let method = MethodDef {
            name: "Shell".to_string(),
            template: ScriptTemplate::parse("# {input}\n{option}\n").unwrap(),
            executable: "/bin/sh".to_string(),
            parser: ParserKind::AbcCheck,
        };
        let settings = RunSettings {
            input_directory: input.path().to_path_buf(),
            log_directory: logs.path().to_path_buf(),
            timeout,
            option: body.to_string(),
            before_command: String::new(),
            after_command: String::new(),
        };
        Fixture {
            _input: input,
            logs,
            runner: CaseRunner::new(method, settings),
        }
    }

    #[test]
    fn test_success_is_parsed() {
        let fx = sh_runner(
            "echo 'Property proved'; echo 'elapse: 12.34 seconds, total: 12.40 seconds'",
            Duration::from_secs(10),
        );
        let report = fx.runner.run_case("ok.aig");
        assert_eq!(
            report.row,
            Row::new("ok.aig", vec![Cell::text("UNSAT"), Cell::Seconds(12.34)])
        );
        assert!(report.console.is_none());

        let log = std::fs::read_to_string(fx.logs.path().join("ok.aig.log")).unwrap();
        assert!(log.starts_with("Property proved\n"));
    }

    #[test]
    fn test_stderr_is_captured() {
        let fx = sh_runner(
            "echo 'Property proved' 1>&2; echo 'elapse: 1.00 seconds'",
            Duration::from_secs(10),
        );
        let report = fx.runner.run_case("err.aig");
        assert_eq!(report.row.cells[0].to_string(), "UNSAT");
    }

    #[test]
    fn test_non_zero_exit_is_error_without_parsing() {
        let fx = sh_runner("echo 'Property proved'; exit 2", Duration::from_secs(10));
        assert_eq!(
            fx.runner.execute("bad.aig").unwrap(),
            RunOutcome::NonZeroExit("Property proved\n".to_string())
        );
        let report = fx.runner.run_case("bad.aig");
        assert_eq!(report.row, Row::error("bad.aig"));
        assert!(report.console.unwrap().contains("Property proved"));
    }

    #[test]
    fn test_timeout_kills_the_process_group() {
        let fx = sh_runner("sleep 30 & sleep 30; wait", Duration::from_millis(300));
        let started = Instant::now();
        let report = fx.runner.run_case("slow.aig");
        assert_eq!(report.row, Row::timeout("slow.aig"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    /// Live unless gone from /proc or a zombie; orphans may never be reaped
    /// when the test runs under a minimal init.
    #[cfg(target_os = "linux")]
    fn is_running(pid: &str) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Ok(stat) => {
                let state = stat.rsplit(')').next().unwrap_or("").trim_start();
                !state.starts_with('Z') && !state.starts_with('X')
            }
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_timeout_leaves_no_live_process() {
        let pids = tempfile::tempdir().unwrap();
        let pid_file = pids.path().join("pids");
        let body = format!(
            "echo $$ > '{0}'; sleep 30 & echo $! >> '{0}'; wait",
            pid_file.display()
        );
        let fx = sh_runner(&body, Duration::from_secs(1));
        assert_eq!(fx.runner.run_case("slow.aig").row, Row::timeout("slow.aig"));

        let recorded = std::fs::read_to_string(&pid_file).unwrap();
        let recorded: Vec<&str> = recorded.split_whitespace().collect();
        assert_eq!(recorded.len(), 2, "shell and background pids: {:?}", recorded);

        let deadline = Instant::now() + Duration::from_secs(5);
        while recorded.iter().any(|pid| is_running(pid)) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(50));
        }
        for pid in &recorded {
            assert!(!is_running(pid), "pid {} survived the timeout", pid);
        }
    }

    #[test]
    fn test_duplicate_verdict_gives_diagnostic() {
        let fx = sh_runner(
            "echo 'Property proved'; echo 'Property proved'; echo 'elapse: 1.00 seconds'",
            Duration::from_secs(10),
        );
        let report = fx.runner.run_case("dup.aig");
        assert_eq!(report.row.cells.len(), 1);
        assert_eq!(
            report.row.cells[0].to_string(),
            "PARSE_ERROR(abc-check/verdict-conflict/unsat-unsat)"
        );
        assert!(report.console.is_some());
    }

    #[test]
    fn test_missing_executable_is_error_row() {
        let mut fx = sh_runner("true", Duration::from_secs(10));
        fx.runner.method.executable = "/nonexistent/checker".to_string();
        assert!(matches!(
            fx.runner.execute("x.aig"),
            Err(RunnerError::Spawn { .. })
        ));
        assert_eq!(fx.runner.run_case("x.aig").row, Row::error("x.aig"));
    }

    #[test]
    fn test_script_uses_input_path() {
        let fx = sh_runner("true", Duration::from_secs(10));
        let script = fx.runner.script_for("a.aig");
        let expected = format!("# {}\ntrue\n", fx.runner.input_path("a.aig").display());
        assert_eq!(script, expected);
    }
}
