#![warn(missing_docs)]
//! AIGBench CLI Library
//!
//! Runs one verification method over every benchmark case of a directory and
//! writes one result row per case. Use `aigbench_cli::run()` in a main
//! function, or drive the pieces directly:
//!
//! ```no_run
//! use aigbench_cli::{CaseRunner, Registry, RunSettings, Scheduler};
//! use std::time::Duration;
//!
//! let registry = Registry::builtin()?;
//! let method = registry.get("AbcPdr")?.clone();
//! let settings = RunSettings {
//!     input_directory: "tests/hwmcc".into(),
//!     log_directory: "tests/log".into(),
//!     timeout: Duration::from_secs(3600),
//!     option: String::new(),
//!     before_command: String::new(),
//!     after_command: String::new(),
//! };
//! let scheduler = Scheduler::new(CaseRunner::new(method, settings), 4)?;
//! let rows = scheduler.run_all(&["a.aig".to_string()])?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod metadata;
mod planner;
mod registry;
mod runner;
mod scheduler;

pub use config::{BenchConfig, CONFIG_FILE, ConfigError, MethodConfig, OutputConfig, RunnerConfig};
pub use metadata::{build_report_meta, system_info};
pub use planner::{CasePlan, build_plan, discover_cases};
pub use registry::{MethodDef, Registry, ScriptArgs, ScriptTemplate, Slot, TemplateError};
pub use runner::{CaseReport, CaseRunner, RunCase, RunOutcome, RunSettings, RunnerError};
pub use scheduler::{MAX_JOBS, Scheduler, SchedulerError, validate_jobs};

use aigbench_report::{OutputFormat, Report, ReportConfig};
use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use clap::Parser;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// AIGBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "aigbench")]
#[command(
    author,
    version,
    about = "AIGBench - run a model checker over a directory of AIG benchmarks"
)]
pub struct Cli {
    /// Running method (see --list-methods)
    #[arg(required_unless_present = "list_methods")]
    pub method: Option<String>,

    /// Directory containing the circuit files
    #[arg(long = "input-directory", visible_alias = "id", value_name = "DIR")]
    pub input_directory: Option<PathBuf>,

    /// Directory receiving the log files
    #[arg(long = "output-directory", visible_alias = "od", value_name = "DIR")]
    pub output_directory: Option<PathBuf>,

    /// Maximum runtime of one case in seconds
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of cases run at the same time (1 to 10)
    #[arg(short = 'p', long = "process", visible_alias = "jobs", value_name = "N")]
    pub process: Option<usize>,

    /// Result file
    #[arg(short, long, value_name = "FILE")]
    pub result: Option<PathBuf>,

    /// Filename suffix selecting the cases
    #[arg(short, long)]
    pub suffix: Option<String>,

    /// Options of the check command
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    pub option: String,

    /// Command run before checking
    #[arg(
        long = "before-command",
        visible_alias = "bc",
        default_value = "",
        allow_hyphen_values = true
    )]
    pub before_command: String,

    /// Command run after checking
    #[arg(
        long = "after-command",
        visible_alias = "ac",
        default_value = "",
        allow_hyphen_values = true
    )]
    pub after_command: String,

    /// Override the method's executable
    #[arg(long, value_name = "PATH")]
    pub executable: Option<String>,

    /// Result format: csv or json
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Only run cases whose id matches this regex
    #[arg(long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Configuration file (default: discover aigbench.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show the cases and the first command script without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// List the available methods
    #[arg(long)]
    pub list_methods: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Fully resolved run settings: CLI flags over `aigbench.toml` over defaults
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Method with any executable override applied
    pub method: MethodDef,
    /// Settings handed to the case runner
    pub settings: RunSettings,
    /// Worker count, already range-checked
    pub jobs: usize,
    /// Case filename suffix
    pub suffix: String,
    /// Optional case id filter
    pub filter: Option<Regex>,
    /// Result file path
    pub result: PathBuf,
    /// Result file format
    pub format: OutputFormat,
}

impl Invocation {
    /// Resolve every setting; any configuration problem is returned here,
    /// before a single case runs.
    pub fn resolve(cli: &Cli, config: &BenchConfig, registry: &Registry) -> anyhow::Result<Self> {
        let name = cli
            .method
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("No method given"))?;
        let mut method = registry.get(name)?.clone();
        if let Some(executable) = &cli.executable {
            method.executable = executable.clone();
        }

        let timeout = match cli.timeout {
            Some(secs) => Duration::from_secs(secs),
            None => BenchConfig::parse_duration(&config.runner.timeout)?,
        };
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout.into());
        }

        let jobs = validate_jobs(cli.process.unwrap_or(config.runner.jobs))?;

        let filter = cli
            .filter
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(ConfigError::from)?;

        let settings = RunSettings {
            input_directory: cli
                .input_directory
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.runner.input_directory)),
            log_directory: cli
                .output_directory
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.runner.log_directory)),
            timeout,
            option: cli.option.clone(),
            before_command: cli.before_command.clone(),
            after_command: cli.after_command.clone(),
        };

        let invocation = Self {
            method,
            settings,
            jobs,
            suffix: cli
                .suffix
                .clone()
                .unwrap_or_else(|| config.runner.suffix.clone()),
            filter,
            result: cli
                .result
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.output.result)),
            format: cli.format.unwrap_or(config.output.format),
        };
        for flag in invocation.ignored_commands() {
            tracing::warn!(
                "{} has no slot for {}; the command is not sent",
                invocation.method.name,
                flag
            );
        }
        Ok(invocation)
    }

    /// Flags whose non-empty command the method's template never places
    pub fn ignored_commands(&self) -> Vec<&'static str> {
        let template = &self.method.template;
        let mut ignored = Vec::new();
        if !self.settings.before_command.is_empty() && !template.uses(Slot::Pre) {
            ignored.push("--before-command");
        }
        if !self.settings.after_command.is_empty() && !template.uses(Slot::Post) {
            ignored.push("--after-command");
        }
        ignored
    }

    /// Settings as recorded in report metadata
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig {
            method: self.method.name.clone(),
            executable: self.method.executable.clone(),
            parser: self.method.parser.to_string(),
            option: self.settings.option.clone(),
            before_command: self.settings.before_command.clone(),
            after_command: self.settings.after_command.clone(),
            timeout_secs: self.settings.timeout.as_secs_f64(),
            jobs: self.jobs,
            input_directory: self.settings.input_directory.display().to_string(),
            log_directory: self.settings.log_directory.display().to_string(),
            suffix: self.suffix.clone(),
        }
    }

    /// Cases of the input directory selected by suffix and filter
    pub fn plan(&self) -> Result<CasePlan, ConfigError> {
        discover_cases(
            &self.settings.input_directory,
            &self.suffix,
            self.filter.as_ref(),
        )
    }
}

/// Run the AIGBench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if configuration is invalid or
/// the result file cannot be written. Per-case failures never end up here.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the AIGBench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::discover()?.unwrap_or_default(),
    };
    let registry = Registry::with_overrides(&config.methods)?;

    if cli.list_methods {
        list_methods(&registry);
        return Ok(());
    }

    let invocation = Invocation::resolve(&cli, &config, &registry)?;
    let plan = invocation.plan()?;
    tracing::debug!(
        "Resolved {} with {} case(s), {} job(s)",
        invocation.method.name,
        plan.len(),
        invocation.jobs
    );

    if cli.dry_run {
        print_plan(&invocation, &plan);
        return Ok(());
    }

    let report = execute(&invocation, &plan, true)?;
    write_result(&invocation.result, invocation.format, &report)?;
    Ok(())
}

/// Run every planned case and assemble the report
pub fn execute(invocation: &Invocation, plan: &CasePlan, show_progress: bool) -> anyhow::Result<Report> {
    let log_directory = &invocation.settings.log_directory;
    std::fs::create_dir_all(log_directory)
        .with_context(|| format!("Failed to create log directory {}", log_directory.display()))?;

    let runner = CaseRunner::new(invocation.method.clone(), invocation.settings.clone());
    let scheduler = Scheduler::new(runner, invocation.jobs)?.with_progress(show_progress);

    print_banner(invocation);
    let started_at = Utc::now();
    println!("Start  at: {}", local_time(started_at));
    let rows = scheduler.run_all(&plan.cases)?;
    let finished_at = Utc::now();
    println!("Finish at: {}", local_time(finished_at));
    tracing::info!(
        "{} of {} case(s) parsed on {} worker(s)",
        rows.iter().filter(|row| !row.is_status()).count(),
        rows.len(),
        scheduler.jobs()
    );

    Ok(Report {
        meta: build_report_meta(invocation.report_config(), started_at, finished_at),
        rows,
    })
}

/// Render the report and write it to the result file
pub fn write_result(path: &Path, format: OutputFormat, report: &Report) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let output = format.render(report)?;
    std::fs::write(path, output)
        .with_context(|| format!("Failed to write result file {}", path.display()))?;
    println!("Result written to: {}", path.display());
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "aigbench=debug" } else { "aigbench=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    // A subscriber may already be installed when runs share a process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

fn or_none(value: &str) -> &str {
    if value.is_empty() { "None" } else { value }
}

fn print_banner(invocation: &Invocation) {
    let settings = &invocation.settings;
    println!("{}", "=".repeat(36));
    println!("Executable    = {}", invocation.method.executable);
    println!("Method        = {}", invocation.method.name);
    println!("Option        = {}", or_none(&settings.option));
    println!("Pre Command   = {}", or_none(&settings.before_command));
    println!("Post Command  = {}", or_none(&settings.after_command));
    println!("Time Limit    = {}", settings.timeout.as_secs_f64());
    println!("No. Core      = {}", invocation.jobs);
    println!("AIG directory = {}", settings.input_directory.display());
    println!("Log directory = {}", settings.log_directory.display());
    println!("Result File   = {}", invocation.result.display());
    println!("Suffix name   = {}", invocation.suffix);
    println!("{}", "=".repeat(36));
}

fn print_plan(invocation: &Invocation, plan: &CasePlan) {
    print_banner(invocation);
    println!("AIGBench Plan:");
    for case in &plan.cases {
        println!("├── {}", case);
    }
    println!("{} cases found.", plan.len());

    if let Some(first) = plan.cases.first() {
        let runner = CaseRunner::new(invocation.method.clone(), invocation.settings.clone());
        println!("\nScript for {}:", first);
        print!("{}", runner.script_for(first));
    }
}

fn list_methods(registry: &Registry) {
    println!("Available methods:");
    for method in registry.methods() {
        println!(
            "  {:<14} {:<16} {}",
            method.name,
            method.parser.name(),
            method.executable
        );
    }
}
