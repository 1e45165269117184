//! Case Planner
//!
//! Builds the case list of a run from the input directory.
//!
//! Filtering options:
//! - Filename suffix (plain `ends_with`, the extension is kept in the case id)
//! - Regex pattern matching on the case id
//!
//! Ordering: Cases are sorted by id so planning output is deterministic.

use crate::config::ConfigError;
use regex::Regex;
use std::path::Path;

/// Cases selected for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CasePlan {
    /// Ordered case ids
    pub cases: Vec<String>,
}

impl CasePlan {
    /// Number of cases
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether no case was selected
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Build a plan from candidate filenames
pub fn build_plan<I, S>(names: I, suffix: &str, filter: Option<&Regex>) -> CasePlan
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut cases: Vec<String> = names
        .into_iter()
        .map(Into::into)
        .filter(|name| name.ends_with(suffix))
        .filter(|name| filter.is_none_or(|re| re.is_match(name)))
        .collect();

    cases.sort();
    cases.dedup();

    CasePlan { cases }
}

/// List regular files of `dir` and plan them
pub fn discover_cases(
    dir: &Path,
    suffix: &str,
    filter: Option<&Regex>,
) -> Result<CasePlan, ConfigError> {
    let io_err = |source: std::io::Error| ConfigError::InputDirectory {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => tracing::warn!("Skipping non UTF-8 filename {:?}", raw),
        }
    }

    let plan = build_plan(names, suffix, filter);
    tracing::debug!("Planned {} case(s) from {}", plan.len(), dir.display());
    Ok(plan)
}
