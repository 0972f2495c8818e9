//! Line-oriented loading plan text format.
//!
//! ```text
//! # One container per line, keys in any order:
//! ContainerID=AKE123, Weight=4800, Position=2R
//! ```
//!
//! Lines starting with `#` and blank lines are skipped. A data line must
//! have exactly three comma-separated `Key=Value` segments with keys
//! `ContainerID`, `Weight`, and `Position`; `Weight` must parse as a
//! number. A malformed line is logged and skipped, never fatal: one typo
//! in a plan file must not take down the whole flight's plan.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::plan::{LoadingPlan, PlanEntry};

/// Canned plan text used by demos and the harness. Same content as
/// `data/sample_loading_plan.txt`.
pub const SAMPLE_PLAN: &str = "\
# RampCheck sample loading plan
# One container per line: ContainerID=<id>, Weight=<kg>, Position=<row><L|R>
# Lines starting with # and blank lines are ignored.

ContainerID=AKE123, Weight=4800, Position=2R
ContainerID=AKE456, Weight=3000, Position=1L
ContainerID=AKE789, Weight=3500, Position=3L
ContainerID=PMC001, Weight=4200, Position=2L
";

/// File-level failures loading a plan from disk. Line-level problems are
/// not errors; they skip the line with a warning.
#[derive(Debug, thiserror::Error)]
pub enum PlanFileError {
    #[error("cannot read loading plan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parse plan text. Infallible: malformed lines are skipped with a warning.
pub fn parse_str(text: &str) -> LoadingPlan {
    let mut plan = LoadingPlan::new();
    for (idx, line) in text.lines().enumerate() {
        parse_line_into(&mut plan, line, idx + 1);
    }
    plan
}

/// Parse a plan from any buffered reader (asset streams, test fixtures).
/// Only a read failure is an error.
pub fn parse_reader<R: BufRead>(reader: R) -> io::Result<LoadingPlan> {
    let mut plan = LoadingPlan::new();
    for (idx, line) in reader.lines().enumerate() {
        parse_line_into(&mut plan, &line?, idx + 1);
    }
    Ok(plan)
}

/// Parse a plan file from disk.
pub fn parse_file(path: impl AsRef<Path>) -> Result<LoadingPlan, PlanFileError> {
    let path = path.as_ref();
    let io_err = |source| PlanFileError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    parse_reader(BufReader::new(file)).map_err(io_err)
}

fn parse_line_into(plan: &mut LoadingPlan, line: &str, line_no: usize) {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return;
    }
    match parse_line(trimmed) {
        Some(entry) => plan.upsert_entry(entry),
        None => log::warn!("skipping malformed plan line {}: {}", line_no, trimmed),
    }
}

/// Parse one data line into an entry. `None` when the line does not have
/// exactly three segments, a key is missing or empty, or the weight is
/// not a number.
pub fn parse_line(line: &str) -> Option<PlanEntry> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() != 3 {
        return None;
    }

    let mut container_id: Option<String> = None;
    let mut weight_kg: Option<f32> = None;
    let mut slot_code: Option<String> = None;

    for part in parts {
        let part = part.trim();
        if let Some(v) = part.strip_prefix("ContainerID=") {
            container_id = Some(v.trim().to_string());
        } else if let Some(v) = part.strip_prefix("Weight=") {
            weight_kg = v.trim().parse().ok();
        } else if let Some(v) = part.strip_prefix("Position=") {
            slot_code = Some(v.trim().to_string());
        }
    }

    let container_id = container_id.filter(|s| !s.is_empty())?;
    let slot_code = slot_code.filter(|s| !s.is_empty())?;
    Some(PlanEntry {
        container_id,
        expected_weight_kg: weight_kg?,
        expected_slot_code: slot_code,
    })
}
