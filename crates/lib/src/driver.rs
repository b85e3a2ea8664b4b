//! Compilation and execution of the synthesized driver.
//!
//! The driver is an ordinary Cargo project rooted at the staging tree; every
//! run is a blocking `cargo run` child process whose captured stdout is the
//! query result or the emitted action graph. The driver's stderr (compile
//! diagnostics, panics) is always surfaced to the user, success or not.

use std::collections::BTreeSet;
use std::env;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::config::BuildConfig;
use crate::consts::CARGO_ENV;

/// Errors during driver compilation or execution.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
  #[error("failed to run driver in mode '{mode}': {message}")]
  Spawn { mode: &'static str, message: String },

  #[error("driver failed in mode '{mode}' (exit code {code:?})")]
  Failed { mode: &'static str, code: Option<i32> },
}

/// What the driver is asked to print on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverMode {
  /// Every resolvable target label, one per line.
  Targets,
  /// Every flag name referenced by any registered target, one per line.
  Flags,
  /// The complete low-level build file for the action graph.
  Ninja,
}

impl DriverMode {
  pub fn as_str(self) -> &'static str {
    match self {
      DriverMode::Targets => "targets",
      DriverMode::Flags => "flags",
      DriverMode::Ninja => "ninja",
    }
  }
}

/// Compile and run the driver in the given mode, returning its stdout bytes.
///
/// The child runs with the staging tree as its working directory and a
/// configuration-scoped `CARGO_TARGET_DIR`, so regenerating staged sources
/// reuses compiled driver artifacts. A non-zero exit is fatal.
pub fn run(
  build: &BuildConfig,
  mode: DriverMode,
  working_dir: &Path,
) -> Result<Vec<u8>, DriverError> {
  let cargo = env::var(CARGO_ENV).unwrap_or_else(|_| "cargo".to_string());
  debug!(mode = mode.as_str(), cargo = %cargo, "running driver");

  let output = Command::new(&cargo)
    .args(["run", "--quiet", "--"])
    .arg(mode.as_str())
    .arg(build.source_dir())
    .arg(build.output_dir())
    .arg(working_dir)
    .args(build.flags())
    .current_dir(build.build_files_dir())
    .env("CARGO_TARGET_DIR", build.driver_target_dir())
    .output()
    .map_err(|e| DriverError::Spawn {
      mode: mode.as_str(),
      message: e.to_string(),
    })?;

  eprint!("{}", String::from_utf8_lossy(&output.stderr));

  if !output.status.success() {
    return Err(DriverError::Failed {
      mode: mode.as_str(),
      code: output.status.code(),
    });
  }

  Ok(output.stdout)
}

/// All target labels the staged definitions resolve to.
pub fn available_targets(
  build: &BuildConfig,
  working_dir: &Path,
) -> Result<BTreeSet<String>, DriverError> {
  query(build, DriverMode::Targets, working_dir)
}

/// All flag names referenced by any registered target. Enumerable without
/// supplying any flag value.
pub fn available_flags(
  build: &BuildConfig,
  working_dir: &Path,
) -> Result<BTreeSet<String>, DriverError> {
  query(build, DriverMode::Flags, working_dir)
}

fn query(
  build: &BuildConfig,
  mode: DriverMode,
  working_dir: &Path,
) -> Result<BTreeSet<String>, DriverError> {
  let stdout = run(build, mode, working_dir)?;
  Ok(
    String::from_utf8_lossy(&stdout)
      .lines()
      .filter(|line| !line.is_empty())
      .map(str::to_string)
      .collect(),
  )
}
