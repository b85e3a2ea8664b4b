//! Handoff to the external incremental build executor.
//!
//! The captured action graph is written verbatim to the executor's native
//! file inside the configuration's output directory, then the executor runs
//! from that directory against the resolved target set with its output
//! streamed straight to the user. Whatever state a failed run leaves on disk
//! is the executor's own; no rollback is attempted.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::process::Command;

use tracing::debug;

use crate::config::BuildConfig;
use crate::consts::{NINJA_ENV, NINJA_FILE_NAME};

/// Errors while writing the build file or running the executor.
#[derive(Debug, thiserror::Error)]
pub enum NinjaError {
  #[error("failed to write build file '{path}': {message}")]
  WriteGraph { path: String, message: String },

  #[error("failed to run ninja: {message}")]
  Spawn { message: String },

  #[error("ninja failed (exit code {code:?})")]
  Failed { code: Option<i32> },
}

/// Write the graph to `output/build.ninja` and run the executor against the
/// resolved target labels, streaming its output live.
pub fn run(
  build: &BuildConfig,
  graph: &[u8],
  targets: &BTreeSet<String>,
  verbose: bool,
) -> Result<(), NinjaError> {
  let output_dir = build.output_dir();
  fs::create_dir_all(&output_dir).map_err(|e| NinjaError::WriteGraph {
    path: output_dir.display().to_string(),
    message: e.to_string(),
  })?;

  let ninja_file = output_dir.join(NINJA_FILE_NAME);
  fs::write(&ninja_file, graph).map_err(|e| NinjaError::WriteGraph {
    path: ninja_file.display().to_string(),
    message: e.to_string(),
  })?;
  debug!(path = %ninja_file.display(), bytes = graph.len(), "wrote build file");

  let ninja = env::var(NINJA_ENV).unwrap_or_else(|_| "ninja".to_string());
  let mut command = Command::new(&ninja);
  if verbose {
    command.arg("-v");
  }
  command.args(targets).current_dir(&output_dir);

  debug!(ninja = %ninja, targets = targets.len(), "running ninja");
  let status = command.status().map_err(|e| NinjaError::Spawn {
    message: e.to_string(),
  })?;

  if !status.success() {
    return Err(NinjaError::Failed {
      code: status.code(),
    });
  }
  Ok(())
}
