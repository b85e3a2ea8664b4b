//! Implementation of the `gantry build` command.
//!
//! Orchestrates the whole pipeline: workspace discovery, label
//! normalization, staging, driver queries, wildcard expansion, flag
//! validation, graph emission, and the Ninja handoff. With no target
//! arguments it prints the available targets and flags and exits without
//! building anything.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use gantry_lib::config::{self, BuildConfig};
use gantry_lib::driver::{self, DriverMode};
use gantry_lib::{label, ninja, stage, workspace};

use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct Listing {
  targets: Vec<String>,
  flags: Vec<String>,
}

/// Execute the build command.
pub fn cmd_build(args: &[String], format: OutputFormat, verbose: bool) -> Result<()> {
  let started = Instant::now();

  let working_dir = std::env::current_dir().context("Failed to determine working directory")?;
  let working_dir = dunce::canonicalize(&working_dir).unwrap_or(working_dir);

  let workspace_root = workspace::find_workspace_root(&working_dir)?;
  let modules = workspace::module_paths(&workspace_root)?;

  let (raw_targets, flags) = config::split_args(args);
  let build = BuildConfig::new(&workspace_root, flags);
  debug!(config = %build.config_name(), flags = ?build.flags(), "build configuration");

  let mut targets = Vec::with_capacity(raw_targets.len());
  for raw in &raw_targets {
    targets.push(label::normalize(raw, &working_dir, &modules)?);
  }
  debug!(targets = ?targets, "normalized targets");

  stage::stage_workspace(&build, &modules).context("Failed to stage build files")?;

  let available_targets = driver::available_targets(&build, &working_dir)
    .context("Failed to enumerate available targets")?;
  let available_flags =
    driver::available_flags(&build, &working_dir).context("Failed to enumerate available flags")?;

  if targets.is_empty() {
    debug!("no targets requested, listing what is available");
    return print_listing(&available_targets, &available_flags, format);
  }

  let resolved = label::expand_targets(&targets, &available_targets)?;
  debug!(targets = ?resolved, "expanded targets");

  build.validate_flags(&available_flags)?;

  let graph = driver::run(&build, DriverMode::Ninja, &working_dir)?;
  ninja::run(&build, &graph, &resolved, verbose)?;

  let elapsed = Duration::from_secs(started.elapsed().as_secs());
  output::print_success(&format!(
    "Built {} target(s) in {}",
    resolved.len(),
    humantime::format_duration(elapsed)
  ));
  Ok(())
}

fn print_listing(
  targets: &BTreeSet<String>,
  flags: &BTreeSet<String>,
  format: OutputFormat,
) -> Result<()> {
  if format.is_json() {
    return output::print_json(&Listing {
      targets: targets.iter().cloned().collect(),
      flags: flags.iter().cloned().collect(),
    });
  }

  println!();
  output::print_heading("Available targets:");
  for target in targets {
    println!("  //{target}");
  }
  println!();
  output::print_heading("Available flags:");
  for flag in flags {
    println!("  {flag}=");
  }
  Ok(())
}
