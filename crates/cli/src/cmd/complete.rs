//! Shell-completion suggestions for `gantry build` arguments.
//!
//! Flags are suggested as `name=`; targets are prefix-matched against the
//! normalized form of the partial argument and trimmed to the next `/`
//! segment boundary, so completion walks the label tree one segment at a
//! time. The suggestion keeps the user's original spelling (`//`-rooted or
//! relative) and only appends the completed remainder.

use std::collections::BTreeSet;

use anyhow::{Context, Result};

use gantry_lib::config::BuildConfig;
use gantry_lib::{driver, label, stage, workspace};

/// Execute the complete command.
pub fn cmd_complete(prefix: &str) -> Result<()> {
  let working_dir = std::env::current_dir().context("Failed to determine working directory")?;
  let working_dir = dunce::canonicalize(&working_dir).unwrap_or(working_dir);

  let workspace_root = workspace::find_workspace_root(&working_dir)?;
  let modules = workspace::module_paths(&workspace_root)?;

  let build = BuildConfig::new(&workspace_root, Vec::new());
  stage::stage_workspace(&build, &modules)?;

  for flag in driver::available_flags(&build, &working_dir)? {
    println!("{flag}=");
  }

  let normalized = label::normalize(prefix, &working_dir, &modules)?;
  let segments = normalized.split('/').count();

  let mut suggestions = BTreeSet::new();
  for target in driver::available_targets(&build, &working_dir)? {
    if !target.starts_with(&normalized) {
      continue;
    }
    let trimmed = head_segments(&target, segments);
    let remainder = trimmed.strip_prefix(normalized.as_str()).unwrap_or(&trimmed);
    suggestions.insert(format!("{prefix}{remainder}"));
  }
  for suggestion in suggestions {
    println!("{suggestion}");
  }
  Ok(())
}

/// Everything up to and including the `count`-th separator, or the whole
/// label when it has fewer segments.
fn head_segments(label: &str, count: usize) -> String {
  let mut seen = 0;
  for (idx, ch) in label.char_indices() {
    if ch == '/' {
      seen += 1;
      if seen == count {
        return label[..=idx].to_string();
      }
    }
  }
  label.to_string()
}
