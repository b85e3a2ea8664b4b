//! Target-label normalization and wildcard expansion.
//!
//! Labels address targets and directories with a canonical, workspace-rooted
//! `/`-separated path. Arguments starting with `//` are interpreted relative
//! to the workspace root; everything else is interpreted relative to the
//! caller's working directory. Running `gantry build //src/app/tool` from
//! anywhere in the workspace is equivalent to running `gantry build tool` in
//! `.../src/app/`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Errors during label normalization or expansion.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
  #[error("path '{path}' is not inside any workspace module")]
  OutsideWorkspace { path: String },

  #[error("target '{label}' does not exist")]
  UnknownTarget { label: String },

  #[error("no target matches pattern '{pattern}'")]
  WildcardUnmatched { pattern: String },
}

/// Wildcard marker: a label ending in `...` addresses the label's prefix and
/// everything nested under it.
pub const WILDCARD_SUFFIX: &str = "...";

/// Convert a raw CLI argument into a canonical workspace-rooted label.
///
/// Arguments starting with `//` are already workspace-rooted and only have
/// their leading separators stripped. Anything else is joined onto the
/// working directory, resolved against the nearest enclosing module root, and
/// rewritten as `<module>/<path>`. A trailing separator (or an empty
/// argument) marks a directory rather than a target and is preserved.
pub fn normalize(
  raw: &str,
  working_dir: &Path,
  modules: &BTreeMap<String, PathBuf>,
) -> Result<String, LabelError> {
  if let Some(rooted) = raw.strip_prefix("//") {
    return Ok(rooted.trim_start_matches('/').to_string());
  }

  let ends_with_slash = raw.ends_with('/') || raw.is_empty();
  let joined = join(&slashify(working_dir), raw);

  let module_root =
    enclosing_module_root(&joined, modules).ok_or_else(|| LabelError::OutsideWorkspace {
      path: joined.clone(),
    })?;

  // Strip everything up to and including the module root's parent, leaving
  // the module directory name as the label's first segment.
  let parent = module_root.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
  let mut label = joined
    .strip_prefix(parent)
    .unwrap_or(joined.as_str())
    .trim_start_matches('/')
    .to_string();
  if ends_with_slash {
    label.push('/');
  }
  Ok(label)
}

/// Expand wildcards and validate exact labels against the discovered target
/// set, returning the deduplicated set of labels to build.
///
/// An exact label must match one discovered target; a wildcard must match at
/// least one or the build fails.
pub fn expand_targets(
  requested: &[String],
  available: &BTreeSet<String>,
) -> Result<BTreeSet<String>, LabelError> {
  let mut resolved = BTreeSet::new();

  for target in requested {
    if let Some(prefix) = target.strip_suffix(WILDCARD_SUFFIX) {
      let mut found = false;
      for candidate in available.iter().filter(|t| t.starts_with(prefix)) {
        found = true;
        resolved.insert(candidate.clone());
      }
      if !found {
        return Err(LabelError::WildcardUnmatched {
          pattern: target.clone(),
        });
      }
    } else {
      if !available.contains(target) {
        return Err(LabelError::UnknownTarget {
          label: target.clone(),
        });
      }
      resolved.insert(target.clone());
    }
  }

  Ok(resolved)
}

/// Render a filesystem path as a `/`-separated string.
fn slashify(path: &Path) -> String {
  path.to_string_lossy().replace('\\', "/")
}

/// Lexically join `rel` onto `base` and clean the result.
fn join(base: &str, rel: &str) -> String {
  if rel.is_empty() {
    clean(base)
  } else {
    clean(&format!("{base}/{rel}"))
  }
}

/// Lexically clean a `/`-separated path: collapse duplicate separators,
/// resolve `.` and `..` segments.
fn clean(path: &str) -> String {
  let absolute = path.starts_with('/');
  let mut parts: Vec<&str> = Vec::new();

  for part in path.split('/') {
    match part {
      "" | "." => {}
      ".." => {
        if parts.last().is_some_and(|p| *p != "..") {
          parts.pop();
        } else if !absolute {
          parts.push("..");
        }
      }
      other => parts.push(other),
    }
  }

  let joined = parts.join("/");
  if absolute {
    format!("/{joined}")
  } else if joined.is_empty() {
    ".".to_string()
  } else {
    joined
  }
}

/// Find the module root whose path is the longest prefix of `path`.
fn enclosing_module_root(path: &str, modules: &BTreeMap<String, PathBuf>) -> Option<String> {
  let mut best: Option<String> = None;

  for root in modules.values() {
    let root = slashify(root);
    if path != root && !path.starts_with(&format!("{root}/")) {
      continue;
    }
    if best.as_ref().is_none_or(|b| root.len() > b.len()) {
      best = Some(root);
    }
  }

  best
}
