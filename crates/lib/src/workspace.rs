//! Workspace and module discovery.
//!
//! A workspace is rooted at a module directory marked by a `MODULE` file.
//! Fetched dependency modules live under `DEPS/` inside the workspace root;
//! the bootstrapper may symlink the root module into `DEPS/` as well so that
//! all modules resolve under one directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::consts::{DEPS_DIR_NAME, MODULE_FILE_NAME};

/// Errors during workspace or module discovery.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
  #[error("no workspace root found above '{start}' (missing MODULE marker)")]
  RootNotFound { start: String },

  #[error("failed to read dependency directory '{path}': {message}")]
  ReadDeps { path: String, message: String },
}

/// Find the nearest enclosing module root for `path`.
///
/// Walks up from `path` until a directory containing the `MODULE` marker
/// file is found.
pub fn module_root_for(path: &Path) -> Option<PathBuf> {
  path
    .ancestors()
    .find(|dir| dir.join(MODULE_FILE_NAME).is_file())
    .map(Path::to_path_buf)
}

/// Find the workspace root for the given starting directory.
///
/// The workspace root is the nearest enclosing module root, except when that
/// module sits directly under a `DEPS` directory: then the workspace root is
/// the module containing `DEPS` (the invocation came from inside a fetched
/// dependency).
pub fn find_workspace_root(start: &Path) -> Result<PathBuf, WorkspaceError> {
  let module_root = module_root_for(start).ok_or_else(|| WorkspaceError::RootNotFound {
    start: start.display().to_string(),
  })?;

  if let Some(parent) = module_root.parent()
    && parent.file_name().is_some_and(|name| name == DEPS_DIR_NAME)
    && let Some(owner) = parent.parent()
    && owner.join(MODULE_FILE_NAME).is_file()
  {
    debug!(root = %owner.display(), "workspace root found via dependency module");
    return Ok(owner.to_path_buf());
  }

  debug!(root = %module_root.display(), "workspace root");
  Ok(module_root)
}

/// Map module name to absolute path: the root module plus every entry of the
/// workspace's dependency directory.
///
/// A `DEPS` entry with the same name as the root module is skipped (the
/// bootstrapper symlinks the root module into `DEPS` for path resolution).
pub fn module_paths(workspace_root: &Path) -> Result<BTreeMap<String, PathBuf>, WorkspaceError> {
  let mut modules = BTreeMap::new();

  let root_name = workspace_root
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| "root".to_string());
  modules.insert(root_name.clone(), workspace_root.to_path_buf());

  let deps_dir = workspace_root.join(DEPS_DIR_NAME);
  if !deps_dir.is_dir() {
    debug!("workspace has no dependency directory");
    return Ok(modules);
  }

  let entries = fs::read_dir(&deps_dir).map_err(|e| WorkspaceError::ReadDeps {
    path: deps_dir.display().to_string(),
    message: e.to_string(),
  })?;

  for entry in entries {
    let entry = entry.map_err(|e| WorkspaceError::ReadDeps {
      path: deps_dir.display().to_string(),
      message: e.to_string(),
    })?;
    let name = entry.file_name().to_string_lossy().into_owned();
    let path = deps_dir.join(entry.file_name());

    // is_dir() follows symlinks, so symlinked modules are picked up too.
    if !path.is_dir() {
      continue;
    }
    if name == root_name {
      debug!(module = %name, "skipping DEPS self-link of the root module");
      continue;
    }

    // Resolve symlinked modules to their real location so that module roots
    // prefix-match canonicalized working directories.
    let path = dunce::canonicalize(&path).unwrap_or(path);

    debug!(module = %name, path = %path.display(), "found dependency module");
    modules.insert(name, path);
  }

  Ok(modules)
}
