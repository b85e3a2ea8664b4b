//! Staging of definition files and rule libraries into an isolated tree.
//!
//! Each invocation rebuilds the configuration's `buildfiles/` directory from
//! scratch: every module's `BUILD.rs` files are discovered, checked against
//! the restricted grammar, and copied beside generated registration glue; the
//! module's `RULES/` sources are copied verbatim; and a synthesized Cargo
//! workspace ties everything together so the driver can be compiled and run.
//! The staging tree is disposable derived state and never edited by hand.

pub mod codegen;
pub mod parse;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::BuildConfig;
use crate::consts::{BUILD_DIR_NAME, DEFINITION_FILE_NAME, DEPS_DIR_NAME, RULES_DIR_NAME};

/// Errors during staging.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
  #[error("failed to remove staging tree '{path}': {message}")]
  Clean { path: String, message: String },

  #[error("failed to search module '{module}' for definition files: {message}")]
  Walk { module: String, message: String },

  #[error("failed to read '{path}': {message}")]
  Read { path: String, message: String },

  #[error("failed to parse '{path}': {message}")]
  Parse { path: String, message: String },

  #[error(
    "'{path}' contains invalid declarations: only use declarations and named const/static items are allowed"
  )]
  InvalidDeclaration { path: String },

  #[error("'{path}' contains anonymous target declarations: all targets must have a name")]
  AnonymousTarget { path: String },

  #[error("failed to copy '{path}': {message}")]
  Copy { path: String, message: String },

  #[error("failed to write '{path}': {message}")]
  Write { path: String, message: String },
}

/// A directory containing at least one staged definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
  pub module: String,
  /// Directory relative to the module root; empty for the module root itself.
  pub rel_dir: String,
}

impl Package {
  /// Workspace-rooted label prefix of this package.
  pub fn label(&self) -> String {
    if self.rel_dir.is_empty() {
      self.module.clone()
    } else {
      format!("{}/{}", self.module, self.rel_dir)
    }
  }

  /// Identifier of this package's glue module inside the staged crate.
  pub fn mod_ident(&self) -> String {
    if self.rel_dir.is_empty() {
      "pkg".to_string()
    } else {
      format!("pkg_{}", codegen::sanitize_ident(&self.rel_dir))
    }
  }
}

/// Stage every module's definition files and rule library into the
/// configuration's staging tree and synthesize the driver sources.
///
/// The old tree is deleted first; the returned list contains every package
/// with at least one staged definition file.
pub fn stage_workspace(
  build: &BuildConfig,
  modules: &BTreeMap<String, PathBuf>,
) -> Result<Vec<Package>, StageError> {
  let staging_root = build.build_files_dir();

  if staging_root.exists() {
    fs::remove_dir_all(&staging_root).map_err(|e| StageError::Clean {
      path: staging_root.display().to_string(),
      message: e.to_string(),
    })?;
  }

  let mut packages = Vec::new();
  for (name, path) in modules {
    debug!(module = %name, "processing module");
    packages.extend(stage_module(name, path, &staging_root.join(name), modules)?);
  }

  codegen::write_driver(&staging_root, &packages, modules)?;
  Ok(packages)
}

fn stage_module(
  module_name: &str,
  module_path: &Path,
  stage_dir: &Path,
  modules: &BTreeMap<String, PathBuf>,
) -> Result<Vec<Package>, StageError> {
  let definition_files = find_definition_files(module_name, module_path)?;

  let mut packages = Vec::new();
  for file in &definition_files {
    let rel = file.strip_prefix(module_path).unwrap_or(file);
    let rel_dir = rel
      .parent()
      .map(|dir| dir.to_string_lossy().replace('\\', "/"))
      .unwrap_or_default();

    let source = fs::read_to_string(file).map_err(|e| StageError::Read {
      path: file.display().to_string(),
      message: e.to_string(),
    })?;
    let targets = parse::parse_definition_file(file, &source)?;

    let package = Package {
      module: module_name.to_string(),
      rel_dir,
    };

    let dest = stage_dir.join(rel);
    copy_file(file, &dest)?;
    codegen::write(
      &dest.with_file_name(crate::consts::INIT_FILE_NAME),
      &codegen::init_file(&package, &targets),
    )?;
    packages.push(package);
  }

  let rule_files = stage_rule_files(module_name, module_path, stage_dir)?;
  codegen::write_module(stage_dir, module_name, &packages, &rule_files, modules)?;

  Ok(packages)
}

/// Walk a module for definition files, following symlinks. The top-level
/// build-output, dependency, and rules directories are not definition
/// sources and are skipped.
fn find_definition_files(module_name: &str, module_path: &Path) -> Result<Vec<PathBuf>, StageError> {
  let walker = WalkDir::new(module_path)
    .follow_links(true)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|entry| {
      !(entry.depth() == 1
        && entry.file_type().is_dir()
        && entry
          .file_name()
          .to_str()
          .is_some_and(|name| matches!(name, BUILD_DIR_NAME | DEPS_DIR_NAME | RULES_DIR_NAME)))
    });

  let mut files = Vec::new();
  for entry in walker {
    let entry = entry.map_err(|e| StageError::Walk {
      module: module_name.to_string(),
      message: e.to_string(),
    })?;
    if entry.file_type().is_file() && entry.file_name() == DEFINITION_FILE_NAME {
      debug!(path = %entry.path().display(), "found definition file");
      files.push(entry.into_path());
    }
  }
  Ok(files)
}

/// Copy every `.rs` file under the module's rule library into the staging
/// tree, preserving relative paths. Rule files are dependencies of definition
/// files, not definition sources: no parsing, no glue. Returns the copied
/// paths relative to the rules directory.
fn stage_rule_files(
  module_name: &str,
  module_path: &Path,
  stage_dir: &Path,
) -> Result<Vec<String>, StageError> {
  let rules_dir = module_path.join(RULES_DIR_NAME);
  if !rules_dir.is_dir() {
    debug!(module = %module_name, "module declares no build rules");
    return Ok(Vec::new());
  }

  let mut rule_files = Vec::new();
  for entry in WalkDir::new(&rules_dir).sort_by_file_name() {
    let entry = entry.map_err(|e| StageError::Walk {
      module: module_name.to_string(),
      message: e.to_string(),
    })?;
    if !entry.file_type().is_file() || entry.path().extension().is_none_or(|ext| ext != "rs") {
      continue;
    }

    let rel = entry.path().strip_prefix(module_path).unwrap_or(entry.path());
    copy_file(entry.path(), &stage_dir.join(rel))?;

    let rules_rel = entry.path().strip_prefix(&rules_dir).unwrap_or(entry.path());
    rule_files.push(rules_rel.to_string_lossy().replace('\\', "/"));
  }
  Ok(rule_files)
}

fn copy_file(from: &Path, to: &Path) -> Result<(), StageError> {
  if let Some(parent) = to.parent() {
    fs::create_dir_all(parent).map_err(|e| StageError::Copy {
      path: parent.display().to_string(),
      message: e.to_string(),
    })?;
  }
  fs::copy(from, to).map_err(|e| StageError::Copy {
    path: from.display().to_string(),
    message: e.to_string(),
  })?;
  Ok(())
}
