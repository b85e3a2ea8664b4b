//! Build-configuration identity and directory layout.
//!
//! The set of `name=value` build flags (order-independent, deduplicated)
//! determines the configuration identity. Each distinct flag set gets its own
//! directory under `<workspaceRoot>/BUILD/`, keeping staged driver sources and
//! build outputs of different configurations from colliding, and letting
//! repeated invocations with the same flags reuse the same directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::consts::{
  BUILD_DIR_NAME, BUILD_FILES_DIR_NAME, DEPS_DIR_NAME, DRIVER_TARGET_DIR_NAME, OUTPUT_DIR_NAME,
};

/// Errors during flag validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("flag '{name}' does not exist")]
  UnknownFlag { name: String },
}

/// One build configuration: a workspace root plus a canonical flag set.
#[derive(Debug, Clone)]
pub struct BuildConfig {
  workspace_root: PathBuf,
  flags: Vec<String>,
}

impl BuildConfig {
  /// Canonicalize the flag set: sorted, exact duplicates removed.
  pub fn new(workspace_root: &Path, mut flags: Vec<String>) -> Self {
    flags.sort();
    flags.dedup();
    Self {
      workspace_root: workspace_root.to_path_buf(),
      flags,
    }
  }

  /// The canonical `name=value` flag list, sorted and deduplicated.
  pub fn flags(&self) -> &[String] {
    &self.flags
  }

  pub fn workspace_root(&self) -> &Path {
    &self.workspace_root
  }

  /// `BUILD-<8 hex>`: the checksum is the first 32 bits of the SHA-256 digest
  /// of the `#`-joined canonical flag list.
  ///
  /// Identical flag sets yield identical names across runs regardless of the
  /// order or duplication of the input arguments.
  pub fn config_name(&self) -> String {
    let digest = Sha256::digest(self.flags.join("#").as_bytes());
    let checksum = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    format!("{BUILD_DIR_NAME}-{checksum:08X}")
  }

  /// `<workspaceRoot>/BUILD/<configName>/`.
  pub fn config_dir(&self) -> PathBuf {
    self.workspace_root.join(BUILD_DIR_NAME).join(self.config_name())
  }

  /// Staging tree for copied definitions, rule libraries, and generated
  /// driver sources.
  pub fn build_files_dir(&self) -> PathBuf {
    self.config_dir().join(BUILD_FILES_DIR_NAME)
  }

  /// Build outputs and the emitted low-level build file.
  pub fn output_dir(&self) -> PathBuf {
    self.config_dir().join(OUTPUT_DIR_NAME)
  }

  /// Cargo build cache for the synthesized driver. Lives beside the staging
  /// tree so that regenerating `buildfiles/` keeps compiled driver artifacts.
  pub fn driver_target_dir(&self) -> PathBuf {
    self.config_dir().join(DRIVER_TARGET_DIR_NAME)
  }

  /// The workspace's dependency directory, passed through to the driver.
  pub fn source_dir(&self) -> PathBuf {
    self.workspace_root.join(DEPS_DIR_NAME)
  }

  /// Check every flag name against the set the staged definitions recognize.
  pub fn validate_flags(&self, available: &BTreeSet<String>) -> Result<(), ConfigError> {
    for flag in &self.flags {
      let name = flag.split('=').next().unwrap_or(flag);
      if !available.contains(name) {
        return Err(ConfigError::UnknownFlag {
          name: name.to_string(),
        });
      }
    }
    Ok(())
  }
}

/// Split raw CLI arguments into targets and build flags: any argument
/// containing `=` is a flag, everything else a target label.
pub fn split_args(args: &[String]) -> (Vec<String>, Vec<String>) {
  let mut targets = Vec::new();
  let mut flags = Vec::new();
  for arg in args {
    if arg.contains('=') {
      flags.push(arg.clone());
    } else {
      targets.push(arg.clone());
    }
  }
  (targets, flags)
}
