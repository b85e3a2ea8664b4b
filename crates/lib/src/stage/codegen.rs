//! Synthesis of the driver sources: per-package registration glue, per-module
//! crate manifests and module indexes, and the top-level driver binary.
//!
//! Everything emitted here lands in the staging tree and is regenerated on
//! every invocation. The generated code is the only caller of the
//! rule-authoring crate on gantry's side: each package's `init.rs` merges the
//! user's definition file via `include!` and registers the declared targets
//! with the shared execution context.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::consts::{
  DRIVER_PACKAGE_NAME, LIB_FILE_NAME, MAIN_FILE_NAME, MANIFEST_FILE_NAME, RULES_CRATE_GIT,
  RULES_CRATE_NAME, RULES_CRATE_TAG, RULES_DIR_NAME, RULES_PATH_ENV,
};
use crate::stage::{Package, StageError};

const GENERATED_HEADER: &str = "// Generated by gantry. Do not edit.\n";

/// Rewrite a module or directory name as a valid Rust identifier.
pub fn sanitize_ident(name: &str) -> String {
  let mut ident = String::with_capacity(name.len());
  for ch in name.chars() {
    if ch.is_ascii_alphanumeric() || ch == '_' {
      ident.push(ch);
    } else {
      ident.push('_');
    }
  }
  if ident.chars().next().is_some_and(|c| c.is_ascii_digit()) {
    ident.insert(0, '_');
  }
  ident
}

/// The registration glue written beside each staged definition file.
///
/// `include!` merges the user's declarations into this module; the `inp`,
/// `inps`, and `out` constructors give them package-scoped path values. All
/// rule-API references are fully qualified so the glue cannot collide with
/// the definition file's own imports.
pub fn init_file(package: &Package, targets: &[String]) -> String {
  let label = package.label();
  let mut src = String::from(GENERATED_HEADER);
  src.push('\n');
  src.push_str("/// Workspace-rooted path of this package.\n");
  src.push_str(&format!("pub const PKG: &str = \"{label}\";\n"));
  src.push('\n');
  for (name, ty) in [("inp", "InPath"), ("inps", "Paths"), ("out", "OutPath")] {
    let arg = if name == "inps" {
      "names: &'static [&'static str]"
    } else {
      "name: &'static str"
    };
    let value = if name == "inps" { "names" } else { "name" };
    src.push_str("#[allow(dead_code)]\n");
    src.push_str(&format!("const fn {name}({arg}) -> gantry_rules::core::{ty} {{\n"));
    src.push_str(&format!("  gantry_rules::core::{ty}::new(PKG, {value})\n"));
    src.push_str("}\n\n");
  }
  src.push_str("include!(\"BUILD.rs\");\n");
  src.push('\n');
  let param = if targets.is_empty() { "_ctx" } else { "ctx" };
  src.push_str(&format!("pub fn register({param}: &mut gantry_rules::core::Context) {{\n"));
  for target in targets {
    src.push_str(&format!("  ctx.add_target(\"{label}/{target}\", &{target});\n"));
  }
  src.push_str("}\n");
  src
}

/// The module index (`lib.rs`) of one staged module: one glue module per
/// staged package, plus a `rules` module tree exposing every copied rule file
/// nested by directory.
pub fn module_lib_file(packages: &[Package], rule_files: &[String]) -> String {
  let mut src = String::from(GENERATED_HEADER);
  for package in packages {
    src.push('\n');
    let init_path = if package.rel_dir.is_empty() {
      "init.rs".to_string()
    } else {
      format!("{}/init.rs", package.rel_dir)
    };
    src.push_str(&format!("#[path = \"{init_path}\"]\n"));
    src.push_str("#[allow(unused_imports)]\n");
    src.push_str(&format!("pub mod {};\n", package.mod_ident()));
  }
  if !rule_files.is_empty() {
    let mut tree = RuleTree::default();
    for file in rule_files {
      tree.insert(file);
    }
    src.push('\n');
    src.push_str("pub mod rules {\n");
    tree.emit(&mut src, 1);
    src.push_str("}\n");
  }
  src
}

/// Rule files nested by directory, for emission as a module tree.
#[derive(Default)]
struct RuleTree {
  files: BTreeMap<String, String>,
  dirs: BTreeMap<String, RuleTree>,
}

impl RuleTree {
  fn insert(&mut self, rel_path: &str) {
    match rel_path.split_once('/') {
      Some((dir, rest)) => self.dirs.entry(dir.to_string()).or_default().insert(rest),
      None => {
        let ident = sanitize_ident(rel_path.trim_end_matches(".rs"));
        self.files.insert(ident, rel_path.to_string());
      }
    }
  }

  /// Paths are relative to the directory the inline `rules` module maps to,
  /// so each nesting level needs one more `../` to reach the copied tree.
  fn emit(&self, src: &mut String, depth: usize) {
    self.emit_at(src, depth, "");
  }

  fn emit_at(&self, src: &mut String, depth: usize, prefix: &str) {
    let indent = "  ".repeat(depth);
    for (ident, file) in &self.files {
      let ups = "../".repeat(depth);
      src.push_str(&format!("{indent}#[path = \"{ups}{RULES_DIR_NAME}/{prefix}{file}\"]\n"));
      src.push_str(&format!("{indent}pub mod {ident};\n"));
    }
    for (dir, sub) in &self.dirs {
      src.push_str(&format!("{indent}pub mod {} {{\n", sanitize_ident(dir)));
      sub.emit_at(src, depth + 1, &format!("{prefix}{dir}/"));
      src.push_str(&format!("{indent}}}\n"));
    }
  }
}

/// The Cargo manifest of one staged module: a library crate depending on
/// every other staged module (redirected to its staged-tree location) and on
/// the pinned rule-authoring crate.
pub fn module_manifest(module_name: &str, modules: &BTreeMap<String, PathBuf>) -> String {
  let ident = sanitize_ident(module_name);
  let mut manifest = String::from("# Generated by gantry. Do not edit.\n\n");
  manifest.push_str("[package]\n");
  manifest.push_str(&format!("name = \"{ident}\"\n"));
  manifest.push_str("version = \"0.0.0\"\n");
  manifest.push_str("edition = \"2024\"\n\n");
  manifest.push_str("[lib]\n");
  manifest.push_str(&format!("name = \"{ident}\"\n"));
  manifest.push_str(&format!("path = \"{LIB_FILE_NAME}\"\n\n"));
  manifest.push_str("[dependencies]\n");
  for other in modules.keys() {
    if other == module_name {
      continue;
    }
    manifest.push_str(&format!("{} = {{ path = \"../{other}\" }}\n", sanitize_ident(other)));
  }
  manifest.push_str(&format!("{}\n", rules_dependency()));
  manifest
}

/// The driver entry point: runs every staged package's registration against
/// one shared context, then lets the context print the mode's result.
///
/// The context reads the mode and its parameters from the process arguments;
/// registration order follows the stable module iteration order purely for
/// reproducible text.
pub fn driver_main_file(packages: &[Package]) -> String {
  let mut src = String::from(GENERATED_HEADER);
  src.push('\n');
  src.push_str("fn main() {\n");
  let binding = if packages.is_empty() { "let ctx" } else { "let mut ctx" };
  src.push_str(&format!("  {binding} = gantry_rules::core::Context::from_args();\n"));
  for package in packages {
    src.push_str(&format!(
      "  {}::{}::register(&mut ctx);\n",
      sanitize_ident(&package.module),
      package.mod_ident()
    ));
  }
  src.push_str("  ctx.finish();\n");
  src.push_str("}\n");
  src
}

/// The driver's root manifest: a binary package whose workspace spans all
/// staged modules.
pub fn driver_manifest(modules: &BTreeMap<String, PathBuf>) -> String {
  let mut manifest = String::from("# Generated by gantry. Do not edit.\n\n");
  manifest.push_str("[package]\n");
  manifest.push_str(&format!("name = \"{DRIVER_PACKAGE_NAME}\"\n"));
  manifest.push_str("version = \"0.0.0\"\n");
  manifest.push_str("edition = \"2024\"\n\n");
  manifest.push_str("[[bin]]\n");
  manifest.push_str(&format!("name = \"{DRIVER_PACKAGE_NAME}\"\n"));
  manifest.push_str(&format!("path = \"{MAIN_FILE_NAME}\"\n\n"));
  manifest.push_str("[workspace]\n");
  let members: Vec<String> = modules.keys().map(|name| format!("\"{name}\"")).collect();
  manifest.push_str(&format!("members = [{}]\n\n", members.join(", ")));
  manifest.push_str("[dependencies]\n");
  for name in modules.keys() {
    manifest.push_str(&format!("{} = {{ path = \"{name}\" }}\n", sanitize_ident(name)));
  }
  manifest.push_str(&format!("{}\n", rules_dependency()));
  manifest
}

/// The rule-authoring dependency line: pinned to a fixed git tag, or
/// redirected to a local path when the override variable is set.
fn rules_dependency() -> String {
  match env::var(RULES_PATH_ENV) {
    Ok(path) => format!(
      "{RULES_CRATE_NAME} = {{ path = \"{}\" }}",
      path.replace('\\', "/")
    ),
    Err(_) => {
      format!("{RULES_CRATE_NAME} = {{ git = \"{RULES_CRATE_GIT}\", tag = \"{RULES_CRATE_TAG}\" }}")
    }
  }
}

/// Write one staged module's synthesized manifest and module index.
pub(crate) fn write_module(
  stage_dir: &Path,
  module_name: &str,
  packages: &[Package],
  rule_files: &[String],
  modules: &BTreeMap<String, PathBuf>,
) -> Result<(), StageError> {
  write(
    &stage_dir.join(MANIFEST_FILE_NAME),
    &module_manifest(module_name, modules),
  )?;
  write(
    &stage_dir.join(LIB_FILE_NAME),
    &module_lib_file(packages, rule_files),
  )
}

/// Write the top-level driver source and root manifest.
pub(crate) fn write_driver(
  staging_root: &Path,
  packages: &[Package],
  modules: &BTreeMap<String, PathBuf>,
) -> Result<(), StageError> {
  write(&staging_root.join(MAIN_FILE_NAME), &driver_main_file(packages))?;
  write(&staging_root.join(MANIFEST_FILE_NAME), &driver_manifest(modules))
}

pub(crate) fn write(path: &Path, content: &str) -> Result<(), StageError> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(|e| StageError::Write {
      path: parent.display().to_string(),
      message: e.to_string(),
    })?;
  }
  fs::write(path, content).map_err(|e| StageError::Write {
    path: path.display().to_string(),
    message: e.to_string(),
  })
}
