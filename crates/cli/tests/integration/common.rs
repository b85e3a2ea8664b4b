//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// A rule library defining one buildable rule type, written into fixture
/// workspaces as `RULES/exec.rs`.
pub const EXEC_RULE: &str = r#"
use gantry_rules::core::{BuildStep, Buildable, Context, OutPath, Paths, Target};

pub struct Exec {
  pub command: &'static str,
  pub srcs: Paths,
  pub out: OutPath,
  pub flags: &'static [&'static str],
}

impl Target for Exec {
  fn flag_names(&self) -> &[&'static str] {
    self.flags
  }

  fn as_buildable(&self) -> Option<&dyn Buildable> {
    Some(self)
  }
}

impl Buildable for Exec {
  fn build_steps(&self, ctx: &Context) -> Vec<BuildStep> {
    let mut command = self.command.to_string();
    for name in self.flags {
      if let Some(value) = ctx.flag(name) {
        command = command.replace(&format!("${{{name}}}"), value);
      }
    }
    vec![BuildStep {
      command,
      inputs: self.srcs.render(),
      outputs: vec![self.out.to_string()],
    }]
  }
}
"#;

/// A definition file declaring one buildable target referencing one flag.
pub const TOOL_BUILD_FILE: &str = r#"
use crate::rules::exec::Exec;

static TOOL: Exec = Exec {
  command: "echo building ${config} tool",
  srcs: inps(&["main.c"]),
  out: out("tool.bin"),
  flags: &["config"],
};
"#;

/// A second buildable target for wildcard tests, placed in a subdirectory.
pub const DOCS_BUILD_FILE: &str = r#"
use crate::rules::exec::Exec;

static DOCS: Exec = Exec {
  command: "echo building docs",
  srcs: inps(&["index.md"]),
  out: out("docs.html"),
  flags: &[],
};
"#;

/// Isolated fixture workspace for one test.
///
/// The workspace root is `<temp>/ws` with a `MODULE` marker; the staged
/// driver resolves the rule-authoring crate to the local fixture via
/// `GANTRY_RULES_PATH`, and Ninja is replaced by a recording stub via
/// `GANTRY_NINJA`.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_file("ws/MODULE", "");
    #[cfg(unix)]
    env.write_ninja_stub();
    env
  }

  /// A workspace with the exec rule and one `TOOL` target at the root.
  pub fn with_tool_target() -> Self {
    let env = Self::new();
    env.write_file("ws/RULES/exec.rs", EXEC_RULE);
    env.write_file("ws/BUILD.rs", TOOL_BUILD_FILE);
    env
  }

  pub fn workspace(&self) -> PathBuf {
    let path = self.temp.path().join("ws");
    dunce::canonicalize(&path).unwrap_or(path)
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Path to the local stand-in for the rule-authoring crate.
  pub fn rules_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
      .join("tests")
      .join("fixtures")
      .join("gantry-rules")
  }

  fn ninja_stub(&self) -> PathBuf {
    self.temp.path().join("ninja-stub")
  }

  pub fn ninja_log(&self) -> PathBuf {
    self.temp.path().join("ninja.log")
  }

  /// One recorded line per executor invocation: the arguments as passed.
  pub fn ninja_invocations(&self) -> Vec<String> {
    std::fs::read_to_string(self.ninja_log())
      .map(|log| log.lines().map(str::to_string).collect())
      .unwrap_or_default()
  }

  #[cfg(unix)]
  fn write_ninja_stub(&self) {
    use std::os::unix::fs::PermissionsExt;

    let stub = self.ninja_stub();
    std::fs::write(
      &stub,
      format!("#!/bin/sh\necho \"$@\" >> {}\n", self.ninja_log().display()),
    )
    .unwrap();
    std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();
  }

  /// The emitted low-level build file, if any configuration produced one.
  pub fn find_ninja_file(&self) -> Option<PathBuf> {
    let build_dir = self.workspace().join("BUILD");
    for entry in std::fs::read_dir(build_dir).ok()? {
      let candidate = entry.ok()?.path().join("output").join("build.ninja");
      if candidate.is_file() {
        return Some(candidate);
      }
    }
    None
  }

  /// Get a pre-configured Command for the gantry binary, rooted at the
  /// fixture workspace.
  pub fn gantry_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("gantry");
    cmd.current_dir(self.workspace());
    cmd.env("GANTRY_RULES_PATH", Self::rules_fixture());
    cmd.env("GANTRY_NINJA", self.ninja_stub());
    cmd
  }
}
