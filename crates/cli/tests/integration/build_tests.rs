//! End-to-end build tests: listing, resolution, graph emission, and the
//! Ninja handoff, exercised through real driver compile-and-run cycles.

use predicates::prelude::*;
use serial_test::serial;

use crate::common::{DOCS_BUILD_FILE, TestEnv};

#[test]
#[serial]
fn zero_args_lists_targets_and_flags_without_building() {
  let env = TestEnv::with_tool_target();

  env
    .gantry_cmd()
    .arg("build")
    .assert()
    .success()
    .stdout(predicate::str::contains("Available targets:"))
    .stdout(predicate::str::contains("  //ws/TOOL"))
    .stdout(predicate::str::contains("Available flags:"))
    .stdout(predicate::str::contains("  config="));

  assert!(!env.ninja_log().exists(), "listing must not invoke the executor");

  // The staging tree was materialized under the configuration directory.
  let build_dir = env.workspace().join("BUILD");
  let config_dir = std::fs::read_dir(&build_dir).unwrap().next().unwrap().unwrap().path();
  let staged = config_dir.join("buildfiles");
  assert!(staged.join("Cargo.toml").is_file());
  assert!(staged.join("main.rs").is_file());
  assert!(staged.join("ws/BUILD.rs").is_file());
  assert!(staged.join("ws/init.rs").is_file());
  assert!(staged.join("ws/lib.rs").is_file());
  assert!(staged.join("ws/RULES/exec.rs").is_file());
}

#[test]
#[serial]
fn zero_args_json_listing() {
  let env = TestEnv::with_tool_target();

  let output = env
    .gantry_cmd()
    .arg("build")
    .arg("--format")
    .arg("json")
    .assert()
    .success()
    .get_output()
    .stdout
    .clone();

  let listing: serde_json::Value = serde_json::from_slice(&output).unwrap();
  assert_eq!(listing["targets"], serde_json::json!(["ws/TOOL"]));
  assert_eq!(listing["flags"], serde_json::json!(["config"]));
}

#[test]
#[serial]
fn targets_without_the_build_capability_are_not_listed() {
  let env = TestEnv::with_tool_target();
  env.write_file(
    "ws/notes/BUILD.rs",
    "static README: gantry_rules::core::Note = gantry_rules::core::Note { text: \"readme\" };\n",
  );

  env
    .gantry_cmd()
    .arg("build")
    .assert()
    .success()
    .stdout(predicate::str::contains("//ws/TOOL"))
    .stdout(predicate::str::contains("README").not());
}

#[test]
#[serial]
#[cfg(unix)]
fn builds_a_single_target() {
  let env = TestEnv::with_tool_target();

  env
    .gantry_cmd()
    .arg("build")
    .arg("//ws/TOOL")
    .assert()
    .success()
    .stdout(predicate::str::contains("Built 1 target(s)"));

  let invocations = env.ninja_invocations();
  assert_eq!(invocations, vec!["ws/TOOL"]);

  let graph = std::fs::read_to_string(env.find_ninja_file().unwrap()).unwrap();
  assert!(graph.contains("command = echo building ${config} tool"));
  assert!(graph.contains("build ws/tool.bin:"));
  assert!(graph.contains("ws/main.c"));
}

#[test]
#[serial]
#[cfg(unix)]
fn relative_labels_resolve_against_the_working_directory() {
  let env = TestEnv::with_tool_target();

  env
    .gantry_cmd()
    .arg("build")
    .arg("TOOL")
    .assert()
    .success();

  assert_eq!(env.ninja_invocations(), vec!["ws/TOOL"]);
}

#[test]
#[serial]
#[cfg(unix)]
fn wildcard_builds_everything_under_the_prefix() {
  let env = TestEnv::with_tool_target();
  env.write_file("ws/sub/BUILD.rs", DOCS_BUILD_FILE);

  env
    .gantry_cmd()
    .arg("build")
    .arg("//ws/...")
    .assert()
    .success()
    .stdout(predicate::str::contains("Built 2 target(s)"));

  assert_eq!(env.ninja_invocations(), vec!["ws/TOOL ws/sub/DOCS"]);
}

#[test]
#[serial]
#[cfg(unix)]
fn flag_values_reach_the_emitted_graph() {
  let env = TestEnv::with_tool_target();

  env
    .gantry_cmd()
    .arg("build")
    .arg("//ws/TOOL")
    .arg("config=debug")
    .assert()
    .success();

  let graph = std::fs::read_to_string(env.find_ninja_file().unwrap()).unwrap();
  assert!(graph.contains("command = echo building debug tool"));
}

#[test]
#[serial]
#[cfg(unix)]
fn distinct_flag_sets_use_distinct_build_directories() {
  let env = TestEnv::with_tool_target();

  env.gantry_cmd().arg("build").arg("//ws/TOOL").assert().success();
  env
    .gantry_cmd()
    .arg("build")
    .arg("//ws/TOOL")
    .arg("config=debug")
    .assert()
    .success();

  let configs = std::fs::read_dir(env.workspace().join("BUILD")).unwrap().count();
  assert_eq!(configs, 2);
}

#[test]
#[serial]
fn unknown_target_fails() {
  let env = TestEnv::with_tool_target();

  env
    .gantry_cmd()
    .arg("build")
    .arg("//ws/nope")
    .assert()
    .failure()
    .stderr(predicate::str::contains("'ws/nope' does not exist"));

  assert!(!env.ninja_log().exists());
}

#[test]
#[serial]
fn unmatched_wildcard_fails() {
  let env = TestEnv::with_tool_target();

  env
    .gantry_cmd()
    .arg("build")
    .arg("//ws/zzz/...")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no target matches pattern 'ws/zzz/...'"));
}

#[test]
#[serial]
fn unknown_flag_fails() {
  let env = TestEnv::with_tool_target();

  env
    .gantry_cmd()
    .arg("build")
    .arg("//ws/TOOL")
    .arg("nope=1")
    .assert()
    .failure()
    .stderr(predicate::str::contains("flag 'nope' does not exist"));

  assert!(!env.ninja_log().exists());
}
