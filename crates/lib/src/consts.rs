//! Fixed names and locations used across the pipeline.

/// Marker file identifying a module root.
pub const MODULE_FILE_NAME: &str = "MODULE";

/// Directory holding fetched dependency modules, directly under the workspace root.
pub const DEPS_DIR_NAME: &str = "DEPS";

/// Per-module rule library directory.
pub const RULES_DIR_NAME: &str = "RULES";

/// Only files with exactly this name declare build targets.
pub const DEFINITION_FILE_NAME: &str = "BUILD.rs";

/// Root directory for all build configurations, directly under the workspace root.
pub const BUILD_DIR_NAME: &str = "BUILD";

/// Staging tree inside a configuration directory.
pub const BUILD_FILES_DIR_NAME: &str = "buildfiles";

/// Build outputs and the emitted low-level build file live here.
pub const OUTPUT_DIR_NAME: &str = "output";

/// Cargo build cache for the synthesized driver, kept outside the staging
/// tree so that regenerating `buildfiles/` does not force a full rebuild.
pub const DRIVER_TARGET_DIR_NAME: &str = "driver-target";

/// Name of the emitted low-level build file.
pub const NINJA_FILE_NAME: &str = "build.ninja";

/// Generated glue file written beside each staged definition file.
pub const INIT_FILE_NAME: &str = "init.rs";

/// Generated module index at the root of each staged module.
pub const LIB_FILE_NAME: &str = "lib.rs";

/// Generated driver entry point at the root of the staging tree.
pub const MAIN_FILE_NAME: &str = "main.rs";

/// Cargo manifest name.
pub const MANIFEST_FILE_NAME: &str = "Cargo.toml";

/// Package name of the synthesized driver binary.
pub const DRIVER_PACKAGE_NAME: &str = "gantry-driver";

/// The rule-authoring crate every staged module depends on.
pub const RULES_CRATE_NAME: &str = "gantry-rules";

/// Pinned source of the rule-authoring crate.
pub const RULES_CRATE_GIT: &str = "https://github.com/gantry-build/gantry-rules";
pub const RULES_CRATE_TAG: &str = "v0.1.8";

/// Overrides the rule-authoring crate with a local path.
pub const RULES_PATH_ENV: &str = "GANTRY_RULES_PATH";

/// Overrides the Cargo binary used to compile and run the driver.
pub const CARGO_ENV: &str = "GANTRY_CARGO";

/// Overrides the Ninja binary.
pub const NINJA_ENV: &str = "GANTRY_NINJA";
