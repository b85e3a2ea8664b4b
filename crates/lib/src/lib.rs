//! gantry-lib: the build-graph generation pipeline for gantry.
//!
//! Targets are declared in `BUILD.rs` files scattered across a multi-module
//! workspace. Per invocation the pipeline runs strictly top to bottom:
//! - `workspace`: discover the workspace root and all modules
//! - `label`: normalize CLI arguments into workspace-rooted labels
//! - `config`: derive the flag-set-specific build directory
//! - `stage`: copy definitions and rules into the staging tree, synthesize
//!   the driver sources
//! - `driver`: compile and run the driver to list targets/flags or emit the
//!   action graph
//! - `ninja`: hand the graph to the external incremental executor

pub mod config;
pub mod consts;
pub mod driver;
pub mod label;
pub mod ninja;
pub mod stage;
pub mod workspace;
