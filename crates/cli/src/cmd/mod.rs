mod build;
mod complete;

pub use build::cmd_build;
pub use complete::cmd_complete;
