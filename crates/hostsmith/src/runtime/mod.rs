//! Runtime module — process lifecycle: logging, config boot, CLI run.

pub mod boot;
pub mod cli;
