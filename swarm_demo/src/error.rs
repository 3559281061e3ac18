//! Demo errors

use std::num::ParseIntError;

use swarm_core::prelude::{ConfigError, RuntimeError};
use thiserror::Error;

/// Everything that can end the demo early
#[derive(Error, Debug)]
pub enum DemoError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Invalid frame count: {0}")]
    FrameCount(#[from] ParseIntError),
}
