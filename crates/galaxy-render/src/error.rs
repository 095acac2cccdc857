//! Renderer error taxonomy

use std::fmt;

use thiserror::Error;

/// Shader pipeline stage a compile error belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors that can occur while building or running the renderer
///
/// Everything except [`GalaxyError::ContextLost`] is an initialization
/// failure. Hosts are expected to log it and carry on without a background.
#[derive(Debug, Error)]
pub enum GalaxyError {
    #[error("No compatible graphics context: {0}")]
    UnsupportedSurface(String),

    #[error("Failed to compile {stage} shader:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("Failed to link shader program: {log}")]
    ShaderLink { log: String },

    #[error("Graphics context lost: {0}")]
    ContextLost(String),

    #[error("Frame scheduling failed: {0}")]
    Scheduler(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
