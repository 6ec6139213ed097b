use std::fmt;

use thiserror::Error;

use crate::kernel::Precision;

/// Pipeline stage a shader source was compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    pub(crate) fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => eframe::glow::VERTEX_SHADER,
            ShaderStage::Fragment => eframe::glow::FRAGMENT_SHADER,
            ShaderStage::Compute => eframe::glow::COMPUTE_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Compute => "compute",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to compile {stage} shader\n{log}")]
    Compilation { stage: ShaderStage, log: String },

    #[error("Failed to link shader program\n{log}")]
    Link { log: String },

    /// A compute kernel variant failed to build.
    #[error("{precision} precision kernel: {source}")]
    Kernel {
        precision: Precision,
        #[source]
        source: Box<RenderError>,
    },

    #[error("GL resource allocation failed: {0}")]
    Resource(String),

    #[error("Invalid fractal parameters: {0}")]
    InvalidParameters(String),
}

impl RenderError {
    /// Stage that failed to compile, looking through a kernel wrapper.
    pub fn failed_stage(&self) -> Option<ShaderStage> {
        match self {
            RenderError::Compilation { stage, .. } => Some(*stage),
            RenderError::Kernel { source, .. } => source.failed_stage(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
