pub mod app;
pub mod camera;
pub mod capabilities;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod escape;
pub mod kernel;
pub mod params;
pub mod program;

pub use app::JuliaApp;
pub use camera::{InputEvent, InputQueue};
pub use capabilities::WorkCapabilities;
pub use engine::{ComputeEngine, DispatchPlan, Uniform2d, VectorUniform};
pub use error::{RenderError, Result, ShaderStage};
pub use escape::KernelInputs;
pub use kernel::{kernel_source, KernelBuilder, Precision};
pub use params::FractalParams;
