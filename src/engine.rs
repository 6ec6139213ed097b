//! Per-frame escape-time recompute on the GPU.
//!
//! The engine owns the parameter model, both kernel variants and the single
//! output image. Every call to [`ComputeEngine::recompute`] reallocates the
//! image, dispatches one invocation per pixel and ends with a memory barrier,
//! so the image is complete before anything samples or rewrites it.

use std::ffi::{c_void, CStr};
use std::time::{Duration, Instant};

use eframe::glow::{self, HasContext};
use log::{debug, info, warn};

use crate::capabilities::WorkCapabilities;
use crate::error::{RenderError, Result};
use crate::escape::KernelInputs;
use crate::kernel::{bindings, kernel_source, Precision};
use crate::params::FractalParams;
use crate::program::{LinkedProgram, ShaderProgram};

/// Everything one dispatch needs, derived from the parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DispatchPlan {
    pub width: u32,
    pub height: u32,
    pub precision: Precision,
    pub inputs: KernelInputs,
}

impl DispatchPlan {
    pub fn from_params(params: &FractalParams) -> Result<Self> {
        params.validate()?;
        let (width, height) = params.image_size();
        Ok(Self {
            width,
            height,
            precision: params.precision(),
            inputs: KernelInputs {
                x_domain: params.x_bounds,
                y_domain: params.y_bounds(),
                c: params.resolved_c(),
                max_iterations: params.max_iterations,
                iteration_color_cutoff: params.iteration_color_cutoff,
            },
        })
    }

    /// One single-invocation work group per pixel.
    pub fn work_groups(&self) -> (u32, u32, u32) {
        (self.width, self.height, 1)
    }

    /// `(location, value)` for `xDomain`, `yDomain` and `c`, in the float
    /// type of the selected variant.
    pub fn vector_uniforms(&self) -> [(u32, VectorUniform); 3] {
        let value = |(x, y): (f64, f64)| match self.precision {
            Precision::Single => VectorUniform::Single(x as f32, y as f32),
            Precision::Double => VectorUniform::Double(x, y),
        };
        [
            (bindings::X_DOMAIN, value(self.inputs.x_domain)),
            (bindings::Y_DOMAIN, value(self.inputs.y_domain)),
            (bindings::C, value(self.inputs.c)),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VectorUniform {
    Single(f32, f32),
    Double(f64, f64),
}

type Uniform2dProc = unsafe extern "system" fn(location: i32, x: f64, y: f64);

/// `glUniform2d`, which glow does not wrap. Needed for the `dvec2` inputs of
/// the double kernel.
#[derive(Clone, Copy)]
pub struct Uniform2d(Uniform2dProc);

impl Uniform2d {
    pub fn load(get_proc_address: &dyn Fn(&CStr) -> *const c_void) -> Result<Self> {
        let ptr = get_proc_address(c"glUniform2d");
        if ptr.is_null() {
            return Err(RenderError::Resource("glUniform2d is not available".to_string()));
        }
        Ok(Self(unsafe { std::mem::transmute::<*const c_void, Uniform2dProc>(ptr) }))
    }

    /// Set a `dvec2` uniform of the current program.
    unsafe fn set(self, location: u32, x: f64, y: f64) {
        (self.0)(location as i32, x, y);
    }
}

struct KernelUniforms {
    vectors: [Option<glow::UniformLocation>; 3],
    max_iterations: Option<glow::UniformLocation>,
    iteration_color_cutoff: Option<glow::UniformLocation>,
}

struct ComputeKernel {
    program: LinkedProgram,
    uniforms: KernelUniforms,
    uniform_2d: Uniform2d,
}

impl ComputeKernel {
    fn build(gl: &glow::Context, precision: Precision, uniform_2d: Uniform2d) -> Result<Self> {
        let source = kernel_source(precision);
        let program = ShaderProgram::new(gl)
            .and_then(|program| program.build(gl, |p| p.attach_compute_stage(gl, &source)))
            .map_err(|e| RenderError::Kernel {
                precision,
                source: Box::new(e),
            })?;

        let uniforms = KernelUniforms {
            vectors: [
                program.uniform_location(gl, "xDomain"),
                program.uniform_location(gl, "yDomain"),
                program.uniform_location(gl, "c"),
            ],
            max_iterations: program.uniform_location(gl, "maxIterations"),
            iteration_color_cutoff: program.uniform_location(gl, "iterationColorCutoff"),
        };
        info!("built {precision} precision kernel");

        Ok(Self {
            program,
            uniforms,
            uniform_2d,
        })
    }

    /// Upload the kernel inputs. The program must be current.
    unsafe fn set_inputs(&self, gl: &glow::Context, plan: &DispatchPlan) {
        let u = &self.uniforms;
        for (slot, (location, value)) in plan.vector_uniforms().into_iter().enumerate() {
            match value {
                VectorUniform::Single(x, y) => gl.uniform_2_f32(u.vectors[slot].as_ref(), x, y),
                VectorUniform::Double(x, y) => self.uniform_2d.set(location, x, y),
            }
        }
        let max_iterations = i32::try_from(plan.inputs.max_iterations).unwrap_or(i32::MAX);
        gl.uniform_1_i32(u.max_iterations.as_ref(), max_iterations);
        gl.uniform_1_f32(u.iteration_color_cutoff.as_ref(), plan.inputs.iteration_color_cutoff);
    }
}

pub struct ComputeEngine {
    params: FractalParams,
    capabilities: WorkCapabilities,
    single: ComputeKernel,
    double: ComputeKernel,
    image: glow::Texture,
    image_size: (u32, u32),
    last_recompute: Duration,
}

impl ComputeEngine {
    /// Build both kernel variants and the output image. Any build failure is
    /// returned to the caller and nothing is retried.
    pub fn new(gl: &glow::Context, params: FractalParams, uniform_2d: Uniform2d) -> Result<Self> {
        let capabilities = WorkCapabilities::query(gl);

        let single = ComputeKernel::build(gl, Precision::Single, uniform_2d)?;
        let double = match ComputeKernel::build(gl, Precision::Double, uniform_2d) {
            Ok(kernel) => kernel,
            Err(e) => {
                single.program.destroy(gl);
                return Err(e);
            }
        };

        let image = match unsafe { create_image(gl) } {
            Ok(image) => image,
            Err(e) => {
                single.program.destroy(gl);
                double.program.destroy(gl);
                return Err(e);
            }
        };

        Ok(Self {
            params,
            capabilities,
            single,
            double,
            image,
            image_size: (0, 0),
            last_recompute: Duration::ZERO,
        })
    }

    /// Mutable view for the settings panel and camera.
    pub fn params_mut(&mut self) -> &mut FractalParams {
        &mut self.params
    }

    pub fn work_capabilities(&self) -> &WorkCapabilities {
        &self.capabilities
    }

    pub fn image(&self) -> glow::Texture {
        self.image
    }

    pub fn image_size(&self) -> (u32, u32) {
        self.image_size
    }

    /// Host time spent issuing the last recompute.
    pub fn last_recompute(&self) -> Duration {
        self.last_recompute
    }

    /// Recompute the whole image from the current parameters.
    ///
    /// Invalid parameters are rejected before any GL call. On return the
    /// dispatch has been issued and fenced by a barrier covering image
    /// stores and texture fetches.
    pub fn recompute(&mut self, gl: &glow::Context) -> Result<DispatchPlan> {
        let plan = DispatchPlan::from_params(&self.params)?;
        let width = i32::try_from(plan.width)
            .map_err(|_| RenderError::InvalidParameters(format!("width {} too large", plan.width)))?;
        let height = i32::try_from(plan.height)
            .map_err(|_| RenderError::InvalidParameters(format!("height {} too large", plan.height)))?;

        if !self.capabilities.fits_grid(plan.width, plan.height) {
            warn!(
                "dispatch {}x{} exceeds reported work group count {:?}",
                plan.width, plan.height, self.capabilities.max_work_group_count
            );
        }

        let start = Instant::now();
        let kernel = match plan.precision {
            Precision::Single => &self.single,
            Precision::Double => &self.double,
        };

        unsafe {
            allocate_image(gl, self.image, width, height);
            self.image_size = (plan.width, plan.height);

            kernel.program.use_program(gl);
            gl.bind_image_texture(
                bindings::OUTPUT_IMAGE_UNIT,
                Some(self.image),
                0,
                false,
                0,
                glow::WRITE_ONLY,
                glow::RGBA32F,
            );
            kernel.set_inputs(gl, &plan);

            let (x, y, z) = plan.work_groups();
            gl.dispatch_compute(x, y, z);
            gl.memory_barrier(glow::SHADER_IMAGE_ACCESS_BARRIER_BIT | glow::TEXTURE_FETCH_BARRIER_BIT);

            gl.use_program(None);
        }
        self.last_recompute = start.elapsed();

        debug!(
            "recomputed {}x{} with {} precision, c = {:?}",
            plan.width, plan.height, plan.precision, plan.inputs.c
        );
        Ok(plan)
    }

    pub fn destroy(self, gl: &glow::Context) {
        self.single.program.destroy(gl);
        self.double.program.destroy(gl);
        unsafe { gl.delete_texture(self.image) };
    }
}

unsafe fn create_image(gl: &glow::Context) -> Result<glow::Texture> {
    let texture = gl
        .create_texture()
        .map_err(|e| RenderError::Resource(format!("Failed to create texture: {e}")))?;

    gl.bind_texture(glow::TEXTURE_2D, Some(texture));
    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
    gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
    gl.bind_texture(glow::TEXTURE_2D, None);

    Ok(texture)
}

/// Respecify the image storage in place. Previous contents are discarded.
unsafe fn allocate_image(gl: &glow::Context, texture: glow::Texture, width: i32, height: i32) {
    gl.bind_texture(glow::TEXTURE_2D, Some(texture));
    gl.tex_image_2d(
        glow::TEXTURE_2D,
        0,
        glow::RGBA32F as i32,
        width,
        height,
        0,
        glow::RGBA,
        glow::FLOAT,
        glow::PixelUnpackData::Slice(None),
    );
    gl.bind_texture(glow::TEXTURE_2D, None);
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    static UPLOADS: Mutex<Vec<(i32, f64, f64)>> = Mutex::new(Vec::new());

    unsafe extern "system" fn record_upload(location: i32, x: f64, y: f64) {
        UPLOADS.lock().unwrap().push((location, x, y));
    }

    fn recording_loader(name: &CStr) -> *const c_void {
        assert_eq!(name, c"glUniform2d");
        let proc: Uniform2dProc = record_upload;
        proc as *const c_void
    }

    #[test]
    fn plan_follows_parameters() {
        let params = FractalParams {
            x_bounds: (-2.5, 2.5),
            y_center: 0.0,
            aspect_ratio: 9.0 / 16.0,
            texture_width: 1280,
            max_iterations: 300,
            iteration_color_cutoff: 50.0,
            c: (0.5, 0.0),
            double_precision: true,
            is_polar: true,
        };

        let plan = DispatchPlan::from_params(&params).unwrap();

        assert_eq!((plan.width, plan.height), (1280, 720));
        assert_eq!(plan.work_groups(), (1280, 720, 1));
        assert_eq!(plan.precision, Precision::Double);
        assert_eq!(plan.inputs.x_domain, (-2.5, 2.5));
        assert!((plan.inputs.y_domain.0 + 1.40625).abs() < 1e-12);
        assert!((plan.inputs.y_domain.1 - 1.40625).abs() < 1e-12);
        assert_eq!(plan.inputs.c, (0.5, 0.0));
        assert_eq!(plan.inputs.max_iterations, 300);
        assert_eq!(plan.inputs.iteration_color_cutoff, 50.0);
    }

    #[test]
    fn single_precision_by_default() {
        let plan = DispatchPlan::from_params(&FractalParams::default()).unwrap();
        assert_eq!(plan.precision, Precision::Single);
    }

    #[test]
    fn invalid_parameters_never_produce_a_plan() {
        let params = FractalParams {
            x_bounds: (2.0, -2.0),
            ..Default::default()
        };
        assert!(matches!(
            DispatchPlan::from_params(&params),
            Err(RenderError::InvalidParameters(_))
        ));

        let params = FractalParams {
            texture_width: 0,
            ..Default::default()
        };
        assert!(DispatchPlan::from_params(&params).is_err());
    }

    #[test]
    fn double_plan_uploads_unnarrowed_values() {
        let params = FractalParams {
            x_bounds: (-0.743_643_887_037_1, -0.743_643_887_037_0),
            y_center: 0.131_825_904_205_311,
            c: (-0.4, 0.6),
            double_precision: true,
            ..Default::default()
        };
        let plan = DispatchPlan::from_params(&params).unwrap();
        let uniform_2d = Uniform2d::load(&recording_loader).unwrap();

        for (location, value) in plan.vector_uniforms() {
            match value {
                VectorUniform::Double(x, y) => unsafe { uniform_2d.set(location, x, y) },
                VectorUniform::Single(..) => panic!("single value in a double plan"),
            }
        }

        let uploads = UPLOADS.lock().unwrap().clone();
        let (x_min, x_max) = params.x_bounds;
        let (y_min, y_max) = params.y_bounds();
        assert_eq!(
            uploads,
            vec![
                (bindings::X_DOMAIN as i32, x_min, x_max),
                (bindings::Y_DOMAIN as i32, y_min, y_max),
                (bindings::C as i32, -0.4, 0.6),
            ]
        );
        assert_ne!(x_min as f32 as f64, x_min);
    }

    #[test]
    fn single_plan_narrows_to_f32() {
        let plan = DispatchPlan::from_params(&FractalParams::default()).unwrap();
        let [(location, x_domain), _, (_, c)] = plan.vector_uniforms();
        assert_eq!(location, bindings::X_DOMAIN);
        assert_eq!(x_domain, VectorUniform::Single(-2.5, 2.5));
        assert_eq!(c, VectorUniform::Single(-0.4, 0.6));
    }

    #[test]
    fn missing_uniform_2d_is_a_resource_error() {
        let result = Uniform2d::load(&|_: &CStr| -> *const c_void { std::ptr::null() });
        assert!(matches!(result, Err(RenderError::Resource(_))));
    }
}
