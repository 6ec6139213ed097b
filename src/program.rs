use eframe::glow::{self, HasContext};
use log::{debug, error};

use crate::error::{RenderError, Result, ShaderStage};

/// A program under construction. Stages are compiled as they are attached.
pub struct ShaderProgram {
    program: glow::Program,
    stages: Vec<glow::Shader>,
}

impl ShaderProgram {
    pub fn new(gl: &glow::Context) -> Result<Self> {
        let program = unsafe { gl.create_program() }
            .map_err(|e| RenderError::Resource(format!("Failed to create program: {e}")))?;
        Ok(Self {
            program,
            stages: Vec::with_capacity(3),
        })
    }

    pub fn attach_vertex_stage(&mut self, gl: &glow::Context, source: &str) -> Result<()> {
        self.attach_stage(gl, ShaderStage::Vertex, source)
    }

    pub fn attach_fragment_stage(&mut self, gl: &glow::Context, source: &str) -> Result<()> {
        self.attach_stage(gl, ShaderStage::Fragment, source)
    }

    pub fn attach_compute_stage(&mut self, gl: &glow::Context, source: &str) -> Result<()> {
        self.attach_stage(gl, ShaderStage::Compute, source)
    }

    /// Compile `source` and attach it. A failed stage is deleted and leaves
    /// the previously attached stages untouched.
    fn attach_stage(&mut self, gl: &glow::Context, stage: ShaderStage, source: &str) -> Result<()> {
        unsafe {
            let shader = gl
                .create_shader(stage.gl_enum())
                .map_err(|e| RenderError::Resource(format!("Failed to create {stage} shader: {e}")))?;

            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                return Err(RenderError::Compilation { stage, log });
            }

            gl.attach_shader(self.program, shader);
            self.stages.push(shader);
        }
        debug!("attached {stage} stage to program {:?}", self.program);
        Ok(())
    }

    /// Link every attached stage into an executable program. Stage handles
    /// are released whether or not linking succeeds.
    pub fn link(mut self, gl: &glow::Context) -> Result<LinkedProgram> {
        unsafe {
            gl.link_program(self.program);
            let linked = gl.get_program_link_status(self.program);
            let log = if linked {
                String::new()
            } else {
                gl.get_program_info_log(self.program)
            };

            self.release_stages(gl);

            if !linked {
                gl.delete_program(self.program);
                return Err(RenderError::Link { log });
            }
        }
        Ok(LinkedProgram {
            program: self.program,
        })
    }

    /// Run `attach`, then link. On any failure the program and its stages
    /// are deleted and the error is logged.
    pub fn build(
        mut self,
        gl: &glow::Context,
        attach: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<LinkedProgram> {
        if let Err(e) = attach(&mut self) {
            error!("{e}");
            self.discard(gl);
            return Err(e);
        }
        self.link(gl).inspect_err(|e| error!("{e}"))
    }

    /// Delete the program and any attached stages without linking.
    pub fn discard(mut self, gl: &glow::Context) {
        unsafe {
            self.release_stages(gl);
            gl.delete_program(self.program);
        }
    }

    unsafe fn release_stages(&mut self, gl: &glow::Context) {
        for shader in self.stages.drain(..) {
            gl.detach_shader(self.program, shader);
            gl.delete_shader(shader);
        }
    }
}

/// A linked, immutable program.
#[derive(Debug)]
pub struct LinkedProgram {
    program: glow::Program,
}

impl LinkedProgram {
    /// Make this program the target of subsequent draws and dispatches.
    pub fn use_program(&self, gl: &glow::Context) {
        unsafe { gl.use_program(Some(self.program)) };
    }

    pub fn uniform_location(&self, gl: &glow::Context, name: &str) -> Option<glow::UniformLocation> {
        unsafe { gl.get_uniform_location(self.program, name) }
    }

    pub fn destroy(self, gl: &glow::Context) {
        unsafe { gl.delete_program(self.program) };
    }
}
