use eframe::glow::{self, HasContext};

use crate::error::{RenderError, Result};
use crate::program::{LinkedProgram, ShaderProgram};

const VERTEX_SHADER: &str = r#"
    #version 430 core

    layout (location = 0) in vec2 pos;
    layout (location = 1) in vec2 uv;

    out vec2 texCoord;

    void main()
    {
        texCoord = uv;
        gl_Position = vec4(pos, 0.0, 1.0);
    }
"#;

const FRAGMENT_SHADER: &str = r#"
    #version 430 core

    in vec2 texCoord;

    layout (binding = 0) uniform sampler2D fractal;

    out vec4 fragColor;

    void main()
    {
        fragColor = texture(fractal, texCoord);
    }
"#;

/// Triangle fan over clip space, `(x, y, u, v)` per vertex.
const QUAD: [f32; 16] = [
    -1.0, -1.0, 0.0, 0.0, //
    -1.0, 1.0, 0.0, 1.0, //
    1.0, 1.0, 1.0, 1.0, //
    1.0, -1.0, 1.0, 0.0,
];

const FLOATS_PER_VERTEX: i32 = 4;

pub struct DisplayPipeline {
    program: LinkedProgram,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
}

impl DisplayPipeline {
    pub fn new(gl: &glow::Context) -> Result<Self> {
        let program = ShaderProgram::new(gl)?.build(gl, |p| {
            p.attach_vertex_stage(gl, VERTEX_SHADER)?;
            p.attach_fragment_stage(gl, FRAGMENT_SHADER)
        })?;

        match unsafe { create_quad(gl) } {
            Ok((vao, vbo)) => Ok(Self { program, vao, vbo }),
            Err(e) => {
                program.destroy(gl);
                Err(e)
            }
        }
    }

    /// Draw `image` across the current viewport. Call only after the
    /// recompute that wrote `image` has issued its barrier.
    pub fn draw(&self, gl: &glow::Context, image: glow::Texture) {
        self.program.use_program(gl);
        unsafe {
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(image));
            gl.bind_vertex_array(Some(self.vao));

            gl.draw_arrays(glow::TRIANGLE_FAN, 0, 4);

            gl.bind_vertex_array(None);
            gl.bind_texture(glow::TEXTURE_2D, None);
            gl.use_program(None);
        }
    }

    pub fn destroy(self, gl: &glow::Context) {
        self.program.destroy(gl);
        unsafe {
            gl.delete_buffer(self.vbo);
            gl.delete_vertex_array(self.vao);
        }
    }
}

unsafe fn create_quad(gl: &glow::Context) -> Result<(glow::VertexArray, glow::Buffer)> {
    let vao = gl
        .create_vertex_array()
        .map_err(|e| RenderError::Resource(format!("Failed to create VAO: {e}")))?;
    let vbo = match gl.create_buffer() {
        Ok(vbo) => vbo,
        Err(e) => {
            gl.delete_vertex_array(vao);
            return Err(RenderError::Resource(format!("Failed to create VBO: {e}")));
        }
    };

    let bytes: Vec<u8> = QUAD.iter().flat_map(|v| v.to_ne_bytes()).collect();
    let stride = FLOATS_PER_VERTEX * std::mem::size_of::<f32>() as i32;

    gl.bind_vertex_array(Some(vao));
    gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
    gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &bytes, glow::STATIC_DRAW);

    gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, stride, 0);
    gl.enable_vertex_attrib_array(0);
    gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, stride, 2 * std::mem::size_of::<f32>() as i32);
    gl.enable_vertex_attrib_array(1);

    gl.bind_vertex_array(None);
    gl.bind_buffer(glow::ARRAY_BUFFER, None);

    Ok((vao, vbo))
}
