//! Compute kernel generation for both precision variants.
//!
//! There is one kernel template. The precision tag supplies the scalar and
//! vector type names, so the single and double variants differ only in
//! those tokens and cannot drift apart.

use std::fmt;

/// Binding points shared by every kernel variant.
pub mod bindings {
    pub const OUTPUT_IMAGE_UNIT: u32 = 0;
    pub const X_DOMAIN: u32 = 1;
    pub const Y_DOMAIN: u32 = 2;
    pub const C: u32 = 3;
    pub const MAX_ITERATIONS: u32 = 4;
    pub const ITERATION_COLOR_CUTOFF: u32 = 5;
}

/// Colour written for pixels that never escape.
pub const BACKGROUND_COLOR: [f32; 4] = [0.0, 0.05, 0.2, 1.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Precision {
    Single,
    Double,
}

impl Precision {
    pub const ALL: [Precision; 2] = [Precision::Single, Precision::Double];

    pub fn scalar_type(self) -> &'static str {
        match self {
            Precision::Single => "float",
            Precision::Double => "double",
        }
    }

    pub fn vector_type(self) -> &'static str {
        match self {
            Precision::Single => "vec2",
            Precision::Double => "dvec2",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Precision::Single => "single",
            Precision::Double => "double",
        };
        f.write_str(name)
    }
}

/// Emits the escape-time compute kernel for one precision.
#[derive(Clone, Copy, Debug)]
pub struct KernelBuilder {
    precision: Precision,
}

impl KernelBuilder {
    pub fn new(precision: Precision) -> Self {
        Self { precision }
    }

    pub fn build(&self) -> String {
        let mut src = String::new();
        src.push_str(&self.header());
        src.push_str(&self.interface());
        src.push_str(&self.helpers());
        src.push_str(&self.entry_point());
        src
    }

    fn header(&self) -> String {
        "#version 430 core\n\
         layout(local_size_x = 1, local_size_y = 1, local_size_z = 1) in;\n\n"
            .to_string()
    }

    fn interface(&self) -> String {
        let [r, g, b, a] = BACKGROUND_COLOR;
        format!(
            "layout(rgba32f, binding = {unit}) uniform writeonly image2D outImage;\n\
             \n\
             layout(location = {x}) uniform {v} xDomain;\n\
             layout(location = {y}) uniform {v} yDomain;\n\
             layout(location = {c}) uniform {v} c;\n\
             layout(location = {iter}) uniform int maxIterations;\n\
             layout(location = {cutoff}) uniform float iterationColorCutoff;\n\
             \n\
             const vec4 BACKGROUND = vec4({r:?}, {g:?}, {b:?}, {a:?});\n\n",
            unit = bindings::OUTPUT_IMAGE_UNIT,
            x = bindings::X_DOMAIN,
            y = bindings::Y_DOMAIN,
            c = bindings::C,
            iter = bindings::MAX_ITERATIONS,
            cutoff = bindings::ITERATION_COLOR_CUTOFF,
            v = self.precision.vector_type(),
        )
    }

    fn helpers(&self) -> String {
        format!(
            "{s} mapToDomain({s} t, {v} domain)\n\
             {{\n\
             \x20   return t * (domain.y - domain.x) + domain.x;\n\
             }}\n\
             \n\
             {v} complexSquare({v} z)\n\
             {{\n\
             \x20   return {v}(z.x * z.x - z.y * z.y, 2.0 * z.x * z.y);\n\
             }}\n\n",
            s = self.precision.scalar_type(),
            v = self.precision.vector_type(),
        )
    }

    fn entry_point(&self) -> String {
        format!(
            "void main()\n\
             {{\n\
             \x20   ivec2 coord = ivec2(gl_GlobalInvocationID.xy);\n\
             \x20   ivec2 extent = imageSize(outImage);\n\
             \x20   if (coord.x >= extent.x || coord.y >= extent.y)\n\
             \x20       return;\n\
             \n\
             \x20   {v} z = {v}(\n\
             \x20       mapToDomain({s}(coord.x) / {s}(extent.x), xDomain),\n\
             \x20       mapToDomain({s}(coord.y) / {s}(extent.y), yDomain));\n\
             \x20   {s} threshold = 0.5 * (sqrt(4.0 * length(c) + 1.0) + 1.0);\n\
             \n\
             \x20   vec4 color = BACKGROUND;\n\
             \x20   for (int i = 0; i < maxIterations; i++)\n\
             \x20   {{\n\
             \x20       z = complexSquare(z) + c;\n\
             \x20       if (length(z) > threshold)\n\
             \x20       {{\n\
             \x20           color = vec4(float(i) / iterationColorCutoff, BACKGROUND.gba);\n\
             \x20           break;\n\
             \x20       }}\n\
             \x20   }}\n\
             \n\
             \x20   imageStore(outImage, coord, color);\n\
             }}\n",
            s = self.precision.scalar_type(),
            v = self.precision.vector_type(),
        )
    }
}

/// Kernel source for `precision`.
pub fn kernel_source(precision: Precision) -> String {
    KernelBuilder::new(precision).build()
}
