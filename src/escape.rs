use num_traits::Float;

use crate::kernel::BACKGROUND_COLOR;

/// Uniform values handed to the kernel, before narrowing to the variant's
/// float type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelInputs {
    pub x_domain: (f64, f64),
    pub y_domain: (f64, f64),
    pub c: (f64, f64),
    pub max_iterations: u32,
    pub iteration_color_cutoff: f32,
}

fn lift<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

/// Radius past which every orbit of `z ← z² + c` diverges.
pub fn escape_threshold<T: Float>(c: (T, T)) -> T {
    let half = lift::<T>(0.5);
    let four = lift::<T>(4.0);
    half * ((four * length(c) + T::one()).sqrt() + T::one())
}

/// Linear map of pixel `coord` within `extent` onto `domain`.
pub fn map_to_domain<T: Float>(coord: u32, extent: u32, domain: (T, T)) -> T {
    let t = lift::<T>(coord as f64) / lift::<T>(extent as f64);
    t * (domain.1 - domain.0) + domain.0
}

/// Zero-based iteration at which the orbit of `z` left the threshold.
pub fn escape_iteration<T: Float>(mut z: (T, T), c: (T, T), max_iterations: u32) -> Option<u32> {
    let threshold = escape_threshold(c);
    let two = lift::<T>(2.0);
    for i in 0..max_iterations {
        z = (z.0 * z.0 - z.1 * z.1 + c.0, two * z.0 * z.1 + c.1);
        if length(z) > threshold {
            return Some(i);
        }
    }
    None
}

pub fn escape_color(escape: Option<u32>, iteration_color_cutoff: f32) -> [f32; 4] {
    match escape {
        Some(i) => {
            let [_, g, b, a] = BACKGROUND_COLOR;
            [i as f32 / iteration_color_cutoff, g, b, a]
        }
        None => BACKGROUND_COLOR,
    }
}

/// Escape iteration for one pixel, evaluated in `T`.
pub fn pixel_escape<T: Float>(
    coord: (u32, u32),
    extent: (u32, u32),
    inputs: &KernelInputs,
) -> Option<u32> {
    let x_domain = (lift::<T>(inputs.x_domain.0), lift::<T>(inputs.x_domain.1));
    let y_domain = (lift::<T>(inputs.y_domain.0), lift::<T>(inputs.y_domain.1));
    let c = (lift::<T>(inputs.c.0), lift::<T>(inputs.c.1));
    let z = (
        map_to_domain(coord.0, extent.0, x_domain),
        map_to_domain(coord.1, extent.1, y_domain),
    );
    escape_iteration(z, c, inputs.max_iterations)
}

/// Colour the kernel stores for one pixel.
pub fn shade_pixel<T: Float>(coord: (u32, u32), extent: (u32, u32), inputs: &KernelInputs) -> [f32; 4] {
    escape_color(
        pixel_escape::<T>(coord, extent, inputs),
        inputs.iteration_color_cutoff,
    )
}

fn length<T: Float>(v: (T, T)) -> T {
    (v.0 * v.0 + v.1 * v.1).sqrt()
}
