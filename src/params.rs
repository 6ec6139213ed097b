use std::f64::consts::TAU;

use crate::config;
use crate::error::{RenderError, Result};
use crate::kernel::Precision;

/// Everything the kernel needs to know about the current view.
///
/// `c` holds `(re, im)` when `is_polar` is false and `(r, phi)` when it is
/// true. Use [`FractalParams::set_polar`] to switch representations without
/// changing the parameter the kernel sees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalParams {
    pub x_bounds: (f64, f64),
    pub y_center: f64,
    /// Viewport height divided by width, refreshed every frame.
    pub aspect_ratio: f64,
    pub texture_width: u32,
    pub max_iterations: u32,
    pub iteration_color_cutoff: f32,
    pub c: (f64, f64),
    pub double_precision: bool,
    pub is_polar: bool,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            x_bounds: config::DEFAULT_X_BOUNDS,
            y_center: config::DEFAULT_Y_CENTER,
            aspect_ratio: config::WINDOW_SIZE.1 as f64 / config::WINDOW_SIZE.0 as f64,
            texture_width: config::DEFAULT_TEXTURE_WIDTH,
            max_iterations: config::DEFAULT_MAX_ITERATIONS,
            iteration_color_cutoff: config::DEFAULT_COLOR_CUTOFF,
            c: config::DEFAULT_C,
            double_precision: false,
            is_polar: false,
        }
    }
}

impl FractalParams {
    pub fn x_span(&self) -> f64 {
        self.x_bounds.1 - self.x_bounds.0
    }

    /// Imaginary-axis bounds derived from the real span and aspect ratio.
    pub fn y_bounds(&self) -> (f64, f64) {
        let half = self.x_span() * self.aspect_ratio / 2.0;
        (self.y_center - half, self.y_center + half)
    }

    /// Output image size in pixels. Height is truncated.
    pub fn image_size(&self) -> (u32, u32) {
        let height = (self.texture_width as f64 * self.aspect_ratio) as u32;
        (self.texture_width, height)
    }

    /// `c` in Cartesian form, whichever representation is stored.
    pub fn resolved_c(&self) -> (f64, f64) {
        if self.is_polar {
            polar_to_cartesian(self.c.0, self.c.1)
        } else {
            self.c
        }
    }

    pub fn precision(&self) -> Precision {
        if self.double_precision {
            Precision::Double
        } else {
            Precision::Single
        }
    }

    /// Switch the representation of `c`, converting the stored value so the
    /// resolved parameter stays the same.
    pub fn set_polar(&mut self, polar: bool) {
        if polar == self.is_polar {
            return;
        }
        self.c = if polar {
            cartesian_to_polar(self.c.0, self.c.1)
        } else {
            polar_to_cartesian(self.c.0, self.c.1)
        };
        self.is_polar = polar;
    }

    /// Restore the default domain, keeping kernel settings.
    pub fn reset_view(&mut self) {
        self.x_bounds = config::DEFAULT_X_BOUNDS;
        self.y_center = config::DEFAULT_Y_CENTER;
    }

    /// Reject states that must never reach the kernel.
    pub fn validate(&self) -> Result<()> {
        let (min, max) = self.x_bounds;
        if !(min.is_finite() && max.is_finite() && self.y_center.is_finite()) {
            return Err(RenderError::InvalidParameters(format!(
                "non-finite domain: x=[{min}, {max}], y center {}",
                self.y_center
            )));
        }
        if min >= max {
            return Err(RenderError::InvalidParameters(format!(
                "x bounds must satisfy min < max, got [{min}, {max}]"
            )));
        }
        if self.texture_width == 0 {
            return Err(RenderError::InvalidParameters(
                "texture width must be positive".to_string(),
            ));
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(RenderError::InvalidParameters(format!(
                "aspect ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        if self.image_size().1 == 0 {
            return Err(RenderError::InvalidParameters(format!(
                "image height rounds to zero for width {} and aspect {}",
                self.texture_width, self.aspect_ratio
            )));
        }
        if !(self.iteration_color_cutoff.is_finite() && self.iteration_color_cutoff > 0.0) {
            return Err(RenderError::InvalidParameters(format!(
                "iteration color cutoff must be positive, got {}",
                self.iteration_color_cutoff
            )));
        }
        if !(self.c.0.is_finite() && self.c.1.is_finite()) {
            return Err(RenderError::InvalidParameters(format!(
                "non-finite c: ({}, {})",
                self.c.0, self.c.1
            )));
        }
        Ok(())
    }
}

pub fn polar_to_cartesian(r: f64, phi: f64) -> (f64, f64) {
    (r * phi.cos(), r * phi.sin())
}

/// Angle normalised to `[0, 2π)` to match the UI slider.
pub fn cartesian_to_polar(re: f64, im: f64) -> (f64, f64) {
    let phi = im.atan2(re).rem_euclid(TAU);
    (re.hypot(im), phi)
}
