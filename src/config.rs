use std::f64::consts::TAU;
use std::ops::RangeInclusive;

use eframe::egui;

pub const WINDOW_TITLE: &str = "Julia Explorer";

/// Initial and minimum window size in logical pixels.
pub const WINDOW_SIZE: (f32, f32) = (1280.0, 720.0);

/// Clear colour painted behind the canvas and settings panel.
pub const DEFAULT_BACKGROUND: [f32; 3] = [0.1, 0.01, 0.19];

pub const DEFAULT_X_BOUNDS: (f64, f64) = (-2.5, 2.5);
pub const DEFAULT_Y_CENTER: f64 = 0.0;
pub const DEFAULT_TEXTURE_WIDTH: u32 = 1280;
pub const DEFAULT_MAX_ITERATIONS: u32 = 200;
pub const DEFAULT_COLOR_CUTOFF: f32 = 100.0;
pub const DEFAULT_C: (f64, f64) = (-0.4, 0.6);

pub const TEXTURE_WIDTH_RANGE: RangeInclusive<u32> = 480..=2560;
pub const MAX_ITERATIONS_RANGE: RangeInclusive<u32> = 10..=1000;
pub const COLOR_CUTOFF_RANGE: RangeInclusive<f32> = 10.0..=1000.0;
pub const CARTESIAN_C_RANGE: RangeInclusive<f64> = -1.5..=1.5;
pub const POLAR_RADIUS_RANGE: RangeInclusive<f64> = 0.0..=2.0;
pub const POLAR_ANGLE_RANGE: RangeInclusive<f64> = 0.0..=TAU;

/// Screen pixels panned per arrow key press.
pub const KEY_PAN_PIXELS: f64 = 40.0;

pub fn native_options() -> eframe::NativeOptions {
    let size = egui::vec2(WINDOW_SIZE.0, WINDOW_SIZE.1);
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(size)
            .with_min_inner_size(size)
            .with_title(WINDOW_TITLE),
        vsync: true,
        depth_buffer: 0,
        stencil_buffer: 0,
        renderer: eframe::Renderer::Glow,
        ..Default::default()
    }
}
