use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use eframe::{egui, glow, App};
use log::{info, warn};

use crate::camera::{InputEvent, InputQueue};
use crate::config;
use crate::display::DisplayPipeline;
use crate::engine::{ComputeEngine, Uniform2d};
use crate::error::{RenderError, Result};
use crate::params::FractalParams;

/// GL objects shared with the paint callback.
struct GlResources {
    engine: ComputeEngine,
    display: DisplayPipeline,
}

impl GlResources {
    fn new(gl: &glow::Context, uniform_2d: Uniform2d) -> Result<Self> {
        let engine = ComputeEngine::new(gl, FractalParams::default(), uniform_2d)?;
        let display = match DisplayPipeline::new(gl) {
            Ok(display) => display,
            Err(e) => {
                engine.destroy(gl);
                return Err(e);
            }
        };
        Ok(Self { engine, display })
    }

    /// Recompute, then draw once the barrier has been issued.
    fn paint(&mut self, gl: &glow::Context) {
        match self.engine.recompute(gl) {
            Ok(_) => self.display.draw(gl, self.engine.image()),
            Err(e) => warn!("skipping frame: {e}"),
        }
    }

    fn destroy(self, gl: &glow::Context) {
        self.engine.destroy(gl);
        self.display.destroy(gl);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct JuliaApp {
    resources: Arc<Mutex<Option<GlResources>>>,
    input: InputQueue,
    background: [f32; 3],
    t_render: Arc<Mutex<Duration>>,
}

impl JuliaApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self> {
        let gl = cc
            .gl
            .as_ref()
            .ok_or_else(|| RenderError::Resource("GL context not available".to_string()))?;

        let get_proc_address = cc
            .get_proc_address
            .as_ref()
            .ok_or_else(|| RenderError::Resource("GL loader not available".to_string()))?;
        let uniform_2d = Uniform2d::load(&**get_proc_address)?;

        let resources = GlResources::new(gl, uniform_2d)?;
        info!("GL resources ready");

        Ok(Self {
            resources: Arc::new(Mutex::new(Some(resources))),
            input: InputQueue::default(),
            background: config::DEFAULT_BACKGROUND,
            t_render: Arc::new(Mutex::new(Duration::ZERO)),
        })
    }

    fn settings_window(&mut self, ctx: &egui::Context) {
        let render_time = *lock(&self.t_render);
        let mut resources = lock(&self.resources);
        let Some(resources) = resources.as_mut() else {
            return;
        };
        let capabilities = *resources.engine.work_capabilities();
        let image_size = resources.engine.image_size();
        let recompute_time = resources.engine.last_recompute();
        let params = resources.engine.params_mut();

        egui::Window::new("Settings")
            .default_pos(egui::pos2(16.0, 16.0))
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Background");
                    ui.color_edit_button_rgb(&mut self.background);
                });
                ui.separator();

                ui.add(
                    egui::Slider::new(&mut params.texture_width, config::TEXTURE_WIDTH_RANGE)
                        .text("Texture width"),
                );
                ui.add(
                    egui::Slider::new(&mut params.max_iterations, config::MAX_ITERATIONS_RANGE)
                        .text("Max iterations"),
                );
                ui.add(
                    egui::Slider::new(&mut params.iteration_color_cutoff, config::COLOR_CUTOFF_RANGE)
                        .text("Color cutoff"),
                );
                ui.checkbox(&mut params.double_precision, "Double precision");
                ui.separator();

                let mut polar = params.is_polar;
                if ui.checkbox(&mut polar, "Polar c").changed() {
                    params.set_polar(polar);
                }
                if params.is_polar {
                    ui.add(egui::Slider::new(&mut params.c.0, config::POLAR_RADIUS_RANGE).text("r"));
                    ui.add(egui::Slider::new(&mut params.c.1, config::POLAR_ANGLE_RANGE).text("phi"));
                } else {
                    ui.add(egui::Slider::new(&mut params.c.0, config::CARTESIAN_C_RANGE).text("re"));
                    ui.add(egui::Slider::new(&mut params.c.1, config::CARTESIAN_C_RANGE).text("im"));
                }
                ui.separator();

                ui.label(format!(
                    "x: [{:.6}, {:.6}]  y center: {:.6}",
                    params.x_bounds.0, params.x_bounds.1, params.y_center
                ));
                ui.label(format!("Image: {} x {}", image_size.0, image_size.1));
                ui.label(format!("Render time: {:.2} ms", render_time.as_secs_f64() * 1000.0));
                ui.label(format!("Recompute: {:.2} ms", recompute_time.as_secs_f64() * 1000.0));
                if ui.button("Reset View").clicked() {
                    params.reset_view();
                }

                egui::CollapsingHeader::new("Compute limits").show(ui, |ui| {
                    ui.label(format!("Work group count: {:?}", capabilities.max_work_group_count));
                    ui.label(format!("Work group size: {:?}", capabilities.max_work_group_size));
                    ui.label(format!(
                        "Invocations per group: {}",
                        capabilities.max_work_group_invocations
                    ));
                });
            });
    }

    /// Turn this frame's pointer, wheel and key input into camera events.
    fn collect_input(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let pixels_per_point = ctx.pixels_per_point() as f64;

        if response.dragged() {
            let drag = response.drag_delta();
            self.input.push(InputEvent::Pan {
                dx: drag.x as f64 * pixels_per_point,
                dy: drag.y as f64 * pixels_per_point,
            });
        }

        if response.hovered() {
            let line_scroll_speed = ctx.options(|o| o.line_scroll_speed);
            let wy = ctx.input(|i| wheel_notches(i, line_scroll_speed));
            if wy != 0.0 {
                self.input.push(InputEvent::Zoom { wy });
            }
        }

        if ctx.wants_keyboard_input() {
            return;
        }
        let step = config::KEY_PAN_PIXELS;
        ctx.input(|i| {
            if i.key_pressed(egui::Key::ArrowLeft) {
                self.input.push(InputEvent::Pan { dx: step, dy: 0.0 });
            }
            if i.key_pressed(egui::Key::ArrowRight) {
                self.input.push(InputEvent::Pan { dx: -step, dy: 0.0 });
            }
            if i.key_pressed(egui::Key::ArrowUp) {
                self.input.push(InputEvent::Pan { dx: 0.0, dy: -step });
            }
            if i.key_pressed(egui::Key::ArrowDown) {
                self.input.push(InputEvent::Pan { dx: 0.0, dy: step });
            }
        });
    }
}

/// Wheel movement this frame in notches. Line deltas are notches already;
/// point and page deltas are converted with egui's points-per-line.
fn wheel_notches(input: &egui::InputState, line_scroll_speed: f32) -> f64 {
    input
        .events
        .iter()
        .filter_map(|event| match event {
            egui::Event::MouseWheel { unit, delta, .. } => Some(match unit {
                egui::MouseWheelUnit::Line => delta.y,
                egui::MouseWheelUnit::Point => delta.y / line_scroll_speed,
                egui::MouseWheelUnit::Page => delta.y * input.screen_rect().height() / line_scroll_speed,
            }),
            _ => None,
        })
        .map(f64::from)
        .sum()
}

impl App for JuliaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::drag());
                self.collect_input(ctx, &response);

                if let Some(resources) = lock(&self.resources).as_mut() {
                    let params = resources.engine.params_mut();
                    if rect.width() > 0.0 {
                        params.aspect_ratio = (rect.height() / rect.width()) as f64;
                    }
                    let width = params.texture_width;
                    self.input.apply(params, width);
                }

                let resources = Arc::clone(&self.resources);
                let t_render = Arc::clone(&self.t_render);
                ui.painter().add(egui::PaintCallback {
                    rect,
                    callback: Arc::new(egui_glow::CallbackFn::new(move |_info, painter| {
                        let start = Instant::now();
                        if let Some(resources) = lock(&resources).as_mut() {
                            resources.paint(painter.gl());
                        }
                        *lock(&t_render) = start.elapsed();
                    })),
                });
            });

        self.settings_window(ctx);

        // The image is rebuilt every frame whether or not anything changed.
        ctx.request_repaint();
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        let [r, g, b] = self.background;
        [r, g, b, 1.0]
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let (Some(gl), Some(resources)) = (gl, lock(&self.resources).take()) {
            resources.destroy(gl);
        }
    }
}
