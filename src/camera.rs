use log::debug;

use crate::params::FractalParams;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Pointer drag in screen pixels.
    Pan { dx: f64, dy: f64 },
    /// Wheel delta in notches, positive narrows the domain.
    Zoom { wy: f64 },
}

/// Events collected during one frame, owned by the app.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Apply and clear every queued event. `width` is the device image
    /// width in pixels. Returns how many events changed the view.
    pub fn apply(&mut self, params: &mut FractalParams, width: u32) -> usize {
        let mut changed = 0;
        for event in self.events.drain(..) {
            if apply_event(params, event, width) {
                changed += 1;
            }
        }
        changed
    }
}

/// Fractal-space distance covered by one image pixel.
pub fn step_size(params: &FractalParams, width: u32) -> f64 {
    params.x_span() / width as f64
}

pub fn pan(params: &mut FractalParams, dx: f64, dy: f64, width: u32) {
    let step = step_size(params, width);
    params.x_bounds.0 -= dx * step;
    params.x_bounds.1 -= dx * step;
    params.y_center += dy * step;
}

/// Narrow (positive `wy`) or widen the real domain symmetrically.
///
/// Returns false and leaves the bounds alone when the result would break
/// `min < max`.
pub fn zoom(params: &mut FractalParams, wy: f64) -> bool {
    let delta = wy * (params.x_span() / 10.0);
    let min = params.x_bounds.0 + delta;
    let max = params.x_bounds.1 - delta;
    if !(min < max) || !min.is_finite() || !max.is_finite() {
        debug!("ignoring zoom by {wy}: would collapse domain to [{min}, {max}]");
        return false;
    }
    params.x_bounds = (min, max);
    true
}

pub fn apply_event(params: &mut FractalParams, event: InputEvent, width: u32) -> bool {
    match event {
        InputEvent::Pan { dx, dy } => {
            if width == 0 {
                return false;
            }
            pan(params, dx, dy, width);
            dx != 0.0 || dy != 0.0
        }
        InputEvent::Zoom { wy } => zoom(params, wy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> FractalParams {
        FractalParams {
            x_bounds: (-2.5, 2.5),
            y_center: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn zero_pan_is_identity() {
        let mut params = view();
        pan(&mut params, 0.0, 0.0, 1280);
        assert_eq!(params.x_bounds, (-2.5, 2.5));
        assert_eq!(params.y_center, 0.0);
    }

    #[test]
    fn pan_moves_by_image_pixels() {
        let mut params = view();
        // 5 units over 500 pixels: one pixel is 0.01.
        pan(&mut params, 10.0, -20.0, 500);
        assert!((params.x_bounds.0 + 2.6).abs() < 1e-12);
        assert!((params.x_bounds.1 - 2.4).abs() < 1e-12);
        assert!((params.y_center + 0.2).abs() < 1e-12);
        assert!((params.x_span() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn zoom_in_shrinks_symmetrically() {
        let mut params = view();
        assert!(zoom(&mut params, 1.0));
        assert!((params.x_span() - 4.0).abs() < 1e-12);
        assert!((params.x_bounds.0 + 2.0).abs() < 1e-12);
        assert!((params.x_bounds.1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zoom_out_widens() {
        let mut params = view();
        assert!(zoom(&mut params, -1.0));
        assert!((params.x_span() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn collapsing_zoom_is_rejected() {
        let mut params = view();
        assert!(!zoom(&mut params, 5.0));
        assert!(!zoom(&mut params, 7.5));
        assert_eq!(params.x_bounds, (-2.5, 2.5));
    }

    #[test]
    fn queue_drains_in_order() {
        let mut params = view();
        let mut queue = InputQueue::default();
        queue.push(InputEvent::Zoom { wy: 1.0 });
        queue.push(InputEvent::Pan { dx: 0.0, dy: 0.0 });
        queue.push(InputEvent::Pan { dx: 100.0, dy: 0.0 });

        let changed = queue.apply(&mut params, 400);

        assert_eq!(changed, 2);
        assert!(queue.is_empty());
        // Pan uses the post-zoom span: 4 units / 400 px * 100 px = 1.
        assert!((params.x_bounds.0 + 3.0).abs() < 1e-12);
        assert!((params.x_bounds.1 - 1.0).abs() < 1e-12);
    }
}
