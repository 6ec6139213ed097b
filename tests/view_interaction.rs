use julia_explorer::camera::{pan, zoom};
use julia_explorer::{
    DispatchPlan, FractalParams, InputEvent, InputQueue, Precision, RenderError, VectorUniform,
};

fn widescreen() -> FractalParams {
    FractalParams {
        x_bounds: (-2.5, 2.5),
        y_center: 0.0,
        aspect_ratio: 9.0 / 16.0,
        texture_width: 1280,
        ..Default::default()
    }
}

#[test]
fn plan_tracks_camera_moves() {
    let mut params = widescreen();
    let mut queue = InputQueue::default();
    queue.push(InputEvent::Zoom { wy: 1.0 });
    queue.push(InputEvent::Pan { dx: -128.0, dy: 64.0 });
    let width = params.texture_width;
    queue.apply(&mut params, width);

    let plan = DispatchPlan::from_params(&params).unwrap();

    // Span 4 over 1280 px: 128 px is 0.4 units.
    assert!((plan.inputs.x_domain.0 + 1.6).abs() < 1e-9);
    assert!((plan.inputs.x_domain.1 - 2.4).abs() < 1e-9);
    let y_center = (plan.inputs.y_domain.0 + plan.inputs.y_domain.1) / 2.0;
    assert!((y_center - 0.2).abs() < 1e-9);
    assert!((plan.inputs.y_domain.1 - plan.inputs.y_domain.0 - 2.25).abs() < 1e-9);
}

#[test]
fn zero_pan_leaves_view_unchanged() {
    let mut params = widescreen();
    let before = params;
    pan(&mut params, 0.0, 0.0, 1280);
    assert_eq!(params, before);
}

#[test]
fn repeated_zoom_never_inverts_bounds() {
    let mut params = widescreen();
    for _ in 0..200 {
        zoom(&mut params, 3.0);
        assert!(params.x_bounds.0 < params.x_bounds.1);
    }
    assert!(params.validate().is_ok());
}

#[test]
fn precision_toggle_selects_variant() {
    let mut params = widescreen();
    assert_eq!(DispatchPlan::from_params(&params).unwrap().precision, Precision::Single);
    params.double_precision = true;
    assert_eq!(DispatchPlan::from_params(&params).unwrap().precision, Precision::Double);
}

#[test]
fn degenerate_view_is_rejected_before_dispatch() {
    let mut params = widescreen();
    params.x_bounds = (0.25, 0.25);
    let err = DispatchPlan::from_params(&params).unwrap_err();
    assert!(matches!(err, RenderError::InvalidParameters(_)));
    assert!(err.to_string().contains("min < max"));
}

#[test]
fn deep_zoom_domain_survives_only_in_double() {
    // Narrower than one f32 ulp at 1.0.
    let mut params = FractalParams {
        x_bounds: (1.0, 1.0 + 1e-9),
        ..widescreen()
    };

    let plan = DispatchPlan::from_params(&params).unwrap();
    assert_eq!(plan.vector_uniforms()[0].1, VectorUniform::Single(1.0, 1.0));

    params.double_precision = true;
    let plan = DispatchPlan::from_params(&params).unwrap();
    let [(_, x_domain), (_, y_domain), (_, c)] = plan.vector_uniforms();
    assert_eq!(x_domain, VectorUniform::Double(1.0, 1.0 + 1e-9));
    let (y_min, y_max) = params.y_bounds();
    assert_eq!(y_domain, VectorUniform::Double(y_min, y_max));
    assert!(y_min < y_max);
    assert_eq!(c, VectorUniform::Double(params.c.0, params.c.1));
}
