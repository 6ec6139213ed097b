use julia_explorer::escape::{pixel_escape, shade_pixel};
use julia_explorer::KernelInputs;

const GRID: u32 = 9;

fn inputs(c: (f64, f64)) -> KernelInputs {
    KernelInputs {
        x_domain: (-1.5, 1.5),
        y_domain: (-1.5, 1.5),
        c,
        max_iterations: 64,
        iteration_color_cutoff: 100.0,
    }
}

#[test]
fn single_and_double_agree_within_one_iteration() {
    let parameters = [(0.5, 0.0), (-0.4, 0.6), (-1.0, 0.0)];

    for c in parameters {
        let inputs = inputs(c);
        for y in 0..GRID {
            for x in 0..GRID {
                let single = pixel_escape::<f32>((x, y), (GRID, GRID), &inputs);
                let double = pixel_escape::<f64>((x, y), (GRID, GRID), &inputs);
                match (single, double) {
                    (Some(a), Some(b)) => assert!(
                        a.abs_diff(b) <= 1,
                        "c={c:?} pixel=({x},{y}): single {a} vs double {b}"
                    ),
                    (None, None) => {}
                    (a, b) => panic!("c={c:?} pixel=({x},{y}): single {a:?} vs double {b:?}"),
                }
            }
        }
    }
}

#[test]
fn corner_pixel_maps_to_domain_minimum() {
    // Pixel (0, 0) starts at (-1.5, -1.5); with c = 0.5 that escapes on the
    // first step: |(-1.5-1.5i)^2 + 0.5| = |0.5 + 4.5i| > 1.366.
    let inputs = inputs((0.5, 0.0));
    assert_eq!(pixel_escape::<f64>((0, 0), (GRID, GRID), &inputs), Some(0));
    assert_eq!(shade_pixel::<f32>((0, 0), (GRID, GRID), &inputs), [0.0, 0.05, 0.2, 1.0]);
}

#[test]
fn centre_of_zero_parameter_never_escapes() {
    let inputs = inputs((0.0, 0.0));
    // Pixel 4 of 9 sits at -1.5 + 4/9 * 3 = -0.1666..., well inside |z| < 1.
    assert_eq!(shade_pixel::<f64>((4, 4), (GRID, GRID), &inputs), [0.0, 0.05, 0.2, 1.0]);
    assert_eq!(pixel_escape::<f32>((4, 4), (GRID, GRID), &inputs), None);
}
