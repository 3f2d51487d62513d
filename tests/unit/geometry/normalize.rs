use super::*;

const EPS: f64 = 1e-9;

fn canvas() -> Canvas {
    Canvas::new(540, 360).unwrap()
}

fn assert_close(a: &[Point], b: &[Point]) {
    assert_eq!(a.len(), b.len());
    for (p, q) in a.iter().zip(b) {
        assert!(
            (p.x - q.x).abs() < 1e-6 && (p.y - q.y).abs() < 1e-6,
            "{p:?} != {q:?}"
        );
    }
}

#[test]
fn wide_ring_fills_width_and_centers_vertically() {
    // 10 x 2 box -> scale = min(54, 180) = 54, height 108, offset_y = (360 - 108) / 2.
    let ring = Ring::from_pairs(&[[0.0, 0.0], [10.0, 0.0], [10.0, 2.0], [0.0, 2.0]]);
    let out = normalize_ring(&ring, NormalizeOpts::fit(canvas())).unwrap();
    assert_close(
        &out,
        &[
            Point::new(0.0, 126.0),
            Point::new(540.0, 126.0),
            Point::new(540.0, 234.0),
            Point::new(0.0, 234.0),
        ],
    );
}

#[test]
fn tall_ring_fills_height_and_centers_horizontally() {
    let ring = Ring::from_pairs(&[[5.0, 5.0], [6.0, 5.0], [6.0, 9.0]]);
    let out = normalize_ring(&ring, NormalizeOpts::fit(canvas())).unwrap();
    // scale = min(540, 90) = 90, width 90, offset_x = 225.
    assert_close(
        &out,
        &[
            Point::new(225.0, 0.0),
            Point::new(315.0, 0.0),
            Point::new(315.0, 360.0),
        ],
    );
}

#[test]
fn normalizing_twice_is_stable() {
    let ring = Ring::from_pairs(&[
        [12.5, 40.0],
        [300.0, 10.0],
        [410.0, 200.0],
        [90.0, 330.0],
    ]);
    let opts = NormalizeOpts::fit(canvas());
    let once = normalize_ring(&ring, opts).unwrap();
    let twice = normalize_ring(&Ring::new(once.clone()), opts).unwrap();
    assert_close(&once, &twice);
}

#[test]
fn degenerate_rings_never_produce_nan() {
    let opts = NormalizeOpts::fit(canvas());
    let vertical = Ring::from_pairs(&[[3.0, 0.0], [3.0, 5.0], [3.0, 9.0]]);
    let horizontal = Ring::from_pairs(&[[0.0, 1.0], [5.0, 1.0]]);
    let single = Ring::from_pairs(&[[7.0, 7.0]]);
    let non_finite = Ring::from_pairs(&[[0.0, 0.0], [f64::NAN, 1.0], [2.0, 2.0]]);
    for ring in [vertical, horizontal, single, non_finite, Ring::default()] {
        assert!(matches!(
            normalize_ring(&ring, opts),
            Err(ShorelineError::DegenerateGeometry(_))
        ));
    }
}

#[test]
fn padding_insets_the_fitted_box() {
    let ring = Ring::from_pairs(&[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
    let opts = NormalizeOpts {
        padding: 30.0,
        ..NormalizeOpts::fit(canvas())
    };
    let out = normalize_ring(&ring, opts).unwrap();
    // Drawable 480 x 300 -> scale 300, x offset 30 + 90.
    assert!((out[0].x - 120.0).abs() < EPS);
    assert!((out[0].y - 30.0).abs() < EPS);
    assert!((out[2].x - 420.0).abs() < EPS);
    assert!((out[2].y - 330.0).abs() < EPS);
}

#[test]
fn flip_y_mirrors_inside_the_box() {
    let ring = Ring::from_pairs(&[[0.0, 0.0], [1.0, 1.0]]);
    let opts = NormalizeOpts {
        flip_y: true,
        ..NormalizeOpts::fit(Canvas::new(100, 100).unwrap())
    };
    let out = normalize_ring(&ring, opts).unwrap();
    assert_close(&out, &[Point::new(0.0, 100.0), Point::new(100.0, 0.0)]);
}
