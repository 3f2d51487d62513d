use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{ShorelineError, ShorelineResult};
use crate::sequence::snapshot::Ring;

/// Placement options for [`normalize_ring`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizeOpts {
    /// Target canvas.
    pub canvas: Canvas,
    /// Uniform inset on every side, in pixels.
    pub padding: f64,
    /// Mirror vertically inside the fitted box (planar y-up data on a y-down canvas).
    pub flip_y: bool,
}

impl NormalizeOpts {
    /// Plain fit into `canvas` with no padding and no flip.
    pub fn fit(canvas: Canvas) -> Self {
        Self {
            canvas,
            padding: 0.0,
            flip_y: false,
        }
    }
}

/// Map a ring into canvas space, uniformly scaled and centered.
///
/// `scale = min(W / dx, H / dy)` over the ring's bounding box, then the scaled box is centered
/// on both axes. Output points keep input order.
///
/// Fails with [`ShorelineError::DegenerateGeometry`] for an empty ring, a ring with zero extent
/// on either axis, or non-finite coordinates, so callers never see NaN or infinite pixels.
pub fn normalize_ring(ring: &Ring, opts: NormalizeOpts) -> ShorelineResult<Vec<Point>> {
    let points = ring.points();
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(ShorelineError::degenerate("ring has non-finite coordinates"));
    }
    let bounds = ring
        .bounds()
        .ok_or_else(|| ShorelineError::degenerate("ring has no points"))?;

    let dx = bounds.width();
    let dy = bounds.height();
    if dx <= 0.0 || dy <= 0.0 {
        return Err(ShorelineError::degenerate(format!(
            "ring has zero extent ({dx} x {dy})"
        )));
    }

    let (cw, ch) = opts.canvas.size_f64();
    let pad = opts.padding.max(0.0);
    let w = cw - 2.0 * pad;
    let h = ch - 2.0 * pad;
    if w <= 0.0 || h <= 0.0 {
        return Err(ShorelineError::validation(
            "padding leaves no drawable area on the canvas",
        ));
    }

    let scale = (w / dx).min(h / dy);
    if !scale.is_finite() {
        return Err(ShorelineError::degenerate(format!(
            "ring extent {dx} x {dy} produces a non-finite scale"
        )));
    }
    let offset_x = pad + (w - dx * scale) / 2.0;
    let offset_y = pad + (h - dy * scale) / 2.0;

    Ok(points
        .iter()
        .map(|p| {
            let y = if opts.flip_y {
                bounds.y1 - p.y
            } else {
                p.y - bounds.y0
            };
            Point::new((p.x - bounds.x0) * scale + offset_x, y * scale + offset_y)
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/normalize.rs"]
mod tests;
