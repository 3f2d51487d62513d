use kurbo::{BezPath, PathEl};

use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::ShorelineError;
use crate::foundation::opts::ShorelineOpts;
use crate::geometry::normalize::{NormalizeOpts, normalize_ring};
use crate::render::surface::Surface;
use crate::sequence::snapshot::Ring;

/// Paint style of the lake outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStyle {
    /// Outline color.
    pub stroke: Rgba8,
    /// Outline width in pixels; `0` disables the outline.
    pub stroke_width: f64,
    /// Interior color.
    pub fill: Rgba8,
    /// Color the surface is cleared to before painting.
    pub clear: Rgba8,
}

/// Why a frame was left blank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlankReason {
    /// The snapshot carried no polygon.
    NoPolygon,
    /// The polygon ring had no points.
    EmptyRing,
    /// The ring could not be fitted (zero extent or non-finite coordinates).
    Degenerate,
    /// The placement padding left no drawable area on the surface.
    NoRoom,
}

/// What one render call left on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A closed outline with this many vertices was painted.
    Drawn {
        /// Vertex count of the painted ring.
        points: usize,
    },
    /// The surface was cleared and nothing else drawn.
    Blank(BlankReason),
}

impl FrameOutcome {
    /// `true` when a polygon was painted.
    pub fn is_drawn(self) -> bool {
        matches!(self, Self::Drawn { .. })
    }
}

/// Clears the shared surface and paints one snapshot's polygon onto it.
#[derive(Clone, Debug)]
pub struct FrameRenderer {
    style: FrameStyle,
    placement: NormalizeOpts,
}

impl FrameRenderer {
    /// Renderer with an explicit style and placement.
    pub fn new(style: FrameStyle, placement: NormalizeOpts) -> Self {
        Self { style, placement }
    }

    /// Renderer configured from view options.
    pub fn from_opts(opts: &ShorelineOpts) -> Self {
        Self::new(
            FrameStyle {
                stroke: opts.stroke,
                stroke_width: opts.stroke_width,
                fill: opts.fill,
                clear: opts.clear,
            },
            NormalizeOpts {
                canvas: opts.canvas,
                padding: opts.padding,
                flip_y: opts.flip_y,
            },
        )
    }

    /// Clear `surface`, then fill and outline `polygon` if there is one.
    ///
    /// Missing, empty and degenerate polygons leave a blank frame; none of them is an error.
    pub fn render(&self, surface: &mut Surface, polygon: Option<&Ring>) -> FrameOutcome {
        let Some(ring) = polygon else {
            return self.blank(surface, BlankReason::NoPolygon);
        };
        if ring.is_empty() {
            return self.blank(surface, BlankReason::EmptyRing);
        }

        let placement = NormalizeOpts {
            canvas: surface.canvas(),
            ..self.placement
        };
        let points = match normalize_ring(ring, placement) {
            Ok(points) => points,
            Err(e @ ShorelineError::DegenerateGeometry(_)) => {
                tracing::debug!(error = %e, "skipping degenerate polygon");
                return self.blank(surface, BlankReason::Degenerate);
            }
            Err(e) => {
                tracing::warn!(error = %e, "polygon placement failed");
                return self.blank(surface, BlankReason::NoRoom);
            }
        };

        let path = bezpath_to_cpu(&closed_path(&points));
        let style = self.style;
        // `draw` rasterizes every pixel from a transparent start, so the clear color is the
        // first layer of the scene.
        surface.draw(|ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            if style.clear.a > 0 {
                ctx.set_paint(color_to_cpu(style.clear));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(placement.canvas.width),
                    f64::from(placement.canvas.height),
                ));
            }
            if style.stroke_width > 0.0 && style.stroke.a > 0 {
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(style.stroke_width));
                ctx.set_paint(color_to_cpu(style.stroke));
                ctx.stroke_path(&path);
            }
            if style.fill.a > 0 {
                ctx.set_paint(color_to_cpu(style.fill));
                ctx.fill_path(&path);
            }
        });

        FrameOutcome::Drawn {
            points: points.len(),
        }
    }

    fn blank(&self, surface: &mut Surface, reason: BlankReason) -> FrameOutcome {
        surface.clear(self.style.clear);
        FrameOutcome::Blank(reason)
    }
}

fn closed_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
