/// Polygon frame renderer.
pub mod frame;
/// Fixed-size CPU drawing surface.
pub mod surface;
