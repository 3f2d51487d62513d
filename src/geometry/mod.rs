/// Aspect-preserving fit of a ring into a pixel canvas.
pub mod normalize;
