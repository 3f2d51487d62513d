/// Sequence replay into a frame sink.
pub mod export;
/// Animated GIF sink.
pub mod gif;
/// Frame sink trait and in-memory implementation.
pub mod sink;
