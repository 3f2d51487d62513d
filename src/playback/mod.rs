/// Stopped/Playing state machine with an owned tick source.
pub mod controller;
/// Shape/heatmap display mode and heatmap request tracking.
pub mod mode;
