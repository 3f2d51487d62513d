//! Shoreline is a temporal playback engine for lake surface polygons.
//!
//! Given a date-ordered series of polygon snapshots for one lake, a [`LakeView`] keeps a
//! scrub/playback position, rasterizes the active polygon onto a fixed-size CPU surface, drives
//! a wrap-around autoplay loop, gates a heatmap display mode, and exports the remaining sequence
//! as an animated GIF.
//!
//! - Load snapshots through a [`SnapshotSource`] into a [`LakeView`]
//! - Drive time with [`LakeView::advance`] and heatmap completions with [`LakeView::pump_heatmap`]
//! - Export with [`LakeView::export_from`] into an [`ExportSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// GIF export and frame sinks.
pub mod encode;
/// Ring normalization into canvas space.
pub mod geometry;
/// Playback state machine and display-mode gate.
pub mod playback;
/// CPU surface and polygon frame renderer.
pub mod render;
/// Snapshot model and the date-ordered sequence index.
pub mod sequence;
/// Lake-detail view session tying the core together.
pub mod session;
/// Collaborator traits and file-system implementations.
pub mod source;

pub use crate::foundation::core::{Canvas, Point, Rect, Rgba8};
pub use crate::foundation::error::{ShorelineError, ShorelineResult};
pub use crate::foundation::opts::ShorelineOpts;

pub use crate::encode::export::{ExportReport, export_file_name, export_frames};
pub use crate::encode::gif::{GifSink, GifSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::geometry::normalize::{NormalizeOpts, normalize_ring};
pub use crate::playback::controller::{PlayOutcome, PlaybackController, PlaybackState, Ticker};
pub use crate::playback::mode::{
    DisplayMode, HeatmapAsset, HeatmapCompletion, HeatmapRange, HeatmapRequest, HeatmapStatus,
    ModeGate,
};
pub use crate::render::frame::{BlankReason, FrameOutcome, FrameRenderer, FrameStyle};
pub use crate::render::surface::{FrameRGBA, Surface};
pub use crate::sequence::index::{DuplicateDatePolicy, SequenceIndex};
pub use crate::sequence::snapshot::{Ring, Snapshot, SnapshotEnvelope, parse_date};
pub use crate::session::lake_view::LakeView;
pub use crate::source::{
    DirExportSink, DirHeatmapSource, ExportSink, HeatmapSource, JsonSnapshotSource,
    MemoryExportSink, SnapshotSource,
};
