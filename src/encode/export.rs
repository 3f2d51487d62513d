use std::time::Instant;

use chrono::NaiveDate;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{ShorelineError, ShorelineResult};
use crate::render::frame::FrameRenderer;
use crate::render::surface::Surface;
use crate::sequence::index::SequenceIndex;

/// What a finished export delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportReport {
    /// File name handed to the export sink.
    pub file_name: String,
    /// Number of encoded frames.
    pub frames: usize,
    /// Size of the encoded asset in bytes.
    pub bytes: usize,
    /// Date of the first exported snapshot.
    pub start_date: NaiveDate,
}

/// Deterministic download name for an export of `lake_id` starting at `start`.
pub fn export_file_name(lake_id: &str, start: NaiveDate) -> String {
    format!("{lake_id}_polygons_{}_to_end.gif", start.format("%Y-%m-%d"))
}

/// Replay the snapshots from `from` to the end through `renderer` into `sink`.
///
/// Each snapshot is rendered onto the shared `surface` and the resulting pixels are pushed in
/// order. `deadline` is checked before every frame and once more before `sink.end()`, so time
/// spent encoding inside `push_frame` counts against it. An error or a passed deadline stops
/// the run before `end`, and the sink never finalizes a partial animation.
///
/// Returns the number of frames pushed.
pub fn export_frames(
    seq: &SequenceIndex,
    from: usize,
    renderer: &FrameRenderer,
    surface: &mut Surface,
    sink: &mut dyn FrameSink,
    cfg: SinkConfig,
    deadline: Option<Instant>,
) -> ShorelineResult<usize> {
    let snapshots = seq.iter_from(from);
    if snapshots.is_empty() {
        return Err(ShorelineError::empty_range(from, seq.len()));
    }

    let canvas = surface.canvas();
    if cfg.width != canvas.width || cfg.height != canvas.height {
        return Err(ShorelineError::encode(format!(
            "sink size {}x{} does not match surface {}x{}",
            cfg.width, cfg.height, canvas.width, canvas.height
        )));
    }

    let total = snapshots.len();
    let check_deadline = |done: usize| match deadline {
        Some(deadline) if Instant::now() >= deadline => Err(ShorelineError::encode(format!(
            "export timed out after {done} of {total} frames"
        ))),
        _ => Ok(()),
    };

    sink.begin(cfg)?;
    for (offset, snap) in snapshots.iter().enumerate() {
        check_deadline(offset)?;
        let position = from + offset;
        let outcome = renderer.render(surface, snap.polygon.as_ref());
        tracing::trace!(position, date = %snap.date, ?outcome, "export frame rendered");
        sink.push_frame(position, &surface.snapshot())?;
    }
    check_deadline(total)?;
    sink.end()?;

    Ok(total)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/export.rs"]
mod tests;
