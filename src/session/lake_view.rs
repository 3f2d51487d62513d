use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::encode::export::{ExportReport, export_file_name, export_frames};
use crate::encode::gif::{GifSink, GifSinkOpts};
use crate::encode::sink::SinkConfig;
use crate::foundation::error::{ShorelineError, ShorelineResult};
use crate::foundation::opts::ShorelineOpts;
use crate::playback::controller::{PlayOutcome, PlaybackController, PlaybackState};
use crate::playback::mode::{DisplayMode, HeatmapAsset, HeatmapRequest, HeatmapStatus, ModeGate};
use crate::render::frame::{FrameOutcome, FrameRenderer};
use crate::render::surface::Surface;
use crate::sequence::index::SequenceIndex;
use crate::sequence::snapshot::Snapshot;
use crate::source::{ExportSink, HeatmapSource, SnapshotSource};

type HeatmapMsg = (u64, ShorelineResult<Vec<u8>>);

enum HeatmapCommand {
    Fetch(HeatmapRequest),
    Shutdown,
}

/// The view's single heatmap fetch thread and its two channels.
struct HeatmapWorker {
    tx: mpsc::Sender<HeatmapCommand>,
    results: mpsc::Receiver<HeatmapMsg>,
    handle: Option<thread::JoinHandle<()>>,
}

impl HeatmapWorker {
    fn spawn(source: Box<dyn HeatmapSource>) -> ShorelineResult<Self> {
        let (tx, commands) = mpsc::channel::<HeatmapCommand>();
        let (results_tx, results) = mpsc::channel::<HeatmapMsg>();
        let handle = thread::Builder::new()
            .name("shoreline-heatmap".into())
            .spawn(move || run_heatmap_worker(&*source, &commands, &results_tx))
            .map_err(|e| {
                ShorelineError::fetch(format!("failed to spawn heatmap worker thread: {e}"))
            })?;
        Ok(Self {
            tx,
            results,
            handle: Some(handle),
        })
    }
}

impl Drop for HeatmapWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(HeatmapCommand::Shutdown);
        // A fetch still in flight is not waited for; the thread exits once it returns.
        if let Some(handle) = self.handle.take()
            && handle.is_finished()
            && handle.join().is_err()
        {
            tracing::warn!("heatmap worker thread panicked");
        }
    }
}

fn run_heatmap_worker(
    source: &dyn HeatmapSource,
    commands: &mpsc::Receiver<HeatmapCommand>,
    results: &mpsc::Sender<HeatmapMsg>,
) {
    while let Ok(HeatmapCommand::Fetch(mut req)) = commands.recv() {
        // Only the newest queued request can still be accepted by the view.
        loop {
            match commands.try_recv() {
                Ok(HeatmapCommand::Fetch(newer)) => {
                    tracing::trace!(skipped = req.ticket, "superseded heatmap request skipped");
                    req = newer;
                }
                Ok(HeatmapCommand::Shutdown) => return,
                Err(_) => break,
            }
        }
        let result = source.fetch_heatmap(&req.lake_id, req.range);
        if results.send((req.ticket, result)).is_err() {
            return;
        }
    }
}

/// One lake's detail view: the sequence, the drawing surface, playback and the display mode.
///
/// Every mutation goes through `&mut self`, so renders triggered by scrub, autoplay ticks, mode
/// exit and export can never interleave. Time is supplied by the host via [`LakeView::advance`];
/// heatmap results arrive on a channel and are applied by [`LakeView::pump_heatmap`].
pub struct LakeView {
    lake_id: String,
    opts: ShorelineOpts,
    seq: SequenceIndex,
    surface: Surface,
    renderer: FrameRenderer,
    playback: PlaybackController,
    gate: ModeGate,
    heatmap: Option<HeatmapWorker>,
    frame: Option<FrameOutcome>,
}

impl LakeView {
    /// Build a view over `snapshots` (any order) and render the first one.
    pub fn new(
        lake_id: impl Into<String>,
        snapshots: Vec<Snapshot>,
        opts: ShorelineOpts,
    ) -> ShorelineResult<Self> {
        opts.validate()?;
        let lake_id = lake_id.into();
        let seq = SequenceIndex::new(snapshots, opts.duplicate_policy);
        let mut view = Self {
            surface: Surface::new(opts.canvas)?,
            renderer: FrameRenderer::from_opts(&opts),
            playback: PlaybackController::new(seq.len(), opts.tick_period()),
            gate: ModeGate::new(lake_id.clone(), &opts),
            heatmap: None,
            frame: None,
            lake_id,
            opts,
            seq,
        };
        view.render_current();
        if view.seq.is_empty() {
            tracing::warn!(lake = %view.lake_id, "lake has no snapshots");
        }
        Ok(view)
    }

    /// Fetch the snapshots of `lake_id` from `source` and build a view over them.
    #[tracing::instrument(skip(source, opts))]
    pub fn load(
        lake_id: &str,
        source: &dyn SnapshotSource,
        opts: ShorelineOpts,
    ) -> ShorelineResult<Self> {
        let snapshots = source.fetch_snapshots(lake_id)?;
        let view = Self::new(lake_id, snapshots, opts)?;
        tracing::info!(
            snapshots = view.seq.len(),
            span = ?view.seq.date_span(),
            "lake loaded"
        );
        Ok(view)
    }

    /// Attach the source heatmap requests are sent to. Without one, entering heatmap mode
    /// reports a fetch error.
    ///
    /// Fetches run one at a time on a dedicated worker thread. Requests queued behind a slow
    /// fetch are coalesced to the newest one.
    pub fn with_heatmap_source(
        mut self,
        source: impl HeatmapSource + 'static,
    ) -> ShorelineResult<Self> {
        self.heatmap = Some(HeatmapWorker::spawn(Box::new(source))?);
        Ok(self)
    }

    /// Lake this view shows.
    pub fn lake_id(&self) -> &str {
        &self.lake_id
    }

    /// Options the view was built with.
    pub fn opts(&self) -> &ShorelineOpts {
        &self.opts
    }

    /// Date-ordered snapshots.
    pub fn sequence(&self) -> &SequenceIndex {
        &self.seq
    }

    /// Position, mode and whether autoplay runs.
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            position: self.playback.position(),
            mode: self.gate.mode(),
            running: self.playback.is_playing(),
        }
    }

    /// Current position, `None` for an empty lake.
    pub fn position(&self) -> Option<usize> {
        self.playback.position()
    }

    /// Active display mode.
    pub fn mode(&self) -> DisplayMode {
        self.gate.mode()
    }

    /// `true` while autoplay runs.
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    /// Snapshot at the current position.
    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.playback
            .position()
            .and_then(|p| self.seq.at(p).ok())
    }

    /// Outcome of the most recent render, `None` when there is nothing to show.
    pub fn frame(&self) -> Option<FrameOutcome> {
        self.frame
    }

    /// Drawing surface holding the last rendered frame.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Heatmap fetch status.
    pub fn heatmap_status(&self) -> &HeatmapStatus {
        self.gate.status()
    }

    /// Latest successfully fetched heatmap; kept through later failures.
    pub fn heatmap_asset(&self) -> Option<&HeatmapAsset> {
        self.gate.asset()
    }

    /// Move to `position` and render it. Autoplay keeps running from there; in heatmap mode a
    /// fetch for the new date is issued.
    pub fn scrub(&mut self, position: usize) -> ShorelineResult<FrameOutcome> {
        self.playback.scrub(&self.seq, position)?;
        let outcome = self.render_current();
        let req = self
            .gate
            .position_changed(self.selected_date(), Instant::now());
        self.dispatch(req);
        tracing::debug!(position, ?outcome, "scrubbed");
        Ok(outcome)
    }

    /// Scrub to the snapshot dated `date`, or to the nearest earlier one when there is no
    /// exact match. Returns the position moved to.
    pub fn scrub_to_date(&mut self, date: NaiveDate) -> ShorelineResult<usize> {
        let position = match self.seq.index_of_date(date) {
            Ok(p) => p,
            Err(ShorelineError::NotFound(_)) => self.seq.nearest_index(date).ok_or_else(|| {
                ShorelineError::not_found(format!("no snapshots to match {date}"))
            })?,
            Err(e) => return Err(e),
        };
        self.scrub(position)?;
        Ok(position)
    }

    /// Start autoplay.
    pub fn play(&mut self) -> PlayOutcome {
        self.playback.play(self.gate.mode())
    }

    /// Stop autoplay. Returns `true` if it was running.
    pub fn pause(&mut self) -> bool {
        self.playback.pause()
    }

    /// Play/pause button: pause when running, otherwise try to start. Returns whether autoplay
    /// runs afterwards.
    pub fn toggle_play(&mut self) -> bool {
        if self.playback.is_playing() {
            self.playback.pause();
            false
        } else {
            self.play() == PlayOutcome::Started
        }
    }

    /// Switch display mode.
    ///
    /// Entering heatmap mode stops autoplay in the same call and requests a heatmap for the
    /// current date. Returning to shape mode re-renders the current polygon.
    pub fn set_mode(&mut self, mode: DisplayMode) {
        let previous = self.gate.mode();
        if mode == previous {
            return;
        }
        if mode == DisplayMode::Heatmap {
            self.playback.pause();
        }
        let req = self
            .gate
            .set_mode(mode, self.selected_date(), Instant::now());
        if mode == DisplayMode::Shape {
            self.render_current();
        }
        self.dispatch(req);
    }

    /// Flip between shape and heatmap mode.
    pub fn toggle_mode(&mut self) -> DisplayMode {
        let next = self.gate.mode().toggled();
        self.set_mode(next);
        next
    }

    /// Feed elapsed wall time to autoplay. Every tick moves to the next snapshot (wrapping)
    /// and renders it. Returns the number of ticks that fired.
    pub fn advance(&mut self, elapsed: Duration) -> ShorelineResult<u32> {
        let seq = &self.seq;
        let renderer = &self.renderer;
        let surface = &mut self.surface;
        let frame = &mut self.frame;
        self.playback.advance(seq, elapsed, |position| {
            let polygon = seq.at(position).ok().and_then(|s| s.polygon.as_ref());
            *frame = Some(renderer.render(surface, polygon));
        })
    }

    /// Apply heatmap results that have arrived and time out an overdue request.
    /// Returns how many results were received.
    pub fn pump_heatmap(&mut self) -> usize {
        let mut received = 0;
        if let Some(worker) = &self.heatmap {
            while let Ok((ticket, result)) = worker.results.try_recv() {
                received += 1;
                self.gate.complete(ticket, result);
            }
        }
        self.gate.expire(Instant::now());
        received
    }

    /// Block until the pending heatmap request settles or `timeout` passes.
    pub fn wait_heatmap(&mut self, timeout: Duration) -> &HeatmapStatus {
        let deadline = Instant::now() + timeout;
        while self.gate.pending_ticket().is_some() {
            let now = Instant::now();
            if self.gate.expire(now) || now >= deadline {
                break;
            }
            let Some(worker) = &self.heatmap else {
                break;
            };
            match worker.results.recv_timeout(deadline.saturating_duration_since(now)) {
                Ok((ticket, result)) => {
                    self.gate.complete(ticket, result);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        self.gate.status()
    }

    /// Encode the snapshots from `position` to the end as an animated GIF and hand it to
    /// `sink`. The current position is rendered again afterwards.
    ///
    /// Nothing reaches `sink` unless every frame encoded within the export timeout.
    #[tracing::instrument(skip(self, sink), fields(lake = %self.lake_id))]
    pub fn export_from(
        &mut self,
        position: usize,
        sink: &mut dyn ExportSink,
    ) -> ShorelineResult<ExportReport> {
        let start_date = self
            .seq
            .iter_from(position)
            .first()
            .map(|s| s.date)
            .ok_or_else(|| ShorelineError::empty_range(position, self.seq.len()))?;

        let canvas = self.surface.canvas();
        let cfg = SinkConfig {
            width: canvas.width,
            height: canvas.height,
            frame_delay: self.opts.frame_delay(),
        };
        let mut gif = GifSink::new(GifSinkOpts::from_opts(&self.opts));
        let deadline = Instant::now().checked_add(self.opts.export_timeout());

        let encoded = export_frames(
            &self.seq,
            position,
            &self.renderer,
            &mut self.surface,
            &mut gif,
            cfg,
            deadline,
        );
        self.render_current();
        let frames = encoded.inspect_err(|e| tracing::warn!(error = %e, "export failed"))?;

        let bytes = gif.into_bytes()?;
        let file_name = export_file_name(&self.lake_id, start_date);
        sink.deliver(&file_name, &bytes)?;
        tracing::info!(file = %file_name, frames, bytes = bytes.len(), "export delivered");

        Ok(ExportReport {
            file_name,
            frames,
            bytes: bytes.len(),
            start_date,
        })
    }

    fn selected_date(&self) -> Option<NaiveDate> {
        self.current_snapshot().map(|s| s.date)
    }

    fn render_current(&mut self) -> FrameOutcome {
        let polygon = self
            .playback
            .position()
            .and_then(|p| self.seq.at(p).ok())
            .and_then(|s| s.polygon.as_ref());
        let outcome = self.renderer.render(&mut self.surface, polygon);
        self.frame = self.playback.position().map(|_| outcome);
        outcome
    }

    fn dispatch(&mut self, req: Option<HeatmapRequest>) {
        let Some(req) = req else {
            return;
        };
        let ticket = req.ticket;
        let Some(worker) = &self.heatmap else {
            self.gate.complete(
                ticket,
                Err(ShorelineError::fetch("no heatmap source configured")),
            );
            return;
        };

        tracing::debug!(
            ticket,
            start = %req.range.start,
            end = %req.range.end,
            "heatmap requested"
        );
        if worker.tx.send(HeatmapCommand::Fetch(req)).is_err() {
            self.gate.complete(
                ticket,
                Err(ShorelineError::fetch("heatmap worker has stopped")),
            );
        }
    }
}

impl std::fmt::Debug for LakeView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LakeView")
            .field("lake_id", &self.lake_id)
            .field("snapshots", &self.seq.len())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/lake_view.rs"]
mod tests;
