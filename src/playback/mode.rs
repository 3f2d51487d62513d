use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::foundation::error::ShorelineResult;
use crate::foundation::opts::ShorelineOpts;

/// What the lake panel shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Rasterized polygon of the current snapshot.
    #[default]
    Shape,
    /// Remote change heatmap for the current date range.
    Heatmap,
}

impl DisplayMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Shape => Self::Heatmap,
            Self::Heatmap => Self::Shape,
        }
    }
}

/// Date range a heatmap is requested for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct HeatmapRange {
    /// Selected date, capped at the cutoff.
    pub start: NaiveDate,
    /// Fixed upper bound.
    pub end: NaiveDate,
}

impl HeatmapRange {
    /// Range for `selected`: the start is `selected` unless it lies after `cutoff`.
    pub fn for_date(selected: NaiveDate, cutoff: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: selected.min(cutoff),
            end,
        }
    }
}

/// A fetch the host must perform and report back through [`ModeGate::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeatmapRequest {
    /// Identifies this request; only the latest ticket is accepted.
    pub ticket: u64,
    /// Lake the heatmap is for.
    pub lake_id: String,
    /// Requested date range.
    pub range: HeatmapRange,
}

/// Heatmap display status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum HeatmapStatus {
    /// Nothing requested yet, or the last request was abandoned.
    #[default]
    Idle,
    /// A request is in flight; show a placeholder.
    Loading,
    /// The latest request succeeded.
    Ready,
    /// The latest request failed or timed out. Any earlier asset is still available.
    Error(String),
}

/// A fetched heatmap image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeatmapAsset {
    /// Range the image was fetched for.
    pub range: HeatmapRange,
    /// Encoded image bytes, opaque to this crate.
    pub bytes: Vec<u8>,
}

/// How a completion was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeatmapCompletion {
    /// The asset is now displayed.
    Applied,
    /// The fetch failed; status is `Error`, the previous asset stays.
    Failed,
    /// The result belonged to a superseded request or arrived outside heatmap mode; dropped.
    Stale,
}

#[derive(Clone, Copy, Debug)]
struct InFlight {
    ticket: u64,
    range: HeatmapRange,
    issued_at: Instant,
}

/// Shape/heatmap switch and the bookkeeping for heatmap fetches.
///
/// The gate never performs I/O. It hands out [`HeatmapRequest`]s and validates completions
/// against the latest ticket, so a slow response can never overwrite a newer selection.
#[derive(Clone, Debug)]
pub struct ModeGate {
    lake_id: String,
    mode: DisplayMode,
    cutoff: NaiveDate,
    end: NaiveDate,
    timeout: Duration,
    next_ticket: u64,
    in_flight: Option<InFlight>,
    status: HeatmapStatus,
    asset: Option<HeatmapAsset>,
}

impl ModeGate {
    /// Gate in shape mode for `lake_id`.
    pub fn new(lake_id: impl Into<String>, opts: &ShorelineOpts) -> Self {
        Self {
            lake_id: lake_id.into(),
            mode: DisplayMode::Shape,
            cutoff: opts.heatmap_cutoff,
            end: opts.heatmap_end,
            timeout: opts.heatmap_timeout(),
            next_ticket: 1,
            in_flight: None,
            status: HeatmapStatus::Idle,
            asset: None,
        }
    }

    /// Active mode.
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Current heatmap status.
    pub fn status(&self) -> &HeatmapStatus {
        &self.status
    }

    /// Most recent successfully fetched heatmap.
    pub fn asset(&self) -> Option<&HeatmapAsset> {
        self.asset.as_ref()
    }

    /// Ticket of the request currently in flight.
    pub fn pending_ticket(&self) -> Option<u64> {
        self.in_flight.map(|f| f.ticket)
    }

    /// Range a heatmap for `selected` would be requested with.
    pub fn range_for(&self, selected: NaiveDate) -> HeatmapRange {
        HeatmapRange::for_date(selected, self.cutoff, self.end)
    }

    /// Switch mode. Entering heatmap mode returns the fetch to perform for `selected`.
    /// Leaving it abandons any request in flight.
    pub fn set_mode(
        &mut self,
        mode: DisplayMode,
        selected: Option<NaiveDate>,
        now: Instant,
    ) -> Option<HeatmapRequest> {
        if mode == self.mode {
            return None;
        }
        self.mode = mode;
        tracing::debug!(?mode, lake = %self.lake_id, "display mode changed");
        match mode {
            DisplayMode::Heatmap => self.request(selected, now),
            DisplayMode::Shape => {
                if let Some(f) = self.in_flight.take() {
                    tracing::debug!(ticket = f.ticket, "abandoning heatmap request");
                }
                if self.status == HeatmapStatus::Loading {
                    self.status = HeatmapStatus::Idle;
                }
                None
            }
        }
    }

    /// The selected date moved. In heatmap mode this supersedes any request in flight.
    pub fn position_changed(
        &mut self,
        selected: Option<NaiveDate>,
        now: Instant,
    ) -> Option<HeatmapRequest> {
        match self.mode {
            DisplayMode::Heatmap => self.request(selected, now),
            DisplayMode::Shape => None,
        }
    }

    /// Report the outcome of the request with `ticket`.
    pub fn complete(&mut self, ticket: u64, result: ShorelineResult<Vec<u8>>) -> HeatmapCompletion {
        let current = match self.in_flight {
            Some(f) if f.ticket == ticket && self.mode == DisplayMode::Heatmap => f,
            _ => {
                tracing::debug!(ticket, "discarding stale heatmap result");
                return HeatmapCompletion::Stale;
            }
        };
        self.in_flight = None;

        match result {
            Ok(bytes) => {
                tracing::debug!(ticket, bytes = bytes.len(), "heatmap ready");
                self.asset = Some(HeatmapAsset {
                    range: current.range,
                    bytes,
                });
                self.status = HeatmapStatus::Ready;
                HeatmapCompletion::Applied
            }
            Err(e) => {
                tracing::warn!(ticket, error = %e, "heatmap fetch failed");
                self.status = HeatmapStatus::Error(e.to_string());
                HeatmapCompletion::Failed
            }
        }
    }

    /// Fail the in-flight request if it has outlived the timeout. Returns `true` if it did.
    pub fn expire(&mut self, now: Instant) -> bool {
        let Some(f) = self.in_flight else {
            return false;
        };
        if now.saturating_duration_since(f.issued_at) < self.timeout {
            return false;
        }
        self.in_flight = None;
        tracing::warn!(ticket = f.ticket, "heatmap fetch timed out");
        self.status = HeatmapStatus::Error(format!(
            "heatmap fetch timed out after {} ms",
            self.timeout.as_millis()
        ));
        true
    }

    fn request(&mut self, selected: Option<NaiveDate>, now: Instant) -> Option<HeatmapRequest> {
        let Some(selected) = selected else {
            self.in_flight = None;
            self.status = HeatmapStatus::Error("no snapshot selected".to_owned());
            return None;
        };
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let range = self.range_for(selected);
        self.in_flight = Some(InFlight {
            ticket,
            range,
            issued_at: now,
        });
        self.status = HeatmapStatus::Loading;
        Some(HeatmapRequest {
            ticket,
            lake_id: self.lake_id.clone(),
            range,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/mode.rs"]
mod tests;
