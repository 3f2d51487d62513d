use std::time::Duration;

use crate::foundation::error::ShorelineResult;
use crate::playback::mode::DisplayMode;
use crate::sequence::index::SequenceIndex;

/// Most ticks delivered by one [`PlaybackController::advance`] call. A stalled host drops the
/// backlog beyond this instead of replaying it frame by frame.
pub const MAX_CATCH_UP_TICKS: u32 = 32;

/// Fixed-period tick source driven by host-supplied elapsed time.
///
/// Elapsed time is accumulated and converted to whole periods; the remainder carries over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticker {
    period: Duration,
    carry: Duration,
}

impl Ticker {
    /// Ticker firing every `period`. A zero period is bumped to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            carry: Duration::ZERO,
        }
    }

    /// Tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Feed `elapsed` time and return how many ticks fired.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.carry = self.carry.saturating_add(elapsed);
        let whole = self.carry.as_nanos() / self.period.as_nanos();
        let whole = u32::try_from(whole).unwrap_or(u32::MAX);
        self.carry = self.carry.saturating_sub(self.period.saturating_mul(whole));
        whole
    }
}

/// Snapshot of the view's playback-related state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackState {
    /// Current position, `None` when the lake has no snapshots.
    pub position: Option<usize>,
    /// Active display mode.
    pub mode: DisplayMode,
    /// `true` while autoplay is running. Never true in heatmap mode.
    pub running: bool,
}

/// Result of a [`PlaybackController::play`] request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Autoplay started.
    Started,
    /// Autoplay was already running; no second ticker was created.
    AlreadyPlaying,
    /// Heatmap mode is active; autoplay stays off.
    BlockedByMode,
    /// There is nothing to play.
    NoData,
}

/// Stopped/Playing state machine owning the position and at most one ticker.
#[derive(Clone, Debug)]
pub struct PlaybackController {
    position: Option<usize>,
    period: Duration,
    ticker: Option<Ticker>,
}

impl PlaybackController {
    /// Stopped controller at position `0`, or with no position for an empty sequence.
    pub fn new(len: usize, period: Duration) -> Self {
        Self {
            position: (len > 0).then_some(0),
            period,
            ticker: None,
        }
    }

    /// Current position.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// `true` while a ticker is alive.
    pub fn is_playing(&self) -> bool {
        self.ticker.is_some()
    }

    /// Start autoplay. Only allowed in shape mode and with data; never stacks tickers.
    pub fn play(&mut self, mode: DisplayMode) -> PlayOutcome {
        if mode == DisplayMode::Heatmap {
            tracing::warn!("autoplay is disabled in heatmap mode");
            return PlayOutcome::BlockedByMode;
        }
        if self.position.is_none() {
            tracing::warn!("autoplay requested without snapshots");
            return PlayOutcome::NoData;
        }
        if self.ticker.is_some() {
            return PlayOutcome::AlreadyPlaying;
        }
        self.ticker = Some(Ticker::new(self.period));
        tracing::debug!(period_ms = self.period.as_millis() as u64, "autoplay started");
        PlayOutcome::Started
    }

    /// Stop autoplay. Returns `true` if it was running. No tick fires after this returns.
    pub fn pause(&mut self) -> bool {
        let was_playing = self.ticker.take().is_some();
        if was_playing {
            tracing::debug!(position = ?self.position, "autoplay stopped");
        }
        was_playing
    }

    /// Jump to `position`. Out-of-range positions are rejected and leave the state untouched.
    /// Autoplay, if running, continues from the new position.
    pub fn scrub(&mut self, seq: &SequenceIndex, position: usize) -> ShorelineResult<usize> {
        seq.at(position)?;
        self.position = Some(position);
        Ok(position)
    }

    /// Feed elapsed time. For every tick that fires the position moves to the next snapshot
    /// (wrapping to `0`) and `on_tick` sees the new position. Returns the number of ticks.
    pub fn advance(
        &mut self,
        seq: &SequenceIndex,
        elapsed: Duration,
        mut on_tick: impl FnMut(usize),
    ) -> ShorelineResult<u32> {
        let (Some(ticker), Some(mut position)) = (self.ticker.as_mut(), self.position) else {
            return Ok(0);
        };

        let fired = ticker.advance(elapsed);
        let ticks = fired.min(MAX_CATCH_UP_TICKS);
        if ticks < fired {
            tracing::debug!(fired, delivered = ticks, "dropping autoplay backlog");
        }

        for _ in 0..ticks {
            position = seq.next(position)?;
            self.position = Some(position);
            on_tick(position);
        }
        Ok(ticks)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/controller.rs"]
mod tests;
