use std::time::Duration;

use chrono::NaiveDate;

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{ShorelineError, ShorelineResult};
use crate::sequence::index::DuplicateDatePolicy;

/// Configuration for one lake view.
///
/// All fields have defaults matching the dashboard this engine was built for (540x360 canvas,
/// 50 ms autoplay, 100 ms GIF frames). Load from JSON with serde, then optionally apply
/// `SHORELINE_*` environment overrides via [`ShorelineOpts::with_env_overrides`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShorelineOpts {
    /// Drawing surface size.
    pub canvas: Canvas,
    /// Uniform inset (pixels) applied before fitting a ring into the canvas.
    pub padding: f64,
    /// Flip the Y axis so larger y values render higher on the canvas.
    pub flip_y: bool,
    /// Outline color of the lake shape.
    pub stroke: Rgba8,
    /// Outline width in pixels.
    pub stroke_width: f64,
    /// Fill color of the lake shape.
    pub fill: Rgba8,
    /// Color the surface is cleared to before each frame.
    pub clear: Rgba8,
    /// Autoplay tick period in milliseconds.
    pub tick_ms: u64,
    /// Delay between exported GIF frames in milliseconds.
    pub frame_delay_ms: u32,
    /// GIF quantizer speed, 1 (best) to 30 (fastest).
    pub gif_speed: i32,
    /// Color transparent pixels are flattened over in GIF output.
    pub export_background: Rgba8,
    /// Latest allowed start date of a heatmap request.
    pub heatmap_cutoff: NaiveDate,
    /// Fixed end date of every heatmap request.
    pub heatmap_end: NaiveDate,
    /// Heatmap requests older than this become a recoverable timeout error.
    pub heatmap_timeout_ms: u64,
    /// Upper bound on one export run.
    pub export_timeout_ms: u64,
    /// Which record survives when two snapshots share a date.
    pub duplicate_policy: DuplicateDatePolicy,
}

impl Default for ShorelineOpts {
    fn default() -> Self {
        let accent = Rgba8::opaque(0x34, 0x98, 0xdb);
        Self {
            canvas: Canvas::default(),
            padding: 0.0,
            flip_y: false,
            stroke: accent,
            stroke_width: 2.0,
            fill: accent.with_alpha(0.5),
            clear: Rgba8::transparent(),
            tick_ms: 50,
            frame_delay_ms: 100,
            gif_speed: 10,
            export_background: Rgba8::opaque(255, 255, 255),
            heatmap_cutoff: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap_or_default(),
            heatmap_end: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap_or_default(),
            heatmap_timeout_ms: 15_000,
            export_timeout_ms: 60_000,
            duplicate_policy: DuplicateDatePolicy::default(),
        }
    }
}

impl ShorelineOpts {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> ShorelineResult<()> {
        self.canvas.validate()?;
        if self.tick_ms == 0 {
            return Err(ShorelineError::validation("tick_ms must be non-zero"));
        }
        if self.frame_delay_ms == 0 {
            return Err(ShorelineError::validation("frame_delay_ms must be non-zero"));
        }
        if self.heatmap_timeout_ms == 0 {
            return Err(ShorelineError::validation(
                "heatmap_timeout_ms must be non-zero",
            ));
        }
        if self.export_timeout_ms == 0 {
            return Err(ShorelineError::validation(
                "export_timeout_ms must be non-zero",
            ));
        }
        if !(1..=30).contains(&self.gif_speed) {
            return Err(ShorelineError::validation("gif_speed must be in 1..=30"));
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(ShorelineError::validation(
                "padding must be finite and non-negative",
            ));
        }
        let (w, h) = self.canvas.size_f64();
        if self.padding * 2.0 >= w.min(h) {
            return Err(ShorelineError::validation(
                "padding leaves no drawable area on the canvas",
            ));
        }
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(ShorelineError::validation(
                "stroke_width must be finite and non-negative",
            ));
        }
        if self.heatmap_cutoff > self.heatmap_end {
            return Err(ShorelineError::validation(
                "heatmap_cutoff must not be after heatmap_end",
            ));
        }
        Ok(())
    }

    /// Apply `SHORELINE_TICK_MS`, `SHORELINE_FRAME_DELAY_MS`, `SHORELINE_HEATMAP_TIMEOUT_MS` and
    /// `SHORELINE_EXPORT_TIMEOUT_MS`. Unset, unparsable or zero values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        fn env_u64(key: &str) -> Option<u64> {
            std::env::var(key)
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|&n| n > 0)
        }

        if let Some(v) = env_u64("SHORELINE_TICK_MS") {
            self.tick_ms = v;
        }
        if let Some(v) = env_u64("SHORELINE_FRAME_DELAY_MS").and_then(|v| u32::try_from(v).ok())
        {
            self.frame_delay_ms = v;
        }
        if let Some(v) = env_u64("SHORELINE_HEATMAP_TIMEOUT_MS") {
            self.heatmap_timeout_ms = v;
        }
        if let Some(v) = env_u64("SHORELINE_EXPORT_TIMEOUT_MS") {
            self.export_timeout_ms = v;
        }
        self
    }

    /// Read opts from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &std::path::Path) -> ShorelineResult<Self> {
        use anyhow::Context as _;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read opts file '{}'", path.display()))?;
        let opts: Self =
            serde_json::from_slice(&bytes).map_err(|e| ShorelineError::serde(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Autoplay tick period.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Display time of each exported frame.
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.frame_delay_ms))
    }

    /// Heatmap request timeout.
    pub fn heatmap_timeout(&self) -> Duration {
        Duration::from_millis(self.heatmap_timeout_ms)
    }

    /// Export run timeout.
    pub fn export_timeout(&self) -> Duration {
        Duration::from_millis(self.export_timeout_ms)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/opts.rs"]
mod tests;
