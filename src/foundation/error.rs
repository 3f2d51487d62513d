/// Convenience result type used across Shoreline.
pub type ShorelineResult<T> = Result<T, ShorelineError>;

/// Top-level error taxonomy used by the playback core.
///
/// Index and geometry errors describe data edge cases and are normally absorbed by the caller
/// (blank frame, nearest date). Fetch and encode errors are meant to reach the presentation
/// layer.
#[derive(thiserror::Error, Debug)]
pub enum ShorelineError {
    /// Position outside `[0, len)`.
    #[error("position {position} out of range for sequence of length {len}")]
    OutOfRange {
        /// Requested position.
        position: usize,
        /// Sequence length at the time of the request.
        len: usize,
    },

    /// Lookup miss (for example a date with no snapshot).
    #[error("not found: {0}")]
    NotFound(String),

    /// Ring with zero extent on an axis, no points, or non-finite coordinates.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Export requested from a position with no frames after it.
    #[error("empty export range: start {from} with sequence length {len}")]
    EmptyRange {
        /// Requested start position.
        from: usize,
        /// Sequence length at the time of the request.
        len: usize,
    },

    /// Remote or file source failed to deliver snapshots or a heatmap.
    #[error("fetch failed: {0}")]
    FetchFailed(String),

    /// Export pipeline failure.
    #[error("encode failed: {0}")]
    EncodeFailed(String),

    /// Invalid user-provided configuration or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShorelineError {
    /// Build a [`ShorelineError::OutOfRange`] value.
    pub fn out_of_range(position: usize, len: usize) -> Self {
        Self::OutOfRange { position, len }
    }

    /// Build a [`ShorelineError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`ShorelineError::DegenerateGeometry`] value.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::DegenerateGeometry(msg.into())
    }

    /// Build a [`ShorelineError::EmptyRange`] value.
    pub fn empty_range(from: usize, len: usize) -> Self {
        Self::EmptyRange { from, len }
    }

    /// Build a [`ShorelineError::FetchFailed`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::FetchFailed(msg.into())
    }

    /// Build a [`ShorelineError::EncodeFailed`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::EncodeFailed(msg.into())
    }

    /// Build a [`ShorelineError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ShorelineError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// `true` for errors the user can act on (retry, pick another date) without restarting the
    /// view. `OutOfRange` is a programming error and is the only variant reported as not
    /// recoverable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::OutOfRange { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
