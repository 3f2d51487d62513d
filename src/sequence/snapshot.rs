use chrono::{NaiveDate, Utc};

use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{ShorelineError, ShorelineResult};

/// Closed ring of planar points (the outer boundary of a lake polygon).
///
/// The closing edge is implicit; a trailing point equal to the first is allowed and harmless.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ring(Vec<Point>);

impl Ring {
    /// Wrap a list of points.
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Build a ring from `[x, y]` pairs.
    pub fn from_pairs(pairs: &[[f64; 2]]) -> Self {
        Self(pairs.iter().map(|&[x, y]| Point::new(x, y)).collect())
    }

    /// Points in ring order.
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when the ring has no points.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Axis-aligned bounding box, or `None` for an empty ring.
    pub fn bounds(&self) -> Option<Rect> {
        let (first, rest) = self.0.split_first()?;
        Some(
            rest.iter()
                .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)),
        )
    }
}

/// One observation of a lake: its outline at a calendar date.
///
/// Wire shape: `{"date": "2024-01-01", "polygon": {"coordinates": [[[x, y], ...]]}}`. Only the
/// outer ring is kept. A missing polygon or empty `coordinates` array becomes `polygon: None`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "SnapshotWire", into = "SnapshotWire")]
pub struct Snapshot {
    /// Observation date.
    pub date: NaiveDate,
    /// Outer ring, if the source delivered one.
    pub polygon: Option<Ring>,
}

impl Snapshot {
    /// Snapshot with a polygon.
    pub fn new(date: NaiveDate, ring: Ring) -> Self {
        Self {
            date,
            polygon: Some(ring),
        }
    }

    /// Snapshot with no geometry (renders as a blank frame).
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            polygon: None,
        }
    }
}

/// Response envelope of a snapshot source: `{"data": [...]}`.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct SnapshotEnvelope {
    /// Snapshots in source order (not necessarily sorted).
    #[serde(default)]
    pub data: Vec<Snapshot>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct SnapshotWire {
    date: String,
    #[serde(default)]
    polygon: Option<PolygonWire>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct PolygonWire {
    #[serde(default)]
    coordinates: Vec<Vec<[f64; 2]>>,
}

impl TryFrom<SnapshotWire> for Snapshot {
    type Error = ShorelineError;

    fn try_from(w: SnapshotWire) -> Result<Self, Self::Error> {
        let date = parse_date(&w.date)?;
        let polygon = w
            .polygon
            .and_then(|p| p.coordinates.into_iter().next())
            .map(|outer| Ring::from_pairs(&outer));
        Ok(Self { date, polygon })
    }
}

impl From<Snapshot> for SnapshotWire {
    fn from(s: Snapshot) -> Self {
        Self {
            date: s.date.format("%Y-%m-%d").to_string(),
            polygon: s.polygon.map(|r| PolygonWire {
                coordinates: vec![r.points().iter().map(|p| [p.x, p.y]).collect()],
            }),
        }
    }
}

/// Parse a calendar date from `YYYY-MM-DD`, an RFC 3339 timestamp (converted to its UTC date),
/// or a naive `YYYY-MM-DDTHH:MM:SS` timestamp.
pub fn parse_date(s: &str) -> ShorelineResult<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    Err(ShorelineError::validation(format!(
        "unrecognized snapshot date \"{s}\""
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/snapshot.rs"]
mod tests;
