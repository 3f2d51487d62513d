/// Date-ascending snapshot index with wrap-around stepping.
pub mod index;
/// Snapshot and ring types plus their wire format.
pub mod snapshot;
