use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ShorelineError, ShorelineResult};
use crate::playback::mode::HeatmapRange;
use crate::sequence::snapshot::{Snapshot, SnapshotEnvelope};

/// Supplies the snapshots of one lake, in any order.
pub trait SnapshotSource {
    /// Fetch every snapshot recorded for `lake_id`.
    fn fetch_snapshots(&self, lake_id: &str) -> ShorelineResult<Vec<Snapshot>>;
}

/// Supplies heatmap images. Called from a worker thread, hence `Send + Sync`.
pub trait HeatmapSource: Send + Sync {
    /// Fetch the encoded heatmap image of `lake_id` for `range`.
    fn fetch_heatmap(&self, lake_id: &str, range: HeatmapRange) -> ShorelineResult<Vec<u8>>;
}

impl<F> HeatmapSource for F
where
    F: Fn(&str, HeatmapRange) -> ShorelineResult<Vec<u8>> + Send + Sync,
{
    fn fetch_heatmap(&self, lake_id: &str, range: HeatmapRange) -> ShorelineResult<Vec<u8>> {
        self(lake_id, range)
    }
}

/// Receives one finished export and delivers it to the user.
pub trait ExportSink {
    /// Deliver `bytes` under the suggested `file_name`.
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> ShorelineResult<()>;
}

/// Reads `<root>/<lake_id>.json` holding `{"data": [snapshot, ...]}`.
#[derive(Clone, Debug)]
pub struct JsonSnapshotSource {
    root: PathBuf,
}

impl JsonSnapshotSource {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path the snapshots of `lake_id` are read from.
    pub fn path_for(&self, lake_id: &str) -> ShorelineResult<PathBuf> {
        check_file_component(lake_id)?;
        Ok(self.root.join(format!("{lake_id}.json")))
    }
}

impl SnapshotSource for JsonSnapshotSource {
    fn fetch_snapshots(&self, lake_id: &str) -> ShorelineResult<Vec<Snapshot>> {
        let path = self.path_for(lake_id)?;
        let bytes = std::fs::read(&path).map_err(|e| {
            ShorelineError::fetch(format!(
                "read snapshots for '{lake_id}' from '{}': {e}",
                path.display()
            ))
        })?;
        let envelope: SnapshotEnvelope = serde_json::from_slice(&bytes).map_err(|e| {
            ShorelineError::serde(format!("parse snapshots '{}': {e}", path.display()))
        })?;
        tracing::debug!(lake = lake_id, count = envelope.data.len(), "snapshots read");
        Ok(envelope.data)
    }
}

/// Reads `<root>/<lake_id>_<start>_<end>.png`.
#[derive(Clone, Debug)]
pub struct DirHeatmapSource {
    root: PathBuf,
}

impl DirHeatmapSource {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path the heatmap of `lake_id` over `range` is read from.
    pub fn path_for(&self, lake_id: &str, range: HeatmapRange) -> ShorelineResult<PathBuf> {
        check_file_component(lake_id)?;
        Ok(self.root.join(format!(
            "{lake_id}_{}_{}.png",
            range.start.format("%Y-%m-%d"),
            range.end.format("%Y-%m-%d")
        )))
    }
}

impl HeatmapSource for DirHeatmapSource {
    fn fetch_heatmap(&self, lake_id: &str, range: HeatmapRange) -> ShorelineResult<Vec<u8>> {
        let path = self.path_for(lake_id, range)?;
        std::fs::read(&path)
            .map_err(|e| ShorelineError::fetch(format!("read heatmap '{}': {e}", path.display())))
    }
}

/// Writes each export into a directory, replacing any file of the same name.
///
/// The bytes go to a temporary file first and are renamed into place, so readers never see a
/// half-written file.
#[derive(Clone, Debug)]
pub struct DirExportSink {
    dir: PathBuf,
    last: Option<PathBuf>,
}

impl DirExportSink {
    /// Sink writing into `dir`. The directory is created on first delivery.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            last: None,
        }
    }

    /// Path of the most recent delivery.
    pub fn last_path(&self) -> Option<&Path> {
        self.last.as_deref()
    }
}

impl ExportSink for DirExportSink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> ShorelineResult<()> {
        check_file_component(file_name)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create export dir '{}'", self.dir.display()))?;

        let path = self.dir.join(file_name);
        let tmp = self
            .dir
            .join(format!(".{file_name}.{}.tmp", std::process::id()));
        if let Err(e) = std::fs::write(&tmp, bytes)
            .and_then(|()| std::fs::rename(&tmp, &path))
        {
            let _ = std::fs::remove_file(&tmp);
            return Err(anyhow::Error::new(e)
                .context(format!("write export '{}'", path.display()))
                .into());
        }

        tracing::info!(path = %path.display(), bytes = bytes.len(), "export written");
        self.last = Some(path);
        Ok(())
    }
}

/// Keeps deliveries in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryExportSink {
    files: Vec<(String, Vec<u8>)>,
}

impl MemoryExportSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered `(file_name, bytes)` pairs in delivery order.
    pub fn files(&self) -> &[(String, Vec<u8>)] {
        &self.files
    }
}

impl ExportSink for MemoryExportSink {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> ShorelineResult<()> {
        self.files.push((file_name.to_owned(), bytes.to_vec()));
        Ok(())
    }
}

fn check_file_component(name: &str) -> ShorelineResult<()> {
    if name.is_empty()
        || name == "."
        || name.contains("..")
        || name.contains(['/', '\\', '\0'])
    {
        return Err(ShorelineError::validation(format!(
            "'{name}' is not a valid file name component"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/source.rs"]
mod tests;
