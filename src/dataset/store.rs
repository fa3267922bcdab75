//! Tower dataset store backed by the national sites CSV.

use csv::ReaderBuilder;
use parking_lot::RwLock;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::models::tower::TowerRow;
use crate::models::TowerRecord;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset {path} at line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: u64,
        reason: String,
    },
}

/// Holds the immutable tower snapshot read from the sites CSV.
///
/// The first `load` reads the file; later calls hand out the same snapshot.
/// `reload` reads the file again and swaps the snapshot in one step, so readers
/// see either the old or the new dataset, never a mix.
pub struct TowerStore {
    path: PathBuf,
    snapshot: RwLock<Option<Arc<[TowerRecord]>>>,
}

impl TowerStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            snapshot: RwLock::new(None),
        }
    }

    /// Build a store that is already loaded with the given records
    pub fn from_records(records: Vec<TowerRecord>) -> Self {
        Self {
            path: PathBuf::new(),
            snapshot: RwLock::new(Some(records.into())),
        }
    }

    /// Return the tower snapshot, reading the file on first use
    pub fn load(&self) -> Result<Arc<[TowerRecord]>, DatasetError> {
        if let Some(records) = self.snapshot.read().as_ref() {
            return Ok(Arc::clone(records));
        }

        let mut guard = self.snapshot.write();
        // Another caller may have loaded while we waited for the write lock
        if let Some(records) = guard.as_ref() {
            return Ok(Arc::clone(records));
        }

        let records = read_towers(&self.path)?;
        *guard = Some(Arc::clone(&records));
        Ok(records)
    }

    /// Re-read the file and replace the snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self) -> Result<Arc<[TowerRecord]>, DatasetError> {
        let records = read_towers(&self.path)?;
        *self.snapshot.write() = Some(Arc::clone(&records));
        info!("Reloaded tower dataset ({} records)", records.len());
        Ok(records)
    }

    /// Whether a snapshot is currently held
    pub fn is_loaded(&self) -> bool {
        self.snapshot.read().is_some()
    }
}

/// Read every row of the sites CSV, failing on the first bad row
fn read_towers(path: &Path) -> Result<Arc<[TowerRecord]>, DatasetError> {
    info!("Loading tower dataset from {}", path.display());

    let file = File::open(path).map_err(|source| DatasetError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let headers = reader
        .headers()
        .map_err(|e| malformed(path, 1, &e))?
        .clone();

    let mut records = Vec::new();
    let mut row = csv::StringRecord::new();
    loop {
        let has_row = reader.read_record(&mut row).map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            malformed(path, line, &e)
        })?;
        if !has_row {
            break;
        }

        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let parsed: TowerRow = row
            .deserialize(Some(&headers))
            .map_err(|e| malformed(path, line, &e))?;
        let record = TowerRecord::try_from(parsed).map_err(|reason| DatasetError::Malformed {
            path: path.to_path_buf(),
            line,
            reason,
        })?;
        records.push(record);
    }

    info!("Loaded {} tower records", records.len());
    Ok(records.into())
}

fn malformed(path: &Path, line: u64, err: &csv::Error) -> DatasetError {
    DatasetError::Malformed {
        path: path.to_path_buf(),
        line,
        reason: err.to_string(),
    }
}
