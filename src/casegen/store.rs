//! In-memory results of a run and their JSON snapshot.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    aero::{GeometryCase, LoadingResult, PointRecord},
    support::fs::write_atomic,
};

use super::{ConfigFile, polar_cache::PolarSet};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write snapshot {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read snapshot {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed snapshot")]
    Json(#[from] serde_json::Error),
}

/// Loading computed for one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    /// Case label in analysis mode, the geometry id in design mode.
    pub label: String,
    pub point: PointRecord,
    pub loading: LoadingResult,
}

/// Everything computed for one geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryRecord {
    pub geometry: GeometryCase,
    pub polars: Arc<PolarSet>,
    /// Cases in creation order.
    pub cases: Vec<CaseResult>,
}

impl GeometryRecord {
    /// Looks up a case by label.
    #[must_use]
    pub fn case(&self, label: &str) -> Option<&CaseResult> {
        self.cases.iter().find(|case| case.label == label)
    }
}

/// Results keyed by geometry id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultStore {
    geometries: BTreeMap<String, GeometryRecord>,
}

impl ResultStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record of a geometry.
    ///
    /// Returns the replaced record, if any.
    pub fn record(
        &mut self,
        geometry_id: impl Into<String>,
        geometry: GeometryCase,
        polars: Arc<PolarSet>,
        cases: Vec<CaseResult>,
    ) -> Option<GeometryRecord> {
        self.geometries.insert(
            geometry_id.into(),
            GeometryRecord {
                geometry,
                polars,
                cases,
            },
        )
    }

    #[must_use]
    pub fn get(&self, geometry_id: &str) -> Option<&GeometryRecord> {
        self.geometries.get(geometry_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Geometry ids in lexicographic order.
    pub fn geometry_ids(&self) -> impl Iterator<Item = &str> {
        self.geometries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GeometryRecord)> {
        self.geometries.iter().map(|(id, record)| (id.as_str(), record))
    }

    /// Writes the store and the configuration it was produced with to `path`
    /// as JSON, replacing any previous snapshot atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the file cannot be written.
    pub fn snapshot(&self, config: &ConfigFile, path: &Path) -> Result<(), StoreError> {
        let snapshot = SnapshotRef {
            config,
            geometries: &self.geometries,
        };
        write_atomic(path, |out| {
            serde_json::to_writer_pretty(out, &snapshot).map_err(io::Error::from)
        })
        .map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    config: &'a ConfigFile,
    geometries: &'a BTreeMap<String, GeometryRecord>,
}

/// A snapshot read back from disk.
///
/// Polar sets that were shared in memory are separate copies here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    pub config: ConfigFile,
    pub geometries: BTreeMap<String, GeometryRecord>,
}

impl Snapshot {
    /// Reads a snapshot written by [`ResultStore::snapshot`].
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Rebuilds a store from the snapshot.
    #[must_use]
    pub fn into_store(self) -> ResultStore {
        ResultStore {
            geometries: self.geometries,
        }
    }
}
