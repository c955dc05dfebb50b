use std::fmt;

use thiserror::Error;

use crate::aero::{GeometryError, LoadingError, WriteError};

use super::{
    config::ConfigError, layout::DirectoryError, polar_cache::PolarCacheError, store::StoreError,
};

/// Step of case generation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Recreating the geometry or case directory.
    Directory,
    /// Solving for the blade loading.
    Loading,
    /// Writing a geometry or loading patch.
    Write,
    Noise,
    Namelist,
    CaseList,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Directory => "case directory",
            Stage::Loading => "loading",
            Stage::Write => "patch writing",
            Stage::Noise => "noise data",
            Stage::Namelist => "namelist",
            Stage::CaseList => "case list",
        })
    }
}

/// Underlying cause of a failed case.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Loading(#[from] LoadingError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Errors returned by [`CaseGenerator::run`](super::CaseGenerator::run).
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    #[error("failed to load geometry `{geometry}`")]
    Geometry {
        geometry: String,
        #[source]
        source: GeometryError,
    },

    #[error("failed to build polar cache")]
    Polars(#[from] PolarCacheError),

    #[error("failed to prepare output root")]
    Root(#[source] DirectoryError),

    /// A case could not be generated. Carries what is needed to reproduce it.
    #[error("{stage} failed for geometry `{geometry}`{}", case_suffix(.case))]
    Case {
        geometry: String,
        case: Option<String>,
        stage: Stage,
        #[source]
        source: CaseError,
    },

    #[error("failed to write result snapshot")]
    Snapshot(#[from] StoreError),

    /// The design mode case list at the output root could not be written.
    #[error("failed to write run case list")]
    CaseList(#[source] WriteError),
}

impl RunError {
    pub(super) fn case(
        geometry: &str,
        case: Option<&str>,
        stage: Stage,
        source: impl Into<CaseError>,
    ) -> Self {
        RunError::Case {
            geometry: geometry.to_string(),
            case: case.map(str::to_string),
            stage,
            source: source.into(),
        }
    }

    /// Stage of a case failure, if this is one.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            RunError::Case { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

fn case_suffix(case: &Option<String>) -> String {
    case.as_ref()
        .map(|label| format!(", case `{label}`"))
        .unwrap_or_default()
}
