use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that can occur while evaluating airfoil polars.
#[derive(Debug, Error)]
pub enum PolarError {
    #[error("failed to read polar file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file has no recognizable polar table.
    #[error("malformed polar file {path:?}: {context}")]
    Malformed { path: PathBuf, context: String },

    #[error("polar file {path:?} has no `{column}` column")]
    MissingColumn { path: PathBuf, column: &'static str },

    /// Too few points inside the lift-curve fit window.
    #[error("polar file {path:?} has {found} points between {start_deg}° and {end_deg}°, need 2")]
    InsufficientData {
        path: PathBuf,
        found: usize,
        start_deg: f64,
        end_deg: f64,
    },

    /// The fitted lift curve has no usable slope.
    #[error("polar file {path:?} gives a flat lift curve")]
    DegenerateFit { path: PathBuf },

    /// No polar files are configured for a rotor speed.
    #[error("no polar files configured for rotor speed index {index}")]
    MissingRotorSpeed { index: usize },

    #[error("polar data needs at least one cross section")]
    NoSections,
}
