use std::{io, path::PathBuf};

use thiserror::Error;

use crate::support::constraint::ConstraintError;

/// Errors that can occur while loading a blade geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The geometry source could not be read.
    #[error("failed to read geometry source {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The geometry source is not a well-formed table.
    #[error("malformed geometry source {path:?} at line {line}: {context}")]
    Malformed {
        path: PathBuf,
        line: usize,
        context: String,
    },

    /// A required column is absent from the table.
    #[error("geometry source {path:?} has no `{column}` column")]
    MissingColumn { path: PathBuf, column: String },

    /// Fewer than two blade stations were given.
    #[error("geometry needs at least two blade stations, found {found}")]
    TooFewStations { found: usize },

    /// Station radii are not strictly increasing from root to tip.
    #[error("blade station radii must increase from root to tip (station {index})")]
    NonIncreasingRadius { index: usize },

    /// A station value violates its physical bounds.
    #[error("invalid {quantity} at station {index}")]
    Invalid {
        quantity: &'static str,
        index: usize,
        #[source]
        source: ConstraintError,
    },
}
