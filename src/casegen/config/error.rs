use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{
    casegen::{polar_cache::PolarKeyCollision, sweep::Axis},
    support::constraint::ConstraintError,
};

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),

    #[error("no geometry sources configured")]
    NoGeometries,

    /// A geometry source has no file name to derive its identifier from.
    #[error("cannot derive a geometry id from {path:?}")]
    GeometryId { path: PathBuf },

    /// A geometry id that would not name its own directory below the output
    /// root: `.`, `..`, an id containing a path separator, or a reserved
    /// root entry.
    #[error("geometry id `{id}` cannot be used as a case directory name")]
    ReservedGeometryId { id: String },

    /// Two geometry sources share a file stem.
    #[error("geometry id `{id}` is used by more than one source")]
    DuplicateGeometryId { id: String },

    #[error("sweep axis `{axis}` has no values")]
    EmptyAxis { axis: Axis },

    /// A design-mode axis is neither a single value nor one value per geometry.
    #[error("sweep axis `{axis}` has {len} values, expected 1 or {geometries} (one per geometry)")]
    AxisLength {
        axis: Axis,
        len: usize,
        geometries: usize,
    },

    /// Several shaft tilts are configured but they do not pair with the forward speeds.
    #[error("{tilts} shaft tilts cannot be indexed by {forward_speeds} forward speeds")]
    TiltIndexing { tilts: usize, forward_speeds: usize },

    #[error(transparent)]
    PolarKeyCollision(#[from] PolarKeyCollision),

    /// Two analysis sweep points format to the same case label.
    #[error("case label `{label}` is produced by more than one sweep point")]
    DuplicateCaseLabel { label: String },

    /// The polar file table does not match the rotor speeds or locations.
    #[error("polar files: {context}")]
    PolarShape { context: String },

    /// A scalar setting violates its bounds.
    #[error("invalid `{field}`")]
    Invalid {
        field: &'static str,
        #[source]
        source: ConstraintError,
    },
}
