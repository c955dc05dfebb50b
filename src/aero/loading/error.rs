use thiserror::Error;
use twine_solvers::equation::bisection;

use crate::casegen::RotorSpeedKey;

/// Errors that can occur while computing blade loading.
#[derive(Debug, Error)]
pub enum LoadingError {
    /// The collective trim did not reach the target thrust.
    #[error("trim did not converge: thrust residual={residual} N after {iters} iterations")]
    NotConverged { residual: f64, iters: usize },

    /// The trim solver failed (for example, the collective bracket does not
    /// contain the target thrust).
    #[error("trim solver failed")]
    Bisection(#[from] bisection::Error),

    #[error("inflow iteration did not converge after {iters} iterations")]
    InflowNotConverged { iters: usize },

    /// The loading does not have one entry per geometry section.
    #[error("loading has {found:?} sections, geometry has {expected}")]
    SectionMismatch {
        expected: usize,
        found: Option<usize>,
    },

    /// The polar cache has no entry for the point's rotor speed.
    #[error("no polar data for rotor speed {key}")]
    MissingPolar { key: RotorSpeedKey },

    #[error("non-physical loading: {context}")]
    NonPhysical { context: String },
}
