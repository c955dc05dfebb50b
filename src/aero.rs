//! Aerodynamic collaborators of the case generator.
//!
//! Each collaborator is a trait so the orchestrator in
//! [`casegen`](crate::casegen) never depends on a particular file format or
//! numerical method:
//!
//! - [`GeometryLoader`]: blade geometry source to [`GeometryCase`]
//! - [`PolarEvaluator`]: airfoil polars to lift-curve [`PolarData`]
//! - [`LoadingSolver`]: operating point to blade loading
//! - [`CaseWriter`]: simulator input files inside a case directory
//!
//! Reference implementations are provided for the first three
//! ([`SectionTable`], [`XfoilPolars`], [`BladeElementSolver`]).
//! Patch-file encodings are left to [`CaseWriter`] implementations.

pub mod geometry;
pub mod loading;
pub mod output;
pub mod polar;

pub use geometry::{
    BladeSection, BladeSettings, GeometryCase, GeometryError, GeometryLoader, RawGeometry,
    Rotation, SectionTable,
};
pub use loading::{
    BladeElementSolver, ConstantLoading, FlightRegime, LoadingError, LoadingResult, LoadingSolver,
    OperatingPoint, PeriodicLoading, PointRecord, TrimConfig,
};
pub use output::{CASE_LIST_FILE_NAME, CaseContext, CaseWriter, WriteError};
pub use polar::{PolarData, PolarError, PolarEvaluator, SectionPolar, XfoilPolars};
