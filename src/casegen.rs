//! Case generation.
//!
//! [`CaseGenerator`] walks the configured geometries in order and, for each
//! one, writes either a single loading condition (design mode) or the full
//! operating-condition sweep (analysis mode) into a fresh directory tree.
//! Airfoil polars are evaluated once, on the first geometry, and shared by
//! all later ones through an [`Arc<PolarSet>`].
//!
//! The collaborators are supplied as trait implementations:
//!
//! ```
//! use std::{error::Error, path::Path};
//!
//! use rotor_cases::{
//!     aero::{BladeElementSolver, CaseWriter, SectionTable, XfoilPolars},
//!     casegen::{CaseGenerator, Config},
//! };
//!
//! fn generate(path: &Path, writer: &impl CaseWriter) -> Result<usize, Box<dyn Error>> {
//!     let config = Config::load(path)?;
//!     let summary = CaseGenerator::new(
//!         &config,
//!         &SectionTable,
//!         &XfoilPolars,
//!         &BladeElementSolver::default(),
//!         writer,
//!     )
//!     .run()?;
//!     Ok(summary.case_list.len())
//! }
//! ```

mod analysis;
mod case;
mod config;
mod design;
mod error;
mod label;
mod layout;
mod polar_cache;
mod store;
mod sweep;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{
    AeroSettings, Config, ConfigError, ConfigFile, FailurePolicy, Features, FileNames,
    GeometrySource, NamelistSection, NoiseModel, NoiseSection, ObserverGrid, OneOrMany,
    OperatingMode, PolarSection, PolarSettings, RotorSection, RunSection, SweepSection,
};
pub use error::{CaseError, RunError, Stage};
pub use label::case_label;
pub use layout::{CaseTree, DirectoryError, SNAPSHOT_FILE_NAME};
pub use polar_cache::{
    PolarCacheError, PolarKeyCollision, PolarSet, RotorSpeedKey, keyed_rotor_speeds,
};
pub use store::{CaseResult, GeometryRecord, ResultStore, Snapshot, StoreError};
pub use sweep::{Axis, Sweep};

use std::sync::Arc;

use tracing::{error, info};

use crate::aero::{CaseWriter, GeometryLoader, LoadingSolver, PolarEvaluator};

/// Outcome of a completed run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Results of every geometry that was generated.
    pub results: ResultStore,

    /// Case folders in creation order across the whole run: geometry ids in
    /// design mode, case labels in analysis mode.
    pub case_list: Vec<String>,

    /// Failures skipped under the configured [`FailurePolicy`].
    pub failures: Vec<RunError>,
}

impl RunSummary {
    /// Whether every configured case was generated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Cases generated for one geometry.
#[derive(Debug, Default)]
struct GeometryOutcome {
    cases: Vec<CaseResult>,
    skipped: Vec<RunError>,
}

/// Drives case generation for a validated [`Config`].
pub struct CaseGenerator<'a, G, P, S, W> {
    config: &'a Config,
    geometry: &'a G,
    polars: &'a P,
    solver: &'a S,
    writer: &'a W,
}

impl<'a, G, P, S, W> CaseGenerator<'a, G, P, S, W>
where
    G: GeometryLoader,
    P: PolarEvaluator,
    S: LoadingSolver,
    W: CaseWriter,
{
    pub fn new(
        config: &'a Config,
        geometry: &'a G,
        polars: &'a P,
        solver: &'a S,
        writer: &'a W,
    ) -> Self {
        Self {
            config,
            geometry,
            polars,
            solver,
            writer,
        }
    }

    /// Generates every configured case.
    ///
    /// Geometry, polar, and output-root errors always end the run. Case
    /// failures end it under [`FailurePolicy::AbortRun`] and are otherwise
    /// collected in [`RunSummary::failures`]. A failed case or geometry
    /// leaves no directory behind.
    ///
    /// # Errors
    ///
    /// Returns a [`RunError`] identifying the geometry, case, and stage that failed.
    pub fn run(&self) -> Result<RunSummary, RunError> {
        let config = self.config;
        let tree = CaseTree::new(config.output_dir());
        let mut summary = RunSummary::default();
        let mut cache: Option<Arc<PolarSet>> = None;

        info!(
            mode = ?config.mode(),
            geometries = config.geometries().len(),
            root = %tree.root().display(),
            "starting case generation"
        );

        for (index, source) in config.geometries().iter().enumerate() {
            let geometry = self
                .geometry
                .load(&source.path, config.blade())
                .map_err(|err| RunError::Geometry {
                    geometry: source.id.clone(),
                    source: err,
                })?;
            info!(
                geometry = %source.id,
                sections = geometry.section_count(),
                "loaded geometry"
            );

            let polars = match cache.clone() {
                Some(polars) => polars,
                None => {
                    let built = Arc::new(PolarSet::build(config, self.polars)?);
                    cache = Some(Arc::clone(&built));
                    built
                }
            };

            tree.ensure_root().map_err(RunError::Root)?;

            let geometry_dir = tree.geometry_dir(&source.id);
            let outcome = tree
                .recreate(&geometry_dir)
                .map_err(|err| RunError::case(&source.id, None, Stage::Directory, err))
                .and_then(|()| match config.mode() {
                    OperatingMode::Design => self
                        .design_case(index, source, &geometry, &polars, &geometry_dir)
                        .map(|case| GeometryOutcome {
                            cases: vec![case],
                            skipped: Vec::new(),
                        }),
                    OperatingMode::Analysis => {
                        self.analysis_sweep(index, source, &geometry, &polars, &tree)
                    }
                });

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) => {
                    tree.discard(&geometry_dir);
                    if config.failure_policy() == FailurePolicy::AbortRun {
                        return Err(err);
                    }
                    error!(geometry = %source.id, error = %err, "skipping geometry");
                    summary.failures.push(err);
                    continue;
                }
            };

            info!(
                geometry = %source.id,
                cases = outcome.cases.len(),
                skipped = outcome.skipped.len(),
                "generated geometry"
            );
            summary
                .case_list
                .extend(outcome.cases.iter().map(|case| case.label.clone()));
            summary.failures.extend(outcome.skipped);
            summary
                .results
                .record(source.id.clone(), geometry, polars, outcome.cases);

            if config.features().snapshot {
                let path = tree.snapshot_path();
                summary.results.snapshot(config.file(), &path)?;
                info!(path = %path.display(), geometries = summary.results.len(), "wrote snapshot");
            }
        }

        if config.mode() == OperatingMode::Design && !summary.case_list.is_empty() {
            self.writer
                .write_case_list(&summary.case_list, &config.file_names().namelist, tree.root())
                .map_err(RunError::CaseList)?;
        }

        info!(
            cases = summary.case_list.len(),
            failures = summary.failures.len(),
            "case generation finished"
        );
        Ok(summary)
    }
}
