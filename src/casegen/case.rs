//! Contents of a single case directory.

use std::path::Path;

use tracing::debug;

use crate::aero::{
    CaseContext, CaseWriter, GeometryCase, GeometryLoader, LoadingError, LoadingResult,
    LoadingSolver, OperatingPoint, PolarEvaluator,
};

use super::{CaseError, CaseGenerator, PolarSet, RotorSpeedKey, RunError, Stage};

/// Identifies the case being generated in errors and logs.
pub(super) struct CaseScope<'s> {
    pub geometry_index: usize,
    pub geometry_id: &'s str,
    /// `None` in design mode, where the geometry directory is the case.
    pub label: Option<&'s str>,
    pub geometry: &'s GeometryCase,
    pub polars: &'s PolarSet,
}

impl CaseScope<'_> {
    fn fail(&self, stage: Stage, source: impl Into<CaseError>) -> RunError {
        RunError::case(self.geometry_id, self.label, stage, source)
    }
}

impl<G, P, S, W> CaseGenerator<'_, G, P, S, W>
where
    G: GeometryLoader,
    P: PolarEvaluator,
    S: LoadingSolver,
    W: CaseWriter,
{
    /// Writes the geometry patches, solves the loading, and writes the
    /// loading patch and optional inputs into `dir`.
    pub(super) fn generate_case(
        &self,
        scope: &CaseScope<'_>,
        point: &OperatingPoint,
        dir: &Path,
    ) -> Result<LoadingResult, RunError> {
        let config = self.config;
        let names = config.file_names();
        let geometry = scope.geometry;
        let sections = geometry.section_count();

        self.writer
            .write_geometry(&names.geometry, geometry, dir)
            .and_then(|()| {
                self.writer.write_compact_geometry(
                    &names.compact_geometry,
                    sections,
                    &geometry.lift_line,
                    dir,
                )
            })
            .map_err(|err| scope.fail(Stage::Write, err))?;

        let polar = scope
            .polars
            .for_rotor_speed(point.rotor_speed)
            .ok_or_else(|| {
                scope.fail(
                    Stage::Loading,
                    LoadingError::MissingPolar {
                        key: RotorSpeedKey::from_rotor_speed(point.rotor_speed),
                    },
                )
            })?;

        let loading = self
            .solver
            .solve(config, geometry, polar, point)
            .map_err(|err| scope.fail(Stage::Loading, err))?;

        let found = loading.section_count();
        if found != Some(sections) {
            return Err(scope.fail(
                Stage::Loading,
                LoadingError::SectionMismatch {
                    expected: sections,
                    found,
                },
            ));
        }

        let written = match &loading {
            LoadingResult::Constant(constant) => {
                self.writer
                    .write_constant_loading(&names.loading, constant, sections, dir)
            }
            LoadingResult::Periodic(periodic) => self.writer.write_periodic_loading(
                &names.loading,
                periodic,
                sections,
                point.rotor_speed,
                dir,
            ),
        };
        written.map_err(|err| scope.fail(Stage::Write, err))?;

        let context = CaseContext {
            geometry_index: scope.geometry_index,
            geometry,
            point,
            loading: &loading,
        };

        if let Some(model) = config.features().noise {
            self.writer
                .write_noise(model, config, &context, dir)
                .map_err(|err| scope.fail(Stage::Noise, err))?;
        }

        if config.features().namelist {
            self.writer
                .write_namelist(config, &context, dir)
                .map_err(|err| scope.fail(Stage::Namelist, err))?;
        }

        debug!(
            geometry = scope.geometry_id,
            case = scope.label,
            regime = ?loading.regime(),
            thrust = loading.thrust(),
            "wrote case"
        );
        Ok(loading)
    }
}
