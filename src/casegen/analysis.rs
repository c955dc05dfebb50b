//! Analysis mode: the full operating-condition sweep for every geometry.

use tracing::warn;

use crate::aero::{CaseWriter, GeometryCase, GeometryLoader, LoadingSolver, PolarEvaluator};

use super::{
    CaseGenerator, CaseResult, CaseTree, FailurePolicy, GeometryOutcome, GeometrySource,
    PolarSet, RunError, Stage, case::CaseScope, case_label,
};

impl<G, P, S, W> CaseGenerator<'_, G, P, S, W>
where
    G: GeometryLoader,
    P: PolarEvaluator,
    S: LoadingSolver,
    W: CaseWriter,
{
    /// Writes one labeled case folder per sweep point below the geometry
    /// directory, then the geometry's case list.
    ///
    /// Under [`FailurePolicy::SkipCase`] a failed case is removed and
    /// reported in the outcome; it is left out of the case list.
    pub(super) fn analysis_sweep(
        &self,
        index: usize,
        source: &GeometrySource,
        geometry: &GeometryCase,
        polars: &PolarSet,
        tree: &CaseTree,
    ) -> Result<GeometryOutcome, RunError> {
        let config = self.config;
        let geometry_dir = tree.geometry_dir(&source.id);
        let mut outcome = GeometryOutcome::default();

        for point in config.sweep().analysis_points() {
            let label = case_label(&point);
            let case_dir = geometry_dir.join(&label);
            let scope = CaseScope {
                geometry_index: index,
                geometry_id: &source.id,
                label: Some(&label),
                geometry,
                polars,
            };

            let generated = tree
                .recreate(&case_dir)
                .map_err(|err| RunError::case(&source.id, Some(&label), Stage::Directory, err))
                .and_then(|()| self.generate_case(&scope, &point, &case_dir));

            match generated {
                Ok(loading) => outcome.cases.push(CaseResult {
                    label,
                    point: point.record(),
                    loading,
                }),
                Err(err) if config.failure_policy() == FailurePolicy::SkipCase => {
                    tree.discard(&case_dir);
                    warn!(geometry = %source.id, case = %label, error = %err, "skipping case");
                    outcome.skipped.push(err);
                }
                Err(err) => return Err(err),
            }
        }

        let labels: Vec<String> = outcome.cases.iter().map(|case| case.label.clone()).collect();
        self.writer
            .write_case_list(&labels, &config.file_names().namelist, &geometry_dir)
            .map_err(|err| RunError::case(&source.id, None, Stage::CaseList, err))?;

        Ok(outcome)
    }
}
