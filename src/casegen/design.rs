//! Design mode: one operating condition per geometry.

use std::path::Path;

use crate::aero::{CaseWriter, GeometryCase, GeometryLoader, LoadingSolver, PolarEvaluator};

use super::{
    CaseGenerator, CaseResult, GeometrySource, PolarSet, RunError, case::CaseScope,
};

impl<G, P, S, W> CaseGenerator<'_, G, P, S, W>
where
    G: GeometryLoader,
    P: PolarEvaluator,
    S: LoadingSolver,
    W: CaseWriter,
{
    /// Writes the case of the geometry at `index` directly into its directory.
    ///
    /// The case is labeled with the geometry id, which is also the folder
    /// name the run-wide case list points at.
    pub(super) fn design_case(
        &self,
        index: usize,
        source: &GeometrySource,
        geometry: &GeometryCase,
        polars: &PolarSet,
        geometry_dir: &Path,
    ) -> Result<CaseResult, RunError> {
        let point = self.config.sweep().design_point(index);
        let scope = CaseScope {
            geometry_index: index,
            geometry_id: &source.id,
            label: None,
            geometry,
            polars,
        };

        let loading = self.generate_case(&scope, &point, geometry_dir)?;

        Ok(CaseResult {
            label: source.id.clone(),
            point: point.record(),
            loading,
        })
    }
}
