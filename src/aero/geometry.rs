//! Blade geometry.
//!
//! A geometry source is first parsed into a [`RawGeometry`] table and then
//! reduced to the radial [`BladeSection`]s and lifting line the loading
//! solver and the patch writers need.

mod error;
mod section_table;

pub use error::GeometryError;
pub use section_table::SectionTable;

use std::{collections::HashMap, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::support::constraint::{ConstraintResult, StrictlyPositive, UnitInterval};

/// Direction of rotor rotation viewed from above.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rotation {
    #[default]
    #[serde(alias = "ccw")]
    CounterClockwise,
    #[serde(alias = "cw")]
    Clockwise,
}

impl Rotation {
    /// Sign applied to spanwise coordinates for this rotation sense.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            Rotation::CounterClockwise => 1.0,
            Rotation::Clockwise => -1.0,
        }
    }
}

/// Blade-level settings applied while building a [`GeometryCase`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BladeSettings {
    load_position: f64,
    blade_count: u32,
    rotation: Rotation,
}

impl BladeSettings {
    /// Constructs validated blade settings.
    ///
    /// `load_position` is the chordwise position of the loading line measured
    /// from the leading edge, as a fraction of the chord.
    ///
    /// # Errors
    ///
    /// Returns an error if the load position is outside `[0, 1]` or the blade
    /// count is zero.
    pub fn new(load_position: f64, blade_count: u32, rotation: Rotation) -> ConstraintResult<Self> {
        Ok(Self {
            load_position: UnitInterval::new(load_position)?.into_inner(),
            blade_count: StrictlyPositive::new(blade_count)?.into_inner(),
            rotation,
        })
    }

    #[must_use]
    pub fn load_position(&self) -> f64 {
        self.load_position
    }

    #[must_use]
    pub fn blade_count(&self) -> u32 {
        self.blade_count
    }

    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }
}

/// A parsed but uninterpreted geometry table.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGeometry {
    /// Path the table was read from.
    pub source: PathBuf,

    /// Column name to column index.
    pub header: HashMap<String, usize>,

    /// Numeric rows, each with one value per header column.
    pub rows: Vec<Vec<f64>>,
}

impl RawGeometry {
    /// Returns the values of a named column.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MissingColumn`] if the table has no such column.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, GeometryError> {
        let index = self
            .header
            .get(name)
            .copied()
            .ok_or_else(|| GeometryError::MissingColumn {
                path: self.source.clone(),
                column: name.to_string(),
            })?;
        Ok(self.rows.iter().map(|row| row[index]).collect())
    }

    /// Returns the values of a named column, or `None` if it is absent.
    #[must_use]
    pub fn optional_column(&self, name: &str) -> Option<Vec<f64>> {
        self.column(name).ok()
    }
}

/// One radial blade element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BladeSection {
    /// Radial position of the element midpoint, in meters.
    pub radius: f64,

    /// Radial extent of the element, in meters.
    pub span: f64,

    /// Chord length, in meters.
    pub chord: f64,

    /// Geometric twist relative to the hub plane, in radians.
    pub twist: f64,
}

/// Geometry of one blade variant, ready for loading and patch writing.
///
/// Built once per geometry source and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryCase {
    pub blade_count: u32,
    pub rotation: Rotation,

    /// Tip radius, in meters.
    pub radius: f64,

    /// Radius of the innermost blade station, in meters.
    pub root_cutout: f64,

    /// Blade area over disk area.
    pub solidity: f64,

    /// Radial elements ordered from root to tip.
    pub sections: Vec<BladeSection>,

    /// Lifting-line coordinates in meters, one per section.
    pub lift_line: Vec<[f64; 3]>,
}

impl GeometryCase {
    /// Number of radial sections (cross sections) along the blade.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

/// Converts a geometry source into a [`GeometryCase`].
pub trait GeometryLoader {
    /// Parses the geometry source into a raw table.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the source is missing or malformed.
    fn parse(&self, source: &Path) -> Result<RawGeometry, GeometryError>;

    /// Reduces a raw table to blade sections and the lifting line.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if required columns are missing or the
    /// values are not physical.
    fn build(
        &self,
        raw: &RawGeometry,
        settings: &BladeSettings,
    ) -> Result<GeometryCase, GeometryError>;

    /// Parses and builds in one step.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`parse`](Self::parse) or [`build`](Self::build).
    fn load(&self, source: &Path, settings: &BladeSettings) -> Result<GeometryCase, GeometryError> {
        let raw = self.parse(source)?;
        self.build(&raw, settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blade_settings_are_validated() {
        assert!(BladeSettings::new(0.25, 2, Rotation::Clockwise).is_ok());
        assert!(BladeSettings::new(1.5, 2, Rotation::Clockwise).is_err());
        assert!(BladeSettings::new(0.25, 0, Rotation::Clockwise).is_err());
    }

    #[test]
    fn missing_column_is_reported() {
        let raw = RawGeometry {
            source: PathBuf::from("blade.csv"),
            header: HashMap::from([("r".to_string(), 0)]),
            rows: vec![vec![0.1], vec![0.5]],
        };

        assert_eq!(raw.column("r").unwrap(), vec![0.1, 0.5]);
        assert!(raw.optional_column("le_x").is_none());
        assert!(matches!(
            raw.column("chord"),
            Err(GeometryError::MissingColumn { column, .. }) if column == "chord"
        ));
    }
}
