//! Comma-separated blade station tables.
//!
//! The first non-comment line names the columns; every following line holds
//! one blade station from root to tip:
//!
//! ```text
//! # r [m], chord [m], twist [deg]
//! r, chord, twist
//! 0.17, 0.066, 12.0
//! 0.55, 0.058, 8.0
//! 0.96, 0.030, 4.0
//! ```
//!
//! Required columns are `r`, `chord` and `twist`. An optional `le_x` column
//! gives the chordwise leading-edge offset in meters; without it the quarter
//! chord is placed on the pitch axis.

use std::{collections::HashMap, f64::consts::PI, fs, path::Path};

use crate::support::constraint::{NonNegative, StrictlyPositive};

use super::{BladeSection, BladeSettings, GeometryCase, GeometryError, GeometryLoader, RawGeometry};

/// Geometry loader for CSV blade station tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionTable;

impl GeometryLoader for SectionTable {
    fn parse(&self, source: &Path) -> Result<RawGeometry, GeometryError> {
        let text = fs::read_to_string(source).map_err(|err| GeometryError::Read {
            path: source.to_path_buf(),
            source: err,
        })?;

        let malformed = |line: usize, context: String| GeometryError::Malformed {
            path: source.to_path_buf(),
            line,
            context,
        };

        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let (_, header_line) = lines
            .next()
            .ok_or_else(|| malformed(0, "missing header line".to_string()))?;
        let header: HashMap<String, usize> = header_line
            .split(',')
            .enumerate()
            .map(|(index, name)| (name.trim().to_lowercase(), index))
            .collect();

        let mut rows = Vec::new();
        for (line_number, line) in lines {
            let row = line
                .split(',')
                .map(|field| field.trim().parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| malformed(line_number, err.to_string()))?;

            if row.len() != header.len() {
                return Err(malformed(
                    line_number,
                    format!("expected {} values, found {}", header.len(), row.len()),
                ));
            }
            rows.push(row);
        }

        Ok(RawGeometry {
            source: source.to_path_buf(),
            header,
            rows,
        })
    }

    fn build(
        &self,
        raw: &RawGeometry,
        settings: &BladeSettings,
    ) -> Result<GeometryCase, GeometryError> {
        let r = raw.column("r")?;
        let chord = raw.column("chord")?;
        let twist = raw.column("twist")?;
        let le_x = raw.optional_column("le_x");

        if r.len() < 2 {
            return Err(GeometryError::TooFewStations { found: r.len() });
        }

        for (index, (&radius, &c)) in r.iter().zip(&chord).enumerate() {
            NonNegative::new(radius).map_err(|source| GeometryError::Invalid {
                quantity: "radius",
                index,
                source,
            })?;
            StrictlyPositive::new(c).map_err(|source| GeometryError::Invalid {
                quantity: "chord",
                index,
                source,
            })?;
        }

        if let Some(index) = r.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(GeometryError::NonIncreasingRadius { index: index + 1 });
        }

        let mid = |values: &[f64], i: usize| 0.5 * (values[i] + values[i + 1]);

        let sections: Vec<BladeSection> = (0..r.len() - 1)
            .map(|i| BladeSection {
                radius: mid(&r, i),
                span: r[i + 1] - r[i],
                chord: mid(&chord, i),
                twist: mid(&twist, i).to_radians(),
            })
            .collect();

        let sign = settings.rotation().sign();
        let lift_line = sections
            .iter()
            .enumerate()
            .map(|(i, section)| {
                let leading_edge = le_x
                    .as_ref()
                    .map_or(-0.25 * section.chord, |le_x| mid(le_x, i));
                [
                    leading_edge + settings.load_position() * section.chord,
                    sign * section.radius,
                    0.0,
                ]
            })
            .collect();

        let radius = r[r.len() - 1];
        let blade_area: f64 = sections.iter().map(|s| s.chord * s.span).sum();

        Ok(GeometryCase {
            blade_count: settings.blade_count(),
            rotation: settings.rotation(),
            radius,
            root_cutout: r[0],
            solidity: f64::from(settings.blade_count()) * blade_area / (PI * radius * radius),
            sections,
            lift_line,
        })
    }
}
