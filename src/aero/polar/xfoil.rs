//! XFOIL polar files.
//!
//! XFOIL's `PACC` output starts with a free-form preamble followed by a
//! table whose header line begins with `alpha`:
//!
//! ```text
//!    alpha    CL        CD       CDp       CM     Top_Xtr  Bot_Xtr
//!   ------ -------- --------- --------- -------- -------- --------
//!   -2.000  -0.2135   0.00562   0.00103  -0.0012   0.6710   0.4302
//! ```
//!
//! The lift-curve slope and zero-lift angle come from a least-squares line
//! through the points inside the configured angle-of-attack window; the
//! profile drag is the smallest drag coefficient in the table.

use std::{
    fs,
    path::{Path, PathBuf},
};

use uom::si::angle::degree;

use crate::casegen::Config;

use super::{PolarData, PolarError, PolarEvaluator, SectionPolar};

/// Polar evaluator for XFOIL polar files, one file per cross section.
#[derive(Debug, Clone, Copy, Default)]
pub struct XfoilPolars;

impl PolarEvaluator for XfoilPolars {
    fn evaluate(
        &self,
        config: &Config,
        rotor_speed_index: usize,
    ) -> Result<PolarData, PolarError> {
        let settings = config.polar();
        let files = settings
            .files_for(rotor_speed_index)
            .ok_or(PolarError::MissingRotorSpeed {
                index: rotor_speed_index,
            })?;

        let start = settings.alpha_start.get::<degree>();
        let end = start + settings.alpha_length.get::<degree>();

        let sections = files
            .iter()
            .zip(&settings.locations)
            .map(|(path, &location)| {
                let table = PolarTable::read(path)?;
                table.section(location, start, end)
            })
            .collect::<Result<Vec<_>, _>>()?;

        PolarData::new(sections)
    }
}

/// Angle of attack (degrees), lift and drag columns of one polar file.
#[derive(Debug, Clone, PartialEq)]
struct PolarTable {
    path: PathBuf,
    alpha: Vec<f64>,
    lift: Vec<f64>,
    drag: Vec<f64>,
}

impl PolarTable {
    fn read(path: &Path) -> Result<Self, PolarError> {
        let text = fs::read_to_string(path).map_err(|source| PolarError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    fn parse(path: &Path, text: &str) -> Result<Self, PolarError> {
        let mut lines = text.lines();

        let header: Vec<String> = lines
            .by_ref()
            .map(|line| line.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>())
            .find(|fields| fields.first().is_some_and(|first| first == "alpha"))
            .ok_or_else(|| PolarError::Malformed {
                path: path.to_path_buf(),
                context: "no `alpha` header line".to_string(),
            })?;

        let column = |name: &'static str| {
            header
                .iter()
                .position(|field| field == name)
                .ok_or_else(|| PolarError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name,
                })
        };
        let (alpha_at, lift_at, drag_at) = (column("alpha")?, column("cl")?, column("cd")?);

        let mut table = Self {
            path: path.to_path_buf(),
            alpha: Vec::new(),
            lift: Vec::new(),
            drag: Vec::new(),
        };

        // Separator and trailing lines do not parse as numeric rows.
        for line in lines {
            let Ok(row) = line
                .split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<Vec<_>, _>>()
            else {
                continue;
            };
            if row.len() < header.len() {
                continue;
            }
            table.alpha.push(row[alpha_at]);
            table.lift.push(row[lift_at]);
            table.drag.push(row[drag_at]);
        }

        if table.alpha.is_empty() {
            return Err(PolarError::Malformed {
                path: path.to_path_buf(),
                context: "polar table has no rows".to_string(),
            });
        }

        Ok(table)
    }

    /// Fits the lift curve over `[start, end]` degrees.
    fn section(&self, location: f64, start: f64, end: f64) -> Result<SectionPolar, PolarError> {
        let (mut n, mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for (&x, &y) in self.alpha.iter().zip(&self.lift) {
            if x < start - 1e-9 || x > end + 1e-9 {
                continue;
            }
            n += 1.0;
            sx += x;
            sy += y;
            sxx += x * x;
            sxy += x * y;
        }

        if n < 2.0 {
            return Err(PolarError::InsufficientData {
                path: self.path.clone(),
                found: n as usize,
                start_deg: start,
                end_deg: end,
            });
        }

        let denominator = n * sxx - sx * sx;
        let slope = (n * sxy - sx * sy) / denominator;
        if denominator.abs() < f64::EPSILON || !slope.is_finite() || slope.abs() < f64::EPSILON {
            return Err(PolarError::DegenerateFit {
                path: self.path.clone(),
            });
        }
        let intercept = (sy - slope * sx) / n;

        let drag = self.drag.iter().copied().fold(f64::INFINITY, f64::min);

        Ok(SectionPolar {
            location,
            lift_slope: slope.to_degrees(),
            zero_lift_angle: (-intercept / slope).to_radians(),
            drag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::casegen::Config;

    /// Table with `CL = 0.1 (alpha + 2)` and `CD` bottoming out at 0.006.
    const POLAR: &str = "\

       XFOIL         Version 6.99

 Calculated polar for: NACA 2412

 Mach =   0.000     Re =     1.000 e 6     Ncrit =   9.000

   alpha    CL        CD       CDp       CM     Top_Xtr  Bot_Xtr
  ------ -------- --------- --------- -------- -------- --------
  -2.000   0.0000   0.00700   0.00100  -0.0500   0.6000   0.4000
   0.000   0.2000   0.00600   0.00100  -0.0500   0.6000   0.4000
   1.000   0.3000   0.00620   0.00100  -0.0500   0.6000   0.4000
   3.000   0.5000   0.00650   0.00100  -0.0500   0.6000   0.4000
   5.000   0.7000   0.00700   0.00100  -0.0500   0.6000   0.4000
  12.000   1.1000   0.02000   0.00100  -0.0500   0.6000   0.4000
";

    #[test]
    fn fits_the_linear_lift_range() {
        let table = PolarTable::parse(Path::new("naca2412.dat"), POLAR).unwrap();
        assert_eq!(table.alpha.len(), 6);

        let section = table.section(0.75, 1.0, 5.0).unwrap();

        assert_relative_eq!(section.location, 0.75);
        assert_relative_eq!(section.lift_slope, 0.1_f64.to_degrees(), epsilon = 1e-9);
        assert_relative_eq!(section.zero_lift_angle, (-2.0_f64).to_radians(), epsilon = 1e-9);
        assert_relative_eq!(section.drag, 0.006);
    }

    #[test]
    fn too_few_points_in_the_window() {
        let table = PolarTable::parse(Path::new("naca2412.dat"), POLAR).unwrap();
        assert!(matches!(
            table.section(0.75, 6.0, 10.0),
            Err(PolarError::InsufficientData { found: 0, .. })
        ));
    }

    #[test]
    fn missing_header_is_malformed() {
        assert!(matches!(
            PolarTable::parse(Path::new("bad.dat"), "CL CD\n0.1 0.01\n"),
            Err(PolarError::Malformed { .. })
        ));
        assert!(matches!(
            PolarTable::parse(Path::new("bad.dat"), "alpha CD\n0.0 0.01\n"),
            Err(PolarError::MissingColumn { column: "cl", .. })
        ));
    }

    #[test]
    fn evaluates_configured_files_per_rotor_speed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("root.dat"), POLAR).unwrap();
        fs::write(dir.path().join("tip.dat"), POLAR).unwrap();

        let config = Config::from_toml_str(&format!(
            r#"
            [run]
            mode = "analysis"
            data_dir = {data_dir:?}
            output_dir = "out"
            geometries = ["blade.csv"]

            [sweep]
            thrust = 1000
            forward_speed = 0
            rotor_speed = [2000, 2400]

            [polar]
            files = [["tip.dat", "root.dat"]]
            locations = [0.9, 0.3]
            alpha_start = 0.0
            alpha_length = 5.0
            "#,
            data_dir = dir.path().display().to_string(),
        ))
        .unwrap();

        let polars = XfoilPolars.evaluate(&config, 1).unwrap();

        assert_eq!(polars.sections().len(), 2);
        assert_relative_eq!(polars.sections()[0].location, 0.3);
        assert_relative_eq!(polars.at(0.5).lift_slope, 0.1_f64.to_degrees(), epsilon = 1e-9);
    }

    #[test]
    fn missing_polar_file_is_reported() {
        let config = Config::from_toml_str(
            r#"
            [run]
            mode = "analysis"
            data_dir = "/nonexistent"
            output_dir = "out"
            geometries = ["blade.csv"]

            [sweep]
            thrust = 1000
            forward_speed = 0
            rotor_speed = 2000

            [polar]
            files = [["absent.dat"]]
            locations = [0.75]
            "#,
        )
        .unwrap();

        assert!(matches!(
            XfoilPolars.evaluate(&config, 0),
            Err(PolarError::Read { .. })
        ));
    }
}
