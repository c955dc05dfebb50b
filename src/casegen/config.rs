//! Validated run configuration.
//!
//! A [`ConfigFile`] is read from TOML as written by the user; [`Config`] is
//! the immutable, validated form the rest of the crate works with.
//! Scalar-or-list values are normalized to sequences here, once.

mod error;
mod file;

pub use error::ConfigError;
pub use file::{
    ConfigFile, FailurePolicy, FileNames, NamelistSection, NoiseModel, NoiseSection, ObserverGrid,
    OneOrMany, OperatingMode, PolarSection, RotorSection, RunSection, SweepSection,
};

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use uom::si::{
    angle::degree,
    f64::{Angle, MassDensity, Velocity},
    mass_density::kilogram_per_cubic_meter,
    velocity::meter_per_second,
};

use crate::{
    aero::{BladeSettings, CASE_LIST_FILE_NAME},
    support::constraint::{ConstraintError, StrictlyPositive, UnitInterval},
};

use super::{layout::SNAPSHOT_FILE_NAME, polar_cache::keyed_rotor_speeds, sweep::Sweep};

/// A geometry source and the identifier derived from its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometrySource {
    pub id: String,
    pub path: PathBuf,
}

/// Physical settings shared by the reference loading solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroSettings {
    pub density: MassDensity,
    /// Not used by the loading solvers. It is carried for [`CaseWriter`]
    /// implementations that write the simulator's environment namelist.
    ///
    /// [`CaseWriter`]: crate::aero::CaseWriter
    pub speed_of_sound: Velocity,
    pub tip_loss: bool,
    pub trim: bool,
    pub collective: Angle,
    pub azimuth_steps: usize,
}

/// Resolved polar table locations.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarSettings {
    /// One row per rotor speed (or a single shared row), one file per location.
    pub files: Vec<Vec<PathBuf>>,
    pub locations: Vec<f64>,
    pub alpha_start: Angle,
    pub alpha_length: Angle,
}

impl PolarSettings {
    /// Polar files for the rotor speed at `index`.
    ///
    /// A single configured row is shared by every rotor speed.
    #[must_use]
    pub fn files_for(&self, index: usize) -> Option<&[PathBuf]> {
        match self.files.as_slice() {
            [shared] => Some(shared),
            rows => rows.get(index).map(Vec::as_slice),
        }
    }
}

/// Optional outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    /// Broadband noise model, if noise data is written.
    pub noise: Option<NoiseModel>,
    pub namelist: bool,
    pub snapshot: bool,
}

/// Validated, immutable run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    file: ConfigFile,
    geometries: Vec<GeometrySource>,
    sweep: Sweep,
    blade: BladeSettings,
    aero: AeroSettings,
    polar: PolarSettings,
    features: Features,
}

impl Config {
    /// Reads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the text cannot be parsed or validated.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        Self::from_file(file)
    }

    /// Validates a parsed configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violated rule.
    pub fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let geometries = geometry_sources(&file.run)?;

        let sweep = Sweep::from_section(&file.sweep)?;
        keyed_rotor_speeds(sweep.rotor_speeds())?;
        match file.run.mode {
            OperatingMode::Design => sweep.check_design(geometries.len())?,
            OperatingMode::Analysis => sweep.check_analysis()?,
        }

        let rotor = &file.rotor;
        let blade = BladeSettings::new(rotor.load_position, rotor.blades, rotor.rotation)
            .map_err(|source| {
                let field = if rotor.blades == 0 {
                    "rotor.blades"
                } else {
                    "rotor.load_position"
                };
                ConfigError::Invalid { field, source }
            })?;

        let aero = AeroSettings {
            density: MassDensity::new::<kilogram_per_cubic_meter>(positive(
                "rotor.density",
                rotor.density,
            )?),
            speed_of_sound: Velocity::new::<meter_per_second>(positive(
                "rotor.speed_of_sound",
                rotor.speed_of_sound,
            )?),
            tip_loss: rotor.tip_loss,
            trim: rotor.trim,
            collective: Angle::new::<degree>(finite("rotor.collective", rotor.collective)?),
            azimuth_steps: StrictlyPositive::new(rotor.azimuth_steps)
                .map_err(|source| ConfigError::Invalid {
                    field: "rotor.azimuth_steps",
                    source,
                })?
                .into_inner(),
        };

        let polar = polar_settings(&file.run.data_dir, &file.polar, sweep.rotor_speeds().len())?;

        positive("namelist.revolutions", file.namelist.revolutions)?;

        let features = Features {
            noise: file.noise.enabled.then_some(file.noise.model),
            namelist: file.namelist.enabled,
            snapshot: file.run.save_snapshot,
        };

        Ok(Self {
            file,
            geometries,
            sweep,
            blade,
            aero,
            polar,
            features,
        })
    }

    /// The configuration as it was read, before normalization.
    #[must_use]
    pub fn file(&self) -> &ConfigFile {
        &self.file
    }

    #[must_use]
    pub fn mode(&self) -> OperatingMode {
        self.file.run.mode
    }

    #[must_use]
    pub fn failure_policy(&self) -> FailurePolicy {
        self.file.run.failure_policy
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.file.run.output_dir
    }

    #[must_use]
    pub fn file_names(&self) -> &FileNames {
        &self.file.files
    }

    /// Geometry sources in processing order.
    #[must_use]
    pub fn geometries(&self) -> &[GeometrySource] {
        &self.geometries
    }

    #[must_use]
    pub fn sweep(&self) -> &Sweep {
        &self.sweep
    }

    #[must_use]
    pub fn blade(&self) -> &BladeSettings {
        &self.blade
    }

    #[must_use]
    pub fn aero(&self) -> &AeroSettings {
        &self.aero
    }

    #[must_use]
    pub fn polar(&self) -> &PolarSettings {
        &self.polar
    }

    #[must_use]
    pub fn namelist(&self) -> &NamelistSection {
        &self.file.namelist
    }

    #[must_use]
    pub fn features(&self) -> Features {
        self.features
    }
}

fn geometry_sources(run: &RunSection) -> Result<Vec<GeometrySource>, ConfigError> {
    if run.geometries.is_empty() {
        return Err(ConfigError::NoGeometries);
    }

    let mut seen = HashSet::new();
    run.geometries
        .iter()
        .map(|relative| {
            let id = relative
                .file_stem()
                .and_then(|stem| stem.to_str())
                .filter(|stem| !stem.is_empty())
                .ok_or_else(|| ConfigError::GeometryId {
                    path: relative.clone(),
                })?
                .to_string();

            if !is_directory_name(&id) {
                return Err(ConfigError::ReservedGeometryId { id });
            }
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateGeometryId { id });
            }

            Ok(GeometrySource {
                id,
                path: run.data_dir.join(relative),
            })
        })
        .collect()
}

/// Whether `id` names a fresh directory directly below the output root.
fn is_directory_name(id: &str) -> bool {
    !matches!(id, "." | ".." | CASE_LIST_FILE_NAME | SNAPSHOT_FILE_NAME)
        && !id.contains(['/', '\\'])
}

fn polar_settings(
    data_dir: &Path,
    section: &PolarSection,
    rotor_speeds: usize,
) -> Result<PolarSettings, ConfigError> {
    if !section.files.is_empty() {
        if section.files.len() != 1 && section.files.len() != rotor_speeds {
            return Err(ConfigError::PolarShape {
                context: format!(
                    "{} file lists for {rotor_speeds} rotor speeds",
                    section.files.len()
                ),
            });
        }
        if let Some(row) = section
            .files
            .iter()
            .find(|row| row.len() != section.locations.len())
        {
            return Err(ConfigError::PolarShape {
                context: format!(
                    "{} files for {} section locations",
                    row.len(),
                    section.locations.len()
                ),
            });
        }
    }

    for &location in &section.locations {
        UnitInterval::new(location).map_err(|source| ConfigError::Invalid {
            field: "polar.locations",
            source,
        })?;
    }

    Ok(PolarSettings {
        files: section
            .files
            .iter()
            .map(|row| row.iter().map(|file| data_dir.join(file)).collect())
            .collect(),
        locations: section.locations.clone(),
        alpha_start: Angle::new::<degree>(finite("polar.alpha_start", section.alpha_start)?),
        alpha_length: Angle::new::<degree>(positive("polar.alpha_length", section.alpha_length)?),
    })
}

fn positive(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    StrictlyPositive::new(value)
        .map(|value| value.into_inner())
        .map_err(|source| ConfigError::Invalid { field, source })
}

pub(super) fn finite(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            field,
            source: ConstraintError::NotANumber,
        })
    }
}
