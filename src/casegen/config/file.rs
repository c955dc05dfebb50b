//! On-disk configuration format.
//!
//! These types mirror the TOML file one to one and carry no invariants;
//! [`Config`](super::Config) is the validated form.
//!
//! ```toml
//! [run]
//! mode = "analysis"
//! data_dir = "rotor"
//! output_dir = "rotor/cases"
//! geometries = ["blade_a.csv", "blade_b.csv"]
//!
//! [sweep]
//! thrust = [500, 600]          # N
//! forward_speed = [0, 30]      # m/s
//! climb_rate = 0               # m/s
//! rotor_speed = 2000           # rpm
//! shaft_tilt = -2              # deg, forward tilt is negative
//!
//! [polar]
//! files = [["naca0012_re1e6.dat"]]
//! locations = [0.75]
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::aero::Rotation;

/// Complete configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub run: RunSection,
    #[serde(default)]
    pub files: FileNames,
    pub sweep: SweepSection,
    #[serde(default)]
    pub rotor: RotorSection,
    #[serde(default)]
    pub polar: PolarSection,
    #[serde(default)]
    pub noise: NoiseSection,
    #[serde(default)]
    pub namelist: NamelistSection,
}

/// How the geometries relate to the operating conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperatingMode {
    /// One operating condition per geometry.
    Design,
    /// The full operating-condition sweep for every geometry.
    Analysis,
}

/// What to do when a loading, writing, or case-directory step fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the run at the first failure.
    #[default]
    AbortRun,
    /// Drop the failing geometry's output and continue with the next geometry.
    SkipGeometry,
    /// Drop only the failing case and continue the sweep.
    SkipCase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    pub mode: OperatingMode,

    /// Directory that geometry and polar file names are relative to.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Root of the generated case tree.
    pub output_dir: PathBuf,

    /// Geometry source files, processed in order.
    pub geometries: Vec<PathBuf>,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Write `MainDict.json` into the output root after every geometry.
    #[serde(default)]
    pub save_snapshot: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Base names of the files written into every case directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileNames {
    pub geometry: String,
    pub compact_geometry: String,
    pub loading: String,
    /// Namelist file read by the simulator in each case directory.
    pub namelist: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            geometry: "Geom".into(),
            compact_geometry: "CompactGeom".into(),
            loading: "Load".into(),
            namelist: "case.nam".into(),
        }
    }
}

/// A value given either as a single number or as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(f64),
    Many(Vec<f64>),
}

impl OneOrMany {
    /// Normalizes to an ordered sequence.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            OneOrMany::One(value) => vec![*value],
            OneOrMany::Many(values) => values.clone(),
        }
    }
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::One(0.0)
    }
}

/// Operating-condition axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepSection {
    /// Rotor thrust, in newtons.
    pub thrust: OneOrMany,
    /// Forward flight speed, in meters per second. Zero selects hover/axial flight.
    pub forward_speed: OneOrMany,
    /// Climb rate, in meters per second. Negative for descent.
    #[serde(default)]
    pub climb_rate: OneOrMany,
    /// Rotor speed, in revolutions per minute.
    pub rotor_speed: OneOrMany,
    /// Shaft tilt, in degrees. Forward tilt is negative.
    #[serde(default)]
    pub shaft_tilt: OneOrMany,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RotorSection {
    pub blades: u32,
    /// Loading line position from the leading edge, as a fraction of chord.
    pub load_position: f64,
    pub rotation: Rotation,
    /// Trim collective pitch to the target thrust; otherwise fly `collective`.
    pub trim: bool,
    /// Fixed collective pitch, in degrees, used when `trim` is off.
    pub collective: f64,
    /// Apply Prandtl's tip-loss factor in hover and axial flight.
    pub tip_loss: bool,
    /// Air density, in kg/m³.
    pub density: f64,
    /// Speed of sound, in m/s.
    pub speed_of_sound: f64,
    /// Azimuthal stations per revolution for periodic loading.
    pub azimuth_steps: usize,
}

impl Default for RotorSection {
    fn default() -> Self {
        Self {
            blades: 2,
            load_position: 0.25,
            rotation: Rotation::CounterClockwise,
            trim: true,
            collective: 1.0,
            tip_loss: true,
            density: 1.225,
            speed_of_sound: 340.0,
            azimuth_steps: 72,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolarSection {
    /// Polar tables, one list per rotor speed (or a single list shared by
    /// all rotor speeds), each holding one file per cross-section location.
    pub files: Vec<Vec<PathBuf>>,
    /// Non-dimensional radial location (r/R) of each cross section.
    pub locations: Vec<f64>,
    /// First angle of attack of the lift-curve fit window, in degrees.
    pub alpha_start: f64,
    /// Width of the lift-curve fit window, in degrees.
    pub alpha_length: f64,
}

impl Default for PolarSection {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            locations: Vec::new(),
            alpha_start: 1.0,
            alpha_length: 4.0,
        }
    }
}

/// Broadband noise prediction method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoiseModel {
    Pegg,
    #[default]
    Bpm,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoiseSection {
    pub enabled: bool,
    pub model: NoiseModel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamelistSection {
    pub enabled: bool,
    /// Case duration, in shaft revolutions.
    pub revolutions: f64,
    /// Observer time samples per case.
    pub sample_count: u32,
    pub observer: ObserverGrid,
}

impl Default for NamelistSection {
    fn default() -> Self {
        Self {
            enabled: false,
            revolutions: 1.0,
            sample_count: 1 << 14,
            observer: ObserverGrid::default(),
        }
    }
}

/// Observer placement for the namelist writer. Lengths in meters, angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", deny_unknown_fields)]
pub enum ObserverGrid {
    Single {
        x: f64,
        y: f64,
        z: f64,
    },
    Rectangular {
        nx: u32,
        x_min: f64,
        x_max: f64,
        ny: u32,
        y_min: f64,
        y_max: f64,
        nz: u32,
        z_min: f64,
        z_max: f64,
    },
    Spherical {
        radius: f64,
        n_theta: u32,
        theta_min: f64,
        theta_max: f64,
        n_psi: u32,
        psi_min: f64,
        psi_max: f64,
    },
}

impl Default for ObserverGrid {
    fn default() -> Self {
        ObserverGrid::Spherical {
            radius: 30.48,
            n_theta: 1,
            theta_min: 0.0,
            theta_max: 0.0,
            n_psi: 4,
            psi_min: -45.0,
            psi_max: 0.0,
        }
    }
}
