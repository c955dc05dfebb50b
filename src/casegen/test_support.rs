use std::{
    cell::RefCell,
    collections::HashMap,
    f64::consts::{FRAC_PI_2, PI, TAU},
    fs, io,
    path::{Path, PathBuf},
};

use uom::si::{
    angular_velocity::revolution_per_minute, f64::AngularVelocity, force::newton,
};

use crate::aero::{
    BladeSection, BladeSettings, CaseContext, CaseWriter, ConstantLoading, FlightRegime,
    GeometryCase, GeometryError, GeometryLoader, LoadingError, LoadingSolver, OperatingPoint,
    PeriodicLoading, PolarData, PolarError, PolarEvaluator, RawGeometry, Rotation, SectionPolar,
    WriteError,
};

use super::{Config, NoiseModel};

/// Builds and validates a configuration writing below `dir/cases`.
///
/// `run_extra` is placed in the `[run]` table; `body` follows it and holds
/// the `[sweep]` table and any other sections.
pub(crate) fn config(
    dir: &Path,
    mode: &str,
    geometries: &[&str],
    run_extra: &str,
    body: &str,
) -> Config {
    let geometries = geometries
        .iter()
        .map(|name| format!("{name:?}"))
        .collect::<Vec<_>>()
        .join(", ");
    let output = dir.join("cases");
    let text = format!(
        "[run]\nmode = {mode:?}\noutput_dir = {:?}\ngeometries = [{geometries}]\n{run_extra}\n\n{body}\n",
        output.display().to_string(),
    );
    Config::from_toml_str(&text).unwrap()
}

/// An analysis-mode configuration for a single geometry `blade.csv`.
pub(crate) fn analysis_config(dir: &Path, sweep: &str) -> Config {
    config(dir, "analysis", &["blade.csv"], "", &format!("[sweep]\n{sweep}"))
}

/// A uniform blade with `sections` equal elements and a 1 m tip radius.
pub(crate) fn stub_geometry(sections: usize) -> GeometryCase {
    let root = 0.2;
    let span = (1.0 - root) / sections as f64;
    let sections: Vec<BladeSection> = (0..sections)
        .map(|i| BladeSection {
            radius: root + span * (i as f64 + 0.5),
            span,
            chord: 0.08,
            twist: 0.0,
        })
        .collect();
    let lift_line = sections.iter().map(|s| [0.02, s.radius, 0.0]).collect();

    GeometryCase {
        blade_count: 2,
        rotation: Rotation::CounterClockwise,
        radius: 1.0,
        root_cutout: root,
        solidity: 0.05,
        sections,
        lift_line,
    }
}

/// Returns [`stub_geometry`] for every source whose name does not contain
/// `missing`.
#[derive(Debug)]
pub(crate) struct StubGeometry {
    sections: usize,
    loaded: RefCell<Vec<PathBuf>>,
}

impl Default for StubGeometry {
    fn default() -> Self {
        Self {
            sections: 3,
            loaded: RefCell::default(),
        }
    }
}

impl StubGeometry {
    pub(crate) fn loaded(&self) -> Vec<PathBuf> {
        self.loaded.borrow().clone()
    }
}

impl GeometryLoader for StubGeometry {
    fn parse(&self, source: &Path) -> Result<RawGeometry, GeometryError> {
        self.loaded.borrow_mut().push(source.to_path_buf());
        if source.to_string_lossy().contains("missing") {
            return Err(GeometryError::Read {
                path: source.to_path_buf(),
                source: io::Error::from(io::ErrorKind::NotFound),
            });
        }
        Ok(RawGeometry {
            source: source.to_path_buf(),
            header: HashMap::new(),
            rows: Vec::new(),
        })
    }

    fn build(
        &self,
        _raw: &RawGeometry,
        _settings: &BladeSettings,
    ) -> Result<GeometryCase, GeometryError> {
        Ok(stub_geometry(self.sections))
    }
}

/// Thin-airfoil polars that record which rotor speeds were evaluated.
#[derive(Debug, Default)]
pub(crate) struct CountingPolars {
    calls: RefCell<Vec<usize>>,
    fail_at: Option<usize>,
}

impl CountingPolars {
    pub(crate) fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    /// Rotor speed indices in evaluation order.
    pub(crate) fn calls(&self) -> Vec<usize> {
        self.calls.borrow().clone()
    }
}

impl PolarEvaluator for CountingPolars {
    fn evaluate(&self, _config: &Config, rotor_speed_index: usize) -> Result<PolarData, PolarError> {
        self.calls.borrow_mut().push(rotor_speed_index);
        if self.fail_at == Some(rotor_speed_index) {
            return Err(PolarError::Malformed {
                path: PathBuf::from("stub.dat"),
                context: "injected failure".to_string(),
            });
        }
        PolarData::new(vec![SectionPolar {
            location: 0.75,
            lift_slope: TAU,
            zero_lift_angle: 0.0,
            drag: 0.01,
        }])
    }
}

/// Returns loading proportional to the target thrust and records each call.
#[derive(Debug, Default)]
pub(crate) struct RecordingSolver {
    calls: RefCell<Vec<(FlightRegime, f64, f64)>>,
    fail_at_thrust: Option<f64>,
    extra_sections: usize,
}

impl RecordingSolver {
    /// Fails every case whose target thrust equals `thrust` newtons.
    pub(crate) fn failing_at_thrust(thrust: f64) -> Self {
        Self {
            fail_at_thrust: Some(thrust),
            ..Self::default()
        }
    }

    /// Returns loading with `extra` more sections than the geometry has.
    pub(crate) fn with_extra_sections(extra: usize) -> Self {
        Self {
            extra_sections: extra,
            ..Self::default()
        }
    }

    pub(crate) fn regimes(&self) -> Vec<FlightRegime> {
        self.calls.borrow().iter().map(|&(regime, ..)| regime).collect()
    }

    /// Target thrust in newtons of each call.
    pub(crate) fn thrusts(&self) -> Vec<f64> {
        self.calls.borrow().iter().map(|&(_, thrust, _)| thrust).collect()
    }

    /// Rotor speed in rpm of each call.
    pub(crate) fn rotor_speeds(&self) -> Vec<f64> {
        self.calls.borrow().iter().map(|&(.., rpm)| rpm).collect()
    }

    fn record(
        &self,
        regime: FlightRegime,
        geometry: &GeometryCase,
        point: &OperatingPoint,
    ) -> Result<(f64, usize), LoadingError> {
        let thrust = point.thrust.get::<newton>();
        self.calls.borrow_mut().push((
            regime,
            thrust,
            point.rotor_speed.get::<revolution_per_minute>(),
        ));
        if self.fail_at_thrust == Some(thrust) {
            return Err(LoadingError::NotConverged {
                residual: thrust,
                iters: 0,
            });
        }
        Ok((thrust, geometry.section_count() + self.extra_sections))
    }
}

impl LoadingSolver for RecordingSolver {
    fn hover(
        &self,
        _config: &Config,
        geometry: &GeometryCase,
        _polar: &PolarData,
        point: &OperatingPoint,
    ) -> Result<ConstantLoading, LoadingError> {
        let (thrust, n) = self.record(FlightRegime::Axial, geometry, point)?;
        Ok(ConstantLoading {
            thrust,
            power: 0.1 * thrust,
            collective: 0.1,
            inflow: vec![0.05; n],
            angle_of_attack: vec![0.05; n],
            lift: vec![thrust / n as f64; n],
            drag: vec![0.01; n],
        })
    }

    fn forward_flight(
        &self,
        _config: &Config,
        geometry: &GeometryCase,
        _polar: &PolarData,
        point: &OperatingPoint,
    ) -> Result<PeriodicLoading, LoadingError> {
        let (thrust, n) = self.record(FlightRegime::Forward, geometry, point)?;
        let azimuth = vec![0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];
        Ok(PeriodicLoading {
            thrust,
            power: 0.1 * thrust,
            collective: 0.1,
            inflow_ratio: 0.05,
            advance_ratio: 0.1,
            lift: vec![vec![thrust / n as f64; n]; azimuth.len()],
            drag: vec![vec![0.01; n]; azimuth.len()],
            azimuth,
        })
    }
}

/// Writes a small marker file per call instead of simulator patches.
#[derive(Debug, Default)]
pub(crate) struct MarkerWriter {
    calls: RefCell<Vec<&'static str>>,
    fail_on: Option<&'static str>,
}

impl MarkerWriter {
    /// Fails every call of the given kind, e.g. `"namelist"`.
    pub(crate) fn failing_on(kind: &'static str) -> Self {
        Self {
            fail_on: Some(kind),
            ..Self::default()
        }
    }

    /// Kinds of files written, in call order.
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn mark(&self, kind: &'static str, path: PathBuf, contents: String) -> Result<(), WriteError> {
        self.calls.borrow_mut().push(kind);
        if self.fail_on == Some(kind) {
            return Err(WriteError::Unsupported {
                what: kind,
                context: "injected failure".to_string(),
            });
        }
        fs::write(&path, contents).map_err(|source| WriteError::Io { path, source })
    }
}

impl CaseWriter for MarkerWriter {
    fn write_geometry(&self, name: &str, geometry: &GeometryCase, dir: &Path) -> Result<(), WriteError> {
        self.mark(
            "geometry",
            dir.join(name),
            format!("sections {}", geometry.section_count()),
        )
    }

    fn write_compact_geometry(
        &self,
        name: &str,
        section_count: usize,
        _lift_line: &[[f64; 3]],
        dir: &Path,
    ) -> Result<(), WriteError> {
        self.mark("compact_geometry", dir.join(name), format!("sections {section_count}"))
    }

    fn write_constant_loading(
        &self,
        name: &str,
        loading: &ConstantLoading,
        _section_count: usize,
        dir: &Path,
    ) -> Result<(), WriteError> {
        self.mark("constant_loading", dir.join(name), format!("thrust {}", loading.thrust))
    }

    fn write_periodic_loading(
        &self,
        name: &str,
        loading: &PeriodicLoading,
        _section_count: usize,
        rotor_speed: AngularVelocity,
        dir: &Path,
    ) -> Result<(), WriteError> {
        self.mark(
            "periodic_loading",
            dir.join(name),
            format!(
                "thrust {} rpm {}",
                loading.thrust,
                rotor_speed.get::<revolution_per_minute>()
            ),
        )
    }

    fn write_namelist(
        &self,
        config: &Config,
        case: &CaseContext<'_>,
        dir: &Path,
    ) -> Result<(), WriteError> {
        self.mark(
            "namelist",
            dir.join(&config.file_names().namelist),
            format!("geometry {}", case.geometry_index),
        )
    }

    fn write_noise(
        &self,
        model: NoiseModel,
        _config: &Config,
        case: &CaseContext<'_>,
        dir: &Path,
    ) -> Result<(), WriteError> {
        let file = match model {
            NoiseModel::Pegg => "Pegg.dat",
            NoiseModel::Bpm => "BPM.dat",
        };
        self.mark("noise", dir.join(file), format!("thrust {}", case.loading.thrust()))
    }
}
