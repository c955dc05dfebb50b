//! Blade loading for one operating point.
//!
//! Hover and axial flight (zero forward speed) produce a time-invariant
//! [`ConstantLoading`]; forward flight produces a [`PeriodicLoading`] that
//! varies with blade azimuth.

mod blade_element;
mod error;

pub use blade_element::{BladeElementSolver, TrimConfig};
pub use error::LoadingError;

use serde::{Deserialize, Serialize};
use uom::{
    ConstZero,
    si::{
        angle::radian,
        angular_velocity::radian_per_second,
        f64::{Angle, AngularVelocity, Force, Velocity},
        force::newton,
        velocity::meter_per_second,
    },
};

use crate::casegen::Config;

use super::{GeometryCase, PolarData};

/// Flight condition of a single case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    pub thrust: Force,
    /// Zero for hover and axial flight.
    pub forward_speed: Velocity,
    /// Positive for ascent, negative for descent.
    pub climb_rate: Velocity,
    pub rotor_speed: AngularVelocity,
    /// Forward tilt is negative.
    pub shaft_tilt: Angle,
}

impl OperatingPoint {
    /// Which loading model applies.
    #[must_use]
    pub fn regime(&self) -> FlightRegime {
        if self.forward_speed == Velocity::ZERO {
            FlightRegime::Axial
        } else {
            FlightRegime::Forward
        }
    }

    /// Plain SI values for serialized results.
    #[must_use]
    pub fn record(&self) -> PointRecord {
        PointRecord {
            thrust: self.thrust.get::<newton>(),
            forward_speed: self.forward_speed.get::<meter_per_second>(),
            climb_rate: self.climb_rate.get::<meter_per_second>(),
            rotor_speed: self.rotor_speed.get::<radian_per_second>(),
            shaft_tilt: self.shaft_tilt.get::<radian>(),
        }
    }
}

/// An [`OperatingPoint`] in SI base units (N, m/s, rad/s, rad).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub thrust: f64,
    pub forward_speed: f64,
    pub climb_rate: f64,
    pub rotor_speed: f64,
    pub shaft_tilt: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlightRegime {
    /// Hover, climb or descent without forward speed.
    Axial,
    Forward,
}

/// Time-invariant blade loading.
///
/// Per-section vectors run from root to tip. Forces are per blade and
/// integrated over each section's span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantLoading {
    /// Rotor thrust, in newtons.
    pub thrust: f64,
    /// Shaft power, in watts.
    pub power: f64,
    /// Root collective pitch, in radians.
    pub collective: f64,
    /// Inflow ratio at each section.
    pub inflow: Vec<f64>,
    /// Geometric angle of attack at each section, in radians.
    pub angle_of_attack: Vec<f64>,
    /// Sectional lift, in newtons.
    pub lift: Vec<f64>,
    /// Sectional profile drag, in newtons.
    pub drag: Vec<f64>,
}

impl ConstantLoading {
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.lift.len()
    }
}

/// Blade loading over one rotor revolution.
///
/// `lift[k][i]` is the load on section `i` at azimuth `azimuth[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicLoading {
    /// Revolution-averaged rotor thrust, in newtons.
    pub thrust: f64,
    /// Revolution-averaged shaft power, in watts.
    pub power: f64,
    /// Root collective pitch, in radians.
    pub collective: f64,
    /// Uniform inflow ratio through the disk.
    pub inflow_ratio: f64,
    pub advance_ratio: f64,
    /// Blade azimuth stations, in radians.
    pub azimuth: Vec<f64>,
    pub lift: Vec<Vec<f64>>,
    pub drag: Vec<Vec<f64>>,
}

impl PeriodicLoading {
    /// Sections per azimuth station, or `None` if the rows disagree.
    #[must_use]
    pub fn section_count(&self) -> Option<usize> {
        let count = self.lift.first().map_or(0, Vec::len);
        let consistent = self.lift.iter().chain(&self.drag).all(|row| row.len() == count)
            && self.lift.len() == self.azimuth.len()
            && self.drag.len() == self.azimuth.len();
        consistent.then_some(count)
    }
}

/// Loading of one case, tagged by flight regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "regime", rename_all = "kebab-case")]
pub enum LoadingResult {
    Constant(ConstantLoading),
    Periodic(PeriodicLoading),
}

impl LoadingResult {
    /// Sections per blade, or `None` if the loading is internally inconsistent.
    #[must_use]
    pub fn section_count(&self) -> Option<usize> {
        match self {
            LoadingResult::Constant(loading) => {
                let count = loading.section_count();
                (loading.drag.len() == count).then_some(count)
            }
            LoadingResult::Periodic(loading) => loading.section_count(),
        }
    }

    #[must_use]
    pub fn regime(&self) -> FlightRegime {
        match self {
            LoadingResult::Constant(_) => FlightRegime::Axial,
            LoadingResult::Periodic(_) => FlightRegime::Forward,
        }
    }

    /// Rotor thrust, in newtons.
    #[must_use]
    pub fn thrust(&self) -> f64 {
        match self {
            LoadingResult::Constant(loading) => loading.thrust,
            LoadingResult::Periodic(loading) => loading.thrust,
        }
    }
}

/// Computes blade loading for an operating point.
pub trait LoadingSolver {
    /// Loading in hover or axial flight.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadingError`] if the rotor cannot be trimmed or the
    /// result is not physical.
    fn hover(
        &self,
        config: &Config,
        geometry: &GeometryCase,
        polar: &PolarData,
        point: &OperatingPoint,
    ) -> Result<ConstantLoading, LoadingError>;

    /// Loading in forward flight.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadingError`] if the inflow or trim iteration fails.
    fn forward_flight(
        &self,
        config: &Config,
        geometry: &GeometryCase,
        polar: &PolarData,
        point: &OperatingPoint,
    ) -> Result<PeriodicLoading, LoadingError>;

    /// Dispatches on the point's [`FlightRegime`].
    ///
    /// # Errors
    ///
    /// Propagates the error of the selected model.
    fn solve(
        &self,
        config: &Config,
        geometry: &GeometryCase,
        polar: &PolarData,
        point: &OperatingPoint,
    ) -> Result<LoadingResult, LoadingError> {
        match point.regime() {
            FlightRegime::Axial => self
                .hover(config, geometry, polar, point)
                .map(LoadingResult::Constant),
            FlightRegime::Forward => self
                .forward_flight(config, geometry, polar, point)
                .map(LoadingResult::Periodic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::{angle::degree, angular_velocity::revolution_per_minute};

    fn point(forward_speed: f64) -> OperatingPoint {
        OperatingPoint {
            thrust: Force::new::<newton>(1000.0),
            forward_speed: Velocity::new::<meter_per_second>(forward_speed),
            climb_rate: Velocity::ZERO,
            rotor_speed: AngularVelocity::new::<revolution_per_minute>(2000.0),
            shaft_tilt: Angle::new::<degree>(0.0),
        }
    }

    #[test]
    fn zero_forward_speed_is_axial_flight() {
        assert_eq!(point(0.0).regime(), FlightRegime::Axial);
        assert_eq!(point(0.1).regime(), FlightRegime::Forward);
    }

    #[test]
    fn periodic_section_count_requires_rectangular_rows() {
        let mut loading = PeriodicLoading {
            thrust: 0.0,
            power: 0.0,
            collective: 0.0,
            inflow_ratio: 0.0,
            advance_ratio: 0.0,
            azimuth: vec![0.0, 1.0],
            lift: vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]],
            drag: vec![vec![0.1, 0.2, 0.3], vec![0.1, 0.2, 0.3]],
        };
        assert_eq!(LoadingResult::Periodic(loading.clone()).section_count(), Some(3));

        loading.lift[1].pop();
        assert_eq!(loading.section_count(), None);
    }

    #[test]
    fn records_use_si_units() {
        let record = point(10.0).record();
        assert!((record.rotor_speed - 2000.0 * std::f64::consts::PI / 30.0).abs() < 1e-9);
        assert_eq!(record.thrust, 1000.0);
    }
}
