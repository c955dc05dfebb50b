//! Operating-condition axes and their expansion into operating points.

use std::{collections::HashSet, fmt};

use uom::si::{
    angle::degree,
    angular_velocity::revolution_per_minute,
    f64::{Angle, AngularVelocity, Force, Velocity},
    force::newton,
    velocity::meter_per_second,
};

use crate::{
    aero::OperatingPoint,
    support::constraint::{NonNegative, StrictlyPositive},
};

use super::{
    config::{ConfigError, SweepSection, finite},
    label::case_label,
};

/// One of the five operating-condition axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Thrust,
    ForwardSpeed,
    ClimbRate,
    RotorSpeed,
    ShaftTilt,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Thrust => "thrust",
            Axis::ForwardSpeed => "forward_speed",
            Axis::ClimbRate => "climb_rate",
            Axis::RotorSpeed => "rotor_speed",
            Axis::ShaftTilt => "shaft_tilt",
        })
    }
}

/// Validated sweep axes. Every axis holds at least one value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    thrust: Vec<Force>,
    forward_speed: Vec<Velocity>,
    climb_rate: Vec<Velocity>,
    rotor_speed: Vec<AngularVelocity>,
    shaft_tilt: Vec<Angle>,
}

impl Sweep {
    /// Normalizes and checks the configured axes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if an axis is empty or holds a non-physical value.
    pub fn from_section(section: &SweepSection) -> Result<Self, ConfigError> {
        let thrust = axis(Axis::Thrust, section.thrust.to_vec())?
            .into_iter()
            .map(|value| {
                StrictlyPositive::new(value)
                    .map(|value| Force::new::<newton>(value.into_inner()))
                    .map_err(|source| ConfigError::Invalid {
                        field: "sweep.thrust",
                        source,
                    })
            })
            .collect::<Result<_, _>>()?;

        let forward_speed = axis(Axis::ForwardSpeed, section.forward_speed.to_vec())?
            .into_iter()
            .map(|value| {
                NonNegative::new(value)
                    .map(|value| Velocity::new::<meter_per_second>(value.into_inner()))
                    .map_err(|source| ConfigError::Invalid {
                        field: "sweep.forward_speed",
                        source,
                    })
            })
            .collect::<Result<_, _>>()?;

        let climb_rate = axis(Axis::ClimbRate, section.climb_rate.to_vec())?
            .into_iter()
            .map(|value| finite("sweep.climb_rate", value).map(Velocity::new::<meter_per_second>))
            .collect::<Result<_, _>>()?;

        let rotor_speed = axis(Axis::RotorSpeed, section.rotor_speed.to_vec())?
            .into_iter()
            .map(|value| {
                StrictlyPositive::new(value)
                    .map(|value| AngularVelocity::new::<revolution_per_minute>(value.into_inner()))
                    .map_err(|source| ConfigError::Invalid {
                        field: "sweep.rotor_speed",
                        source,
                    })
            })
            .collect::<Result<_, _>>()?;

        let shaft_tilt = axis(Axis::ShaftTilt, section.shaft_tilt.to_vec())?
            .into_iter()
            .map(|value| finite("sweep.shaft_tilt", value).map(Angle::new::<degree>))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            thrust,
            forward_speed,
            climb_rate,
            rotor_speed,
            shaft_tilt,
        })
    }

    #[must_use]
    pub fn rotor_speeds(&self) -> &[AngularVelocity] {
        &self.rotor_speed
    }

    fn lengths(&self) -> [(Axis, usize); 5] {
        [
            (Axis::Thrust, self.thrust.len()),
            (Axis::ForwardSpeed, self.forward_speed.len()),
            (Axis::ClimbRate, self.climb_rate.len()),
            (Axis::RotorSpeed, self.rotor_speed.len()),
            (Axis::ShaftTilt, self.shaft_tilt.len()),
        ]
    }

    /// Checks that every axis has one value or one value per geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AxisLength`] for the first axis that does not.
    pub fn check_design(&self, geometries: usize) -> Result<(), ConfigError> {
        match self
            .lengths()
            .into_iter()
            .find(|&(_, len)| len != 1 && len != geometries)
        {
            Some((axis, len)) => Err(ConfigError::AxisLength {
                axis,
                len,
                geometries,
            }),
            None => Ok(()),
        }
    }

    /// Checks that shaft tilts can be resolved and that every sweep point
    /// has its own case label.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TiltIndexing`] or [`ConfigError::DuplicateCaseLabel`].
    pub fn check_analysis(&self) -> Result<(), ConfigError> {
        if self.shaft_tilt.len() != 1 && self.shaft_tilt.len() != self.forward_speed.len() {
            return Err(ConfigError::TiltIndexing {
                tilts: self.shaft_tilt.len(),
                forward_speeds: self.forward_speed.len(),
            });
        }

        let mut labels = HashSet::new();
        for point in self.analysis_points() {
            let label = case_label(&point);
            if !labels.insert(label.clone()) {
                return Err(ConfigError::DuplicateCaseLabel { label });
            }
        }
        Ok(())
    }

    /// Resolves the design-mode operating point of the geometry at `index`.
    ///
    /// An axis with one value applies to every geometry; longer axes are
    /// indexed by geometry.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for an axis the sweep was not
    /// validated against with [`check_design`](Self::check_design).
    #[must_use]
    pub fn design_point(&self, index: usize) -> OperatingPoint {
        OperatingPoint {
            thrust: pick(&self.thrust, index),
            forward_speed: pick(&self.forward_speed, index),
            climb_rate: pick(&self.climb_rate, index),
            rotor_speed: pick(&self.rotor_speed, index),
            shaft_tilt: pick(&self.shaft_tilt, index),
        }
    }

    /// Expands the analysis-mode sweep in case creation order.
    ///
    /// Thrust is the outermost loop, then forward speed, climb rate and
    /// rotor speed. Several shaft tilts are paired with forward speeds by
    /// position; a single tilt applies to every point.
    #[must_use]
    pub fn analysis_points(&self) -> Vec<OperatingPoint> {
        let mut points = Vec::with_capacity(self.analysis_len());
        for &thrust in &self.thrust {
            for (position, &forward_speed) in self.forward_speed.iter().enumerate() {
                let shaft_tilt = pick(&self.shaft_tilt, position);
                for &climb_rate in &self.climb_rate {
                    for &rotor_speed in &self.rotor_speed {
                        points.push(OperatingPoint {
                            thrust,
                            forward_speed,
                            climb_rate,
                            rotor_speed,
                            shaft_tilt,
                        });
                    }
                }
            }
        }
        points
    }

    /// Number of analysis-mode cases per geometry.
    #[must_use]
    pub fn analysis_len(&self) -> usize {
        self.thrust.len() * self.forward_speed.len() * self.climb_rate.len() * self.rotor_speed.len()
    }
}

fn axis(axis: Axis, values: Vec<f64>) -> Result<Vec<f64>, ConfigError> {
    if values.is_empty() {
        return Err(ConfigError::EmptyAxis { axis });
    }
    Ok(values)
}

fn pick<T: Copy>(values: &[T], index: usize) -> T {
    if values.len() == 1 {
        values[0]
    } else {
        values[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::casegen::config::OneOrMany;

    fn section(
        thrust: Vec<f64>,
        forward_speed: Vec<f64>,
        climb_rate: Vec<f64>,
        rotor_speed: Vec<f64>,
        shaft_tilt: Vec<f64>,
    ) -> SweepSection {
        SweepSection {
            thrust: OneOrMany::Many(thrust),
            forward_speed: OneOrMany::Many(forward_speed),
            climb_rate: OneOrMany::Many(climb_rate),
            rotor_speed: OneOrMany::Many(rotor_speed),
            shaft_tilt: OneOrMany::Many(shaft_tilt),
        }
    }

    #[test]
    fn analysis_points_nest_thrust_outermost() {
        let sweep = Sweep::from_section(&section(
            vec![500.0, 600.0],
            vec![0.0, 30.0],
            vec![0.0],
            vec![2000.0, 2200.0],
            vec![0.0],
        ))
        .unwrap();

        let points = sweep.analysis_points();
        assert_eq!(points.len(), 8);
        assert_eq!(sweep.analysis_len(), 8);

        let thrusts: Vec<f64> = points.iter().map(|p| p.thrust.get::<newton>()).collect();
        assert_eq!(thrusts, [500.0, 500.0, 500.0, 500.0, 600.0, 600.0, 600.0, 600.0]);

        let speeds: Vec<f64> = points
            .iter()
            .map(|p| p.forward_speed.get::<meter_per_second>())
            .collect();
        assert_eq!(speeds, [0.0, 0.0, 30.0, 30.0, 0.0, 0.0, 30.0, 30.0]);

        let rpm: Vec<i64> = points
            .iter()
            .map(|p| p.rotor_speed.get::<revolution_per_minute>().round() as i64)
            .collect();
        assert_eq!(rpm, [2000, 2200, 2000, 2200, 2000, 2200, 2000, 2200]);
    }

    #[test]
    fn shaft_tilts_pair_with_forward_speeds() {
        let sweep = Sweep::from_section(&section(
            vec![500.0],
            vec![0.0, 20.0, 40.0],
            vec![0.0],
            vec![2000.0],
            vec![0.0, -3.0, -6.0],
        ))
        .unwrap();
        sweep.check_analysis().unwrap();

        let tilts: Vec<f64> = sweep
            .analysis_points()
            .iter()
            .map(|p| p.shaft_tilt.get::<degree>())
            .collect();
        assert_relative_eq!(tilts[1], -3.0, epsilon = 1e-12);
        assert_relative_eq!(tilts[2], -6.0, epsilon = 1e-12);
    }

    #[test]
    fn unpaired_shaft_tilts_are_rejected() {
        let sweep = Sweep::from_section(&section(
            vec![500.0],
            vec![0.0, 20.0, 40.0],
            vec![0.0],
            vec![2000.0],
            vec![0.0, -3.0],
        ))
        .unwrap();

        assert!(matches!(
            sweep.check_analysis(),
            Err(ConfigError::TiltIndexing {
                tilts: 2,
                forward_speeds: 3
            })
        ));
    }

    #[test]
    fn design_points_broadcast_single_values() {
        let sweep = Sweep::from_section(&section(
            vec![1000.0, 1200.0],
            vec![0.0],
            vec![0.0],
            vec![2000.0],
            vec![0.0, -2.0],
        ))
        .unwrap();
        sweep.check_design(2).unwrap();

        let second = sweep.design_point(1);
        assert_relative_eq!(second.thrust.get::<newton>(), 1200.0);
        assert_relative_eq!(second.shaft_tilt.get::<degree>(), -2.0, epsilon = 1e-12);
        assert_relative_eq!(
            second.rotor_speed.get::<revolution_per_minute>(),
            2000.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn non_physical_values_are_rejected() {
        let negative_speed = section(vec![500.0], vec![-1.0], vec![0.0], vec![2000.0], vec![0.0]);
        assert!(matches!(
            Sweep::from_section(&negative_speed),
            Err(ConfigError::Invalid {
                field: "sweep.forward_speed",
                ..
            })
        ));

        let zero_rpm = section(vec![500.0], vec![0.0], vec![0.0], vec![0.0], vec![0.0]);
        assert!(matches!(
            Sweep::from_section(&zero_rpm),
            Err(ConfigError::Invalid {
                field: "sweep.rotor_speed",
                ..
            })
        ));

        let no_climb = section(vec![500.0], vec![0.0], vec![], vec![2000.0], vec![0.0]);
        assert!(matches!(
            Sweep::from_section(&no_climb),
            Err(ConfigError::EmptyAxis {
                axis: Axis::ClimbRate
            })
        ));
    }
}
