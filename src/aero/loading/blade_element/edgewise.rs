use std::f64::consts::PI;

use uom::si::{
    angle::radian, angular_velocity::radian_per_second, force::newton,
    mass_density::kilogram_per_cubic_meter, velocity::meter_per_second,
};

use crate::{
    aero::{GeometryCase, LoadingError, OperatingPoint, PeriodicLoading, PolarData},
    casegen::AeroSettings,
};

const INFLOW_ITERS: usize = 100;
const INFLOW_TOL: f64 = 1e-12;

/// Rotor in edgewise (forward) flight with uniform inflow.
pub(super) struct EdgewiseRotor<'a> {
    geometry: &'a GeometryCase,
    polar: &'a PolarData,
    omega: f64,
    density: f64,
    azimuth_steps: usize,
    advance_ratio: f64,
    inflow_ratio: f64,
}

impl<'a> EdgewiseRotor<'a> {
    /// Sets up the rotor and solves for the uniform inflow that carries the
    /// point's thrust.
    pub(super) fn new(
        geometry: &'a GeometryCase,
        polar: &'a PolarData,
        point: &OperatingPoint,
        aero: &AeroSettings,
    ) -> Result<Self, LoadingError> {
        let omega = point.rotor_speed.get::<radian_per_second>();
        let density = aero.density.get::<kilogram_per_cubic_meter>();
        let radius = geometry.radius;
        let tip_speed = omega * radius;
        let tilt = point.shaft_tilt.get::<radian>();

        let advance_ratio = point.forward_speed.get::<meter_per_second>() * tilt.cos() / tip_speed;
        let thrust_coefficient =
            point.thrust.get::<newton>() / (density * PI * radius * radius * tip_speed * tip_speed);

        // Forward tilt is negative and drives the freestream down through the disk.
        let freestream =
            advance_ratio * (-tilt).tan() + point.climb_rate.get::<meter_per_second>() / tip_speed;

        let inflow_ratio = glauert_inflow(advance_ratio, freestream, thrust_coefficient)?;

        Ok(Self {
            geometry,
            polar,
            omega,
            density,
            azimuth_steps: aero.azimuth_steps,
            advance_ratio,
            inflow_ratio,
        })
    }

    /// Blade loading over one revolution at a root collective pitch in radians.
    pub(super) fn loading(&self, collective: f64) -> Result<PeriodicLoading, LoadingError> {
        let radius = self.geometry.radius;
        let tip_speed = self.omega * radius;
        let blades = f64::from(self.geometry.blade_count);
        let perpendicular = self.inflow_ratio * tip_speed;
        let steps = self.azimuth_steps;

        let mut loading = PeriodicLoading {
            thrust: 0.0,
            power: 0.0,
            collective,
            inflow_ratio: self.inflow_ratio,
            advance_ratio: self.advance_ratio,
            azimuth: Vec::with_capacity(steps),
            lift: Vec::with_capacity(steps),
            drag: Vec::with_capacity(steps),
        };
        let mut torque = 0.0;

        for k in 0..steps {
            let azimuth = 2.0 * PI * k as f64 / steps as f64;
            let edgewise = self.advance_ratio * tip_speed * azimuth.sin();

            let mut lift_row = Vec::with_capacity(self.geometry.section_count());
            let mut drag_row = Vec::with_capacity(self.geometry.section_count());

            for section in &self.geometry.sections {
                let tangential = self.omega * section.radius + edgewise;

                // Reverse flow region carries no load.
                if tangential <= 0.0 {
                    lift_row.push(0.0);
                    drag_row.push(0.0);
                    continue;
                }

                let polar = self.polar.at(section.radius / radius);
                let phi = (perpendicular / tangential).atan();
                let alpha = collective + section.twist - polar.zero_lift_angle - phi;
                let dynamic_pressure = 0.5
                    * self.density
                    * (tangential * tangential + perpendicular * perpendicular);

                let lift = dynamic_pressure * section.chord * polar.lift_slope * alpha * section.span;
                let drag = dynamic_pressure * section.chord * polar.drag * section.span;

                loading.thrust += blades * (lift * phi.cos() - drag * phi.sin());
                torque += blades * (lift * phi.sin() + drag * phi.cos()) * section.radius;

                lift_row.push(lift);
                drag_row.push(drag);
            }

            loading.azimuth.push(azimuth);
            loading.lift.push(lift_row);
            loading.drag.push(drag_row);
        }

        loading.thrust /= steps as f64;
        loading.power = torque * self.omega / steps as f64;

        if !loading.thrust.is_finite() || !loading.power.is_finite() {
            return Err(LoadingError::NonPhysical {
                context: format!("forward-flight loading at collective {collective} rad is not finite"),
            });
        }
        Ok(loading)
    }
}

/// Solves Glauert's uniform inflow equation
/// `lambda = freestream + ct / (2 sqrt(mu^2 + lambda^2))` by Newton iteration.
fn glauert_inflow(
    advance_ratio: f64,
    freestream: f64,
    thrust_coefficient: f64,
) -> Result<f64, LoadingError> {
    let mu2 = advance_ratio * advance_ratio;
    let mut inflow = freestream + (0.5 * thrust_coefficient).sqrt();

    for _ in 0..INFLOW_ITERS {
        let norm2 = mu2 + inflow * inflow;
        let norm = norm2.sqrt();
        let residual = inflow - freestream - thrust_coefficient / (2.0 * norm);
        let derivative = 1.0 + thrust_coefficient * inflow / (2.0 * norm2 * norm);

        let step = residual / derivative;
        inflow -= step;

        if !inflow.is_finite() {
            break;
        }
        if step.abs() < INFLOW_TOL {
            return Ok(inflow);
        }
    }

    Err(LoadingError::InflowNotConverged {
        iters: INFLOW_ITERS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::aero::loading::blade_element::fixtures::{config, geometry, point, polar};

    #[test]
    fn hover_limit_recovers_momentum_theory() {
        let ct = 0.005;
        let inflow = glauert_inflow(0.0, 0.0, ct).unwrap();
        assert_relative_eq!(inflow, (ct / 2.0).sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn high_speed_inflow_approaches_thrust_over_two_mu() {
        let (mu, ct) = (0.4, 0.005);
        let inflow = glauert_inflow(mu, 0.0, ct).unwrap();
        assert_relative_eq!(inflow, ct / (2.0 * mu), max_relative = 1e-3);
    }

    #[test]
    fn forward_tilt_increases_inflow() {
        let (geometry, polar, config) = (geometry(), polar(), config(""));

        let tilted = point(400.0, 30.0, 0.0);
        let level = OperatingPoint {
            shaft_tilt: uom::si::f64::Angle::new::<radian>(0.0),
            ..tilted
        };

        let tilted = EdgewiseRotor::new(&geometry, &polar, &tilted, config.aero()).unwrap();
        let level = EdgewiseRotor::new(&geometry, &polar, &level, config.aero()).unwrap();

        assert!(tilted.inflow_ratio > level.inflow_ratio);
    }

    #[test]
    fn loading_covers_the_whole_revolution() {
        let (geometry, polar, config) = (geometry(), polar(), config("azimuth_steps = 8"));
        let rotor =
            EdgewiseRotor::new(&geometry, &polar, &point(400.0, 30.0, 0.0), config.aero()).unwrap();

        let loading = rotor.loading(0.1).unwrap();

        assert_eq!(loading.azimuth.len(), 8);
        assert_relative_eq!(loading.azimuth[2], PI / 2.0, epsilon = 1e-12);
        assert!(loading.lift.iter().all(|row| row.len() == geometry.section_count()));
    }
}
