use std::f64::consts::PI;

use uom::si::{
    angular_velocity::radian_per_second, mass_density::kilogram_per_cubic_meter,
    velocity::meter_per_second,
};

use crate::{
    aero::{ConstantLoading, GeometryCase, LoadingError, OperatingPoint, PolarData},
    casegen::AeroSettings,
};

/// Iteration limit for the tip-loss fixed point.
const TIP_LOSS_ITERS: usize = 100;

/// Floor on the Prandtl factor so inflow stays finite at the tip.
const MIN_TIP_LOSS: f64 = 1e-3;

/// Rotor in hover or axial flight, evaluated at a given collective.
pub(super) struct AxialRotor<'a> {
    geometry: &'a GeometryCase,
    polar: &'a PolarData,
    omega: f64,
    climb_rate: f64,
    density: f64,
    tip_loss: bool,
}

impl<'a> AxialRotor<'a> {
    pub(super) fn new(
        geometry: &'a GeometryCase,
        polar: &'a PolarData,
        point: &OperatingPoint,
        aero: &AeroSettings,
    ) -> Self {
        Self {
            geometry,
            polar,
            omega: point.rotor_speed.get::<radian_per_second>(),
            climb_rate: point.climb_rate.get::<meter_per_second>(),
            density: aero.density.get::<kilogram_per_cubic_meter>(),
            tip_loss: aero.tip_loss,
        }
    }

    /// Blade loading at a root collective pitch in radians.
    pub(super) fn loading(&self, collective: f64) -> Result<ConstantLoading, LoadingError> {
        let radius = self.geometry.radius;
        let tip_speed = self.omega * radius;
        let climb_ratio = self.climb_rate / tip_speed;
        let blades = f64::from(self.geometry.blade_count);
        let count = self.geometry.section_count();

        let mut loading = ConstantLoading {
            thrust: 0.0,
            power: 0.0,
            collective,
            inflow: Vec::with_capacity(count),
            angle_of_attack: Vec::with_capacity(count),
            lift: Vec::with_capacity(count),
            drag: Vec::with_capacity(count),
        };
        let mut torque = 0.0;

        for section in &self.geometry.sections {
            let x = section.radius / radius;
            let polar = self.polar.at(x);
            let local_solidity = blades * section.chord / (PI * radius);
            let pitch = collective + section.twist - polar.zero_lift_angle;

            let inflow = self.inflow(x, local_solidity * polar.lift_slope, pitch, climb_ratio, blades);
            let phi = (inflow / x).atan();

            let tangential = self.omega * section.radius;
            let perpendicular = inflow * tip_speed;
            let dynamic_pressure = 0.5
                * self.density
                * (tangential * tangential + perpendicular * perpendicular);

            let lift =
                dynamic_pressure * section.chord * polar.lift_slope * (pitch - phi) * section.span;
            let drag = dynamic_pressure * section.chord * polar.drag * section.span;

            loading.thrust += blades * (lift * phi.cos() - drag * phi.sin());
            torque += blades * (lift * phi.sin() + drag * phi.cos()) * section.radius;

            loading.inflow.push(inflow);
            loading.angle_of_attack.push(collective + section.twist - phi);
            loading.lift.push(lift);
            loading.drag.push(drag);
        }

        loading.power = torque * self.omega;

        if !loading.thrust.is_finite() || !loading.power.is_finite() {
            return Err(LoadingError::NonPhysical {
                context: format!("axial loading at collective {collective} rad is not finite"),
            });
        }
        Ok(loading)
    }

    /// Local inflow ratio from blade-element momentum theory.
    ///
    /// `slope` is the local solidity times the lift-curve slope and `pitch`
    /// is measured from the zero-lift line.
    fn inflow(&self, x: f64, slope: f64, pitch: f64, climb_ratio: f64, blades: f64) -> f64 {
        let mut factor = 1.0;
        let mut inflow = 0.0;

        for _ in 0..TIP_LOSS_ITERS {
            let half = slope / (16.0 * factor) - 0.5 * climb_ratio;
            let discriminant = half * half + slope * pitch * x / (8.0 * factor);
            inflow = discriminant.max(0.0).sqrt() - half;

            if !self.tip_loss {
                break;
            }
            let next = prandtl(blades, x, inflow);
            if (next - factor).abs() < 1e-12 {
                break;
            }
            factor = next;
        }

        inflow
    }
}

/// Prandtl tip-loss factor.
fn prandtl(blades: f64, x: f64, inflow: f64) -> f64 {
    if inflow <= 0.0 {
        return 1.0;
    }
    let f = 0.5 * blades * (1.0 - x) / inflow;
    (2.0 / PI * (-f).exp().acos()).max(MIN_TIP_LOSS)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::aero::loading::blade_element::fixtures::{config, geometry, point, polar};

    #[test]
    fn inflow_matches_momentum_theory_for_a_uniform_blade() {
        // Without tip loss or climb, lambda = sigma*a/16 * (sqrt(1 + 32*theta*x/(sigma*a)) - 1).
        let (geometry, polar, config) = (geometry(), polar(), config("tip_loss = false"));
        let rotor = AxialRotor::new(&geometry, &polar, &point(400.0, 0.0, 0.0), config.aero());

        let slope = 0.05 * 2.0 * PI;
        let expected = slope / 16.0 * ((1.0 + 32.0 * 0.1 * 0.7 / slope).sqrt() - 1.0);
        assert_relative_eq!(rotor.inflow(0.7, slope, 0.1, 0.0, 2.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn tip_loss_reduces_thrust_at_fixed_collective() {
        let (geometry, polar) = (geometry(), polar());
        let with = config("");
        let without = config("tip_loss = false");
        let point = point(400.0, 0.0, 0.0);

        let lossy = AxialRotor::new(&geometry, &polar, &point, with.aero())
            .loading(0.1)
            .unwrap();
        let ideal = AxialRotor::new(&geometry, &polar, &point, without.aero())
            .loading(0.1)
            .unwrap();

        assert!(lossy.thrust < ideal.thrust);
    }

    #[test]
    fn prandtl_factor_vanishes_toward_the_tip() {
        assert_relative_eq!(prandtl(2.0, 0.5, -0.01), 1.0);
        assert!(prandtl(2.0, 0.5, 0.05) > 0.99);
        assert!(prandtl(2.0, 0.99, 0.05) < 0.5);
        assert!(prandtl(2.0, 1.0, 0.05) >= MIN_TIP_LOSS);
    }
}
