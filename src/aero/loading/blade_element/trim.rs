//! Collective-pitch trim.
//!
//! The rotor is exposed as a [`Model`] from root collective to loading, and
//! bisection varies the collective until the thrust residual vanishes.

use std::convert::Infallible;

use twine_core::{EquationProblem, Model};
use twine_solvers::equation::bisection;
use uom::si::{
    angle::radian,
    f64::{Angle, Force},
    force::newton,
};

use crate::aero::{LoadingError, LoadingResult};

use super::{AxialRotor, EdgewiseRotor, TrimConfig};

/// Model adapter with the root collective as its sole input.
pub(super) enum RotorModel<'a> {
    Axial(AxialRotor<'a>),
    Edgewise(EdgewiseRotor<'a>),
}

impl Model for RotorModel<'_> {
    type Input = Angle;
    type Output = LoadingResult;
    type Error = LoadingError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let collective = input.get::<radian>();
        match self {
            RotorModel::Axial(rotor) => rotor.loading(collective).map(LoadingResult::Constant),
            RotorModel::Edgewise(rotor) => rotor.loading(collective).map(LoadingResult::Periodic),
        }
    }
}

/// Computes the residual as `achieved_thrust - target_thrust`.
struct ThrustProblem {
    target: Force,
}

impl EquationProblem<1> for ThrustProblem {
    type Input = Angle;
    type Output = LoadingResult;
    type Error = Infallible;

    fn input(&self, x: &[f64; 1]) -> Result<Self::Input, Self::Error> {
        Ok(Angle::new::<radian>(x[0]))
    }

    fn residuals(
        &self,
        _input: &Self::Input,
        output: &Self::Output,
    ) -> Result<[f64; 1], Self::Error> {
        Ok([output.thrust() - self.target.get::<newton>()])
    }
}

/// Finds the collective that produces `target` thrust.
///
/// # Errors
///
/// Returns [`LoadingError::Bisection`] if the collective range does not
/// bracket the target, or [`LoadingError::NotConverged`] if the iteration
/// limit is reached first.
pub(super) fn trim(
    model: &RotorModel<'_>,
    target: Force,
    config: &TrimConfig,
) -> Result<LoadingResult, LoadingError> {
    let problem = ThrustProblem { target };

    let solution = bisection::solve(
        model,
        &problem,
        config.bracket(),
        &config.bisection(),
        |event: &bisection::Event<'_, _, _>| {
            // A non-finite loading means the collective overshot the
            // physical range; steer bisection back toward lower pitch.
            if event.result().is_err() {
                return Some(bisection::Action::assume_positive());
            }
            None
        },
    )?;

    if solution.status != bisection::Status::Converged {
        return Err(LoadingError::NotConverged {
            residual: solution.residual,
            iters: solution.iters,
        });
    }

    Ok(solution.snapshot.output)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use super::super::fixtures::{config, geometry, point, polar};

    #[test]
    fn trimmed_output_matches_direct_evaluation() {
        let (geometry, polar, config) = (geometry(), polar(), config("tip_loss = false"));
        let point = point(350.0, 0.0, 0.0);
        let model = RotorModel::Axial(AxialRotor::new(&geometry, &polar, &point, config.aero()));

        let trimmed = trim(&model, point.thrust, &TrimConfig::default()).unwrap();
        assert_relative_eq!(trimmed.thrust(), 350.0, max_relative = 1e-6);

        let LoadingResult::Constant(trimmed) = trimmed else {
            panic!("axial model should produce constant loading");
        };
        let direct = model
            .call(&Angle::new::<radian>(trimmed.collective))
            .unwrap();
        assert_relative_eq!(direct.thrust(), trimmed.thrust, max_relative = 1e-12);
    }

    #[test]
    fn iteration_limit_is_reported() {
        let (geometry, polar, config) = (geometry(), polar(), config(""));
        let point = point(400.0, 0.0, 0.0);
        let model = RotorModel::Axial(AxialRotor::new(&geometry, &polar, &point, config.aero()));

        let starved = TrimConfig {
            max_iters: 2,
            ..TrimConfig::default()
        };
        assert!(matches!(
            trim(&model, point.thrust, &starved),
            Err(LoadingError::NotConverged { .. })
        ));
    }
}
