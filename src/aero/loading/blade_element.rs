//! Blade-element reference solver.
//!
//! Hover and axial flight use blade-element momentum theory with an optional
//! Prandtl tip-loss correction. Forward flight uses a uniform Glauert inflow
//! and steps the blade around the azimuth. In both regimes the collective
//! pitch is trimmed by bisection until the rotor produces the target thrust.

mod axial;
mod edgewise;
mod trim;

use twine_core::Model;
use twine_solvers::equation::bisection;
use uom::si::{
    angle::{degree, radian},
    f64::{Angle, Force},
    force::newton,
};

use crate::{
    aero::{GeometryCase, PolarData},
    casegen::Config,
};

use super::{
    ConstantLoading, LoadingError, LoadingResult, LoadingSolver, OperatingPoint, PeriodicLoading,
};

use axial::AxialRotor;
use edgewise::EdgewiseRotor;
use trim::RotorModel;

/// Solver configuration for collective trim.
#[derive(Debug, Clone, Copy)]
pub struct TrimConfig {
    /// Maximum iteration count for the bisection solve.
    pub max_iters: usize,

    /// Collective pitch search range.
    pub collective_range: [Angle; 2],

    /// Absolute tolerance on the collective pitch.
    pub collective_tol: Angle,

    /// Absolute tolerance on the thrust residual (achieved - target).
    pub thrust_tol: Force,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            max_iters: 100,
            collective_range: [Angle::new::<degree>(-10.0), Angle::new::<degree>(30.0)],
            collective_tol: Angle::new::<radian>(1e-12),
            thrust_tol: Force::new::<newton>(1e-6),
        }
    }
}

impl TrimConfig {
    fn bisection(&self) -> bisection::Config {
        bisection::Config {
            max_iters: self.max_iters,
            x_abs_tol: self.collective_tol.get::<radian>(),
            x_rel_tol: 0.0,
            residual_tol: self.thrust_tol.get::<newton>(),
        }
    }

    fn bracket(&self) -> [f64; 2] {
        self.collective_range.map(|angle| angle.get::<radian>())
    }
}

/// Reference [`LoadingSolver`] based on blade-element theory.
#[derive(Debug, Clone, Copy, Default)]
pub struct BladeElementSolver {
    trim: TrimConfig,
}

impl BladeElementSolver {
    #[must_use]
    pub fn new(trim: TrimConfig) -> Self {
        Self { trim }
    }

    /// Trims the model to the target thrust, or flies the configured
    /// collective when trimming is disabled.
    fn fly(
        &self,
        config: &Config,
        model: &RotorModel<'_>,
        point: &OperatingPoint,
    ) -> Result<LoadingResult, LoadingError> {
        let aero = config.aero();
        if aero.trim {
            trim::trim(model, point.thrust, &self.trim)
        } else {
            model.call(&aero.collective)
        }
    }
}

impl LoadingSolver for BladeElementSolver {
    fn hover(
        &self,
        config: &Config,
        geometry: &GeometryCase,
        polar: &PolarData,
        point: &OperatingPoint,
    ) -> Result<ConstantLoading, LoadingError> {
        let model = RotorModel::Axial(AxialRotor::new(geometry, polar, point, config.aero()));
        match self.fly(config, &model, point)? {
            LoadingResult::Constant(loading) => Ok(loading),
            LoadingResult::Periodic(_) => Err(LoadingError::NonPhysical {
                context: "axial model returned periodic loading".to_string(),
            }),
        }
    }

    fn forward_flight(
        &self,
        config: &Config,
        geometry: &GeometryCase,
        polar: &PolarData,
        point: &OperatingPoint,
    ) -> Result<PeriodicLoading, LoadingError> {
        let model = RotorModel::Edgewise(EdgewiseRotor::new(geometry, polar, point, config.aero())?);
        match self.fly(config, &model, point)? {
            LoadingResult::Periodic(loading) => Ok(loading),
            LoadingResult::Constant(_) => Err(LoadingError::NonPhysical {
                context: "forward-flight model returned constant loading".to_string(),
            }),
        }
    }
}
