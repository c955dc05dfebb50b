//! Airfoil polars reduced to the lift-curve data the loading solver needs.

mod error;
mod xfoil;

pub use error::PolarError;
pub use xfoil::XfoilPolars;

use serde::{Deserialize, Serialize};

use crate::casegen::Config;

/// Linearized aerodynamics of one blade cross section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionPolar {
    /// Radial position as a fraction of the tip radius.
    pub location: f64,

    /// Lift-curve slope, per radian.
    pub lift_slope: f64,

    /// Angle of attack at zero lift, in radians.
    pub zero_lift_angle: f64,

    /// Profile drag coefficient.
    pub drag: f64,
}

/// Lift-curve data along the blade for one rotor speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarData {
    sections: Vec<SectionPolar>,
}

impl PolarData {
    /// Creates polar data from cross sections in any order.
    ///
    /// # Errors
    ///
    /// Returns [`PolarError::NoSections`] if `sections` is empty.
    pub fn new(mut sections: Vec<SectionPolar>) -> Result<Self, PolarError> {
        if sections.is_empty() {
            return Err(PolarError::NoSections);
        }
        sections.sort_by(|a, b| a.location.total_cmp(&b.location));
        Ok(Self { sections })
    }

    /// Cross sections ordered from root to tip.
    #[must_use]
    pub fn sections(&self) -> &[SectionPolar] {
        &self.sections
    }

    /// Lift-curve data at a radial position (r/R).
    ///
    /// Interpolates linearly between cross sections and holds the end
    /// values beyond the first and last section.
    #[must_use]
    pub fn at(&self, location: f64) -> SectionPolar {
        let upper = self
            .sections
            .iter()
            .position(|section| section.location >= location);

        let (below, above) = match upper {
            Some(0) => return SectionPolar { location, ..self.sections[0] },
            None => {
                let last = self.sections[self.sections.len() - 1];
                return SectionPolar { location, ..last };
            }
            Some(i) => (self.sections[i - 1], self.sections[i]),
        };

        let width = above.location - below.location;
        if width <= 0.0 {
            return SectionPolar { location, ..above };
        }
        let t = (location - below.location) / width;
        let lerp = |a: f64, b: f64| a + t * (b - a);

        SectionPolar {
            location,
            lift_slope: lerp(below.lift_slope, above.lift_slope),
            zero_lift_angle: lerp(below.zero_lift_angle, above.zero_lift_angle),
            drag: lerp(below.drag, above.drag),
        }
    }
}

/// Produces [`PolarData`] for one configured rotor speed.
pub trait PolarEvaluator {
    /// Evaluates the polars for the rotor speed at `rotor_speed_index` in
    /// the configured sweep.
    ///
    /// # Errors
    ///
    /// Returns a [`PolarError`] if the polar source is missing, malformed,
    /// or cannot be reduced to lift-curve data.
    fn evaluate(&self, config: &Config, rotor_speed_index: usize)
    -> Result<PolarData, PolarError>;
}
