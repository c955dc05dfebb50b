//! Analysis-mode case labels.
//!
//! A label names the case directory of one sweep point and is a pure function
//! of thrust, forward speed, climb rate and rotor speed:
//!
//! ```
//! use rotor_cases::{aero::OperatingPoint, casegen::case_label};
//! use uom::si::{
//!     angle::degree,
//!     angular_velocity::revolution_per_minute,
//!     f64::{Angle, AngularVelocity, Force, Velocity},
//!     force::newton,
//!     velocity::meter_per_second,
//! };
//!
//! let point = OperatingPoint {
//!     thrust: Force::new::<newton>(974.9446),
//!     forward_speed: Velocity::new::<meter_per_second>(37.02464),
//!     climb_rate: Velocity::new::<meter_per_second>(0.0),
//!     rotor_speed: AngularVelocity::new::<revolution_per_minute>(2250.0),
//!     shaft_tilt: Angle::new::<degree>(-4.0),
//! };
//!
//! assert_eq!(case_label(&point), "T_9.75e+02N_Vx_72Kts_Vz_0ms_Nr_2250RPM");
//! ```
//!
//! Values that agree after rounding share a label; such collisions are
//! rejected when the configuration is validated.

use uom::si::{
    angular_velocity::revolution_per_minute, f64::AngularVelocity, force::newton,
    velocity::meter_per_second,
};

use crate::aero::OperatingPoint;

/// Knots per meter per second, as used in case labels.
const KNOTS_PER_MPS: f64 = 1.944;

/// Formats the case label for an operating point.
///
/// Shaft tilt does not take part in the label.
#[must_use]
pub fn case_label(point: &OperatingPoint) -> String {
    format!(
        "T_{}N_Vx_{}Kts_Vz_{}ms_Nr_{}RPM",
        scientific(point.thrust.get::<newton>(), 2),
        round_half_even(point.forward_speed.get::<meter_per_second>() * KNOTS_PER_MPS),
        round_half_even(point.climb_rate.get::<meter_per_second>()),
        rounded_rpm(point.rotor_speed),
    )
}

/// Rotor speed in whole rpm, ties to even.
///
/// The rad/s storage moves exact half-rpm values off the tie by a few ulps,
/// so the value is snapped to 1e-9 rpm before rounding.
pub(crate) fn rounded_rpm(speed: AngularVelocity) -> i64 {
    let rpm = speed.get::<revolution_per_minute>();
    round_half_even((rpm * 1e9).round() / 1e9)
}

/// Rounds to the nearest integer, ties to even.
pub(crate) fn round_half_even(value: f64) -> i64 {
    // Float to int casts saturate, and `-0.0` becomes `0`.
    value.round_ties_even() as i64
}

/// Scientific notation with a signed exponent of at least two digits
/// (`9.75e+02`, `1.50e-03`), the form C's `%.Ne` produces.
fn scientific(value: f64, precision: usize) -> String {
    let formatted = format!("{value:.precision$e}");
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return formatted;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}
