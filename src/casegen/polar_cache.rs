//! Run-wide airfoil polar cache.
//!
//! Polars depend on rotor speed but not on the geometry, so they are
//! evaluated once per configured rotor speed on the first geometry and
//! shared by every later geometry.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uom::si::{angular_velocity::revolution_per_minute, f64::AngularVelocity};

use crate::aero::{PolarData, PolarError, PolarEvaluator};

use super::{Config, label::rounded_rpm};

/// Rotor speed in rpm, rounded to the nearest integer (ties to even).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotorSpeedKey(i64);

impl RotorSpeedKey {
    #[must_use]
    pub fn from_rotor_speed(speed: AngularVelocity) -> Self {
        Self(rounded_rpm(speed))
    }

    #[must_use]
    pub fn rpm(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RotorSpeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}RPM", self.0)
    }
}

/// Two different configured rotor speeds round to the same key.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("rotor speeds {first_rpm} rpm and {second_rpm} rpm share polar cache key {key}")]
pub struct PolarKeyCollision {
    pub key: RotorSpeedKey,
    pub first_rpm: f64,
    pub second_rpm: f64,
}

#[derive(Debug, Error)]
pub enum PolarCacheError {
    #[error(transparent)]
    KeyCollision(#[from] PolarKeyCollision),

    #[error("polar evaluation failed for rotor speed {key} (index {index})")]
    Evaluation {
        index: usize,
        key: RotorSpeedKey,
        #[source]
        source: PolarError,
    },
}

/// Keys the configured rotor speeds.
///
/// Returns each distinct key once, paired with the index of the first
/// rotor speed that produced it. Repeating the exact same speed is allowed.
///
/// # Errors
///
/// Returns [`PolarKeyCollision`] if two different speeds round to one key.
pub fn keyed_rotor_speeds(
    speeds: &[AngularVelocity],
) -> Result<Vec<(usize, RotorSpeedKey)>, PolarKeyCollision> {
    let mut seen: BTreeMap<RotorSpeedKey, AngularVelocity> = BTreeMap::new();
    let mut keyed = Vec::new();

    for (index, &speed) in speeds.iter().enumerate() {
        let key = RotorSpeedKey::from_rotor_speed(speed);
        match seen.get(&key) {
            Some(&first) if first == speed => {}
            Some(&first) => {
                return Err(PolarKeyCollision {
                    key,
                    first_rpm: first.get::<revolution_per_minute>(),
                    second_rpm: speed.get::<revolution_per_minute>(),
                });
            }
            None => {
                seen.insert(key, speed);
                keyed.push((index, key));
            }
        }
    }

    Ok(keyed)
}

/// Polar data for every configured rotor speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarSet {
    entries: BTreeMap<RotorSpeedKey, PolarData>,
}

impl PolarSet {
    /// Evaluates the polars once per distinct configured rotor speed.
    ///
    /// # Errors
    ///
    /// Returns a [`PolarCacheError`] on a key collision or the first failed
    /// evaluation.
    pub fn build<E>(config: &Config, evaluator: &E) -> Result<Self, PolarCacheError>
    where
        E: PolarEvaluator + ?Sized,
    {
        let mut entries = BTreeMap::new();

        for (index, key) in keyed_rotor_speeds(config.sweep().rotor_speeds())? {
            debug!(%key, index, "evaluating polars");
            let polar = evaluator
                .evaluate(config, index)
                .map_err(|source| PolarCacheError::Evaluation { index, key, source })?;
            entries.insert(key, polar);
        }

        info!(rotor_speeds = entries.len(), "built polar cache");
        Ok(Self { entries })
    }

    #[must_use]
    pub fn get(&self, key: RotorSpeedKey) -> Option<&PolarData> {
        self.entries.get(&key)
    }

    /// Polar data for the key of `speed`.
    #[must_use]
    pub fn for_rotor_speed(&self, speed: AngularVelocity) -> Option<&PolarData> {
        self.get(RotorSpeedKey::from_rotor_speed(speed))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = RotorSpeedKey> + '_ {
        self.entries.keys().copied()
    }
}
