use thiserror::Error;

#[cfg(feature = "bevy_reflect")]
use bevy_reflect::prelude::*;

/// Specifies the physical parameters used when generating a [`NavMesh`](crate::NavMesh). Usually built using [`NavMeshConfigBuilder`].
///
/// All distances are in tile units, all times in seconds. `y` grows downward, so a positive
/// [`NavMeshConfig::gravity`] pulls agents toward higher row indices.
///
/// The jump search sweeps a "time scale" `s` over
/// [`time_scale_min`](NavMeshConfig::time_scale_min)`..=`[`time_scale_max`](NavMeshConfig::time_scale_max).
/// For every `s`, the horizontal speed is `1 / s` tiles per second and the flight lasts `s` seconds
/// per tile of horizontal distance. Larger values of `s` produce slower, higher arcs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(Reflect))]
#[cfg_attr(
    all(feature = "serialize", feature = "bevy_reflect"),
    reflect(Serialize, Deserialize)
)]
pub struct NavMeshConfig {
    /// The constant downward acceleration. `[Limit: > 0] [Units: tiles/s²]`
    pub gravity: f32,

    /// The maximum straight-line distance between the two nodes of a jump edge. `[Limit: >= 0] [Units: tiles]`
    ///
    /// Node pairs further apart than this are never connected by a jump,
    /// no matter how strong the requesting agent is.
    pub max_jump_distance: f32,

    /// How far the apex of a jump must rise above the higher of its two endpoints. `[Limit: >= 0] [Units: tiles]`
    pub jump_clearance: f32,

    /// The horizontal distance between two samples of a jump trajectory when testing it against walls. `[Limit: > 0] [Units: tiles]`
    pub trajectory_step: f32,

    /// The smallest time scale tried by the jump search. `[Limit: > 0] [Units: s/tile]`
    pub time_scale_min: f32,

    /// The largest time scale tried by the jump search. `[Limit: >= time_scale_min] [Units: s/tile]`
    pub time_scale_max: f32,

    /// The increment between two tried time scales. `[Limit: > 0] [Units: s/tile]`
    pub time_scale_step: f32,
}

impl NavMeshConfig {
    /// Upper bound on the number of time scales a single jump search tries.
    pub const MAX_TIME_SCALES: u32 = 4096;

    /// Upper bound on the number of samples taken along a single jump trajectory.
    pub const MAX_TRAJECTORY_SAMPLES: u32 = 1 << 16;

    /// The time scales tried by the jump search, in ascending order.
    ///
    /// Computed from an integer counter so that the last value does not drift past
    /// [`NavMeshConfig::time_scale_max`] through accumulated rounding. Yields nothing for a
    /// range that [`NavMeshConfigBuilder::build`] would reject, and at most
    /// [`NavMeshConfig::MAX_TIME_SCALES`] values.
    pub fn time_scales(&self) -> impl Iterator<Item = f32> + '_ {
        let steps = (self.time_scale_max - self.time_scale_min) / self.time_scale_step + 1e-4;
        let count = if steps.is_finite() && steps >= 0.0 && self.time_scale_step > 0.0 {
            (steps.floor() as u32)
                .saturating_add(1)
                .min(Self::MAX_TIME_SCALES)
        } else {
            0
        };
        (0..count).map(move |i| self.time_scale_min + i as f32 * self.time_scale_step)
    }
}

impl Default for NavMeshConfig {
    fn default() -> Self {
        NavMeshConfigBuilder::default().into_config()
    }
}

/// A builder for [`NavMeshConfig`]s.
///
/// Fill in the fields you care about and keep the [`Default`] for the rest.
/// [`NavMeshConfigBuilder::build`] validates the values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(Reflect))]
#[cfg_attr(
    all(feature = "serialize", feature = "bevy_reflect"),
    reflect(Serialize, Deserialize)
)]
pub struct NavMeshConfigBuilder {
    /// See [`NavMeshConfig::gravity`].
    pub gravity: f32,
    /// See [`NavMeshConfig::max_jump_distance`].
    pub max_jump_distance: f32,
    /// See [`NavMeshConfig::jump_clearance`].
    pub jump_clearance: f32,
    /// See [`NavMeshConfig::trajectory_step`].
    pub trajectory_step: f32,
    /// See [`NavMeshConfig::time_scale_min`].
    pub time_scale_min: f32,
    /// See [`NavMeshConfig::time_scale_max`].
    pub time_scale_max: f32,
    /// See [`NavMeshConfig::time_scale_step`].
    pub time_scale_step: f32,
}

impl Default for NavMeshConfigBuilder {
    fn default() -> Self {
        Self {
            gravity: 10.0,
            max_jump_distance: 4.0,
            jump_clearance: 0.5,
            trajectory_step: 0.1,
            time_scale_min: 0.1,
            time_scale_max: 2.0,
            time_scale_step: 0.1,
        }
    }
}

impl NavMeshConfigBuilder {
    /// Builds the config.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is outside of its documented limits or not finite.
    pub fn build(self) -> Result<NavMeshConfig, ConfigError> {
        let positive = [
            ("gravity", self.gravity),
            ("trajectory_step", self.trajectory_step),
            ("time_scale_min", self.time_scale_min),
            ("time_scale_step", self.time_scale_step),
        ];
        let non_negative = [
            ("max_jump_distance", self.max_jump_distance),
            ("jump_clearance", self.jump_clearance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }
        if !self.time_scale_max.is_finite() || self.time_scale_max < self.time_scale_min {
            return Err(ConfigError::EmptyTimeScaleRange {
                min: self.time_scale_min,
                max: self.time_scale_max,
            });
        }
        Ok(self.into_config())
    }

    fn into_config(self) -> NavMeshConfig {
        NavMeshConfig {
            gravity: self.gravity,
            max_jump_distance: self.max_jump_distance,
            jump_clearance: self.jump_clearance,
            trajectory_step: self.trajectory_step,
            time_scale_min: self.time_scale_min,
            time_scale_max: self.time_scale_max,
            time_scale_step: self.time_scale_step,
        }
    }
}

/// Errors that can occur when building a [`NavMeshConfig`] with [`NavMeshConfigBuilder::build`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Happens when a value that must be strictly positive is zero, negative or not finite.
    #[error("{name} must be positive and finite, but got {value}")]
    NotPositive {
        /// The name of the offending field
        name: &'static str,
        /// The offending value
        value: f32,
    },
    /// Happens when a value that must not be negative is negative or not finite.
    #[error("{name} must be non-negative and finite, but got {value}")]
    Negative {
        /// The name of the offending field
        name: &'static str,
        /// The offending value
        value: f32,
    },
    /// Happens when the jump search would not try a single time scale.
    #[error("time scale range {min}..={max} is empty")]
    EmptyTimeScaleRange {
        /// The configured minimum time scale
        min: f32,
        /// The configured maximum time scale
        max: f32,
    },
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn default_time_scales_cover_the_whole_range() {
        let config = NavMeshConfig::default();
        let scales: Vec<f32> = config.time_scales().collect();
        assert_eq!(scales.len(), 20);
        assert_relative_eq!(scales[0], 0.1);
        assert_relative_eq!(scales[19], 2.0, epsilon = 1e-5);
    }

    #[test]
    fn degenerate_step_yields_no_time_scales() {
        let zero_step = NavMeshConfig {
            time_scale_step: 0.0,
            ..NavMeshConfig::default()
        };
        assert_eq!(zero_step.time_scales().count(), 0);

        let inverted = NavMeshConfig {
            time_scale_min: 1.0,
            time_scale_max: 0.5,
            ..NavMeshConfig::default()
        };
        assert_eq!(inverted.time_scales().count(), 0);

        let tiny_step = NavMeshConfig {
            time_scale_step: 1e-12,
            ..NavMeshConfig::default()
        };
        assert_eq!(
            tiny_step.time_scales().count(),
            NavMeshConfig::MAX_TIME_SCALES as usize
        );
    }

    #[test]
    fn rejects_non_positive_gravity() {
        let error = NavMeshConfigBuilder {
            gravity: 0.0,
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert_eq!(
            error,
            ConfigError::NotPositive {
                name: "gravity",
                value: 0.0
            }
        );
    }

    #[test]
    fn rejects_negative_clearance() {
        let error = NavMeshConfigBuilder {
            jump_clearance: -1.0,
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert!(matches!(
            error,
            ConfigError::Negative {
                name: "jump_clearance",
                ..
            }
        ));
    }

    #[test]
    fn rejects_inverted_time_scale_range() {
        let error = NavMeshConfigBuilder {
            time_scale_min: 1.0,
            time_scale_max: 0.5,
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert_eq!(
            error,
            ConfigError::EmptyTimeScaleRange { min: 1.0, max: 0.5 }
        );
    }

    #[test]
    fn default_builder_builds_default_config() {
        assert_eq!(
            NavMeshConfigBuilder::default().build().unwrap(),
            NavMeshConfig::default()
        );
    }
}
