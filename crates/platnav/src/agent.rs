use glam::Vec2;

#[cfg(feature = "bevy_reflect")]
use bevy_reflect::prelude::*;

/// The locomotion limits of the agent requesting a route.
///
/// The same [`NavMesh`](crate::NavMesh) serves agents with different capabilities. Edges the
/// agent cannot execute are skipped during the search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(Reflect))]
#[cfg_attr(
    all(feature = "serialize", feature = "bevy_reflect"),
    reflect(Serialize, Deserialize)
)]
pub struct AgentCapabilities {
    /// The fastest horizontal speed the agent can reach, walking or in the air. `[Units: tiles/s]`
    pub max_speed: f32,
    /// The fastest upward speed the agent can launch itself with. `[Units: tiles/s]`
    pub max_jump_speed: f32,
}

impl AgentCapabilities {
    /// Creates agent capabilities from the given limits.
    pub const fn new(max_speed: f32, max_jump_speed: f32) -> Self {
        Self {
            max_speed,
            max_jump_speed,
        }
    }

    /// Whether the agent can launch itself with `velocity`.
    ///
    /// `y` grows downward, so the upward launch speed is `-velocity.y`.
    #[inline]
    pub fn can_launch(&self, velocity: Vec2) -> bool {
        velocity.x.abs() <= self.max_speed && -velocity.y <= self.max_jump_speed
    }

    /// Whether the agent can move on its own at all.
    #[inline]
    pub fn can_move(&self) -> bool {
        self.max_speed > 0.0
    }
}

impl Default for AgentCapabilities {
    fn default() -> Self {
        Self::new(5.0, 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_limits_are_inclusive() {
        let agent = AgentCapabilities::new(2.5, 4.0);
        assert!(agent.can_launch(Vec2::new(2.5, -4.0)));
        assert!(agent.can_launch(Vec2::new(-2.5, -4.0)));
        assert!(!agent.can_launch(Vec2::new(2.6, -1.0)));
        assert!(!agent.can_launch(Vec2::new(1.0, -4.1)));
    }

    #[test]
    fn stationary_agent_cannot_move() {
        assert!(!AgentCapabilities::new(0.0, 10.0).can_move());
        assert!(AgentCapabilities::default().can_move());
    }
}
