use glam::Vec2;

/// Returns `-1.0`, `0.0` or `1.0` depending on the sign of `value`.
///
/// Unlike [`f32::signum`], zero maps to zero.
#[inline]
pub(crate) fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// A ballistic arc under constant downward acceleration.
///
/// `y` grows downward, so an ascending launch has a negative vertical velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Arc {
    pub(crate) origin: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) gravity: f32,
}

impl Arc {
    #[inline]
    pub(crate) fn new(origin: Vec2, velocity: Vec2, gravity: f32) -> Self {
        Self {
            origin,
            velocity,
            gravity,
        }
    }

    /// The position after `t` seconds of flight.
    #[inline]
    pub(crate) fn position_at(&self, t: f32) -> Vec2 {
        Vec2::new(
            self.origin.x + self.velocity.x * t,
            self.origin.y + self.velocity.y * t + 0.5 * self.gravity * t * t,
        )
    }

    /// The height of the arc when it passes the horizontal coordinate `x`.
    ///
    /// Requires a nonzero horizontal velocity.
    #[inline]
    pub(crate) fn y_at(&self, x: f32) -> f32 {
        self.position_at((x - self.origin.x) / self.velocity.x).y
    }

    /// The highest point of the arc, i.e. where the vertical velocity is zero.
    #[inline]
    pub(crate) fn apex(&self) -> Vec2 {
        self.position_at(-self.velocity.y / self.gravity)
    }
}
