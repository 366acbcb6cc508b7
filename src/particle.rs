//! Particles and boundary policies.
//!
//! A [`Particle`] is plain data. Motion is a pure transition,
//! [`Particle::advanced`], so it can be tested without any drawing surface.
//! Velocities are in pixels per frame, matching a host that redraws once per
//! animation frame.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::visuals::{ParticleTint, Rgba};

/// What happens when a particle reaches the edge of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Leaving one edge re-enters from the opposite edge.
    #[default]
    Wrap,
    /// Velocity component normal to the edge is negated.
    Bounce,
}

/// A single moving point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in viewport pixels.
    pub position: Vec2,
    /// Displacement per frame.
    pub velocity: Vec2,
    /// Drawn radius in pixels.
    pub radius: f32,
    /// Per-instance colour; `None` uses the field colour.
    pub color: Option<Rgba>,
}

impl Particle {
    /// Spawn a particle uniformly inside `viewport`.
    ///
    /// Each velocity component is uniform in `(-speed/2, speed/2)` and the
    /// radius is uniform in `[1, 1 + size)`.
    pub fn spawn<R: Rng + ?Sized>(
        rng: &mut R,
        viewport: Vec2,
        speed: f32,
        size: f32,
        tint: &ParticleTint,
    ) -> Self {
        let position = Vec2::new(
            rng.gen::<f32>() * viewport.x,
            rng.gen::<f32>() * viewport.y,
        );
        let velocity = Vec2::new(
            (rng.gen::<f32>() - 0.5) * speed,
            (rng.gen::<f32>() - 0.5) * speed,
        );
        let radius = rng.gen::<f32>() * size + 1.0;
        let color = tint.sample(rng);

        Self {
            position,
            velocity,
            radius,
            color,
        }
    }

    /// The particle one frame later.
    ///
    /// The result always lies in `[0, bounds.x) × [0, bounds.y)` for a
    /// non-empty viewport.
    pub fn advanced(self, bounds: Vec2, boundary: Boundary) -> Self {
        let candidate = self.position + self.velocity;

        match boundary {
            Boundary::Wrap => Self {
                position: Vec2::new(wrap_axis(candidate.x, bounds.x), wrap_axis(candidate.y, bounds.y)),
                ..self
            },
            Boundary::Bounce => {
                let (x, vx) = bounce_axis(candidate.x, self.velocity.x, bounds.x);
                let (y, vy) = bounce_axis(candidate.y, self.velocity.y, bounds.y);
                Self {
                    position: Vec2::new(x, y),
                    velocity: Vec2::new(vx, vy),
                    ..self
                }
            }
        }
    }

    /// In-place form of [`advanced`](Self::advanced).
    pub fn advance(&mut self, bounds: Vec2, boundary: Boundary) {
        *self = self.advanced(bounds, boundary);
    }
}

/// Largest float strictly below `bound`.
fn just_below(bound: f32) -> f32 {
    if bound <= 0.0 {
        return 0.0;
    }
    f32::from_bits(bound.to_bits() - 1)
}

fn wrap_axis(pos: f32, bound: f32) -> f32 {
    if bound <= 0.0 {
        return 0.0;
    }
    if pos >= bound {
        0.0
    } else if pos < 0.0 {
        just_below(bound)
    } else {
        pos
    }
}

fn bounce_axis(pos: f32, vel: f32, bound: f32) -> (f32, f32) {
    if bound <= 0.0 {
        return (0.0, vel);
    }
    if pos < 0.0 {
        (0.0, -vel)
    } else if pos >= bound {
        (just_below(bound), -vel)
    } else {
        (pos, vel)
    }
}
