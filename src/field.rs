//! Particle fields.
//!
//! A [`ParticleField`] owns a batch of particles inside a viewport and draws
//! one frame per call to [`ParticleField::step`]: every particle moves and is
//! drawn, nearby pairs are joined by lines, and particles near the pointer
//! are joined to it.
//!
//! # Variants
//!
//! | Variant | Boundary | Pair lines | Pointer lines | Small screens |
//! |---------|----------|------------|---------------|---------------|
//! | [`Variant::Constellation`] | wrap | fixed tint | yes | half count below 768 px |
//! | [`Variant::TechGrid`] | bounce | fade with distance | no | full count |
//!
//! # Example
//!
//! ```
//! use constellation::field::{FieldConfig, FrameContext, ParticleField};
//! use constellation::surface::Frame;
//! use glam::Vec2;
//!
//! let viewport = Vec2::new(1280.0, 720.0);
//! let mut field = ParticleField::new(FieldConfig::constellation(), viewport, 42);
//! let mut frame = Frame::new();
//! let stats = field.step(&FrameContext::new(viewport), &mut frame);
//! assert_eq!(stats.particles, 100);
//! ```

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::particle::{Boundary, Particle};
use crate::surface::{FrameStats, LineKind, Surface};
use crate::visuals::{pointer_line_alpha, ConnectionStyle, ParticleTint, Rgba};

/// Below this viewport width a field may use its small-screen count.
pub const SMALL_SCREEN_WIDTH: f32 = 768.0;

/// Configuration for a particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Number of particles on wide viewports.
    pub particle_count: usize,
    /// Number of particles when the viewport is narrower than
    /// `small_screen_width`. `None` keeps `particle_count`.
    pub small_screen_count: Option<usize>,
    pub small_screen_width: f32,
    /// Pairs closer than this are joined by a line.
    pub connection_distance: f32,
    /// Particles closer than this to the pointer are joined to it.
    pub pointer_distance: f32,
    pub pointer_interaction: bool,
    /// Maximum speed per axis is `speed / 2` pixels per frame.
    pub speed: f32,
    /// Radius spread above the 1 px minimum.
    pub size: f32,
    pub boundary: Boundary,
    pub tint: ParticleTint,
    pub connection: ConnectionStyle,
    pub connection_width: f32,
    /// Pointer lines use this colour with a distance-based alpha.
    pub pointer_color: Rgba,
    pub pointer_width: f32,
}

impl FieldConfig {
    /// Full-page background: wrapping nodes that reach for the pointer.
    pub fn constellation() -> Self {
        Self {
            particle_count: 100,
            small_screen_count: Some(50),
            small_screen_width: SMALL_SCREEN_WIDTH,
            connection_distance: 120.0,
            pointer_distance: 150.0,
            pointer_interaction: true,
            speed: 0.5,
            size: 2.0,
            boundary: Boundary::Wrap,
            tint: ParticleTint::Fixed {
                color: Rgba::ORANGE.with_alpha(0.6),
            },
            connection: ConnectionStyle::Fixed {
                color: Rgba::WHITE.with_alpha(0.15),
            },
            connection_width: 0.5,
            pointer_color: Rgba::ORANGE,
            pointer_width: 1.0,
        }
    }

    /// Hero-section grid: bouncing, individually tinted nodes.
    pub fn tech_grid() -> Self {
        Self {
            particle_count: 80,
            small_screen_count: None,
            small_screen_width: SMALL_SCREEN_WIDTH,
            connection_distance: 150.0,
            pointer_distance: 200.0,
            pointer_interaction: false,
            speed: 0.5,
            size: 2.0,
            boundary: Boundary::Bounce,
            tint: ParticleTint::RandomAlpha {
                color: Rgba::ORANGE,
                min_alpha: 0.1,
                max_alpha: 0.6,
            },
            connection: ConnectionStyle::Graduated {
                color: Rgba::WHITE,
                falloff: 0.15,
            },
            connection_width: 0.5,
            pointer_color: Rgba::ORANGE,
            pointer_width: 1.0,
        }
    }

    /// Particle count for a viewport of the given width.
    pub fn count_for_width(&self, width: f32) -> usize {
        match self.small_screen_count {
            Some(small) if width < self.small_screen_width => small,
            _ => self.particle_count,
        }
    }

    /// Reject values that would make the field meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("connection_distance", self.connection_distance),
            ("pointer_distance", self.pointer_distance),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        let non_negative = [
            ("speed", self.speed),
            ("size", self.size),
            ("connection_width", self.connection_width),
            ("pointer_width", self.pointer_width),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must not be negative, got {value}")));
            }
        }
        if let ParticleTint::RandomAlpha {
            min_alpha,
            max_alpha,
            ..
        } = self.tint
        {
            if !(0.0..=1.0).contains(&min_alpha) || !(0.0..=1.0).contains(&max_alpha) || min_alpha > max_alpha {
                return Err(ConfigError::Invalid(format!(
                    "tint alpha range {min_alpha}..{max_alpha} is not inside 0..1"
                )));
            }
        }
        Ok(())
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::constellation()
    }
}

/// The two shipped field presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Constellation,
    TechGrid,
}

impl Variant {
    pub fn config(self) -> FieldConfig {
        match self {
            Variant::Constellation => FieldConfig::constellation(),
            Variant::TechGrid => FieldConfig::tech_grid(),
        }
    }

    /// Id of the canvas element a page provides for this variant.
    pub fn canvas_id(self) -> &'static str {
        match self {
            Variant::Constellation => "bg-animation",
            Variant::TechGrid => "tech-canvas",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variant::Constellation => "constellation",
            Variant::TechGrid => "tech-grid",
        })
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constellation" => Ok(Variant::Constellation),
            "tech-grid" | "tech_grid" => Ok(Variant::TechGrid),
            other => Err(format!("unknown variant {other:?}, expected constellation or tech-grid")),
        }
    }
}

/// Per-frame inputs, passed explicitly rather than read from shared state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Current viewport size. A change regenerates the field.
    pub viewport: Vec2,
    /// Tracked pointer position, if any.
    pub pointer: Option<Vec2>,
}

impl FrameContext {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            pointer: None,
        }
    }

    pub fn with_pointer(mut self, pointer: Option<Vec2>) -> Self {
        self.pointer = pointer;
        self
    }
}

/// A batch of particles animated inside a viewport.
pub struct ParticleField {
    config: FieldConfig,
    viewport: Vec2,
    particles: Vec<Particle>,
    rng: StdRng,
    frames: u64,
}

impl ParticleField {
    /// Create a field sized for `viewport`, with the count the config picks
    /// for that width.
    pub fn new(config: FieldConfig, viewport: Vec2, seed: u64) -> Self {
        let count = config.count_for_width(viewport.x);
        Self::with_count(config, viewport, count, seed)
    }

    /// Create a field with an explicit particle count.
    pub fn with_count(config: FieldConfig, viewport: Vec2, count: usize, seed: u64) -> Self {
        let mut field = Self {
            config,
            viewport,
            particles: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            frames: 0,
        };
        field.initialize(count);
        field
    }

    /// Create a field from existing particles.
    pub fn from_particles(config: FieldConfig, viewport: Vec2, particles: Vec<Particle>, seed: u64) -> Self {
        Self {
            config,
            viewport,
            particles,
            rng: StdRng::seed_from_u64(seed),
            frames: 0,
        }
    }

    /// Discard all particles and spawn `count` new ones.
    pub fn initialize(&mut self, count: usize) {
        let viewport = self.viewport;
        let (speed, size) = (self.config.speed, self.config.size);
        let tint = self.config.tint;
        let rng = &mut self.rng;
        self.particles = (0..count)
            .map(|_| Particle::spawn(rng, viewport, speed, size, &tint))
            .collect();
        log::debug!(
            "spawned {} particles in {}x{}",
            count,
            viewport.x,
            viewport.y
        );
    }

    /// Adopt a new viewport and regenerate every particle.
    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        let count = self.config.count_for_width(viewport.x);
        self.initialize(count);
    }

    /// Advance one frame and draw it.
    pub fn step<S: Surface>(&mut self, ctx: &FrameContext, surface: &mut S) -> FrameStats {
        if ctx.viewport != self.viewport {
            self.resize(ctx.viewport);
        }

        let config = &self.config;
        let pointer = if config.pointer_interaction {
            ctx.pointer
        } else {
            None
        };
        let base = config.tint.base();
        let mut stats = FrameStats {
            particles: self.particles.len(),
            ..Default::default()
        };

        surface.clear(self.viewport);

        for i in 0..self.particles.len() {
            let p = self.particles[i].advanced(self.viewport, config.boundary);
            self.particles[i] = p;
            surface.fill_circle(p.position, p.radius, p.color.unwrap_or(base));

            for other in &self.particles[i + 1..] {
                let distance = p.position.distance(other.position);
                if distance < config.connection_distance {
                    let color = config.connection.color_at(distance, config.connection_distance);
                    surface.stroke_line(p.position, other.position, config.connection_width, color);
                    stats.record(LineKind::Connection);
                }
            }

            if let Some(target) = pointer {
                let distance = p.position.distance(target);
                if distance < config.pointer_distance {
                    let alpha = pointer_line_alpha(distance, config.pointer_distance);
                    surface.stroke_line(
                        p.position,
                        target,
                        config.pointer_width,
                        config.pointer_color.with_alpha(alpha),
                    );
                    stats.record(LineKind::Pointer);
                }
            }
        }

        self.frames += 1;
        stats
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Frames stepped since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, Frame};

    const WIDE: Vec2 = Vec2::new(1280.0, 720.0);

    fn still(x: f32, y: f32) -> Particle {
        Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            radius: 2.0,
            color: None,
        }
    }

    #[test]
    fn test_initialize_exact_count_inside_viewport() {
        for n in [0usize, 1, 2, 17, 250] {
            let field = ParticleField::with_count(FieldConfig::constellation(), WIDE, n, 1);
            assert_eq!(field.len(), n);
            for p in field.particles() {
                assert!((0.0..WIDE.x).contains(&p.position.x));
                assert!((0.0..WIDE.y).contains(&p.position.y));
            }
        }
    }

    #[test]
    fn test_constellation_halves_on_small_screens() {
        let config = FieldConfig::constellation();
        assert_eq!(config.count_for_width(1280.0), 100);
        assert_eq!(config.count_for_width(767.0), 50);
        assert_eq!(config.count_for_width(768.0), 100);
    }

    #[test]
    fn test_tech_grid_keeps_count_on_small_screens() {
        let config = FieldConfig::tech_grid();
        assert_eq!(config.count_for_width(320.0), 80);
    }

    #[test]
    fn test_resize_regenerates() {
        let mut field = ParticleField::new(FieldConfig::constellation(), WIDE, 9);
        let before: Vec<Vec2> = field.particles().iter().map(|p| p.position).collect();
        field.resize(Vec2::new(500.0, 800.0));
        assert_eq!(field.len(), 50);
        assert_eq!(field.viewport(), Vec2::new(500.0, 800.0));
        let after: Vec<Vec2> = field.particles().iter().map(|p| p.position).collect();
        assert_ne!(before[..50], after[..]);
        for p in field.particles() {
            assert!(p.position.x < 500.0);
        }
    }

    #[test]
    fn test_step_with_new_viewport_regenerates() {
        let mut field = ParticleField::new(FieldConfig::constellation(), WIDE, 9);
        let mut frame = Frame::new();
        let stats = field.step(&FrameContext::new(Vec2::new(600.0, 400.0)), &mut frame);
        assert_eq!(stats.particles, 50);
        assert_eq!(field.viewport(), Vec2::new(600.0, 400.0));
    }

    #[test]
    fn test_frame_starts_with_clear_and_draws_every_particle() {
        let mut field = ParticleField::new(FieldConfig::tech_grid(), WIDE, 5);
        let mut frame = Frame::new();
        field.step(&FrameContext::new(WIDE), &mut frame);
        assert_eq!(frame.commands()[0], DrawCommand::Clear { size: WIDE });
        assert_eq!(frame.circles().count(), 80);
        assert_eq!(field.frames(), 1);
    }

    #[test]
    fn test_connections_only_below_threshold() {
        let particles = vec![still(100.0, 100.0), still(200.0, 100.0), still(400.0, 100.0)];
        let mut field = ParticleField::from_particles(FieldConfig::constellation(), WIDE, particles, 0);
        let mut frame = Frame::new();
        let stats = field.step(&FrameContext::new(WIDE), &mut frame);
        // 100 apart connects, 200 and 300 apart do not
        assert_eq!(stats.connections, 1);
        let line = frame.lines().next();
        match line {
            Some(DrawCommand::Line { color, width, .. }) => {
                assert_eq!(*color, Rgba::WHITE.with_alpha(0.15));
                assert_eq!(*width, 0.5);
            }
            other => panic!("expected a line, got {other:?}"),
        }
    }

    #[test]
    fn test_tech_grid_lines_fade_with_distance() {
        let particles = vec![still(100.0, 100.0), still(110.0, 100.0), still(100.0, 240.0)];
        let mut field = ParticleField::from_particles(FieldConfig::tech_grid(), WIDE, particles, 0);
        let mut frame = Frame::new();
        field.step(&FrameContext::new(WIDE), &mut frame);
        let alphas: Vec<f32> = frame
            .lines()
            .filter_map(|c| match c {
                DrawCommand::Line { color, .. } => Some(color.a),
                _ => None,
            })
            .collect();
        // (0,1) at 10px, (0,2) at 140px, (1,2) at ~140.4px
        assert_eq!(alphas.len(), 3);
        assert!(alphas[0] > alphas[1]);
    }

    #[test]
    fn test_pointer_lines_follow_pointer_presence() {
        let particles = vec![still(100.0, 100.0), still(500.0, 500.0)];
        let mut field = ParticleField::from_particles(FieldConfig::constellation(), WIDE, particles, 0);
        let pointer = Vec2::new(100.0, 175.0);

        let mut frame = Frame::new();
        let stats = field.step(&FrameContext::new(WIDE).with_pointer(Some(pointer)), &mut frame);
        assert_eq!(stats.pointer_lines, 1);
        match frame.lines_to(pointer).next() {
            Some(DrawCommand::Line { color, width, .. }) => {
                assert!((color.a - 0.5).abs() < 1e-6);
                assert_eq!(*width, 1.0);
            }
            other => panic!("expected a pointer line, got {other:?}"),
        }

        let stats = field.step(&FrameContext::new(WIDE), &mut frame);
        assert_eq!(stats.pointer_lines, 0);
        assert_eq!(frame.lines_to(pointer).count(), 0);
    }

    #[test]
    fn test_tech_grid_ignores_pointer() {
        let particles = vec![still(100.0, 100.0)];
        let mut field = ParticleField::from_particles(FieldConfig::tech_grid(), WIDE, particles, 0);
        let mut frame = Frame::new();
        let ctx = FrameContext::new(WIDE).with_pointer(Some(Vec2::new(101.0, 101.0)));
        assert_eq!(field.step(&ctx, &mut frame).pointer_lines, 0);
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = ParticleField::new(FieldConfig::tech_grid(), WIDE, 77);
        let b = ParticleField::new(FieldConfig::tech_grid(), WIDE, 77);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_validate() {
        assert!(FieldConfig::constellation().validate().is_ok());
        assert!(FieldConfig::tech_grid().validate().is_ok());

        let mut bad = FieldConfig::constellation();
        bad.connection_distance = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = FieldConfig::constellation();
        bad.speed = f32::NAN;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_variant_parse_and_canvas() {
        assert_eq!("tech-grid".parse::<Variant>().unwrap(), Variant::TechGrid);
        assert_eq!(Variant::Constellation.canvas_id(), "bg-animation");
        assert_eq!(Variant::TechGrid.to_string(), "tech-grid");
        assert!("sparkles".parse::<Variant>().is_err());
    }
}
