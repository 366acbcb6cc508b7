//! Visual configuration for particle rendering.
//!
//! Colours, particle tints and connection line styles. These control how a
//! field looks, separate from the boundary policy that controls how it moves.
//!
//! Colours are written the way a stylesheet writes them:
//!
//! ```
//! use constellation::visuals::Rgba;
//!
//! let accent: Rgba = "rgba(249, 115, 22, 0.6)".parse().unwrap();
//! assert_eq!(accent.to_string(), "rgba(249, 115, 22, 0.6)");
//! ```

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An sRGB colour with 8-bit channels and a float alpha in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    /// Primary orange used across the site.
    pub const ORANGE: Rgba = Rgba::rgb(249, 115, 22);
    /// Plain white.
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    /// Opaque colour from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Colour from channels and alpha.
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same colour with a different alpha (clamped).
    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Linear float channels for GPU upload, alpha not premultiplied.
    pub fn to_array(self) -> [f32; 4] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            self.a,
        ]
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        c.to_string()
    }
}

impl TryFrom<String> for Rgba {
    type Error = ParseColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Returned when a colour string is not `#rrggbb`, `rgb(..)` or `rgba(..)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised colour {:?}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let t = s.trim();

        if let Some(hex) = t.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(err());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
            return Ok(Rgba::rgb(channel(0)?, channel(2)?, channel(4)?));
        }

        let (body, want_alpha) = if let Some(rest) = t.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = t.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(err());
        };
        let body = body.strip_suffix(')').ok_or_else(err)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != if want_alpha { 4 } else { 3 } {
            return Err(err());
        }

        let channel = |p: &str| p.parse::<u8>().map_err(|_| err());
        let a = if want_alpha {
            let a: f32 = parts[3].parse().map_err(|_| err())?;
            if !(0.0..=1.0).contains(&a) {
                return Err(err());
            }
            a
        } else {
            1.0
        };
        Ok(Rgba::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, a))
    }
}

/// How each particle in a field is coloured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticleTint {
    /// Every particle uses the field colour.
    Fixed { color: Rgba },
    /// Each particle picks its own alpha in `min_alpha..max_alpha` at spawn.
    RandomAlpha {
        color: Rgba,
        min_alpha: f32,
        max_alpha: f32,
    },
}

impl ParticleTint {
    /// Per-instance colour for a freshly spawned particle, or `None` when the
    /// field colour applies.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Rgba> {
        match *self {
            ParticleTint::Fixed { .. } => None,
            ParticleTint::RandomAlpha {
                color,
                min_alpha,
                max_alpha,
            } => {
                let a = if max_alpha > min_alpha {
                    rng.gen_range(min_alpha..max_alpha)
                } else {
                    min_alpha
                };
                Some(color.with_alpha(a))
            }
        }
    }

    /// Colour used when a particle carries no per-instance colour.
    pub fn base(&self) -> Rgba {
        match *self {
            ParticleTint::Fixed { color } => color,
            ParticleTint::RandomAlpha { color, .. } => color,
        }
    }
}

/// Colour rule for lines between two nearby particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConnectionStyle {
    /// Same colour at every distance under the threshold.
    Fixed { color: Rgba },
    /// Alpha is `1 - (distance / threshold) * falloff`.
    Graduated { color: Rgba, falloff: f32 },
}

impl ConnectionStyle {
    /// Line colour for a pair `distance` apart, given the connection threshold.
    pub fn color_at(&self, distance: f32, threshold: f32) -> Rgba {
        match *self {
            ConnectionStyle::Fixed { color } => color,
            ConnectionStyle::Graduated { color, falloff } => {
                color.with_alpha(1.0 - distance / threshold * falloff)
            }
        }
    }
}

/// Opacity of the line from a particle to the pointer.
///
/// Fully opaque at distance 0, reaching exactly 0 at `threshold`, and clamped
/// to 0 beyond it.
pub fn pointer_line_alpha(distance: f32, threshold: f32) -> f32 {
    if threshold <= 0.0 {
        return 0.0;
    }
    (1.0 - distance / threshold).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgba() {
        let c: Rgba = "rgba(249, 115, 22, 0.6)".parse().unwrap();
        assert_eq!(c, Rgba::new(249, 115, 22, 0.6));
    }

    #[test]
    fn test_parse_rgb_and_hex() {
        assert_eq!("rgb(1,2,3)".parse::<Rgba>().unwrap(), Rgba::rgb(1, 2, 3));
        assert_eq!("#f97316".parse::<Rgba>().unwrap(), Rgba::ORANGE);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("orange".parse::<Rgba>().is_err());
        assert!("rgba(1,2,3)".parse::<Rgba>().is_err());
        assert!("rgba(1,2,3,2.0)".parse::<Rgba>().is_err());
        assert!("rgb(256,0,0)".parse::<Rgba>().is_err());
        assert!("#fff".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_serde_uses_css_strings() {
        let json = serde_json::to_string(&Rgba::new(255, 255, 255, 0.15)).unwrap();
        assert_eq!(json, "\"rgba(255, 255, 255, 0.15)\"");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgba::new(255, 255, 255, 0.15));
    }

    #[test]
    fn test_pointer_alpha_endpoints() {
        assert_eq!(pointer_line_alpha(0.0, 150.0), 1.0);
        assert_eq!(pointer_line_alpha(150.0, 150.0), 0.0);
        assert_eq!(pointer_line_alpha(400.0, 150.0), 0.0);
    }

    #[test]
    fn test_pointer_alpha_monotonic() {
        let mut last = f32::INFINITY;
        for step in 0..=150 {
            let a = pointer_line_alpha(step as f32, 150.0);
            assert!(a <= last);
            last = a;
        }
        assert!(pointer_line_alpha(0.001, 150.0) > 0.999);
    }

    #[test]
    fn test_graduated_connection_fades_with_distance() {
        let style = ConnectionStyle::Graduated {
            color: Rgba::WHITE,
            falloff: 0.15,
        };
        let near = style.color_at(10.0, 150.0).a;
        let far = style.color_at(140.0, 150.0).a;
        assert!(near > far);
        assert!((style.color_at(150.0, 150.0).a - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_fixed_connection_ignores_distance() {
        let color = Rgba::new(255, 255, 255, 0.15);
        let style = ConnectionStyle::Fixed { color };
        assert_eq!(style.color_at(1.0, 120.0), color);
        assert_eq!(style.color_at(119.0, 120.0), color);
    }
}
