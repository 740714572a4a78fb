//! Colors in the notation page stylesheets use.
//!
//! Configuration carries colors as strings (`"#228B22"`,
//! `"rgba(34, 139, 34, 0.6)"`), so [`Color`] parses the common CSS forms and
//! serializes back to a canonical `rgba(...)` string.
//!
//! ```
//! use particle_ground::Color;
//!
//! let green: Color = "#228B22".parse().unwrap();
//! assert_eq!(green.to_rgba8(), [34, 139, 34, 255]);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// A straight-alpha RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    /// Opaque color from components in `0.0..=1.0`.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Color from 8-bit channels, the way `#rrggbb` spells them.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// The same color with its alpha multiplied by `opacity`.
    ///
    /// This is what a 2D canvas does when `globalAlpha` is applied on top of
    /// an `rgba()` fill style.
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self {
            a: self.a * opacity.clamp(0.0, 1.0),
            ..self
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(hex) = trimmed.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorError::new(s));
        }
        let lower = trimmed.to_ascii_lowercase();
        if let Some(body) = lower.strip_prefix("rgba(").and_then(|b| b.strip_suffix(')')) {
            return parse_functional(body, true).ok_or_else(|| ColorError::new(s));
        }
        if let Some(body) = lower.strip_prefix("rgb(").and_then(|b| b.strip_suffix(')')) {
            return parse_functional(body, false).ok_or_else(|| ColorError::new(s));
        }
        Err(ColorError::new(s))
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::from_rgba8(
            digit(0)? * 17,
            digit(1)? * 17,
            digit(2)? * 17,
            255,
        )),
        6 => Some(Color::from_rgba8(pair(0)?, pair(2)?, pair(4)?, 255)),
        8 => Some(Color::from_rgba8(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
        _ => None,
    }
}

fn parse_functional(body: &str, with_alpha: bool) -> Option<Color> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }
    let mut channels = [0.0f32; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        let value: f32 = part.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        *slot = value.clamp(0.0, 255.0) / 255.0;
    }
    let alpha = if with_alpha {
        let value: f32 = parts[3].parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        value.clamp(0.0, 1.0)
    } else {
        1.0
    };
    Some(Color::rgba(channels[0], channels[1], channels[2], alpha))
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, _] = self.to_rgba8();
        write!(f, "rgba({}, {}, {}, {})", r, g, b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        let short: Color = "#fff".parse().unwrap();
        assert_eq!(short.to_rgba8(), [255, 255, 255, 255]);

        let long: Color = "#228B22".parse().unwrap();
        assert_eq!(long.to_rgba8(), [34, 139, 34, 255]);

        let with_alpha: Color = "#228b2280".parse().unwrap();
        assert_eq!(with_alpha.to_rgba8(), [34, 139, 34, 128]);
    }

    #[test]
    fn test_parse_functional_forms() {
        let rgba: Color = "rgba(34, 139, 34, 0.6)".parse().unwrap();
        assert_eq!(rgba.to_rgba8()[..3], [34, 139, 34]);
        assert!((rgba.a - 0.6).abs() < 1e-6);

        let rgb: Color = " RGB(10,20,30) ".parse().unwrap();
        assert_eq!(rgb.to_rgba8(), [10, 20, 30, 255]);
    }

    #[test]
    fn test_rejects_garbage() {
        for bad in ["", "#12", "#ggg", "rgba(1,2,3)", "rgb(1,2)", "green", "rgb(a,b,c)"] {
            assert!(bad.parse::<Color>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_with_opacity_multiplies_alpha() {
        let c = Color::rgba(1.0, 0.0, 0.0, 0.5).with_opacity(0.6);
        assert!((c.a - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_serde_string_form() {
        let c: Color = serde_json::from_str("\"#7CFC00\"").unwrap();
        assert_eq!(c.to_rgba8(), [124, 252, 0, 255]);
        let back = serde_json::to_string(&c).unwrap();
        let again: Color = serde_json::from_str(&back).unwrap();
        assert_eq!(again.to_rgba8(), c.to_rgba8());
    }
}
