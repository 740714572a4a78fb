//! Configuration for a particle field.
//!
//! [`GroundConfig`] is plain data: every key has a default, JSON overrides
//! use the same camelCase names page scripts pass to the plugin, and keys the
//! crate does not know are ignored.
//!
//! ```
//! use particle_ground::GroundConfig;
//!
//! let json = r##"{ "density": 5000, "dotColor": "#fff", "sparkle": 3 }"##;
//! let config = GroundConfig::from_json(json).unwrap();
//! assert_eq!(config.density, 5000.0);
//! assert_eq!(config.proximity, 100.0);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::GroundError;

/// Upper bound on particles per field. Links are checked pairwise every
/// frame, so counts past this are clamped.
pub const MAX_PARTICLES: usize = 50_000;

/// Smallest accepted density: one particle per square pixel.
pub const MIN_DENSITY: f64 = 1.0;

/// Horizontal drift preference for spawned particles.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectionX {
    /// Random sign per particle.
    #[default]
    Center,
    Left,
    Right,
}

/// Vertical drift preference for spawned particles.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DirectionY {
    /// Random sign per particle.
    #[default]
    Center,
    Up,
    Down,
}

impl DirectionX {
    /// Forced sign of the x velocity, or `None` for a coin flip.
    pub fn sign(self) -> Option<f32> {
        match self {
            DirectionX::Center => None,
            DirectionX::Left => Some(-1.0),
            DirectionX::Right => Some(1.0),
        }
    }
}

impl DirectionY {
    /// Forced sign of the y velocity (y grows downward), or `None` for a coin flip.
    pub fn sign(self) -> Option<f32> {
        match self {
            DirectionY::Center => None,
            DirectionY::Up => Some(-1.0),
            DirectionY::Down => Some(1.0),
        }
    }
}

/// Tunables for one particle field.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GroundConfig {
    /// Slowest horizontal speed, in pixels per frame.
    pub min_speed_x: f32,
    pub max_speed_x: f32,
    pub min_speed_y: f32,
    pub max_speed_y: f32,
    pub direction_x: DirectionX,
    pub direction_y: DirectionY,
    /// Surface area (px²) per particle.
    pub density: f64,
    pub dot_color: Color,
    pub line_color: Color,
    pub particle_radius: f32,
    pub line_width: f32,
    /// Accepted for compatibility with existing page configs; lines are always straight.
    pub curved_lines: bool,
    /// Two particles closer than this are linked.
    pub proximity: f32,
    pub parallax: bool,
    /// Divides the pointer's distance from the surface center.
    pub parallax_multiplier: f32,
    pub dot_opacity: f32,
    pub line_opacity: f32,
    /// Probability that a given link is drawn in the highlight style on a given frame.
    pub highlight_chance: f64,
    pub highlight_color: Color,
    pub highlight_opacity: f32,
    pub glow_radius: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        let forest = Color::from_rgba8(0x22, 0x8B, 0x22, 0xFF);
        Self {
            min_speed_x: 0.1,
            max_speed_x: 0.7,
            min_speed_y: 0.1,
            max_speed_y: 0.7,
            direction_x: DirectionX::Center,
            direction_y: DirectionY::Center,
            density: 10_000.0,
            dot_color: forest,
            line_color: forest,
            particle_radius: 7.0,
            line_width: 1.0,
            curved_lines: false,
            proximity: 100.0,
            parallax: true,
            parallax_multiplier: 5.0,
            dot_opacity: 0.6,
            line_opacity: 0.25,
            highlight_chance: 0.7,
            highlight_color: Color::from_rgba8(0x7C, 0xFC, 0x00, 0xFF),
            highlight_opacity: 0.9,
            glow_radius: 8.0,
        }
    }
}

impl GroundConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge JSON overrides onto the defaults and validate the result.
    pub fn from_json(json: &str) -> Result<Self, GroundError> {
        let config: GroundConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load JSON overrides from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GroundError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the full configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GroundError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Check every value is usable by the simulation.
    pub fn validate(&self) -> Result<(), GroundError> {
        let finite = [
            ("minSpeedX", self.min_speed_x),
            ("maxSpeedX", self.max_speed_x),
            ("minSpeedY", self.min_speed_y),
            ("maxSpeedY", self.max_speed_y),
            ("particleRadius", self.particle_radius),
            ("lineWidth", self.line_width),
            ("proximity", self.proximity),
            ("parallaxMultiplier", self.parallax_multiplier),
            ("glowRadius", self.glow_radius),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(invalid(format!("{} must be finite", name)));
            }
        }
        for (name, value) in [
            ("particleRadius", self.particle_radius),
            ("lineWidth", self.line_width),
            ("proximity", self.proximity),
            ("glowRadius", self.glow_radius),
        ] {
            if value < 0.0 {
                return Err(invalid(format!("{} must not be negative", name)));
            }
        }

        check_speed_range("X", self.min_speed_x, self.max_speed_x)?;
        check_speed_range("Y", self.min_speed_y, self.max_speed_y)?;

        if !(self.density.is_finite() && self.density >= MIN_DENSITY) {
            return Err(invalid(format!(
                "density must be a number of at least {}, got {}",
                MIN_DENSITY, self.density
            )));
        }
        if self.parallax_multiplier == 0.0 {
            return Err(invalid("parallaxMultiplier must not be zero".into()));
        }

        for (name, value) in [
            ("dotOpacity", self.dot_opacity),
            ("lineOpacity", self.line_opacity),
            ("highlightOpacity", self.highlight_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{} must be within 0..=1, got {}", name, value)));
            }
        }
        if !(0.0..=1.0).contains(&self.highlight_chance) {
            return Err(invalid(format!(
                "highlightChance must be within 0..=1, got {}",
                self.highlight_chance
            )));
        }
        Ok(())
    }

    /// Number of particles for a surface of `width × height` pixels, at
    /// most [`MAX_PARTICLES`].
    pub fn particle_count(&self, width: u32, height: u32) -> usize {
        let area = width as f64 * height as f64;
        let count = (area / self.density).round();
        if count > MAX_PARTICLES as f64 {
            tracing::warn!(
                width,
                height,
                density = self.density,
                "particle count capped at {}",
                MAX_PARTICLES
            );
            return MAX_PARTICLES;
        }
        count as usize
    }

    pub fn with_speed_x(mut self, min: f32, max: f32) -> Self {
        self.min_speed_x = min;
        self.max_speed_x = max;
        self
    }

    pub fn with_speed_y(mut self, min: f32, max: f32) -> Self {
        self.min_speed_y = min;
        self.max_speed_y = max;
        self
    }

    pub fn with_direction(mut self, x: DirectionX, y: DirectionY) -> Self {
        self.direction_x = x;
        self.direction_y = y;
        self
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn with_dot_color(mut self, color: Color) -> Self {
        self.dot_color = color;
        self
    }

    pub fn with_line_color(mut self, color: Color) -> Self {
        self.line_color = color;
        self
    }

    pub fn with_particle_radius(mut self, radius: f32) -> Self {
        self.particle_radius = radius;
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    pub fn with_proximity(mut self, proximity: f32) -> Self {
        self.proximity = proximity;
        self
    }

    /// Enable pointer parallax with the given divisor.
    pub fn with_parallax(mut self, multiplier: f32) -> Self {
        self.parallax = true;
        self.parallax_multiplier = multiplier;
        self
    }

    pub fn without_parallax(mut self) -> Self {
        self.parallax = false;
        self
    }

    pub fn with_highlight(mut self, chance: f64, color: Color) -> Self {
        self.highlight_chance = chance;
        self.highlight_color = color;
        self
    }
}

fn invalid(msg: String) -> GroundError {
    GroundError::InvalidConfig(msg)
}

fn check_speed_range(axis: &str, min: f32, max: f32) -> Result<(), GroundError> {
    if min < 0.0 {
        return Err(invalid(format!("minSpeed{} must not be negative", axis)));
    }
    if min > max {
        return Err(invalid(format!(
            "minSpeed{axis} ({min}) is greater than maxSpeed{axis} ({max})"
        )));
    }
    Ok(())
}
