//! The particle field simulator.
//!
//! A [`ParticleField`] owns one surface and a fixed set of particles. Each
//! [`tick`](ParticleField::tick) clears the surface, moves every particle
//! (wrapping at the edges), draws it, then links every pair closer than the
//! proximity threshold.
//!
//! ```text
//! Uninitialized --start()--> Running --teardown()--> Destroyed
//!                              |  ^
//!                              +--+ tick()
//! ```
//!
//! Fields are usually created through [`ParticleGround::attach`](crate::ParticleGround::attach),
//! which also wires them to a [`Stage`](crate::Stage)'s resize and pointer
//! events and its frame loop. They can be driven by hand as well.

use glam::{UVec2, Vec2};
use rand::Rng;

use crate::config::GroundConfig;
use crate::links::{for_each_link, Highlight};
use crate::particle::{spawn_particles, Particle};
use crate::surface::{DotStyle, LineStyle, Surface};

/// Lifecycle state of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Uninitialized,
    Running,
    /// Terminal. Ticks, resizes and pointer updates are ignored.
    Destroyed,
}

/// Callbacks run once on start and once on teardown.
#[derive(Default)]
pub struct Hooks {
    pub on_init: Option<Box<dyn FnMut()>>,
    pub on_destroy: Option<Box<dyn FnMut()>>,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("on_init", &self.on_init.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .finish()
    }
}

/// One simulated, self-drawing particle background.
pub struct ParticleField<S: Surface> {
    config: GroundConfig,
    surface: Option<S>,
    particles: Vec<Particle>,
    /// Parallax offset, applied when drawing only.
    offset: Vec2,
    state: FieldState,
    highlight: Box<dyn Highlight>,
    hooks: Hooks,
    frame: u64,
    render_positions: Vec<Vec2>,
}

impl<S: Surface> ParticleField<S> {
    /// Spawn `round(width × height / density)` particles on `surface`.
    /// `highlight` picks which links get the highlight style each frame.
    ///
    /// The field starts [`Uninitialized`](FieldState::Uninitialized); call
    /// [`start`](Self::start) before ticking.
    pub fn new<R: Rng + ?Sized>(
        surface: S,
        config: GroundConfig,
        highlight: Box<dyn Highlight>,
        rng: &mut R,
    ) -> Self {
        let size = surface.size();
        let count = config.particle_count(size.x, size.y);
        let particles = spawn_particles(rng, count, size.as_vec2(), &config);

        Self {
            config,
            surface: Some(surface),
            render_positions: Vec::with_capacity(particles.len()),
            particles,
            offset: Vec2::ZERO,
            state: FieldState::Uninitialized,
            highlight,
            hooks: Hooks::default(),
            frame: 0,
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Move to `Running` and run the init hook. Only the first call has an effect.
    pub fn start(&mut self) -> bool {
        if self.state != FieldState::Uninitialized {
            return false;
        }
        self.state = FieldState::Running;
        tracing::debug!(
            particles = self.particles.len(),
            size = ?self.size(),
            "particle field started"
        );
        if let Some(on_init) = self.hooks.on_init.as_mut() {
            on_init();
        }
        true
    }

    /// Advance and draw one frame. Returns `false` (and touches nothing) unless running.
    pub fn tick(&mut self) -> bool {
        if self.state != FieldState::Running {
            return false;
        }
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };

        let bounds = surface.size().as_vec2();
        let dot = DotStyle {
            color: self.config.dot_color,
            opacity: self.config.dot_opacity,
        };

        surface.clear();
        self.render_positions.clear();
        for particle in &mut self.particles {
            particle.advance(bounds);
            let at = particle.position + self.offset;
            surface.fill_circle(at, self.config.particle_radius, &dot);
            self.render_positions.push(at);
        }

        let plain = LineStyle {
            color: self.config.line_color,
            width: self.config.line_width,
            opacity: self.config.line_opacity,
            glow: 0.0,
        };
        let neon = LineStyle {
            color: self.config.highlight_color,
            width: self.config.line_width * 2.0,
            opacity: self.config.highlight_opacity,
            glow: self.config.glow_radius,
        };
        let highlight = &mut self.highlight;
        for_each_link(&self.render_positions, self.config.proximity, |link| {
            let style = if highlight.highlight(link.a, link.b) {
                &neon
            } else {
                &plain
            };
            surface.stroke_line(link.from, link.to, style);
        });

        self.frame += 1;
        tracing::trace!(frame = self.frame, "particle field frame");
        true
    }

    /// Resize the surface. Particles stay where they are; any now outside
    /// the new bounds wrap on the next tick.
    pub fn resize(&mut self, size: UVec2) {
        if self.state == FieldState::Destroyed {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            if surface.size() != size {
                tracing::debug!(from = ?surface.size(), to = ?size, "particle field resized");
                surface.resize(size);
            }
        }
    }

    /// Recompute the parallax offset from a pointer position in the same
    /// coordinates as the surface. Ignored when parallax is disabled.
    pub fn point_at(&mut self, pointer: Vec2) {
        if self.state == FieldState::Destroyed || !self.config.parallax {
            return;
        }
        let center = self.size().as_vec2() * 0.5;
        self.offset = (pointer - center) / self.config.parallax_multiplier;
    }

    /// Move to `Destroyed`: hand the surface to `release`, then run the
    /// destroy hook. Returns `false` if the field was already torn down.
    pub fn teardown(&mut self, release: impl FnOnce(S)) -> bool {
        if self.state == FieldState::Destroyed {
            return false;
        }
        self.state = FieldState::Destroyed;
        if let Some(surface) = self.surface.take() {
            release(surface);
        }
        tracing::debug!(frames = self.frame, "particle field destroyed");
        if let Some(on_destroy) = self.hooks.on_destroy.as_mut() {
            on_destroy();
        }
        true
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access for placing particles deliberately, e.g. in tests.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn config(&self) -> &GroundConfig {
        &self.config
    }

    /// The surface, until teardown.
    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    /// Current surface size, zero after teardown.
    pub fn size(&self) -> UVec2 {
        self.surface.as_ref().map_or(UVec2::ZERO, |s| s.size())
    }

    /// Frames drawn so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
