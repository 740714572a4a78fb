//! # Particle Ground
//!
//! Drifting particle backgrounds: dots wander across a surface, wrap at its
//! edges, and are linked by thin lines whenever two of them come close.
//! Some of those links flare up in a glowing highlight style each frame.
//!
//! ## Quick Start
//!
//! ```
//! use particle_ground::prelude::*;
//!
//! let mut stage = Stage::new(RasterFactory, UVec2::new(800, 600));
//! let hero = stage.add_container(Sizing::FillViewport);
//!
//! let handle = ParticleGround::new()
//!     .with_config(GroundConfig::default().with_density(12_000.0))
//!     .attach(&mut stage, hero)
//!     .unwrap();
//!
//! for _ in 0..60 {
//!     stage.run_frame();
//! }
//!
//! handle.destroy(&mut stage);
//! ```
//!
//! ## Core Concepts
//!
//! ### Stage
//!
//! A [`Stage`] stands in for the page: it owns containers, forwards window
//! resizes and pointer moves to the fields observing them, and runs the
//! frame loop. Each container holds at most one field; attaching twice
//! returns the first handle.
//!
//! ### Fields
//!
//! A [`ParticleField`] owns its [`Surface`] and a fixed number of particles,
//! `round(width × height / density)`. Each frame it clears, moves and draws
//! every particle, then links pairs closer than `proximity`.
//!
//! ### Surfaces
//!
//! | Surface | Use |
//! |---------|-----|
//! | [`RasterSurface`] | Pixels in an [`image::RgbaImage`], shown by the `particle-ground` binary |
//! | [`RecordingSurface`] | A log of [`DrawCommand`]s, for tests |
//!
//! ### Configuration
//!
//! [`GroundConfig`] holds every tunable with sensible defaults and reads
//! JSON overrides with the same camelCase keys page scripts use
//! (`minSpeedX`, `dotColor`, `parallaxMultiplier`, ...).

mod color;
pub mod config;
mod error;
pub mod field;
mod ground;
pub mod links;
pub mod particle;
mod raster;
pub mod schedule;
pub mod stage;
pub mod surface;

pub use color::Color;
pub use config::{DirectionX, DirectionY, GroundConfig};
pub use error::{AppError, ColorError, GpuError, GroundError};
pub use field::{FieldState, Hooks, ParticleField};
pub use glam::{UVec2, Vec2};
pub use ground::{initialize, ParticleGround};
pub use links::{AlwaysHighlight, Highlight, Link, NeverHighlight, RandomHighlight};
pub use particle::Particle;
pub use raster::{RasterFactory, RasterSurface};
pub use stage::{ContainerId, FieldHandle, Sizing, Stage, StageEvent};
pub use surface::{
    DotStyle, DrawCommand, LineStyle, Recording, RecordingFactory, RecordingSurface, Surface,
    SurfaceFactory,
};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use particle_ground::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Color, DirectionX, DirectionY, FieldHandle, GroundConfig, Highlight, ParticleField,
        ParticleGround, RasterFactory, RecordingFactory, Sizing, Stage, StageEvent, Surface,
    };
    pub use glam::{UVec2, Vec2};
}
