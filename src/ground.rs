//! Builder for attaching particle fields.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GroundConfig;
use crate::error::GroundError;
use crate::field::{Hooks, ParticleField};
use crate::links::{Highlight, RandomHighlight};
use crate::stage::{ContainerId, FieldHandle, Stage};
use crate::surface::SurfaceFactory;

/// Configures a particle field and attaches it to a container.
///
/// Use method chaining to configure, then call `.attach()`.
///
/// ```
/// use particle_ground::{GroundConfig, ParticleGround, RecordingFactory, Sizing, Stage};
/// use glam::UVec2;
///
/// let mut stage = Stage::new(RecordingFactory::new(), UVec2::new(1280, 720));
/// let container = stage.add_container(Sizing::FillViewport);
///
/// let handle = ParticleGround::new()
///     .with_config(GroundConfig::default().with_density(8_000.0).with_proximity(120.0))
///     .on_init(|| println!("particles up"))
///     .on_destroy(|| println!("particles gone"))
///     .attach(&mut stage, container)
///     .unwrap();
///
/// assert_eq!(stage.field(handle).unwrap().particles().len(), 115);
/// ```
pub struct ParticleGround {
    config: GroundConfig,
    hooks: Hooks,
    seed: Option<u64>,
    highlight: Option<Box<dyn Highlight>>,
}

impl ParticleGround {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            config: GroundConfig::default(),
            hooks: Hooks::default(),
            seed: None,
            highlight: None,
        }
    }

    pub fn with_config(mut self, config: GroundConfig) -> Self {
        self.config = config;
        self
    }

    /// Called once, after the field's observers are registered and before
    /// its first frame.
    pub fn on_init<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.hooks.on_init = Some(Box::new(callback));
        self
    }

    /// Called once, when the field is destroyed.
    pub fn on_destroy<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.hooks.on_destroy = Some(Box::new(callback));
        self
    }

    /// Make spawning and the default highlight coin flips reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the random highlight decision.
    pub fn with_highlight<H>(mut self, highlight: H) -> Self
    where
        H: Highlight + 'static,
    {
        self.highlight = Some(Box::new(highlight));
        self
    }

    /// Attach to `container`, or return the handle of the field already there.
    pub fn attach<F: SurfaceFactory>(
        self,
        stage: &mut Stage<F>,
        container: ContainerId,
    ) -> Result<FieldHandle, GroundError> {
        let Self {
            config,
            hooks,
            seed,
            highlight,
        } = self;

        let highlight: Box<dyn Highlight> = match (highlight, seed) {
            (Some(custom), _) => custom,
            (None, Some(seed)) => Box::new(RandomHighlight::seeded(
                config.highlight_chance,
                seed.wrapping_add(1),
            )),
            (None, None) => Box::new(RandomHighlight::new(config.highlight_chance)),
        };
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let checked = config.clone();
        stage.attach_with(container, &checked, move |surface| {
            ParticleField::new(surface, config, highlight, &mut rng).with_hooks(hooks)
        })
    }
}

impl Default for ParticleGround {
    fn default() -> Self {
        Self::new()
    }
}

/// Attach a field with `config` and no hooks.
pub fn initialize<F: SurfaceFactory>(
    stage: &mut Stage<F>,
    container: ContainerId,
    config: GroundConfig,
) -> Result<FieldHandle, GroundError> {
    ParticleGround::new().with_config(config).attach(stage, container)
}
