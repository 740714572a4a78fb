//! `particle-ground`: run a particle background in a window, or render a
//! headless snapshot of one to PNG.

mod window;

use std::path::{Path, PathBuf};

use clap::Parser;
use glam::UVec2;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use winit::event_loop::{ControlFlow, EventLoop};

use particle_ground::{
    AppError, Color, GroundConfig, ParticleGround, RasterFactory, Sizing, Stage,
};

#[derive(Parser)]
#[command(name = "particle-ground")]
#[command(about = "Drifting particles linked by proximity lines")]
#[command(version)]
struct Cli {
    /// JSON configuration file (camelCase keys, unknown keys ignored)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for spawning and highlight decisions
    #[arg(long)]
    seed: Option<u64>,

    /// Page color behind the transparent canvas
    #[arg(long, default_value = "#0b140b")]
    background: Color,

    /// Initial window width, or snapshot width
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Initial window height, or snapshot height
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Render headlessly and write the last frame to this PNG
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Frames to simulate before a snapshot is taken
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Enable verbose logging
    #[arg(short, long, env = "PARTICLE_GROUND_VERBOSE")]
    verbose: bool,
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "particle_ground=debug"
    } else {
        "particle_ground=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("loading configuration from {}", path.display());
            GroundConfig::from_file(path)?
        }
        None => GroundConfig::default(),
    };

    let mut ground = ParticleGround::new()
        .with_config(config)
        .on_init(|| tracing::info!("particle field initialized"))
        .on_destroy(|| tracing::info!("particle field destroyed"));
    if let Some(seed) = cli.seed {
        ground = ground.with_seed(seed);
    }

    let size = UVec2::new(cli.width, cli.height);
    match &cli.snapshot {
        Some(path) => snapshot(ground, size, cli.frames, cli.background, path),
        None => run_window(ground, size, cli.background),
    }
}

fn snapshot(
    ground: ParticleGround,
    size: UVec2,
    frames: u32,
    background: Color,
    path: &Path,
) -> Result<(), AppError> {
    let mut stage = Stage::new(RasterFactory, size);
    let container = stage.add_container(Sizing::Fixed(size));
    let handle = ground.attach(&mut stage, container)?;

    for _ in 0..frames {
        stage.run_frame();
    }

    if let Some(surface) = stage.field(handle).and_then(|field| field.surface()) {
        surface.composite_over(background).save(path)?;
        tracing::info!(frames, "wrote snapshot to {}", path.display());
    }
    handle.destroy(&mut stage);
    Ok(())
}

fn run_window(ground: ParticleGround, size: UVec2, background: Color) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = window::App::new(ground, background, size);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
