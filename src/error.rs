//! Error types for Particle Ground.
//!
//! The simulation itself never fails once attached. Errors come from
//! configuration (bad JSON, bad colors, out-of-range values), from addressing
//! a container the stage does not know, and from the windowed runner's GPU
//! and event-loop setup.

use std::fmt;

use crate::stage::ContainerId;

/// A color string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorError {
    input: String,
}

impl ColorError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }

    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid color '{}': expected #rgb, #rrggbb, #rrggbbaa, rgb() or rgba()",
            self.input
        )
    }
}

impl std::error::Error for ColorError {}

/// Errors from configuring or attaching a particle field.
#[derive(Debug)]
pub enum GroundError {
    /// A configuration value is out of range.
    InvalidConfig(String),
    /// Configuration JSON could not be parsed.
    Json(serde_json::Error),
    /// Configuration file could not be read.
    Io(std::io::Error),
    /// The stage has no container with this id.
    UnknownContainer(ContainerId),
}

impl fmt::Display for GroundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroundError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            GroundError::Json(e) => write!(f, "Failed to parse configuration: {}", e),
            GroundError::Io(e) => write!(f, "Failed to read configuration file: {}", e),
            GroundError::UnknownContainer(id) => write!(f, "No container with id {}", id),
        }
    }
}

impl std::error::Error for GroundError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GroundError::Json(e) => Some(e),
            GroundError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GroundError {
    fn from(e: serde_json::Error) -> Self {
        GroundError::Json(e)
    }
}

impl From<std::io::Error> for GroundError {
    fn from(e: std::io::Error) -> Self {
        GroundError::Io(e)
    }
}

/// Errors from setting up the window's presenter.
#[derive(Debug)]
pub enum GpuError {
    /// The window could not be turned into a render surface.
    Surface(wgpu::CreateSurfaceError),
    NoAdapter,
    Device(wgpu::RequestDeviceError),
    /// The surface offers no texture format to present with.
    NoSurfaceFormat,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::Surface(e) => write!(f, "Cannot draw into the window: {}", e),
            GpuError::NoAdapter => write!(f, "No graphics adapter can present to the window"),
            GpuError::Device(e) => write!(f, "Graphics device request failed: {}", e),
            GpuError::NoSurfaceFormat => write!(f, "Window surface reports no usable format"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::Surface(e) => Some(e),
            GpuError::Device(e) => Some(e),
            GpuError::NoAdapter | GpuError::NoSurfaceFormat => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::Surface(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::Device(e)
    }
}

/// Errors from the `particle-ground` runner.
#[derive(Debug)]
pub enum AppError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
    /// Configuration or attach failed.
    Ground(GroundError),
    /// Snapshot could not be written.
    Image(image::ImageError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            AppError::Window(e) => write!(f, "Failed to create window: {}", e),
            AppError::Gpu(e) => write!(f, "GPU error: {}", e),
            AppError::Ground(e) => write!(f, "{}", e),
            AppError::Image(e) => write!(f, "Failed to write snapshot: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Gpu(e) => Some(e),
            AppError::Ground(e) => Some(e),
            AppError::Image(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<GpuError> for AppError {
    fn from(e: GpuError) -> Self {
        AppError::Gpu(e)
    }
}

impl From<GroundError> for AppError {
    fn from(e: GroundError) -> Self {
        AppError::Ground(e)
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        AppError::Image(e)
    }
}
