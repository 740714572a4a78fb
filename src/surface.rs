//! Drawing surfaces.
//!
//! A [`Surface`] is the 2D drawing area a particle field owns: it can be
//! cleared, resized, and asked to fill circles and stroke lines. Two
//! implementations ship with the crate:
//!
//! - [`RecordingSurface`] keeps a log of [`DrawCommand`]s. It draws nothing
//!   and is what the tests assert against.
//! - [`RasterSurface`](crate::RasterSurface) rasterizes into an RGBA image.
//!
//! A [`SurfaceFactory`] makes one surface per container when a field is
//! attached and receives it back when the field is destroyed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::{UVec2, Vec2};

use crate::color::Color;
use crate::stage::ContainerId;

/// Fill style for particle dots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotStyle {
    pub color: Color,
    /// Multiplied into the color's own alpha.
    pub opacity: f32,
}

/// Stroke style for links.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: f32,
    /// Multiplied into the color's own alpha.
    pub opacity: f32,
    /// Soft halo radius in pixels around the stroke, 0 for none.
    pub glow: f32,
}

impl LineStyle {
    pub fn is_glowing(&self) -> bool {
        self.glow > 0.0
    }
}

/// A 2D drawing area in pixel coordinates, origin top-left.
pub trait Surface {
    /// Current size in pixels.
    fn size(&self) -> UVec2;

    /// Change the pixel size. Contents after a resize are unspecified until
    /// the next [`clear`](Surface::clear).
    fn resize(&mut self, size: UVec2);

    /// Erase everything to transparent.
    fn clear(&mut self);

    fn fill_circle(&mut self, center: Vec2, radius: f32, style: &DotStyle);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, style: &LineStyle);
}

/// Creates the surface attached to a container.
pub trait SurfaceFactory {
    type Surface: Surface;

    fn create_surface(&mut self, container: ContainerId, size: UVec2) -> Self::Surface;

    /// Takes back a surface whose field was destroyed (the surface is being
    /// removed from its container).
    fn release_surface(&mut self, container: ContainerId, surface: Self::Surface) {
        let _ = (container, surface);
    }
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Resize(UVec2),
    Clear,
    Circle {
        center: Vec2,
        radius: f32,
        style: DotStyle,
    },
    Line {
        from: Vec2,
        to: Vec2,
        style: LineStyle,
    },
}

/// Shared view of a [`RecordingSurface`]'s command log.
///
/// Cloning shares the same log, so a test can keep one while the surface
/// itself is owned by a field.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    commands: Rc<RefCell<Vec<DrawCommand>>>,
}

impl Recording {
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }

    /// Drop everything recorded so far.
    pub fn reset(&self) {
        self.commands.borrow_mut().clear();
    }

    /// Commands since the most recent `Clear`, i.e. the last full frame.
    pub fn last_frame(&self) -> Vec<DrawCommand> {
        let commands = self.commands.borrow();
        let start = commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear))
            .map_or(0, |i| i + 1);
        commands[start..].to_vec()
    }

    pub fn circles(&self) -> Vec<(Vec2, f32, DotStyle)> {
        self.last_frame()
            .into_iter()
            .filter_map(|c| match c {
                DrawCommand::Circle {
                    center,
                    radius,
                    style,
                } => Some((center, radius, style)),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<(Vec2, Vec2, LineStyle)> {
        self.last_frame()
            .into_iter()
            .filter_map(|c| match c {
                DrawCommand::Line { from, to, style } => Some((from, to, style)),
                _ => None,
            })
            .collect()
    }

    /// Number of `Clear` commands recorded, one per rendered frame.
    pub fn frames(&self) -> usize {
        self.commands
            .borrow()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Clear))
            .count()
    }

    fn push(&self, command: DrawCommand) {
        self.commands.borrow_mut().push(command);
    }
}

/// A surface that records instead of drawing.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: UVec2,
    recording: Recording,
}

impl RecordingSurface {
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            recording: Recording::default(),
        }
    }

    pub fn recording(&self) -> Recording {
        self.recording.clone()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> UVec2 {
        self.size
    }

    fn resize(&mut self, size: UVec2) {
        self.size = size;
        self.recording.push(DrawCommand::Resize(size));
    }

    fn clear(&mut self) {
        self.recording.push(DrawCommand::Clear);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, style: &DotStyle) {
        self.recording.push(DrawCommand::Circle {
            center,
            radius,
            style: *style,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, style: &LineStyle) {
        self.recording.push(DrawCommand::Line {
            from,
            to,
            style: *style,
        });
    }
}

/// Makes [`RecordingSurface`]s and remembers each container's recording.
#[derive(Debug, Default)]
pub struct RecordingFactory {
    recordings: HashMap<ContainerId, Recording>,
    released: Vec<ContainerId>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The recording of the most recent surface made for `container`.
    pub fn recording(&self, container: ContainerId) -> Option<Recording> {
        self.recordings.get(&container).cloned()
    }

    /// Containers whose surfaces were handed back, in order.
    pub fn released(&self) -> &[ContainerId] {
        &self.released
    }
}

impl SurfaceFactory for RecordingFactory {
    type Surface = RecordingSurface;

    fn create_surface(&mut self, container: ContainerId, size: UVec2) -> RecordingSurface {
        let surface = RecordingSurface::new(size);
        self.recordings.insert(container, surface.recording());
        surface
    }

    fn release_surface(&mut self, container: ContainerId, _surface: RecordingSurface) {
        self.released.push(container);
    }
}
