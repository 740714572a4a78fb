//! The host a particle field lives in.
//!
//! A page gives the plugin container elements, window `resize` and
//! `mousemove` events, and `requestAnimationFrame`. [`Stage`] models exactly
//! that, single-threaded:
//!
//! - containers, sized to the viewport or fixed;
//! - observers: each attached field re-measures on window resize, and (with
//!   parallax on) follows the pointer;
//! - a frame loop: [`run_frame`](Stage::run_frame) runs every requested
//!   frame once, and each running field asks for the next one;
//! - the attachment registry: at most one field per container, looked up
//!   through an explicit `ContainerId -> FieldHandle` map.
//!
//! ```
//! use particle_ground::{ParticleGround, RecordingFactory, Sizing, Stage, StageEvent};
//! use glam::{UVec2, Vec2};
//!
//! let mut stage = Stage::new(RecordingFactory::new(), UVec2::new(800, 600));
//! let hero = stage.add_container(Sizing::FillViewport);
//!
//! let handle = ParticleGround::new().with_seed(1).attach(&mut stage, hero).unwrap();
//! stage.run_frame();
//! stage.dispatch(StageEvent::PointerMoved(Vec2::new(10.0, 10.0)));
//! stage.run_frame();
//!
//! handle.destroy(&mut stage);
//! assert!(!stage.is_attached(hero));
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use glam::{UVec2, Vec2};

use crate::config::GroundConfig;
use crate::error::GroundError;
use crate::field::ParticleField;
use crate::schedule::FrameScheduler;
use crate::surface::SurfaceFactory;

/// Identifies a container on a [`Stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u32);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct FieldId(u64);

/// How a container's layout size is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    /// Same size as the window.
    FillViewport,
    Fixed(UVec2),
}

/// Window-level input a stage forwards to its observers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageEvent {
    WindowResized(UVec2),
    /// Pointer position in window pixels.
    PointerMoved(Vec2),
}

/// The only way to reach an attached field from outside the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldHandle {
    container: ContainerId,
    id: FieldId,
}

impl FieldHandle {
    pub fn container(&self) -> ContainerId {
        self.container
    }

    /// Tear the field down. Calling this more than once does nothing further.
    pub fn destroy<F: SurfaceFactory>(&self, stage: &mut Stage<F>) -> bool {
        stage.destroy(*self)
    }
}

struct Attached<S: crate::surface::Surface> {
    container: ContainerId,
    field: ParticleField<S>,
}

/// Containers, observers, frame loop and attached fields.
pub struct Stage<F: SurfaceFactory> {
    factory: F,
    viewport: UVec2,
    pointer: Option<Vec2>,
    containers: BTreeMap<ContainerId, Sizing>,
    next_container: u32,
    next_field: u64,
    fields: HashMap<FieldId, Attached<F::Surface>>,
    attachments: HashMap<ContainerId, FieldHandle>,
    frames: FrameScheduler<FieldId>,
    resize_observers: BTreeSet<FieldId>,
    pointer_observers: BTreeSet<FieldId>,
}

impl<F: SurfaceFactory> Stage<F> {
    pub fn new(factory: F, viewport: UVec2) -> Self {
        Self {
            factory,
            viewport,
            pointer: None,
            containers: BTreeMap::new(),
            next_container: 1,
            next_field: 1,
            fields: HashMap::new(),
            attachments: HashMap::new(),
            frames: FrameScheduler::new(),
            resize_observers: BTreeSet::new(),
            pointer_observers: BTreeSet::new(),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn viewport(&self) -> UVec2 {
        self.viewport
    }

    /// Last pointer position seen, if any.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    // ========== Containers ==========

    pub fn add_container(&mut self, sizing: Sizing) -> ContainerId {
        let id = ContainerId(self.next_container);
        self.next_container += 1;
        self.containers.insert(id, sizing);
        id
    }

    /// Change a container's layout. Attached fields notice on the next
    /// window resize, not before.
    pub fn set_container_sizing(
        &mut self,
        id: ContainerId,
        sizing: Sizing,
    ) -> Result<(), GroundError> {
        let slot = self
            .containers
            .get_mut(&id)
            .ok_or(GroundError::UnknownContainer(id))?;
        *slot = sizing;
        Ok(())
    }

    /// Shorthand for a fixed layout size.
    pub fn set_container_size(
        &mut self,
        id: ContainerId,
        size: UVec2,
    ) -> Result<(), GroundError> {
        self.set_container_sizing(id, Sizing::Fixed(size))
    }

    /// Measured size of a container right now.
    pub fn container_size(&self, id: ContainerId) -> Option<UVec2> {
        self.containers.get(&id).map(|sizing| match sizing {
            Sizing::FillViewport => self.viewport,
            Sizing::Fixed(size) => *size,
        })
    }

    /// Remove a container, destroying its field first.
    pub fn remove_container(&mut self, id: ContainerId) -> bool {
        if let Some(handle) = self.attachments.get(&id).copied() {
            self.destroy(handle);
        }
        self.containers.remove(&id).is_some()
    }

    // ========== Attachment ==========

    /// Attach a field built by `build` to `container`.
    ///
    /// Unknown containers are an error. A container that already has a field
    /// keeps it and its handle is returned; `build` is not called and the
    /// configuration is not looked at. Otherwise the configuration is
    /// validated, a surface the size of the container is created, the field
    /// is built on it, its observers are registered, it is started (init
    /// hook) and its first frame is requested.
    pub(crate) fn attach_with<B>(
        &mut self,
        container: ContainerId,
        config: &GroundConfig,
        build: B,
    ) -> Result<FieldHandle, GroundError>
    where
        B: FnOnce(F::Surface) -> ParticleField<F::Surface>,
    {
        let size = self
            .container_size(container)
            .ok_or(GroundError::UnknownContainer(container))?;
        if let Some(existing) = self.attachments.get(&container) {
            tracing::debug!(%container, "container already has a particle field");
            return Ok(*existing);
        }
        config.validate()?;

        let surface = self.factory.create_surface(container, size);
        let mut field = build(surface);

        let id = FieldId(self.next_field);
        self.next_field += 1;
        let handle = FieldHandle { container, id };

        self.resize_observers.insert(id);
        if field.config().parallax {
            self.pointer_observers.insert(id);
        }
        field.start();
        self.frames.request(id);

        tracing::debug!(
            %container,
            particles = field.particles().len(),
            width = size.x,
            height = size.y,
            "attached particle field"
        );
        self.fields.insert(id, Attached { container, field });
        self.attachments.insert(container, handle);
        Ok(handle)
    }

    /// Cancel the pending frame, drop both observers, give the surface back
    /// to the factory and run the destroy hook. Returns `false` if the handle
    /// was already destroyed.
    pub fn destroy(&mut self, handle: FieldHandle) -> bool {
        let Some(mut attached) = self.take_field(handle) else {
            return false;
        };
        self.frames.cancel_owner(handle.id);
        self.resize_observers.remove(&handle.id);
        self.pointer_observers.remove(&handle.id);
        if self.attachments.get(&handle.container) == Some(&handle) {
            self.attachments.remove(&handle.container);
        }

        let factory = &mut self.factory;
        let container = attached.container;
        attached
            .field
            .teardown(|surface| factory.release_surface(container, surface));
        tracing::debug!(%container, "destroyed particle field");
        true
    }

    fn take_field(&mut self, handle: FieldHandle) -> Option<Attached<F::Surface>> {
        match self.fields.get(&handle.id) {
            Some(attached) if attached.container == handle.container => {
                self.fields.remove(&handle.id)
            }
            _ => None,
        }
    }

    pub fn is_attached(&self, container: ContainerId) -> bool {
        self.attachments.contains_key(&container)
    }

    pub fn handle_for(&self, container: ContainerId) -> Option<FieldHandle> {
        self.attachments.get(&container).copied()
    }

    pub fn field(&self, handle: FieldHandle) -> Option<&ParticleField<F::Surface>> {
        self.fields
            .get(&handle.id)
            .filter(|a| a.container == handle.container)
            .map(|a| &a.field)
    }

    pub fn field_mut(&mut self, handle: FieldHandle) -> Option<&mut ParticleField<F::Surface>> {
        self.fields
            .get_mut(&handle.id)
            .filter(|a| a.container == handle.container)
            .map(|a| &mut a.field)
    }

    /// Number of live fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn has_resize_observer(&self, handle: FieldHandle) -> bool {
        self.resize_observers.contains(&handle.id)
    }

    pub fn has_pointer_observer(&self, handle: FieldHandle) -> bool {
        self.pointer_observers.contains(&handle.id)
    }

    pub fn has_pending_frame(&self, handle: FieldHandle) -> bool {
        self.frames.is_pending(handle.id)
    }

    // ========== Events and frames ==========

    /// Deliver a window event to the fields observing it.
    pub fn dispatch(&mut self, event: StageEvent) {
        match event {
            StageEvent::WindowResized(size) => {
                self.viewport = size;
                for id in self.resize_observers.iter() {
                    let Some(attached) = self.fields.get_mut(id) else {
                        continue;
                    };
                    let measured = match self.containers.get(&attached.container) {
                        Some(Sizing::FillViewport) => size,
                        Some(Sizing::Fixed(fixed)) => *fixed,
                        None => continue,
                    };
                    attached.field.resize(measured);
                }
            }
            StageEvent::PointerMoved(position) => {
                self.pointer = Some(position);
                for id in self.pointer_observers.iter() {
                    if let Some(attached) = self.fields.get_mut(id) {
                        attached.field.point_at(position);
                    }
                }
            }
        }
    }

    /// Run every frame requested so far. Returns how many fields drew.
    pub fn run_frame(&mut self) -> usize {
        let mut drawn = 0;
        for (_, id) in self.frames.drain() {
            let Some(attached) = self.fields.get_mut(&id) else {
                continue;
            };
            if attached.field.tick() {
                drawn += 1;
                self.frames.request(id);
            }
        }
        drawn
    }

    /// Tick a field outside the frame loop. Does nothing for destroyed handles.
    pub fn force_tick(&mut self, handle: FieldHandle) -> bool {
        self.field_mut(handle).is_some_and(|field| field.tick())
    }
}

impl<F: SurfaceFactory> Drop for Stage<F> {
    fn drop(&mut self) {
        let handles: Vec<FieldHandle> = self.attachments.values().copied().collect();
        for handle in handles {
            self.destroy(handle);
        }
    }
}
