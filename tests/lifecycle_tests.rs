//! Integration tests for attaching, running and destroying particle fields.
//!
//! Every test drives a [`Stage`] backed by [`RecordingFactory`], so what a
//! field drew can be read back from its surface's command log.

use std::cell::Cell;
use std::rc::Rc;

use glam::{UVec2, Vec2};
use particle_ground::{
    initialize, AlwaysHighlight, DrawCommand, FieldHandle, FieldState, GroundConfig, GroundError,
    NeverHighlight, Particle, ParticleGround, Recording, RecordingFactory, Sizing, Stage,
    StageEvent,
};

fn stage(width: u32, height: u32) -> Stage<RecordingFactory> {
    Stage::new(RecordingFactory::new(), UVec2::new(width, height))
}

fn recording(stage: &Stage<RecordingFactory>, handle: FieldHandle) -> Recording {
    stage.factory().recording(handle.container()).unwrap()
}

/// Replace a field's particles with motionless ones at `positions`.
fn pin(stage: &mut Stage<RecordingFactory>, handle: FieldHandle, positions: &[Vec2]) {
    let field = stage.field_mut(handle).unwrap();
    assert_eq!(field.particles().len(), positions.len());
    for (particle, &position) in field.particles_mut().iter_mut().zip(positions) {
        *particle = Particle::new(position, Vec2::ZERO);
    }
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn test_particle_count_example() {
    let mut stage = stage(800, 600);
    let container = stage.add_container(Sizing::Fixed(UVec2::new(200, 150)));
    let handle = initialize(&mut stage, container, GroundConfig::default()).unwrap();

    assert_eq!(stage.field(handle).unwrap().particles().len(), 3);
}

#[test]
fn test_particle_count_rounds() {
    let mut stage = stage(1280, 720);
    let container = stage.add_container(Sizing::FillViewport);
    let handle = ParticleGround::new()
        .with_config(GroundConfig::default().with_density(7_000.0))
        .with_seed(3)
        .attach(&mut stage, container)
        .unwrap();

    // 921600 / 7000 = 131.66
    assert_eq!(stage.field(handle).unwrap().particles().len(), 132);
}

#[test]
fn test_init_hook_runs_once_before_first_frame() {
    let mut stage = stage(400, 300);
    let container = stage.add_container(Sizing::FillViewport);
    let inits = Rc::new(Cell::new(0));
    let counter = inits.clone();

    let handle = ParticleGround::new()
        .on_init(move || counter.set(counter.get() + 1))
        .attach(&mut stage, container)
        .unwrap();

    assert_eq!(inits.get(), 1);
    assert_eq!(recording(&stage, handle).frames(), 0);
    assert!(stage.has_pending_frame(handle));

    stage.run_frame();
    stage.run_frame();
    assert_eq!(inits.get(), 1);
    assert_eq!(recording(&stage, handle).frames(), 2);
}

#[test]
fn test_second_attach_returns_existing_handle() {
    let mut stage = stage(400, 300);
    let container = stage.add_container(Sizing::FillViewport);
    let inits = Rc::new(Cell::new(0));

    let first = initialize(&mut stage, container, GroundConfig::default()).unwrap();
    let counter = inits.clone();
    let second = ParticleGround::new()
        .with_config(GroundConfig::default().with_density(100.0))
        .on_init(move || counter.set(counter.get() + 1))
        .attach(&mut stage, container)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(stage.field_count(), 1);
    assert_eq!(inits.get(), 0);
    assert_eq!(stage.field(first).unwrap().config().density, 10_000.0);
}

#[test]
fn test_attach_to_removed_container_fails() {
    let mut stage = stage(400, 300);
    let container = stage.add_container(Sizing::FillViewport);
    assert!(stage.remove_container(container));

    let result = initialize(&mut stage, container, GroundConfig::default());
    assert!(matches!(result, Err(GroundError::UnknownContainer(id)) if id == container));
}

#[test]
fn test_invalid_config_is_rejected_before_attach() {
    let mut stage = stage(400, 300);
    let container = stage.add_container(Sizing::FillViewport);
    let result = initialize(
        &mut stage,
        container,
        GroundConfig::default().with_density(0.0),
    );

    assert!(matches!(result, Err(GroundError::InvalidConfig(_))));
    assert!(!stage.is_attached(container));
    assert!(stage.factory().recording(container).is_none());
}

#[test]
fn test_tiny_density_is_rejected_before_attach() {
    let mut stage = stage(1920, 1080);
    let container = stage.add_container(Sizing::FillViewport);

    let parsed = GroundConfig::from_json(r#"{ "density": 1e-30 }"#);
    assert!(matches!(parsed, Err(GroundError::InvalidConfig(_))));

    let result = initialize(&mut stage, container, GroundConfig::default().with_density(1e-30));
    assert!(matches!(result, Err(GroundError::InvalidConfig(_))));
    assert_eq!(stage.field_count(), 0);
}

#[test]
fn test_zero_area_container_idles() {
    let mut stage = stage(400, 300);
    let container = stage.add_container(Sizing::Fixed(UVec2::ZERO));
    let handle = initialize(&mut stage, container, GroundConfig::default()).unwrap();

    assert!(stage.field(handle).unwrap().particles().is_empty());
    for _ in 0..3 {
        assert_eq!(stage.run_frame(), 1);
    }
    let recording = recording(&stage, handle);
    assert_eq!(recording.frames(), 3);
    assert!(recording.circles().is_empty());
    assert!(recording.lines().is_empty());
}

// ============================================================================
// Frames
// ============================================================================

#[test]
fn test_particles_stay_in_bounds() {
    let mut stage = stage(320, 240);
    let container = stage.add_container(Sizing::FillViewport);
    let handle = ParticleGround::new()
        .with_config(
            GroundConfig::default()
                .with_density(500.0)
                .with_speed_x(3.0, 9.0)
                .with_speed_y(3.0, 9.0),
        )
        .with_seed(11)
        .attach(&mut stage, container)
        .unwrap();

    for _ in 0..500 {
        stage.run_frame();
        for p in stage.field(handle).unwrap().particles() {
            assert!((0.0..320.0).contains(&p.position.x), "x out of bounds: {:?}", p);
            assert!((0.0..240.0).contains(&p.position.y), "y out of bounds: {:?}", p);
        }
    }
}

#[test]
fn test_every_particle_drawn_each_frame() {
    let mut stage = stage(300, 200);
    let container = stage.add_container(Sizing::FillViewport);
    let handle = ParticleGround::new().with_seed(5).attach(&mut stage, container).unwrap();

    stage.run_frame();
    let positions: Vec<Vec2> = stage
        .field(handle)
        .unwrap()
        .particles()
        .iter()
        .map(|p| p.position)
        .collect();
    let circles = recording(&stage, handle).circles();

    assert_eq!(circles.len(), 6);
    for ((center, radius, style), position) in circles.into_iter().zip(positions) {
        assert_eq!(center, position);
        assert_eq!(radius, 7.0);
        assert_eq!(style.opacity, 0.6);
    }
}

#[test]
fn test_link_drawn_inside_proximity() {
    let mut stage = stage(200, 100);
    let container = stage.add_container(Sizing::FillViewport);
    let handle = ParticleGround::new()
        .with_highlight(NeverHighlight)
        .attach(&mut stage, container)
        .unwrap();
    pin(&mut stage, handle, &[Vec2::new(0.0, 0.0), Vec2::new(50.0, 0.0)]);

    stage.run_frame();
    let lines = recording(&stage, handle).lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0, Vec2::new(0.0, 0.0));
    assert_eq!(lines[0].1, Vec2::new(50.0, 0.0));
    assert_eq!(lines[0].2.width, 1.0);
    assert!(!lines[0].2.is_glowing());
}

#[test]
fn test_no_link_outside_proximity() {
    let mut stage = stage(200, 100);
    let container = stage.add_container(Sizing::FillViewport);
    let handle = ParticleGround::new()
        .with_highlight(AlwaysHighlight)
        .attach(&mut stage, container)
        .unwrap();
    pin(&mut stage, handle, &[Vec2::new(0.0, 0.0), Vec2::new(150.0, 0.0)]);

    for _ in 0..5 {
        stage.run_frame();
        assert!(recording(&stage, handle).lines().is_empty());
    }
}

#[test]
fn test_link_at_boundary_drawn_every_frame_regardless_of_highlight() {
    let mut stage = stage(200, 100);
    let container = stage.add_container(Sizing::FillViewport);
    let handle = ParticleGround::new()
        .with_seed(99)
        .attach(&mut stage, container)
        .unwrap();
    pin(&mut stage, handle, &[Vec2::new(10.0, 50.0), Vec2::new(109.99, 50.0)]);

    let mut highlighted = 0;
    for _ in 0..200 {
        stage.run_frame();
        let lines = recording(&stage, handle).lines();
        assert_eq!(lines.len(), 1);
        if lines[0].2.is_glowing() {
            highlighted += 1;
            assert_eq!(lines[0].2.width, 2.0);
            assert_eq!(lines[0].2.opacity, 0.9);
        }
    }
    // Chance 0.7 over 200 frames.
    assert!(highlighted > 100 && highlighted < 180, "highlighted {}", highlighted);
}

#[test]
fn test_highlight_stub_sees_pair_indices() {
    let mut stage = stage(200, 150);
    let container = stage.add_container(Sizing::FillViewport);
    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let log = seen.clone();
    let handle = ParticleGround::new()
        .with_highlight(move |a: usize, b: usize| {
            log.borrow_mut().push((a, b));
            b == 2
        })
        .attach(&mut stage, container)
        .unwrap();
    pin(
        &mut stage,
        handle,
        &[Vec2::new(10.0, 10.0), Vec2::new(20.0, 10.0), Vec2::new(30.0, 10.0)],
    );

    stage.run_frame();
    assert_eq!(*seen.borrow(), vec![(0, 1), (0, 2), (1, 2)]);
    let glowing: Vec<bool> = recording(&stage, handle)
        .lines()
        .iter()
        .map(|(_, _, style)| style.is_glowing())
        .collect();
    assert_eq!(glowing, vec![false, true, true]);
}

#[test]
fn test_seeded_fields_draw_identically() {
    let run = || {
        let mut stage = stage(300, 300);
        let container = stage.add_container(Sizing::FillViewport);
        let handle = ParticleGround::new()
            .with_config(GroundConfig::default().with_density(1_000.0))
            .with_seed(42)
            .attach(&mut stage, container)
            .unwrap();
        let recording = recording(&stage, handle);
        for _ in 0..10 {
            stage.run_frame();
        }
        recording.commands()
    };

    let first = run();
    let glowing = |c: &DrawCommand| {
        matches!(c, DrawCommand::Line { style, .. } if style.is_glowing())
    };
    assert!(first.iter().any(glowing));
    assert_eq!(first, run());
}

// ============================================================================
// Window events
// ============================================================================

#[test]
fn test_resize_keeps_particles() {
    let mut stage = stage(400, 300);
    let container = stage.add_container(Sizing::FillViewport);
    let handle = ParticleGround::new().with_seed(8).attach(&mut stage, container).unwrap();
    stage.run_frame();

    let before: Vec<Particle> = stage.field(handle).unwrap().particles().to_vec();
    stage.dispatch(StageEvent::WindowResized(UVec2::new(100, 80)));

    let field = stage.field(handle).unwrap();
    assert_eq!(field.size(), UVec2::new(100, 80));
    assert_eq!(field.particles(), before.as_slice());

    stage.run_frame();
    let field = stage.field(handle).unwrap();
    assert_eq!(field.particles().len(), before.len());
    for p in field.particles() {
        assert!(p.position.x < 100.0 && p.position.y < 80.0);
    }
}

#[test]
fn test_fixed_container_ignores_window_size() {
    let mut stage = stage(400, 300);
    let container = stage.add_container(Sizing::Fixed(UVec2::new(250, 250)));
    let handle = initialize(&mut stage, container, GroundConfig::default()).unwrap();

    stage.dispatch(StageEvent::WindowResized(UVec2::new(1000, 1000)));
    assert_eq!(stage.field(handle).unwrap().size(), UVec2::new(250, 250));
}

#[test]
fn test_pointer_offsets_render_positions() {
    let mut stage = stage(200, 100);
    let container = stage.add_container(Sizing::FillViewport);
    let handle = ParticleGround::new()
        .with_highlight(NeverHighlight)
        .attach(&mut stage, container)
        .unwrap();
    pin(&mut stage, handle, &[Vec2::new(40.0, 40.0), Vec2::new(60.0, 40.0)]);

    // Center is (100, 50); (150, 75) is (+50, +25) away, divided by 5.
    stage.dispatch(StageEvent::PointerMoved(Vec2::new(150.0, 75.0)));
    assert_eq!(stage.field(handle).unwrap().offset(), Vec2::new(10.0, 5.0));

    stage.run_frame();
    let recording = recording(&stage, handle);
    let centers: Vec<Vec2> = recording.circles().iter().map(|c| c.0).collect();
    assert_eq!(centers, vec![Vec2::new(50.0, 45.0), Vec2::new(70.0, 45.0)]);

    // Offset is render-only.
    let field = stage.field(handle).unwrap();
    assert_eq!(field.particles()[0].position, Vec2::new(40.0, 40.0));
}

#[test]
fn test_pointer_observer_only_with_parallax() {
    let mut stage = stage(400, 300);
    let with = stage.add_container(Sizing::FillViewport);
    let without = stage.add_container(Sizing::FillViewport);

    let a = initialize(&mut stage, with, GroundConfig::default()).unwrap();
    let b = initialize(&mut stage, without, GroundConfig::default().without_parallax()).unwrap();

    assert!(stage.has_pointer_observer(a));
    assert!(!stage.has_pointer_observer(b));
    assert!(stage.has_resize_observer(a));
    assert!(stage.has_resize_observer(b));

    stage.dispatch(StageEvent::PointerMoved(Vec2::new(0.0, 0.0)));
    assert_ne!(stage.field(a).unwrap().offset(), Vec2::ZERO);
    assert_eq!(stage.field(b).unwrap().offset(), Vec2::ZERO);
}

// ============================================================================
// Destroy
// ============================================================================

#[test]
fn test_destroy_is_idempotent() {
    let mut stage = stage(400, 300);
    let container = stage.add_container(Sizing::FillViewport);
    let destroys = Rc::new(Cell::new(0));
    let counter = destroys.clone();
    let handle = ParticleGround::new()
        .on_destroy(move || counter.set(counter.get() + 1))
        .attach(&mut stage, container)
        .unwrap();
    stage.run_frame();

    assert!(handle.destroy(&mut stage));
    assert!(!handle.destroy(&mut stage));
    assert_eq!(destroys.get(), 1);
    assert_eq!(stage.factory().released(), &[container]);
    assert!(!stage.is_attached(container));
    assert_eq!(stage.field_count(), 0);
}

#[test]
fn test_no_drawing_after_destroy() {
    let mut stage = stage(400, 300);
    let container = stage.add_container(Sizing::FillViewport);
    let handle = initialize(&mut stage, container, GroundConfig::default()).unwrap();
    stage.run_frame();
    let recording = recording(&stage, handle);

    handle.destroy(&mut stage);
    let drawn = recording.len();

    assert!(!stage.force_tick(handle));
    assert_eq!(stage.run_frame(), 0);
    stage.dispatch(StageEvent::WindowResized(UVec2::new(50, 50)));
    stage.dispatch(StageEvent::PointerMoved(Vec2::new(5.0, 5.0)));
    assert_eq!(recording.len(), drawn);
}

#[test]
fn test_destroy_removes_observers_and_frame() {
    let mut stage = stage(400, 300);
    let container = stage.add_container(Sizing::FillViewport);
    let handle = initialize(&mut stage, container, GroundConfig::default()).unwrap();
    assert!(stage.has_pending_frame(handle));

    handle.destroy(&mut stage);
    assert!(!stage.has_pending_frame(handle));
    assert!(!stage.has_resize_observer(handle));
    assert!(!stage.has_pointer_observer(handle));
    assert!(stage.field(handle).is_none());
}

#[test]
fn test_destroy_leaves_other_fields_running() {
    let mut stage = stage(400, 300);
    let left = stage.add_container(Sizing::Fixed(UVec2::new(200, 300)));
    let right = stage.add_container(Sizing::Fixed(UVec2::new(200, 300)));
    let a = initialize(&mut stage, left, GroundConfig::default()).unwrap();
    let b = initialize(&mut stage, right, GroundConfig::default()).unwrap();

    a.destroy(&mut stage);
    assert_eq!(stage.run_frame(), 1);
    assert_eq!(stage.field(b).unwrap().state(), FieldState::Running);
    assert_eq!(stage.field(b).unwrap().frame(), 1);
}

#[test]
fn test_reattach_after_destroy_gets_new_handle() {
    let mut stage = stage(400, 300);
    let container = stage.add_container(Sizing::FillViewport);
    let first = initialize(&mut stage, container, GroundConfig::default()).unwrap();
    first.destroy(&mut stage);

    let second = initialize(&mut stage, container, GroundConfig::default()).unwrap();
    assert_ne!(first, second);
    assert!(stage.field(first).is_none());
    assert!(!first.destroy(&mut stage));
    assert!(stage.is_attached(container));
}

#[test]
fn test_dropping_stage_runs_destroy_hooks() {
    let destroys = Rc::new(Cell::new(0));
    {
        let mut stage = stage(400, 300);
        let container = stage.add_container(Sizing::FillViewport);
        let counter = destroys.clone();
        ParticleGround::new()
            .on_destroy(move || counter.set(counter.get() + 1))
            .attach(&mut stage, container)
            .unwrap();
    }
    assert_eq!(destroys.get(), 1);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_json_overrides_reach_the_field() {
    let config = GroundConfig::from_json(
        r##"{
            "density": 5000,
            "dotColor": "#ff0000",
            "particleRadius": 3,
            "parallax": false,
            "someFutureOption": [1, 2, 3]
        }"##,
    )
    .unwrap();

    let mut stage = stage(200, 100);
    let container = stage.add_container(Sizing::FillViewport);
    let handle = initialize(&mut stage, container, config).unwrap();
    assert!(!stage.has_pointer_observer(handle));

    stage.run_frame();
    let circles = recording(&stage, handle).circles();
    assert_eq!(circles.len(), 4);
    for (_, radius, style) in circles {
        assert_eq!(radius, 3.0);
        assert_eq!(style.color.to_rgba8(), [255, 0, 0, 255]);
    }
}
