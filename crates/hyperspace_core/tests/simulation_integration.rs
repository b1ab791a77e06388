//! Integration tests for the slice flight pipeline
//!
//! These tests drive a whole universe through the public API:
//! 1. Projection and slice visibility of known positions
//! 2. Remap transitions from request to commit
//! 3. Warp phases through the simulation tick
//! 4. Snapshot capture and restore

use std::f64::consts::FRAC_PI_2;
use hyperspace_core::{
    Axis, AxisMapping, DimensionVector, FlightEvent, GenerationConfig, ObjectKind, PilotInput,
    Quat, RemapRejection, RenderFrame, SimEvent, Simulation, SimulationConfig, SliceConfig,
    Snapshot, Vec3, WorldGenerator, WorldState,
};

fn generator(stars: usize, asteroids: usize) -> WorldGenerator {
    WorldGenerator::new(GenerationConfig {
        star_count: stars,
        asteroid_count: asteroids,
        seed: Some(42),
        ..GenerationConfig::default()
    })
}

fn simulation(stars: usize) -> Simulation {
    Simulation::new(SimulationConfig::default(), generator(stars, 5))
}

// ==================== Slice Tests ====================

#[test]
fn test_star_near_slice_visible_with_scale() {
    let mut world = WorldState::new(5);
    let key = world.spawn(ObjectKind::Star, DimensionVector::from(vec![0.0, 0.0, 0.0, 500.0, 0.0]));
    let slice = SliceConfig::default();
    world.refresh_objects(&slice);

    let star = world.get(key).unwrap();
    assert!(star.visible);
    let pf = slice.perspective_factor;
    assert_eq!(star.scale, pf / (pf + 500.0));
}

// ==================== Remap Tests ====================

#[test]
fn test_remap_x_to_dimension_three() {
    let mut sim = simulation(25);
    let mut world = sim.generate(5);
    let old_orientation = world.pilot.orientation;

    sim.request_remap(&world, Axis::X, 3).unwrap();
    assert_eq!(
        sim.request_remap(&world, Axis::Y, 4),
        Err(RemapRejection::TransitionActive)
    );

    // Not committed before t = 1
    let dt = 0.5;
    for _ in 0..5 {
        let report = sim.tick(&mut world, &PilotInput::default(), dt);
        assert!(report.transition_progress.unwrap() < 1.0);
        assert_eq!(*world.mapping(), AxisMapping::identity());
    }

    let report = sim.tick(&mut world, &PilotInput::default(), dt);
    let expected = AxisMapping::new(3, 1, 2, 5).unwrap();
    assert_eq!(report.events, vec![SimEvent::RemapCommitted(expected)]);
    assert_eq!(*world.mapping(), expected);

    let turn = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2);
    assert_eq!(world.pilot.orientation, (old_orientation * turn).normalize());
}

#[test]
fn test_back_to_back_requests_keep_first() {
    let mut sim = simulation(10);
    let mut world = sim.generate(5);
    sim.request_remap(&world, Axis::Z, 3).unwrap();
    assert!(sim.request_remap(&world, Axis::Z, 4).is_err());

    for _ in 0..4 {
        sim.tick(&mut world, &PilotInput::default(), 1.0);
    }
    assert_eq!(world.mapping().dimension(Axis::Z), 3);
}

#[test]
fn test_star_positions_consistent_after_remap() {
    let mut sim = simulation(40);
    let mut world = sim.generate(5);
    sim.request_remap(&world, Axis::Y, 4).unwrap();
    for _ in 0..7 {
        sim.tick(&mut world, &PilotInput::default(), 0.5);
    }
    for (_, obj) in world.stars() {
        assert_eq!(obj.rendered, world.project(&obj.position));
    }
}

#[test]
fn test_scenery_hidden_during_transition_and_back_after() {
    let mut sim = simulation(5);
    let mut world = sim.generate(5);
    sim.request_remap(&world, Axis::X, 3).unwrap();
    sim.tick(&mut world, &PilotInput::default(), 1.0);
    assert!(world
        .objects()
        .filter(|(_, o)| o.kind == ObjectKind::Scenery)
        .all(|(_, o)| !o.visible));

    for _ in 0..3 {
        sim.tick(&mut world, &PilotInput::default(), 1.0);
    }
    // one normal tick after the commit
    sim.tick(&mut world, &PilotInput::default(), 0.1);
    assert!(world
        .objects()
        .filter(|(_, o)| o.kind == ObjectKind::Scenery)
        .any(|(_, o)| o.visible));
}

#[test]
fn test_scenery_spread_across_new_dimension_after_remap() {
    let mut sim = Simulation::new(SimulationConfig::default(), generator(5, 50));
    let mut world = sim.generate(5);
    sim.request_remap(&world, Axis::X, 3).unwrap();
    for _ in 0..4 {
        sim.tick(&mut world, &PilotInput::default(), 1.0);
    }
    sim.tick(&mut world, &PilotInput::default(), 0.1);
    assert_eq!(world.mapping().dimension(Axis::X), 3);

    let pilot_x = world.pilot.position[3];
    let scenery: Vec<_> = world.objects().filter(|(_, o)| o.kind == ObjectKind::Scenery).map(|(_, o)| o).collect();
    assert_eq!(scenery.len(), 50);
    let flat = scenery.iter().filter(|o| o.position[3] == pilot_x).count();
    assert_eq!(flat, 0);
    for rock in &scenery {
        let distance = rock.rendered.distance(world.pilot.rendered);
        assert!(distance >= 1_000.0 - 1e-6 && distance <= 3_000.0 + 1e-6);
        assert!(rock.visible);
    }
}

// ==================== Flight Tests ====================

#[test]
fn test_warp_through_simulation() {
    let mut sim = simulation(5);
    let mut world = sim.generate(5);
    assert!(sim.engage_warp(&mut world));
    assert!(!sim.engage_warp(&mut world));

    let max = sim.config().flight.max_speed;
    let accel = sim.config().flight.warp_acceleration;
    let dt = 0.25;
    let ticks = (max / accel / dt).ceil() as usize;

    let mut reached = 0;
    for _ in 0..ticks + 8 {
        let report = sim.tick(&mut world, &PilotInput::default(), dt);
        reached += report
            .events
            .iter()
            .filter(|e| **e == SimEvent::Flight(FlightEvent::WarpSpeedReached))
            .count();
    }
    assert_eq!(reached, 1);
    assert_eq!(world.pilot.flight.speed, max);
}

#[test]
fn test_pilot_moves_only_in_mapped_dimensions() {
    let mut sim = simulation(5);
    let mut world = sim.generate(5);
    world.pilot.flight.speed = 1_000.0;
    let input = PilotInput { yaw: 0.5, pitch: -0.3, ..PilotInput::default() };
    for _ in 0..20 {
        sim.tick(&mut world, &input, 0.1);
    }
    assert_eq!(world.pilot.position[3], 0.0);
    assert_eq!(world.pilot.position[4], 0.0);
    assert_eq!(world.pilot.rendered, world.project(&world.pilot.position));
}

// ==================== Snapshot Tests ====================

#[test]
fn test_save_then_load_reproduces_state() {
    let mut sim = simulation(30);
    let mut world = sim.generate(5);
    world.pilot.flight.speed = 200.0;
    sim.tick(&mut world, &PilotInput::default(), 1.0);
    sim.request_remap(&world, Axis::X, 4).unwrap();
    for _ in 0..4 {
        sim.tick(&mut world, &PilotInput::default(), 1.0);
    }

    let text = Snapshot::capture(&world).to_ron().unwrap();
    let snapshot = Snapshot::from_ron(&text).unwrap();
    let restored = simulation(30).restore(&snapshot, 5);

    assert_eq!(restored.mapping(), world.mapping());
    assert_eq!(restored.pilot.position, world.pilot.position);
    let goal_before = world.get(world.goal().unwrap()).unwrap().position.clone();
    let goal_after = restored.get(restored.goal().unwrap()).unwrap().position.clone();
    assert_eq!(goal_before, goal_after);
}

// ==================== Frame Tests ====================

#[test]
fn test_frame_contains_only_visible_objects() {
    let mut sim = simulation(200);
    let mut world = sim.generate(5);
    sim.tick(&mut world, &PilotInput::default(), 0.016);
    let frame = RenderFrame::build(&world, None);
    let visible = world.objects().filter(|(_, o)| o.visible).count();
    assert_eq!(frame.instances.len(), visible);
    assert_eq!(frame.camera.position, world.pilot.rendered);
}
