//! Integration tests for the application layer
//!
//! Runs the app against in-memory and failing session services with a
//! temporary local store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use hyperspace::systems::SessionOrigin;
use hyperspace::{App, AppConfig, Services};
use hyperspace_core::{Axis, LatestFrame, Snapshot, Vec3};
use hyperspace_remote::{
    LocalStore, MemoryPersistence, PersistenceService, ProceduralTextures, RemoteError, SessionId,
};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

const DT: f64 = 1.0 / 60.0;

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.world.star_count = 40;
    config.world.asteroid_count = 10;
    config.world.seed = Some(21);
    config.persistence.max_retries = 0;
    config.textures.max_retries = 0;
    config.remap.duration = 1.0;
    config
}

fn local_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("hyperspace_app_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn services(persistence: Arc<dyn PersistenceService>, dir: &Path) -> Services {
    Services {
        persistence,
        textures: Arc::new(ProceduralTextures::default()),
        local: LocalStore::open(dir).unwrap(),
    }
}

fn wait_for_session(app: &mut App<LatestFrame>) -> SessionId {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        app.step(DT);
        if let Some(id) = app.session().session() {
            return id;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    panic!("session was never registered");
}

/// Session service that is always down
struct Offline;

impl PersistenceService for Offline {
    fn register(&self) -> Result<SessionId, RemoteError> {
        Err(RemoteError::Transient("offline".into()))
    }

    fn save(&self, _: &SessionId, _: &Snapshot) -> Result<(), RemoteError> {
        Err(RemoteError::Transient("offline".into()))
    }

    fn load(&self, _: &SessionId) -> Result<Snapshot, RemoteError> {
        Err(RemoteError::Transient("offline".into()))
    }

    fn reset(&self, _: &SessionId) -> Result<(), RemoteError> {
        Err(RemoteError::Transient("offline".into()))
    }
}

#[test]
fn test_fresh_start_registers_session() {
    let dir = local_dir("fresh");
    let mut app = App::new(&config(), services(Arc::new(MemoryPersistence::new()), &dir), LatestFrame::default());
    assert_eq!(app.origin(), SessionOrigin::Fresh);
    assert_eq!(app.world().star_count(), 40);

    let id = wait_for_session(&mut app);
    assert_eq!(LocalStore::open(&dir).unwrap().session_id(), Some(id));
    assert!(app.sink().submitted > 0);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_save_then_restart_restores_remote_session() {
    let dir = local_dir("restart");
    let remote = Arc::new(MemoryPersistence::new());

    let mut app = App::new(&config(), services(remote.clone(), &dir), LatestFrame::default());
    wait_for_session(&mut app);
    app.handle_key(KeyCode::ArrowUp, ElementState::Pressed);
    for _ in 0..30 {
        app.step(DT);
    }
    let before = Snapshot::capture(app.world());
    app.shutdown();
    drop(app);

    let restarted = App::new(&config(), services(remote, &dir), LatestFrame::default());
    assert_eq!(restarted.origin(), SessionOrigin::Remote);
    let after = Snapshot::capture(restarted.world());
    assert_eq!(after.pilot, before.pilot);
    assert_eq!(after.axis_mapping, before.axis_mapping);
    assert_eq!(after.goal, before.goal);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_offline_service_falls_back_to_local() {
    let dir = local_dir("offline");
    let mut app = App::new(&config(), services(Arc::new(Offline), &dir), LatestFrame::default());
    for _ in 0..10 {
        app.step(DT);
    }
    assert!(app.session().session().is_none());
    app.shutdown();
    drop(app);

    let restarted = App::new(&config(), services(Arc::new(Offline), &dir), LatestFrame::default());
    assert_eq!(restarted.origin(), SessionOrigin::Local);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_reset_starts_new_session() {
    let dir = local_dir("reset");
    let remote = Arc::new(MemoryPersistence::new());
    let mut app = App::new(&config(), services(remote.clone(), &dir), LatestFrame::default());
    let first = wait_for_session(&mut app);

    app.handle_key(KeyCode::F9, ElementState::Pressed);
    assert_eq!(app.session().session(), None);
    let second = wait_for_session(&mut app);
    assert_ne!(first, second);
    assert!(matches!(remote.load(&first), Err(RemoteError::NotFound)));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_remap_key_commits_after_duration() {
    let dir = local_dir("remap");
    let mut app = App::new(&config(), services(Arc::new(MemoryPersistence::new()), &dir), LatestFrame::default());
    assert_eq!(app.world().mapping().dimension(Axis::X), 0);

    app.handle_key(KeyCode::Digit1, ElementState::Pressed);
    assert!(app.simulation().is_remapping());
    // Frames are capped at 0.25 s
    app.step(0.25);
    app.step(0.25);
    assert_eq!(app.world().mapping().dimension(Axis::X), 0);
    assert!(app.sink().frame.as_ref().unwrap().transition_progress.is_some());

    for _ in 0..3 {
        app.step(0.25);
    }
    assert_eq!(app.world().mapping().dimension(Axis::X), 3);
    assert!(!app.simulation().is_remapping());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_pause_freezes_simulation() {
    let dir = local_dir("pause");
    let mut app = App::new(&config(), services(Arc::new(MemoryPersistence::new()), &dir), LatestFrame::default());
    app.handle_key(KeyCode::KeyP, ElementState::Pressed);
    assert!(app.is_paused());
    assert!(app.step(DT).is_none());
    assert_eq!(app.simulation().clock(), 0.0);

    app.handle_key(KeyCode::KeyP, ElementState::Pressed);
    assert!(app.step(DT).is_some());
    assert!(app.simulation().clock() > 0.0);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_overlay_toggle_and_exit() {
    let dir = local_dir("overlay");
    let mut app = App::new(&config(), services(Arc::new(MemoryPersistence::new()), &dir), LatestFrame::default());
    assert!(app.overlay().is_none());
    app.handle_key(KeyCode::KeyC, ElementState::Pressed);
    assert!(app.overlay().unwrap().contains("mapping"));
    assert!(!app.handle_key(KeyCode::Escape, ElementState::Pressed));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_pointer_reports_star_under_it() {
    let dir = local_dir("hover");
    let mut cfg = config();
    cfg.world.star_count = 400;
    let mut app = App::new(&cfg, services(Arc::new(MemoryPersistence::new()), &dir), LatestFrame::default());
    assert!(app.hovered().is_none());

    let viewport = app.viewport();
    let fov = cfg.goal.fov_degrees;
    let (key, star, pixel) = app
        .world()
        .stars()
        .filter(|(_, o)| o.visible)
        .find_map(|(k, o)| viewport.project(app.world(), o.rendered, fov).map(|p| (k, o.clone(), p)))
        .expect("a visible star ahead");
    app.pointer_moved(pixel[0], pixel[1]);

    let info = app.hovered().expect("star under pointer");
    let distance = star.rendered.distance(Vec3::ZERO);
    assert!(info.distance <= distance + 1e-6);
    if info.key == key {
        assert_eq!(info.position, star.position);
    }
    app.handle_key(KeyCode::KeyC, ElementState::Pressed);
    assert!(app.overlay().unwrap().contains("| Star | distance"));

    app.pointer_left();
    assert!(app.hovered().is_none());
    let _ = fs::remove_dir_all(&dir);
}
