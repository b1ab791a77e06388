//! Hyperspace - N-dimensional slice flight
//!
//! Headless runner: flies a short scripted demo through the configured
//! universe, then saves the session.

use hyperspace::{App, AppConfig, Services};
use hyperspace_core::LatestFrame;
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// Scripted key events as (seconds, key, state)
const DEMO_SCRIPT: &[(f64, KeyCode, ElementState)] = &[
    (0.0, KeyCode::ShiftLeft, ElementState::Pressed),
    (0.0, KeyCode::Enter, ElementState::Pressed),
    (0.1, KeyCode::Enter, ElementState::Released),
    (0.1, KeyCode::ShiftLeft, ElementState::Released),
    (2.0, KeyCode::KeyW, ElementState::Pressed),
    (2.5, KeyCode::KeyW, ElementState::Released),
    (4.0, KeyCode::Digit1, ElementState::Pressed),
    (8.0, KeyCode::ShiftLeft, ElementState::Pressed),
    (8.0, KeyCode::Space, ElementState::Pressed),
    (8.1, KeyCode::Space, ElementState::Released),
    (8.1, KeyCode::ShiftLeft, ElementState::Released),
];

fn main() {
    let config = AppConfig::load();

    // Initialize logging; RUST_LOG wins over the configured level
    let level = config
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::info!("Starting Hyperspace");

    let config = config.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    let services = match Services::from_config(&config.persistence) {
        Ok(services) => services,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut app = App::new(&config, services, LatestFrame::default());
    log::info!("Session origin: {:?}", app.origin());
    // Headless: keep the pointer on whatever lies dead ahead
    let [x, y] = app.viewport().center();
    app.pointer_moved(x, y);

    let tick_rate = if config.run.tick_rate > 0.0 { config.run.tick_rate } else { 60.0 };
    let dt = 1.0 / tick_rate;
    let mut script = DEMO_SCRIPT.iter().peekable();

    'run: for tick in 0..config.run.ticks {
        let now = tick as f64 * dt;
        while let Some((_, key, state)) = script.next_if(|(at, _, _)| *at <= now) {
            if !app.handle_key(*key, *state) {
                break 'run;
            }
        }

        app.step(dt);

        if tick % tick_rate.max(1.0) as u64 == 0 {
            if let Some(line) = app.overlay() {
                println!("{}", line);
            }
        }
    }

    if let Some(frame) = &app.sink().frame {
        log::info!(
            "Last frame: {} visible objects, speed {:.1}, goal {}",
            frame.instances.len(),
            frame.speed,
            if frame.goal_achieved { "reached" } else { "not reached" }
        );
    }

    app.shutdown();
}
