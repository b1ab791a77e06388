//! Texture system
//!
//! Connects star proximity in the world to the background texture streamer.

use std::sync::Arc;

use hyperspace_core::{apply_texture, plan_textures, texture_failed, TextureAction, WorldState};
use hyperspace_remote::{RetryPolicy, SessionId, TextureService, TextureStreamer};

/// Texture work done during one frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TextureUpdate {
    pub requested: usize,
    pub cancelled: usize,
    pub applied: usize,
    pub failed: usize,
}

/// Streams textures for stars near the pilot
pub struct TextureSystem {
    streamer: TextureStreamer,
    distance: f64,
}

impl TextureSystem {
    pub fn new(service: Arc<dyn TextureService>, policy: RetryPolicy, workers: usize, distance: f64) -> Self {
        Self {
            streamer: TextureStreamer::new(service, policy, workers),
            distance,
        }
    }

    pub fn set_session(&self, session: Option<SessionId>) {
        self.streamer.set_session(session);
    }

    pub fn in_flight(&self) -> usize {
        self.streamer.in_flight_count()
    }

    /// Apply finished fetches, then start and stop fetches by distance
    ///
    /// No new fetches are planned while `remapping`.
    pub fn update(&mut self, world: &mut WorldState, remapping: bool) -> TextureUpdate {
        let mut update = TextureUpdate::default();

        for delivery in self.streamer.poll_all() {
            match delivery.result {
                Ok(image) => {
                    if apply_texture(world, delivery.key, image) {
                        update.applied += 1;
                    }
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    log::debug!("Texture for {:?} unavailable: {}", delivery.key, e);
                    texture_failed(world, delivery.key);
                    update.failed += 1;
                }
            }
        }

        if remapping {
            return update;
        }

        for action in plan_textures(world, self.distance) {
            match action {
                TextureAction::Request { key, position } => {
                    if self.streamer.request(key, position) {
                        log::debug!("Requested texture for {:?}", key);
                        update.requested += 1;
                    } else if !self.streamer.is_in_flight(key) {
                        texture_failed(world, key);
                    }
                }
                TextureAction::Cancel { key } => {
                    if self.streamer.cancel(key) {
                        update.cancelled += 1;
                    }
                }
            }
        }
        update
    }

    /// Drop every outstanding fetch (e.g. before the world is replaced)
    pub fn clear(&mut self) {
        self.streamer.cancel_all();
    }
}
