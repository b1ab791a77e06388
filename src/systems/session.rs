//! Session system
//!
//! Owns the session id and keeps the world persisted:
//! - Start: remote snapshot, then the local copy, then a fresh universe
//! - Save: remote first, local copy when the remote call fails
//! - Reset: drop everything stored and register a new session

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hyperspace_core::{Simulation, Snapshot, WorldState};
use hyperspace_remote::{
    LocalStore, PersistenceClient, PersistenceOutcome, PersistenceService, RequestId, RetryPolicy,
    SessionId,
};

/// Where the starting world came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    Remote,
    Local,
    Fresh,
}

/// Session changes the rest of the app cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new session id is in use
    Registered(SessionId),
    /// A snapshot was stored (`remote` false means the local fallback)
    Saved { remote: bool },
    /// Neither remote nor local save worked
    SaveFailed,
}

/// Keeps the world stored remotely with a local fallback
pub struct SessionSystem {
    client: PersistenceClient,
    local: LocalStore,
    session: Option<SessionId>,
    /// Snapshots sent remotely, kept for the local fallback
    pending_saves: HashMap<RequestId, Snapshot>,
    pending_register: Option<RequestId>,
    timeout: Duration,
}

impl SessionSystem {
    /// `timeout` bounds how long [`Self::start`] and [`Self::flush`] block
    pub fn new(
        service: Arc<dyn PersistenceService>,
        policy: RetryPolicy,
        local: LocalStore,
        timeout: Duration,
    ) -> Self {
        let session = local.session_id();
        Self {
            client: PersistenceClient::new(service, policy),
            local,
            session,
            pending_saves: HashMap::new(),
            pending_register: None,
            timeout,
        }
    }

    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// True while a save or registration is outstanding
    pub fn is_busy(&self) -> bool {
        !self.pending_saves.is_empty() || self.pending_register.is_some()
    }

    /// Build the starting world
    ///
    /// Registers a new session in the background if none is stored.
    pub fn start(&mut self, simulation: &mut Simulation, dimensions: usize) -> (WorldState, SessionOrigin) {
        let (world, origin) = match self.load_remote().or_else(|| self.load_local()) {
            Some((snapshot, origin)) => (simulation.restore(&snapshot, dimensions), origin),
            None => {
                log::info!("Starting a fresh universe");
                (simulation.generate(dimensions), SessionOrigin::Fresh)
            }
        };
        if self.session.is_none() {
            self.pending_register = Some(self.client.register());
        }
        (world, origin)
    }

    fn load_remote(&mut self) -> Option<(Snapshot, SessionOrigin)> {
        let session = self.session?;
        let request = self.client.load(session);
        let deadline = Instant::now() + self.timeout;
        while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            let Some(result) = self.client.wait(remaining) else {
                break;
            };
            if result.request_id != request {
                continue;
            }
            return match result.outcome {
                PersistenceOutcome::Loaded(Ok(snapshot)) => {
                    log::info!("Loaded session {} from the service", session);
                    Some((snapshot, SessionOrigin::Remote))
                }
                PersistenceOutcome::Loaded(Err(e)) => {
                    log::warn!("Could not load session {} from the service: {}", session, e);
                    None
                }
                _ => None,
            };
        }
        log::warn!("Timed out loading session {}", session);
        None
    }

    fn load_local(&self) -> Option<(Snapshot, SessionOrigin)> {
        match self.local.load_snapshot() {
            Ok(Some(snapshot)) => {
                log::info!("Loaded local snapshot from {}", self.local.dir().display());
                Some((snapshot, SessionOrigin::Local))
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("Ignoring unreadable local snapshot: {}", e);
                None
            }
        }
    }

    /// Store the world; the outcome arrives through [`Self::poll`]
    pub fn save(&mut self, world: &WorldState) -> Option<SessionEvent> {
        let snapshot = Snapshot::capture(world);
        match self.session {
            Some(session) => {
                let request = self.client.save(session, snapshot.clone());
                self.pending_saves.insert(request, snapshot);
                None
            }
            None => Some(self.save_local(&snapshot)),
        }
    }

    fn save_local(&self, snapshot: &Snapshot) -> SessionEvent {
        match self.local.save_snapshot(snapshot) {
            Ok(()) => {
                log::info!("Saved snapshot locally");
                SessionEvent::Saved { remote: false }
            }
            Err(e) => {
                log::error!("Local save failed: {}", e);
                SessionEvent::SaveFailed
            }
        }
    }

    /// Throw away the stored session and start a new universe
    pub fn reset(&mut self, simulation: &mut Simulation, world: &mut WorldState) {
        if let Err(e) = self.local.clear() {
            log::warn!("Could not clear local session data: {}", e);
        }
        simulation.reset_world(world);
        // Saves still in flight belong to the old session
        self.pending_saves.clear();
        if let Some(old) = self.session.take() {
            self.client.reset(old);
        }
        self.pending_register = Some(self.client.register());
        log::info!("Session reset");
    }

    /// Handle finished background calls
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.client.poll() {
            events.extend(self.handle(result.request_id, result.outcome));
        }
        events
    }

    /// Wait up to the timeout for outstanding saves and registration
    pub fn flush(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let deadline = Instant::now() + self.timeout;
        while self.is_busy() {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                log::warn!("Gave up waiting for the session service");
                break;
            };
            match self.client.wait(remaining) {
                Some(result) => events.extend(self.handle(result.request_id, result.outcome)),
                None => break,
            }
        }
        self.pending_register = None;
        // The newest save that never completed is kept locally
        let newest = self.pending_saves.drain().max_by_key(|(request, _)| *request);
        if let Some((_, snapshot)) = newest {
            events.push(self.save_local(&snapshot));
        }
        events
    }

    fn handle(&mut self, request: RequestId, outcome: PersistenceOutcome) -> Option<SessionEvent> {
        match outcome {
            PersistenceOutcome::Registered(result) => {
                if self.pending_register != Some(request) {
                    return None;
                }
                self.pending_register = None;
                match result {
                    Ok(id) => {
                        log::info!("Registered session {}", id);
                        if let Err(e) = self.local.store_session_id(&id) {
                            log::warn!("Could not store session id locally: {}", e);
                        }
                        self.session = Some(id);
                        Some(SessionEvent::Registered(id))
                    }
                    Err(e) => {
                        log::warn!("Session registration failed, continuing offline: {}", e);
                        None
                    }
                }
            }
            PersistenceOutcome::Saved(result) => {
                let snapshot = self.pending_saves.remove(&request)?;
                match result {
                    Ok(()) => {
                        log::info!("Saved session to the service");
                        Some(SessionEvent::Saved { remote: true })
                    }
                    Err(e) => {
                        log::warn!("Remote save failed, saving locally: {}", e);
                        Some(self.save_local(&snapshot))
                    }
                }
            }
            PersistenceOutcome::Reset(Err(e)) => {
                log::warn!("Remote session reset failed: {}", e);
                None
            }
            PersistenceOutcome::Reset(Ok(())) | PersistenceOutcome::Loaded(_) => None,
        }
    }
}
