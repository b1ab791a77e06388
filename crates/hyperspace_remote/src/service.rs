//! Persistence and texture collaborators
//!
//! The traits are blocking; the background clients run them on worker
//! threads. Two persistence backends ship with the crate: an in-memory one
//! and a directory-backed one that stores one RON snapshot per session.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hyperspace_core::{DimensionVector, Snapshot, TextureImage};
use crate::cancel::CancelToken;
use crate::error::RemoteError;
use crate::session::SessionId;

/// Remote session storage
pub trait PersistenceService: Send + Sync {
    /// Create a new, empty session
    fn register(&self) -> Result<SessionId, RemoteError>;
    /// Store the snapshot of a session, replacing any previous one
    fn save(&self, session: &SessionId, snapshot: &Snapshot) -> Result<(), RemoteError>;
    /// Fetch the snapshot of a session ([`RemoteError::NotFound`] if none)
    fn load(&self, session: &SessionId) -> Result<Snapshot, RemoteError>;
    /// Forget everything stored for a session
    fn reset(&self, session: &SessionId) -> Result<(), RemoteError>;
}

/// Remote texture source
pub trait TextureService: Send + Sync {
    /// Produce the texture of the star at `position`
    ///
    /// Long-running implementations should check `cancel` and return
    /// [`RemoteError::Cancelled`] when it is set.
    fn fetch_texture(
        &self,
        session: Option<&SessionId>,
        position: &DimensionVector,
        cancel: &CancelToken,
    ) -> Result<TextureImage, RemoteError>;
}

/// Sessions kept in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    sessions: Mutex<HashMap<SessionId, Option<Snapshot>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<SessionId, Option<Snapshot>>>, RemoteError> {
        self.sessions
            .lock()
            .map_err(|_| RemoteError::Transient("session table poisoned".into()))
    }
}

impl PersistenceService for MemoryPersistence {
    fn register(&self) -> Result<SessionId, RemoteError> {
        let id = SessionId::generate();
        self.lock()?.insert(id, None);
        Ok(id)
    }

    fn save(&self, session: &SessionId, snapshot: &Snapshot) -> Result<(), RemoteError> {
        match self.lock()?.get_mut(session) {
            Some(slot) => {
                *slot = Some(snapshot.clone());
                Ok(())
            }
            None => Err(RemoteError::NotFound),
        }
    }

    fn load(&self, session: &SessionId) -> Result<Snapshot, RemoteError> {
        self.lock()?
            .get(session)
            .and_then(|s| s.clone())
            .ok_or(RemoteError::NotFound)
    }

    fn reset(&self, session: &SessionId) -> Result<(), RemoteError> {
        self.lock()?.remove(session);
        Ok(())
    }
}

/// Sessions stored as `<root>/<session>.ron`
#[derive(Debug, Clone)]
pub struct FilePersistence {
    root: PathBuf,
}

impl FilePersistence {
    /// Use `root` as the session directory, creating it if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, RemoteError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshot_path(&self, session: &SessionId) -> PathBuf {
        self.root.join(format!("{}.ron", session))
    }

    fn marker_path(&self, session: &SessionId) -> PathBuf {
        self.root.join(format!("{}.session", session))
    }
}

impl PersistenceService for FilePersistence {
    fn register(&self) -> Result<SessionId, RemoteError> {
        let id = SessionId::generate();
        fs::write(self.marker_path(&id), id.to_string())?;
        Ok(id)
    }

    fn save(&self, session: &SessionId, snapshot: &Snapshot) -> Result<(), RemoteError> {
        if !self.marker_path(session).exists() {
            return Err(RemoteError::NotFound);
        }
        // Write then rename so a crash never leaves a half-written snapshot
        let tmp = self.root.join(format!("{}.ron.tmp", session));
        fs::write(&tmp, snapshot.to_ron()?)?;
        fs::rename(&tmp, self.snapshot_path(session))?;
        Ok(())
    }

    fn load(&self, session: &SessionId) -> Result<Snapshot, RemoteError> {
        Ok(Snapshot::load(self.snapshot_path(session))?)
    }

    fn reset(&self, session: &SessionId) -> Result<(), RemoteError> {
        for path in [self.snapshot_path(session), self.marker_path(session)] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Deterministic textures derived from star positions
#[derive(Debug, Clone)]
pub struct ProceduralTextures {
    /// Edge length of generated images
    pub size: u32,
}

impl Default for ProceduralTextures {
    fn default() -> Self {
        Self { size: 16 }
    }
}

impl TextureService for ProceduralTextures {
    fn fetch_texture(
        &self,
        _session: Option<&SessionId>,
        position: &DimensionVector,
        cancel: &CancelToken,
    ) -> Result<TextureImage, RemoteError> {
        if cancel.is_cancelled() {
            return Err(RemoteError::Cancelled);
        }
        let mut hasher = DefaultHasher::new();
        for c in position.iter() {
            c.to_bits().hash(&mut hasher);
        }
        let seed = hasher.finish();
        let base = [(seed >> 16) as u8, (seed >> 8) as u8, seed as u8];

        let size = self.size.max(1);
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                // Radial falloff so the star reads as a disc
                let dx = x as f32 + 0.5 - size as f32 / 2.0;
                let dy = y as f32 + 0.5 - size as f32 / 2.0;
                let r = (dx * dx + dy * dy).sqrt() / (size as f32 / 2.0);
                let glow = (1.0 - r).clamp(0.0, 1.0);
                for channel in base {
                    rgba.push((channel as f32 * glow + 255.0 * glow * glow * 0.5).min(255.0) as u8);
                }
                rgba.push((glow * 255.0) as u8);
            }
        }
        Ok(TextureImage { width: size, height: size, rgba })
    }
}
