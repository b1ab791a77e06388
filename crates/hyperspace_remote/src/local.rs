//! Local fallback storage
//!
//! Keeps the current session id and the last snapshot on disk so a session
//! survives restarts even when the remote service is unreachable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hyperspace_core::{Snapshot, SnapshotError};
use crate::session::SessionId;

const SESSION_FILE: &str = "session_id";
const SNAPSHOT_FILE: &str = "snapshot.ron";

/// Directory holding the local session id and snapshot
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Use `dir`, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stored session id; unreadable or malformed ids count as none
    pub fn session_id(&self) -> Option<SessionId> {
        let text = fs::read_to_string(self.dir.join(SESSION_FILE)).ok()?;
        match text.parse() {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("Ignoring malformed stored session id: {}", e);
                None
            }
        }
    }

    pub fn store_session_id(&self, id: &SessionId) -> io::Result<()> {
        fs::write(self.dir.join(SESSION_FILE), id.to_string())
    }

    /// Last snapshot saved locally, if any
    pub fn load_snapshot(&self) -> Result<Option<Snapshot>, SnapshotError> {
        match Snapshot::load(self.dir.join(SNAPSHOT_FILE)) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(SnapshotError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        snapshot.save(self.dir.join(SNAPSHOT_FILE))
    }

    /// Remove the stored session id and snapshot
    pub fn clear(&self) -> io::Result<()> {
        for name in [SESSION_FILE, SNAPSHOT_FILE] {
            match fs::remove_file(self.dir.join(name)) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyperspace_core::{GenerationConfig, Simulation, SimulationConfig, WorldGenerator};

    fn store(name: &str) -> LocalStore {
        let dir = std::env::temp_dir().join(format!("hyperspace_local_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        LocalStore::open(dir).unwrap()
    }

    fn snapshot() -> Snapshot {
        let generator = WorldGenerator::new(GenerationConfig {
            star_count: 3,
            asteroid_count: 0,
            seed: Some(2),
            ..GenerationConfig::default()
        });
        let mut sim = Simulation::new(SimulationConfig::default(), generator);
        Snapshot::capture(&sim.generate(5))
    }

    #[test]
    fn test_empty_store() {
        let store = store("empty");
        assert_eq!(store.session_id(), None);
        assert!(store.load_snapshot().unwrap().is_none());
        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_session_and_snapshot_round_trip() {
        let store = store("round_trip");
        let id = SessionId::generate();
        store.store_session_id(&id).unwrap();
        assert_eq!(store.session_id(), Some(id));

        let snap = snapshot();
        store.save_snapshot(&snap).unwrap();
        assert_eq!(store.load_snapshot().unwrap(), Some(snap));

        store.clear().unwrap();
        assert_eq!(store.session_id(), None);
        assert!(store.load_snapshot().unwrap().is_none());
        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_malformed_session_id_ignored() {
        let store = store("malformed");
        fs::write(store.dir().join(SESSION_FILE), "garbage").unwrap();
        assert_eq!(store.session_id(), None);
        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_corrupt_snapshot_is_parse_error() {
        let store = store("corrupt");
        fs::write(store.dir().join(SNAPSHOT_FILE), "(pilot: ").unwrap();
        assert!(matches!(store.load_snapshot(), Err(SnapshotError::Parse(_))));
        let _ = fs::remove_dir_all(store.dir());
    }
}
