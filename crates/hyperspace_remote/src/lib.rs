//! Remote collaborators for hyperspace sessions
//!
//! Persistence and texture services are blocking traits. [`PersistenceClient`]
//! and [`TextureStreamer`] run them off the frame loop with bounded retries
//! and hand results back through channels.

mod cancel;
mod client;
mod error;
mod local;
mod retry;
mod service;
mod session;
mod streamer;

pub use cancel::CancelToken;
pub use client::{PersistenceClient, PersistenceOutcome, PersistenceRequest, PersistenceResult, RequestId};
pub use error::RemoteError;
pub use local::LocalStore;
pub use retry::RetryPolicy;
pub use service::{FilePersistence, MemoryPersistence, PersistenceService, ProceduralTextures, TextureService};
pub use session::SessionId;
pub use streamer::{TextureDelivery, TextureStreamer};
