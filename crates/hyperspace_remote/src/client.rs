//! Background persistence client
//!
//! [`PersistenceClient`] runs persistence calls on a dedicated worker thread
//! with retries, and hands results back through a channel that the frame loop
//! polls. Calls are processed in submission order.

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hyperspace_core::Snapshot;
use crate::cancel::CancelToken;
use crate::error::RemoteError;
use crate::retry::RetryPolicy;
use crate::service::PersistenceService;
use crate::session::SessionId;

/// Identifier of a submitted call
pub type RequestId = u64;

/// A persistence call to run in the background
#[derive(Debug, Clone)]
pub enum PersistenceRequest {
    Register,
    Save { session: SessionId, snapshot: Box<Snapshot> },
    Load { session: SessionId },
    Reset { session: SessionId },
}

impl PersistenceRequest {
    fn label(&self) -> &'static str {
        match self {
            PersistenceRequest::Register => "register",
            PersistenceRequest::Save { .. } => "save",
            PersistenceRequest::Load { .. } => "load",
            PersistenceRequest::Reset { .. } => "reset",
        }
    }
}

/// Outcome of a background call
#[derive(Debug)]
pub enum PersistenceOutcome {
    Registered(Result<SessionId, RemoteError>),
    Saved(Result<(), RemoteError>),
    Loaded(Result<Snapshot, RemoteError>),
    Reset(Result<(), RemoteError>),
}

impl PersistenceOutcome {
    /// True if the call failed
    pub fn is_err(&self) -> bool {
        match self {
            PersistenceOutcome::Registered(r) => r.is_err(),
            PersistenceOutcome::Saved(r) => r.is_err(),
            PersistenceOutcome::Loaded(r) => r.is_err(),
            PersistenceOutcome::Reset(r) => r.is_err(),
        }
    }
}

/// Completed call
#[derive(Debug)]
pub struct PersistenceResult {
    pub request_id: RequestId,
    pub outcome: PersistenceOutcome,
}

struct Job {
    id: RequestId,
    request: PersistenceRequest,
}

/// Persistence calls on a worker thread
///
/// The worker runs until the client is dropped.
pub struct PersistenceClient {
    sender: Sender<Job>,
    receiver: Receiver<PersistenceResult>,
    next_id: RequestId,
    shutdown: CancelToken,
}

impl PersistenceClient {
    pub fn new(service: Arc<dyn PersistenceService>, policy: RetryPolicy) -> Self {
        let (job_tx, job_rx) = channel::<Job>();
        let (result_tx, result_rx) = channel::<PersistenceResult>();
        let shutdown = CancelToken::new();
        let worker_shutdown = shutdown.clone();

        thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                let label = job.request.label();
                let outcome = execute(service.as_ref(), &policy, &worker_shutdown, job.request);
                if outcome.is_err() {
                    log::debug!("Persistence {} (request {}) failed", label, job.id);
                }
                let result = PersistenceResult { request_id: job.id, outcome };
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        });

        Self {
            sender: job_tx,
            receiver: result_rx,
            next_id: 0,
            shutdown,
        }
    }

    /// Queue a call and return its id
    pub fn submit(&mut self, request: PersistenceRequest) -> RequestId {
        self.next_id += 1;
        let id = self.next_id;
        // If send fails the worker has exited; the call is simply lost
        let _ = self.sender.send(Job { id, request });
        id
    }

    pub fn register(&mut self) -> RequestId {
        self.submit(PersistenceRequest::Register)
    }

    pub fn save(&mut self, session: SessionId, snapshot: Snapshot) -> RequestId {
        self.submit(PersistenceRequest::Save { session, snapshot: Box::new(snapshot) })
    }

    pub fn load(&mut self, session: SessionId) -> RequestId {
        self.submit(PersistenceRequest::Load { session })
    }

    pub fn reset(&mut self, session: SessionId) -> RequestId {
        self.submit(PersistenceRequest::Reset { session })
    }

    /// Next completed call, if any (non-blocking)
    pub fn poll(&self) -> Option<PersistenceResult> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }

    /// All calls completed so far (non-blocking)
    pub fn poll_all(&self) -> Vec<PersistenceResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.receiver.try_recv() {
            results.push(result);
        }
        results
    }

    /// Block until the next call completes or `timeout` passes
    pub fn wait(&self, timeout: Duration) -> Option<PersistenceResult> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for PersistenceClient {
    fn drop(&mut self) {
        // Stop retry loops early; queued calls drain without retrying
        self.shutdown.cancel();
    }
}

fn execute(
    service: &dyn PersistenceService,
    policy: &RetryPolicy,
    cancel: &CancelToken,
    request: PersistenceRequest,
) -> PersistenceOutcome {
    match request {
        PersistenceRequest::Register => {
            PersistenceOutcome::Registered(policy.run(cancel, "register", || service.register()))
        }
        PersistenceRequest::Save { session, snapshot } => {
            PersistenceOutcome::Saved(policy.run(cancel, "save", || service.save(&session, &snapshot)))
        }
        PersistenceRequest::Load { session } => {
            PersistenceOutcome::Loaded(policy.run(cancel, "load", || service.load(&session)))
        }
        PersistenceRequest::Reset { session } => {
            PersistenceOutcome::Reset(policy.run(cancel, "reset", || service.reset(&session)))
        }
    }
}
