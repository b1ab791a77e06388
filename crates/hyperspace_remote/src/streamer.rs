//! Background texture streaming
//!
//! A small pool of worker threads fetches star textures. At most one fetch is
//! in flight per object; cancelling a fetch flips its token and forgets it, so
//! a result that arrives later is dropped in [`TextureStreamer::poll_all`].

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;

use hyperspace_core::{DimensionVector, ObjectKey, TextureImage};
use crate::cancel::CancelToken;
use crate::error::RemoteError;
use crate::retry::RetryPolicy;
use crate::service::TextureService;
use crate::session::SessionId;

/// A finished fetch for a star that still wants it
#[derive(Debug)]
pub struct TextureDelivery {
    pub key: ObjectKey,
    pub result: Result<Arc<TextureImage>, RemoteError>,
}

struct Job {
    key: ObjectKey,
    ticket: u64,
    position: DimensionVector,
    cancel: CancelToken,
}

struct Completed {
    key: ObjectKey,
    ticket: u64,
    result: Result<TextureImage, RemoteError>,
}

/// Fetches star textures on worker threads
pub struct TextureStreamer {
    sender: Option<Sender<Job>>,
    receiver: Receiver<Completed>,
    in_flight: HashMap<ObjectKey, (u64, CancelToken)>,
    session: Arc<RwLock<Option<SessionId>>>,
    next_ticket: u64,
    workers: Vec<thread::JoinHandle<()>>,
}

impl TextureStreamer {
    /// Start `workers` fetch threads (at least one)
    pub fn new(service: Arc<dyn TextureService>, policy: RetryPolicy, workers: usize) -> Self {
        let (job_tx, job_rx) = channel::<Job>();
        let (done_tx, done_rx) = channel::<Completed>();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let session = Arc::new(RwLock::new(None));

        let handles = (0..workers.max(1))
            .map(|i| {
                let job_rx = Arc::clone(&job_rx);
                let done_tx = done_tx.clone();
                let service = Arc::clone(&service);
                let session = Arc::clone(&session);
                thread::Builder::new()
                    .name(format!("texture-{}", i))
                    .spawn(move || worker_loop(service.as_ref(), &policy, &job_rx, &done_tx, &session))
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    log::error!("Failed to start texture worker: {}", e);
                    None
                }
            })
            .collect();

        Self {
            sender: Some(job_tx),
            receiver: done_rx,
            in_flight: HashMap::new(),
            session,
            next_ticket: 0,
            workers: handles,
        }
    }

    /// Session passed to the texture service with later fetches
    pub fn set_session(&self, session: Option<SessionId>) {
        if let Ok(mut current) = self.session.write() {
            *current = session;
        }
    }

    /// Start fetching the texture of `key`
    ///
    /// Returns false if a fetch for that object is already in flight.
    pub fn request(&mut self, key: ObjectKey, position: DimensionVector) -> bool {
        if self.in_flight.contains_key(&key) {
            return false;
        }
        let Some(sender) = &self.sender else {
            return false;
        };
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let cancel = CancelToken::new();
        let job = Job { key, ticket, position, cancel: cancel.clone() };
        if sender.send(job).is_err() {
            log::warn!("Texture workers have stopped; dropping request");
            return false;
        }
        self.in_flight.insert(key, (ticket, cancel));
        true
    }

    /// Stop the fetch for `key`; its result will be discarded
    pub fn cancel(&mut self, key: ObjectKey) -> bool {
        match self.in_flight.remove(&key) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every outstanding fetch
    pub fn cancel_all(&mut self) {
        for (_, (_, token)) in self.in_flight.drain() {
            token.cancel();
        }
    }

    pub fn is_in_flight(&self, key: ObjectKey) -> bool {
        self.in_flight.contains_key(&key)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Collect finished fetches (non-blocking)
    ///
    /// Results for cancelled or superseded fetches are dropped.
    pub fn poll_all(&mut self) -> Vec<TextureDelivery> {
        let mut deliveries = Vec::new();
        while let Ok(done) = self.receiver.try_recv() {
            match self.in_flight.get(&done.key) {
                Some((ticket, _)) if *ticket == done.ticket => {
                    self.in_flight.remove(&done.key);
                    deliveries.push(TextureDelivery {
                        key: done.key,
                        result: done.result.map(Arc::new),
                    });
                }
                _ => log::trace!("Dropping stale texture for {:?}", done.key),
            }
        }
        deliveries
    }
}

impl Drop for TextureStreamer {
    fn drop(&mut self) {
        self.cancel_all();
        // Closing the job channel ends the worker loops
        self.sender.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    service: &dyn TextureService,
    policy: &RetryPolicy,
    jobs: &Mutex<Receiver<Job>>,
    done: &Sender<Completed>,
    session: &RwLock<Option<SessionId>>,
) {
    loop {
        // Hold the lock only while waiting for the next job
        let job = match jobs.lock() {
            Ok(rx) => match rx.recv() {
                Ok(job) => job,
                Err(_) => break,
            },
            Err(_) => break,
        };
        if job.cancel.is_cancelled() {
            continue;
        }
        let current = session.read().ok().and_then(|s| *s);
        let result = policy.run(&job.cancel, "texture fetch", || {
            service.fetch_texture(current.as_ref(), &job.position, &job.cancel)
        });
        let result = result.and_then(|image| {
            if image.is_well_formed() {
                Ok(image)
            } else {
                Err(RemoteError::Serialize(format!(
                    "texture {}x{} has {} bytes",
                    image.width,
                    image.height,
                    image.rgba.len()
                )))
            }
        });
        if let Err(e) = &result {
            if !e.is_cancelled() {
                log::debug!("Texture fetch for {:?} failed: {}", job.key, e);
            }
        }
        if done.send(Completed { key: job.key, ticket: job.ticket, result }).is_err() {
            break;
        }
    }
}
