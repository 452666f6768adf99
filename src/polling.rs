//! Fixed-interval refresh of collection snapshots.
//!
//! The store has no change notifications. Readers that want to stay
//! current re-read the whole collection on a timer and replace their local
//! state with the fresh snapshot. A [`Poller`] does the first read on the
//! calling thread, then keeps reading on a background thread until its
//! [`PollHandle`] is stopped or dropped.
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//! use mindcare_store::polling::Poller;
//! use mindcare_store::store_state::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let latest = Arc::new(Mutex::new(0usize));
//! let sink = Arc::clone(&latest);
//!
//! let handle = Poller::spawn(store.collection("appointments"), Duration::from_millis(50), move |snapshot| {
//!     if let Ok(mut count) = sink.lock() {
//!         *count = snapshot.len();
//!     }
//! })?;
//! assert_eq!(handle.refresh_count(), 1);
//! handle.stop();
//! # Ok::<(), mindcare_store::app_response::AppResponse>(())
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::app_response::AppResponse;
use crate::doc_model::QuerySnapshot;
use crate::store_state::CollectionRef;

pub struct Poller;

impl Poller {
    /// Reads `collection` now and then every `interval`, passing each snapshot to `on_snapshot`.
    pub fn spawn<F>(collection: CollectionRef, interval: Duration, mut on_snapshot: F) -> Result<PollHandle, AppResponse>
    where
        F: FnMut(QuerySnapshot) + Send + 'static,
    {
        let label = collection.name().to_string();
        Self::every(label, interval, move || {
            let snapshot = collection.get();
            debug!("Polled '{}': {} documents", collection.name(), snapshot.len());
            on_snapshot(snapshot);
        })
    }

    /// Runs `tick` now and then every `interval`, for readers spanning several collections.
    pub fn every<F>(label: impl Into<String>, interval: Duration, mut tick: F) -> Result<PollHandle, AppResponse>
    where
        F: FnMut() + Send + 'static,
    {
        let label = label.into();
        if interval.is_zero() {
            return Err(AppResponse::ValidationError(
                "Polling interval must be greater than zero".to_string(),
            ));
        }

        let refreshes = Arc::new(AtomicU64::new(0));
        tick();
        refreshes.fetch_add(1, Ordering::SeqCst);

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let counter = Arc::clone(&refreshes);

        let worker = thread::Builder::new()
            .name(format!("poll:{label}"))
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        tick();
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|e| AppResponse::DatabaseError(format!("Failed to start poller for '{label}': {e}")))?;

        info!("Polling '{}' every {:?}", label, interval);
        Ok(PollHandle {
            label,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
            refreshes,
        })
    }
}

/// Owner of a running poller. Dropping it stops the timer.
#[derive(Debug)]
pub struct PollHandle {
    label: String,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
    refreshes: Arc<AtomicU64>,
}

impl PollHandle {
    /// Number of snapshots delivered so far, including the initial read.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Stops the timer and waits for an in-progress refresh to finish.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            // The worker may already be gone if the callback panicked.
            let _ = tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Poller for '{}' terminated with a panic", self.label);
            } else {
                info!("Stopped polling '{}'", self.label);
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
