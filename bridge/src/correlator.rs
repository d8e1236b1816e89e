//! Pending-call bookkeeping for the socket transport.
//!
//! The other two transports correlate natively (one reply per exchange);
//! here every request gets an id from a strictly increasing counter and a
//! oneshot slot that is settled exactly once.

use crate::BackendError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

pub type CallResult = Result<Value, BackendError>;

#[derive(Debug, Default)]
struct State {
    slots: HashMap<u64, oneshot::Sender<CallResult>>,
    /// Set once the connection is gone; later calls fail with this error
    /// instead of parking a slot nothing will ever settle.
    closed: Option<BackendError>,
}

#[derive(Debug, Default)]
pub struct Correlator {
    next_id: AtomicU64,
    state: Mutex<State>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next request id and parks a result slot for it. On a
    /// closed correlator the slot comes back already rejected.
    pub fn begin(&self) -> (u64, oneshot::Receiver<CallResult>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.lock().expect("pending map poisoned");
        match &state.closed {
            Some(error) => {
                let _ = tx.send(Err(error.clone()));
            }
            None => {
                let previous = state.slots.insert(id, tx);
                debug_assert!(previous.is_none(), "request id {id} already pending");
            }
        }
        (id, rx)
    }

    /// Settles the pending call with this id. Returns `false` when no call
    /// is pending under the id — a late or duplicate response, dropped
    /// without touching anything else.
    pub fn settle(&self, id: u64, result: CallResult) -> bool {
        let slot = self
            .state
            .lock()
            .expect("pending map poisoned")
            .slots
            .remove(&id);
        match slot {
            Some(tx) => {
                // The caller may have been dropped; nothing left to do then.
                let _ = tx.send(result);
                true
            }
            None => {
                tracing::warn!(request_id = id, "dropping response with no pending call");
                false
            }
        }
    }

    /// Rejects every pending call and closes the correlator, used when the
    /// connection drops so no caller hangs forever.
    pub fn abort_all(&self, error: BackendError) {
        let drained: Vec<_> = {
            let mut state = self.state.lock().expect("pending map poisoned");
            state.closed = Some(error.clone());
            state.slots.drain().collect()
        };
        if !drained.is_empty() {
            tracing::warn!(count = drained.len(), "rejecting pending calls: {}", error);
        }
        for (_, tx) in drained {
            let _ = tx.send(Err(error.clone()));
        }
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().expect("pending map poisoned").slots.len()
    }
}
