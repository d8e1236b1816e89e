//! Host-injected call primitive transport.
//!
//! Some embeddings expose a direct call function taking the operation name,
//! the argument list and a success/failure callback pair, of which exactly
//! one fires exactly once. The pair is adapted to a future through a shared
//! oneshot slot.

use crate::{BackendError, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub type OnSuccess = Box<dyn FnOnce(Value) + Send>;
pub type OnFailure = Box<dyn FnOnce(BackendError) + Send>;

/// The primitive the host injects.
pub type HostCallFn = Arc<dyn Fn(&str, Vec<Value>, OnSuccess, OnFailure) + Send + Sync>;

pub struct HostCallTransport {
    call_fn: HostCallFn,
}

impl HostCallTransport {
    pub fn new(call_fn: HostCallFn) -> Self {
        Self { call_fn }
    }
}

#[async_trait]
impl Transport for HostCallTransport {
    async fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, BackendError> {
        let (tx, rx) = oneshot::channel();
        // Both callbacks settle the same slot; whichever fires first wins
        // and a second invocation finds the slot empty.
        let slot = Arc::new(Mutex::new(Some(tx)));

        let success_slot = Arc::clone(&slot);
        let on_success: OnSuccess = Box::new(move |value| {
            if let Some(tx) = success_slot.lock().expect("result slot poisoned").take() {
                let _ = tx.send(Ok(value));
            }
        });
        let failure_slot = Arc::clone(&slot);
        let on_failure: OnFailure = Box::new(move |error| {
            if let Some(tx) = failure_slot.lock().expect("result slot poisoned").take() {
                let _ = tx.send(Err(error));
            }
        });

        (self.call_fn)(name, args, on_success, on_failure);

        // A host that drops both callbacks without calling either counts as
        // a disconnect.
        rx.await.unwrap_or_else(|_| Err(BackendError::disconnected()))
    }
}
