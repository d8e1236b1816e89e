//! Structured message-channel transport.
//!
//! The host object exchanges one JSON payload per call and replies with an
//! `{error, data}` envelope, so correlation is native. The host seam is the
//! [`HostChannel`] trait; embedding hosts (and tests) provide the concrete
//! object.

use crate::protocol::{decode_channel_response, encode_channel_request};
use crate::{BackendError, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// A host object that takes a marshalled `[name, args]` payload and returns
/// the raw reply envelope, or a causal message when the exchange itself
/// blows up.
#[async_trait]
pub trait HostChannel: Send + Sync {
    async fn exchange(&self, payload: String) -> Result<String, String>;
}

pub struct ChannelTransport {
    host: Arc<dyn HostChannel>,
}

impl ChannelTransport {
    pub fn new(host: Arc<dyn HostChannel>) -> Self {
        Self { host }
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, BackendError> {
        let payload = encode_channel_request(name, &args).map_err(BackendError::transport)?;
        let reply = self
            .host
            .exchange(payload)
            .await
            .map_err(BackendError::transport)?;
        decode_channel_response(&reply).map_err(BackendError::decode)?
    }
}
