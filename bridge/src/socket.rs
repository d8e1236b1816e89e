//! WebSocket transport.
//!
//! Outbound calls are framed with a request id; a read pump routes response
//! frames back to the correlator and unsolicited notification frames to the
//! notification registry. When the connection drops, every pending call is
//! rejected with the same disconnect error.

use crate::correlator::Correlator;
use crate::protocol::{InboundFrame, RequestFrame};
use crate::{BackendError, NotificationRegistry, Transport};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

pub struct SocketTransport {
    outbound: mpsc::UnboundedSender<WsMessage>,
    correlator: Arc<Correlator>,
}

impl SocketTransport {
    /// Connects to the backend and spawns the read/write pumps. Returning
    /// `Ok` is the bootstrap signal: the rest of the application may load.
    pub async fn connect(
        url: &str,
        notifications: NotificationRegistry,
    ) -> Result<Arc<Self>, BackendError> {
        let (stream, _) = connect_async(url)
            .await
            .map_err(|e| BackendError::transport(format!("connect to {url}: {e}")))?;
        tracing::info!(url, "connected to backend");

        let (mut sink, mut source) = stream.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<WsMessage>();
        let correlator = Arc::new(Correlator::new());

        tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                if let Err(e) = sink.send(frame).await {
                    tracing::warn!("backend send failed: {e}");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let pump_correlator = Arc::clone(&correlator);
        tokio::spawn(async move {
            while let Some(message) = source.next().await {
                let text = match message {
                    Ok(WsMessage::Text(text)) => text,
                    Ok(WsMessage::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!("backend receive failed: {e}");
                        break;
                    }
                };
                match serde_json::from_str::<InboundFrame>(&text) {
                    Ok(frame) => route(frame, &pump_correlator, &notifications),
                    Err(e) => tracing::warn!("undecodable backend frame: {e}"),
                }
            }
            tracing::info!("backend connection closed");
            pump_correlator.abort_all(BackendError::disconnected());
        });

        Ok(Arc::new(Self {
            outbound,
            correlator,
        }))
    }
}

fn route(frame: InboundFrame, correlator: &Correlator, notifications: &NotificationRegistry) {
    match frame.request_id {
        Some(id) => {
            let result = frame.into_result();
            correlator.settle(id, result);
        }
        None => match frame.parameters {
            Some(payload) => {
                notifications.dispatch_all(&payload);
            }
            None => tracing::warn!("frame carries neither request_id nor parameters"),
        },
    }
}

#[async_trait]
impl Transport for SocketTransport {
    async fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, BackendError> {
        let (id, rx) = self.correlator.begin();
        let frame = RequestFrame {
            request_id: id,
            name: name.to_string(),
            parameters: Value::Array(args),
        };
        match serde_json::to_string(&frame) {
            Ok(text) => {
                if self.outbound.send(WsMessage::Text(text)).is_err() {
                    self.correlator.settle(id, Err(BackendError::disconnected()));
                }
            }
            Err(e) => {
                self.correlator.settle(id, Err(BackendError::transport(e)));
            }
        }
        // The slot is settled by the read pump, by the error paths above, or
        // by abort_all on disconnect; a dropped sender also means disconnect.
        rx.await.unwrap_or_else(|_| Err(BackendError::disconnected()))
    }
}
