//! Test doubles for the backend.
//!
//! `MockBackend` is a scripted WebSocket server speaking the socket frame
//! protocol: it records every inbound frame, replies according to its
//! script, and can push notifications or drop the connection on demand.
//! `StaticHost` is a canned-response structured channel for UI tests.

use async_trait::async_trait;
use bridge::HostChannel;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;

/// How the mock answers requests.
pub enum Script {
    /// Reply immediately; the payload echoes the operation and arguments.
    Echo,
    /// Buffer the first `n` requests, then release their responses in
    /// reverse arrival order.
    ReverseAfter(usize),
    /// Reply with the canned payload for the operation, or a remote error
    /// for operations not in the map.
    Canned(HashMap<String, Value>),
}

enum Control {
    Notify(Value),
    Disconnect,
}

pub struct MockBackend {
    url: String,
    control: mpsc::UnboundedSender<Control>,
    received: Arc<Mutex<Vec<Value>>>,
}

impl MockBackend {
    pub async fn start(script: Script) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock backend");
        let addr = listener.local_addr().expect("local addr");
        let (control, control_rx) = mpsc::unbounded_channel();
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&received);
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let ws = tokio_tungstenite::accept_async(stream).await.expect("handshake");
            serve(ws, script, control_rx, log).await;
        });

        Self {
            url: format!("ws://{addr}"),
            control,
            received,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Push a notification frame (no request id).
    pub fn notify(&self, payload: Value) {
        let _ = self.control.send(Control::Notify(payload));
    }

    /// Hard-close the connection, leaving any buffered responses unsent.
    pub fn disconnect(&self) {
        let _ = self.control.send(Control::Disconnect);
    }

    /// Every frame received so far, in arrival order.
    pub fn received(&self) -> Vec<Value> {
        self.received.lock().expect("received log poisoned").clone()
    }
}

async fn serve(
    ws: tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
    script: Script,
    mut control: mpsc::UnboundedReceiver<Control>,
    log: Arc<Mutex<Vec<Value>>>,
) {
    let (mut sink, mut source) = ws.split();
    let mut held: Vec<Value> = Vec::new();

    loop {
        tokio::select! {
            command = control.recv() => match command {
                Some(Control::Notify(payload)) => {
                    let frame = json!({ "parameters": payload });
                    if sink.send(WsMessage::Text(frame.to_string())).await.is_err() {
                        return;
                    }
                }
                Some(Control::Disconnect) | None => {
                    let _ = sink.close().await;
                    return;
                }
            },
            message = source.next() => {
                let text = match message {
                    Some(Ok(WsMessage::Text(text))) => text,
                    Some(Ok(_)) => continue,
                    Some(Err(_)) | None => return,
                };
                let frame: Value = serde_json::from_str(&text).expect("client sent valid JSON");
                log.lock().expect("received log poisoned").push(frame.clone());

                match &script {
                    Script::Echo => {
                        let reply = echo_response(&frame);
                        if sink.send(WsMessage::Text(reply.to_string())).await.is_err() {
                            return;
                        }
                    }
                    Script::ReverseAfter(n) => {
                        held.push(frame);
                        if held.len() == *n {
                            for buffered in held.drain(..).rev() {
                                let reply = echo_response(&buffered);
                                if sink.send(WsMessage::Text(reply.to_string())).await.is_err() {
                                    return;
                                }
                            }
                        }
                    }
                    Script::Canned(responses) => {
                        let name = frame["name"].as_str().unwrap_or_default();
                        let reply = match responses.get(name) {
                            Some(data) => json!({
                                "request_id": frame["request_id"],
                                "error": false,
                                "data": data,
                            }),
                            None => json!({
                                "request_id": frame["request_id"],
                                "error": true,
                                "data": {
                                    "name": "unknown operation",
                                    "message": format!("no handler for {name}"),
                                },
                            }),
                        };
                        if sink.send(WsMessage::Text(reply.to_string())).await.is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }
}

fn echo_response(request: &Value) -> Value {
    json!({
        "request_id": request["request_id"],
        "error": false,
        "data": {
            "name": request["name"],
            "parameters": request["parameters"],
        },
    })
}

/// Structured channel answering from a canned map, for tests that need a
/// working [`bridge::Bridge`] without a socket.
pub struct StaticHost {
    responses: HashMap<String, Value>,
}

impl StaticHost {
    pub fn new(responses: HashMap<String, Value>) -> Self {
        Self { responses }
    }

    /// A host with no canned answers; every call fails remotely.
    pub fn empty() -> Self {
        Self::new(HashMap::new())
    }
}

#[async_trait]
impl HostChannel for StaticHost {
    async fn exchange(&self, payload: String) -> Result<String, String> {
        let (name, _args): (String, Vec<Value>) =
            serde_json::from_str(&payload).map_err(|e| e.to_string())?;
        let envelope = match self.responses.get(&name) {
            Some(data) => json!({ "error": false, "data": data }),
            None => json!({
                "error": true,
                "data": { "name": "unknown operation", "message": format!("no handler for {name}") },
            }),
        };
        Ok(envelope.to_string())
    }
}
