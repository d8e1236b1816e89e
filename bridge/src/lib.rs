//! Backend bridge for Clipshelf.
//!
//! One uniform asynchronous `call(name, args)` over whichever transport the
//! embedding provides: a structured message channel, a host-injected call
//! primitive, or a WebSocket to the backend process. Results are decoded
//! JSON payloads; every failure is normalized into [`BackendError`].

pub mod channel;
pub mod correlator;
pub mod host;
pub mod protocol;
pub mod socket;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;

pub use channel::{ChannelTransport, HostChannel};
pub use host::{HostCallFn, HostCallTransport};
pub use socket::SocketTransport;

/// Fan-out registry for backend push notifications.
pub type NotificationRegistry = dispatch::CallbackRegistry<Value, ()>;

/// The error shape every caller sees: remote errors pass through unchanged,
/// local transport failures are synthesized into the same form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{name}: {message}")]
pub struct BackendError {
    pub name: String,
    pub message: String,
}

impl BackendError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn disconnected() -> Self {
        Self::new("disconnected", "disconnected")
    }

    pub fn transport(cause: impl Display) -> Self {
        Self::new("transport error", cause.to_string())
    }

    pub fn decode(cause: impl Display) -> Self {
        Self::new("decode error", cause.to_string())
    }
}

/// One capability: issue a named call and await its result.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, BackendError>;
}

/// Explicit transport selection, decided once at startup.
pub enum TransportConfig {
    /// Local WebSocket backend, e.g. `ws://127.0.0.1:8877`.
    Socket { url: String },
    /// Structured message channel provided by an embedding host.
    Channel(Arc<dyn HostChannel>),
    /// Direct call primitive injected by an embedding host.
    HostCall(HostCallFn),
}

/// Connects the selected transport and wraps it in a [`Bridge`]. For the
/// socket variant this resolves only once the connection is up, which is the
/// signal to load the rest of the application.
pub async fn connect(
    config: TransportConfig,
    notifications: NotificationRegistry,
) -> Result<Bridge, BackendError> {
    let transport: Arc<dyn Transport> = match config {
        TransportConfig::Socket { url } => SocketTransport::connect(&url, notifications).await?,
        TransportConfig::Channel(host) => Arc::new(ChannelTransport::new(host)),
        TransportConfig::HostCall(call_fn) => Arc::new(HostCallTransport::new(call_fn)),
    };
    Ok(Bridge::new(transport))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoEntry {
    pub video_id: u64,
    pub filename: String,
    pub file_size: u64,
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoPage {
    pub videos: Vec<VideoEntry>,
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseInfo {
    pub name: String,
    pub path: String,
    pub video_count: u64,
}

/// Declared type of a user-defined video property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PropertyKind {
    Text,
    Int,
    Float,
    Flag,
    Enum { values: Vec<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyDef {
    pub name: String,
    #[serde(flatten)]
    pub kind: PropertyKind,
}

/// Handle to the active transport; cheap to clone, constructed once at
/// startup and passed to every consumer.
#[derive(Clone)]
pub struct Bridge {
    transport: Arc<dyn Transport>,
}

impl Bridge {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Raw named call. Operation names must be non-empty; arguments always
    /// travel as an ordered list.
    pub async fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, BackendError> {
        if name.is_empty() {
            return Err(BackendError::transport("operation name must not be empty"));
        }
        self.transport.call(name, args).await
    }

    async fn call_decoded<T: serde::de::DeserializeOwned>(
        &self,
        name: &str,
        args: Vec<Value>,
    ) -> Result<T, BackendError> {
        let value = self.call(name, args).await?;
        serde_json::from_value(value).map_err(BackendError::decode)
    }

    pub async fn list_databases(&self) -> Result<Vec<String>, BackendError> {
        self.call_decoded("list_databases", vec![]).await
    }

    /// Opens (or re-scans, when `update` is set) a library database.
    pub async fn open_database(&self, path: &str, update: bool) -> Result<DatabaseInfo, BackendError> {
        self.call_decoded("open_database", vec![json!(path), json!(update)])
            .await
    }

    pub async fn close_database(&self) -> Result<(), BackendError> {
        self.call("close_database", vec![]).await?;
        Ok(())
    }

    /// Asks the backend to run its native directory picker.
    pub async fn select_directory(&self, start: Option<&str>) -> Result<Option<String>, BackendError> {
        self.call_decoded("select_directory", vec![json!(start)]).await
    }

    pub async fn list_videos(
        &self,
        page: u64,
        page_size: u64,
        sort: &str,
        descending: bool,
        search: Option<&str>,
    ) -> Result<VideoPage, BackendError> {
        self.call_decoded(
            "list_videos",
            vec![
                json!(page),
                json!(page_size),
                json!(sort),
                json!(descending),
                json!(search),
            ],
        )
        .await
    }

    pub async fn get_prop_types(&self) -> Result<Vec<PropertyDef>, BackendError> {
        self.call_decoded("get_prop_types", vec![]).await
    }

    pub async fn set_video_properties(
        &self,
        video_id: u64,
        properties: Map<String, Value>,
    ) -> Result<(), BackendError> {
        self.call(
            "set_video_properties",
            vec![json!(video_id), Value::Object(properties)],
        )
        .await?;
        Ok(())
    }

    pub async fn rename_video(&self, video_id: u64, title: &str) -> Result<(), BackendError> {
        self.call("rename_video", vec![json!(video_id), json!(title)])
            .await?;
        Ok(())
    }

    pub async fn delete_video(&self, video_id: u64) -> Result<(), BackendError> {
        self.call("delete_video", vec![json!(video_id)]).await?;
        Ok(())
    }

    pub async fn open_containing_folder(&self, video_id: u64) -> Result<(), BackendError> {
        self.call("open_containing_folder", vec![json!(video_id)])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_page() {
        let json = r#"{
            "videos": [
                {
                    "video_id": 12,
                    "filename": "holiday.mp4",
                    "file_size": 73400320,
                    "duration": 1845.2,
                    "width": 1920,
                    "height": 1080,
                    "date": "2023-06-01 10:12:00",
                    "properties": {"genre": "family", "seen": true}
                }
            ],
            "total_count": 412
        }"#;

        let page: VideoPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.total_count, 412);
        assert_eq!(page.videos.len(), 1);
        assert_eq!(page.videos[0].filename, "holiday.mp4");
        assert_eq!(page.videos[0].properties["seen"], serde_json::json!(true));
    }

    #[test]
    fn test_parse_prop_types() {
        let json = r#"[
            {"name": "note", "type": "text"},
            {"name": "year", "type": "int"},
            {"name": "genre", "type": "enum", "values": ["family", "travel"]}
        ]"#;

        let defs: Vec<PropertyDef> = serde_json::from_str(json).unwrap();
        assert_eq!(defs.len(), 3);
        assert_eq!(defs[1].kind, PropertyKind::Int);
        assert_eq!(
            defs[2].kind,
            PropertyKind::Enum {
                values: vec!["family".into(), "travel".into()]
            }
        );
    }

    #[test]
    fn backend_error_display_includes_name_and_message() {
        let err = BackendError::new("invalid path", "no such directory");
        assert_eq!(err.to_string(), "invalid path: no such directory");
    }
}
