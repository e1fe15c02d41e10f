//! Health push channel.
//!
//! The server pushes JSON health objects over a WebSocket at
//! `{api_url}/server_health`; the client never sends. Each text frame is
//! parsed as an optional `ServerHealth` payload: a payload means the server is
//! alive (`Connected` + health), an explicit `null` or any stream error or
//! close collapses to `Disconnected`. No reconnect or backoff is implemented;
//! re-establishing a dropped connection requires an explicit retry or an API
//! URL change.

use crate::state::server::{ConnectionStatus, ServerHealth};
use futures::StreamExt;
use log::{debug, error, info};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

const HEALTH_ENDPOINT: &str = "server_health";

/// Derives the push-channel URL from the HTTP API base URL.
///
/// `http` becomes `ws`, `https` becomes `wss`, and the health endpoint is
/// appended: `http://host:9999/api` -> `ws://host:9999/api/server_health`.
pub fn derive_ws_url(api_url: &str) -> String {
    let base = if let Some(rest) = api_url.strip_prefix("https") {
        format!("wss{rest}")
    } else if let Some(rest) = api_url.strip_prefix("http") {
        format!("ws{rest}")
    } else {
        api_url.to_string()
    };
    format!("{}/{}", base.trim_end_matches('/'), HEALTH_ENDPOINT)
}

/// Handle to the single health-socket listener task.
pub struct HealthSocket {
    task: Option<JoinHandle<()>>,
}

impl HealthSocket {
    pub fn new() -> Self {
        Self { task: None }
    }

    /// Opens the socket, replacing any existing connection.
    ///
    /// `on_status` is invoked for every connection-state transition and every
    /// health frame.
    pub fn connect<F>(&mut self, runtime: &Runtime, ws_url: &str, on_status: F)
    where
        F: Fn(ConnectionStatus, Option<ServerHealth>) + Send + Sync + 'static,
    {
        self.disconnect();

        let ws_url = ws_url.to_string();
        self.task = Some(runtime.spawn(async move {
            let mut stream = match connect_async(&ws_url).await {
                Ok((stream, _response)) => {
                    info!("Health socket connected: {}", ws_url);
                    stream
                }
                Err(e) => {
                    error!("Health socket failed to connect: {}", e);
                    on_status(ConnectionStatus::Disconnected, None);
                    return;
                }
            };

            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<Option<ServerHealth>>(&text) {
                            Ok(Some(health)) => {
                                on_status(ConnectionStatus::Connected, Some(health));
                            }
                            Ok(None) => {
                                on_status(ConnectionStatus::Disconnected, None);
                            }
                            Err(e) => {
                                debug!("Unparseable health frame: {}", e);
                                on_status(ConnectionStatus::Disconnected, None);
                            }
                        }
                    }
                    Ok(Message::Close(_)) => {
                        info!("Health socket closed by server");
                        on_status(ConnectionStatus::Disconnected, None);
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("Health socket error: {}", e);
                        on_status(ConnectionStatus::Disconnected, None);
                        break;
                    }
                }
            }
        }));
    }

    /// Aborts the listener task, closing the connection.
    pub fn disconnect(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Default for HealthSocket {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for HealthSocket {
    fn drop(&mut self) {
        self.disconnect();
    }
}
