//! Server connectivity state.
//!
//! Holds the connection status, the configured API URL, the last health
//! snapshot pushed over the socket, and the busy/idle task flag. The invariant
//! maintained here: `Connected` implies a non-null task state (defaulting to
//! `Idle` on the transition in), and any other status forces the task state
//! back to null.
//!
//! There is no automatic retry. A dropped connection stays `Disconnected`
//! until the user retries from the footer or changes the API URL.

use super::{AppInner, NmlApp};
use crate::socket;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub(crate) const API_URL_STORAGE_KEY: &str = "apiUrl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerTaskState {
    Idle,
    Calculating,
}

/// Health metrics pushed by the server. Never mutated client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerHealth {
    pub cpu_load: f64,
    pub memory_load: f64,
    pub available_memory: u64,
    pub total_memory: u64,
    pub used_memory: u64,
}

/// Process-wide server connectivity snapshot.
#[derive(Debug, Clone)]
pub struct ServerStateModel {
    pub connection_status: ConnectionStatus,
    pub api_url: Option<String>,
    pub server_health: Option<ServerHealth>,
    pub server_task_state: Option<ServerTaskState>,
}

impl Default for ServerStateModel {
    fn default() -> Self {
        Self {
            connection_status: ConnectionStatus::Disconnected,
            api_url: None,
            server_health: None,
            server_task_state: None,
        }
    }
}

impl ServerStateModel {
    /// True when a calculation may be submitted.
    pub fn can_run_task(&self) -> bool {
        self.connection_status == ConnectionStatus::Connected
            && self.server_task_state == Some(ServerTaskState::Idle)
    }
}

impl AppInner {
    /// Applies a connection-status transition reported by the socket listener.
    pub fn update_connection_status(
        &mut self,
        status: ConnectionStatus,
        health: Option<ServerHealth>,
    ) {
        self.server.server_task_state = if status == ConnectionStatus::Connected {
            self.server.server_task_state.or(Some(ServerTaskState::Idle))
        } else {
            None
        };
        self.server.connection_status = status;
        self.server.server_health = health;
    }

    /// Sets the busy/idle flag directly. Driven by the calculation flow.
    pub fn update_task_state(&mut self, state: ServerTaskState) {
        self.server.server_task_state = Some(state);
    }
}

impl NmlApp {
    /// Persists a new API URL, updates state, and reconnects to it.
    pub fn set_api_url(&self, api_url: &str) {
        self.with_inner(|inner| {
            if let Err(e) = inner.storage.set_item(API_URL_STORAGE_KEY, api_url) {
                warn!("Failed to persist API URL: {}", e);
            }
            inner.server.api_url = Some(api_url.to_string());
        });
        info!("API URL set to {}", api_url);
        self.connect(Some(api_url));
    }

    /// Opens the health socket after the configured pacing delay.
    ///
    /// With no URL given, the stored URL is used. Transitions to `Connecting`
    /// immediately and clears the last health snapshot and task state.
    pub fn connect(&self, api_url: Option<&str>) {
        let (target, delay) = self.with_inner(|inner| {
            inner.server.connection_status = ConnectionStatus::Connecting;
            inner.server.server_health = None;
            inner.server.server_task_state = None;
            let target = api_url
                .map(str::to_string)
                .or_else(|| inner.server.api_url.clone());
            (target, inner.config.server.connection_delay_ms)
        });

        let Some(api_url) = target else {
            warn!("Connect dispatched with no API URL available");
            self.with_inner(|inner| {
                inner.update_connection_status(ConnectionStatus::Disconnected, None);
            });
            return;
        };

        let app = self.clone();
        self.runtime().spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;

            let ws_url = socket::derive_ws_url(&api_url);
            let on_status = {
                let app = app.clone();
                move |status: ConnectionStatus, health: Option<ServerHealth>| {
                    app.with_inner(|inner| inner.update_connection_status(status, health));
                }
            };
            let runtime = app.runtime();
            app.with_inner(|inner| inner.socket.connect(&runtime, &ws_url, on_status));
        });
    }
}
