//! The core application state and logic.
//!
//! `NmlApp` is the central hub of the client: it owns the Tokio runtime, the
//! persisted key/value store, the HTTP adapter, the health-socket handle, and
//! the two state models (server connectivity and per-lab snapshots). All state
//! mutations are synchronous methods on `AppInner` behind a single mutex, so a
//! reader between actions always observes a consistent snapshot. Anything that
//! takes time (HTTP calls, the socket, pacing delays) runs as a spawned task
//! that re-enters the store through `with_inner` when it completes.

pub mod labs;
pub mod server;

use crate::config::AppConfig;
use crate::error::ClientResult;
use crate::http::HttpApi;
use crate::lab::LABS;
use crate::socket::HealthSocket;
use crate::storage::Storage;
use labs::LabSnapshot;
use log::info;
use server::ServerStateModel;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;

/// The main application struct that holds all state.
#[derive(Clone)]
pub struct NmlApp {
    inner: Arc<Mutex<AppInner>>,
    runtime: Arc<Runtime>,
}

/// Inner state of the application, protected by a Mutex.
pub struct AppInner {
    pub config: Arc<AppConfig>,
    pub storage: Storage,
    pub http: HttpApi,
    pub server: ServerStateModel,
    pub labs: HashMap<String, LabSnapshot>,
    pub(crate) socket: HealthSocket,
}

impl NmlApp {
    /// Creates a new `NmlApp`, restoring persisted state, and dispatches the
    /// initial connect with the stored (or default) API URL.
    pub fn new(config: Arc<AppConfig>, storage: Storage) -> ClientResult<Self> {
        let runtime = Arc::new(Runtime::new()?);
        let http = HttpApi::new()?;

        let mut labs = HashMap::new();
        for lab in LABS.iter() {
            let snapshot = storage
                .get_json::<LabSnapshot>(&format!("lab-{}", lab.client_url))
                .unwrap_or_default();
            labs.insert(lab.client_url.to_string(), snapshot);
        }

        let api_url = storage
            .get_item(server::API_URL_STORAGE_KEY)
            .map(str::to_string)
            .unwrap_or_else(|| config.server.default_api_url.clone());

        let inner = AppInner {
            config,
            storage,
            http,
            server: ServerStateModel::default(),
            labs,
            socket: HealthSocket::new(),
        };

        let app = Self {
            inner: Arc::new(Mutex::new(inner)),
            runtime,
        };

        info!("Restored {} lab snapshots from storage", LABS.len());
        app.set_api_url(&api_url);
        Ok(app)
    }

    /// Provides safe access to the inner application state.
    #[allow(clippy::unwrap_used)]
    pub fn with_inner<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut AppInner) -> R,
    {
        let mut inner = self.inner.lock().unwrap();
        f(&mut inner)
    }

    /// Returns a clone of the application's Tokio runtime handle.
    pub fn runtime(&self) -> Arc<Runtime> {
        self.runtime.clone()
    }

    /// Shuts down background work (the health-socket listener).
    pub fn shutdown(&self) {
        self.with_inner(|inner| inner.socket.disconnect());
        info!("Shut down background tasks");
    }
}
