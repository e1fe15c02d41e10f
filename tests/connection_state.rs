//! Connection-status transitions and the task-state invariant.

use nml_client::config::AppConfig;
use nml_client::state::server::{
    ConnectionStatus, ServerHealth, ServerStateModel, ServerTaskState,
};
use nml_client::state::NmlApp;
use nml_client::storage::Storage;
use std::sync::Arc;
use tempfile::tempdir;

fn sample_health() -> ServerHealth {
    ServerHealth {
        cpu_load: 12.5,
        memory_load: 40.0,
        available_memory: 9_600_000_000,
        total_memory: 16_000_000_000,
        used_memory: 6_400_000_000,
    }
}

fn app() -> (NmlApp, tempfile::TempDir) {
    let dir = tempdir().expect("tempdir");
    let config = Arc::new(AppConfig::default());
    let storage = Storage::open(dir.path()).expect("storage opens");
    let app = NmlApp::new(config, storage).expect("app builds");
    (app, dir)
}

#[test]
fn connecting_clears_health_and_task_state() {
    let (app, _dir) = app();
    app.with_inner(|inner| {
        inner.update_connection_status(ConnectionStatus::Connected, Some(sample_health()));
        assert_eq!(inner.server.server_task_state, Some(ServerTaskState::Idle));

        inner.update_connection_status(ConnectionStatus::Connecting, None);
        assert_eq!(inner.server.connection_status, ConnectionStatus::Connecting);
        assert_eq!(inner.server.server_health, None);
        assert_eq!(inner.server.server_task_state, None);
    });
    app.shutdown();
}

#[test]
fn connected_defaults_the_task_state_to_idle() {
    let (app, _dir) = app();
    app.with_inner(|inner| {
        inner.update_connection_status(ConnectionStatus::Connected, Some(sample_health()));
        assert_eq!(inner.server.connection_status, ConnectionStatus::Connected);
        assert_eq!(inner.server.server_task_state, Some(ServerTaskState::Idle));
        assert_eq!(inner.server.server_health, Some(sample_health()));
    });
    app.shutdown();
}

#[test]
fn health_frames_keep_a_running_calculation() {
    let (app, _dir) = app();
    app.with_inner(|inner| {
        inner.update_connection_status(ConnectionStatus::Connected, Some(sample_health()));
        inner.update_task_state(ServerTaskState::Calculating);

        // The next health push must not reset the busy flag.
        inner.update_connection_status(ConnectionStatus::Connected, Some(sample_health()));
        assert_eq!(
            inner.server.server_task_state,
            Some(ServerTaskState::Calculating)
        );
    });
    app.shutdown();
}

#[test]
fn disconnecting_nulls_the_task_state() {
    let (app, _dir) = app();
    app.with_inner(|inner| {
        inner.update_connection_status(ConnectionStatus::Connected, Some(sample_health()));
        inner.update_task_state(ServerTaskState::Calculating);

        inner.update_connection_status(ConnectionStatus::Disconnected, None);
        assert_eq!(
            inner.server.connection_status,
            ConnectionStatus::Disconnected
        );
        assert_eq!(inner.server.server_task_state, None);
        assert_eq!(inner.server.server_health, None);
    });
    app.shutdown();
}

#[test]
fn tasks_only_run_when_connected_and_idle() {
    let mut server = ServerStateModel::default();
    assert!(!server.can_run_task());

    server.connection_status = ConnectionStatus::Connected;
    server.server_task_state = Some(ServerTaskState::Idle);
    assert!(server.can_run_task());

    server.server_task_state = Some(ServerTaskState::Calculating);
    assert!(!server.can_run_task());

    server.connection_status = ConnectionStatus::Connecting;
    server.server_task_state = None;
    assert!(!server.can_run_task());
}

#[test]
fn set_api_url_persists_and_updates_state() {
    let dir = tempdir().expect("tempdir");
    let config = Arc::new(AppConfig::default());

    {
        let storage = Storage::open(dir.path()).expect("storage opens");
        let app = NmlApp::new(config.clone(), storage).expect("app builds");
        app.set_api_url("http://numerics.example:9000/api");
        assert_eq!(
            app.with_inner(|inner| inner.server.api_url.clone()),
            Some("http://numerics.example:9000/api".to_string())
        );
        app.shutdown();
    }

    // A fresh start picks the stored URL up instead of the default.
    let storage = Storage::open(dir.path()).expect("storage reopens");
    assert_eq!(
        storage.get_item("apiUrl"),
        Some("http://numerics.example:9000/api")
    );
    let app = NmlApp::new(config, storage).expect("app builds");
    assert_eq!(
        app.with_inner(|inner| inner.server.api_url.clone()),
        Some("http://numerics.example:9000/api".to_string())
    );
    app.shutdown();
}

#[test]
fn default_api_url_is_used_on_first_start() {
    let (app, _dir) = app();
    assert_eq!(
        app.with_inner(|inner| inner.server.api_url.clone()),
        Some("http://localhost:8000/api".to_string())
    );
    app.shutdown();
}
