//! Snapshot persistence across application restarts.

use nml_client::config::AppConfig;
use nml_client::error::ClientError;
use nml_client::lab::lab_by_id;
use nml_client::state::labs::{LabOutput, LabSnapshot};
use nml_client::state::NmlApp;
use nml_client::storage::Storage;
use serde_json::{json, Map, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn app_in(dir: &Path) -> NmlApp {
    let config = Arc::new(AppConfig::default());
    let storage = Storage::open(dir).expect("storage opens");
    NmlApp::new(config, storage).expect("app builds")
}

fn newtons_input() -> Map<String, Value> {
    match json!({
        "f_string": "x**2-4",
        "df_string": "2*x",
        "x0": 3.0,
        "tol": 1e-6,
        "max_iter": 100
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[test]
fn inputs_survive_a_restart() {
    let dir = tempdir().expect("tempdir");
    let lab = lab_by_id("newtons-method").expect("known lab");

    {
        let app = app_in(dir.path());
        app.with_inner(|inner| inner.update_input(lab, newtons_input()));
        app.shutdown();
    }

    let app = app_in(dir.path());
    let snapshot = app.with_inner(|inner| inner.lab_snapshot(lab.client_url));
    assert_eq!(snapshot.input, Some(newtons_input()));
    assert_eq!(snapshot.output, None);
    app.shutdown();
}

#[test]
fn outputs_survive_a_restart() {
    let dir = tempdir().expect("tempdir");
    let lab = lab_by_id("newtons-method").expect("known lab");
    let output: LabOutput =
        serde_json::from_value(json!({"root": 2.0000000000284217, "iterations": 5}))
            .expect("valid output");

    {
        let app = app_in(dir.path());
        app.with_inner(|inner| {
            inner.update_input(lab, newtons_input());
            inner.apply_calculate_result(lab.client_url, Ok(output.clone()));
        });
        app.shutdown();
    }

    let app = app_in(dir.path());
    let snapshot = app.with_inner(|inner| inner.lab_snapshot(lab.client_url));
    assert_eq!(snapshot.output, Some(output));
    app.shutdown();
}

#[test]
fn updating_input_never_touches_the_output() {
    let dir = tempdir().expect("tempdir");
    let lab = lab_by_id("newtons-method").expect("known lab");
    let output: LabOutput = serde_json::from_value(json!({"root": 2.0})).expect("valid output");

    let app = app_in(dir.path());
    app.with_inner(|inner| {
        inner.update_input(lab, newtons_input());
        inner.apply_calculate_result(lab.client_url, Ok(output.clone()));

        let mut changed = newtons_input();
        changed.insert("x0".to_string(), json!(-3.0));
        inner.update_input(lab, changed);

        let snapshot = inner.lab_snapshot(lab.client_url);
        assert_eq!(snapshot.output, Some(output.clone()));
        assert_eq!(
            snapshot.input.as_ref().and_then(|i| i.get("x0")),
            Some(&json!(-3.0))
        );
    });
    app.shutdown();
}

#[test]
fn clearing_output_never_touches_the_input() {
    let dir = tempdir().expect("tempdir");
    let lab = lab_by_id("newtons-method").expect("known lab");
    let output: LabOutput = serde_json::from_value(json!({"root": 2.0})).expect("valid output");

    let app = app_in(dir.path());
    app.with_inner(|inner| {
        inner.update_input(lab, newtons_input());
        inner.apply_calculate_result(lab.client_url, Ok(output));
        inner.clear_output(lab);

        let snapshot = inner.lab_snapshot(lab.client_url);
        assert_eq!(snapshot.output, None);
        assert_eq!(snapshot.input, Some(newtons_input()));
    });
    app.shutdown();
}

#[test]
fn api_failures_are_stored_as_structured_errors() {
    let dir = tempdir().expect("tempdir");
    let lab = lab_by_id("newtons-method").expect("known lab");

    let app = app_in(dir.path());
    app.with_inner(|inner| {
        inner.update_input(lab, newtons_input());
        inner.apply_calculate_result(
            lab.client_url,
            Err(ClientError::Api {
                status: 422,
                status_text: "Unprocessable Entity".to_string(),
                detail: json!("bad expression"),
            }),
        );

        let snapshot = inner.lab_snapshot(lab.client_url);
        let Some(LabOutput::Error { error }) = snapshot.output else {
            panic!("expected an error output");
        };
        assert_eq!(error.status, 422);
        assert_eq!(error.status_text, "Unprocessable Entity");
        assert_eq!(error.detail, json!("bad expression"));
        // The input is untouched by a failed calculation.
        assert_eq!(snapshot.input, Some(newtons_input()));
    });
    app.shutdown();
}

#[test]
fn stored_errors_use_the_wire_field_names() {
    let dir = tempdir().expect("tempdir");
    let lab = lab_by_id("newtons-method").expect("known lab");

    {
        let app = app_in(dir.path());
        app.with_inner(|inner| {
            inner.apply_calculate_result(
                lab.client_url,
                Err(ClientError::Api {
                    status: 500,
                    status_text: "Internal Server Error".to_string(),
                    detail: Value::Null,
                }),
            );
        });
        app.shutdown();
    }

    let storage = Storage::open(dir.path()).expect("storage reopens");
    let raw: Value = storage
        .get_json::<Value>(&format!("lab-{}", lab.client_url))
        .expect("snapshot stored");
    assert_eq!(raw["output"]["error"]["statusText"], json!("Internal Server Error"));

    let snapshot: LabSnapshot = serde_json::from_value(raw).expect("snapshot parses back");
    assert!(matches!(snapshot.output, Some(LabOutput::Error { .. })));
}

#[test]
fn transport_failures_map_to_status_zero() {
    let dir = tempdir().expect("tempdir");
    let lab = lab_by_id("newtons-method").expect("known lab");

    let app = app_in(dir.path());
    app.with_inner(|inner| {
        inner.apply_calculate_result(
            lab.client_url,
            Err(ClientError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
        );
        let snapshot = inner.lab_snapshot(lab.client_url);
        let Some(LabOutput::Error { error }) = snapshot.output else {
            panic!("expected an error output");
        };
        assert_eq!(error.status, 0);
        assert_eq!(error.status_text, "Unknown Error");
    });
    app.shutdown();
}
