//! End-to-end reload scenarios through the file adapter.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{graphql_route, wait_until, write_config, RecordingEngine};
use control_plane::config::{load_settings, ConfigError, GatewaySettings};
use control_plane::reload::{ConfigLoader, LoaderState};
use control_plane::Error;
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn file_settings(path: &std::path::Path, debounce: &str) -> GatewaySettings {
    let mut settings = GatewaySettings::default();
    settings.config.adapter = "file".into();
    settings.config.path = path.display().to_string();
    settings.config.debounce_interval = debounce.into();
    settings
}

#[tokio::test]
async fn test_initial_route_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "gateway.toml", &graphql_route(&[]));
    let engine = Arc::new(RecordingEngine::default());

    let loader = ConfigLoader::initialize(&file_settings(&path, "500ms"), engine.clone())
        .await
        .unwrap();
    assert_eq!(loader.state(), LoaderState::Watching);
    assert_eq!(engine.loads(), 1);

    let snapshot = engine.snapshot().unwrap();
    let compiled = serde_json::to_value(&snapshot.config).unwrap();
    assert_eq!(compiled["logging"]["logs"]["default"]["level"], "INFO");
    assert_eq!(
        compiled["apps"]["http"]["servers"]["default"],
        json!({
            "listen": [":4122"],
            "routes": [{
                "match": [{"path": ["/v1/graphql"]}],
                "handle": [{"handler": "sc_graphql_handler"}]
            }]
        })
    );
}

#[tokio::test]
async fn test_burst_of_file_edits_reloads_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "gateway.toml", &graphql_route(&["GET"]));
    let engine = Arc::new(RecordingEngine::default());

    let loader = Arc::new(
        ConfigLoader::initialize(&file_settings(&path, "300ms"), engine.clone())
            .await
            .unwrap(),
    );
    let cancel = CancellationToken::new();
    let task = tokio::spawn({
        let loader = Arc::clone(&loader);
        let cancel = cancel.clone();
        async move { loader.watch(cancel).await }
    });
    // let the watcher register before editing
    tokio::time::sleep(Duration::from_millis(200)).await;

    for methods in [["POST"], ["PUT"], ["PATCH"]] {
        write_config(dir.path(), "gateway.toml", &graphql_route(&methods));
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    assert!(wait_until(Duration::from_secs(5), || engine.epoch() >= 2).await);
    tokio::time::sleep(Duration::from_millis(700)).await;

    assert_eq!(engine.loads(), 2);
    assert_eq!(engine.epoch(), 2);
    assert_eq!(engine.first_route_methods(), ["PATCH"]);

    cancel.cancel();
    task.await.unwrap().unwrap();
    assert_eq!(loader.state(), LoaderState::Stopped);
}

#[tokio::test]
async fn test_broken_edit_keeps_active_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "gateway.toml", &graphql_route(&["GET"]));
    let engine = Arc::new(RecordingEngine::default());

    let loader = Arc::new(
        ConfigLoader::initialize(&file_settings(&path, "100ms"), engine.clone())
            .await
            .unwrap(),
    );
    let cancel = CancellationToken::new();
    let task = tokio::spawn({
        let loader = Arc::clone(&loader);
        let cancel = cancel.clone();
        async move { loader.watch(cancel).await }
    });
    tokio::time::sleep(Duration::from_millis(200)).await;

    write_config(dir.path(), "gateway.toml", "[[routes]]\npath = [\"relative\"]\n");
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(engine.epoch(), 1);
    assert_eq!(engine.first_route_methods(), ["GET"]);

    write_config(dir.path(), "gateway.toml", &graphql_route(&["DELETE"]));
    assert!(wait_until(Duration::from_secs(5), || engine.epoch() == 2).await);
    assert_eq!(engine.first_route_methods(), ["DELETE"]);

    cancel.cancel();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_unknown_adapter_is_rejected() {
    let mut settings = GatewaySettings::default();
    settings.config.adapter = "ftp".into();
    let engine = Arc::new(RecordingEngine::default());

    let err = ConfigLoader::initialize(&settings, engine.clone())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::Config(ConfigError::UnknownAdapter(ref name)) if name == "ftp"));
    assert_eq!(engine.loads(), 0);
    assert!(engine.snapshot().is_none());
}

#[test]
fn test_unknown_adapter_fails_settings_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "control-plane.toml",
        "[config]\nadapter = \"ftp\"\n",
    );
    let err = load_settings(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(err.to_string().contains("ftp"));
}

#[tokio::test]
async fn test_missing_config_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Arc::new(RecordingEngine::default());
    let settings = file_settings(&dir.path().join("absent.toml"), "500ms");

    let err = ConfigLoader::initialize(&settings, engine.clone())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, Error::Adapter(_)));
    assert_eq!(engine.loads(), 0);
}
