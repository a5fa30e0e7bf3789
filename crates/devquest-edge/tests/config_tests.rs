//! Configuration loading tests

use std::io::Write;

use devquest_edge::config::{BackendOrigin, Config, DEFAULT_BACKEND_ORIGIN};
use devquest_edge::proxy::{AppState, HeaderPolicy};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_explicit_file() {
    let file = write_config(
        r#"
        [edge]
        listen_addr = "0.0.0.0:9000"
        backend_origin = "http://localhost:8000/"
        origin_env = "DEVQUEST_TEST_ORIGIN_UNUSED"
        timeout_secs = 30
        "#,
    );

    let config = Config::load(Some(file.path())).unwrap().edge;
    assert_eq!(config.listen_addr, "0.0.0.0:9000");
    assert_eq!(config.timeout_secs, Some(30));

    let origin = config.resolve_origin_with(|_| None).unwrap();
    assert_eq!(origin.as_str(), "http://localhost:8000");
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("edge.toml");

    let err = Config::load(Some(missing.as_path())).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_environment_override_beats_file() {
    let file = write_config(
        r#"
        [edge]
        backend_origin = "https://from-file.example.com"
        "#,
    );

    let config = Config::from_file(file.path()).unwrap().edge;
    let origin = config
        .resolve_origin_with(|key| (key == "RAILWAY_BACKEND_URL").then(|| "https://override.example.com/".to_string()))
        .unwrap();
    assert_eq!(origin.as_str(), "https://override.example.com");
}

#[test]
fn test_default_origin_without_file_or_override() {
    let config = Config::default().edge;
    let origin = config.resolve_origin_with(|_| None).unwrap();
    assert_eq!(origin, BackendOrigin::parse(DEFAULT_BACKEND_ORIGIN).unwrap());
}

#[test]
fn test_allow_list_from_file_builds_state() {
    let file = write_config(
        r#"
        [edge]
        header_allow_list = ["Accept", "Content-Type"]
        "#,
    );

    let config = Config::from_file(file.path()).unwrap().edge;
    let origin = config.resolve_origin_with(|_| None).unwrap();
    let state = AppState::new(config, origin).unwrap();

    assert_eq!(state.policy.describe(), "accept, content-type");
    assert!(matches!(state.policy, HeaderPolicy::AllowList(_)));
}

#[test]
fn test_query_route_shadowing_health_is_rejected() {
    let file = write_config(
        r#"
        [edge]
        query_route = "/health"
        "#,
    );

    let config = Config::from_file(file.path()).unwrap().edge;
    let origin = config.resolve_origin_with(|_| None).unwrap();
    assert!(AppState::new(config, origin).is_err());
}

#[test]
fn test_query_route_with_capture_syntax_is_rejected() {
    for query_route in ["/api/:proxy", "/api/*rest", "/api/{path}"] {
        let file = write_config(&format!("[edge]\nquery_route = \"{query_route}\"\n"));

        let config = Config::from_file(file.path()).unwrap().edge;
        let origin = config.resolve_origin_with(|_| None).unwrap();
        let err = AppState::new(config, origin).err().unwrap();
        assert!(err.to_string().contains("literal path"), "{query_route}");
    }
}
