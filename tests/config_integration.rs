use coursechat_widget::config::{AppConfig, DEFAULT_CONFIG_FILE};
use serial_test::serial;
use std::env;
use std::fs;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("COURSECHAT_CONFIG");
        env::remove_var("COURSECHAT_BASE_URL");
        env::remove_var("COURSECHAT_CLIENT__BASE_URL");
        env::remove_var("COURSECHAT_CLIENT__REQUEST_TIMEOUT_SECS");
        env::remove_var("COURSECHAT_WIDGET__BANGLA_MODE");
        env::remove_var("COURSECHAT_CSRF__COOKIE");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["coursechat"]).expect("defaults should load");
    assert_eq!(config.client.base_url, "http://127.0.0.1:8000");
    assert_eq!(config.client.chat_path, "/api/chat/");
    assert_eq!(config.client.page_path, "/chat-ui/");
    assert!(config.client.bootstrap);
    assert_eq!(config.client.request_timeout_secs, None);
    assert_eq!(config.csrf.cookie_name, "csrftoken");
    assert_eq!(config.csrf.header_name, "X-CSRFToken");
    assert_eq!(config.csrf.cookie, None);
    assert!(config.widget.mode_flag);
    assert!(!config.widget.bangla_mode);
    assert_eq!(config.widget.detail_path_prefix, "/material-detail/");
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("COURSECHAT_CLIENT__BASE_URL", "http://env.test:9090");
        env::set_var("COURSECHAT_CLIENT__REQUEST_TIMEOUT_SECS", "15");
        env::set_var("COURSECHAT_WIDGET__BANGLA_MODE", "true");
        env::set_var("COURSECHAT_CSRF__COOKIE", "csrftoken=abc");
    }

    let config = AppConfig::load_from_args(["coursechat"]).expect("Failed to load config");
    assert_eq!(config.client.base_url, "http://env.test:9090");
    assert_eq!(config.client.request_timeout_secs, Some(15));
    assert!(config.widget.bangla_mode);
    assert_eq!(config.csrf.cookie.as_deref(), Some("csrftoken=abc"));

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("COURSECHAT_CLIENT__BASE_URL", "http://env.test:9090");
    }

    let config = AppConfig::load_from_args([
        "coursechat",
        "--base-url",
        "http://cli.test:7000",
        "--bangla",
        "--no-bootstrap",
    ])
    .expect("Failed to load config");
    assert_eq!(config.client.base_url, "http://cli.test:7000");
    assert!(config.widget.bangla_mode);
    assert!(!config.client.bootstrap);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("chat.yaml");
    fs::write(
        &file_path,
        r#"
client:
  base_url: "http://file.test:7070"
  chat_path: "/v2/chat/"
widget:
  mode_flag: false
"#,
    )
    .expect("Failed to write temp config");

    // Tell AppConfig to use this file via Env Var (mocking CLI arg indirectly)
    unsafe {
        env::set_var("COURSECHAT_CONFIG", &file_path);
    }

    let config = AppConfig::load_from_args(["coursechat"]).expect("Failed to load config from file");
    assert_eq!(config.client.base_url, "http://file.test:7070");
    assert_eq!(config.client.chat_path, "/v2/chat/");
    assert_eq!(config.client.page_path, "/chat-ui/");
    assert!(!config.widget.mode_flag);

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_fails() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["coursechat", "--config", "does-not-exist.yaml"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_cwd_config_fallback() {
    clear_env_vars();

    let config_content = r#"
client:
  base_url: "http://cwd.test:6060"
    "#;
    fs::write(DEFAULT_CONFIG_FILE, config_content).expect("Failed to write ./coursechat.yaml");

    let base_url = AppConfig::load_from_args(["coursechat"])
        .ok()
        .map(|config| config.client.base_url);

    // Clean up before asserting so a failure does not leave the file behind
    let result = std::panic::catch_unwind(|| {
        assert_eq!(base_url.as_deref(), Some("http://cwd.test:6060"));
    });

    fs::remove_file(DEFAULT_CONFIG_FILE).unwrap();

    if let Err(e) = result {
        std::panic::resume_unwind(e);
    }
}
