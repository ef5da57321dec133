use marklogic_channel::load_config::{load_config, read_config, ENV_PASSWORD, ENV_USERNAME};
use serial_test::serial;
use std::env;
use std::fs::write;
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), yaml).unwrap();
    config_file
}

fn clear_credential_env() {
    env::remove_var(ENV_USERNAME);
    env::remove_var(ENV_PASSWORD);
}

/// A complete config file loads as-is and fills in the http defaults.
#[test]
#[serial]
fn test_load_config_from_file_only() {
    clear_credential_env();
    let config_file = config_file(
        r#"
channel:
  host: ml.example.com
  port: 8080
  username: admin
  password: admin-pass
"#,
    );

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.channel.host, "ml.example.com");
    assert_eq!(config.channel.port, 8080);
    assert_eq!(config.channel.username.as_deref(), Some("admin"));
    assert_eq!(config.channel.password.as_deref(), Some("admin-pass"));
    assert!(config.channel.supported_media_types.contains("application/xml"));
    assert_eq!(config.http.timeout_secs, 30);
    assert_eq!(config.http.connect_timeout_secs, 10);
}

/// Credentials from the environment override the file.
#[test]
#[serial]
fn test_load_config_env_overrides_credentials() {
    let config_file = config_file(
        r#"
channel:
  host: localhost
  port: 8000
  username: file-user
  supported_media_types:
    - application/dita+xml
http:
  timeout_secs: 5
"#,
    );
    env::set_var(ENV_USERNAME, "env-user");
    env::set_var(ENV_PASSWORD, "env-pass");

    let config = load_config(config_file.path()).expect("Config should load");
    clear_credential_env();

    assert_eq!(config.channel.username.as_deref(), Some("env-user"));
    assert_eq!(config.channel.password.as_deref(), Some("env-pass"));
    assert_eq!(config.channel.supported_media_types.len(), 1);
    assert_eq!(config.http.timeout_secs, 5);
}

/// Missing credentials after the merge are a load error.
#[test]
#[serial]
fn test_load_config_errors_without_password() {
    clear_credential_env();
    let config_file = config_file("channel:\n  host: localhost\n  port: 8000\n  username: admin\n");

    let err = load_config(config_file.path()).unwrap_err();
    assert!(
        err.to_string().contains(ENV_PASSWORD),
        "Expected missing password error, got: {err}"
    );
}

/// Reading without the credential check accepts a file with no credentials at all.
#[test]
#[serial]
fn test_read_config_allows_missing_credentials() {
    clear_credential_env();
    let config_file = config_file("channel:\n  host: localhost\n  port: 8000\n");

    let config = read_config(config_file.path()).expect("Config should read");
    assert!(config.channel.username.is_none());
    assert!(config.channel.password.is_none());
    assert_eq!(config.channel.port, 8000);
}

#[test]
#[serial]
fn test_load_config_errors_for_invalid_file() {
    let config_file = config_file("not-yaml: [:::");

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
#[serial]
fn test_load_config_errors_for_missing_file() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
