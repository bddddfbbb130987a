use rivals_common::observability::LogFormat;
use rivals_config::{ConfigError, RivalsConfigLoader};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const FILE_YAML: &str = r#"
server:
  bind: "127.0.0.1:4000"
  request_timeout_secs: 30
  allowed_origins:
    - "https://rivals.test"
provider:
  api_key: "${RIVALS_TEST_EXA_KEY}"
  timeout_secs: 10
mentions:
  domain: "news.ycombinator.com"
logging:
  format: json
  emit_stderr: false
"#;

#[test]
#[serial]
fn loads_file_and_expands_secrets() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "rivals.yaml", FILE_YAML);

    temp_env::with_var("RIVALS_TEST_EXA_KEY", Some("exa-from-env"), || {
        let config = RivalsConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config");

        assert_eq!(config.server.bind, "127.0.0.1:4000");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.server.allowed_origins, vec!["https://rivals.test"]);
        assert_eq!(config.provider.resolve_api_key().unwrap(), "exa-from-env");
        assert_eq!(config.provider.timeout_secs, 10);
        assert_eq!(config.provider.max_retries, 0);
        assert_eq!(config.mentions.domain, "news.ycombinator.com");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.logging.emit_stderr);
    });
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(&tmp, "rivals.yaml", FILE_YAML);

    temp_env::with_vars(
        [
            ("RIVALS__SERVER__BIND", Some("0.0.0.0:9999")),
            ("RIVALS__SERVER__REQUEST_TIMEOUT_SECS", Some("5")),
            ("RIVALS__PROVIDER__MAX_RETRIES", Some("2")),
        ],
        || {
            let config = RivalsConfigLoader::new().with_file(&p).load().unwrap();
            assert_eq!(config.server.bind, "0.0.0.0:9999");
            assert_eq!(config.server.request_timeout_secs, 5);
            assert_eq!(config.provider.max_retries, 2);
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = RivalsConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .unwrap();

    assert_eq!(config.server.bind, "0.0.0.0:3000");
    assert_eq!(config.server.request_timeout_secs, 60);
    assert!(config.server.allowed_origins.is_empty());
    assert_eq!(config.provider.base_url, "https://api.exa.ai");
    assert_eq!(config.mentions.domain, "reddit.com");
    assert_eq!(config.logging.format, LogFormat::Text);
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let err = RivalsConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Source(_)));
}

#[test]
#[serial]
fn zero_timeout_is_rejected() {
    let err = RivalsConfigLoader::new()
        .with_yaml_str("server:\n  request_timeout_secs: 0")
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}
