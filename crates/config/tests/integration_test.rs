//! Integration tests for configuration loading as the server binary does it.
//!
//! These tests verify end-to-end loader behavior: builder overrides layered
//! on top of the environment, with `.env` loading disabled.

use splunkblaze_config::{AuthStrategy, ConfigError, ConfigLoader, env_var_or_none};
use std::time::Duration;

/// Builder values (CLI flags in the binary) win over the environment.
#[test]
#[serial_test::serial]
fn test_config_loader_cli_overrides_env() {
    temp_env::with_vars(
        [
            ("DOTENV_DISABLED", Some("1")),
            ("SPLUNK_BASE_URL", Some("https://env.example.com:8089")),
            ("BLAZE_PORT", Some("9000")),
            ("SPLUNK_API_TOKEN", None),
        ],
        || {
            let config = ConfigLoader::new()
                .load_dotenv()
                .and_then(|l| l.from_env())
                .expect("env should load")
                .with_base_url("https://cli-override.com:8089".to_string())
                .with_api_token("cli-token".to_string())
                .build()
                .expect("should build with CLI overrides");

            assert_eq!(config.connection.base_url, "https://cli-override.com:8089");
            assert_eq!(config.server.port, 9000);
            assert!(matches!(
                config.auth.strategy,
                AuthStrategy::ApiToken { .. }
            ));
        },
    );
}

#[test]
#[serial_test::serial]
fn test_stream_settings_from_env() {
    temp_env::with_vars(
        [
            ("DOTENV_DISABLED", Some("1")),
            ("BLAZE_MAX_WAIT_SECS", Some("-1")),
            ("BLAZE_POLL_INTERVAL_MS", Some("250")),
            ("BLAZE_BATCH_SIZE", Some("25")),
        ],
        || {
            let config = ConfigLoader::new()
                .from_env()
                .expect("env should load")
                .build()
                .expect("should build");

            assert_eq!(config.stream.max_wait(), None);
            assert_eq!(config.stream.poll_interval, Duration::from_millis(250));
            assert_eq!(config.stream.batch_size, 25);
        },
    );
}

#[test]
#[serial_test::serial]
fn test_invalid_port_is_reported() {
    temp_env::with_vars(
        [("DOTENV_DISABLED", Some("1")), ("BLAZE_PORT", Some("http"))],
        || {
            let result = ConfigLoader::new().from_env();
            assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        },
    );
}

/// `env_var_or_none` treats blank values as unset.
#[test]
#[serial_test::serial]
fn test_env_var_or_none_exported() {
    temp_env::with_var("SPLUNKBLAZE_TEST_BLANK", Some("   "), || {
        assert_eq!(env_var_or_none("SPLUNKBLAZE_TEST_BLANK"), None);
    });
}
