//! Common test utilities for integration tests.
//!
//! # Invariants
//! - Fixtures are loaded from `tests/fixtures/` relative to the crate root
//! - All fixture files must be valid JSON
//!
//! # What this does NOT handle
//! - Mock server setup (use wiremock directly in tests)

use std::time::Duration;

use secrecy::SecretString;

#[allow(unused_imports)]
pub use reqwest::Client;
#[allow(unused_imports)]
pub use splunkblaze_client::{Credential, RetryPolicy, endpoints};
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

/// Load a JSON fixture from `tests/fixtures/<name>`.
#[allow(dead_code)]
pub fn load_fixture(name: &str) -> serde_json::Value {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("invalid JSON in fixture {}: {}", path.display(), e))
}

/// A session-key credential for endpoint calls.
#[allow(dead_code)]
pub fn session_credential() -> Credential {
    Credential::SessionKey(SecretString::new("test-session-key".to_string().into()))
}

/// Retry policy with a small fixed backoff base.
#[allow(dead_code)]
pub fn fast_retry(max_retries: usize) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        backoff: Duration::from_millis(10),
    }
}
