//! Common test utilities for HTTP integration tests.
//!
//! # Invariants
//! - Every server binds `127.0.0.1:0`, so tests never collide on ports
//! - Servers are driven by a `ScriptedJobApi`; no remote Splunk is needed

use std::sync::Arc;
use std::time::Duration;

use splunkblaze_server::testing::ScriptedJobApi;
use splunkblaze_server::{AppState, PollSettings, serve};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

#[allow(unused_imports)]
pub use splunkblaze_server::testing::{Call, StatusStep};

/// A running server plus the job API behind it.
pub struct TestServer {
    pub base_url: String,
    pub api: Arc<ScriptedJobApi>,
    _shutdown: oneshot::Sender<()>,
}

impl TestServer {
    /// Load the search form and return the token from its cookie.
    pub async fn xsrf_token(&self, client: &reqwest::Client) -> String {
        let resp = client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .unwrap();
        let cookie = resp.headers()["set-cookie"].to_str().unwrap();
        cookie
            .split(';')
            .next()
            .and_then(|pair| pair.strip_prefix("_xsrf="))
            .unwrap()
            .to_string()
    }

    /// Submit the search form the way a browser would, token included.
    pub async fn submit(&self, client: &reqwest::Client, fields: &[(&str, &str)]) -> reqwest::Response {
        let token = self.xsrf_token(client).await;
        let mut form = fields.to_vec();
        form.push(("_xsrf", token.as_str()));
        client
            .post(format!("{}/search", self.base_url))
            .header("cookie", format!("_xsrf={token}"))
            .form(&form)
            .send()
            .await
            .unwrap()
    }
}

/// Poll settings fast enough for real-time tests.
pub fn fast_settings() -> PollSettings {
    PollSettings {
        max_wait: Some(Duration::from_secs(2)),
        poll_interval: Duration::from_millis(5),
        batch_size: 10,
    }
}

/// Start a server on an ephemeral port. It stops when the `TestServer` drops.
pub async fn spawn_server(api: Arc<ScriptedJobApi>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::new(api.clone(), fast_settings()));
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        serve(listener, state, async {
            let _ = rx.await;
        })
        .await
        .unwrap();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        api,
        _shutdown: tx,
    }
}
