//! Search job endpoint tests.
//!
//! This module tests the job lifecycle calls against a mock Splunk server:
//! - Creating jobs with both response shapes
//! - Status parsing, including failed jobs
//! - Event range fetching and its pass-through options
//! - Job control
//!
//! # What this does NOT handle
//! - Retry behavior (see retry_tests.rs)
//! - Login (see client_tests.rs)

mod common;

use common::*;
use splunkblaze_client::{ClientError, DispatchOptions, FetchOptions};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};

#[tokio::test]
async fn test_create_job_entry_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/search/jobs"))
        .and(header("Authorization", "Splunk test-session-key"))
        .and(body_string_contains("exec_mode=normal"))
        .and(body_string_contains("output_mode=json"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(load_fixture("jobs/create_job_entry.json")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let sid = endpoints::create_job(
        &Client::new(),
        &mock_server.uri(),
        &session_credential(),
        "search index=main",
        &DispatchOptions::default(),
        RetryPolicy::none(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(sid, "1705332600.17");
}

#[tokio::test]
async fn test_create_job_sid_only_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/search/jobs"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(load_fixture("jobs/create_job_sid_only.json")),
        )
        .mount(&mock_server)
        .await;

    let sid = endpoints::create_job(
        &Client::new(),
        &mock_server.uri(),
        &session_credential(),
        "search index=main",
        &DispatchOptions::default(),
        RetryPolicy::none(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(sid, "1705332600.18");
}

#[tokio::test]
async fn test_create_job_skips_blank_time_bounds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/search/jobs"))
        .and(body_string_contains("earliest_time=-24h"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(load_fixture("jobs/create_job_sid_only.json")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = DispatchOptions {
        earliest_time: Some("-24h".to_string()),
        latest_time: Some("   ".to_string()),
        ..Default::default()
    };
    let result = endpoints::create_job(
        &Client::new(),
        &mock_server.uri(),
        &session_credential(),
        "search index=main",
        &options,
        RetryPolicy::none(),
        None,
    )
    .await;

    assert!(result.is_ok());
    let requests = mock_server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("latest_time"));
}

#[tokio::test]
async fn test_create_job_bad_request_is_query_syntax() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/search/jobs"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "messages": [{ "type": "FATAL", "text": "Error in 'search' command: Unable to parse the search." }]
        })))
        .mount(&mock_server)
        .await;

    let err = endpoints::create_job(
        &Client::new(),
        &mock_server.uri(),
        &session_credential(),
        "search index=main (",
        &DispatchOptions::default(),
        RetryPolicy::none(),
        None,
    )
    .await
    .unwrap_err();

    match err {
        ClientError::QuerySyntax(msg) => assert!(msg.contains("Unable to parse the search")),
        other => panic!("expected QuerySyntax, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_job_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/search/jobs"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "messages": [{ "type": "WARN", "text": "call not properly authenticated" }]
        })))
        .mount(&mock_server)
        .await;

    let err = endpoints::create_job(
        &Client::new(),
        &mock_server.uri(),
        &session_credential(),
        "search index=main",
        &DispatchOptions::default(),
        RetryPolicy::none(),
        None,
    )
    .await
    .unwrap_err();

    assert!(err.is_auth_error());
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_get_job_status_running() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/search/jobs/1705332600.17"))
        .and(query_param("output_mode", "json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(load_fixture("jobs/job_status_running.json")),
        )
        .mount(&mock_server)
        .await;

    let status = endpoints::get_job_status(
        &Client::new(),
        &mock_server.uri(),
        &session_credential(),
        "1705332600.17",
        RetryPolicy::none(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(status.sid, "1705332600.17");
    assert!(!status.is_done);
    assert_eq!(status.event_count, 15);
    assert_eq!(status.dispatch_state, "RUNNING");
    assert!(!status.is_remote_failure());
}

#[tokio::test]
async fn test_get_job_status_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/search/jobs/1705332600.19"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(load_fixture("jobs/job_status_failed.json")),
        )
        .mount(&mock_server)
        .await;

    let status = endpoints::get_job_status(
        &Client::new(),
        &mock_server.uri(),
        &session_credential(),
        "1705332600.19",
        RetryPolicy::none(),
        None,
    )
    .await
    .unwrap();

    assert!(status.is_remote_failure());
    assert_eq!(
        status.error_messages(),
        vec!["Unknown search command 'frobnicate'."]
    );
}

#[tokio::test]
async fn test_get_job_status_expired_job_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/search/jobs/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = endpoints::get_job_status(
        &Client::new(),
        &mock_server.uri(),
        &session_credential(),
        "gone",
        RetryPolicy::none(),
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn test_get_events_passes_range_and_fetch_options() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/search/jobs/1705332600.17/events"))
        .and(query_param("output_mode", "json"))
        .and(query_param("offset", "10"))
        .and(query_param("count", "3"))
        .and(query_param("segmentation", "full"))
        .and(query_param("max_lines", "500"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(load_fixture("jobs/events_page.json")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let events = endpoints::get_events(
        &Client::new(),
        &mock_server.uri(),
        &session_credential(),
        "1705332600.17",
        10,
        3,
        &FetchOptions::default(),
        RetryPolicy::none(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(events.len(), 3);
    assert!(events[1].raw.contains("GET /b"));
    assert_eq!(events[0].field("host"), Some("web-01"));
}

#[tokio::test]
async fn test_get_events_empty_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/search/jobs/s1/events"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&mock_server)
        .await;

    let events = endpoints::get_events(
        &Client::new(),
        &mock_server.uri(),
        &session_credential(),
        "s1",
        0,
        10,
        &FetchOptions::default(),
        RetryPolicy::none(),
        None,
    )
    .await
    .unwrap();

    assert!(events.is_empty());
}

#[tokio::test]
async fn test_sid_is_path_encoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/search/jobs/a%2Fb/control"))
        .and(body_string_contains("action=cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = endpoints::control_job(
        &Client::new(),
        &mock_server.uri(),
        &session_credential(),
        "a/b",
        endpoints::JobAction::Cancel,
        RetryPolicy::none(),
        None,
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_control_job_pause() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/search/jobs/1705332600.17/control"))
        .and(body_string_contains("action=pause"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "messages": [{ "type": "INFO", "text": "Search job paused." }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = endpoints::control_job(
        &Client::new(),
        &mock_server.uri(),
        &session_credential(),
        "1705332600.17",
        endpoints::JobAction::Pause,
        RetryPolicy::none(),
        None,
    )
    .await;

    assert!(result.is_ok());
}
