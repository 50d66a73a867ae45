//! HTTP Client Adapter against a local mock upstream

use std::time::{Duration, Instant};

use company_intel::http::{HttpClient, HttpRequest, ReqwestClient};
use company_intel::FetchError;
use httpmock::prelude::*;

fn client() -> ReqwestClient {
    ReqwestClient::new("company-intel-tests/1.0").unwrap()
}

#[tokio::test]
async fn test_timeout_is_enforced() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_secs(3)).body("late");
        })
        .await;

    let started = Instant::now();
    let err = client()
        .send(HttpRequest::get(server.url("/slow")).timeout(Duration::from_millis(200)))
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
    match err {
        FetchError::Timeout { timeout_ms, .. } => assert_eq!(timeout_ms, 200),
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_non_success_status_is_returned() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("nope");
        })
        .await;

    let response = client()
        .send(HttpRequest::get(server.url("/missing")))
        .await
        .unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.body, "nope");
    assert!(!response.is_ok());
}

#[tokio::test]
async fn test_form_query_and_headers_are_sent() {
    let server = MockServer::start_async().await;
    let form = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/search")
                .header("origin", "https://registry.test")
                .header("user-agent", "company-intel-tests/1.0")
                .form_urlencoded_tuple("c", "search")
                .form_urlencoded_tuple("s_legal_person_name", "");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<p>შედეგი</p>");
        })
        .await;
    let query = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/detail")
                .query_param("legal_code_id", "778899")
                .query_param("enteredCaptcha", "1");
            then.status(200).body("ok");
        })
        .await;

    let http = client();
    let response = http
        .send(
            HttpRequest::post_form(
                server.url("/search"),
                [("c", "search"), ("s_legal_person_name", "")],
            )
            .header("Origin", "https://registry.test")
            .header("User-Agent", "company-intel-tests/1.0"),
        )
        .await
        .unwrap();
    assert_eq!(response.body, "<p>შედეგი</p>");

    http.send(
        HttpRequest::get(server.url("/detail"))
            .query("legal_code_id", "778899")
            .query("enteredCaptcha", "1"),
    )
    .await
    .unwrap();

    form.assert_async().await;
    query.assert_async().await;
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop a listener to get a port nothing listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = client()
        .send(HttpRequest::get(format!("http://127.0.0.1:{port}/")).timeout(Duration::from_secs(2)))
        .await
        .unwrap_err();
    assert!(!err.is_timeout());
    assert!(err.url().starts_with("http://127.0.0.1"));
}

#[tokio::test]
async fn test_invalid_url() {
    let err = client()
        .send(HttpRequest::get("not a url"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl { .. }));
}
