//! HTTP fetcher tests against a local mock server

use skein::crawler::{FetchError, Fetcher, HttpFetcher};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(timeout: Duration) -> HttpFetcher {
    HttpFetcher::new("SkeinTest/0.1", timeout).unwrap()
}

#[tokio::test]
async fn test_fetch_success_returns_body_and_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listing"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                "<html><title>Listings</title></html>",
                "text/html; charset=utf-8",
            ),
        )
        .mount(&server)
        .await;

    let url = format!("{}/listing", server.uri());
    let content = fetcher(Duration::from_secs(5)).fetch(&url).await.unwrap();

    assert_eq!(content.status, 200);
    assert_eq!(content.final_url, url);
    assert!(content.body.contains("Listings"));
    assert_eq!(
        content.content_type.as_deref(),
        Some("text/html; charset=utf-8")
    );
}

#[tokio::test]
async fn test_fetch_404_is_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/gone", server.uri()))
        .await;

    assert!(matches!(result, Err(FetchError::HttpStatus(404))));
}

#[tokio::test]
async fn test_fetch_500_is_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/broken", server.uri()))
        .await;

    assert!(matches!(result, Err(FetchError::HttpStatus(500))));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let result = fetcher(Duration::from_millis(200))
        .fetch(&format!("{}/slow", server.uri()))
        .await;

    assert!(matches!(result, Err(FetchError::Timeout)));
}

#[tokio::test]
async fn test_redirect_is_followed_and_final_url_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "/new"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
        .mount(&server)
        .await;

    let content = fetcher(Duration::from_secs(5))
        .fetch(&format!("{}/old", server.uri()))
        .await
        .unwrap();

    assert_eq!(content.final_url, format!("{}/new", server.uri()));
    assert_eq!(content.body, "moved here");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Port 1 is never listening.
    let result = fetcher(Duration::from_secs(2))
        .fetch("http://127.0.0.1:1/")
        .await;

    assert!(matches!(result, Err(FetchError::Transport(_))));
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    use wiremock::matchers::header;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "SkeinTest/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let content = fetcher(Duration::from_secs(5))
        .fetch(&server.uri())
        .await
        .unwrap();
    assert_eq!(content.body, "ok");
}
