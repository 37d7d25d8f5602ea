use super::*;
use mockito::Server;
use std::time::Instant;

fn quick_policy() -> RetryPolicy {
    RetryPolicy {
        initial: Duration::from_millis(10),
        max: Duration::from_millis(100),
        multiplier: 2.0,
        max_retries: 5,
    }
}

#[test]
fn test_delay_grows_then_caps() {
    let policy = quick_policy();
    assert_eq!(policy.delay_for(1), Duration::from_millis(10));
    assert_eq!(policy.delay_for(2), Duration::from_millis(20));
    assert_eq!(policy.delay_for(4), Duration::from_millis(80));
    assert_eq!(policy.delay_for(5), Duration::from_millis(100));
    assert_eq!(policy.delay_for(u32::MAX), Duration::from_millis(100));
}

#[test]
fn test_default_policy() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_for(1), Duration::from_secs(1));
    assert_eq!(policy.delay_for(7), Duration::from_secs(60));
    assert_eq!(policy.max_retries, 5);
}

#[tokio::test]
async fn test_success_is_returned_directly() {
    let client = ThrottledClient::new(Client::new(), quick_policy());
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/serde/1.0.0/dependencies")
        .with_status(200)
        .with_body("{\"dependencies\":[]}")
        .expect(1)
        .create_async()
        .await;

    let url = format!("{}/serde/1.0.0/dependencies", server.url());
    let response = client.get(&url).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_throttled_request_is_retried() {
    let client = ThrottledClient::new(Client::new(), quick_policy());
    let mut server = Server::new_async().await;
    let throttled = server
        .mock("GET", "/tokio/versions")
        .with_status(429)
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/tokio/versions")
        .with_status(200)
        .with_body("ok")
        .expect(1)
        .create_async()
        .await;

    let start = Instant::now();
    let response = client.get(&format!("{}/tokio/versions", server.url())).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(10));
    assert_eq!(response.text().await.unwrap(), "ok");
    throttled.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_gives_up_after_max_retries() {
    let policy = RetryPolicy {
        initial: Duration::from_millis(2),
        max: Duration::from_millis(5),
        max_retries: 3,
        ..quick_policy()
    };
    let client = ThrottledClient::new(Client::new(), policy);
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/busy")
        .with_status(429)
        .expect(4)
        .create_async()
        .await;

    match client.get(&format!("{}/busy", server.url())).await {
        Err(NetworkingError::RateLimitError { message }) => {
            assert!(message.contains("after 3 retries"));
        }
        other => panic!("expected RateLimitError, got {:?}", other.map(|r| r.status())),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_retry_after_header_overrides_backoff() {
    let policy = RetryPolicy {
        initial: Duration::from_secs(30),
        max: Duration::from_secs(60),
        ..quick_policy()
    };
    let client = ThrottledClient::new(Client::new(), policy);
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/log")
        .with_status(429)
        .with_header("retry-after", "0")
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/log")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let start = Instant::now();
    let response = client.get(&format!("{}/log", server.url())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_concurrent_throttling_does_not_compound_waits() {
    // A shared wait would grow 50ms -> 500ms -> 5s across these requests.
    let policy = RetryPolicy {
        initial: Duration::from_millis(50),
        max: Duration::from_secs(10),
        multiplier: 10.0,
        max_retries: 5,
    };
    let client = ThrottledClient::new(Client::new(), policy);
    let mut server = Server::new_async().await;

    let mut mocks = Vec::new();
    for name in ["a", "b", "c"] {
        let path = format!("/{}/1.0.0/dependencies", name);
        mocks.push(
            server
                .mock("GET", path.as_str())
                .with_status(429)
                .expect(1)
                .create_async()
                .await,
        );
        mocks.push(
            server
                .mock("GET", path.as_str())
                .with_status(200)
                .expect(1)
                .create_async()
                .await,
        );
    }

    let start = Instant::now();
    let requests = ["a", "b", "c"].map(|name| {
        let client = client.clone();
        let url = format!("{}/{}/1.0.0/dependencies", server.url(), name);
        tokio::spawn(async move { client.get(&url).await })
    });
    for request in requests {
        let response = request.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_millis(450), "waits compounded: {:?}", elapsed);
    for mock in mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_other_statuses_are_not_retried() {
    let client = ThrottledClient::new(Client::new(), quick_policy());
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/missing")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let response = client.get(&format!("{}/missing", server.url())).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    mock.assert_async().await;
}
