//! # Integration Tests for the Classify Number Server
//!
//! Boots the real server on an ephemeral port, points it at an `httpmock`
//! stand-in for the numbers trivia service, and drives it with `reqwest`.

use classify_number::{
    server::{ClassificationResponse, ErrorBody},
    ClassifierServer, PropertyTag, ServerConfig, FALLBACK_FUN_FACT,
};
use futures::future::join_all;
use httpmock::prelude::*;
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

/// Start a server whose fun facts come from `fact_base_url`; returns its address
async fn spawn_server(fact_base_url: &str, fact_timeout_ms: u64) -> SocketAddr {
    let config = ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        fun_fact_base_url: fact_base_url.to_string(),
        fun_fact_timeout_ms: fact_timeout_ms,
        request_timeout_ms: 5_000,
        enable_metrics: true,
        ..ServerConfig::default()
    };

    let server = ClassifierServer::new(config).expect("valid test config");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.serve(listener));
    addr
}

fn classify_url(addr: SocketAddr, number: &str) -> String {
    format!("http://{addr}/api/classify-number?number={number}")
}

#[tokio::test]
async fn test_classify_armstrong_number_end_to_end() {
    let trivia = MockServer::start_async().await;
    let fact = trivia
        .mock_async(|when, then| {
            when.method(GET).path("/371/math").query_param_exists("json");
            then.status(200).json_body(json!({
                "text": "371 is a narcissistic number.",
                "number": 371,
                "found": true,
                "type": "math"
            }));
        })
        .await;

    let addr = spawn_server(&trivia.base_url(), 2_000).await;
    let response = reqwest::get(classify_url(addr, "371")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let raw = response.text().await.unwrap();
    assert!(raw.contains(
        r#""number":371,"is_prime":false,"is_perfect":false,"properties":["armstrong","odd"],"digit_sum":11"#
    ));

    let body: ClassificationResponse = serde_json::from_str(&raw).unwrap();
    assert_eq!(body.fun_fact, "371 is a narcissistic number.");
    fact.assert_async().await;
}

#[tokio::test]
async fn test_plain_number_requests_trivia_fact() {
    let trivia = MockServer::start_async().await;
    let fact = trivia
        .mock_async(|when, then| {
            when.method(GET).path("/28/trivia");
            then.status(200)
                .json_body(json!({ "text": "28 is the number of days in February." }));
        })
        .await;

    let addr = spawn_server(&trivia.base_url(), 2_000).await;
    let body: ClassificationResponse = reqwest::get(classify_url(addr, "28"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(body.is_perfect);
    assert!(!body.is_prime);
    assert_eq!(body.properties, vec![PropertyTag::Even]);
    assert_eq!(body.digit_sum, 10);
    assert_eq!(body.fun_fact, "28 is the number of days in February.");
    fact.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_negative_number_is_rejected() {
    let trivia = MockServer::start_async().await;
    let any_fact = trivia
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({ "text": "unused" }));
        })
        .await;

    let addr = spawn_server(&trivia.base_url(), 2_000).await;
    let response = reqwest::get(classify_url(addr, "-5")).await.unwrap();
    assert_eq!(response.status(), 400);

    let body: ErrorBody = response.json().await.unwrap();
    assert!(body.error);
    assert_eq!(body.number.as_deref(), Some("-5"));
    assert!(body.message.contains("Negative"));

    // validation failures never reach the trivia service
    any_fact.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_non_integer_tokens_are_rejected() {
    let trivia = MockServer::start_async().await;
    let addr = spawn_server(&trivia.base_url(), 2_000).await;
    let client = reqwest::Client::new();

    for token in ["abc", "", "12.5", "99999999999999999999"] {
        let response = client.get(classify_url(addr, token)).send().await.unwrap();
        assert_eq!(response.status(), 400, "token {token:?}");

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], true, "token {token:?}");
        assert_eq!(body["number"], token, "token {token:?}");
    }

    let response = client
        .get(format!("http://{addr}/api/classify-number"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_unreachable_fact_service_falls_back() {
    // nothing listens on port 1
    let addr = spawn_server("http://127.0.0.1:1", 500).await;
    let response = reqwest::get(classify_url(addr, "17")).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: ClassificationResponse = response.json().await.unwrap();
    assert!(body.is_prime);
    assert_eq!(body.properties, vec![PropertyTag::Odd]);
    assert_eq!(body.fun_fact, FALLBACK_FUN_FACT);
}

#[tokio::test]
async fn test_slow_or_broken_fact_service_falls_back() {
    let trivia = MockServer::start_async().await;
    trivia
        .mock_async(|when, then| {
            when.method(GET).path("/7/math");
            then.status(200)
                .delay(Duration::from_millis(1_500))
                .json_body(json!({ "text": "too slow" }));
        })
        .await;
    trivia
        .mock_async(|when, then| {
            when.method(GET).path("/10/trivia");
            then.status(200).body("<html>not json</html>");
        })
        .await;
    trivia
        .mock_async(|when, then| {
            when.method(GET).path("/12/trivia");
            then.status(200).json_body(json!({ "number": 12, "found": false }));
        })
        .await;

    let addr = spawn_server(&trivia.base_url(), 200).await;

    for number in ["7", "10", "12"] {
        let response = reqwest::get(classify_url(addr, number)).await.unwrap();
        assert_eq!(response.status(), 200, "number {number}");
        let body: ClassificationResponse = response.json().await.unwrap();
        assert_eq!(body.fun_fact, FALLBACK_FUN_FACT, "number {number}");
    }
}

#[tokio::test]
async fn test_top_of_accepted_range_classifies_within_timeout() {
    let trivia = MockServer::start_async().await;
    trivia
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).json_body(json!({ "text": "a big number" }));
        })
        .await;

    let addr = spawn_server(&trivia.base_url(), 2_000).await;
    let client = reqwest::Client::new();

    let started = std::time::Instant::now();
    let response = client
        .get(classify_url(addr, "9223372036854775783"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: ClassificationResponse = response.json().await.unwrap();
    assert_eq!(body.number, 9_223_372_036_854_775_783);
    assert!(body.is_prime);
    assert_eq!(body.fun_fact, "a big number");

    let response = client
        .get(classify_url(addr, "9223372036854775807"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: ClassificationResponse = response.json().await.unwrap();
    assert_eq!(body.number, 9_223_372_036_854_775_807);
    assert!(!body.is_prime);
    assert!(!body.is_perfect);
    assert_eq!(body.properties, vec![PropertyTag::Odd]);

    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_post_body_classification() {
    let trivia = MockServer::start_async().await;
    trivia
        .mock_async(|when, then| {
            when.method(GET).path("/153/math");
            then.status(200).json_body(json!({ "text": "153 is narcissistic." }));
        })
        .await;

    let addr = spawn_server(&trivia.base_url(), 2_000).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{addr}/api/classify-number"))
        .json(&json!({ "numberString": "153" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: ClassificationResponse = response.json().await.unwrap();
    assert_eq!(body.properties, vec![PropertyTag::Armstrong, PropertyTag::Odd]);
    assert_eq!(body.fun_fact, "153 is narcissistic.");

    let response = client
        .post(format!("http://{addr}/api/classify-number"))
        .json(&json!({ "numberString": "-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_repeated_requests_are_idempotent() {
    let trivia = MockServer::start_async().await;
    trivia
        .mock_async(|when, then| {
            when.method(GET).path("/496/trivia");
            then.status(200).json_body(json!({ "text": "496 is perfect." }));
        })
        .await;

    let addr = spawn_server(&trivia.base_url(), 2_000).await;
    let client = reqwest::Client::new();

    let mut seen = Vec::new();
    for _ in 0..3 {
        let body: ClassificationResponse = client
            .get(classify_url(addr, "496"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        seen.push(body);
    }

    assert!(seen.windows(2).all(|pair| pair[0] == pair[1]));
    assert!(seen[0].is_perfect);
}

#[tokio::test]
async fn test_concurrent_requests() {
    let trivia = MockServer::start_async().await;
    trivia
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200)
                .delay(Duration::from_millis(100))
                .json_body(json!({ "text": "a fact" }));
        })
        .await;

    let addr = spawn_server(&trivia.base_url(), 2_000).await;
    let client = reqwest::Client::new();

    let requests = (1..=20u64).map(|n| {
        let client = client.clone();
        async move {
            let body: ClassificationResponse = client
                .get(classify_url(addr, &n.to_string()))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            (n, body)
        }
    });

    let started = std::time::Instant::now();
    let results = join_all(requests).await;
    assert!(started.elapsed() < Duration::from_secs(2));

    for (n, body) in results {
        assert_eq!(body.number, n);
        assert_eq!(body.fun_fact, "a fact");
    }
}

#[tokio::test]
async fn test_metrics_and_health_endpoints() {
    let addr = spawn_server("http://127.0.0.1:1", 200).await;
    let client = reqwest::Client::new();

    client.get(classify_url(addr, "abc")).send().await.unwrap();
    client.get(classify_url(addr, "5")).send().await.unwrap();

    let metrics = client
        .get(format!("http://{addr}/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains("classify_rejected_total 1"));
    assert!(metrics.contains("classify_fun_fact_fallbacks_total 1"));

    let health: serde_json::Value = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["fun_fact"]["fallbacks"], 1);
}
