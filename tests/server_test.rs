//! End-to-end tests for the parse endpoint.
//!
//! Boots the real server on an ephemeral port and exercises the wire
//! contract over HTTP.

use anyhow::Result;
use serde_json::{Value, json};

use cairn::{Config, CorsConfig, ParseServer};

async fn start_server() -> Result<(ParseServer, String)> {
    let config = Config {
        addr: "127.0.0.1:0".parse()?,
        cors: CorsConfig::default(),
    };
    let server = ParseServer::start(config).await?;
    let base = format!("http://{}", server.addr());
    Ok((server, base))
}

async fn post_pipeline(base: &str, pipeline: &str) -> Result<Value> {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{base}/pipelines/parse"))
        .form(&[("pipeline", pipeline)])
        .send()
        .await?;
    // Errors included: the endpoint always answers 200.
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    Ok(response.json().await?)
}

#[tokio::test]
async fn parse_reports_metrics_for_acyclic_pipeline() -> Result<()> {
    let (server, base) = start_server().await?;

    let pipeline = json!({
        "nodes": [{"id": "a"}, {"id": "b"}, {"id": "c"}],
        "edges": [
            {"source": "a", "target": "b"},
            {"source": "b", "target": "c"}
        ]
    });
    let body = post_pipeline(&base, &pipeline.to_string()).await?;
    assert_eq!(
        body,
        json!({"num_nodes": 3, "num_edges": 2, "is_dag": true})
    );

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn parse_flags_cyclic_pipeline() -> Result<()> {
    let (server, base) = start_server().await?;

    let pipeline = json!({
        "nodes": [{"id": "a"}, {"id": "b"}, {"id": "c"}],
        "edges": [
            {"source": "a", "target": "b"},
            {"source": "b", "target": "c"},
            {"source": "c", "target": "a"}
        ]
    });
    let body = post_pipeline(&base, &pipeline.to_string()).await?;
    assert_eq!(
        body,
        json!({"num_nodes": 3, "num_edges": 3, "is_dag": false})
    );

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn parse_counts_dangling_edges_without_breaking_the_verdict() -> Result<()> {
    let (server, base) = start_server().await?;

    let pipeline = json!({
        "nodes": [{"id": "a"}, {"id": "b"}],
        "edges": [
            {"source": "a", "target": "b"},
            {"source": "b", "target": "x"}
        ]
    });
    let body = post_pipeline(&base, &pipeline.to_string()).await?;
    assert_eq!(
        body,
        json!({"num_nodes": 2, "num_edges": 2, "is_dag": true})
    );

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn parse_counts_duplicate_node_ids_raw() -> Result<()> {
    let (server, base) = start_server().await?;

    let pipeline = json!({
        "nodes": [{"id": "a"}, {"id": "a"}, {"id": "b"}],
        "edges": [{"source": "a", "target": "b"}]
    });
    let body = post_pipeline(&base, &pipeline.to_string()).await?;
    assert_eq!(
        body,
        json!({"num_nodes": 3, "num_edges": 1, "is_dag": true})
    );

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn parse_rejects_invalid_json() -> Result<()> {
    let (server, base) = start_server().await?;

    let body = post_pipeline(&base, "not json").await?;
    assert_eq!(body, json!({"error": "Invalid JSON format"}));

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn parse_reports_shape_errors() -> Result<()> {
    let (server, base) = start_server().await?;

    // Valid JSON, but the edge record is missing its target.
    let pipeline = json!({
        "nodes": [{"id": "a"}],
        "edges": [{"source": "a"}]
    });
    let body = post_pipeline(&base, &pipeline.to_string()).await?;
    let error = body
        .get("error")
        .and_then(Value::as_str)
        .expect("error payload");
    assert_ne!(error, "Invalid JSON format");

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn parse_handles_empty_pipeline() -> Result<()> {
    let (server, base) = start_server().await?;

    let body = post_pipeline(&base, "{}").await?;
    assert_eq!(
        body,
        json!({"num_nodes": 0, "num_edges": 0, "is_dag": true})
    );

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn health_probe_returns_fixed_payload() -> Result<()> {
    let (server, base) = start_server().await?;

    let response = reqwest::get(&base).await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({"Ping": "Pong"}));

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn preflight_allows_configured_origin() -> Result<()> {
    let (server, base) = start_server().await?;

    let client = reqwest::Client::new();
    let response = client
        .request(
            reqwest::Method::OPTIONS,
            format!("{base}/pipelines/parse"),
        )
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await?;
    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert_eq!(allow_origin, "http://localhost:3000");

    server.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn preflight_ignores_unlisted_origin() -> Result<()> {
    let (server, base) = start_server().await?;

    let client = reqwest::Client::new();
    let response = client
        .request(
            reqwest::Method::OPTIONS,
            format!("{base}/pipelines/parse"),
        )
        .header("Origin", "http://unlisted.example")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await?;
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );

    server.shutdown().await;
    Ok(())
}
