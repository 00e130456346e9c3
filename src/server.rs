//! HTTP server exposing the pipeline parse endpoint.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    Form, Json, Router,
    http::{HeaderName, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, CorsConfig},
    graph,
    types::{ErrorResponse, HealthResponse, PipelineSpec},
};

/// Parse server handle.
pub struct ParseServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl ParseServer {
    /// Bind the listener and start serving in a background task.
    ///
    /// Binding port 0 picks an ephemeral port; `addr()` reports the
    /// actual one.
    pub async fn start(config: Config) -> Result<Self> {
        let listener = TcpListener::bind(config.addr)
            .await
            .with_context(|| format!("failed to bind parse listener on {}", config.addr))?;
        let actual_addr = listener.local_addr()?;

        let cors = cors_layer(&config.cors)?;
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        tokio::spawn(run_server(listener, cors, shutdown_rx));

        info!(addr = %actual_addr, "parse server started");

        Ok(Self {
            addr: actual_addr,
            shutdown_tx,
        })
    }

    /// Get the address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shutdown the server.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

async fn run_server(
    listener: TcpListener,
    cors: CorsLayer,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) {
    let app = build_router(cors);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .ok();
}

fn build_router(cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/pipelines/parse", post(parse_pipeline))
        .layer(cors)
}

/// Build the CORS layer from the configured allow-lists.
///
/// Credentials stay enabled for the browser frontend, which rules out
/// the wildcard header forms; `*` entries mirror the request instead.
fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid allowed origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    let methods = if CorsConfig::mirrors_any(&config.allowed_methods) {
        AllowMethods::mirror_request()
    } else {
        let methods = config
            .allowed_methods
            .iter()
            .map(|method| {
                method
                    .parse::<Method>()
                    .with_context(|| format!("invalid allowed method '{method}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowMethods::list(methods)
    };

    let headers = if CorsConfig::mirrors_any(&config.allowed_headers) {
        AllowHeaders::mirror_request()
    } else {
        let headers = config
            .allowed_headers
            .iter()
            .map(|header| {
                header
                    .parse::<HeaderName>()
                    .with_context(|| format!("invalid allowed header '{header}'"))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowHeaders::list(headers)
    };

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(true))
}

/// Form body for `POST /pipelines/parse`.
#[derive(Debug, Deserialize)]
struct ParsePipelineForm {
    /// JSON-encoded pipeline description
    pipeline: String,
}

/// The two failure kinds the endpoint distinguishes.
#[derive(Debug, thiserror::Error)]
enum ParseFailure {
    /// The `pipeline` field is not valid JSON.
    #[error("Invalid JSON format")]
    InvalidJson,
    /// Valid JSON with the wrong shape, e.g. a node missing its id.
    #[error("{0}")]
    InvalidShape(String),
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::pong())
}

/// Decode the `pipeline` form field and report structural metrics.
///
/// Failures come back as `{"error": ...}` with HTTP 200; callers of
/// this endpoint expect a uniform response shape rather than
/// status-code precision.
async fn parse_pipeline(Form(form): Form<ParsePipelineForm>) -> Response {
    match decode_pipeline(&form.pipeline) {
        Ok(spec) => {
            let metrics = graph::analyze(&spec.nodes, &spec.edges);
            debug!(
                num_nodes = metrics.num_nodes,
                num_edges = metrics.num_edges,
                is_dag = metrics.is_dag,
                "pipeline parsed"
            );
            Json(metrics).into_response()
        }
        Err(failure) => {
            warn!(%failure, "pipeline parse failed");
            Json(ErrorResponse {
                error: failure.to_string(),
            })
            .into_response()
        }
    }
}

/// Decode the payload in two stages so syntax errors and shape errors
/// surface as distinct failure kinds.
fn decode_pipeline(raw: &str) -> Result<PipelineSpec, ParseFailure> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|_| ParseFailure::InvalidJson)?;
    serde_json::from_value(value).map_err(|err| ParseFailure::InvalidShape(err.to_string()))
}
