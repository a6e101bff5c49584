//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single fallback handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Buffer request bodies up to the configured limit
//! - Run each dispatch cycle on the blocking pool
//! - Map dispatch errors to status codes and bodies
//! - Bind server to listener with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    response::IntoResponse,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::app::Pion;
use crate::config::{Environment, PionConfig};
use crate::error::DispatchError;
use crate::http::request::{RequestContext, UuidRequestId};
use crate::http::response::Response;
use crate::lifecycle::Shutdown;

const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Pion>,
    pub max_body_bytes: usize,
    pub environment: Environment,
}

/// HTTP front end for a [`Pion`] application.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(app: Arc<Pion>, config: &PionConfig) -> Self {
        let state = AppState {
            app,
            max_body_bytes: config.listener.max_body_bytes,
            environment: config.app.environment,
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &PionConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The configured router, for embedding or `oneshot` tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` is triggered.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let rx = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(Shutdown::wait(rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Every request lands here; routing happens inside the dispatch cycle.
async fn dispatch_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> axum::response::Response {
    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(
                error = %e,
                limit = state.max_body_bytes,
                path = %parts.uri.path(),
                "Rejected request body"
            );
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let context = RequestContext::from_parts(&parts, &bytes);
    let app = state.app.clone();
    match tokio::task::spawn_blocking(move || app.run_once(context)).await {
        Ok(Ok(response)) => into_http(response),
        Ok(Err(err)) => error_response(&err, state.environment),
        Err(e) => {
            tracing::error!(error = %e, "Dispatch task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

fn into_http(response: Response) -> axum::response::Response {
    let (status, headers, body) = response.into_parts();
    let mut out = axum::response::Response::new(Body::from(body));
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    out.headers_mut()
        .entry(header::CONTENT_TYPE)
        .or_insert(HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    out
}

/// Development shows the error message; production only the reason phrase.
fn error_response(err: &DispatchError, environment: Environment) -> axum::response::Response {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(error = %err, status = status.as_u16(), "Dispatch failed");
    } else {
        tracing::debug!(error = %err, status = status.as_u16(), "Dispatch failed");
    }

    let body = match environment {
        Environment::Development => err.to_string(),
        Environment::Production => status.canonical_reason().unwrap_or("Error").to_string(),
    };
    (status, body).into_response()
}
