//! Dispatch error taxonomy.
//!
//! Every variant is fatal to the current dispatch cycle and never to the
//! process. The transport adapter decides the final status code and body.

use std::path::PathBuf;

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while matching, resolving, rendering or emitting.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A route pattern failed to compile. Surfaced at first use.
    #[error("Malformed route pattern '{pattern}': {source}")]
    MalformedRoute {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// No registered pattern matched the request.
    #[error("No route matches {method} {path}")]
    RouteNotFound { method: String, path: String },

    /// A controller reference names no registered controller.
    #[error("Action '{0}' is not a defined closure or controller")]
    UnknownController(String),

    /// The controller lacks the explicit or inferred method.
    #[error("Controller '{controller}' does not support method {}", .attempted.join(" or "))]
    MethodNotSupported {
        controller: String,
        attempted: Vec<String>,
    },

    /// No template resource exists for any candidate and extension.
    #[error("View '{view}' was not found (searched {})", display_paths(.searched))]
    ViewNotFound { view: String, searched: Vec<PathBuf> },

    /// A located template could not be read.
    #[error("Failed to read template '{}': {source}", .path.display())]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A located template failed to render.
    #[error("Failed to render template '{}': {source}", .path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// A second response was attempted within one cycle.
    #[error("Response already sent for this request")]
    ResponseAlreadySent,
}

impl DispatchError {
    /// Status code a transport should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True when the action could not be resolved to something callable.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            DispatchError::UnknownController(_) | DispatchError::MethodNotSupported { .. }
        )
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
