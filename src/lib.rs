//! Pion request-dispatch core.
//!
//! ```text
//!   request (method, path, Accept, body)
//!       │
//!       ▼
//!   ┌──────────┐   ┌────────────┐   ┌────────────┐   ┌──────────────┐
//!   │ routing  │──▶│  dispatch  │──▶│    view    │──▶│ http::guard  │──▶ one response
//!   │  table   │   │ CRUD infer │   │ negotiate  │   │ sent-once    │
//!   └──────────┘   └────────────┘   └────────────┘   └──────────────┘
//! ```
//!
//! Cross-cutting: `config` (TOML), `observability` (tracing, metrics),
//! `lifecycle` (graceful shutdown), `http::server` (axum adapter).

pub mod app;
pub mod config;
pub mod demo;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod view;

pub use app::Pion;
pub use config::PionConfig;
pub use dispatch::{Controller, ControllerInit, ControllerMethod, ControllerRegistry, Cycle};
pub use error::DispatchError;
pub use http::{HttpServer, RequestContext, Response, ResponsePayload};
pub use lifecycle::Shutdown;
pub use routing::{Action, ActionResult, HttpMethod};
pub use view::{ViewData, ViewResolver};
