//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, body limit)
//!     → request.rs (RequestContext: query, form body, headers)
//!     → Pion::run_once (dispatch cycle on the blocking pool)
//!     → guard.rs (exactly one response per cycle)
//!     → response.rs (status, headers, body)
//!     → Send to client
//! ```

pub mod guard;
pub mod request;
pub mod response;
pub mod server;

pub use guard::{GuardState, ResponseGuard};
pub use request::{RequestContext, UuidRequestId, X_REQUEST_ID};
pub use response::{Response, ResponsePayload};
pub use server::HttpServer;
