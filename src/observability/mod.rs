//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch cycle produces:
//!     → logging.rs (structured log events, one span per cycle)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID is recorded on the dispatch span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
