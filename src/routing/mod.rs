//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (per-method ordered lookup)
//!     → matcher.rs (anchored pattern, capture extraction)
//!     → Return: matched Route + PathArgs, or NoMatch
//!
//! Route Registration (at startup):
//!     add(method, pattern, action)
//!     → appended to the method's list
//!     → pattern compiled on first match attempt
//! ```
//!
//! # Design Decisions
//! - Route table built at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod action;
pub mod matcher;
pub mod method;
pub mod router;

pub use action::{Action, ActionResult, ControllerRef};
pub use matcher::{PathArgs, RoutePattern};
pub use method::HttpMethod;
pub use router::{Route, RouteMatch, RouteTable};
