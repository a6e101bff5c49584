//! Action dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! matched Action + PathArgs
//!     → resolver.rs (closure, or registry lookup + construction)
//!     → crud.rs (method inference when none is explicit)
//!     → controller.rs (capability check, invocation)
//!     → cycle.rs (accessors, view data, response guard)
//!     → Return: Option<ResponsePayload>
//! ```

pub mod controller;
pub mod crud;
pub mod cycle;
pub mod resolver;

pub use controller::{Controller, ControllerInit, ControllerMethod, ControllerRegistry};
pub use cycle::Cycle;
pub use resolver::{Dispatcher, ResolvedController};
