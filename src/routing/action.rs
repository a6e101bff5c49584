//! Actions bound to routes.
//!
//! An action is either a closure invoked with the cycle context, or a
//! reference to a registered controller (`"Name"` or `"Name:method"`).

use std::fmt;
use std::sync::Arc;

use crate::dispatch::Cycle;
use crate::error::DispatchError;
use crate::http::ResponsePayload;

/// What an action hands back. `None` means the action already produced its
/// response (or had nothing to render).
pub type ActionResult = Result<Option<ResponsePayload>, DispatchError>;

/// Signature of closure actions.
pub type ClosureFn = dyn Fn(&mut Cycle<'_>) -> ActionResult + Send + Sync;

/// The unit of work bound to a route. Immutable once registered.
#[derive(Clone)]
pub enum Action {
    Closure(Arc<ClosureFn>),
    Controller(ControllerRef),
}

impl Action {
    /// Wrap a closure as an action.
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&mut Cycle<'_>) -> ActionResult + Send + Sync + 'static,
    {
        Action::Closure(Arc::new(f))
    }

    /// Parse a controller reference.
    pub fn controller(spec: &str) -> Self {
        Action::Controller(ControllerRef::parse(spec))
    }

    /// Short label for logs and metrics.
    pub fn describe(&self) -> String {
        match self {
            Action::Closure(_) => "closure".to_string(),
            Action::Controller(r) => r.to_string(),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Closure(_) => f.write_str("Closure(..)"),
            Action::Controller(r) => f.debug_tuple("Controller").field(r).finish(),
        }
    }
}

impl From<&str> for Action {
    fn from(spec: &str) -> Self {
        Action::controller(spec)
    }
}

impl From<String> for Action {
    fn from(spec: String) -> Self {
        Action::controller(&spec)
    }
}

impl From<ControllerRef> for Action {
    fn from(r: ControllerRef) -> Self {
        Action::Controller(r)
    }
}

/// A controller name with an optional explicit method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerRef {
    pub name: String,
    pub method: Option<String>,
}

impl ControllerRef {
    /// Parse `"Name"` or `"Name:method"`. An empty method part counts as none.
    pub fn parse(spec: &str) -> Self {
        match spec.split_once(':') {
            Some((name, method)) if !method.trim().is_empty() => Self {
                name: name.trim().to_string(),
                method: Some(method.trim().to_string()),
            },
            Some((name, _)) => Self {
                name: name.trim().to_string(),
                method: None,
            },
            None => Self {
                name: spec.trim().to_string(),
                method: None,
            },
        }
    }
}

impl fmt::Display for ControllerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{}:{}", self.name, method),
            None => f.write_str(&self.name),
        }
    }
}
