//! Route table and lookup.
//!
//! # Responsibilities
//! - Store routes per HTTP method in registration order
//! - Hold the designated not-found action and the base URI
//! - Look up the first route whose pattern matches the request path
//!
//! # Design Decisions
//! - Built once at startup, read-only afterwards (shared without locks)
//! - First registered wins; no longest-match heuristics
//! - Explicit NoMatch rather than silent default

use std::collections::HashMap;

use crate::error::DispatchError;
use crate::routing::action::Action;
use crate::routing::matcher::{PathArgs, RoutePattern};
use crate::routing::method::HttpMethod;

/// A registered pattern → action binding.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: HttpMethod,
    pub pattern: RoutePattern,
    pub action: Action,
}

/// Outcome of a lookup.
#[derive(Debug)]
pub enum RouteMatch<'a> {
    Matched { route: &'a Route, args: PathArgs },
    NoMatch,
}

/// Ordered per-method routes plus the not-found action.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    base_uri: String,
    routes: HashMap<HttpMethod, Vec<Route>>,
    not_found: Option<Action>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Set the prefix prepended to every pattern. Compiled patterns are reset.
    pub fn set_base_uri(&mut self, base_uri: impl Into<String>) {
        self.base_uri = base_uri.into();
        for route in self.routes.values_mut().flatten() {
            route.pattern.reset();
        }
    }

    /// Append a route to the method's list.
    pub fn add(&mut self, method: HttpMethod, pattern: impl Into<String>, action: Action) {
        self.routes.entry(method).or_default().push(Route {
            method,
            pattern: RoutePattern::new(pattern),
            action,
        });
    }

    pub fn set_not_found(&mut self, action: Action) {
        self.not_found = Some(action);
    }

    pub fn not_found(&self) -> Option<&Action> {
        self.not_found.as_ref()
    }

    /// Routes for a method in evaluation order.
    pub fn routes_for(&self, method: HttpMethod) -> &[Route] {
        self.routes.get(&method).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All routes, grouped by method in `HttpMethod::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        HttpMethod::ALL
            .into_iter()
            .flat_map(move |m| self.routes_for(m).iter())
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the first route for `method` whose pattern matches `path`.
    ///
    /// Methods outside GET/POST/PUT/DELETE never match.
    pub fn match_route(&self, method: &str, path: &str) -> Result<RouteMatch<'_>, DispatchError> {
        let Ok(method) = method.parse::<HttpMethod>() else {
            return Ok(RouteMatch::NoMatch);
        };

        for route in self.routes_for(method) {
            if let Some(args) = route.pattern.captures(&self.base_uri, path)? {
                tracing::debug!(
                    method = %method,
                    path = %path,
                    pattern = %route.pattern.as_str(),
                    action = %route.action.describe(),
                    "Route matched"
                );
                return Ok(RouteMatch::Matched { route, args });
            }
        }

        Ok(RouteMatch::NoMatch)
    }
}
