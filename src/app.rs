//! Application entry point: route registration and the dispatch cycle.
//!
//! # Cycle
//! ```text
//! RequestContext
//!     → negotiate Accept preferences
//!     → RouteTable::match_route
//!         Matched  → Dispatcher::dispatch(action) → Cycle::complete
//!         NoMatch  → not-found action (full resolution) or bare 404
//!     → Response (exactly one)
//! ```
//!
//! # Design Decisions
//! - Everything here is read-only after startup; `run_once` takes `&self`
//! - All per-request state lives in the `Cycle`
//! - A not-found controller that cannot be resolved degrades to a bare 404;
//!   errors raised while the not-found action runs propagate

use std::path::PathBuf;
use std::time::Instant;

use axum::http::StatusCode;

use crate::config::PionConfig;
use crate::dispatch::{Controller, ControllerInit, ControllerRegistry, Cycle, Dispatcher};
use crate::error::DispatchError;
use crate::http::{RequestContext, Response};
use crate::observability::metrics;
use crate::routing::{Action, HttpMethod, PathArgs, Route, RouteMatch, RouteTable};
use crate::view::{ContentTypeTable, FsSource, ViewResolver};

/// A configured application.
#[derive(Debug)]
pub struct Pion {
    routes: RouteTable,
    dispatcher: Dispatcher,
    views: ViewResolver,
    content_types: ContentTypeTable,
    base_view: String,
}

impl Pion {
    pub fn new(views: ViewResolver) -> Self {
        Self {
            routes: RouteTable::new(),
            dispatcher: Dispatcher::default(),
            views,
            content_types: ContentTypeTable::default(),
            base_view: "index".to_string(),
        }
    }

    /// Build from configuration. Templates are read from `app.view_dir`.
    pub fn from_config(config: &PionConfig, registry: ControllerRegistry) -> Self {
        let views = ViewResolver::new(FsSource::new(&config.app.view_dir))
            .with_default_extension(config.app.default_extension.clone());

        let mut app = Pion::new(views);
        app.dispatcher = Dispatcher::new(registry);
        app.set_base_uri(config.app.base_uri.clone())
            .set_base_view(config.app.base_view.clone());

        app.set_content_types(config.content_type_table());

        for route in &config.routes {
            let action = Action::controller(&route.action);
            if let Action::Controller(reference) = &action {
                if !app.registry().contains(&reference.name) {
                    tracing::warn!(
                        controller = %reference.name,
                        pattern = %route.pattern,
                        "Route references an unregistered controller"
                    );
                }
            }
            for method in route.method.methods() {
                app.add_route(method, route.pattern.clone(), action.clone());
            }
        }

        if let Some(not_found) = &config.app.not_found {
            app.set_not_found_action(Action::controller(not_found));
        }

        tracing::info!(
            routes = app.routes.len(),
            controllers = app.registry().len(),
            view_dir = %config.app.view_dir,
            "Application configured"
        );
        app
    }

    pub fn set_base_uri(&mut self, base_uri: impl Into<String>) -> &mut Self {
        self.routes.set_base_uri(base_uri);
        self
    }

    pub fn base_uri(&self) -> &str {
        self.routes.base_uri()
    }

    /// Default layout view for every cycle.
    pub fn set_base_view(&mut self, view: impl Into<String>) -> &mut Self {
        self.base_view = view.into();
        self
    }

    pub fn base_view(&self) -> &str {
        &self.base_view
    }

    pub fn set_content_types(&mut self, table: ContentTypeTable) -> &mut Self {
        self.content_types = table;
        self
    }

    pub fn add_route(
        &mut self,
        method: HttpMethod,
        pattern: impl Into<String>,
        action: impl Into<Action>,
    ) -> &mut Self {
        self.routes.add(method, pattern, action.into());
        self
    }

    pub fn get(&mut self, pattern: impl Into<String>, action: impl Into<Action>) -> &mut Self {
        self.add_route(HttpMethod::Get, pattern, action)
    }

    pub fn post(&mut self, pattern: impl Into<String>, action: impl Into<Action>) -> &mut Self {
        self.add_route(HttpMethod::Post, pattern, action)
    }

    pub fn put(&mut self, pattern: impl Into<String>, action: impl Into<Action>) -> &mut Self {
        self.add_route(HttpMethod::Put, pattern, action)
    }

    pub fn delete(&mut self, pattern: impl Into<String>, action: impl Into<Action>) -> &mut Self {
        self.add_route(HttpMethod::Delete, pattern, action)
    }

    /// Register the same action under every method.
    pub fn any(&mut self, pattern: impl Into<String>, action: impl Into<Action>) -> &mut Self {
        let pattern = pattern.into();
        let action = action.into();
        for method in HttpMethod::ALL {
            self.routes.add(method, pattern.clone(), action.clone());
        }
        self
    }

    pub fn set_not_found_action(&mut self, action: impl Into<Action>) -> &mut Self {
        self.routes.set_not_found(action.into());
        self
    }

    pub fn register_controller<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&ControllerInit<'_>) -> Box<dyn Controller> + Send + Sync + 'static,
    {
        self.dispatcher.registry_mut().register(name, factory);
        self
    }

    pub fn register_controller_with_views<F>(
        &mut self,
        name: impl Into<String>,
        view_dir: impl Into<PathBuf>,
        factory: F,
    ) -> &mut Self
    where
        F: Fn(&ControllerInit<'_>) -> Box<dyn Controller> + Send + Sync + 'static,
    {
        self.dispatcher.registry_mut().register_with_views(name, view_dir, factory);
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn registry(&self) -> &ControllerRegistry {
        self.dispatcher.registry()
    }

    pub fn views(&self) -> &ViewResolver {
        &self.views
    }

    pub fn content_types(&self) -> &ContentTypeTable {
        &self.content_types
    }

    pub(crate) fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Router lookup only. No match is `RouteNotFound`.
    pub fn resolve(&self, method: &str, path: &str) -> Result<(&Route, PathArgs), DispatchError> {
        match self.routes.match_route(method, path)? {
            RouteMatch::Matched { route, args } => Ok((route, args)),
            RouteMatch::NoMatch => Err(DispatchError::RouteNotFound {
                method: method.to_string(),
                path: path.to_string(),
            }),
        }
    }

    /// Run one dispatch cycle and produce its single response.
    pub fn run_once(&self, request: RequestContext) -> Result<Response, DispatchError> {
        let start = Instant::now();
        let request = request.negotiated(&self.content_types);

        let span = tracing::debug_span!(
            "dispatch",
            method = %request.method(),
            path = %request.path(),
            request_id = request.request_id().unwrap_or("-"),
        );
        let _enter = span.enter();
        tracing::debug!(accept = request.accept_preferences().len(), "Dispatching request");

        let result = match self.resolve(request.method(), request.path()) {
            Ok((route, args)) => {
                let mut cycle = Cycle::new(self, &request, args);
                let outcome = self.dispatcher.dispatch(&route.action, &mut cycle);
                cycle.complete(outcome)
            }
            Err(err @ DispatchError::RouteNotFound { .. }) => self.not_found(&request, err),
            Err(err) => Err(err),
        };

        let status = match &result {
            Ok(response) => response.status(),
            Err(err) => err.status_code(),
        };
        metrics::record_dispatch(request.method(), status.as_u16(), start);
        result
    }

    fn not_found(
        &self,
        request: &RequestContext,
        cause: DispatchError,
    ) -> Result<Response, DispatchError> {
        let Some(action) = self.routes.not_found() else {
            tracing::warn!(error = %cause, "No route matched");
            return Ok(Response::not_found());
        };
        tracing::warn!(
            error = %cause,
            action = %action.describe(),
            "No route matched; dispatching not-found action"
        );

        let mut cycle = Cycle::new(self, request, PathArgs::new());
        let outcome = match action {
            Action::Closure(_) => self.dispatcher.dispatch(action, &mut cycle),
            Action::Controller(reference) => match self.dispatcher.resolve(reference, &cycle) {
                Ok(resolved) => self.dispatcher.invoke(reference, resolved, &mut cycle),
                Err(err) if err.is_resolution_failure() => {
                    tracing::warn!(error = %err, "Not-found action could not be resolved");
                    return Ok(Response::not_found());
                }
                Err(err) => return Err(err),
            },
        };

        let mut response = cycle.complete(outcome)?;
        if response.status() == StatusCode::OK {
            response.set_status(StatusCode::NOT_FOUND);
        }
        Ok(response)
    }
}
