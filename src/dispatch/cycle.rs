//! Per-request action context.
//!
//! A `Cycle` is created for one request and passed explicitly to every
//! closure and controller method. It owns the path arguments, the view
//! data, the base view name and the response guard for that request.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::app::Pion;
use crate::error::DispatchError;
use crate::http::guard::{RenderEnv, ResponseGuard};
use crate::http::{RequestContext, Response, ResponsePayload};
use crate::routing::{Action, ActionResult, PathArgs};
use crate::view::{ViewData, ViewScope};

/// State and accessors for one dispatch cycle.
pub struct Cycle<'a> {
    app: &'a Pion,
    request: &'a RequestContext,
    args: PathArgs,
    view_data: ViewData,
    base_view: String,
    owner: Option<PathBuf>,
    guard: ResponseGuard,
}

impl<'a> Cycle<'a> {
    pub(crate) fn new(app: &'a Pion, request: &'a RequestContext, args: PathArgs) -> Self {
        Self {
            app,
            request,
            args,
            view_data: ViewData::new(),
            base_view: app.base_view().to_string(),
            owner: None,
            guard: ResponseGuard::new(),
        }
    }

    pub fn request(&self) -> &RequestContext {
        self.request
    }

    pub fn base_uri(&self) -> &str {
        self.app.routes().base_uri()
    }

    /// Named path argument.
    pub fn path_arg(&self, name: &str) -> Option<&str> {
        self.args.get(name)
    }

    /// Path argument by capture position.
    pub fn positional_arg(&self, index: usize) -> Option<&str> {
        self.args.positional(index)
    }

    pub fn args(&self) -> &PathArgs {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut PathArgs {
        &mut self.args
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.request.query(name)
    }

    pub fn body_field(&self, name: &str) -> Option<&str> {
        self.request.body_field(name)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.header(name)
    }

    pub fn set_view_data(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.view_data.set(key, value);
    }

    pub fn view_data(&self, key: &str) -> Option<&Value> {
        self.view_data.get(key)
    }

    pub fn data(&self) -> &ViewData {
        &self.view_data
    }

    /// Layout view used by [`Cycle::response`] and the end-of-cycle render.
    pub fn set_base_view(&mut self, view: impl Into<String>) {
        self.base_view = view.into();
    }

    pub fn base_view(&self) -> &str {
        &self.base_view
    }

    /// The base view with the collected view data.
    pub fn response(&self) -> ResponsePayload {
        ResponsePayload::view(self.base_view.clone(), self.view_data.clone())
    }

    /// Render a view to a string without emitting it.
    pub fn view<T: Serialize>(&self, view: &str, data: &T) -> Result<String, DispatchError> {
        self.render(view, data, None)
    }

    /// Like [`Cycle::view`] with a forced extension.
    pub fn view_as<T: Serialize>(
        &self,
        view: &str,
        data: &T,
        extension: &str,
    ) -> Result<String, DispatchError> {
        self.render(view, data, Some(extension))
    }

    fn render<T: Serialize>(
        &self,
        view: &str,
        data: &T,
        extension: Option<&str>,
    ) -> Result<String, DispatchError> {
        let scope = ViewScope {
            owner: self.owner.as_deref(),
            preferences: self.request.accept_preferences(),
        };
        self.app
            .views()
            .render(view, data, extension, scope)
            .map(|rendered| rendered.body)
    }

    /// Write output directly. Counts as the cycle's response.
    pub fn write(&mut self, text: &str) -> Result<(), DispatchError> {
        self.guard.write(text)
    }

    /// Emit a payload now instead of returning it.
    pub fn respond(&mut self, payload: ResponsePayload) -> Result<(), DispatchError> {
        let env = RenderEnv {
            views: self.app.views(),
            content_types: self.app.content_types(),
            scope: ViewScope {
                owner: self.owner.as_deref(),
                preferences: self.request.accept_preferences(),
            },
        };
        self.guard.respond(payload, env)
    }

    /// Answer 303 to `path` under the base URI and end the action.
    /// Output written or returned afterwards is dropped.
    ///
    /// ```rust,ignore
    /// return cycle.redirect("/login");
    /// ```
    pub fn redirect(&mut self, path: &str) -> ActionResult {
        let location = format!("{}{}", self.base_uri(), path);
        tracing::debug!(location = %location, "Redirecting");
        self.guard.redirect(&location)?;
        Ok(None)
    }

    /// Dispatch another controller reference inside this cycle.
    pub fn execute(&mut self, reference: &str) -> ActionResult {
        let app = self.app;
        app.dispatcher().dispatch(&Action::controller(reference), self)
    }

    pub fn is_sent(&self) -> bool {
        self.guard.is_sent()
    }

    pub(crate) fn owner(&self) -> Option<&Path> {
        self.owner.as_deref()
    }

    /// Swap the view owner directory, returning the previous one.
    pub(crate) fn replace_owner(&mut self, owner: Option<PathBuf>) -> Option<PathBuf> {
        std::mem::replace(&mut self.owner, owner)
    }

    /// Turn the action outcome into the cycle's single response.
    pub(crate) fn complete(mut self, outcome: ActionResult) -> Result<Response, DispatchError> {
        match outcome?.filter(|payload| !payload.is_empty()) {
            Some(payload) => self.respond(payload)?,
            None if !self.guard.is_sent() && !self.view_data.is_empty() => {
                tracing::debug!(view = %self.base_view, "Rendering base view at end of cycle");
                let payload = self.response();
                self.respond(payload)?;
            }
            None => {}
        }
        Ok(self.guard.finish().unwrap_or_else(|| Response::ok(String::new())))
    }
}

impl std::fmt::Debug for Cycle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cycle")
            .field("method", &self.request.method())
            .field("path", &self.request.path())
            .field("args", &self.args)
            .field("base_view", &self.base_view)
            .field("owner", &self.owner())
            .field("sent", &self.guard.is_sent())
            .finish()
    }
}
