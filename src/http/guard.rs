//! Single-response guard.
//!
//! # States
//! ```text
//! Idle --respond()/write()/redirect()--> Sent
//! Sent --respond()/redirect()--> error ResponseAlreadySent (no output)
//! Sent(direct) --write()--> Sent(direct), output appended
//! Sent(redirect) --respond()/write()/redirect()--> ignored, 303 kept
//! ```
//!
//! # Design Decisions
//! - One guard per dispatch cycle, owned by that cycle
//! - Direct writes count as Sent so a later render cannot double-emit
//! - A failed render leaves the guard Idle
//! - A redirect ends the cycle's output; anything after it is dropped

use crate::error::DispatchError;
use crate::http::response::{Response, ResponsePayload};
use crate::observability::metrics;
use crate::view::{ContentTypeTable, ViewResolver, ViewScope};

/// Guard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Idle,
    Sent,
}

/// What the guard needs to turn a templated payload into output.
#[derive(Debug, Clone, Copy)]
pub struct RenderEnv<'a> {
    pub views: &'a ViewResolver,
    pub content_types: &'a ContentTypeTable,
    pub scope: ViewScope<'a>,
}

/// Enforces exactly one response per cycle.
#[derive(Debug, Default)]
pub struct ResponseGuard {
    response: Option<Response>,
    direct: bool,
    redirected: bool,
}

impl ResponseGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GuardState {
        if self.response.is_some() {
            GuardState::Sent
        } else {
            GuardState::Idle
        }
    }

    pub fn is_sent(&self) -> bool {
        self.state() == GuardState::Sent
    }

    /// Emit `payload`, rendering it first when templated.
    pub fn respond(
        &mut self,
        payload: ResponsePayload,
        env: RenderEnv<'_>,
    ) -> Result<(), DispatchError> {
        if self.after_redirect("payload") {
            return Ok(());
        }
        self.ensure_idle()?;

        let response = match payload {
            ResponsePayload::Raw(content) => Response::ok(content),
            ResponsePayload::Templated { view, data, extension, owner } => {
                let scope = ViewScope { owner: owner.as_deref().or(env.scope.owner), ..env.scope };
                let rendered = env.views.render(&view, &data, extension.as_deref(), scope)?;
                let response = Response::ok(rendered.body);
                match env.content_types.mime_for(&rendered.extension) {
                    Some(mime) => response.with_content_type(mime),
                    None => response,
                }
            }
        };

        self.response = Some(response);
        Ok(())
    }

    /// Emit a prepared response.
    pub fn emit(&mut self, response: Response) -> Result<(), DispatchError> {
        if self.after_redirect("response") {
            return Ok(());
        }
        self.ensure_idle()?;
        self.response = Some(response);
        Ok(())
    }

    /// Terminate with a 303 to `location`.
    pub fn redirect(&mut self, location: &str) -> Result<(), DispatchError> {
        self.emit(Response::redirect(location))?;
        self.redirected = true;
        Ok(())
    }

    /// Output produced outside `respond`. The first write sends the response;
    /// later writes extend it.
    pub fn write(&mut self, text: &str) -> Result<(), DispatchError> {
        if self.after_redirect("write") {
            return Ok(());
        }
        if self.response.is_none() {
            self.response = Some(Response::ok(text));
            self.direct = true;
            return Ok(());
        }
        if !self.direct {
            return Err(self.rejected());
        }
        if let Some(response) = self.response.as_mut() {
            response.append_body(text);
        }
        Ok(())
    }

    /// The emitted response, if any.
    pub fn finish(self) -> Option<Response> {
        self.response
    }

    fn after_redirect(&self, output: &str) -> bool {
        if self.redirected {
            tracing::debug!(output, "Ignoring output after redirect");
        }
        self.redirected
    }

    fn ensure_idle(&self) -> Result<(), DispatchError> {
        match self.state() {
            GuardState::Idle => Ok(()),
            GuardState::Sent => Err(self.rejected()),
        }
    }

    fn rejected(&self) -> DispatchError {
        tracing::warn!("Response already sent; rejecting second response");
        metrics::record_double_respond();
        DispatchError::ResponseAlreadySent
    }
}
