//! Action payloads and the outgoing response.
//!
//! # Design Decisions
//! - An action yields either raw content or a (view, data) pair
//! - The response is transport-neutral: status, headers, UTF-8 body
//! - Redirects are 303 See Other with a `Location` header
//! - A templated payload remembers the view directory of the controller that returned it

use std::path::{Path, PathBuf};

use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode};

use crate::view::ViewData;

/// What an action produces. Consumed once by the response guard.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    Raw(String),
    Templated {
        view: String,
        data: ViewData,
        extension: Option<String>,
        /// View directory searched before the shared one.
        owner: Option<PathBuf>,
    },
}

impl ResponsePayload {
    pub fn raw(content: impl Into<String>) -> Self {
        ResponsePayload::Raw(content.into())
    }

    pub fn view(view: impl Into<String>, data: ViewData) -> Self {
        ResponsePayload::Templated {
            view: view.into(),
            data,
            extension: None,
            owner: None,
        }
    }

    /// Force the extension of a templated payload. No effect on raw content.
    pub fn with_extension(self, ext: impl Into<String>) -> Self {
        match self {
            ResponsePayload::Templated { view, data, owner, .. } => ResponsePayload::Templated {
                view,
                data,
                extension: Some(ext.into()),
                owner,
            },
            raw => raw,
        }
    }

    /// Attach `dir` as the owning view directory unless one is already set.
    pub(crate) fn owned_by(self, dir: Option<&Path>) -> Self {
        match (self, dir) {
            (ResponsePayload::Templated { view, data, extension, owner: None }, Some(dir)) => {
                ResponsePayload::Templated {
                    view,
                    data,
                    extension,
                    owner: Some(dir.to_path_buf()),
                }
            }
            (payload, _) => payload,
        }
    }

    /// Raw content with nothing in it.
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponsePayload::Raw(content) if content.is_empty())
    }
}

/// One outgoing response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Bare 404 with an empty body.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, String::new())
    }

    /// 303 See Other pointing at `location`.
    pub fn redirect(location: &str) -> Self {
        let mut response = Self::new(StatusCode::SEE_OTHER, String::new());
        match HeaderValue::from_str(location) {
            Ok(value) => {
                response.headers.insert(LOCATION, value);
            }
            Err(_) => tracing::warn!(location = %location, "Invalid redirect location"),
        }
        response
    }

    pub fn with_content_type(mut self, mime: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(mime) {
            self.headers.insert(CONTENT_TYPE, value);
        }
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub(crate) fn append_body(&mut self, text: &str) {
        self.body.push_str(text);
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, String) {
        (self.status, self.headers, self.body)
    }
}
