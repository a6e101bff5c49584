//! Request context handed to a dispatch cycle.
//!
//! # Responsibilities
//! - Carry method, path, headers, decoded query and form body
//! - Carry the negotiated Accept preferences
//! - Generate request IDs (UUID v4) for the transport layer
//!
//! # Design Decisions
//! - Built once per request and not mutated during the cycle
//! - Query strings and url-encoded bodies are decoded with `form_urlencoded`
//! - Path arguments live in the cycle, not here

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use indexmap::IndexMap;
use tower_http::request_id::{MakeRequestId, RequestId};
use url::form_urlencoded;
use uuid::Uuid;

use crate::view::{AcceptPreference, ContentTypeTable};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Immutable per-request facts.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    method: String,
    path: String,
    headers: HeaderMap,
    query: IndexMap<String, String>,
    body: IndexMap<String, String>,
    accept: Vec<AcceptPreference>,
}

impl RequestContext {
    /// Create a context. Anything after `?` in `target` is decoded as the query.
    pub fn new(method: impl Into<String>, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        let context = Self {
            method: method.into(),
            path: path.to_string(),
            ..Self::default()
        };
        match query {
            Some(query) => context.with_query(query),
            None => context,
        }
    }

    /// Build from transport request parts and the buffered body.
    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        let mut context = Self {
            method: parts.method.as_str().to_string(),
            path: parts.uri.path().to_string(),
            headers: parts.headers.clone(),
            ..Self::default()
        };
        if let Some(query) = parts.uri.query() {
            context = context.with_query(query);
        }
        if context.is_form_body() {
            context.body = decode(body);
        }
        context
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(header = %name, "Ignoring invalid header"),
        }
        self
    }

    pub fn with_query(mut self, raw: &str) -> Self {
        self.query.extend(decode(raw.as_bytes()));
        self
    }

    /// Decode an `application/x-www-form-urlencoded` body.
    pub fn with_form_body(mut self, raw: &str) -> Self {
        self.body.extend(decode(raw.as_bytes()));
        self
    }

    /// Derive Accept preferences against `table`.
    pub(crate) fn negotiated(mut self, table: &ContentTypeTable) -> Self {
        self.accept = table.negotiate(self.header(ACCEPT.as_str()));
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn query_params(&self) -> &IndexMap<String, String> {
        &self.query
    }

    pub fn body_field(&self, name: &str) -> Option<&str> {
        self.body.get(name).map(String::as_str)
    }

    pub fn body_fields(&self) -> &IndexMap<String, String> {
        &self.body
    }

    pub fn accept_preferences(&self) -> &[AcceptPreference] {
        &self.accept
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }

    fn is_form_body(&self) -> bool {
        self.header(CONTENT_TYPE.as_str())
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false)
    }
}

fn decode(raw: &[u8]) -> IndexMap<String, String> {
    form_urlencoded::parse(raw).into_owned().collect()
}

/// Request ID generator backed by UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_target_splits_query() {
        let ctx = RequestContext::new("GET", "/product?search=banana&page=2");
        assert_eq!(ctx.path(), "/product");
        assert_eq!(ctx.query("search"), Some("banana"));
        assert_eq!(ctx.query("page"), Some("2"));
        assert_eq!(ctx.query("missing"), None);
    }

    #[test]
    fn test_from_parts_decodes_form_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/items/5?x=1")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::empty())
            .unwrap();
        let (parts, _) = request.into_parts();

        let ctx = RequestContext::from_parts(&parts, b"_METHOD=delete&name=a+b%21");
        assert_eq!(ctx.method(), "POST");
        assert_eq!(ctx.path(), "/items/5");
        assert_eq!(ctx.query("x"), Some("1"));
        assert_eq!(ctx.body_field("_METHOD"), Some("delete"));
        assert_eq!(ctx.body_field("name"), Some("a b!"));
    }

    #[test]
    fn test_non_form_body_is_not_decoded() {
        let request = Request::builder()
            .method("POST")
            .uri("/items")
            .header("content-type", "application/json")
            .body(Body::empty())
            .unwrap();
        let (parts, _) = request.into_parts();

        let ctx = RequestContext::from_parts(&parts, br#"{"_METHOD":"delete"}"#);
        assert!(ctx.body_fields().is_empty());
    }

    #[test]
    fn test_negotiated_uses_accept_header() {
        let ctx = RequestContext::new("GET", "/")
            .with_header("Accept", "application/json, text/html")
            .negotiated(&ContentTypeTable::default());
        let exts: Vec<_> = ctx.accept_preferences().iter().map(|p| p.extension.as_str()).collect();
        assert_eq!(exts, vec!["js", "html"]);
    }

    #[test]
    fn test_request_id_maker_yields_uuid() {
        let request = Request::builder().body(Body::empty()).unwrap();
        let id = UuidRequestId.make_request_id(&request).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
