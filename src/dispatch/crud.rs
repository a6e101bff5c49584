//! CRUD-style method inference.
//!
//! ```text
//! GET     → _show if an `id` path argument exists, else _index
//! POST    → _delete if _METHOD=delete, _update if _METHOD=put, else _create
//! PUT     → _update
//! DELETE  → _delete
//! ```

use crate::dispatch::controller::ControllerMethod;
use crate::routing::HttpMethod;

/// Form field that lets a POST stand in for PUT or DELETE.
pub const METHOD_OVERRIDE_FIELD: &str = "_METHOD";

/// Path argument that selects `_show` over `_index`.
pub const ID_ARG: &str = "id";

/// Infer the conventional controller method. Pure.
pub fn infer_crud_method(
    method: HttpMethod,
    has_id: bool,
    method_override: Option<&str>,
) -> ControllerMethod {
    match method {
        HttpMethod::Get if has_id => ControllerMethod::Show,
        HttpMethod::Get => ControllerMethod::Index,
        HttpMethod::Post => match method_override {
            Some(o) if o.eq_ignore_ascii_case("delete") => ControllerMethod::Delete,
            Some(o) if o.eq_ignore_ascii_case("put") => ControllerMethod::Update,
            _ => ControllerMethod::Create,
        },
        HttpMethod::Put => ControllerMethod::Update,
        HttpMethod::Delete => ControllerMethod::Delete,
    }
}

/// The raw per-verb method name (`_get`, `_post`, `_put`, `_delete`).
pub fn http_method_fallback(method: HttpMethod) -> ControllerMethod {
    match method {
        HttpMethod::Get => ControllerMethod::Get,
        HttpMethod::Post => ControllerMethod::Post,
        HttpMethod::Put => ControllerMethod::Put,
        HttpMethod::Delete => ControllerMethod::Delete,
    }
}
