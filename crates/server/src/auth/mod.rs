//! Trust-signal gate for the user endpoints.

pub mod middleware;

use axum::http::HeaderMap;
use byosnap_core::TrustContext;
use byosnap_core::trust::{AUTH_TYPE_HEADER, GATEWAY_HEADER, USER_ID_HEADER};

pub use middleware::{GateLayer, GateMiddleware};

/// Raw value of header `name`, if present and valid UTF-8.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Build the trust context of a request from its gateway headers.
pub fn trust_context(headers: &HeaderMap, resource_user_id: Option<&str>) -> TrustContext {
    TrustContext::from_headers(
        header_str(headers, GATEWAY_HEADER),
        header_str(headers, AUTH_TYPE_HEADER),
        header_str(headers, USER_ID_HEADER),
        resource_user_id,
    )
}
