//! Development response headers
//!
//! The fixed header set that makes every response CORS-permissive and
//! uncacheable.

use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, EXPIRES,
    PRAGMA,
};

/// Headers added to every response, in send order
pub const DEV_HEADERS: [(HeaderName, &str); 4] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
    (PRAGMA, "no-cache"),
    (EXPIRES, "0"),
];

/// Insert the development headers, replacing any existing values
pub fn apply_dev_headers(headers: &mut HeaderMap) {
    for (name, value) in DEV_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}
