//! Header pass-through rules. Cookie values are opaque here: they are copied,
//! never parsed or rewritten.

use axum::http::{ header::{ CONTENT_TYPE, COOKIE, SET_COOKIE }, HeaderMap, HeaderValue };

/// Every inbound `cookie` header value, in order, byte-for-byte.
pub fn inbound_cookies(headers: &HeaderMap) -> Vec<HeaderValue> {
    headers.get_all(COOKIE).iter().cloned().collect()
}

/// Every `set-cookie` value the Attendance Service returned.
pub fn upstream_set_cookies(headers: &HeaderMap) -> Vec<HeaderValue> {
    headers.get_all(SET_COOKIE).iter().cloned().collect()
}

/// Append `set-cookie` values without merging or reordering them.
pub fn append_set_cookies(target: &mut HeaderMap, values: &[HeaderValue]) {
    for value in values {
        target.append(SET_COOKIE, value.clone());
    }
}

/// The inbound content-type if it announces a multipart form.
pub fn multipart_content_type(headers: &HeaderMap) -> Option<HeaderValue> {
    let value = headers.get(CONTENT_TYPE)?;
    let is_multipart = value
        .to_str()
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false);

    is_multipart.then(|| value.clone())
}
