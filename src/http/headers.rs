//! `GET /headers`: echo the request headers back as plain text.

use std::fmt::Write;

use axum::http::{HeaderMap, HeaderName};

/// Canonical MIME form of a header name: `user-agent` → `User-Agent`.
pub fn canonical_name(name: &HeaderName) -> String {
    let mut out = String::with_capacity(name.as_str().len());
    let mut upper = true;
    for c in name.as_str().chars() {
        out.push(if upper { c.to_ascii_uppercase() } else { c });
        upper = c == '-';
    }
    out
}

/// One `"{Name}: {value} \n"` line per header value, in arrival order.
pub fn echo_headers(headers: &HeaderMap) -> String {
    let mut out = String::new();
    for (name, value) in headers {
        let _ = writeln!(
            out,
            "{}: {} ",
            canonical_name(name),
            String::from_utf8_lossy(value.as_bytes())
        );
    }
    out
}

pub async fn headers(headers: HeaderMap) -> String {
    echo_headers(&headers)
}
