//! One-shot flash notices
//!
//! A notice set during a redirect is rendered on exactly the next response
//! and then cleared. Transport is a short-lived HTTP-only cookie holding a
//! percent-encoded JSON payload, so no session write is needed to carry a
//! message.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

const FLASH_COOKIE: &str = "flash";

/// Notice kind; drives the banner styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A one-shot notice attached to the next rendered response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

/// Read and clear the pending notice, if any. The returned jar carries the
/// removal and must be included in the response.
pub fn take(jar: CookieJar) -> (Option<Flash>, CookieJar) {
    match jar.get(FLASH_COOKIE) {
        Some(cookie) => {
            let flash = decode(cookie.value())
                .and_then(|json| serde_json::from_str::<Flash>(&json).ok());
            let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/").build());
            (flash, jar)
        }
        None => (None, jar),
    }
}

/// Redirect to `to` with a notice for the next rendered response
pub fn redirect_with(flash: &Flash, to: &str) -> Response {
    let jar = CookieJar::new().add(cookie_for(flash));
    (jar, Redirect::to(to)).into_response()
}

/// Redirect with a success notice
pub fn redirect_with_success(to: &str, message: &str) -> Response {
    redirect_with(&Flash::success(message), to)
}

/// Redirect with an error notice
pub fn redirect_with_error(to: &str, message: &str) -> Response {
    redirect_with(&Flash::error(message), to)
}

fn cookie_for(flash: &Flash) -> Cookie<'static> {
    let payload = serde_json::to_string(flash).unwrap_or_default();
    Cookie::build((FLASH_COOKIE, encode(&payload)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Percent-encode arbitrary text into the cookie-value-safe character set
fn encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn decode(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_round_trips_arbitrary_text() {
        let original = r#"Welcome back! {"quoted": "text", "näme": 42}"#;
        assert_eq!(decode(&encode(original)).as_deref(), Some(original));
    }

    #[test]
    fn encoded_value_is_cookie_safe() {
        let encoded = encode("Please log in to view this resource");
        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "%-_.~".contains(c))
        );
    }

    #[test]
    fn decode_rejects_truncated_escapes() {
        assert_eq!(decode("abc%2"), None);
        assert_eq!(decode("abc%zz"), None);
    }

    #[test]
    fn take_reads_and_clears_the_notice() {
        let flash = Flash::success("Task created successfully");
        let jar = CookieJar::new().add(cookie_for(&flash));

        let (read, jar) = take(jar);
        assert_eq!(read, Some(flash));

        // the jar now carries the removal, so a second read finds nothing
        let (read_again, _) = take(jar);
        assert_eq!(read_again, None);
    }

    #[test]
    fn take_on_an_empty_jar_is_none() {
        let (read, _) = take(CookieJar::new());
        assert_eq!(read, None);
    }
}
