//! Glue between HTTP header maps and [`CanonicalCookie`].
//!
//! A response may carry several `Set-Cookie` headers, each of which may hold
//! a comma-joined batch. Going the other way, the cookies that match a
//! request are rendered into a single `Cookie` header value.

use crate::base::neterror::NetError;
use crate::cookies::canonical_cookie::CanonicalCookie;
use http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use time::OffsetDateTime;
use url::Url;

/// Every `Set-Cookie` value in `headers` that is valid UTF-8.
pub fn set_cookie_headers(headers: &HeaderMap) -> impl Iterator<Item = &str> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| match std::str::from_utf8(value.as_bytes()) {
            Ok(header) => Some(header),
            Err(_) => {
                tracing::debug!("skipping Set-Cookie header that is not valid UTF-8");
                None
            }
        })
}

/// Parse all cookies set by a response to `url`.
///
/// A malformed header is skipped with a warning; cookies that completed
/// before the malformed one, and those in other headers, are kept.
pub fn cookies_from_headers(
    url: &Url,
    headers: &HeaderMap,
) -> Result<Vec<CanonicalCookie>, NetError> {
    let mut cookies = Vec::new();

    for header in set_cookie_headers(headers) {
        for result in CanonicalCookie::parse_all(url, header)? {
            match result {
                Ok(cookie) => cookies.push(cookie),
                Err(err) => {
                    tracing::warn!(error = %err, header = %header, "skipping malformed Set-Cookie header");
                }
            }
        }
    }

    Ok(cookies)
}

/// Build the `Cookie` request header for `url` from stored cookies.
///
/// Only unexpired cookies that [`request_match`](CanonicalCookie::request_match)
/// the URL are included, and `Secure` cookies only over a secure scheme.
/// Longer paths are listed first. Returns `None` when nothing applies.
pub fn cookie_header_for<'a, I>(url: &Url, cookies: I) -> Option<HeaderValue>
where
    I: IntoIterator<Item = &'a CanonicalCookie>,
{
    let now = OffsetDateTime::now_utc();
    let secure_scheme = matches!(url.scheme(), "https" | "wss");

    let mut matched: Vec<&CanonicalCookie> = cookies
        .into_iter()
        .filter(|cookie| !cookie.secure() || secure_scheme)
        .filter(|cookie| !cookie.is_expired_at(now) && cookie.request_match(url))
        .collect();

    if matched.is_empty() {
        return None;
    }

    // Sort by path length (longest first); stable, so header order breaks ties
    matched.sort_by(|a, b| b.path().len().cmp(&a.path().len()));

    let value = matched
        .iter()
        .map(|cookie| cookie.to_string())
        .collect::<Vec<_>>()
        .join("; ");

    match HeaderValue::from_str(&value) {
        Ok(header) => Some(header),
        Err(err) => {
            tracing::warn!(error = %err, "cookie values are not valid in a Cookie header");
            None
        }
    }
}
