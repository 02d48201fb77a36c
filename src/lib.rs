//! # cookiestore
//!
//! `Set-Cookie` parsing and cookie matching for HTTP clients.
//!
//! `cookiestore` is the core a cookie jar builds on: it reads the header
//! values a server sends, including the inconsistent legacy grammar, and
//! decides whether a stored cookie belongs on an outgoing request.
//!
//! ## Features
//!
//! - **Tolerant parsing**: Quoted and unquoted values, comma-joined cookie
//!   batches, case- and punctuation-insensitive attribute names
//! - **Legacy dates**: RFC 1123 and two/four-digit-year `Expires` layouts
//! - **RFC 2965 matching**: Effective-host domain matching, path prefixes,
//!   `Port` lists
//! - **Immutable records**: Safe to share across threads without locking
//!
//! ## Quick Start
//!
//! ```rust
//! use cookiestore::cookies::canonical_cookie::CanonicalCookie;
//! use url::Url;
//!
//! let url = Url::parse("http://example.com/")?;
//! let cookie = CanonicalCookie::parse(&url, "sid=abc; Max-Age=3600; HttpOnly")?
//!     .expect("one cookie");
//!
//! assert_eq!(cookie.to_string(), "sid=abc");
//! assert!(!cookie.is_session());
//! assert!(cookie.request_match(&url));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`cookies`] - Header parsing, cookie records, and matching

pub mod base;
pub mod cookies;
