//! `Set-Cookie` parsing and cookie matching.
//!
//! This module turns raw `Set-Cookie` header values into immutable cookie
//! records and answers whether a stored cookie applies to a request:
//!
//! - **Parsing**: Stack-driven scanner over one header ([`CookieParser`](parser::CookieParser))
//! - **Attributes**: Fixed vocabulary, aliases and value normalisation ([`attributes`])
//! - **Dates**: The four legacy `Expires` layouts ([`dateparser`])
//! - **Records**: [`CanonicalCookie`](canonical_cookie::CanonicalCookie) with expiry and
//!   domain/path/port matching
//! - **Headers**: `http::HeaderMap` adapters ([`headers`])
//!
//! Storage, eviction and persistence belong to the cookie jar that owns the
//! records; nothing here keeps state between calls.
//!
//! # Architecture
//!
//! | Chromium (C++) | cookiestore (Rust) | Responsibility |
//! |----------------|--------------------|----------------|
//! | `net::ParsedCookie` | [`ParsedCookie`](parser::ParsedCookie) | Tokenised header |
//! | `net::CanonicalCookie` | [`CanonicalCookie`](canonical_cookie::CanonicalCookie) | Single cookie representation |
//! | `net::cookie_util` | [`headers`] | Request header assembly |
//!
//! # Parsing a response header
//!
//! ```rust
//! use cookiestore::cookies::canonical_cookie::CanonicalCookie;
//! use url::Url;
//!
//! let url = Url::parse("http://www.example.com/app/login")?;
//! let header = "sid=abc; Domain=example.com; Path=/app, theme=dark";
//!
//! let cookies = CanonicalCookie::parse_all(&url, header)?
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! assert_eq!(cookies.len(), 2);
//! assert_eq!(cookies[0].domain(), ".example.com");
//! assert_eq!(cookies[1].path(), "/app/login");
//! assert!(cookies[0].request_match(&Url::parse("http://shop.example.com/app/cart")?));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod attributes;
pub mod canonical_cookie;
pub mod config;
pub mod dateparser;
pub mod headers;
pub mod parser;
