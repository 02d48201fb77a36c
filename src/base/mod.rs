//! Base types and error handling.
//!
//! Provides foundational types mirroring Chromium's `net/base/`:
//! - [`NetError`](neterror::NetError): Error codes, including the
//!   `Set-Cookie` parsing failures

pub mod neterror;
