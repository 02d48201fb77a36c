//! `Set-Cookie` attribute vocabulary and value normalisation.
//!
//! Attribute names are case-insensitive (RFC 2109 §4.1). A name is folded to
//! lower case with `-` replaced by `_` and then looked up in a fixed table,
//! which also carries the legacy aliases (`port`, `httponly`, `commenturl`).
//! Names outside the table are kept as [`Extension`] entries.

use crate::cookies::config::ParserConfig;
use crate::cookies::dateparser;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use time::OffsetDateTime;

/// Recognised cookie attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeName {
    Domain,
    Path,
    Secure,
    HttpOnly,
    Version,
    Comment,
    CommentUrl,
    Discard,
    Ports,
    Expires,
    MaxAge,
}

/// Normalised name → attribute, aliases included.
const ATTRIBUTE_TABLE: &[(&str, AttributeName)] = &[
    ("domain", AttributeName::Domain),
    ("path", AttributeName::Path),
    ("secure", AttributeName::Secure),
    ("http_only", AttributeName::HttpOnly),
    ("httponly", AttributeName::HttpOnly),
    ("version", AttributeName::Version),
    ("comment", AttributeName::Comment),
    ("comment_url", AttributeName::CommentUrl),
    ("commenturl", AttributeName::CommentUrl),
    ("discard", AttributeName::Discard),
    ("ports", AttributeName::Ports),
    ("port", AttributeName::Ports),
    ("expires", AttributeName::Expires),
    ("max_age", AttributeName::MaxAge),
];

impl AttributeName {
    /// Fold a raw attribute name: lower case, `-` → `_`.
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_ascii_lowercase().replace('-', "_")
    }

    /// Look up an already normalised name.
    pub fn lookup(normalized: &str) -> Option<Self> {
        ATTRIBUTE_TABLE
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, attr)| *attr)
    }

    /// Normalise and look up a raw name as it appeared in the header.
    pub fn from_raw(raw: &str) -> Option<Self> {
        Self::lookup(&Self::normalize(raw))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeName::Domain => "domain",
            AttributeName::Path => "path",
            AttributeName::Secure => "secure",
            AttributeName::HttpOnly => "http_only",
            AttributeName::Version => "version",
            AttributeName::Comment => "comment",
            AttributeName::CommentUrl => "comment_url",
            AttributeName::Discard => "discard",
            AttributeName::Ports => "ports",
            AttributeName::Expires => "expires",
            AttributeName::MaxAge => "max_age",
        }
    }

    /// Flag attributes are set by their bare name.
    pub fn is_flag(&self) -> bool {
        matches!(
            self,
            AttributeName::Secure | AttributeName::HttpOnly | AttributeName::Discard
        )
    }
}

/// RFC 2965 `Port` scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortList {
    /// `Port="80,8080"`
    Explicit(Vec<u16>),
    /// Bare `Port`: only the port of the request that set the cookie.
    RequestPort,
}

/// An attribute outside the recognised vocabulary, e.g. `SameSite`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    /// Normalised name.
    pub name: String,
    /// Raw value; `None` for a bare flag.
    pub value: Option<String>,
}

/// Normalised attributes of one parsed cookie.
///
/// Absent values take their defaults when the
/// [`CanonicalCookie`](super::canonical_cookie::CanonicalCookie) is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieAttributes {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub version: Option<i32>,
    pub comment: Option<String>,
    pub comment_url: Option<String>,
    pub discard: bool,
    pub ports: Option<PortList>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires: Option<OffsetDateTime>,
    pub max_age: Option<i64>,
    pub extensions: Vec<Extension>,
}

impl CookieAttributes {
    /// Record an attribute that appeared without `=value`.
    pub fn set_flag(&mut self, raw_name: &str, config: &ParserConfig) {
        let name = AttributeName::normalize(raw_name);
        match AttributeName::lookup(&name) {
            Some(AttributeName::Secure) => self.secure = true,
            Some(AttributeName::HttpOnly) => self.http_only = true,
            Some(AttributeName::Discard) => self.discard = true,
            Some(AttributeName::Ports) => self.ports = Some(PortList::RequestPort),
            Some(attr) => {
                tracing::debug!(attribute = attr.as_str(), "ignoring valueless cookie attribute");
            }
            None => self.push_extension(name, None, config),
        }
    }

    /// Record a `name=value` attribute, normalising the value.
    pub fn set_value(&mut self, raw_name: &str, value: &str, config: &ParserConfig) {
        let name = AttributeName::normalize(raw_name);
        let Some(attr) = AttributeName::lookup(&name) else {
            self.push_extension(name, Some(value.to_string()), config);
            return;
        };

        match attr {
            AttributeName::Domain => self.domain = normalize_domain(value),
            AttributeName::Path => self.path = Some(value.to_string()),
            AttributeName::Secure => self.secure = true,
            AttributeName::HttpOnly => self.http_only = true,
            AttributeName::Discard => self.discard = true,
            AttributeName::Comment => self.comment = Some(value.to_string()),
            AttributeName::CommentUrl => self.comment_url = Some(value.to_string()),
            AttributeName::Version => self.version = parse_integer(attr, value),
            AttributeName::MaxAge => self.max_age = parse_integer(attr, value),
            AttributeName::Ports => self.ports = parse_ports(value),
            AttributeName::Expires => {
                self.expires = dateparser::parse_expires_with(value, config);
                if self.expires.is_none() {
                    tracing::debug!(value = %value, "unparsable cookie expiry, treating as absent");
                }
            }
        }
    }

    /// Look up an extension attribute by name (case-insensitive).
    pub fn extension(&self, name: &str) -> Option<&Extension> {
        let name = AttributeName::normalize(name);
        self.extensions.iter().find(|ext| ext.name == name)
    }

    fn push_extension(&mut self, name: String, value: Option<String>, config: &ParserConfig) {
        if name.is_empty() {
            return;
        }
        if !config.preserve_extensions {
            tracing::debug!(attribute = %name, "dropping unrecognised cookie attribute");
            return;
        }
        // Last occurrence wins, like the recognised attributes.
        self.extensions.retain(|ext| ext.name != name);
        self.extensions.push(Extension { name, value });
    }
}

/// True for a bare IPv4 literal or an IPv6 literal with or without brackets.
pub(crate) fn is_ip_literal(host: &str) -> bool {
    parse_ip_literal(host).is_some()
}

/// IPv4 or IPv6 address, with or without IPv6 brackets.
pub(crate) fn parse_ip_literal(host: &str) -> Option<IpAddr> {
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    host.parse().ok()
}

/// Convert a `Domain` value to RFC 2965 effective host form.
///
/// IP literals are kept verbatim. A dotless host gets `.local` appended.
/// The result always carries a leading dot and is lower-cased.
pub fn normalize_domain(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if is_ip_literal(value) {
        return Some(value.to_string());
    }

    let mut domain = if value.contains('.') {
        value.to_string()
    } else {
        format!("{value}.local")
    };
    if !domain.starts_with('.') {
        domain.insert(0, '.');
    }
    Some(domain.to_lowercase())
}

fn parse_integer<T: std::str::FromStr>(attr: AttributeName, value: &str) -> Option<T> {
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        tracing::debug!(attribute = attr.as_str(), value = %value, "unparsable integer cookie attribute");
    }
    parsed
}

fn parse_ports(value: &str) -> Option<PortList> {
    let ports: Vec<u16> = value
        .split(',')
        .filter_map(|token| token.trim().parse().ok())
        .collect();
    if ports.is_empty() {
        tracing::debug!(value = %value, "cookie port list has no valid ports");
        return None;
    }
    Some(PortList::Explicit(ports))
}
