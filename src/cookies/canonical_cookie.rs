use crate::base::neterror::NetError;
use crate::cookies::attributes::{parse_ip_literal, CookieAttributes, Extension, PortList};
use crate::cookies::config::ParserConfig;
use crate::cookies::parser::{CookieParser, ParsedCookie};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use url::{Host, Url};

/// Version assumed when the server sends none (RFC 2965).
const DEFAULT_VERSION: i32 = 1;

/// Represents a cookie.
/// Modeled after Chromium's `net::CanonicalCookie`.
///
/// Built once from a parsed `Set-Cookie` entry and the URL of the request
/// that received it; never mutated afterwards. A jar that sees the same
/// `(name, domain, path)` again replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalCookie {
    name: String,
    value: String,
    domain: String,
    path: String,
    secure: bool,
    http_only: bool,
    version: i32,
    comment: Option<String>,
    comment_url: Option<String>,
    discard: bool,
    ports: Option<Vec<u16>>,
    #[serde(with = "time::serde::rfc3339::option")]
    expires: Option<OffsetDateTime>,
    max_age: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    extensions: Vec<Extension>,
}

impl CanonicalCookie {
    /// Build a cookie received from `url`, stamped with the current time.
    pub fn build(url: &Url, parsed: ParsedCookie) -> Result<Self, NetError> {
        Self::build_at(url, parsed, OffsetDateTime::now_utc())
    }

    /// Build a cookie received from `url` at `created_at`.
    ///
    /// A missing `Domain` defaults to the lower-cased request host and a
    /// missing `Path` to the request path, scoping the cookie to exactly the
    /// host and directory that set it.
    pub fn build_at(
        url: &Url,
        parsed: ParsedCookie,
        created_at: OffsetDateTime,
    ) -> Result<Self, NetError> {
        let host = request_host(url)?;
        let ParsedCookie {
            key,
            value,
            attributes,
        } = parsed;
        let CookieAttributes {
            domain,
            path,
            secure,
            http_only,
            version,
            comment,
            comment_url,
            discard,
            ports,
            expires,
            max_age,
            extensions,
        } = attributes;

        let ports = match ports {
            Some(PortList::Explicit(ports)) => Some(ports),
            Some(PortList::RequestPort) => url.port_or_known_default().map(|port| vec![port]),
            None => None,
        };

        Ok(Self {
            name: key,
            value,
            domain: domain.unwrap_or(host),
            path: path.unwrap_or_else(|| url.path().to_string()),
            secure,
            http_only,
            version: version.unwrap_or(DEFAULT_VERSION),
            comment,
            comment_url,
            discard,
            ports,
            expires,
            max_age,
            created_at,
            extensions,
        })
    }

    /// Parse the first cookie of a `Set-Cookie` header received from `url`.
    pub fn parse(url: &Url, header: &str) -> Result<Option<Self>, NetError> {
        Self::parse_all(url, header)?.next().transpose()
    }

    /// Like [`parse`](Self::parse), for a request URL still in string form.
    pub fn parse_str(request_url: &str, header: &str) -> Result<Option<Self>, NetError> {
        let url = Url::parse(request_url)?;
        Self::parse(&url, header)
    }

    /// Parse every cookie of a `Set-Cookie` header received from `url`.
    ///
    /// Cookies are yielded lazily in header order. A malformed cookie yields
    /// an error and ends the sequence; the cookies before it are unaffected.
    pub fn parse_all<'a>(
        url: &'a Url,
        header: &'a str,
    ) -> Result<impl Iterator<Item = Result<Self, NetError>> + 'a, NetError> {
        Self::parse_all_with(url, header, ParserConfig::default())
    }

    pub fn parse_all_with<'a>(
        url: &'a Url,
        header: &'a str,
        config: ParserConfig,
    ) -> Result<impl Iterator<Item = Result<Self, NetError>> + 'a, NetError> {
        request_host(url)?;
        Ok(CookieParser::with_config(header, config)
            .map(move |parsed| parsed.and_then(|parsed| Self::build(url, parsed))))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw value, without any attempt at decoding.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// RFC 2965 effective host. A leading dot admits one level of
    /// subdomain; no dot means only this exact host.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn http_only(&self) -> bool {
        self.http_only
    }

    /// 0 for Netscape cookies, 1 for RFC 2965 cookies.
    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn comment_url(&self) -> Option<&str> {
        self.comment_url.as_deref()
    }

    pub fn discard(&self) -> bool {
        self.discard
    }

    /// Allowed request ports; `None` allows any port.
    pub fn ports(&self) -> Option<&[u16]> {
        self.ports.as_deref()
    }

    pub fn expires(&self) -> Option<OffsetDateTime> {
        self.expires
    }

    pub fn max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Attributes outside the recognised vocabulary, in header order.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// `(name, domain, path)`: a jar keeps one cookie per identity.
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.name, &self.domain, &self.path)
    }

    /// When this cookie expires. `Max-Age` wins over `Expires`.
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        match self.max_age {
            Some(max_age) => Some(
                self.created_at
                    .checked_add(Duration::seconds(max_age))
                    .unwrap_or_else(|| {
                        if max_age > 0 {
                            PrimitiveDateTime::MAX.assume_utc()
                        } else {
                            PrimitiveDateTime::MIN.assume_utc()
                        }
                    }),
            ),
            None => self.expires,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    pub fn is_expired_at(&self, current_time: OffsetDateTime) -> bool {
        self.expires_at().is_some_and(|expiry| current_time > expiry)
    }

    /// True if the cookie should be dropped at the end of the session.
    pub fn is_session(&self) -> bool {
        self.expires_at().is_none() || self.discard
    }

    /// Domain-match, path-match and port-match against a request URL.
    pub fn request_match(&self, url: &Url) -> bool {
        let Ok(host) = request_host(url) else {
            return false;
        };
        let port_ok = match url.port_or_known_default() {
            Some(port) => self.port_match(port),
            None => self.ports.is_none(),
        };
        self.domain_match(&host) && self.path_match(url.path()) && port_ok
    }

    /// From RFC 2965 Section 1: `/tec/waldo` path-matches `/tec`.
    ///
    /// Plain prefix comparison, so `/tec` also matches `/technology`.
    pub fn path_match(&self, request_path: &str) -> bool {
        request_path.starts_with(&self.path)
    }

    /// From RFC 2965 Section 1.
    ///
    /// Host names domain-match if they compare equal, or if the request host
    /// is exactly one label longer than a dot-prefixed cookie domain
    /// (`x.y.com` matches `.y.com` but not `y.com`). IP addresses only ever
    /// match the same address, whatever its spelling (`[FE80::1]`, `fe80::1`).
    /// A dotless domain, `local` included, only matches itself.
    pub fn domain_match(&self, request_domain: &str) -> bool {
        let request_domain = request_domain.to_lowercase();

        if self.domain == request_domain {
            return true;
        }

        if let Some(request_ip) = parse_ip_literal(&request_domain) {
            return parse_ip_literal(&self.domain) == Some(request_ip);
        }

        if self.domain.strip_prefix('.') == Some(request_domain.as_str()) {
            return true;
        }

        if !self.domain.contains('.') {
            return false;
        }

        if !request_domain.ends_with(&self.domain) {
            return false;
        }

        let prefix = &request_domain[..request_domain.len() - self.domain.len()];
        self.domain.starts_with('.') && !prefix.is_empty() && !prefix.contains('.')
    }

    /// From RFC 2965 Section 3.3: without a port list the cookie may be
    /// returned to any port.
    pub fn port_match(&self, request_port: u16) -> bool {
        self.ports
            .as_ref()
            .map_or(true, |ports| ports.contains(&request_port))
    }
}

/// `name=value` as sent in a `Cookie` request header.
impl fmt::Display for CanonicalCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.contains('"') {
            write!(f, "{}=\"{}\"", self.name, self.value.replace('"', "\\\""))
        } else {
            write!(f, "{}={}", self.name, self.value)
        }
    }
}

/// Lower-cased host of `url`, with IPv6 brackets removed.
fn request_host(url: &Url) -> Result<String, NetError> {
    match url.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => Ok(domain.to_lowercase()),
        Some(Host::Ipv4(addr)) => Ok(addr.to_string()),
        Some(Host::Ipv6(addr)) => Ok(addr.to_string()),
        _ => Err(NetError::UrlMissingHost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::parser;
    use time::macros::datetime;

    const CREATED: OffsetDateTime = datetime!(2024-06-01 12:00:00 UTC);

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn cookie_at(request_url: &str, header: &str) -> CanonicalCookie {
        let parsed = parser::parse(header).next().unwrap().unwrap();
        CanonicalCookie::build_at(&url(request_url), parsed, CREATED).unwrap()
    }

    fn with_domain(domain: &str) -> CanonicalCookie {
        let mut cookie = cookie_at("http://example.com/", "a=1");
        cookie.domain = domain.to_string();
        cookie
    }

    #[test]
    fn test_defaults_from_url() {
        let cookie = cookie_at("http://WWW.Example.com/app/page", "sid=1");
        assert_eq!(cookie.domain(), "www.example.com");
        assert_eq!(cookie.path(), "/app/page");
        assert!(!cookie.secure());
        assert!(!cookie.http_only());
        assert_eq!(cookie.version(), 1);
        assert!(!cookie.discard());
        assert_eq!(cookie.ports(), None);
        assert_eq!(cookie.expires(), None);
        assert_eq!(cookie.max_age(), None);
        assert_eq!(cookie.created_at(), CREATED);
    }

    #[test]
    fn test_explicit_attributes_win() {
        let cookie = cookie_at(
            "http://www.example.com/app/page",
            "sid=1; Domain=example.com; Path=/; Version=0; Secure",
        );
        assert_eq!(cookie.domain(), ".example.com");
        assert_eq!(cookie.path(), "/");
        assert_eq!(cookie.version(), 0);
        assert!(cookie.secure());
        assert_eq!(
            cookie.identity(),
            ("sid", ".example.com", "/")
        );
    }

    #[test]
    fn test_ip_host_default() {
        let cookie = cookie_at("http://[::1]:8080/", "a=1");
        assert_eq!(cookie.domain(), "::1");
        assert!(cookie.request_match(&url("http://[::1]:8080/x")));
    }

    #[test]
    fn test_bare_port_binds_request_port() {
        let cookie = cookie_at("http://example.com:8080/", "a=1; Port");
        assert_eq!(cookie.ports(), Some(&[8080][..]));

        let default_port = cookie_at("https://example.com/", "a=1; Port");
        assert_eq!(default_port.ports(), Some(&[443][..]));
    }

    #[test]
    fn test_parse_str() {
        let cookie = CanonicalCookie::parse_str("http://example.com/app", "a=1; Secure")
            .unwrap()
            .unwrap();
        assert_eq!(cookie.domain(), "example.com");
        assert!(cookie.secure());

        assert_eq!(
            CanonicalCookie::parse_str("not a url", "a=1").unwrap_err(),
            NetError::InvalidUrl
        );
    }

    #[test]
    fn test_missing_host() {
        let parsed = parser::parse("a=1").next().unwrap().unwrap();
        let err = CanonicalCookie::build(&url("data:text/plain,hello"), parsed).unwrap_err();
        assert_eq!(err, NetError::UrlMissingHost);
    }

    #[test]
    fn test_max_age_takes_precedence() {
        let cookie = cookie_at(
            "http://example.com/",
            "a=1; Expires=Wed, 13 Jan 2021 22:23:01 GMT; Max-Age=60",
        );
        assert_eq!(cookie.expires_at(), Some(CREATED + Duration::seconds(60)));
    }

    #[test]
    fn test_expires_used_without_max_age() {
        let cookie = cookie_at("http://example.com/", "a=1; Expires=Wed, 13 Jan 2021 22:23:01 GMT");
        assert_eq!(cookie.expires_at(), Some(datetime!(2021-01-13 22:23:01 UTC)));
        assert!(cookie.is_expired_at(CREATED));
        assert!(cookie.is_expired());
        assert!(!cookie.is_session());
    }

    #[test]
    fn test_max_age_zero_expires() {
        let cookie = cookie_at("http://example.com/", "a=1; Max-Age=0");
        assert!(!cookie.is_expired_at(CREATED));
        assert!(cookie.is_expired_at(CREATED + Duration::seconds(1)));
    }

    #[test]
    fn test_negative_max_age() {
        let cookie = cookie_at("http://example.com/", "a=1; Max-Age=-10");
        assert!(cookie.is_expired_at(CREATED));
    }

    #[test]
    fn test_huge_max_age_saturates() {
        let cookie = cookie_at("http://example.com/", "a=1; Max-Age=9223372036854775807");
        assert_eq!(cookie.expires_at(), Some(PrimitiveDateTime::MAX.assume_utc()));
        assert!(!cookie.is_expired_at(CREATED));
    }

    #[test]
    fn test_session_cookie() {
        let cookie = cookie_at("http://example.com/", "a=1");
        assert!(cookie.is_session());
        assert!(!cookie.is_expired());
        assert!(!cookie.is_expired_at(datetime!(9999-12-31 23:59:59 UTC)));
    }

    #[test]
    fn test_discard_makes_session() {
        let cookie = cookie_at("http://example.com/", "a=1; Max-Age=3600; Discard");
        assert!(cookie.is_session());
    }

    #[test]
    fn test_unparsable_expires_is_session() {
        let cookie = cookie_at("http://example.com/", "a=1; Expires=whenever");
        assert_eq!(cookie.expires(), None);
        assert!(cookie.is_session());
    }

    #[test]
    fn test_display() {
        assert_eq!(cookie_at("http://example.com/", "name=value").to_string(), "name=value");
        assert_eq!(
            cookie_at("http://example.com/", r#"name="val\"ue""#).to_string(),
            r#"name="val\"ue""#
        );
    }

    #[test]
    fn test_path_match() {
        let cookie = cookie_at("http://example.com/", "a=1; Path=/tec");
        assert!(cookie.path_match("/tec"));
        assert!(cookie.path_match("/tec/waldo"));
        assert!(cookie.path_match("/technology"));
        assert!(!cookie.path_match("/other"));
        assert!(!cookie.path_match("/"));
    }

    #[test]
    fn test_domain_match_exact() {
        let cookie = with_domain("example.com");
        assert!(cookie.domain_match("example.com"));
        assert!(cookie.domain_match("EXAMPLE.com"));
        assert!(!cookie.domain_match("www.example.com"));
        assert!(!cookie.domain_match("other.com"));
    }

    #[test]
    fn test_domain_match_dotted() {
        let cookie = with_domain(".example.com");
        assert!(cookie.domain_match("example.com"));
        assert!(cookie.domain_match("www.example.com"));
        assert!(cookie.domain_match("WWW.EXAMPLE.COM"));
        assert!(!cookie.domain_match("a.b.example.com"));
        assert!(!cookie.domain_match("evilexample.com"));
        assert!(!cookie.domain_match("example.org"));
    }

    #[test]
    fn test_domain_match_ip() {
        let cookie = with_domain("192.168.0.1");
        assert!(cookie.domain_match("192.168.0.1"));
        assert!(!cookie.domain_match("192.168.0.2"));

        let dotted = with_domain(".0.1");
        assert!(!dotted.domain_match("192.168.0.1"));
    }

    #[test]
    fn test_domain_match_dotless() {
        let cookie = with_domain("localhost");
        assert!(cookie.domain_match("localhost"));
        assert!(!cookie.domain_match("foo.localhost"));

        let local = with_domain(".intranet.local");
        assert!(local.domain_match("intranet.local"));
        assert!(local.domain_match("www.intranet.local"));

        let bare_local = cookie_at("http://local/", "a=1");
        assert_eq!(bare_local.domain(), "local");
        assert!(bare_local.domain_match("local"));
        assert!(!bare_local.domain_match("foo.local"));
    }

    #[test]
    fn test_ipv6_domain_attribute_matches_setting_host() {
        let bracketed = cookie_at("http://[::1]/", "a=1; Domain=[::1]; Path=/");
        assert_eq!(bracketed.domain(), "[::1]");
        assert!(bracketed.request_match(&url("http://[::1]/")));
        assert!(!bracketed.request_match(&url("http://[::2]/")));

        let upper = cookie_at("http://[fe80::1]/", "a=1; Domain=FE80::1; Path=/");
        assert_eq!(upper.domain(), "FE80::1");
        assert!(upper.request_match(&url("http://[fe80::1]/")));
        assert!(upper.domain_match("FE80:0:0:0:0:0:0:1"));
        assert!(!upper.domain_match("fe80::1.example.com"));
    }

    #[test]
    fn test_port_match() {
        let cookie = cookie_at("http://example.com/", r#"a=1; Port="80,8080""#);
        assert!(cookie.port_match(80));
        assert!(cookie.port_match(8080));
        assert!(!cookie.port_match(443));

        let any = cookie_at("http://example.com/", "a=1");
        assert!(any.port_match(443));
        assert!(any.port_match(1));
    }

    #[test]
    fn test_request_match() {
        let cookie = cookie_at(
            "http://www.example.com/app/",
            r#"a=1; Domain=.example.com; Path=/app; Port="80,8080""#,
        );
        assert!(cookie.request_match(&url("http://www.example.com/app/page")));
        assert!(cookie.request_match(&url("http://shop.example.com:8080/app")));
        assert!(!cookie.request_match(&url("https://www.example.com/app/page")));
        assert!(!cookie.request_match(&url("http://www.example.com/other")));
        assert!(!cookie.request_match(&url("http://www.example.org/app")));
    }

    #[test]
    fn test_serde_roundtrip_keeps_timestamps() {
        let cookie = cookie_at(
            "http://example.com/",
            "a=1; Expires=Wed, 13 Jan 2021 22:23:01 GMT; SameSite=Lax",
        );
        let json = serde_json::to_string(&cookie).unwrap();
        assert!(json.contains("2021-01-13T22:23:01Z"));
        let back: CanonicalCookie = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cookie);
    }
}
