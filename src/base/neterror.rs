use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetError {
    // URL Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("URL has no host to scope cookies to")]
    UrlMissingHost,

    // Set-Cookie Errors
    #[error("Invalid Set-Cookie header format: unbalanced quotes ({quote}) at byte {position}")]
    UnbalancedQuotes { quote: char, position: usize },
    #[error("Invalid Set-Cookie header format: missing '=' in cookie pair at byte {position}")]
    MissingNameValueSeparator { position: usize },
    #[error("Invalid Set-Cookie header format: empty cookie name at byte {position}")]
    EmptyCookieName { position: usize },
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::InvalidUrl => -300,
            // Cookie parsing errors (custom codes starting at -910)
            NetError::UrlMissingHost => -910,
            NetError::UnbalancedQuotes { .. } => -911,
            NetError::MissingNameValueSeparator { .. } => -912,
            NetError::EmptyCookieName { .. } => -913,
        }
    }

    /// True for errors raised while scanning a `Set-Cookie` header.
    ///
    /// The whole header segment is rejected; cookies already yielded from the
    /// same header stay valid.
    pub fn is_malformed_header(&self) -> bool {
        matches!(
            self,
            NetError::UnbalancedQuotes { .. }
                | NetError::MissingNameValueSeparator { .. }
                | NetError::EmptyCookieName { .. }
        )
    }

    /// Byte offset into the header where scanning failed, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            NetError::UnbalancedQuotes { position, .. }
            | NetError::MissingNameValueSeparator { position }
            | NetError::EmptyCookieName { position } => Some(*position),
            _ => None,
        }
    }
}

impl From<url::ParseError> for NetError {
    fn from(_: url::ParseError) -> Self {
        NetError::InvalidUrl
    }
}
