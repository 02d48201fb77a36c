//! `Set-Cookie` parser configuration.

/// Scanner configuration for [`CookieParser`](super::parser::CookieParser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Treat a bare comma outside quotes and dates as a cookie separator
    pub split_batches: bool,
    /// Keep unrecognised attributes as extensions instead of dropping them
    pub preserve_extensions: bool,
    /// Two-digit years below the pivot map to 20yy, the rest to 19yy
    pub two_digit_year_pivot: u8,
    /// Cookies past this count in a single header are ignored. Unlimited by default.
    pub max_cookies_per_header: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            split_batches: true,
            preserve_extensions: true,
            two_digit_year_pivot: 69,
            max_cookies_per_header: usize::MAX,
        }
    }
}

impl ParserConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable comma-joined cookie batches.
    pub fn split_batches(mut self, enable: bool) -> Self {
        self.split_batches = enable;
        self
    }

    /// Enable or disable extension attribute passthrough.
    pub fn preserve_extensions(mut self, enable: bool) -> Self {
        self.preserve_extensions = enable;
        self
    }

    /// Set the two-digit year pivot. Values above 99 are clamped.
    pub fn two_digit_year_pivot(mut self, pivot: u8) -> Self {
        self.two_digit_year_pivot = pivot.min(99);
        self
    }

    /// Set the per-header cookie limit.
    pub fn max_cookies_per_header(mut self, max: usize) -> Self {
        self.max_cookies_per_header = max;
        self
    }

    /// Expand a two-digit year using the configured pivot.
    pub(crate) fn expand_year(&self, two_digit: u8) -> i32 {
        let yy = i32::from(two_digit % 100);
        if two_digit < self.two_digit_year_pivot {
            2000 + yy
        } else {
            1900 + yy
        }
    }
}
