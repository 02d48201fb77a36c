//! `Set-Cookie` header scanner.
//!
//! A single pass over the header driven by an explicit stack of [`State`]s.
//! A quote anywhere in the cookie value before `;` opens a quoted value;
//! attribute values are quoted only when they start with a quote. Either way
//! the quoted state is pushed on top of the state that owns it and popped
//! once the closing quote is found.
//!
//! ```text
//! CookieName -> CookieValue -> PlainValue | QuotedValue
//!            -> CookieAttributes <-> AttributeValue | QuotedAttributeValue
//! ```
//!
//! Some servers join several cookies into one header with commas. A bare
//! comma outside quotes ends the current cookie, except inside an `Expires`
//! date (`Wed, 13-Jan-2021 ...`) or an unquoted `Port` list (`80,8080`).
//!
//! Cookies are yielded as soon as they are complete, so a malformed cookie
//! late in a header does not discard the ones before it.

use crate::base::neterror::NetError;
use crate::cookies::attributes::{AttributeName, CookieAttributes};
use crate::cookies::config::ParserConfig;
use std::iter::FusedIterator;

const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// One cookie as written in the header, before URL defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCookie {
    pub key: String,
    pub value: String,
    pub attributes: CookieAttributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Double,
    Single,
}

impl Quote {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '"' => Some(Quote::Double),
            '\'' => Some(Quote::Single),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    CookieName,
    CookieValue,
    PlainValue,
    QuotedValue(Quote),
    CookieAttributes,
    AttributeValue,
    QuotedAttributeValue(Quote),
}

/// Per-cookie accumulator, reset at every batch separator.
#[derive(Debug, Default)]
struct Accumulator {
    key: String,
    value: String,
    attributes: CookieAttributes,
    current_attribute: String,
}

impl Accumulator {
    fn finish(self) -> ParsedCookie {
        ParsedCookie {
            key: self.key,
            value: self.value,
            attributes: self.attributes,
        }
    }
}

/// Parse a `Set-Cookie` header value with the default configuration.
pub fn parse(header: &str) -> CookieParser<'_> {
    CookieParser::new(header)
}

/// Lazy iterator over the cookies of one `Set-Cookie` header value.
///
/// After an error the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct CookieParser<'a> {
    input: &'a str,
    pos: usize,
    config: ParserConfig,
    emitted: usize,
    done: bool,
}

impl<'a> CookieParser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_config(input, ParserConfig::default())
    }

    pub fn with_config(input: &'a str, config: ParserConfig) -> Self {
        Self {
            input,
            pos: 0,
            config,
            emitted: 0,
            done: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Skip blanks and stray separators between cookies.
    fn skip_separators(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == ';');
        self.pos += rest.len() - trimmed.len();
    }

    fn is_batch_separator(&self, c: char) -> bool {
        c == ',' && self.config.split_batches
    }

    /// Offset of the next `;`, batch comma, or end of input.
    fn find_delimiter(&self) -> usize {
        self.rest()
            .find(|c: char| c == ';' || self.is_batch_separator(c))
            .unwrap_or(self.rest().len())
    }

    /// Drop anything between a closing quote and the next delimiter.
    fn skip_to_delimiter(&mut self) {
        let end = self.find_delimiter();
        let junk = self.rest()[..end].trim();
        if !junk.is_empty() {
            tracing::debug!(junk = %junk, "ignoring text after quoted cookie value");
        }
        self.pos += end;
    }

    /// Scan a quoted string whose opening quote is at `self.pos`.
    fn scan_quoted(&mut self, quote: Quote) -> Result<String, NetError> {
        let open = self.pos;
        self.pos += 1;
        let rest = self.rest();
        let close = find_closing_quote(rest, quote.as_char()).ok_or(NetError::UnbalancedQuotes {
            quote: quote.as_char(),
            position: open,
        })?;
        let value = unescape_quotes(&rest[..close], quote.as_char());
        self.pos += close + 1;
        self.skip_to_delimiter();
        Ok(value)
    }

    /// End offset of an unquoted attribute value.
    fn attribute_value_end(&self, attr: Option<AttributeName>) -> usize {
        let rest = self.rest();
        for (idx, c) in rest.char_indices() {
            if c == ';' {
                return idx;
            }
            if self.is_batch_separator(c) && comma_separates(attr, &rest[..idx], &rest[idx + 1..]) {
                return idx;
            }
        }
        rest.len()
    }

    fn next_cookie(&mut self) -> Result<ParsedCookie, NetError> {
        let mut cookie = Accumulator::default();
        let mut stack = vec![State::CookieName];

        while let Some(state) = stack.last().copied() {
            match state {
                State::CookieName => {
                    let start = self.pos;
                    let rest = self.rest();
                    let idx = rest
                        .find(|c: char| c == '=' || c == ';' || self.is_batch_separator(c))
                        .filter(|&idx| rest[idx..].starts_with('='))
                        .ok_or(NetError::MissingNameValueSeparator {
                            position: start + self.find_delimiter(),
                        })?;
                    let name = rest[..idx].trim();
                    if name.is_empty() {
                        return Err(NetError::EmptyCookieName { position: start });
                    }
                    cookie.key = name.to_string();
                    self.pos += idx + 1;
                    self.skip_whitespace();
                    stack.pop();
                    stack.push(State::CookieValue);
                }
                State::CookieValue => {
                    stack.pop();
                    let opening = self
                        .rest()
                        .char_indices()
                        .take_while(|&(_, c)| c != ';' && !self.is_batch_separator(c))
                        .find_map(|(idx, c)| Quote::from_char(c).map(|quote| (idx, quote)));
                    match opening {
                        Some((idx, quote)) => {
                            self.pos += idx;
                            stack.push(State::QuotedValue(quote));
                        }
                        None => stack.push(State::PlainValue),
                    }
                }
                State::PlainValue => {
                    let end = self.find_delimiter();
                    cookie.value = self.rest()[..end].trim_end().to_string();
                    self.pos += end;
                    stack.pop();
                    stack.push(State::CookieAttributes);
                }
                State::QuotedValue(quote) => {
                    cookie.value = self.scan_quoted(quote)?;
                    stack.pop();
                    stack.push(State::CookieAttributes);
                }
                State::CookieAttributes => {
                    self.skip_whitespace();
                    match self.peek() {
                        None => {
                            stack.pop();
                        }
                        Some(c) if self.is_batch_separator(c) => {
                            self.pos += 1;
                            stack.pop();
                        }
                        Some(';') => {
                            self.pos += 1;
                            self.skip_whitespace();
                            let rest = self.rest();
                            let idx = rest
                                .find(|c: char| c == '=' || c == ';' || self.is_batch_separator(c))
                                .unwrap_or(rest.len());
                            let name = rest[..idx].trim();

                            if rest[idx..].starts_with('=') {
                                cookie.current_attribute = name.to_string();
                                self.pos += idx + 1;
                                self.skip_whitespace();
                                match self.peek().and_then(Quote::from_char) {
                                    Some(quote) => stack.push(State::QuotedAttributeValue(quote)),
                                    None => stack.push(State::AttributeValue),
                                }
                            } else {
                                if !name.is_empty() {
                                    cookie.attributes.set_flag(name, &self.config);
                                }
                                self.pos += idx;
                            }
                        }
                        Some(_) => self.skip_to_delimiter(),
                    }
                }
                State::AttributeValue => {
                    let attr = AttributeName::from_raw(&cookie.current_attribute);
                    let end = self.attribute_value_end(attr);
                    let value = self.rest()[..end].trim();
                    cookie
                        .attributes
                        .set_value(&cookie.current_attribute, value, &self.config);
                    self.pos += end;
                    stack.pop();
                }
                State::QuotedAttributeValue(quote) => {
                    let value = self.scan_quoted(quote)?;
                    cookie
                        .attributes
                        .set_value(&cookie.current_attribute, &value, &self.config);
                    stack.pop();
                }
            }
        }

        let parsed = cookie.finish();
        tracing::debug!(name = %parsed.key, "parsed Set-Cookie entry");
        Ok(parsed)
    }
}

impl Iterator for CookieParser<'_> {
    type Item = Result<ParsedCookie, NetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.skip_separators();
        if self.pos >= self.input.len() {
            self.done = true;
            return None;
        }
        if self.emitted >= self.config.max_cookies_per_header {
            tracing::warn!(
                limit = self.config.max_cookies_per_header,
                "ignoring cookies past the per-header limit"
            );
            self.done = true;
            return None;
        }

        match self.next_cookie() {
            Ok(cookie) => {
                self.emitted += 1;
                Some(Ok(cookie))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for CookieParser<'_> {}

/// Decide whether a comma inside an unquoted attribute value starts a new cookie.
fn comma_separates(attr: Option<AttributeName>, before: &str, after: &str) -> bool {
    match attr {
        Some(AttributeName::Expires) => !is_weekday_token(before),
        Some(AttributeName::Ports) => !after.trim_start().starts_with(|c: char| c.is_ascii_digit()),
        _ => true,
    }
}

/// `Wed` or `Wednesday`: the only text a date carries before its comma.
fn is_weekday_token(text: &str) -> bool {
    let text = text.trim();
    text.len() >= 3
        && text.bytes().all(|b| b.is_ascii_alphabetic())
        && WEEKDAYS
            .iter()
            .any(|day| text[..3].eq_ignore_ascii_case(day))
}

/// Index of the first `quote` not escaped by a backslash.
fn find_closing_quote(text: &str, quote: char) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Some(idx);
        }
    }
    None
}

fn unescape_quotes(text: &str, quote: char) -> String {
    let escaped = format!("\\{quote}");
    text.replace(&escaped, &quote.to_string())
}
