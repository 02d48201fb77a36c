//! `Expires` date parsing.
//!
//! Servers send cookie dates in a handful of historical layouts. Four are
//! accepted, tried in order:
//!
//! | Layout | Example |
//! |--------|---------|
//! | `EEE, dd-MMM-yy HH:mm:ss zzz` | `Wed, 13-Jan-21 22:23:01 GMT` |
//! | `EEE, dd-MMM-yyyy HH:mm:ss zzz` | `Wed, 13-Jan-2021 22:23:01 GMT` |
//! | `EEE, dd MMM yy HH:mm:ss zzz` | `Wed, 13 Jan 21 22:23:01 GMT` |
//! | `EEE, dd MMM yyyy HH:mm:ss zzz` | `Wed, 13 Jan 2021 22:23:01 GMT` (RFC 1123) |
//!
//! Anything else yields `None`; an unparsable date never fails the cookie.

use crate::cookies::config::ParserConfig;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Every layout is rewritten into this shape before parsing.
const CANONICAL: &[BorrowedFormatItem<'static>] = format_description!(
    "[day]-[month repr:short case_sensitive:false]-[year] [hour]:[minute]:[second]"
);

const NUMERIC_OFFSET: &[BorrowedFormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory][offset_minute]");

#[derive(Debug, Clone, Copy)]
struct DateLayout {
    separator: char,
    year_digits: usize,
}

const LAYOUTS: [DateLayout; 4] = [
    DateLayout {
        separator: '-',
        year_digits: 2,
    },
    DateLayout {
        separator: '-',
        year_digits: 4,
    },
    DateLayout {
        separator: ' ',
        year_digits: 2,
    },
    DateLayout {
        separator: ' ',
        year_digits: 4,
    },
];

impl DateLayout {
    /// Parse `dd?MMM?yy[yy] HH:mm:ss`, where `?` is the layout separator.
    fn parse(&self, stamp: &str, config: &ParserConfig) -> Option<PrimitiveDateTime> {
        let mut fields = stamp.splitn(3, self.separator);
        let day = fields.next()?;
        let month = fields.next()?;
        let (year, clock) = fields.next()?.split_once(' ')?;

        if year.len() != self.year_digits || !year.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year = if self.year_digits == 2 {
            config.expand_year(year.parse().ok()?)
        } else {
            year.parse().ok()?
        };

        let canonical = format!("{day}-{month}-{year:04} {}", clock.trim());
        PrimitiveDateTime::parse(&canonical, CANONICAL).ok()
    }
}

/// Parse an `Expires` attribute value with the default configuration.
pub fn parse_expires(value: &str) -> Option<OffsetDateTime> {
    parse_expires_with(value, &ParserConfig::default())
}

/// Parse an `Expires` attribute value.
///
/// The result is normalised to UTC.
pub fn parse_expires_with(value: &str, config: &ParserConfig) -> Option<OffsetDateTime> {
    let (weekday, rest) = value.trim().split_once(',')?;
    if weekday.is_empty() || !weekday.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }

    let (stamp, zone) = rest.trim().rsplit_once(' ')?;
    let offset = parse_zone(zone)?;

    LAYOUTS
        .iter()
        .find_map(|layout| layout.parse(stamp.trim(), config))
        .map(|datetime| datetime.assume_offset(offset).to_offset(UtcOffset::UTC))
}

/// Resolve a `zzz` zone: GMT/UTC, the RFC 822 US zones, or `+hhmm`.
fn parse_zone(zone: &str) -> Option<UtcOffset> {
    let hours = match zone.to_ascii_uppercase().as_str() {
        "GMT" | "UTC" | "UT" | "Z" => 0,
        "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ => return UtcOffset::parse(zone, NUMERIC_OFFSET).ok(),
    };
    UtcOffset::from_hms(hours, 0, 0).ok()
}
