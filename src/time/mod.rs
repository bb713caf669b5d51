//! Timestamp normalization.
//!
//! Archive timestamps look like `Sunday, December 4, 2016 at 1:54pm PDT` or
//! `4. prosinec 2016 v 13:54 UTC+01`: a localized date and time followed by
//! either an explicit `UTC±HH[:MM]` offset or a timezone abbreviation.
//!
//! The offset is resolved first:
//!
//! 1. explicit `UTC±HH[:MM]` offsets are used as written
//! 2. user [`TimezoneHints`] come next
//! 3. the abbreviation table built from the IANA database comes last; an
//!    abbreviation in use with several offsets fails with
//!    [`ChatError::AmbiguousTimezone`]
//!
//! The date and time are then tried against every known language template.
//! A [`TimestampParser`] remembers which template worked and tries it first
//! next time, since one archive is always written in one language.
//!
//! ```
//! use fbchat_history::config::TimezoneHints;
//! use fbchat_history::time::parse_timestamp;
//!
//! let ts = parse_timestamp("Sunday, December 4, 2016 at 1:54pm PDT", true, &TimezoneHints::new())?;
//! assert_eq!(ts.to_rfc3339(), "2016-12-04T20:54:00+00:00");
//! # Ok::<(), fbchat_history::ChatError>(())
//! ```

pub mod locales;
pub mod zones;

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset as _, Utc};
use regex::Regex;

use crate::config::{Offset, TimezoneHints};
use crate::error::{ChatError, OffsetCandidate, Result};
use locales::date_parsers;
use zones::zone_table;

const MIN_OFFSET_SECONDS: i32 = -12 * 3600;
const MAX_OFFSET_SECONDS: i32 = 14 * 3600;

fn utc_offset_re() -> &'static Regex {
    static UTC_OFFSET_RE: OnceLock<Regex> = OnceLock::new();
    UTC_OFFSET_RE.get_or_init(|| {
        Regex::new(r"^UTC([+-])(\d{1,2})(?::(\d{2}))?$").expect("valid utc offset regex")
    })
}

/// Parses `UTC+8`, `UTC-07` or `UTC+05:30`.
fn parse_utc_offset(token: &str) -> Option<Offset> {
    let caps = utc_offset_re().captures(token)?;
    let sign = if &caps[1] == "-" { -1 } else { 1 };
    let hours: i32 = caps[2].parse().ok()?;
    let minutes: i32 = caps.get(3).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    Some((sign * hours, sign * minutes))
}

/// Per-parse timestamp session.
///
/// Holds the adaptive template order; two sessions never influence each
/// other.
#[derive(Debug, Clone)]
pub struct TimestampParser {
    use_utc: bool,
    hints: TimezoneHints,
    order: Vec<usize>,
}

impl TimestampParser {
    /// Creates a session.
    pub fn new(use_utc: bool, hints: TimezoneHints) -> Self {
        Self {
            use_utc,
            hints,
            order: (0..date_parsers().len()).collect(),
        }
    }

    /// Identifier of the template that will be tried first.
    pub fn preferred_template(&self) -> &'static str {
        self.order
            .first()
            .map_or("", |&i| date_parsers()[i].id())
    }

    /// Resolves a timezone token to an offset.
    pub fn resolve_offset(&self, token: &str, raw: &str) -> Result<Offset> {
        if let Some(offset) = parse_utc_offset(token) {
            return Ok(offset);
        }
        if let Some(offset) = self.hints.get(token) {
            return Ok(offset);
        }

        let candidates = zone_table()
            .get(token)
            .ok_or_else(|| ChatError::unexpected_time_format(raw))?;
        let mut offsets = candidates.keys();
        match (offsets.next(), offsets.next()) {
            (Some(&offset), None) => Ok(offset),
            (None, _) => Err(ChatError::unexpected_time_format(raw)),
            (Some(_), Some(_)) => Err(ChatError::AmbiguousTimezone {
                abbreviation: token.to_string(),
                candidates: candidates
                    .iter()
                    .map(|(&(hours, minutes), regions)| OffsetCandidate {
                        hours,
                        minutes,
                        regions: regions.iter().cloned().collect(),
                    })
                    .collect(),
            }),
        }
    }

    /// Parses the localized date and time part.
    pub fn parse_local(&mut self, text: &str) -> Option<NaiveDateTime> {
        let parsers = date_parsers();
        let (position, parsed) = self
            .order
            .iter()
            .enumerate()
            .find_map(|(pos, &i)| parsers[i].parse(text).map(|dt| (pos, dt)))?;
        if position > 0 {
            let index = self.order.remove(position);
            self.order.insert(0, index);
        }
        Some(parsed)
    }

    /// Parses a full archive timestamp.
    pub fn parse(&mut self, raw: &str) -> Result<DateTime<FixedOffset>> {
        let raw = raw.trim();
        let (text, token) = raw
            .rsplit_once(' ')
            .ok_or_else(|| ChatError::unexpected_time_format(raw))?;

        let (hours, minutes) = self.resolve_offset(token, raw)?;
        let seconds = hours * 3600 + minutes * 60;

        let naive = self
            .parse_local(text)
            .ok_or_else(|| ChatError::unexpected_time_format(raw))?;

        if !self.use_utc && !(MIN_OFFSET_SECONDS..=MAX_OFFSET_SECONDS).contains(&seconds) {
            return Err(ChatError::OffsetOutOfRange {
                hours,
                minutes: minutes.abs(),
            });
        }
        let offset = FixedOffset::east_opt(seconds).ok_or(ChatError::OffsetOutOfRange {
            hours,
            minutes: minutes.abs(),
        })?;
        let local = naive
            .and_local_timezone(offset)
            .single()
            .ok_or_else(|| ChatError::unexpected_time_format(raw))?;

        if self.use_utc {
            Ok(local.with_timezone(&Utc.fix()))
        } else {
            Ok(local)
        }
    }
}

/// Parses one timestamp with a fresh session.
pub fn parse_timestamp(
    raw: &str,
    use_utc: bool,
    hints: &TimezoneHints,
) -> Result<DateTime<FixedOffset>> {
    TimestampParser::new(use_utc, hints.clone()).parse(raw)
}
