//! Configuration types for archive parsing.
//!
//! This module provides plain configuration structs for library usage,
//! without any CLI framework dependencies.
//!
//! - [`ParserConfig`] - everything one parse run needs to know
//! - [`TimezoneHints`] - user-supplied offsets for ambiguous abbreviations
//!
//! # Example
//!
//! ```rust
//! use fbchat_history::config::{ParserConfig, TimezoneHints};
//! use fbchat_history::progress::stderr_progress;
//!
//! # fn main() -> fbchat_history::Result<()> {
//! let hints: TimezoneHints = "PST=-0800,PDT=-0700".parse()?;
//!
//! let config = ParserConfig::new()
//!     .with_utc(true)
//!     .with_timezone_hints(hints)
//!     .with_thread_filter("Billy, Steve Smith")
//!     .with_progress(stderr_progress());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::filter::ThreadFilter;
use crate::error::ChatError;
use crate::progress::ProgressCallback;
use crate::resolver::{IdentityResolver, NameResolver};

/// A UTC offset as `(hours, minutes)`, both carrying the offset's sign.
pub type Offset = (i32, i32);

/// Offsets supplied by the user for timezone abbreviations.
///
/// Hints take precedence over the built-in abbreviation table, which is how
/// an [`AmbiguousTimezone`](ChatError::AmbiguousTimezone) error is resolved.
///
/// # Example
///
/// ```rust
/// use fbchat_history::config::TimezoneHints;
///
/// let hints: TimezoneHints = "PST=-0800, IST=+0530".parse().unwrap();
/// assert_eq!(hints.get("PST"), Some((-8, 0)));
/// assert_eq!(hints.get("IST"), Some((5, 30)));
/// assert_eq!(hints.get("CDT"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneHints {
    offsets: BTreeMap<String, Offset>,
}

impl TimezoneHints {
    /// Creates an empty hint table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hint for `abbreviation`.
    #[must_use]
    pub fn with_hint(mut self, abbreviation: impl Into<String>, hours: i32, minutes: i32) -> Self {
        self.offsets.insert(abbreviation.into(), (hours, minutes));
        self
    }

    /// Looks up the offset hinted for `abbreviation`.
    pub fn get(&self, abbreviation: &str) -> Option<Offset> {
        self.offsets.get(abbreviation).copied()
    }

    /// Number of hints.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns `true` if there are no hints.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

fn hint_re() -> &'static Regex {
    static HINT_RE: OnceLock<Regex> = OnceLock::new();
    HINT_RE.get_or_init(|| {
        Regex::new(r"^([^=\s]+)=([+-])(\d{2}):?(\d{2})$").expect("valid timezone hint regex")
    })
}

impl FromStr for TimezoneHints {
    type Err = ChatError;

    /// Parses `TZ=±HHMM[,TZ=±HHMM...]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut hints = Self::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let caps = hint_re()
                .captures(entry)
                .ok_or_else(|| ChatError::invalid_hint(entry))?;
            let sign = if &caps[2] == "-" { -1 } else { 1 };
            let hours: i32 = caps[3].parse().map_err(|_| ChatError::invalid_hint(entry))?;
            let minutes: i32 = caps[4].parse().map_err(|_| ChatError::invalid_hint(entry))?;
            if minutes >= 60 {
                return Err(ChatError::invalid_hint(entry));
            }
            hints.offsets.insert(caps[1].to_string(), (sign * hours, sign * minutes));
        }
        Ok(hints)
    }
}

/// Configuration for one parse run.
///
/// The default produces timestamps with the archive's own fixed offsets,
/// records every thread, reports no progress and keeps names as they appear.
#[derive(Clone)]
pub struct ParserConfig {
    /// Convert every timestamp to UTC (default: false)
    pub use_utc: bool,

    /// Offsets for ambiguous timezone abbreviations
    pub timezone_hints: TimezoneHints,

    /// Only record threads matching this filter
    pub thread_filter: ThreadFilter,

    /// Receives one event per thread fragment
    pub progress: Option<ProgressCallback>,

    /// Turns raw identifiers into display names
    pub name_resolver: Arc<dyn NameResolver>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            use_utc: false,
            timezone_hints: TimezoneHints::default(),
            thread_filter: ThreadFilter::default(),
            progress: None,
            name_resolver: Arc::new(IdentityResolver),
        }
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("use_utc", &self.use_utc)
            .field("timezone_hints", &self.timezone_hints)
            .field("thread_filter", &self.thread_filter)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

impl ParserConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables UTC output.
    #[must_use]
    pub fn with_utc(mut self, enabled: bool) -> Self {
        self.use_utc = enabled;
        self
    }

    /// Sets the timezone hints.
    #[must_use]
    pub fn with_timezone_hints(mut self, hints: TimezoneHints) -> Self {
        self.timezone_hints = hints;
        self
    }

    /// Sets the thread filter from comma-separated name fragments.
    #[must_use]
    pub fn with_thread_filter(mut self, filter: &str) -> Self {
        self.thread_filter = ThreadFilter::new(filter.split(','));
        self
    }

    /// Sets an already built thread filter.
    #[must_use]
    pub fn with_filter(mut self, filter: ThreadFilter) -> Self {
        self.thread_filter = filter;
        self
    }

    /// Sets the progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Sets the name resolver.
    #[must_use]
    pub fn with_name_resolver(mut self, resolver: impl NameResolver + 'static) -> Self {
        self.name_resolver = Arc::new(resolver);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints_parse_multiple() {
        let hints: TimezoneHints = "PST=-0800,PDT=-0700".parse().unwrap();
        assert_eq!(hints.len(), 2);
        assert_eq!(hints.get("PST"), Some((-8, 0)));
        assert_eq!(hints.get("PDT"), Some((-7, 0)));
    }

    #[test]
    fn test_hints_sign_applies_to_minutes() {
        let hints: TimezoneHints = "NST=-0330".parse().unwrap();
        assert_eq!(hints.get("NST"), Some((-3, -30)));
    }

    #[test]
    fn test_hints_accept_colon() {
        let hints: TimezoneHints = "IST=+05:30".parse().unwrap();
        assert_eq!(hints.get("IST"), Some((5, 30)));
    }

    #[test]
    fn test_hints_empty_input() {
        let hints: TimezoneHints = "".parse().unwrap();
        assert!(hints.is_empty());
    }

    #[test]
    fn test_hints_invalid() {
        for bad in ["PST", "PST=0800", "PST=-08", "=-0800", "PST=-0875", "PST=banana"] {
            let err = bad.parse::<TimezoneHints>().unwrap_err();
            assert!(
                matches!(err, ChatError::InvalidTimezoneHint { .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = ParserConfig::default();
        assert!(!config.use_utc);
        assert!(config.timezone_hints.is_empty());
        assert!(!config.thread_filter.is_active());
        assert!(config.progress.is_none());
        assert_eq!(config.name_resolver.resolve("x"), "x");
    }

    #[test]
    fn test_config_builder() {
        let config = ParserConfig::new()
            .with_utc(true)
            .with_timezone_hints(TimezoneHints::new().with_hint("CDT", -5, 0))
            .with_thread_filter("Billy,  Steve Smith");

        assert!(config.use_utc);
        assert_eq!(config.timezone_hints.get("CDT"), Some((-5, 0)));
        assert_eq!(config.thread_filter.fragments(), ["billy", "steve smith"]);
    }

    #[test]
    fn test_config_debug_hides_callbacks() {
        let debug = format!("{:?}", ParserConfig::new());
        assert!(debug.contains("use_utc"));
        assert!(debug.contains("progress: false"));
    }

    #[test]
    fn test_hints_serde_roundtrip() {
        let hints = TimezoneHints::new().with_hint("PDT", -7, 0);
        let json = serde_json::to_string(&hints).unwrap();
        let back: TimezoneHints = serde_json::from_str(&json).unwrap();
        assert_eq!(hints, back);
    }
}
