//! Unified error types for fbchat-history.
//!
//! This module provides a single [`ChatError`] enum that covers every fatal
//! condition a parse can end with. Conditions that are *not* errors (duplicate
//! thread fragments, messages without a sender) never show up here.
//!
//! # Error Handling Philosophy
//!
//! - **Library users** get typed errors they can match on
//! - **Application users** get clear, actionable error messages
//! - **Retryable conditions** ([`ChatError::AmbiguousTimezone`]) carry the data
//!   needed to collect a hint and re-run the parse

use std::fmt::Write as _;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for fbchat-history operations.
///
/// # Example
///
/// ```rust
/// use fbchat_history::error::Result;
/// use fbchat_history::ChatHistory;
///
/// fn my_function() -> Result<Option<ChatHistory>> {
///     // ... operations that may fail
///     Ok(None)
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatError>;

/// One candidate UTC offset for an ambiguous timezone abbreviation.
///
/// `hours` and `minutes` share the sign of the offset, so `-03:30` is stored
/// as `hours = -3, minutes = -30`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetCandidate {
    /// Hour component of the offset.
    pub hours: i32,
    /// Minute component of the offset.
    pub minutes: i32,
    /// Region names that use the abbreviation with this offset.
    pub regions: Vec<String>,
}

impl OffsetCandidate {
    /// Renders the offset in the `±HHMM` form accepted by timezone hints.
    pub fn as_hint(&self) -> String {
        let sign = if self.hours < 0 || self.minutes < 0 {
            '-'
        } else {
            '+'
        };
        format!("{}{:02}{:02}", sign, self.hours.abs(), self.minutes.abs())
    }
}

/// The error type for all fbchat-history operations.
///
/// Every variant is fatal for the current parse: no partial history is ever
/// returned alongside one of these.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatError {
    /// An I/O error occurred while reading the archive.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The tag tokenizer could not make sense of the document.
    #[error("Malformed markup: {0}")]
    Markup(#[from] quick_xml::Error),

    /// A thread file referenced from a split-format manifest does not exist.
    #[error(
        "Unable to locate the referenced chat file \"{}\". Make sure \"messages.htm\" \
         sits in an \"html/\" directory next to the \"messages/\" directory.",
        path.display()
    )]
    MissingReference {
        /// The resolved path that could not be opened
        path: PathBuf,
    },

    /// No locale or timezone rule matched a timestamp.
    #[error("Unexpected time format in \"{raw}\"")]
    UnexpectedTimeFormat {
        /// The raw timestamp text as it appeared in the archive
        raw: String,
    },

    /// A timezone abbreviation maps to more than one UTC offset.
    ///
    /// Supply a hint for `abbreviation` (see
    /// [`TimezoneHints`](crate::config::TimezoneHints)) and parse again.
    #[error("Ambiguous timezone offset found [{abbreviation}]")]
    AmbiguousTimezone {
        /// The abbreviation found in the archive (e.g. `CDT`)
        abbreviation: String,
        /// Every distinct offset in use by that abbreviation
        candidates: Vec<OffsetCandidate>,
    },

    /// None of the known document dialects could read the archive.
    #[error("No suitable parser found for this archive")]
    NoSuitableParser,

    /// A resolved UTC offset lies outside -12:00..=+14:00.
    #[error("Timezone offset {hours:+03}:{minutes:02} is outside the valid range")]
    OffsetOutOfRange {
        /// Hour component
        hours: i32,
        /// Minute component (absolute)
        minutes: i32,
    },

    /// A user-supplied timezone hint could not be parsed.
    #[error("Invalid timezone hint '{input}'. Expected format: TZ=+HHMM[,TZ=-HHMM...]")]
    InvalidTimezoneHint {
        /// The offending hint text
        input: String,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatError {
    /// Creates a missing reference error.
    pub fn missing_reference(path: impl Into<PathBuf>) -> Self {
        ChatError::MissingReference { path: path.into() }
    }

    /// Creates an unexpected time format error.
    pub fn unexpected_time_format(raw: impl Into<String>) -> Self {
        ChatError::UnexpectedTimeFormat { raw: raw.into() }
    }

    /// Creates an invalid timezone hint error.
    pub fn invalid_hint(input: impl Into<String>) -> Self {
        ChatError::InvalidTimezoneHint {
            input: input.into(),
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatError::Io(_))
    }

    /// Returns `true` if a split-format thread file was missing.
    pub fn is_missing_reference(&self) -> bool {
        matches!(self, ChatError::MissingReference { .. })
    }

    /// Returns `true` if a timestamp could not be understood.
    pub fn is_unexpected_time_format(&self) -> bool {
        matches!(self, ChatError::UnexpectedTimeFormat { .. })
    }

    /// Returns `true` if the parse can be retried with a timezone hint.
    pub fn is_ambiguous_timezone(&self) -> bool {
        matches!(self, ChatError::AmbiguousTimezone { .. })
    }

    /// Returns `true` if no dialect accepted the archive.
    pub fn is_no_suitable_parser(&self) -> bool {
        matches!(self, ChatError::NoSuitableParser)
    }

    /// Builds the user-facing instructions for resolving an ambiguous timezone.
    ///
    /// Returns `None` for every other variant.
    pub fn timezone_help(&self) -> Option<String> {
        let ChatError::AmbiguousTimezone {
            abbreviation,
            candidates,
        } = self
        else {
            return None;
        };

        let mut help = format!(
            "Ambiguous timezone offset found [{abbreviation}]. Please re-run the parser \
             with a TZ=OFFSET[,TZ=OFFSET2[,...]] hint (e.g. PST=-0800,PDT=-0700). \
             Your options are as follows:\n"
        );
        for candidate in candidates {
            let regions: Vec<&str> = candidate.regions.iter().take(3).map(String::as_str).collect();
            let _ = writeln!(
                help,
                " -> [{}] for regions like {}",
                candidate.as_hint(),
                regions.join(", ")
            );
        }
        Some(help)
    }
}

// ============================================================================
// Dialect-internal outcome
// ============================================================================

/// Failure of a single dialect attempt.
///
/// `Unsuitable` means "this is not my document shape" and is only ever
/// consumed by the dispatcher, which rewinds and tries the next dialect.
#[derive(Debug)]
pub(crate) enum DialectError {
    Unsuitable(&'static str),
    Fatal(ChatError),
}

impl From<ChatError> for DialectError {
    fn from(err: ChatError) -> Self {
        DialectError::Fatal(err)
    }
}

impl From<io::Error> for DialectError {
    fn from(err: io::Error) -> Self {
        DialectError::Fatal(ChatError::Io(err))
    }
}

impl From<quick_xml::Error> for DialectError {
    fn from(err: quick_xml::Error) -> Self {
        DialectError::Fatal(ChatError::Markup(err))
    }
}

pub(crate) type DialectResult<T> = std::result::Result<T, DialectError>;

// ============================================================================
// Tests
// ============================================================================
