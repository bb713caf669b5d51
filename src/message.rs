//! The normalized chat message.
//!
//! # Ordering
//!
//! Messages order by `timestamp` first. The export lists each thread newest
//! first, so several messages sent in the same minute arrive in reverse. Each
//! message therefore carries a `seq_num` taken from a counter that decreases
//! once per message in document order. Among equal timestamps the message
//! encountered last in the document (the smallest, most negative `seq_num`)
//! sorts first.
//!
//! ```
//! use chrono::{FixedOffset, TimeZone};
//! use fbchat_history::ChatMessage;
//!
//! let at = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
//! let earlier = ChatMessage::new(at, -1, "Alice", "first");
//! let later = ChatMessage::new(at, 0, "Bob", "second");
//!
//! assert!(earlier < later);
//! ```

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single message within a thread.
///
/// Immutable once constructed; fields are public for reading, but the parser
/// never modifies a message after building it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// When the message was sent.
    ///
    /// Carries either a UTC offset of zero (UTC output) or the fixed offset
    /// printed next to the timestamp in the archive.
    pub timestamp: DateTime<FixedOffset>,

    /// Tie-breaker for messages with identical timestamps.
    #[serde(skip)]
    pub seq_num: i64,

    /// Display name of the author.
    pub sender: String,

    /// Text of the message, or an image placeholder.
    pub content: String,
}

impl ChatMessage {
    /// Creates a new message.
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        seq_num: i64,
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            seq_num,
            sender: sender.into(),
            content: content.into(),
        }
    }

    /// Returns the sender name.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the message content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the timestamp.
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Returns `true` if the content is empty or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

impl Ord for ChatMessage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then(self.seq_num.cmp(&other.seq_num))
            .then_with(|| self.sender.cmp(&other.sender))
            .then_with(|| self.content.cmp(&other.content))
    }
}

impl PartialOrd for ChatMessage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
