//! Progress reporting for archive parsing.
//!
//! The parser announces each thread it meets through a callback, so that
//! applications can show what is happening on large archives without the
//! library writing to the terminal itself.
//!
//! # Example
//!
//! ```rust
//! use fbchat_history::progress::{ProgressCallback, ThreadProgress};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|event| {
//!     println!("{event}");
//! });
//!
//! callback(ThreadProgress::Discovered {
//!     participants: vec!["Billy Joel".into()],
//! });
//! ```

use std::fmt;
use std::sync::Arc;

/// Longest participant list shown before it is cut off.
const MAX_PARTICIPANTS_TEXT: usize = 60;

/// A single progress event, emitted once per thread fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadProgress {
    /// A thread with these participants is seen for the first time.
    Discovered {
        /// Participants of the thread, owner excluded.
        participants: Vec<String>,
    },

    /// Another fragment of an already known thread follows.
    Continued {
        /// Participants of the thread, owner excluded.
        participants: Vec<String>,
        /// Messages recorded for the thread so far.
        messages: usize,
    },

    /// The thread is not recorded, either filtered out or missing participants.
    Skipped {
        /// Participants of the thread; empty when they are unknown.
        participants: Vec<String>,
    },
}

impl ThreadProgress {
    /// Returns the participants the event refers to.
    pub fn participants(&self) -> &[String] {
        match self {
            ThreadProgress::Discovered { participants }
            | ThreadProgress::Continued { participants, .. }
            | ThreadProgress::Skipped { participants } => participants,
        }
    }

    /// Returns `true` for [`ThreadProgress::Skipped`].
    pub fn is_skipped(&self) -> bool {
        matches!(self, ThreadProgress::Skipped { .. })
    }
}

fn participants_text(participants: &[String]) -> String {
    if participants.is_empty() {
        return "unknown participants".to_string();
    }
    let joined = participants.join(", ");
    if joined.chars().count() > MAX_PARTICIPANTS_TEXT {
        let cut: String = joined.chars().take(MAX_PARTICIPANTS_TEXT).collect();
        format!("[{cut}...]")
    } else {
        format!("[{joined}]")
    }
}

impl fmt::Display for ThreadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadProgress::Discovered { participants } => {
                write!(f, "Discovered chat thread with {}...", participants_text(participants))
            }
            ThreadProgress::Continued {
                participants,
                messages,
            } => write!(
                f,
                "Continuing chat thread with {} <@{} messages>...",
                participants_text(participants),
                messages
            ),
            ThreadProgress::Skipped { participants } => {
                write!(f, "Skipping chat thread with {}...", participants_text(participants))
            }
        }
    }
}

/// Callback type for receiving progress updates.
///
/// # Example
///
/// ```rust
/// use fbchat_history::progress::{ProgressCallback, ThreadProgress};
/// use std::sync::Arc;
///
/// let callback: ProgressCallback = Arc::new(|event| {
///     if event.is_skipped() {
///         eprintln!("{event}");
///     }
/// });
///
/// callback(ThreadProgress::Skipped { participants: vec![] });
/// ```
pub type ProgressCallback = Arc<dyn Fn(ThreadProgress) + Send + Sync>;

/// Creates a no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Creates a progress callback that prints each event to stderr.
pub fn stderr_progress() -> ProgressCallback {
    Arc::new(|event| {
        eprintln!("{event}");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_discovered_display() {
        let event = ThreadProgress::Discovered {
            participants: names(&["Billy Joel", "Jack Stevenson"]),
        };
        assert_eq!(
            event.to_string(),
            "Discovered chat thread with [Billy Joel, Jack Stevenson]..."
        );
    }

    #[test]
    fn test_continued_display() {
        let event = ThreadProgress::Continued {
            participants: names(&["Billy Joel"]),
            messages: 42,
        };
        assert_eq!(
            event.to_string(),
            "Continuing chat thread with [Billy Joel] <@42 messages>..."
        );
    }

    #[test]
    fn test_skipped_unknown_participants() {
        let event = ThreadProgress::Skipped {
            participants: vec![],
        };
        assert!(event.is_skipped());
        assert_eq!(
            event.to_string(),
            "Skipping chat thread with unknown participants..."
        );
    }

    #[test]
    fn test_long_participant_list_truncated() {
        let many: Vec<String> = (0..20).map(|i| format!("Person {i}")).collect();
        let text = ThreadProgress::Discovered { participants: many }.to_string();
        let inner = text
            .trim_start_matches("Discovered chat thread with [")
            .trim_end_matches("]...");
        assert_eq!(inner.chars().count(), MAX_PARTICIPANTS_TEXT + 3);
        assert!(inner.ends_with("..."));
    }

    #[test]
    fn test_no_progress_callback() {
        let callback = no_progress();
        callback(ThreadProgress::Skipped {
            participants: vec![],
        });
    }

    #[test]
    fn test_progress_callback_type() {
        use std::sync::Mutex;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        let callback: ProgressCallback = Arc::new(move |event| {
            seen_clone.lock().unwrap().push(event.participants().len());
        });

        callback(ThreadProgress::Continued {
            participants: names(&["A", "B"]),
            messages: 3,
        });
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }
}
