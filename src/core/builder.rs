//! Assembles a [`ChatHistory`] from thread fragments.
//!
//! The export tool paginates long threads into several fragments and
//! occasionally emits the very same fragment twice. [`HistoryBuilder`] merges
//! the former by participant key and drops the latter by content signature.

use std::collections::HashSet;

use sha2::{Digest, Sha256};
use tracing::debug;

use super::models::{ChatHistory, ChatThread};

/// Content hash of a thread fragment.
pub type Signature = [u8; 32];

/// Computes the signature of a fragment.
///
/// Covers each message's timestamp, sender and content in encounter order.
/// Two different conversations with identical content collide; that is
/// accepted.
pub fn signature(thread: &ChatThread) -> Signature {
    let mut hasher = Sha256::new();
    for message in &thread.messages {
        hasher.update(message.timestamp.to_rfc3339().as_bytes());
        hasher.update([0]);
        hasher.update(message.sender.as_bytes());
        hasher.update([0]);
        hasher.update(message.content.as_bytes());
        hasher.update([0xff]);
    }
    hasher.finalize().into()
}

/// Outcome of [`HistoryBuilder::save_thread`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The fragment started a new thread.
    Inserted,
    /// The fragment was appended to an existing thread.
    Merged,
    /// An identical fragment was already saved.
    Duplicate,
    /// Nothing was passed in (skipped thread).
    Skipped,
}

/// Owns the participant-key → thread mapping during one parse.
#[derive(Debug, Default)]
pub struct HistoryBuilder {
    owner: Option<String>,
    history: ChatHistory,
    signatures: HashSet<Signature>,
}

impl HistoryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the owner name; only the first non-empty value is kept.
    pub fn set_owner(&mut self, owner: &str) {
        let owner = owner.trim();
        if self.owner.is_none() && !owner.is_empty() {
            self.owner = Some(owner.to_string());
        }
    }

    /// Returns the owner name, if already known.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Returns the current length of the thread stored under `key`.
    pub fn thread_len(&self, key: &str) -> Option<usize> {
        self.history.threads.get(key).map(ChatThread::len)
    }

    /// Saves a fragment, deduplicating and merging as needed.
    pub fn save_thread(&mut self, thread: Option<ChatThread>) -> SaveOutcome {
        let Some(thread) = thread else {
            return SaveOutcome::Skipped;
        };

        if !self.signatures.insert(signature(&thread)) {
            debug!(participants = %thread.key(), "duplicate thread fragment suppressed");
            return SaveOutcome::Duplicate;
        }

        let key = thread.key();
        if let Some(existing) = self.history.threads.get_mut(&key) {
            debug!(participants = %key, added = thread.len(), "merging thread fragment");
            existing.messages.extend(thread.messages);
            SaveOutcome::Merged
        } else {
            self.history.threads.insert(key, thread);
            SaveOutcome::Inserted
        }
    }

    /// Finishes the build: sets the owner and sorts every thread.
    pub fn finish(self) -> ChatHistory {
        let mut history = self.history;
        history.owner = self.owner.unwrap_or_default();
        history.sort();
        history
    }
}
