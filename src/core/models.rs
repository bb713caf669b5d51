//! Conversation data model: threads and the history that owns them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ChatMessage;

/// Builds the identity key for a participant list.
///
/// The list must already be sorted; threads with equal keys are the same
/// conversation.
pub fn participants_key<S: AsRef<str>>(participants: &[S]) -> String {
    participants
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A conversation between the archive owner and a fixed set of participants.
///
/// `participants` never contains the archive owner and is always sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatThread {
    /// Sorted participant names, excluding the archive owner.
    pub participants: Vec<String>,

    /// Messages in chronological order once [`sort`](Self::sort) has run.
    pub messages: Vec<ChatMessage>,
}

impl ChatThread {
    /// Creates an empty thread, sorting the participant list.
    pub fn new<I, S>(participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut participants: Vec<String> = participants.into_iter().map(Into::into).collect();
        participants.sort();
        Self {
            participants,
            messages: Vec::new(),
        }
    }

    /// Appends a message. Order is restored by [`sort`](Self::sort).
    #[must_use]
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Appends a message in place.
    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Returns the identity key, e.g. `"Billy Joel, Jack Stevenson"`.
    pub fn key(&self) -> String {
        participants_key(&self.participants)
    }

    /// Number of messages in the thread.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the thread has no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Stably sorts messages by timestamp, then sequence number.
    pub fn sort(&mut self) {
        self.messages.sort();
    }
}

/// The complete chat history of one archive owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistory {
    /// Display name of the archive owner (empty if the archive has none).
    pub owner: String,

    /// Threads keyed by [`participants_key`].
    pub threads: BTreeMap<String, ChatThread>,
}

impl ChatHistory {
    /// Creates an empty history for `owner`.
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            threads: BTreeMap::new(),
        }
    }

    /// Looks a thread up by its participants, in any order.
    ///
    /// ```
    /// use fbchat_history::{ChatHistory, ChatThread};
    ///
    /// let mut history = ChatHistory::new("Owner");
    /// let thread = ChatThread::new(["Jack", "Billy"]);
    /// history.threads.insert(thread.key(), thread);
    ///
    /// assert!(history.thread(&["Jack", "Billy"]).is_some());
    /// assert!(history.thread(&["Jack"]).is_none());
    /// ```
    pub fn thread(&self, participants: &[&str]) -> Option<&ChatThread> {
        let mut sorted = participants.to_vec();
        sorted.sort_unstable();
        self.threads.get(&participants_key(&sorted))
    }

    /// Iterates over threads in key order.
    pub fn iter(&self) -> impl Iterator<Item = &ChatThread> {
        self.threads.values()
    }

    /// Number of threads.
    pub fn len(&self) -> usize {
        self.threads.len()
    }

    /// Returns `true` if no thread was recorded.
    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    /// Total number of messages across all threads.
    pub fn message_count(&self) -> usize {
        self.threads.values().map(ChatThread::len).sum()
    }

    /// Restores chronological order in every thread.
    pub fn sort(&mut self) {
        for thread in self.threads.values_mut() {
            thread.sort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn at(day: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2015, 1, day, 0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_thread_sorts_participants() {
        let thread = ChatThread::new(["Third User", "Second User"]);
        assert_eq!(thread.participants, vec!["Second User", "Third User"]);
        assert_eq!(thread.key(), "Second User, Third User");
    }

    #[test]
    fn test_thread_message_ordering_all_permutations() {
        let m1 = ChatMessage::new(at(1), -3, "Sender 1", "1");
        let m2 = ChatMessage::new(at(2), -1, "Sender 2", "2");
        let m3 = ChatMessage::new(at(2), -2, "Sender 3", "3");

        let orders = [
            [&m1, &m2, &m3],
            [&m1, &m3, &m2],
            [&m2, &m1, &m3],
            [&m2, &m3, &m1],
            [&m3, &m1, &m2],
            [&m3, &m2, &m1],
        ];
        for order in orders {
            let mut thread = ChatThread::new(Vec::<String>::new());
            for m in order {
                thread.add_message(m.clone());
            }
            thread.sort();
            let contents: Vec<&str> = thread.messages.iter().map(|m| m.content()).collect();
            assert_eq!(contents, ["1", "3", "2"]);
        }
    }

    #[test]
    fn test_history_lookup_and_counts() {
        let mut history = ChatHistory::new("Owner");
        assert!(history.is_empty());

        let thread = ChatThread::new(["Bob"])
            .with_message(ChatMessage::new(at(1), 0, "Bob", "hi"))
            .with_message(ChatMessage::new(at(1), -1, "Owner", "hey"));
        history.threads.insert(thread.key(), thread);

        assert_eq!(history.len(), 1);
        assert_eq!(history.message_count(), 2);
        assert_eq!(history.thread(&["Bob"]).map(ChatThread::len), Some(2));
    }

    #[test]
    fn test_history_sort_sorts_every_thread() {
        let mut history = ChatHistory::new("Owner");
        let thread = ChatThread::new(["Bob"])
            .with_message(ChatMessage::new(at(3), 0, "Bob", "late"))
            .with_message(ChatMessage::new(at(1), -1, "Bob", "early"));
        history.threads.insert(thread.key(), thread);

        history.sort();
        let thread = history.thread(&["Bob"]).unwrap();
        assert_eq!(thread.messages[0].content(), "early");
    }

    #[test]
    fn test_history_serializes_threads() {
        let mut history = ChatHistory::new("Owner");
        let thread = ChatThread::new(["Bob"]);
        history.threads.insert(thread.key(), thread);
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json["owner"], "Owner");
        assert_eq!(json["threads"]["Bob"]["participants"][0], "Bob");
    }
}
