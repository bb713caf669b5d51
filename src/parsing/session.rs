//! Mutable state of one parse attempt.

use std::io::BufRead;

use tracing::{trace, warn};

use super::thread::{Boundary, ThreadStateMachine};
use crate::config::ParserConfig;
use crate::core::builder::HistoryBuilder;
use crate::core::models::{ChatHistory, participants_key};
use crate::error::DialectResult;
use crate::markup::TagReader;
use crate::progress::ThreadProgress;
use crate::time::TimestampParser;

/// Sender recorded when a message names nobody.
pub(crate) const UNKNOWN_SENDER: &str = "Unknown";

/// Everything a dialect parser threads through the document.
///
/// A new session is created for every dialect attempt, so a failed attempt
/// leaves nothing behind.
pub(crate) struct ParseSession<'c> {
    config: &'c ParserConfig,
    pub(crate) timestamps: TimestampParser,
    pub(crate) builder: HistoryBuilder,
    seq_num: i64,
    warned_missing_sender: bool,
    anonymous_users: usize,
}

impl<'c> ParseSession<'c> {
    pub(crate) fn new(config: &'c ParserConfig) -> Self {
        Self {
            config,
            timestamps: TimestampParser::new(config.use_utc, config.timezone_hints.clone()),
            builder: HistoryBuilder::new(),
            seq_num: 0,
            warned_missing_sender: false,
            anonymous_users: 0,
        }
    }

    /// Returns the next sequence number; the counter spans the whole parse.
    pub(crate) fn next_seq_num(&mut self) -> i64 {
        let seq = self.seq_num;
        self.seq_num -= 1;
        seq
    }

    pub(crate) fn resolve(&self, raw: &str) -> String {
        self.config.name_resolver.resolve(raw.trim())
    }

    /// Sender for a message that named nobody; warns once per parse.
    pub(crate) fn unknown_sender(&mut self) -> String {
        if !self.warned_missing_sender {
            self.warned_missing_sender = true;
            warn!(
                "The sender was missing in one or more parsed messages. Some or all \
                 messages may show the sender as '{UNKNOWN_SENDER}'."
            );
        }
        UNKNOWN_SENDER.to_string()
    }

    /// Records the archive owner; only the first non-empty name counts.
    pub(crate) fn set_owner(&mut self, name: &str) {
        let name = self.resolve(name);
        self.builder.set_owner(&name);
    }

    /// Turns `"Billy Joel, Jack Stevenson"` into a sorted participant list
    /// without the archive owner.
    pub(crate) fn parse_participants(&self, text: &str) -> Vec<String> {
        let mut participants: Vec<String> = text
            .trim()
            .split(", ")
            .map(|name| self.resolve(name))
            .filter(|name| !name.is_empty())
            .collect();
        participants.sort();
        if let Some(owner) = self.builder.owner() {
            if let Some(pos) = participants.iter().position(|p| p == owner) {
                participants.remove(pos);
            }
        }
        participants
    }

    /// Placeholder participant for a thread with a deleted or anonymized user.
    pub(crate) fn anonymous_participant(&mut self) -> String {
        self.anonymous_users += 1;
        format!("Facebook User #{}", self.anonymous_users)
    }

    fn report(&self, event: ThreadProgress) {
        if let Some(progress) = &self.config.progress {
            progress(event);
        }
    }

    /// Parses, or skips, one thread fragment and saves it.
    ///
    /// `shared_stream` is set when the thread's events are followed by more
    /// of the same document; a skipped thread must then be consumed.
    pub(crate) fn process_thread<R: BufRead>(
        &mut self,
        participants: Vec<String>,
        reader: &mut TagReader<R>,
        boundary: Boundary,
        shared_stream: bool,
    ) -> DialectResult<()> {
        let record = !participants.is_empty() && self.config.thread_filter.matches(&participants);

        if !record {
            trace!(participants = %participants_key(&participants), "skipping thread");
            self.report(ThreadProgress::Skipped { participants });
            if shared_stream {
                ThreadStateMachine::skip(reader)?;
            }
            return Ok(());
        }

        let key = participants_key(&participants);
        let event = match self.builder.thread_len(&key) {
            Some(messages) => ThreadProgress::Continued {
                participants: participants.clone(),
                messages,
            },
            None => ThreadProgress::Discovered {
                participants: participants.clone(),
            },
        };
        self.report(event);

        let thread = ThreadStateMachine::new(self, boundary).run(reader, participants)?;
        self.builder.save_thread(Some(thread));
        Ok(())
    }

    pub(crate) fn finish(self) -> ChatHistory {
        self.builder.finish()
    }
}
