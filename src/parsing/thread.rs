//! Rebuilds the messages of one thread fragment from tag events.
//!
//! Each message cycles through the same states:
//!
//! ```text
//! idle --(user / meta end)--> awaiting content --(boundary)--> complete --> idle
//! ```
//!
//! What counts as a message boundary depends on the dialect, see
//! [`Boundary`]. The thread ends with the thread container's end tag or with
//! the end of the stream.

use std::io::BufRead;

use chrono::{DateTime, FixedOffset};

use super::session::ParseSession;
use crate::ChatMessage;
use crate::core::models::ChatThread;
use crate::error::{DialectError, DialectResult};
use crate::markup::{Node, TagEvent, TagReader};

/// Which event completes a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Boundary {
    /// The end of the paragraph that follows the message header.
    ParagraphEnd,
    /// The start of the next message container (or the end of the thread).
    ContainerStart,
}

/// State machine for a single thread fragment.
pub(crate) struct ThreadStateMachine<'s, 'c> {
    session: &'s mut ParseSession<'c>,
    boundary: Boundary,
    in_message: bool,
    sender: Option<String>,
    timestamp: Option<DateTime<FixedOffset>>,
    content: Option<String>,
    image: Option<String>,
    messages: Vec<ChatMessage>,
}

impl<'s, 'c> ThreadStateMachine<'s, 'c> {
    pub(crate) fn new(session: &'s mut ParseSession<'c>, boundary: Boundary) -> Self {
        Self {
            session,
            boundary,
            in_message: false,
            sender: None,
            timestamp: None,
            content: None,
            image: None,
            messages: Vec::new(),
        }
    }

    /// Consumes events up to the end of the thread without recording them.
    pub(crate) fn skip<R: BufRead>(reader: &mut TagReader<R>) -> DialectResult<()> {
        while let Some(event) = reader.next_event()? {
            if let TagEvent::End(element) = event {
                if element.node == Node::Thread {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Records every message up to the end of the thread.
    pub(crate) fn run<R: BufRead>(
        mut self,
        reader: &mut TagReader<R>,
        participants: Vec<String>,
    ) -> DialectResult<ChatThread> {
        while let Some(event) = reader.next_event()? {
            match event {
                TagEvent::End(element) => match element.node {
                    Node::Thread => break,
                    Node::User => self.sender = Some(self.session.resolve(&element.text)),
                    Node::Meta => {
                        self.timestamp = Some(self.session.timestamps.parse(&element.text)?);
                    }
                    Node::Paragraph => match self.boundary {
                        Boundary::ParagraphEnd => {
                            self.content = Some(element.text.trim().to_string());
                            self.complete()?;
                        }
                        Boundary::ContainerStart if self.in_message => {
                            self.append_paragraph(element.text.trim());
                        }
                        Boundary::ContainerStart => {}
                    },
                    _ => {}
                },
                TagEvent::Start(element) => match element.node {
                    Node::Image => self.image = element.attr,
                    Node::Message if self.boundary == Boundary::ContainerStart => {
                        if self.in_message {
                            self.complete()?;
                        }
                        self.in_message = true;
                    }
                    _ => {}
                },
                TagEvent::Text(_) => {}
            }
        }

        if self.boundary == Boundary::ContainerStart && self.in_message {
            self.complete()?;
        }

        let mut thread = ChatThread::new(participants);
        thread.messages = self.messages;
        Ok(thread)
    }

    /// Adds one paragraph of a multi-paragraph message.
    fn append_paragraph(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match &mut self.content {
            Some(content) if !content.is_empty() => {
                content.push('\n');
                content.push_str(text);
            }
            _ => self.content = Some(text.to_string()),
        }
    }

    fn complete(&mut self) -> DialectResult<()> {
        let Some(timestamp) = self.timestamp.take() else {
            // A message without a timestamp means the document is in another
            // dialect's shape.
            return Err(DialectError::Unsuitable("message without timestamp"));
        };
        let sender = match self.sender.take() {
            Some(sender) => sender,
            None => self.session.unknown_sender(),
        };
        let image = self.image.take();
        let content = match self.content.take() {
            Some(text) if !text.is_empty() => text,
            _ => image.map(|src| format!("[image: {src}]")).unwrap_or_default(),
        };

        let seq_num = self.session.next_seq_num();
        self.messages
            .push(ChatMessage::new(timestamp, seq_num, sender, content));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::parsing::session::UNKNOWN_SENDER;

    const HEADER: &str = r#"<div class="message"><div class="message_header"><span class="user">{user}</span><span class="meta">{meta}</span></div></div>"#;

    fn header(user: &str, meta: &str) -> String {
        HEADER.replace("{user}", user).replace("{meta}", meta)
    }

    fn run(doc: &str, boundary: Boundary) -> DialectResult<ChatThread> {
        let config = ParserConfig::new().with_utc(true);
        let mut session = ParseSession::new(&config);
        let mut reader = TagReader::sanitized(doc.as_bytes());
        ThreadStateMachine::new(&mut session, boundary).run(&mut reader, vec!["Bob".into()])
    }

    #[test]
    fn test_paragraph_boundary() {
        let doc = format!(
            r#"<div class="thread">Bob{}<p>second</p>{}<p>first</p></div>"#,
            header("Bob", "Sunday, December 4, 2016 at 1:55pm PDT"),
            header("Owner", "Sunday, December 4, 2016 at 1:54pm PDT"),
        );
        let thread = run(&doc, Boundary::ParagraphEnd).unwrap();
        assert_eq!(thread.len(), 2);
        assert_eq!(thread.messages[0].content, "second");
        assert_eq!(thread.messages[0].sender, "Bob");
        assert_eq!(thread.messages[0].seq_num, 0);
        assert_eq!(thread.messages[1].seq_num, -1);
    }

    #[test]
    fn test_container_boundary() {
        let doc = format!(
            r#"<div class="thread">{}<p>one</p>{}<p>two</p></div>"#,
            header("Bob", "Sunday, December 4, 2016 at 1:55pm PDT"),
            header("Owner", "Sunday, December 4, 2016 at 1:54pm PDT"),
        );
        let thread = run(&doc, Boundary::ContainerStart).unwrap();
        let contents: Vec<&str> = thread.messages.iter().map(|m| m.content()).collect();
        assert_eq!(contents, ["one", "two"]);
    }

    #[test]
    fn test_container_boundary_message_without_paragraph() {
        let doc = format!(
            r#"<div class="thread">{}{}<p>two</p></div>"#,
            header("Bob", "Sunday, December 4, 2016 at 1:55pm PDT"),
            header("Owner", "Sunday, December 4, 2016 at 1:54pm PDT"),
        );
        let thread = run(&doc, Boundary::ContainerStart).unwrap();
        let contents: Vec<&str> = thread.messages.iter().map(|m| m.content()).collect();
        assert_eq!(contents, ["", "two"]);
    }

    #[test]
    fn test_container_boundary_joins_paragraphs() {
        let doc = format!(
            r#"<div class="thread"><p>Participants: Bob</p>{}<p>line one</p><p></p><p>line two</p>{}<p>next</p></div>"#,
            header("Bob", "Sunday, December 4, 2016 at 1:55pm PDT"),
            header("Owner", "Sunday, December 4, 2016 at 1:54pm PDT"),
        );
        let thread = run(&doc, Boundary::ContainerStart).unwrap();
        let contents: Vec<&str> = thread.messages.iter().map(|m| m.content()).collect();
        assert_eq!(contents, ["line one\nline two", "next"]);
    }

    #[test]
    fn test_missing_timestamp_is_unsuitable() {
        let doc = r#"<div class="thread"><p>orphan</p></div>"#;
        let err = run(doc, Boundary::ParagraphEnd).unwrap_err();
        assert!(matches!(err, DialectError::Unsuitable(_)));
    }

    #[test]
    fn test_missing_sender_defaults_to_unknown() {
        let doc = r#"<div class="thread"><div class="message"><span class="meta">Sunday, December 4, 2016 at 1:54pm PDT</span></div><p>hi</p></div>"#;
        let thread = run(doc, Boundary::ParagraphEnd).unwrap();
        assert_eq!(thread.messages[0].sender, UNKNOWN_SENDER);
    }

    #[test]
    fn test_image_placeholder() {
        let doc = format!(
            r#"<div class="thread">{}<p><img src="photos/1.jpg"/></p></div>"#,
            header("Bob", "Sunday, December 4, 2016 at 1:54pm PDT"),
        );
        let thread = run(&doc, Boundary::ParagraphEnd).unwrap();
        assert_eq!(thread.messages[0].content, "[image: photos/1.jpg]");
    }

    #[test]
    fn test_time_errors_are_fatal() {
        let doc = format!(
            r#"<div class="thread">{}<p>x</p></div>"#,
            header("Bob", "Sunday, December 4, 2016 at 1:54pm CDT"),
        );
        let err = run(&doc, Boundary::ParagraphEnd).unwrap_err();
        assert!(matches!(
            err,
            DialectError::Fatal(crate::ChatError::AmbiguousTimezone { .. })
        ));
    }

    #[test]
    fn test_skip_consumes_through_thread_end() {
        let doc = r#"<div class="thread">A<p>x</p></div><h1>after</h1>"#;
        let mut reader = TagReader::sanitized(doc.as_bytes());
        // Thread start, participants text.
        reader.next_event().unwrap();
        reader.next_event().unwrap();
        ThreadStateMachine::skip(&mut reader).unwrap();
        let next = reader.next_event().unwrap().unwrap();
        assert!(next.is(Node::OwnerHeading, crate::markup::Phase::Start));
    }
}
