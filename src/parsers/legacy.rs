//! Parser for the single-document archive format used until late 2017.

use std::io::BufRead;

use crate::error::{DialectError, DialectResult};
use crate::markup::{Node, TagEvent, TagReader};
use crate::parsing::session::ParseSession;
use crate::parsing::thread::Boundary;

use super::DocumentParser;

/// Reads `messages.htm` files that hold every thread inline.
///
/// ```text
/// <h1>Owner</h1>
/// <div class="thread">Amy, Owner
///     <div class="message">...</div><p>text</p>
/// </div>
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LegacyParser;

impl DocumentParser for LegacyParser {
    fn parse_document<R: BufRead>(
        &self,
        reader: &mut TagReader<R>,
        session: &mut ParseSession<'_>,
    ) -> DialectResult<()> {
        let mut recognized = false;

        while let Some(event) = reader.next_event()? {
            match event {
                TagEvent::End(element) if element.node == Node::OwnerHeading => {
                    recognized = true;
                    session.set_owner(&element.text);
                }
                TagEvent::Start(element) if element.node == Node::Thread => {
                    recognized = true;
                    let participants = match reader.next_event()? {
                        Some(TagEvent::Text(text)) => session.parse_participants(&text),
                        Some(other) => {
                            reader.push_back(other);
                            Vec::new()
                        }
                        None => Vec::new(),
                    };
                    session.process_thread(participants, reader, Boundary::ParagraphEnd, true)?;
                }
                _ => {}
            }
        }

        if recognized {
            Ok(())
        } else {
            Err(DialectError::Unsuitable("no owner heading or thread"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    fn parse(doc: &str, config: &ParserConfig) -> DialectResult<crate::ChatHistory> {
        let mut session = ParseSession::new(config);
        let mut reader = TagReader::sanitized(doc.as_bytes());
        LegacyParser.parse_document(&mut reader, &mut session)?;
        Ok(session.finish())
    }

    const DOC: &str = r#"<html><body><div class="contents"><h1>Owner Name</h1>
<div class="thread">Amy Adams, Owner Name
<div class="message"><div class="message_header"><span class="user">Amy Adams</span><span class="meta">Sunday, December 4, 2016 at 1:55pm UTC+00</span></div></div><p>later</p>
<div class="message"><div class="message_header"><span class="user">Owner Name</span><span class="meta">Sunday, December 4, 2016 at 1:54pm UTC+00</span></div></div><p>earlier</p>
</div>
<div class="thread">
<div class="message"><div class="message_header"><span class="user">Ghost</span><span class="meta">Sunday, December 4, 2016 at 1:54pm UTC+00</span></div></div><p>nobody</p>
</div>
<div class="thread">Bob Brown, Owner Name
<div class="message"><div class="message_header"><span class="user">Bob Brown</span><span class="meta">Sunday, December 4, 2016 at 1:56pm UTC+00</span></div></div><p>hey</p>
</div>
</div></body></html>"#;

    #[test]
    fn test_parses_inline_threads() {
        let history = parse(DOC, &ParserConfig::new().with_utc(true)).unwrap();
        assert_eq!(history.owner, "Owner Name");
        assert_eq!(history.len(), 2);

        let amy = history.thread(&["Amy Adams"]).unwrap();
        let contents: Vec<&str> = amy.messages.iter().map(|m| m.content()).collect();
        assert_eq!(contents, ["earlier", "later"]);
        assert_eq!(history.thread(&["Bob Brown"]).unwrap().len(), 1);
    }

    #[test]
    fn test_thread_without_participants_is_skipped_and_consumed() {
        let history = parse(DOC, &ParserConfig::new().with_utc(true)).unwrap();
        assert!(history.iter().all(|t| t.messages.iter().all(|m| m.content != "nobody")));
    }

    #[test]
    fn test_filtered_thread_does_not_misalign_stream() {
        let config = ParserConfig::new().with_utc(true).with_thread_filter("bob");
        let history = parse(DOC, &config).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.thread(&["Bob Brown"]).unwrap().messages[0].content, "hey");
    }

    #[test]
    fn test_unrecognized_document_is_unsuitable() {
        let err = parse("<html><body><p>hello</p></body></html>", &ParserConfig::default())
            .unwrap_err();
        assert!(matches!(err, DialectError::Unsuitable(_)));
    }
}
