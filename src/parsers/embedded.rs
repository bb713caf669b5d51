//! Parser for split archives whose thread files name their participants.
//!
//! Newer exports shorten or anonymize the manifest link text, so the
//! participant list is read from the `Participants: ...` line near the top
//! of each thread file instead. Messages in these files are separated by
//! their `div.message` containers rather than by paragraph ends.

use std::io::{BufRead, Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{DialectError, DialectResult};
use crate::markup::TagReader;
use crate::parsing::session::ParseSession;
use crate::parsing::thread::Boundary;

use super::{DocumentParser, open_thread_file, thread_path, walk_manifest};

/// How far into a thread file the participants line may appear.
const PREAMBLE_LEN: u64 = 4096;

fn participants_re() -> &'static Regex {
    static PARTICIPANTS_RE: OnceLock<Regex> = OnceLock::new();
    PARTICIPANTS_RE.get_or_init(|| {
        Regex::new(r"Participants:\s*([^<\n]*)").expect("valid participants regex")
    })
}

/// Extracts the raw participant list from the head of a thread file.
fn scrape_participants(preamble: &str) -> Option<&str> {
    participants_re()
        .captures(preamble)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Reads split manifests, taking participants from each thread file.
#[derive(Debug, Clone)]
pub(crate) struct EmbeddedParser {
    root: PathBuf,
}

impl EmbeddedParser {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentParser for EmbeddedParser {
    fn parse_document<R: BufRead>(
        &self,
        reader: &mut TagReader<R>,
        session: &mut ParseSession<'_>,
    ) -> DialectResult<()> {
        // The first thread file decides the dialect. Later files without a
        // participants line are anonymous threads, not a different dialect.
        let mut dialect_confirmed = false;

        walk_manifest(reader, session, |session, link| {
            let path = thread_path(&self.root, &link.href);
            let mut file = open_thread_file(&path)?;

            let mut head = Vec::new();
            (&mut file).take(PREAMBLE_LEN).read_to_end(&mut head)?;
            let head = String::from_utf8_lossy(&head);
            let mut participants = match scrape_participants(&head) {
                Some(names) => {
                    dialect_confirmed = true;
                    session.parse_participants(names)
                }
                None if dialect_confirmed => Vec::new(),
                None => {
                    return Err(DialectError::Unsuitable(
                        "thread file without participants line",
                    ));
                }
            };

            if participants.is_empty() {
                let placeholder = session.anonymous_participant();
                debug!(path = %path.display(), %placeholder, "anonymous thread");
                participants.push(placeholder);
            }

            file.seek(SeekFrom::Start(0))?;
            let mut thread_reader = TagReader::sanitized(file);
            session.process_thread(participants, &mut thread_reader, Boundary::ContainerStart, false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_participants() {
        assert_eq!(
            scrape_participants("<title>x</title><div>Participants: Amy Adams, Bob</div>"),
            Some("Amy Adams, Bob")
        );
        assert_eq!(scrape_participants("Participants: \n"), Some(""));
        assert_eq!(scrape_participants("<div>no names here</div>"), None);
    }
}
