//! Parser for the manifest-plus-thread-files format introduced in late 2017.

use std::io::BufRead;
use std::path::PathBuf;

use tracing::debug;

use crate::error::DialectResult;
use crate::markup::TagReader;
use crate::parsing::session::ParseSession;
use crate::parsing::thread::Boundary;

use super::{DocumentParser, open_thread_file, thread_path, walk_manifest};

/// Reads a manifest whose links carry the participants in their text.
#[derive(Debug, Clone)]
pub(crate) struct SplitParser {
    root: PathBuf,
}

impl SplitParser {
    /// `root` is the archive directory that holds `html/` and `messages/`.
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DocumentParser for SplitParser {
    fn parse_document<R: BufRead>(
        &self,
        reader: &mut TagReader<R>,
        session: &mut ParseSession<'_>,
    ) -> DialectResult<()> {
        walk_manifest(reader, session, |session, link| {
            let path = thread_path(&self.root, &link.href);
            let participants = session.parse_participants(&link.text);
            let file = open_thread_file(&path)?;
            debug!(path = %path.display(), "reading thread file");

            let mut thread_reader = TagReader::sanitized(file);
            session.process_thread(participants, &mut thread_reader, Boundary::ParagraphEnd, false)
        })
    }
}
