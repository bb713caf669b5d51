//! Document parsers for the three archive dialects.
//!
//! - [`LegacyParser`] - one `messages.htm` holding every thread inline
//! - [`SplitParser`] - a manifest of links, one thread file per link
//! - [`EmbeddedParser`] - like split, but participants come from each
//!   thread file's preamble
//!
//! Every parser drives the same thread state machine through a
//! [`ParseSession`] and reports a structural mismatch as
//! [`DialectError::Unsuitable`], letting the dispatcher in
//! [`crate::parser`] move on to the next dialect.

mod embedded;
mod legacy;
mod split;

pub(crate) use embedded::EmbeddedParser;
pub(crate) use legacy::LegacyParser;
pub(crate) use split::SplitParser;

use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use crate::error::{ChatError, DialectError, DialectResult};
use crate::markup::{Node, TagEvent, TagReader};
use crate::parsing::session::ParseSession;

/// A parser for one document dialect.
pub(crate) trait DocumentParser {
    /// Walks the whole document, saving every thread into the session.
    fn parse_document<R: BufRead>(
        &self,
        reader: &mut TagReader<R>,
        session: &mut ParseSession<'_>,
    ) -> DialectResult<()>;
}

/// One thread link found in a split manifest.
#[derive(Debug)]
pub(crate) struct ThreadLink {
    pub text: String,
    pub href: String,
}

/// Walks a split manifest, calling `on_link` for every thread link.
///
/// Links before the `div.content` container are navigation and are ignored.
/// A manifest without any thread link is not a split manifest.
pub(crate) fn walk_manifest<'c, R, F>(
    reader: &mut TagReader<R>,
    session: &mut ParseSession<'c>,
    mut on_link: F,
) -> DialectResult<()>
where
    R: BufRead,
    F: FnMut(&mut ParseSession<'c>, ThreadLink) -> DialectResult<()>,
{
    let mut ignore_anchors = true;
    let mut saw_anchor = false;

    while let Some(event) = reader.next_event()? {
        match event {
            TagEvent::Start(element) if element.node == Node::Content => ignore_anchors = false,
            TagEvent::End(element) => match element.node {
                Node::OwnerHeading => session.set_owner(&element.text),
                Node::Link if !ignore_anchors => {
                    let Some(href) = element.attr else {
                        continue;
                    };
                    saw_anchor = true;
                    on_link(
                        session,
                        ThreadLink {
                            text: element.text,
                            href,
                        },
                    )?;
                }
                _ => {}
            },
            _ => {}
        }
    }

    if saw_anchor {
        Ok(())
    } else {
        Err(DialectError::Unsuitable("manifest without thread links"))
    }
}

/// Resolves a manifest link against the archive root.
pub(crate) fn thread_path(root: &Path, href: &str) -> PathBuf {
    let relative = href.strip_prefix("../").unwrap_or(href);
    root.join(relative)
}

/// Opens a referenced thread file.
pub(crate) fn open_thread_file(path: &Path) -> DialectResult<File> {
    File::open(path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            DialectError::Fatal(ChatError::missing_reference(path))
        } else {
            DialectError::Fatal(ChatError::Io(err))
        }
    })
}
