//! Archive entry point and dialect dispatch.
//!
//! Facebook changed the layout of `messages.htm` several times. The
//! [`ArchiveParser`] tries every known [`Dialect`], newest first; a dialect
//! that recognizes a structural mismatch gives up, the input is rewound and
//! the next one is tried.
//!
//! # Example
//!
//! ```rust,no_run
//! use fbchat_history::parser::ArchiveParser;
//! use fbchat_history::config::ParserConfig;
//!
//! let parser = ArchiveParser::with_config(ParserConfig::new().with_utc(true));
//! let history = parser.parse("facebook-archive/html/messages.htm")?;
//!
//! for thread in history.iter() {
//!     println!("{}: {} messages", thread.key(), thread.len());
//! }
//! # Ok::<(), fbchat_history::ChatError>(())
//! ```
//!
//! Archives that are already in memory can be parsed with
//! [`ArchiveParser::parse_str`]:
//!
//! ```rust
//! use fbchat_history::parser::ArchiveParser;
//!
//! let html = r#"<html><h1>Owner</h1><div class="thread">Amy
//! <div class="message"><span class="user">Amy</span>
//! <span class="meta">Sunday, December 4, 2016 at 1:54pm UTC+01</span></div>
//! <p>Hello!</p></div></html>"#;
//!
//! let history = ArchiveParser::new().parse_str(html)?;
//! assert_eq!(history.owner, "Owner");
//! assert_eq!(history.message_count(), 1);
//! # Ok::<(), fbchat_history::ChatError>(())
//! ```

use std::fs::{self, File};
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ParserConfig;
use crate::core::models::ChatHistory;
use crate::error::{ChatError, DialectError, DialectResult, Result};
use crate::markup::TagReader;
use crate::parsers::{DocumentParser, EmbeddedParser, LegacyParser, SplitParser};
use crate::parsing::session::ParseSession;

/// Known `messages.htm` layouts.
///
/// # Example
///
/// ```rust
/// use fbchat_history::parser::Dialect;
/// use std::str::FromStr;
///
/// assert_eq!(Dialect::from_str("legacy").unwrap(), Dialect::Legacy);
/// assert_eq!(Dialect::from_str("embedded").unwrap(), Dialect::Embedded);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Dialect {
    /// Split archive whose thread files carry a `Participants:` line
    Embedded,

    /// Manifest of links, participants in the link text (late 2017)
    Split,

    /// Single document with every thread inline (until late 2017)
    #[serde(alias = "monolithic")]
    Legacy,
}

impl Dialect {
    /// Returns every dialect in the order they are attempted.
    pub fn all() -> &'static [Dialect] {
        &[Dialect::Embedded, Dialect::Split, Dialect::Legacy]
    }

    /// Returns all dialect names including aliases.
    pub fn all_names() -> &'static [&'static str] {
        &["embedded", "split", "legacy", "monolithic"]
    }

    /// Whether threads live in separate files next to the manifest.
    pub fn is_split(&self) -> bool {
        matches!(self, Dialect::Embedded | Dialect::Split)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Embedded => write!(f, "Embedded"),
            Dialect::Split => write!(f, "Split"),
            Dialect::Legacy => write!(f, "Legacy"),
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "embedded" => Ok(Dialect::Embedded),
            "split" => Ok(Dialect::Split),
            "legacy" | "monolithic" => Ok(Dialect::Legacy),
            _ => Err(format!(
                "Unknown dialect: '{}'. Expected one of: {}",
                s,
                Dialect::all_names().join(", ")
            )),
        }
    }
}

/// Parses Facebook chat archives into a [`ChatHistory`].
///
/// Each call is an independent parse: sequence numbers, warnings and the
/// adaptive date template order all start fresh.
#[derive(Debug, Clone, Default)]
pub struct ArchiveParser {
    config: ParserConfig,
}

impl ArchiveParser {
    /// Creates a parser with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser with a custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Dialects in the order they are attempted.
    pub fn dialects(&self) -> &'static [Dialect] {
        Dialect::all()
    }

    /// Parses `messages.htm` from an extracted archive.
    ///
    /// Split archives reference thread files relative to the directory above
    /// the one holding `messages.htm`.
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<ChatHistory> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let root = archive_root(&fs::canonicalize(path)?);
        self.parse_reader(file, root)
    }

    /// Parses an archive document held in memory.
    ///
    /// Split manifests resolve thread files against the current directory.
    pub fn parse_str(&self, content: &str) -> Result<ChatHistory> {
        self.parse_reader(Cursor::new(content.as_bytes()), ".")
    }

    /// Parses an archive document from any seekable source.
    pub fn parse_reader<R: Read + Seek>(
        &self,
        mut source: R,
        root: impl AsRef<Path>,
    ) -> Result<ChatHistory> {
        let root = root.as_ref();
        for &dialect in self.dialects() {
            source.seek(SeekFrom::Start(0))?;
            match self.attempt(dialect, &mut source, root) {
                Ok(history) => {
                    debug!(%dialect, threads = history.len(), "archive parsed");
                    return Ok(history);
                }
                Err(DialectError::Unsuitable(reason)) => {
                    debug!(%dialect, reason, "dialect unsuitable, trying the next one");
                }
                Err(DialectError::Fatal(err)) => return Err(err),
            }
        }
        Err(ChatError::NoSuitableParser)
    }

    /// Parses with a single dialect, without falling back to the others.
    pub fn parse_reader_with_dialect<R: Read>(
        &self,
        source: R,
        root: impl AsRef<Path>,
        dialect: Dialect,
    ) -> Result<ChatHistory> {
        match self.attempt(dialect, source, root.as_ref()) {
            Ok(history) => Ok(history),
            Err(DialectError::Unsuitable(reason)) => {
                debug!(%dialect, reason, "dialect unsuitable");
                Err(ChatError::NoSuitableParser)
            }
            Err(DialectError::Fatal(err)) => Err(err),
        }
    }

    fn attempt<R: Read>(
        &self,
        dialect: Dialect,
        source: R,
        root: &Path,
    ) -> DialectResult<ChatHistory> {
        let mut session = ParseSession::new(&self.config);
        let mut reader = TagReader::sanitized(source);
        match dialect {
            Dialect::Embedded => {
                EmbeddedParser::new(root).parse_document(&mut reader, &mut session)?;
            }
            Dialect::Split => SplitParser::new(root).parse_document(&mut reader, &mut session)?,
            Dialect::Legacy => LegacyParser.parse_document(&mut reader, &mut session)?,
        }
        Ok(session.finish())
    }
}

/// The directory two levels above `manifest`, i.e. the one holding `html/`.
fn archive_root(manifest: &Path) -> PathBuf {
    manifest
        .parent()
        .and_then(Path::parent)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
