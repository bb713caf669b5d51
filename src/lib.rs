//! # fbchat-history
//!
//! A Rust library for turning exported Facebook chat archives
//! (`messages.htm`) into ordered, deduplicated conversation histories.
//!
//! ## Overview
//!
//! Facebook's "Download your information" export has shipped in several
//! layouts over the years. fbchat-history reads all of them:
//! - **Legacy** — one `messages.htm` holding every thread inline
//! - **Split** — a manifest of links, one HTML file per thread
//! - **Embedded** — split files that list their participants in a preamble
//!
//! The markup in these exports is not reliably well formed, timestamps are
//! written in the exporting user's language with bare timezone abbreviations,
//! and threads are often repeated or paginated. The parser sanitizes the
//! input, resolves every timestamp to a fixed offset, drops duplicated thread
//! fragments and merges paginated ones.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fbchat_history::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = ParserConfig::new()
//!         .with_utc(true)
//!         .with_timezone_hints("PST=-0800,PDT=-0700".parse()?);
//!
//!     let history = ArchiveParser::with_config(config).parse("archive/html/messages.htm")?;
//!
//!     println!("Conversation history of {}", history.owner);
//!     for thread in history.iter() {
//!         println!("{} ({} messages)", thread.key(), thread.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Ambiguous timezones
//!
//! Some abbreviations (`CDT`, `IST`, ...) are used with several UTC offsets.
//! Parsing stops with [`ChatError::AmbiguousTimezone`]; supply a hint and
//! parse again:
//!
//! ```rust,no_run
//! use fbchat_history::prelude::*;
//!
//! let parser = ArchiveParser::new();
//! match parser.parse("archive/html/messages.htm") {
//!     Err(err) if err.is_ambiguous_timezone() => {
//!         eprintln!("{}", err.timezone_help().unwrap_or_default());
//!     }
//!     other => {
//!         other?;
//!     }
//! }
//! # Ok::<(), ChatError>(())
//! ```
//!
//! ## Module Structure
//!
//! - [`parser`] — [`ArchiveParser`] and [`Dialect`] detection
//! - [`config`] — [`ParserConfig`](config::ParserConfig),
//!   [`TimezoneHints`](config::TimezoneHints)
//! - [`core`] — [`ChatThread`], [`ChatHistory`], the
//!   [`HistoryBuilder`](core::HistoryBuilder) and the
//!   [`ThreadFilter`](core::ThreadFilter)
//! - [`time`] — timestamp normalization across locales and timezones
//! - [`markup`] — sanitizing reader and tolerant tag event reader
//! - [`progress`] — per-thread progress events
//! - [`resolver`] — [`NameResolver`](resolver::NameResolver) implementations
//! - [`error`] — [`ChatError`], [`Result`]
//! - [`prelude`] — Convenient re-exports

pub mod config;
pub mod core;
pub mod error;
pub mod markup;
pub mod message;
pub mod parser;
pub mod progress;
pub mod resolver;
pub mod time;

mod parsers;
mod parsing;

// Re-export the main types at the crate root for convenience
pub use crate::core::models::{ChatHistory, ChatThread};
pub use error::{ChatError, Result};
pub use message::ChatMessage;
pub use parser::{ArchiveParser, Dialect};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use fbchat_history::prelude::*;
/// ```
pub mod prelude {
    // Data model
    pub use crate::{ChatHistory, ChatMessage, ChatThread};

    // Error types
    pub use crate::error::{ChatError, Result};

    // Entry point
    pub use crate::parser::{ArchiveParser, Dialect};

    // Configuration
    pub use crate::config::{ParserConfig, TimezoneHints};
    pub use crate::core::ThreadFilter;

    // Collaborators
    pub use crate::progress::{ProgressCallback, ThreadProgress};
    pub use crate::resolver::{IdentityResolver, NameResolver, ProfileResolver};

    // Timestamps
    pub use crate::time::parse_timestamp;
}
