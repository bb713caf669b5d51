//! Markup tokenization for archive documents.
//!
//! - [`sanitize`] - strips illegal characters and declares HTML entities
//! - [`events`] - the element vocabulary and event type
//! - [`reader`] - the tolerant event reader

pub mod events;
pub mod reader;
pub mod sanitize;

pub use events::{Element, Node, Phase, TagEvent};
pub use reader::TagReader;
pub use sanitize::SanitizingReader;
