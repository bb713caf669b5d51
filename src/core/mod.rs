//! Core data model and history assembly.
//!
//! This module contains:
//! - [`models`] - [`ChatThread`] and [`ChatHistory`]
//! - [`builder`] - Fragment deduplication and thread merging
//! - [`filter`] - Participant-based thread selection

pub mod builder;
pub mod filter;
pub mod models;

pub use builder::{HistoryBuilder, SaveOutcome};
pub use filter::ThreadFilter;
pub use models::{ChatHistory, ChatThread, participants_key};

// Re-export ChatMessage from the crate root
pub use crate::ChatMessage;
