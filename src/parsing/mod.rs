//! Shared machinery driven by every dialect parser.
//!
//! - [`session`] - per-parse state (sequence counter, builder, warnings)
//! - [`thread`] - the per-thread message state machine

pub(crate) mod session;
pub(crate) mod thread;
