#![deny(missing_docs)]
//! Oxide Tutor runtime.
//!
//! Transport-agnostic orchestration of a single chat message: grammar
//! report, working notice, then the completion reply.

/// Message relay.
pub mod relay;

pub use relay::{relay_message, RelayOutcome, RelayServices, RelayTransport, THINKING_NOTICE};
