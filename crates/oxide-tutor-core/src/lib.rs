#![deny(missing_docs)]
//! Oxide Tutor core library.
//!
//! Mode registry, per-chat session state, and the grammar-check and
//! chat-completion API clients used by the English practice bot.

/// Configuration management.
pub mod config;
/// Grammar checking (LanguageTool) client and report formatting.
pub mod grammar;
mod http_utils;
/// Chat-completion providers.
pub mod llm;
/// Mode registry and command argument parsing.
pub mod modes;
/// Per-chat session state.
pub mod session;
/// Utility functions.
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
