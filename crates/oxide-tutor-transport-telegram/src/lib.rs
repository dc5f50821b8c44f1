#![deny(missing_docs)]
//! Telegram transport adapter for Oxide Tutor.

/// Telegram-specific bot/transport implementation.
pub mod bot;
/// Telegram transport configuration.
pub mod config;
/// Periodic self-ping keeping the host awake.
pub mod keep_alive;
/// Telegram runtime entrypoint.
pub mod runner;
