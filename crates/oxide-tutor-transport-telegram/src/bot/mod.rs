/// Command, callback and text handlers
pub mod handlers;
/// Telegram implementation of the relay transport
pub mod relay_transport;
/// View layer for UI components (keyboards, messages)
pub mod views;
