//! Monitor API clients for external services.
//!
//! This crate provides the HTTP client for the Telegram Bot API and the
//! notifier that keeps one report message updated across cycles.

mod telegram;

pub use telegram::{MessageTransport, Notifier, TelegramClient, UpdateOutcome};
