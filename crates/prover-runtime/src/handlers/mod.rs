//! # Event Handlers
//!
//! Tasks that consume the event bus.

pub mod event_logger;

pub use event_logger::EventLogger;
