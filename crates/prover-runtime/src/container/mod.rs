//! # Subsystem Container
//!
//! Configuration and the wired set of subsystem instances.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, RuntimeConfig};
pub use subsystems::SubsystemContainer;
