//! # Ports Layer (Hexagonal Architecture)
//!
//! Driven ports consumed by the sequencing, merge and settlement subsystems.

pub mod outbound;
