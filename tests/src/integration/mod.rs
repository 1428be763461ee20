//! Cross-crate integration flows.

pub mod convergence;
pub mod end_to_end;
pub mod scenarios;
