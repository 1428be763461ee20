//! # Rollup Prover Test Suite
//!
//! Cross-crate flows that no single subsystem crate can exercise alone.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Shared fixture: registry, blobs, proof system, bus
//! └── integration/
//!     ├── scenarios.rs    # The four reference merge scenarios
//!     ├── convergence.rs  # Single and concurrent coordinators converge
//!     └── end_to_end.rs   # Upstream ops → feed → merges → settlement
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rp-tests
//! cargo bench -p rp-tests
//! ```

pub mod integration;
pub mod support;
