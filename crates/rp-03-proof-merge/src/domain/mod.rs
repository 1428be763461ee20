//! Domain layer: selection, dedup and job bookkeeping.
//!
//! Everything here is private, non-durable coordinator state and is safely
//! lost on restart.

pub mod clock;
pub mod dedup;
pub mod jobs;
pub mod selector;

pub use clock::{Clock, ManualClock, TokioClock};
pub use dedup::DedupCache;
pub use jobs::{MergeJob, MergeJobTracker};
pub use selector::{select, MergeCandidate, SelectionHistory, SelectionPhase};
