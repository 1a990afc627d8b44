#![forbid(unsafe_code)]

//! Adaptive CEFR placement-test engine.
//!
//! Pure, synchronous core: the difficulty ladder, the question pool and its
//! per-level index, initial and adaptive question selection, performance
//! aggregation, and the termination policy. All I/O (question generation,
//! final evaluation) lives in the services crate; everything here is a pure
//! transformation over explicit session state.

pub mod error;
pub mod model;
pub mod performance;
pub mod selector;
pub mod termination;
pub mod time;

pub use error::Error;
pub use performance::{LevelTally, PerformanceSnapshot, aggregate};
pub use selector::{select_initial, select_next};
pub use termination::{
    Decision, StopReason, TerminationPolicy, max_questions, min_questions, progress_ratio,
};
pub use time::Clock;
