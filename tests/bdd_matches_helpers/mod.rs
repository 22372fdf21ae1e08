//! Behavioural step helpers for sentence match verification scenarios.

mod assertions;
mod state;
mod steps;

pub use state::{MatchesState, matches_state};
