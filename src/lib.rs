//! Stepcheck core library.
//!
//! This library verifies that natural-language sentences resolve to the
//! expected step implementations, with the expected arguments, and measures
//! how many registered steps the sentences exercise.

pub mod catalog;
pub mod cli;
pub mod coverage;
pub mod exit_status;
pub mod matcher;
pub mod output_prefs;
pub mod registry;
pub mod report;
pub mod runner;
pub mod value;
pub mod verify;
