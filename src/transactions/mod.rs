//! The stages of a retrieval, in the order they run.
//!
//! Each stage consumes only what the previous one produced: [`locate_run`] yields the run that
//! [`wait_for_completion`] polls, whose final snapshot goes through [`validate_outcome`] before
//! [`download_artifacts`] saves what it produced.

mod download_artifacts;
mod locate_run;
mod validate_outcome;
mod wait_for_completion;

pub use download_artifacts::*;
pub use locate_run::*;
pub use validate_outcome::*;
pub use wait_for_completion::*;
