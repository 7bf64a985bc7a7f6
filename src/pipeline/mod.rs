//! Pipeline entry points for watcher operations.
//!
//! - `is_new`: novelty check for a fetched post identifier
//! - `run_watch`: one full fetch → detect → notify → persist run

pub mod novelty;
pub mod watch;

pub use novelty::is_new;
pub use watch::{Detection, RunOutcome, evaluate, run_watch};
