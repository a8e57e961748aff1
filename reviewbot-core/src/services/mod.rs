//! Long-running services: the poll loop and logging

pub mod logging;
pub mod poller;

pub use poller::{HomeworkPoller, IterationOutcome, PollError, PollState};
