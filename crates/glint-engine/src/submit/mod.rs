//! Render submission gate.
//!
//! A frame goes through three phases:
//! - recording, on the loop thread, between `begin_frame` and `submit`
//! - submission, run by a `SubmissionStrategy` (inline or on a worker thread)
//! - retirement, where the loop joins the submission and observes its result
//!
//! At most one submission is ever outstanding. The completion flag is the
//! only state shared between the loop and a deferred submission.

mod flag;
mod gate;
mod strategy;

pub use flag::CompletionFlag;
pub use gate::{BusyPolicy, FrameTicket, SubmissionGate, SubmitError};
pub use strategy::{
    DeferredSubmission, ImmediateSubmission, Pending, SubmissionMode, SubmissionStrategy,
};

/// Work that hands one fully recorded frame to the GPU.
pub type SubmitJob = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;
