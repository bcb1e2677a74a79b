use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use serde::{Deserialize, Serialize};

use super::{CompletionFlag, SubmitError, SubmitJob};

/// Runs a submission job and reports how to observe its completion.
pub trait SubmissionStrategy: Send {
    fn name(&self) -> &'static str;

    /// Starts `job`. The strategy must set `flag` once the job has finished,
    /// whether it returned or panicked.
    fn submit(&self, job: SubmitJob, flag: CompletionFlag) -> Result<Pending, SubmitError>;
}

/// Handle to a started submission.
pub enum Pending {
    Finished(anyhow::Result<()>),
    Running(JoinHandle<anyhow::Result<()>>),
}

impl Pending {
    pub fn is_finished(&self) -> bool {
        match self {
            Pending::Finished(_) => true,
            Pending::Running(handle) => handle.is_finished(),
        }
    }

    /// Blocks until the submission has completed and returns its outcome.
    pub fn wait(self) -> Result<(), SubmitError> {
        match self {
            Pending::Finished(result) => result.map_err(SubmitError::Failed),
            Pending::Running(handle) => match handle.join() {
                Ok(result) => result.map_err(SubmitError::Failed),
                Err(_) => Err(SubmitError::Panicked),
            },
        }
    }
}

/// Runs the job inline, inside `submit`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateSubmission;

impl SubmissionStrategy for ImmediateSubmission {
    fn name(&self) -> &'static str {
        "immediate"
    }

    fn submit(&self, job: SubmitJob, flag: CompletionFlag) -> Result<Pending, SubmitError> {
        let _done = flag.set_on_drop();
        match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(result) => Ok(Pending::Finished(result)),
            Err(_) => Err(SubmitError::Panicked),
        }
    }
}

/// Runs each job on its own short-lived worker thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeferredSubmission;

impl SubmissionStrategy for DeferredSubmission {
    fn name(&self) -> &'static str {
        "deferred"
    }

    fn submit(&self, job: SubmitJob, flag: CompletionFlag) -> Result<Pending, SubmitError> {
        let handle = thread::Builder::new()
            .name("glint-submit".to_string())
            .spawn(move || {
                let _done = flag.set_on_drop();
                job()
            })
            .map_err(SubmitError::Spawn)?;
        Ok(Pending::Running(handle))
    }
}

/// Configured submission mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionMode {
    /// Deferred when the backend supports it, immediate otherwise.
    #[default]
    Auto,
    Immediate,
    Deferred,
}

impl SubmissionMode {
    /// Picks a strategy for a backend with the given deferred-submission capability.
    pub fn select(self, backend_can_defer: bool) -> Box<dyn SubmissionStrategy> {
        match (self, backend_can_defer) {
            (SubmissionMode::Immediate, _) | (SubmissionMode::Auto, false) => {
                Box::new(ImmediateSubmission)
            }
            (SubmissionMode::Auto, true) | (SubmissionMode::Deferred, true) => {
                Box::new(DeferredSubmission)
            }
            (SubmissionMode::Deferred, false) => {
                log::warn!("deferred submission requested but the backend cannot defer; using immediate");
                Box::new(ImmediateSubmission)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(f: impl FnOnce() -> anyhow::Result<()> + Send + 'static) -> SubmitJob {
        Box::new(f)
    }

    #[test]
    fn select_honours_capability() {
        assert_eq!(SubmissionMode::Auto.select(true).name(), "deferred");
        assert_eq!(SubmissionMode::Auto.select(false).name(), "immediate");
        assert_eq!(SubmissionMode::Immediate.select(true).name(), "immediate");
        assert_eq!(SubmissionMode::Deferred.select(true).name(), "deferred");
        assert_eq!(SubmissionMode::Deferred.select(false).name(), "immediate");
    }

    #[test]
    fn immediate_runs_inline_and_sets_flag() {
        let flag = CompletionFlag::new();
        let pending = ImmediateSubmission
            .submit(job(|| Ok(())), flag.clone())
            .unwrap();
        assert!(flag.is_set());
        assert!(pending.is_finished());
        assert!(pending.wait().is_ok());
    }

    #[test]
    fn immediate_panic_is_reported() {
        let flag = CompletionFlag::new();
        let result = ImmediateSubmission.submit(job(|| panic!("boom")), flag.clone());
        assert!(matches!(result, Err(SubmitError::Panicked)));
        assert!(flag.is_set());
    }

    #[test]
    fn deferred_runs_on_named_worker() {
        let flag = CompletionFlag::new();
        let pending = DeferredSubmission
            .submit(
                job(|| {
                    anyhow::ensure!(thread::current().name() == Some("glint-submit"));
                    Ok(())
                }),
                flag.clone(),
            )
            .unwrap();
        assert!(pending.wait().is_ok());
        assert!(flag.is_set());
    }

    #[test]
    fn deferred_panic_is_reported_on_wait() {
        let flag = CompletionFlag::new();
        let pending = DeferredSubmission
            .submit(job(|| panic!("boom")), flag.clone())
            .unwrap();
        assert!(matches!(pending.wait(), Err(SubmitError::Panicked)));
        assert!(flag.is_set());
    }
}
