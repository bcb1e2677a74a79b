use std::mem;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CompletionFlag, Pending, SubmissionStrategy, SubmitJob};

/// What `acquire` does while the previous submission is still running.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusyPolicy {
    /// Block until the previous submission has finished, then record.
    #[default]
    Wait,
    /// Skip this frame's draw entirely.
    Skip,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a submission is still outstanding")]
    Busy,
    #[error("a frame is already being recorded")]
    Recording,
    #[error("frame ticket {got} does not match the frame being recorded ({expected:?})")]
    StaleTicket { expected: Option<u64>, got: u64 },
    #[error("frame submission failed")]
    Failed(#[source] anyhow::Error),
    #[error("frame submission panicked")]
    Panicked,
    #[error("failed to spawn submission worker")]
    Spawn(#[source] std::io::Error),
}

/// Permission to record one frame. Consumed by `submit` or `cancel`.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a recording frame must be submitted or cancelled"]
pub struct FrameTicket {
    frame: u64,
}

impl FrameTicket {
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

enum State {
    Idle,
    Recording {
        frame: u64,
    },
    InFlight {
        frame: u64,
        flag: CompletionFlag,
        pending: Pending,
    },
}

/// Guards the record/submit cycle so at most one submission is outstanding.
pub struct SubmissionGate {
    strategy: Box<dyn SubmissionStrategy>,
    policy: BusyPolicy,
    state: State,
    next_frame: u64,
    submitted: u64,
}

impl SubmissionGate {
    pub fn new(strategy: Box<dyn SubmissionStrategy>, policy: BusyPolicy) -> Self {
        Self {
            strategy,
            policy,
            state: State::Idle,
            next_frame: 0,
            submitted: 0,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn policy(&self) -> BusyPolicy {
        self.policy
    }

    /// Starts recording a frame.
    ///
    /// Refused while another frame is recording or a submission is outstanding;
    /// callers must `retire` first.
    pub fn begin_frame(&mut self) -> Result<FrameTicket, SubmitError> {
        match self.state {
            State::Idle => {
                let frame = self.next_frame;
                self.next_frame += 1;
                self.state = State::Recording { frame };
                Ok(FrameTicket { frame })
            }
            State::Recording { .. } => Err(SubmitError::Recording),
            State::InFlight { .. } => Err(SubmitError::Busy),
        }
    }

    /// Applies the busy policy, then begins a frame.
    ///
    /// Returns `Ok(None)` when the policy is `Skip` and the previous submission
    /// has not completed yet.
    pub fn acquire(&mut self) -> Result<Option<FrameTicket>, SubmitError> {
        if self.policy == BusyPolicy::Skip && self.is_busy() {
            return Ok(None);
        }
        self.retire()?;
        self.begin_frame().map(Some)
    }

    /// Hands the recorded frame to the strategy.
    ///
    /// Errors from an inline submission are returned here; errors from a
    /// deferred one surface from the next `retire`.
    pub fn submit(&mut self, ticket: FrameTicket, job: SubmitJob) -> Result<(), SubmitError> {
        let frame = self.check_ticket(&ticket)?;
        self.state = State::Idle;

        let flag = CompletionFlag::new();
        let pending = self.strategy.submit(job, flag.clone())?;
        self.submitted += 1;

        if let Pending::Finished(result) = pending {
            return result.map_err(SubmitError::Failed);
        }

        self.state = State::InFlight {
            frame,
            flag,
            pending,
        };
        Ok(())
    }

    /// Abandons a recording frame without submitting it.
    pub fn cancel(&mut self, ticket: FrameTicket) -> Result<(), SubmitError> {
        self.check_ticket(&ticket)?;
        self.state = State::Idle;
        Ok(())
    }

    /// Blocks until the outstanding submission (if any) has finished.
    ///
    /// A recording frame is left untouched.
    pub fn retire(&mut self) -> Result<(), SubmitError> {
        match mem::replace(&mut self.state, State::Idle) {
            State::InFlight { frame, pending, .. } => {
                let result = pending.wait();
                log::trace!("retired frame {frame}");
                result
            }
            other => {
                self.state = other;
                Ok(())
            }
        }
    }

    /// True while a submission has been started and not yet retired.
    pub fn is_outstanding(&self) -> bool {
        matches!(self.state, State::InFlight { .. })
    }

    /// True while the outstanding submission is still running.
    pub fn is_busy(&self) -> bool {
        match &self.state {
            State::InFlight { flag, .. } => !flag.is_set(),
            _ => false,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, State::Recording { .. })
    }

    pub fn frames_submitted(&self) -> u64 {
        self.submitted
    }

    fn check_ticket(&self, ticket: &FrameTicket) -> Result<u64, SubmitError> {
        match self.state {
            State::Recording { frame } if frame == ticket.frame => Ok(frame),
            State::Recording { frame } => Err(SubmitError::StaleTicket {
                expected: Some(frame),
                got: ticket.frame,
            }),
            _ => Err(SubmitError::StaleTicket {
                expected: None,
                got: ticket.frame,
            }),
        }
    }
}

impl Drop for SubmissionGate {
    fn drop(&mut self) {
        if let Err(e) = self.retire() {
            log::error!("outstanding submission failed during shutdown: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::submit::{DeferredSubmission, ImmediateSubmission};

    fn job(f: impl FnOnce() -> anyhow::Result<()> + Send + 'static) -> SubmitJob {
        Box::new(f)
    }

    fn deferred(policy: BusyPolicy) -> SubmissionGate {
        SubmissionGate::new(Box::new(DeferredSubmission), policy)
    }

    fn immediate() -> SubmissionGate {
        SubmissionGate::new(Box::new(ImmediateSubmission), BusyPolicy::Wait)
    }

    /// A job that blocks until the returned sender fires.
    fn latched() -> (mpsc::Sender<()>, SubmitJob) {
        let (tx, rx) = mpsc::channel::<()>();
        (tx, job(move || {
            let _ = rx.recv();
            Ok(())
        }))
    }

    #[test]
    fn begin_twice_is_refused() {
        let mut gate = immediate();
        let ticket = gate.begin_frame().unwrap();
        assert!(matches!(gate.begin_frame(), Err(SubmitError::Recording)));
        gate.submit(ticket, job(|| Ok(()))).unwrap();
        assert!(gate.begin_frame().is_ok());
    }

    #[test]
    fn begin_while_in_flight_is_refused_until_retired() {
        let mut gate = deferred(BusyPolicy::Wait);
        let (release, work) = latched();
        let ticket = gate.begin_frame().unwrap();
        gate.submit(ticket, work).unwrap();

        assert!(gate.is_outstanding());
        assert!(matches!(gate.begin_frame(), Err(SubmitError::Busy)));

        release.send(()).unwrap();
        gate.retire().unwrap();
        assert!(!gate.is_outstanding());
        assert!(gate.begin_frame().is_ok());
    }

    #[test]
    fn skip_policy_skips_while_busy() {
        let mut gate = deferred(BusyPolicy::Skip);
        let (release, work) = latched();
        let ticket = gate.acquire().unwrap().unwrap();
        gate.submit(ticket, work).unwrap();

        assert!(gate.is_busy());
        assert!(gate.acquire().unwrap().is_none());
        assert!(gate.acquire().unwrap().is_none());

        release.send(()).unwrap();
        let ticket = gate.acquire().unwrap();
        assert!(ticket.is_some());
        assert!(!gate.is_outstanding());
    }

    #[test]
    fn wait_policy_blocks_until_previous_finishes() {
        let mut gate = deferred(BusyPolicy::Wait);
        let done = Arc::new(AtomicBool::new(false));
        let d = done.clone();
        let ticket = gate.acquire().unwrap().unwrap();
        gate.submit(ticket, job(move || {
            thread::sleep(Duration::from_millis(20));
            d.store(true, Ordering::SeqCst);
            Ok(())
        }))
        .unwrap();

        let next = gate.acquire().unwrap();
        assert!(next.is_some());
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn submissions_never_overlap() {
        let mut gate = deferred(BusyPolicy::Wait);
        let active = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        for _ in 0..16 {
            let ticket = gate.acquire().unwrap().unwrap();
            let active = active.clone();
            let max_seen = max_seen.clone();
            gate.submit(ticket, job(move || {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(1));
                active.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();
        }
        gate.retire().unwrap();

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(gate.frames_submitted(), 16);
    }

    #[test]
    fn immediate_failure_is_returned_from_submit() {
        let mut gate = immediate();
        let ticket = gate.begin_frame().unwrap();
        let err = gate
            .submit(ticket, job(|| Err(anyhow::anyhow!("device lost"))))
            .unwrap_err();
        assert!(matches!(err, SubmitError::Failed(_)));
        assert!(!gate.is_outstanding());
        assert!(gate.begin_frame().is_ok());
    }

    #[test]
    fn deferred_failure_surfaces_on_retire() {
        let mut gate = deferred(BusyPolicy::Wait);
        let ticket = gate.begin_frame().unwrap();
        gate.submit(ticket, job(|| Err(anyhow::anyhow!("device lost"))))
            .unwrap();
        assert!(matches!(gate.retire(), Err(SubmitError::Failed(_))));
        assert!(gate.retire().is_ok());
    }

    #[test]
    fn panicking_submission_does_not_wedge_skip_policy() {
        let mut gate = deferred(BusyPolicy::Skip);
        let ticket = gate.begin_frame().unwrap();
        gate.submit(ticket, job(|| panic!("driver crashed"))).unwrap();

        // The flag is set during unwinding, so the gate eventually stops reporting busy.
        while gate.is_busy() {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(matches!(gate.acquire(), Err(SubmitError::Panicked)));
        assert!(gate.acquire().unwrap().is_some());
    }

    #[test]
    fn stale_ticket_is_rejected() {
        let mut gate = immediate();
        let first = gate.begin_frame().unwrap();
        let first_frame = first.frame();
        gate.cancel(first).unwrap();

        let current = gate.begin_frame().unwrap();
        let stale = FrameTicket { frame: first_frame };
        let err = gate.submit(stale, job(|| Ok(()))).unwrap_err();
        assert!(matches!(
            err,
            SubmitError::StaleTicket { expected: Some(1), got: 0 }
        ));
        assert!(gate.is_recording());
        gate.cancel(current).unwrap();
        assert_eq!(gate.frames_submitted(), 0);
    }

    #[test]
    fn retire_while_idle_or_recording_is_a_no_op() {
        let mut gate = immediate();
        assert!(gate.retire().is_ok());
        let ticket = gate.begin_frame().unwrap();
        assert!(gate.retire().is_ok());
        assert!(gate.is_recording());
        gate.cancel(ticket).unwrap();
    }

    #[test]
    fn dropping_the_gate_joins_the_submission() {
        let done = Arc::new(AtomicBool::new(false));
        {
            let mut gate = deferred(BusyPolicy::Wait);
            let d = done.clone();
            let ticket = gate.begin_frame().unwrap();
            gate.submit(ticket, job(move || {
                thread::sleep(Duration::from_millis(20));
                d.store(true, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();
        }
        assert!(done.load(Ordering::SeqCst));
    }
}
