use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Completion flag for one submission.
///
/// Written only by the submission task, read by the loop. Clones share the
/// same flag.
#[derive(Debug, Clone, Default)]
pub struct CompletionFlag(Arc<AtomicBool>);

impl CompletionFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Returns a guard that sets the flag when dropped, including during unwinding.
    pub(crate) fn set_on_drop(&self) -> SetOnDrop {
        SetOnDrop(self.clone())
    }

    fn set(&self) {
        self.0.store(true, Ordering::Release);
    }
}

pub(crate) struct SetOnDrop(CompletionFlag);

impl Drop for SetOnDrop {
    fn drop(&mut self) {
        self.0.set();
    }
}
