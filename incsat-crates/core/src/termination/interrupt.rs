use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::TerminationCondition;

/// A shared flag which asks a [`SolverInstance`](crate::SolverInstance) to stop its current
/// `solve` call.
///
/// The handle is [`Send`] and cheap to clone, so it can be triggered from another thread or from a
/// signal handler. The flag is cleared when the next `solve` call starts.
#[derive(Clone, Debug, Default)]
pub struct InterruptHandle {
    interrupted: Arc<AtomicBool>,
}

impl InterruptHandle {
    pub fn new() -> InterruptHandle {
        InterruptHandle::default()
    }

    /// Request the solver to stop at its next poll point.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Relaxed);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Relaxed)
    }

    pub(crate) fn reset(&self) {
        self.interrupted.store(false, Ordering::Relaxed);
    }

    /// The flag shared by all clones of this handle, e.g. for registering it with a signal
    /// handler.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }
}

impl TerminationCondition for InterruptHandle {
    fn should_stop(&mut self) -> bool {
        self.is_interrupted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let mut handle = InterruptHandle::new();
        let other = handle.clone();

        std::thread::spawn(move || other.interrupt())
            .join()
            .expect("interrupting thread should not panic");

        assert!(handle.should_stop());
        handle.reset();
        assert!(!handle.should_stop());
    }
}
