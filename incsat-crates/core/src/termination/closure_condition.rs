use std::fmt::Debug;

use super::TerminationCondition;

/// Adapts a closure into a [`TerminationCondition`]; the solver stops when the closure returns
/// `true`.
pub struct ClosureCondition<F> {
    should_stop: F,
}

impl<F: FnMut() -> bool> ClosureCondition<F> {
    pub fn new(should_stop: F) -> ClosureCondition<F> {
        ClosureCondition { should_stop }
    }
}

impl<F> Debug for ClosureCondition<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureCondition").finish_non_exhaustive()
    }
}

impl<F: FnMut() -> bool> TerminationCondition for ClosureCondition<F> {
    fn should_stop(&mut self) -> bool {
        (self.should_stop)()
    }
}
