//! A [`TerminationCondition`] is a condition which is polled by the solver during the search
//! process. It indicates when the solver should stop, even if no definitive conclusions have been
//! made. The most common example would be [`TimeBudget`], which gives the solver a certain time
//! budget to complete its search.
//!
//! The solver polls its condition once per search iteration, i.e. after every conflict and before
//! every decision.

mod closure_condition;
mod combinator;
mod conflict_budget;
mod decision_budget;
mod indefinite;
mod interrupt;
mod time_budget;

pub use closure_condition::ClosureCondition;
pub use combinator::Combinator;
pub use conflict_budget::ConflictBudget;
pub use decision_budget::DecisionBudget;
pub use indefinite::Indefinite;
pub use interrupt::InterruptHandle;
pub use time_budget::TimeBudget;

/// The central trait that defines a termination condition. A termination condition determines when
/// the solver should give up searching.
pub trait TerminationCondition {
    /// Returns `true` when the solver should stop, `false` otherwise.
    fn should_stop(&mut self) -> bool;

    fn decision_has_been_made(&mut self) {}

    fn conflict_has_been_found(&mut self) {}
}

impl<T: TerminationCondition> TerminationCondition for Option<T> {
    fn should_stop(&mut self) -> bool {
        match self {
            Some(t) => t.should_stop(),
            None => false,
        }
    }

    fn decision_has_been_made(&mut self) {
        if let Some(t) = self {
            t.decision_has_been_made()
        }
    }

    fn conflict_has_been_found(&mut self) {
        if let Some(t) = self {
            t.conflict_has_been_found()
        }
    }
}

impl<T: TerminationCondition + ?Sized> TerminationCondition for Box<T> {
    fn should_stop(&mut self) -> bool {
        (**self).should_stop()
    }

    fn decision_has_been_made(&mut self) {
        (**self).decision_has_been_made()
    }

    fn conflict_has_been_found(&mut self) {
        (**self).conflict_has_been_found()
    }
}

impl<T: TerminationCondition + ?Sized> TerminationCondition for &mut T {
    fn should_stop(&mut self) -> bool {
        (**self).should_stop()
    }

    fn decision_has_been_made(&mut self) {
        (**self).decision_has_been_made()
    }

    fn conflict_has_been_found(&mut self) {
        (**self).conflict_has_been_found()
    }
}
