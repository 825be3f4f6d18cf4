use super::TerminationCondition;

/// A [`TerminationCondition`] which triggers when one of two given [`TerminationCondition`]s
/// triggers.
#[derive(Clone, Copy, Debug)]
pub struct Combinator<T1, T2> {
    t1: T1,
    t2: T2,
}

impl<T1, T2> Combinator<T1, T2> {
    /// Combine two [`TerminationCondition`]s into one.
    pub fn new(t1: T1, t2: T2) -> Self {
        Combinator { t1, t2 }
    }
}

impl<T1: TerminationCondition, T2: TerminationCondition> TerminationCondition
    for Combinator<T1, T2>
{
    fn should_stop(&mut self) -> bool {
        // Both are polled so that stateful conditions observe every poll.
        let first = self.t1.should_stop();
        let second = self.t2.should_stop();
        first || second
    }

    fn decision_has_been_made(&mut self) {
        self.t1.decision_has_been_made();
        self.t2.decision_has_been_made();
    }

    fn conflict_has_been_found(&mut self) {
        self.t1.conflict_has_been_found();
        self.t2.conflict_has_been_found();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::termination::DecisionBudget;
    use crate::termination::Indefinite;

    #[test]
    fn either_condition_stops_the_combination() {
        let mut combinator = Combinator::new(Indefinite, DecisionBudget::new(2));
        assert!(!combinator.should_stop());
        combinator.decision_has_been_made();
        combinator.decision_has_been_made();
        assert!(combinator.should_stop());
    }
}
