use super::TerminationCondition;

/// A [`TerminationCondition`] which triggers once the given number of conflicts has been found.
#[derive(Debug, Copy, Clone)]
pub struct ConflictBudget {
    budget: u64,
    num_conflicts: u64,
}

impl ConflictBudget {
    pub fn new(budget: u64) -> Self {
        Self {
            budget,
            num_conflicts: 0,
        }
    }
}

impl TerminationCondition for ConflictBudget {
    fn should_stop(&mut self) -> bool {
        self.num_conflicts >= self.budget
    }

    fn conflict_has_been_found(&mut self) {
        self.num_conflicts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decisions_do_not_count_towards_the_budget() {
        let mut budget = ConflictBudget::new(1);
        budget.decision_has_been_made();
        assert!(!budget.should_stop());
        budget.conflict_has_been_found();
        assert!(budget.should_stop());
    }

    #[test]
    fn zero_budget_stops_immediately() {
        assert!(ConflictBudget::new(0).should_stop());
    }
}
