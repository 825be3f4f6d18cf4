//! Decision heuristic of the engine: VSIDS over the variables combined with phase saving.
use std::collections::TryReserveError;

use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use super::Assignments;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::KeyValueHeap;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

const DEFAULT_VSIDS_INCREMENT: f64 = 1.0;
const DEFAULT_VSIDS_MAX_THRESHOLD: f64 = 1e100;
const DEFAULT_VSIDS_VALUE: f64 = 0.0;

/// Selects the next decision literal.
///
/// Variables are ordered by their activity ([VSIDS](https://dl.acm.org/doi/pdf/10.1145/378239.379017)):
/// the more often a variable appears in conflicts, the more likely it is to be decided upon. The
/// polarity of a decision is the value the variable had the last time it was assigned (phase
/// saving), initially `false`.
#[derive(Debug)]
pub(crate) struct VariableSelection {
    heap: KeyValueHeap<Variable, f64>,
    /// How much the activity of a variable is increased when it appears in a conflict.
    increment: f64,
    /// Whenever a conflict is found, the increment is multiplied by 1 / `decay_factor`.
    decay_factor: f64,
    saved_phases: KeyedVec<Variable, bool>,
    random_decision_frequency: f64,
    rng: SmallRng,
}

impl VariableSelection {
    pub(crate) fn new(
        decay_factor: f64,
        random_decision_frequency: f64,
        seed: u64,
    ) -> VariableSelection {
        VariableSelection {
            heap: KeyValueHeap::default(),
            increment: DEFAULT_VSIDS_INCREMENT,
            decay_factor,
            saved_phases: KeyedVec::default(),
            random_decision_frequency,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.heap.try_reserve(additional)?;
        self.saved_phases.try_reserve(additional)
    }

    pub(crate) fn grow(&mut self, num_variables: usize) {
        for index in self.heap.len()..num_variables {
            let variable = Variable::create_from_index(index);
            self.heap.grow(variable, DEFAULT_VSIDS_VALUE);
            self.saved_phases.accomodate(variable, false);
        }
    }

    /// Bumps the activity of a variable after it has been encountered during a conflict.
    pub(crate) fn bump_activity(&mut self, variable: Variable) {
        let activity = self.heap.get_value(variable);
        if activity + self.increment >= DEFAULT_VSIDS_MAX_THRESHOLD {
            self.heap.divide_values(DEFAULT_VSIDS_MAX_THRESHOLD);
            self.increment /= DEFAULT_VSIDS_MAX_THRESHOLD;
        }
        self.heap.increment(variable, self.increment);
    }

    pub(crate) fn decay_activities(&mut self) {
        self.increment *= 1.0 / self.decay_factor;
    }

    /// Makes the variable of the literal available for decisions again and remembers its value.
    pub(crate) fn on_unassign_literal(&mut self, literal: Literal) {
        self.saved_phases[literal.variable()] = literal.is_positive();
        self.heap.restore_key(literal.variable());
    }

    /// Takes the variable out of consideration until [`VariableSelection::restore`] is called.
    pub(crate) fn remove(&mut self, variable: Variable) {
        self.heap.delete_key(variable);
    }

    pub(crate) fn restore(&mut self, variable: Variable) {
        self.heap.restore_key(variable);
    }

    pub(crate) fn saved_phase(&self, variable: Variable) -> bool {
        self.saved_phases[variable]
    }

    /// Returns the next decision, or `None` if every variable under consideration is assigned.
    pub(crate) fn select_decision(&mut self, assignments: &Assignments) -> Option<Literal> {
        if self.random_decision_frequency > 0.0
            && !self.heap.is_empty()
            && self.rng.gen_bool(self.random_decision_frequency.min(1.0))
        {
            let candidate = Variable::create_from_index(self.rng.gen_range(0..self.heap.len()));
            if self.heap.is_key_present(candidate) && !assignments.is_variable_assigned(candidate)
            {
                return Some(Literal::new(candidate, self.saved_phases[candidate]));
            }
        }

        loop {
            let (&candidate, _) = self.heap.peek_max()?;
            if assignments.is_variable_assigned(candidate) {
                let _ = self.heap.pop_max();
            } else {
                return Some(Literal::new(candidate, self.saved_phases[candidate]));
            }
        }
    }
}
