use std::collections::TryReserveError;

use super::ClauseReference;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::KeyedVec;
use crate::incsat_assert_moderate;
use crate::incsat_assert_simple;

/// Why a literal was assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Reason {
    /// The literal was decided, either by the search or because it is an assumption.
    Decision,
    /// The literal was added as a unit clause.
    Unit,
    /// The clause became unit and its first literal is the propagated literal.
    Propagation(ClauseReference),
}

#[derive(Clone, Copy, Debug)]
struct VariableAssignment {
    value: Option<bool>,
    level: u32,
    reason: Reason,
}

impl Default for VariableAssignment {
    fn default() -> Self {
        VariableAssignment {
            value: None,
            level: 0,
            reason: Reason::Decision,
        }
    }
}

/// The partial assignment of the engine together with the trail in which it was built up.
#[derive(Debug, Default)]
pub(crate) struct Assignments {
    assignments: KeyedVec<Variable, VariableAssignment>,
    trail: Vec<Literal>,
    /// `trail_delimiters[i]` is the position in the trail where decision level `i + 1` starts.
    trail_delimiters: Vec<usize>,
}

impl Assignments {
    /// The trail holds at most one literal per variable, so it is reserved along with the
    /// variables.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.assignments.try_reserve(additional)?;
        self.trail.try_reserve(additional)
    }

    pub(crate) fn grow(&mut self, num_variables: usize) {
        if num_variables > self.assignments.len() {
            self.assignments.accomodate(
                Variable::new(num_variables as u32 - 1),
                VariableAssignment::default(),
            );
        }
    }

    pub(crate) fn num_variables(&self) -> usize {
        self.assignments.len()
    }

    pub(crate) fn literal_value(&self, literal: Literal) -> Option<bool> {
        self.assignments[literal.variable()]
            .value
            .map(|value| value == literal.is_positive())
    }

    pub(crate) fn is_literal_true(&self, literal: Literal) -> bool {
        self.literal_value(literal) == Some(true)
    }

    pub(crate) fn is_literal_false(&self, literal: Literal) -> bool {
        self.literal_value(literal) == Some(false)
    }

    pub(crate) fn is_variable_assigned(&self, variable: Variable) -> bool {
        self.assignments[variable].value.is_some()
    }

    /// The value of the literal if it is assigned at the root level.
    pub(crate) fn root_value(&self, literal: Literal) -> Option<bool> {
        if self.assignments[literal.variable()].level == 0 {
            self.literal_value(literal)
        } else {
            None
        }
    }

    pub(crate) fn level(&self, variable: Variable) -> u32 {
        self.assignments[variable].level
    }

    pub(crate) fn reason(&self, variable: Variable) -> Reason {
        self.assignments[variable].reason
    }

    pub(crate) fn decision_level(&self) -> u32 {
        self.trail_delimiters.len() as u32
    }

    pub(crate) fn increase_decision_level(&mut self) {
        self.trail_delimiters.push(self.trail.len());
    }

    pub(crate) fn enqueue(&mut self, literal: Literal, reason: Reason) {
        incsat_assert_moderate!(
            self.literal_value(literal).is_none(),
            "literal {literal} is already assigned"
        );
        let level = self.decision_level();
        self.assignments[literal.variable()] = VariableAssignment {
            value: Some(literal.is_positive()),
            level,
            reason,
        };
        self.trail.push(literal);
    }

    pub(crate) fn trail(&self) -> &[Literal] {
        &self.trail
    }

    pub(crate) fn num_assigned(&self) -> usize {
        self.trail.len()
    }

    /// The first position in the trail of the given decision level.
    pub(crate) fn trail_start_of_level(&self, level: u32) -> usize {
        if level == 0 {
            0
        } else {
            self.trail_delimiters[level as usize - 1]
        }
    }

    /// Undoes all assignments above `level`, reporting every unassigned literal.
    pub(crate) fn backtrack(&mut self, level: u32, mut on_unassign: impl FnMut(Literal)) {
        incsat_assert_simple!(level <= self.decision_level());
        if level == self.decision_level() {
            return;
        }

        let new_trail_length = self.trail_delimiters[level as usize];
        for literal in self.trail.drain(new_trail_length..).rev() {
            self.assignments[literal.variable()] = VariableAssignment::default();
            on_unassign(literal);
        }
        self.trail_delimiters.truncate(level as usize);
    }
}
