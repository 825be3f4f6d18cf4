//! First unique implication point (1UIP) learning with recursive clause minimisation, and the
//! analysis of failed assumptions.
use std::collections::TryReserveError;

use super::learned_clause_manager::compute_lbd;
use super::Assignments;
use super::ClauseDatabase;
use super::ClauseReference;
use super::LearnedClauseManager;
use super::Reason;
use super::VariableSelection;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::KeyedVec;
use crate::incsat_assert_moderate;
use crate::incsat_assert_simple;

#[derive(Debug)]
pub(crate) struct ConflictAnalysisResult {
    /// The learned clause; the first literal is the asserting literal and, if there is more than
    /// one literal, the second literal is from the backjump level.
    pub(crate) learned_clause: Vec<Literal>,
    pub(crate) backjump_level: u32,
    pub(crate) lbd: u32,
    pub(crate) num_removed_by_minimisation: usize,
}

#[derive(Debug, Default)]
pub(crate) struct ConflictAnalyser {
    seen: KeyedVec<Variable, bool>,
    /// Literals whose `seen` flag has to be reset after minimisation.
    to_clear: Vec<Literal>,
    stack: Vec<Literal>,
}

impl ConflictAnalyser {
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.seen.try_reserve(additional)
    }

    pub(crate) fn grow(&mut self, num_variables: usize) {
        if num_variables > 0 {
            self.seen
                .accomodate(Variable::new(num_variables as u32 - 1), false);
        }
    }

    /// Derives a clause from the conflict which is asserting after backjumping. Activities of the
    /// variables and learned clauses involved in the conflict are bumped.
    pub(crate) fn analyse(
        &mut self,
        conflict: ClauseReference,
        assignments: &Assignments,
        clauses: &mut ClauseDatabase,
        selection: &mut VariableSelection,
        learned_clause_manager: &mut LearnedClauseManager,
        minimise: bool,
    ) -> ConflictAnalysisResult {
        let current_level = assignments.decision_level();
        incsat_assert_simple!(current_level > 0);

        // The first slot is reserved for the asserting literal.
        let mut learned_clause = vec![Literal::default()];
        let mut num_current_level_literals = 0;
        let mut trail_index = assignments.num_assigned();
        let mut clause = conflict;
        let mut skip_first = false;

        let asserting_literal = loop {
            learned_clause_manager.update_clause_lbd_and_bump_activity(
                clause,
                assignments,
                clauses,
            );

            // The first literal of a reason clause is the literal it propagated.
            let start = usize::from(skip_first);
            for &literal in &clauses[clause].literals()[start..] {
                let variable = literal.variable();
                let level = assignments.level(variable);
                if self.seen[variable] || level == 0 {
                    continue;
                }

                selection.bump_activity(variable);
                self.seen[variable] = true;
                if level >= current_level {
                    num_current_level_literals += 1;
                } else {
                    learned_clause.push(literal);
                }
            }

            let pivot = loop {
                trail_index -= 1;
                let literal = assignments.trail()[trail_index];
                if self.seen[literal.variable()] {
                    break literal;
                }
            };
            self.seen[pivot.variable()] = false;
            num_current_level_literals -= 1;

            if num_current_level_literals == 0 {
                break pivot;
            }

            clause = match assignments.reason(pivot.variable()) {
                Reason::Propagation(reason) => reason,
                reason => unreachable!("{pivot} is not the last literal of its level but has reason {reason:?}"),
            };
            skip_first = true;
        };
        learned_clause[0] = !asserting_literal;

        let size_before_minimisation = learned_clause.len();
        self.to_clear.clear();
        self.to_clear.extend_from_slice(&learned_clause);
        if minimise {
            self.minimise(&mut learned_clause, assignments, clauses);
        }
        let num_removed_by_minimisation = size_before_minimisation - learned_clause.len();
        for literal in self.to_clear.drain(..) {
            self.seen[literal.variable()] = false;
        }

        // Place a literal of the highest remaining level at the second position.
        let mut backjump_level = 0;
        if learned_clause.len() > 1 {
            let mut max_index = 1;
            for index in 2..learned_clause.len() {
                if assignments.level(learned_clause[index].variable())
                    > assignments.level(learned_clause[max_index].variable())
                {
                    max_index = index;
                }
            }
            learned_clause.swap(1, max_index);
            backjump_level = assignments.level(learned_clause[1].variable());
        }

        incsat_assert_moderate!(learned_clause
            .iter()
            .all(|&literal| assignments.is_literal_false(literal)));

        let lbd = compute_lbd(&learned_clause, assignments);
        ConflictAnalysisResult {
            learned_clause,
            backjump_level,
            lbd,
            num_removed_by_minimisation,
        }
    }

    /// Removes every literal whose negation is implied by the other literals of the clause.
    fn minimise(
        &mut self,
        learned_clause: &mut Vec<Literal>,
        assignments: &Assignments,
        clauses: &ClauseDatabase,
    ) {
        let abstract_levels = learned_clause[1..]
            .iter()
            .fold(0_u32, |levels, literal| {
                levels | Self::abstract_level(assignments.level(literal.variable()))
            });

        let mut kept = 1;
        for index in 1..learned_clause.len() {
            let literal = learned_clause[index];
            let is_decision = !matches!(
                assignments.reason(literal.variable()),
                Reason::Propagation(_)
            );
            if is_decision || !self.is_redundant(literal, abstract_levels, assignments, clauses) {
                learned_clause[kept] = literal;
                kept += 1;
            }
        }
        learned_clause.truncate(kept);
    }

    fn is_redundant(
        &mut self,
        literal: Literal,
        abstract_levels: u32,
        assignments: &Assignments,
        clauses: &ClauseDatabase,
    ) -> bool {
        self.stack.clear();
        self.stack.push(literal);
        let num_cleared_before = self.to_clear.len();

        while let Some(current) = self.stack.pop() {
            let Reason::Propagation(reason) = assignments.reason(current.variable()) else {
                unreachable!("only propagated literals are explored")
            };

            for &antecedent in &clauses[reason].literals()[1..] {
                let variable = antecedent.variable();
                let level = assignments.level(variable);
                if self.seen[variable] || level == 0 {
                    continue;
                }

                let is_propagated =
                    matches!(assignments.reason(variable), Reason::Propagation(_));
                if is_propagated && Self::abstract_level(level) & abstract_levels != 0 {
                    self.seen[variable] = true;
                    self.stack.push(antecedent);
                    self.to_clear.push(antecedent);
                } else {
                    for cleared in self.to_clear.drain(num_cleared_before..) {
                        self.seen[cleared.variable()] = false;
                    }
                    return false;
                }
            }
        }

        true
    }

    fn abstract_level(level: u32) -> u32 {
        1 << (level & 31)
    }

    /// Computes the assumptions responsible for `failed_assumption` being false. The result
    /// contains `failed_assumption` itself together with the decided assumptions which imply its
    /// negation.
    pub(crate) fn analyse_final(
        &mut self,
        failed_assumption: Literal,
        assignments: &Assignments,
        clauses: &ClauseDatabase,
    ) -> Vec<Literal> {
        incsat_assert_simple!(assignments.is_literal_false(failed_assumption));

        let mut core = vec![failed_assumption];
        if assignments.level(failed_assumption.variable()) == 0 {
            return core;
        }

        self.seen[failed_assumption.variable()] = true;
        let trail = assignments.trail();
        for &literal in trail[assignments.trail_start_of_level(1)..].iter().rev() {
            let variable = literal.variable();
            if !self.seen[variable] {
                continue;
            }

            match assignments.reason(variable) {
                Reason::Decision => core.push(literal),
                Reason::Propagation(reason) => {
                    for &antecedent in &clauses[reason].literals()[1..] {
                        if assignments.level(antecedent.variable()) > 0 {
                            self.seen[antecedent.variable()] = true;
                        }
                    }
                }
                Reason::Unit => {}
            }
            self.seen[variable] = false;
        }

        core
    }
}
