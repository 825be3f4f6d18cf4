//! Bounded variable elimination and root-level clause simplification.
//!
//! A variable `v` is eliminated by replacing all clauses containing `v` or `!v` with their
//! pairwise resolvents, provided this does not grow the formula. The removed clauses are kept on
//! a reconstruction stack so that models can be extended to the eliminated variables, and so
//! that the variable can be reinstated when it is used again (by a new clause, an assumption or
//! a freeze).
use std::collections::TryReserveError;

use log::debug;

use super::CdclEngine;
use super::ClauseReference;
use super::OutOfMemory;
use super::Reason;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::HashSet;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::incsat_assert_simple;

#[derive(Debug)]
struct EliminationRecord {
    variable: Variable,
    /// The literal of `variable` on the side with the fewest clauses. When extending a model, the
    /// witness is made true only if one of its clauses is not satisfied otherwise.
    witness: Literal,
    /// All clauses which were removed when the variable was eliminated.
    removed_clauses: Vec<Vec<Literal>>,
}

/// The eliminated variables, in the order in which they were eliminated.
#[derive(Debug, Default)]
pub(crate) struct ReconstructionStack {
    records: Vec<EliminationRecord>,
    is_eliminated: KeyedVec<Variable, bool>,
}

impl ReconstructionStack {
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.is_eliminated.try_reserve(additional)
    }

    pub(crate) fn grow(&mut self, num_variables: usize) {
        if num_variables > 0 {
            self.is_eliminated
                .accomodate(Variable::new(num_variables as u32 - 1), false);
        }
    }

    pub(crate) fn is_eliminated(&self, variable: Variable) -> bool {
        self.is_eliminated[variable]
    }

    pub(crate) fn num_eliminated(&self) -> usize {
        self.records.len()
    }

    fn push(&mut self, variable: Variable, witness: Literal, removed_clauses: Vec<Vec<Literal>>) {
        self.is_eliminated[variable] = true;
        self.records.push(EliminationRecord {
            variable,
            witness,
            removed_clauses,
        });
    }

    /// Removes the variable from the stack and returns the clauses which were removed when it was
    /// eliminated.
    fn remove(&mut self, variable: Variable) -> Vec<Vec<Literal>> {
        self.is_eliminated[variable] = false;
        match self
            .records
            .iter()
            .rposition(|record| record.variable == variable)
        {
            Some(position) => self.records.remove(position).removed_clauses,
            None => vec![],
        }
    }

    /// Assigns the eliminated variables such that every removed clause is satisfied, given that
    /// `model` satisfies the remaining clauses.
    pub(crate) fn extend(&self, model: &mut KeyedVec<Variable, bool>) {
        let is_true = |model: &KeyedVec<Variable, bool>, literal: Literal| {
            model[literal.variable()] == literal.is_positive()
        };

        for record in self.records.iter().rev() {
            let witness = record.witness;
            model[record.variable] = !witness.is_positive();

            let witness_is_needed = record
                .removed_clauses
                .iter()
                .filter(|clause| clause.contains(&witness))
                .any(|clause| {
                    clause
                        .iter()
                        .all(|&literal| literal == witness || !is_true(model, literal))
                });
            if witness_is_needed {
                model[record.variable] = witness.is_positive();
            }
        }
    }
}

/// The resolvent of the two clauses on `pivot`, or `None` if it is a tautology. The resolvent is
/// sorted and free of duplicates.
fn resolve(positive: &[Literal], negative: &[Literal], pivot: Variable) -> Option<Vec<Literal>> {
    let mut resolvent: Vec<Literal> = positive
        .iter()
        .chain(negative)
        .copied()
        .filter(|literal| literal.variable() != pivot)
        .collect();
    resolvent.sort_unstable();
    resolvent.dedup();

    // Complementary literals are adjacent after sorting.
    let is_tautology = resolvent
        .windows(2)
        .any(|pair| pair[0].variable() == pair[1].variable());
    (!is_tautology).then_some(resolvent)
}

impl CdclEngine {
    /// Removes satisfied clauses and false literals from all clauses. Requires that the root
    /// level is fully propagated without conflict.
    pub(super) fn simplify_root_clauses(&mut self) {
        incsat_assert_simple!(self.assignments.decision_level() == 0);

        let references: Vec<ClauseReference> = self.clauses.references().collect();
        for reference in references {
            let is_satisfied = self.clauses[reference]
                .literals()
                .iter()
                .any(|&literal| self.assignments.is_literal_true(literal));
            if is_satisfied {
                self.clauses.delete_clause(reference);
                continue;
            }

            let assignments = &self.assignments;
            self.clauses[reference]
                .literals_mut()
                .retain(|&literal| !assignments.is_literal_false(literal));
            incsat_assert_simple!(self.clauses[reference].len() >= 2);
        }

        self.learned_clause_manager
            .forget_deleted_clauses(&self.clauses);
        self.rebuild_watches();
    }

    fn rebuild_watches(&mut self) {
        self.watch_lists.clear();
        for reference in self.clauses.references() {
            self.watch_lists
                .watch_clause(reference, self.clauses[reference].literals());
        }
    }

    /// Performs one round of bounded variable elimination. Returns the number of eliminated
    /// variables.
    pub(super) fn eliminate_variables(
        &mut self,
        protected: &[Literal],
    ) -> Result<usize, OutOfMemory> {
        // The occurrence lists of a round refer to clauses by reference.
        self.clauses.suspend_slot_reuse();
        let result = self.run_elimination_round(protected);
        self.clauses.resume_slot_reuse();
        result
    }

    fn run_elimination_round(&mut self, protected: &[Literal]) -> Result<usize, OutOfMemory> {
        let options = self.options.elimination_options;
        let protected: HashSet<Variable> = protected
            .iter()
            .map(|literal| literal.variable())
            .collect();

        let mut occurrences: KeyedVec<Literal, Vec<ClauseReference>> = KeyedVec::default();
        let num_variables = self.assignments.num_variables();
        if num_variables == 0 {
            return Ok(0);
        }
        occurrences.accomodate(
            Literal::positive(Variable::new(num_variables as u32 - 1)),
            vec![],
        );
        for reference in self.clauses.references() {
            if self.clauses[reference].is_learned() {
                continue;
            }
            for &literal in self.clauses[reference].literals() {
                occurrences[literal].push(reference);
            }
        }

        let mut candidates: Vec<Variable> = (0..num_variables)
            .map(Variable::create_from_index)
            .filter(|&variable| {
                !self.assignments.is_variable_assigned(variable)
                    && !self.reconstruction.is_eliminated(variable)
                    && !self.frozen[variable]
                    && !protected.contains(&variable)
            })
            .filter(|&variable| {
                !occurrences[Literal::positive(variable)].is_empty()
                    || !occurrences[Literal::negative(variable)].is_empty()
            })
            .collect();
        candidates.sort_by_key(|&variable| {
            occurrences[Literal::positive(variable)].len()
                * occurrences[Literal::negative(variable)].len()
        });

        let mut units: Vec<Literal> = vec![];
        let mut touched: HashSet<Variable> = HashSet::default();
        let mut num_eliminated = 0;

        for variable in candidates {
            if touched.contains(&variable) {
                continue;
            }

            let live = |references: &[ClauseReference]| -> Vec<ClauseReference> {
                references
                    .iter()
                    .copied()
                    .filter(|&reference| !self.clauses[reference].is_deleted())
                    .collect()
            };
            let positive = live(&occurrences[Literal::positive(variable)]);
            let negative = live(&occurrences[Literal::negative(variable)]);
            let num_occurrences = positive.len() + negative.len();
            if num_occurrences > options.occurrence_limit {
                continue;
            }

            let Some(resolvents) = self.bounded_resolvents(&positive, &negative, variable) else {
                continue;
            };

            let witness = if positive.len() <= negative.len() {
                Literal::positive(variable)
            } else {
                Literal::negative(variable)
            };
            let removed_clauses: Vec<Vec<Literal>> = positive
                .iter()
                .chain(&negative)
                .map(|&reference| self.clauses[reference].literals().to_vec())
                .collect();
            for &reference in positive.iter().chain(&negative) {
                self.clauses.delete_clause(reference);
            }
            self.reconstruction.push(variable, witness, removed_clauses);
            self.selection.remove(variable);
            num_eliminated += 1;

            for resolvent in resolvents {
                if resolvent.len() == 1 {
                    units.push(resolvent[0]);
                    let _ = touched.insert(resolvent[0].variable());
                    continue;
                }

                let reference = self.clauses.create_clause(&resolvent, false, 0)?;
                for &literal in &resolvent {
                    occurrences[literal].push(reference);
                }
            }
        }

        self.remove_learned_clauses_with_eliminated_variables();
        self.learned_clause_manager
            .forget_deleted_clauses(&self.clauses);
        self.rebuild_watches();

        for unit in units {
            match self.assignments.literal_value(unit) {
                Some(true) => {}
                Some(false) => self.is_inconsistent = true,
                None => self.assignments.enqueue(unit, Reason::Unit),
            }
        }

        self.statistics.num_eliminated_variables = self.reconstruction.num_eliminated() as u64;
        debug!(
            "eliminated {num_eliminated} variables, {} irredundant clauses remain",
            self.clauses.num_irredundant()
        );
        Ok(num_eliminated)
    }

    /// All non-tautological resolvents on `variable`, or `None` if eliminating the variable would
    /// exceed the elimination bounds.
    fn bounded_resolvents(
        &self,
        positive: &[ClauseReference],
        negative: &[ClauseReference],
        variable: Variable,
    ) -> Option<Vec<Vec<Literal>>> {
        let options = self.options.elimination_options;
        let max_resolvents = positive.len() + negative.len() + options.clause_growth;

        let mut resolvents = vec![];
        for &positive_clause in positive {
            for &negative_clause in negative {
                let Some(resolvent) = resolve(
                    self.clauses[positive_clause].literals(),
                    self.clauses[negative_clause].literals(),
                    variable,
                ) else {
                    continue;
                };

                if resolvent.len() > options.resolvent_length_limit
                    || resolvents.len() >= max_resolvents
                {
                    return None;
                }
                resolvents.push(resolvent);
            }
        }

        Some(resolvents)
    }

    fn remove_learned_clauses_with_eliminated_variables(&mut self) {
        let references: Vec<ClauseReference> = self
            .clauses
            .references()
            .filter(|&reference| {
                self.clauses[reference].is_learned()
                    && self.clauses[reference]
                        .literals()
                        .iter()
                        .any(|literal| self.reconstruction.is_eliminated(literal.variable()))
            })
            .collect();
        for reference in references {
            self.clauses.delete_clause(reference);
        }
    }

    /// Makes an eliminated variable a regular variable again by restoring the clauses which were
    /// removed when it was eliminated.
    pub(super) fn reinstate_variable(&mut self, variable: Variable) -> Result<(), OutOfMemory> {
        if !self.reconstruction.is_eliminated(variable) {
            return Ok(());
        }

        let removed_clauses = self.reconstruction.remove(variable);
        self.selection.restore(variable);
        self.statistics.num_eliminated_variables = self.reconstruction.num_eliminated() as u64;
        debug!(
            "reinstating variable {variable} with {} clauses",
            removed_clauses.len()
        );

        for clause in removed_clauses {
            self.add_clause_at_root(&clause)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literals(codes: &[i32]) -> Vec<Literal> {
        codes
            .iter()
            .map(|&code| Literal::try_from(code).expect("valid literal"))
            .collect()
    }

    #[test]
    fn tautological_resolvents_are_skipped() {
        let pivot = Variable::new(0);
        assert_eq!(resolve(&literals(&[1, 2]), &literals(&[-1, -2]), pivot), None);

        let resolvent = resolve(&literals(&[1, 2, 3]), &literals(&[-1, 3, 4]), pivot);
        assert_eq!(resolvent, Some(literals(&[2, 3, 4])));
    }

    #[test]
    fn extension_satisfies_removed_clauses() {
        let mut stack = ReconstructionStack::default();
        stack.grow(3);
        // Eliminate 1 from (1 v 2), (-1 v 3).
        stack.push(
            Variable::new(0),
            Literal::try_from(1).expect("valid literal"),
            vec![literals(&[1, 2]), literals(&[-1, 3])],
        );

        let mut model = KeyedVec::default();
        model.accomodate(Variable::new(2), false);

        // 2 false forces 1 true, which requires 3.
        model[Variable::new(2)] = true;
        stack.extend(&mut model);
        assert!(model[Variable::new(0)]);

        // 2 true allows 1 to be false.
        model[Variable::new(1)] = true;
        model[Variable::new(2)] = false;
        stack.extend(&mut model);
        assert!(!model[Variable::new(0)]);
    }
}
