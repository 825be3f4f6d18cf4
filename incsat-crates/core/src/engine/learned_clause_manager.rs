//! Keeps the learned clause database at a manageable size.
//!
//! Learned clauses are split into two tiers by their literal block distance (LBD). Clauses with
//! an LBD of at most [`LearningOptions::lbd_threshold`] are kept forever. Once the other tier
//! holds more than [`LearningOptions::limit_high_lbd_clauses`] clauses, the clauses which have
//! improved their LBD are promoted and roughly half of the remaining ones are removed, worst
//! first.
use log::trace;

use super::Assignments;
use super::ClauseDatabase;
use super::ClauseReference;
use super::LearnedClauseSortingStrategy;
use super::LearningOptions;
use super::Reason;
use super::WatchLists;
use crate::basic_types::Literal;
use crate::incsat_assert_moderate;

/// Learned clauses whose LBD drops to this value during search are protected from the next
/// reduction.
const PROTECTION_LBD: u32 = 30;

#[derive(Debug)]
pub(crate) struct LearnedClauseManager {
    low_lbd: Vec<ClauseReference>,
    high_lbd: Vec<ClauseReference>,
    options: LearningOptions,
    clause_bump_increment: f32,
}

impl LearnedClauseManager {
    pub(crate) fn new(options: LearningOptions) -> Self {
        LearnedClauseManager {
            low_lbd: vec![],
            high_lbd: vec![],
            options,
            clause_bump_increment: 1.0,
        }
    }

    pub(crate) fn add_learned_clause(&mut self, reference: ClauseReference, lbd: u32) {
        if lbd <= self.options.lbd_threshold {
            self.low_lbd.push(reference);
        } else {
            self.high_lbd.push(reference);
        }
    }

    /// Removes references to clauses which have been deleted outside of the manager, e.g. by
    /// simplification. Must be called before the freed slots are reused for learned clauses.
    pub(crate) fn forget_deleted_clauses(&mut self, clauses: &ClauseDatabase) {
        let is_live = |reference: &ClauseReference| {
            !clauses[*reference].is_deleted() && clauses[*reference].is_learned()
        };
        self.low_lbd.retain(is_live);
        self.high_lbd.retain(is_live);
    }

    /// Returns whether a reduction took place.
    pub(crate) fn shrink_learned_clause_database_if_needed(
        &mut self,
        clauses: &mut ClauseDatabase,
        watch_lists: &mut WatchLists,
        assignments: &Assignments,
    ) -> bool {
        if self.high_lbd.len() <= self.options.limit_high_lbd_clauses {
            return false;
        }

        self.promote_high_lbd_clauses(clauses);
        self.remove_high_lbd_clauses(clauses, watch_lists, assignments);
        true
    }

    fn remove_high_lbd_clauses(
        &mut self,
        clauses: &mut ClauseDatabase,
        watch_lists: &mut WatchLists,
        assignments: &Assignments,
    ) {
        self.sort_high_lbd_clauses_by_quality_decreasing_order(clauses);

        let mut num_clauses_to_remove = self
            .high_lbd
            .len()
            .saturating_sub(self.options.limit_high_lbd_clauses / 2);
        let num_clauses_before = self.high_lbd.len();

        // Poor clauses are at the back.
        for &reference in self.high_lbd.iter().rev() {
            if num_clauses_to_remove == 0 {
                break;
            }

            if clauses[reference].is_protected_against_deletion() {
                clauses[reference].clear_protection_against_deletion();
                continue;
            }

            // Reasons for the current assignment have to stay for conflict analysis.
            if Self::is_clause_propagating(reference, clauses, assignments) {
                continue;
            }

            watch_lists.unwatch_clause(reference, clauses[reference].literals());
            clauses.delete_clause(reference);
            num_clauses_to_remove -= 1;
        }

        self.high_lbd
            .retain(|&reference| !clauses[reference].is_deleted());

        trace!(
            "reduced learned clauses from {num_clauses_before} to {}",
            self.high_lbd.len()
        );
    }

    fn is_clause_propagating(
        reference: ClauseReference,
        clauses: &ClauseDatabase,
        assignments: &Assignments,
    ) -> bool {
        let propagated = clauses[reference].literals()[0];
        assignments.is_literal_true(propagated)
            && assignments.reason(propagated.variable()) == Reason::Propagation(reference)
    }

    fn sort_high_lbd_clauses_by_quality_decreasing_order(&mut self, clauses: &ClauseDatabase) {
        let strategy = self.options.sorting_strategy;
        self.high_lbd.sort_unstable_by(|&first, &second| {
            let first = &clauses[first];
            let second = &clauses[second];

            // A higher activity is better, so the comparison is reversed.
            let by_activity = second.activity().total_cmp(&first.activity());
            match strategy {
                LearnedClauseSortingStrategy::Activity => by_activity,
                LearnedClauseSortingStrategy::Lbd => {
                    first.lbd().cmp(&second.lbd()).then(by_activity)
                }
            }
        });
    }

    fn promote_high_lbd_clauses(&mut self, clauses: &ClauseDatabase) {
        let threshold = self.options.lbd_threshold;
        for &reference in &self.high_lbd {
            if clauses[reference].lbd() <= threshold {
                self.low_lbd.push(reference);
            }
        }
        self.high_lbd
            .retain(|&reference| clauses[reference].lbd() > threshold);
    }

    /// Called for every learned clause which takes part in conflict analysis.
    pub(crate) fn update_clause_lbd_and_bump_activity(
        &mut self,
        reference: ClauseReference,
        assignments: &Assignments,
        clauses: &mut ClauseDatabase,
    ) {
        if clauses[reference].is_learned() && clauses[reference].lbd() > self.options.lbd_threshold
        {
            self.bump_clause_activity(reference, clauses);
            self.update_lbd(reference, assignments, clauses);
        }
    }

    fn update_lbd(
        &mut self,
        reference: ClauseReference,
        assignments: &Assignments,
        clauses: &mut ClauseDatabase,
    ) {
        let new_lbd = compute_lbd(clauses[reference].literals(), assignments);
        if new_lbd < clauses[reference].lbd() {
            clauses[reference].update_lbd(new_lbd);
            if new_lbd <= PROTECTION_LBD {
                clauses[reference].mark_protection_against_deletion();
            }
        }
    }

    fn bump_clause_activity(&mut self, reference: ClauseReference, clauses: &mut ClauseDatabase) {
        if clauses[reference].activity() + self.clause_bump_increment > self.options.max_activity {
            self.rescale_clause_activities(clauses);
        }
        clauses[reference].increase_activity(self.clause_bump_increment);
    }

    fn rescale_clause_activities(&mut self, clauses: &mut ClauseDatabase) {
        for &reference in &self.high_lbd {
            clauses[reference].divide_activity(self.options.max_activity);
        }
        self.clause_bump_increment /= self.options.max_activity;
    }

    pub(crate) fn decay_clause_activities(&mut self) {
        self.clause_bump_increment /= self.options.activity_decay_factor;
    }

    #[cfg(test)]
    fn num_tiered_clauses(&self) -> (usize, usize) {
        (self.low_lbd.len(), self.high_lbd.len())
    }
}

/// The number of distinct non-root decision levels among the (assigned) literals.
pub(crate) fn compute_lbd(literals: &[Literal], assignments: &Assignments) -> u32 {
    incsat_assert_moderate!(
        literals
            .iter()
            .all(|&literal| assignments.literal_value(literal).is_some()),
        "Cannot compute LBD if not all literals are assigned."
    );
    let mut levels: Vec<u32> = literals
        .iter()
        .map(|literal| assignments.level(literal.variable()))
        .filter(|&level| level > 0)
        .collect();
    levels.sort_unstable();
    levels.dedup();
    levels.len() as u32
}
