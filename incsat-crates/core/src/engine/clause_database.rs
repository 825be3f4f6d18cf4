//! Storage for the clauses of the engine.
//!
//! Clauses are addressed through [`ClauseReference`]s; the slot of a deleted clause is reused by
//! later allocations. Every allocation reserves its memory fallibly, so that running out of
//! memory surfaces as an [`OutOfMemory`] error instead of an abort.
use std::mem::size_of;
use std::ops::Index;
use std::ops::IndexMut;

use thiserror::Error;

use crate::basic_types::Literal;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::incsat_assert_moderate;
use crate::incsat_assert_simple;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ClauseReference {
    id: u32,
}

impl StorageKey for ClauseReference {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        ClauseReference { id: index as u32 }
    }
}

/// The engine could not reserve memory for a new clause or for new variables.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutOfMemory {
    #[error("failed to reserve memory for a clause of {0} literals")]
    Clause(usize),
    #[error("failed to reserve memory for {0} variables")]
    Variables(usize),
}

#[derive(Debug)]
pub(crate) struct Clause {
    literals: Vec<Literal>,
    is_learned: bool,
    is_deleted: bool,
    is_protected_against_deletion: bool,
    lbd: u32,
    activity: f32,
}

impl Clause {
    pub(crate) fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub(crate) fn literals_mut(&mut self) -> &mut Vec<Literal> {
        &mut self.literals
    }

    pub(crate) fn len(&self) -> usize {
        self.literals.len()
    }

    pub(crate) fn is_learned(&self) -> bool {
        self.is_learned
    }

    pub(crate) fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub(crate) fn lbd(&self) -> u32 {
        self.lbd
    }

    pub(crate) fn update_lbd(&mut self, lbd: u32) {
        self.lbd = lbd;
    }

    pub(crate) fn activity(&self) -> f32 {
        self.activity
    }

    pub(crate) fn increase_activity(&mut self, increment: f32) {
        self.activity += increment;
    }

    pub(crate) fn divide_activity(&mut self, divisor: f32) {
        self.activity /= divisor;
    }

    pub(crate) fn is_protected_against_deletion(&self) -> bool {
        self.is_protected_against_deletion
    }

    pub(crate) fn mark_protection_against_deletion(&mut self) {
        self.is_protected_against_deletion = true;
    }

    pub(crate) fn clear_protection_against_deletion(&mut self) {
        self.is_protected_against_deletion = false;
    }
}

#[derive(Debug, Default)]
pub(crate) struct ClauseDatabase {
    clauses: KeyedVec<ClauseReference, Clause>,
    deleted_clause_references: Vec<ClauseReference>,
    /// While set, new clauses never take the slot of a deleted clause, so references collected
    /// earlier cannot start pointing at a different clause.
    is_slot_reuse_suspended: bool,
    num_irredundant: usize,
    allocated_bytes: usize,
    peak_allocated_bytes: usize,
    memory_limit: Option<usize>,
}

impl ClauseDatabase {
    pub(crate) fn new(memory_limit: Option<usize>) -> ClauseDatabase {
        ClauseDatabase {
            memory_limit,
            ..Default::default()
        }
    }

    pub(crate) fn create_clause(
        &mut self,
        literals: &[Literal],
        is_learned: bool,
        lbd: u32,
    ) -> Result<ClauseReference, OutOfMemory> {
        incsat_assert_simple!(literals.len() >= 2);

        let bytes = Self::footprint(literals.len());
        if self
            .memory_limit
            .is_some_and(|limit| self.allocated_bytes + bytes > limit)
        {
            return Err(OutOfMemory::Clause(literals.len()));
        }

        let mut stored_literals = Vec::new();
        stored_literals
            .try_reserve_exact(literals.len())
            .map_err(|_| OutOfMemory::Clause(literals.len()))?;
        stored_literals.extend_from_slice(literals);

        let clause = Clause {
            literals: stored_literals,
            is_learned,
            is_deleted: false,
            is_protected_against_deletion: false,
            lbd,
            activity: 0.0,
        };

        let reusable_slot = if self.is_slot_reuse_suspended {
            None
        } else {
            self.deleted_clause_references.pop()
        };
        let reference = if let Some(reference) = reusable_slot {
            self.clauses[reference] = clause;
            reference
        } else {
            self.clauses
                .try_reserve(1)
                .map_err(|_| OutOfMemory::Clause(literals.len()))?;
            self.clauses.push(clause)
        };

        if !is_learned {
            self.num_irredundant += 1;
        }
        self.allocated_bytes += bytes;
        self.peak_allocated_bytes = self.peak_allocated_bytes.max(self.allocated_bytes);

        Ok(reference)
    }

    /// Deletes the clause; the caller is responsible for removing it from the watch lists.
    pub(crate) fn delete_clause(&mut self, reference: ClauseReference) {
        let clause = &mut self.clauses[reference];
        incsat_assert_moderate!(!clause.is_deleted, "clause was deleted twice");

        let bytes = Self::footprint(clause.literals.len());
        clause.is_deleted = true;
        clause.literals = Vec::new();

        if !clause.is_learned {
            self.num_irredundant -= 1;
        }
        self.allocated_bytes -= bytes;
        self.deleted_clause_references.push(reference);
    }

    pub(crate) fn suspend_slot_reuse(&mut self) {
        self.is_slot_reuse_suspended = true;
    }

    pub(crate) fn resume_slot_reuse(&mut self) {
        self.is_slot_reuse_suspended = false;
    }

    /// Iterates over the references of all clauses which have not been deleted.
    pub(crate) fn references(&self) -> impl Iterator<Item = ClauseReference> + '_ {
        self.clauses
            .keys()
            .filter(|&reference| !self.clauses[reference].is_deleted)
    }

    pub(crate) fn num_irredundant(&self) -> usize {
        self.num_irredundant
    }

    pub(crate) fn peak_allocated_bytes(&self) -> usize {
        self.peak_allocated_bytes
    }

    fn footprint(num_literals: usize) -> usize {
        size_of::<Clause>() + num_literals * size_of::<Literal>()
    }
}

impl Index<ClauseReference> for ClauseDatabase {
    type Output = Clause;

    fn index(&self, reference: ClauseReference) -> &Clause {
        &self.clauses[reference]
    }
}

impl IndexMut<ClauseReference> for ClauseDatabase {
    fn index_mut(&mut self, reference: ClauseReference) -> &mut Clause {
        &mut self.clauses[reference]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Variable;

    fn literals(codes: &[i32]) -> Vec<Literal> {
        codes
            .iter()
            .map(|&code| Literal::try_from(code).expect("valid literal"))
            .collect()
    }

    #[test]
    fn deleted_slots_are_reused() {
        let mut database = ClauseDatabase::default();
        let first = database
            .create_clause(&literals(&[1, 2]), false, 0)
            .expect("no memory limit");
        let _ = database
            .create_clause(&literals(&[-1, 3]), true, 2)
            .expect("no memory limit");
        assert_eq!(database.num_irredundant(), 1);
        assert_eq!(database.references().count(), 2);

        database.delete_clause(first);
        let reused = database
            .create_clause(&literals(&[2, 3, 4]), false, 0)
            .expect("no memory limit");

        assert_eq!(reused, first);
        assert_eq!(database.references().count(), 2);
        assert_eq!(
            database[reused].literals()[2],
            Literal::positive(Variable::new(3))
        );
    }

    #[test]
    fn suspended_slots_are_not_reused() {
        let mut database = ClauseDatabase::default();
        let first = database
            .create_clause(&literals(&[1, 2]), false, 0)
            .expect("no memory limit");

        database.suspend_slot_reuse();
        database.delete_clause(first);
        let fresh = database
            .create_clause(&literals(&[-1, 3]), false, 0)
            .expect("no memory limit");
        assert_ne!(fresh, first);
        assert!(database[first].is_deleted());

        database.resume_slot_reuse();
        let reused = database
            .create_clause(&literals(&[2, 3]), false, 0)
            .expect("no memory limit");
        assert_eq!(reused, first);
        assert_eq!(database.num_irredundant(), 2);
    }

    #[test]
    fn memory_limit_is_enforced() {
        let limit = ClauseDatabase::footprint(2);
        let mut database = ClauseDatabase::new(Some(limit));

        let first = database.create_clause(&literals(&[1, 2]), false, 0);
        assert!(first.is_ok());
        assert_eq!(
            database.create_clause(&literals(&[1, 3]), false, 0),
            Err(OutOfMemory::Clause(2))
        );
        assert_eq!(database.peak_allocated_bytes(), limit);
    }
}
