use std::collections::TryReserveError;

use super::ClauseReference;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::KeyedVec;

/// A clause watching one of its first two literals; `blocker` is another literal of the clause
/// which, if true, means the clause does not need to be inspected.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Watcher {
    pub(crate) clause: ClauseReference,
    pub(crate) blocker: Literal,
}

/// Two-watched-literal index. The list of a literal `p` holds the clauses which watch `!p`, i.e.
/// the clauses which have to be visited once `p` becomes true.
#[derive(Debug, Default)]
pub(crate) struct WatchLists {
    watchers: KeyedVec<Literal, Vec<Watcher>>,
}

impl WatchLists {
    pub(crate) fn try_reserve(&mut self, additional_variables: usize) -> Result<(), TryReserveError> {
        self.watchers.try_reserve(additional_variables.saturating_mul(2))
    }

    pub(crate) fn grow(&mut self, num_variables: usize) {
        if num_variables > 0 {
            let last = Variable::new(num_variables as u32 - 1);
            self.watchers.accomodate(Literal::positive(last), Vec::new());
        }
    }

    pub(crate) fn watch_clause(&mut self, clause: ClauseReference, literals: &[Literal]) {
        self.watchers[!literals[0]].push(Watcher {
            clause,
            blocker: literals[1],
        });
        self.watchers[!literals[1]].push(Watcher {
            clause,
            blocker: literals[0],
        });
    }

    pub(crate) fn unwatch_clause(&mut self, clause: ClauseReference, literals: &[Literal]) {
        for &watched in &literals[..2] {
            self.watchers[!watched].retain(|watcher| watcher.clause != clause);
        }
    }

    pub(crate) fn add_watcher(&mut self, literal: Literal, watcher: Watcher) {
        self.watchers[literal].push(watcher);
    }

    /// Takes the watchers of `literal` out of the index; they have to be given back with
    /// [`WatchLists::restore`].
    pub(crate) fn take(&mut self, literal: Literal) -> Vec<Watcher> {
        std::mem::take(&mut self.watchers[literal])
    }

    pub(crate) fn restore(&mut self, literal: Literal, watchers: Vec<Watcher>) {
        self.watchers[literal] = watchers;
    }

    pub(crate) fn clear(&mut self) {
        self.watchers.iter_mut().for_each(Vec::clear);
    }
}
