use crate::basic_types::Literal;
use crate::incsat_assert_simple;

/// The state of the search at the moment a conflict is found, as passed to the trail callback
/// (see [`SolverInstance::set_learn_trail`](crate::SolverInstance::set_learn_trail)).
///
/// The snapshot is read-only and only valid for the duration of the callback.
#[derive(Debug, Clone, Copy)]
pub struct TrailSnapshot<'a> {
    conflict: &'a [Literal],
    is_propagated: &'a [bool],
    trail: &'a [Literal],
}

impl<'a> TrailSnapshot<'a> {
    pub(crate) fn new(
        conflict: &'a [Literal],
        is_propagated: &'a [bool],
        trail: &'a [Literal],
    ) -> TrailSnapshot<'a> {
        incsat_assert_simple!(conflict.len() == is_propagated.len());
        TrailSnapshot {
            conflict,
            is_propagated,
            trail,
        }
    }

    /// The literals of the conflicting clause; all of them are false under [`Self::trail`].
    pub fn conflict(&self) -> &'a [Literal] {
        self.conflict
    }

    /// For every literal of [`Self::conflict`], whether its variable was assigned by propagation
    /// (`true`) or by a decision (`false`).
    pub fn is_propagated(&self) -> &'a [bool] {
        self.is_propagated
    }

    /// The literals which are currently true, in assignment order.
    pub fn trail(&self) -> &'a [Literal] {
        self.trail
    }

    /// Iterates over the conflict literals paired with their propagated flag.
    pub fn conflict_with_flags(&self) -> impl Iterator<Item = (Literal, bool)> + 'a {
        self.conflict
            .iter()
            .copied()
            .zip(self.is_propagated.iter().copied())
    }
}
