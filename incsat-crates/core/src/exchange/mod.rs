//! Cooperative solving with several [`SolverInstance`](crate::SolverInstance)s which share their
//! learned clauses.
//!
//! Exactly one instance of a [`Portfolio`] is solving at any time. Its learn callback adds every
//! short learned clause to the other, idle, instances, so the clauses are available to them in
//! their next turn.
mod portfolio;

pub use portfolio::Portfolio;
