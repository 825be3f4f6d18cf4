//! The search engine behind a [`SolverInstance`](crate::SolverInstance).
//!
//! The instance only talks to the engine through the [`SolvingEngine`] trait; events during
//! search are reported back through [`EngineHooks`].
mod assignments;
mod cdcl_engine;
mod clause_database;
mod conflict_analysis;
mod elimination;
mod engine_statistics;
mod learned_clause_manager;
mod options;
mod restart_strategy;
mod variable_selection;
mod watch_lists;

use std::fmt::Debug;

pub(crate) use assignments::Assignments;
pub(crate) use assignments::Reason;
pub(crate) use cdcl_engine::CdclEngine;
pub(crate) use clause_database::ClauseDatabase;
pub(crate) use clause_database::ClauseReference;
pub(crate) use clause_database::OutOfMemory;
pub(crate) use conflict_analysis::ConflictAnalyser;
pub(crate) use learned_clause_manager::LearnedClauseManager;
pub use options::EliminationOptions;
pub use options::LearnedClauseSortingStrategy;
pub use options::LearningOptions;
pub use options::SolverOptions;
pub use restart_strategy::RestartOptions;
pub(crate) use restart_strategy::RestartStrategy;
pub(crate) use variable_selection::VariableSelection;
pub(crate) use watch_lists::WatchLists;
pub(crate) use watch_lists::Watcher;

use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::callbacks::TrailSnapshot;
use crate::statistics::SolverStatistics;
use crate::statistics::StatisticLogger;

/// How a call into the engine ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EngineOutcome {
    Satisfiable,
    Unsatisfiable,
    /// The search was stopped by [`EngineHooks::should_stop`], or simplification did not decide
    /// the formula.
    Unknown,
    /// A clause could not be allocated; the engine has to be discarded.
    OutOfMemory,
}

/// The events the engine reports while searching.
pub(crate) trait EngineHooks {
    /// Polled once per search iteration, i.e. after every conflict and before every decision.
    fn should_stop(&mut self) -> bool;

    fn on_decision(&mut self);

    fn on_conflict(&mut self);

    /// Whether [`EngineHooks::on_trail`] should be called; building the snapshot is not free.
    fn wants_trail(&self) -> bool;

    /// Called for every conflict before it is analysed.
    fn on_trail(&mut self, snapshot: &TrailSnapshot<'_>);

    /// Called for every clause which is learned from a conflict.
    fn on_learned_clause(&mut self, literals: &[Literal]);
}

/// The capabilities a [`SolverInstance`](crate::SolverInstance) needs from its engine.
///
/// Outside of [`SolvingEngine::solve`] and [`SolvingEngine::simplify`] the engine is at the root
/// level, so clauses can be added at any time.
pub(crate) trait SolvingEngine: Debug {
    /// Makes sure that the variables `0..num_variables` exist. On failure the engine is left as
    /// it was.
    fn grow(&mut self, num_variables: usize) -> Result<(), OutOfMemory>;

    /// Adds an irredundant clause. Eliminated variables in the clause are reinstated.
    fn add_clause(&mut self, literals: &[Literal]) -> Result<(), OutOfMemory>;

    /// Searches for an assignment which satisfies the clauses and the assumptions.
    fn solve(&mut self, assumptions: &[Literal], hooks: &mut dyn EngineHooks) -> EngineOutcome;

    /// The value of the literal in the last model; only meaningful after
    /// [`EngineOutcome::Satisfiable`].
    fn model_value(&self, literal: Literal) -> bool;

    /// Whether the assumption was part of the reason for the last [`EngineOutcome::Unsatisfiable`].
    fn is_failed(&self, assumption: Literal) -> bool;

    /// The value of the literal if it is implied by the clauses alone.
    fn root_value(&self, literal: Literal) -> Option<bool>;

    /// Protects the variable from elimination. Freezing an eliminated variable reinstates it.
    fn set_frozen(&mut self, variable: Variable, is_frozen: bool) -> Result<(), OutOfMemory>;

    /// Makes sure the variable is not eliminated, e.g. because it is assumed.
    fn reinstate(&mut self, variable: Variable) -> Result<(), OutOfMemory>;

    /// Runs up to `rounds` rounds of root-level simplification and variable elimination. Variables
    /// of the `protected` literals are not eliminated.
    fn simplify(&mut self, rounds: u32, protected: &[Literal]) -> EngineOutcome;

    fn num_irredundant_clauses(&self) -> usize;

    /// The number of variables which are neither assigned at the root nor eliminated.
    fn num_active_variables(&self) -> usize;

    /// The search counters; time related fields are left for the caller to fill in.
    fn statistics(&self) -> SolverStatistics;

    /// Logs the detailed engine counters.
    fn log_statistics(&self, statistic_logger: StatisticLogger);
}
