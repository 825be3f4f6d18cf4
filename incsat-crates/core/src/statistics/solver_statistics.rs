use std::time::Duration;

use super::StatisticLogger;

/// A snapshot of the counters of a [`SolverInstance`](crate::SolverInstance).
///
/// All counters are monotone over the lifetime of the instance; they are never reset between
/// calls to [`SolverInstance::solve`](crate::SolverInstance::solve).
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SolverStatistics {
    /// The number of conflicts encountered during search.
    pub conflicts: u64,
    /// The number of decisions taken by the solver.
    pub decisions: u64,
    /// The number of literals assigned through unit propagation.
    pub propagations: u64,
    /// The number of times the solver has restarted.
    pub restarts: u64,
    /// The number of clauses learned from conflicts.
    pub learned_clauses: u64,
    /// The total number of literals in learned clauses after minimisation.
    pub learned_literals: u64,
    /// The number of times the learned clause database has been reduced.
    pub reductions: u64,
    /// The number of variables currently removed by variable elimination.
    pub eliminated_variables: u64,
    /// The number of calls to `solve`.
    pub solve_calls: u64,
    /// Time spent inside `solve` and `simplify`.
    pub time_spent_in_solver: Duration,
    /// Wall-clock time since the instance was created.
    pub real_time: Duration,
    /// The largest amount of memory (in bytes) the clause database has reserved.
    pub peak_clause_database_bytes: usize,
}

impl SolverStatistics {
    /// Logs every counter through the configured statistic logging, see
    /// [`configure_statistic_logging`](crate::statistics::configure_statistic_logging).
    pub fn log(&self, statistic_logger: StatisticLogger) {
        statistic_logger
            .attach_to_prefix("conflicts")
            .log_statistic(self.conflicts);
        statistic_logger
            .attach_to_prefix("decisions")
            .log_statistic(self.decisions);
        statistic_logger
            .attach_to_prefix("propagations")
            .log_statistic(self.propagations);
        statistic_logger
            .attach_to_prefix("restarts")
            .log_statistic(self.restarts);
        statistic_logger
            .attach_to_prefix("learned_clauses")
            .log_statistic(self.learned_clauses);
        statistic_logger
            .attach_to_prefix("learned_literals")
            .log_statistic(self.learned_literals);
        statistic_logger
            .attach_to_prefix("reductions")
            .log_statistic(self.reductions);
        statistic_logger
            .attach_to_prefix("eliminated_variables")
            .log_statistic(self.eliminated_variables);
        statistic_logger
            .attach_to_prefix("solve_calls")
            .log_statistic(self.solve_calls);
        statistic_logger
            .attach_to_prefix("solve_time")
            .log_statistic(self.time_spent_in_solver.as_secs_f64());
        statistic_logger
            .attach_to_prefix("real_time")
            .log_statistic(self.real_time.as_secs_f64());
        statistic_logger
            .attach_to_prefix("peak_clause_database_bytes")
            .log_statistic(self.peak_clause_database_bytes);
    }
}
