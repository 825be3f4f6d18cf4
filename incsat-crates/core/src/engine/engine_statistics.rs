use crate::basic_types::moving_averages::CumulativeMovingAverage;
use crate::create_statistics_struct;

create_statistics_struct!(
    /// Core statistics of the search (e.g. the number of decisions)
    EngineStatistics {
        /// The number of decisions taken by the engine, including assumptions
        num_decisions: u64,
        /// The number of conflicts found during search
        num_conflicts: u64,
        /// The number of literals assigned by unit propagation
        num_propagations: u64,
        /// The number of times the engine has restarted
        num_restarts: u64,
        /// The number of restarts which were postponed because the search seemed close to a
        /// solution
        num_blocked_restarts: u64,
        /// The number of times the learned clause database has been reduced
        num_reductions: u64,
        /// The number of variables which are currently eliminated
        num_eliminated_variables: u64,
        /// The peak depth of the search tree
        peak_depth: u64,
});

create_statistics_struct!(
    /// The statistics related to clause learning
    LearnedClauseStatistics {
        /// The number of clauses learned from conflicts
        num_learned_clauses: u64,
        /// The total number of literals in learned clauses
        num_learned_literals: u64,
        /// The number of learned clauses which have a size of 1
        num_unit_clauses_learned: u64,
        /// The average length of a learned clause
        average_learned_clause_length: CumulativeMovingAverage<u64>,
        /// The average number of literals removed by recursive minimisation
        average_number_of_removed_literals_recursive: CumulativeMovingAverage<u64>,
        /// The average number of levels which have been backtracked after a conflict
        average_backtrack_amount: CumulativeMovingAverage<u64>,
        /// The average literal-block distance (LBD) of learned clauses
        average_lbd: CumulativeMovingAverage<u64>,
});
