use super::RestartOptions;

/// The options which determine the behaviour of the search of a
/// [`SolverInstance`](crate::SolverInstance).
///
/// Options can only be changed before the first clause is added, see
/// [`SolverInstance::set_options`](crate::SolverInstance::set_options).
#[derive(Debug, Clone, Copy)]
pub struct SolverOptions {
    /// The options which determine when the solver restarts.
    pub restart_options: RestartOptions,
    /// The options which determine how learned clauses are kept.
    pub learning_options: LearningOptions,
    /// The options used by [`SolverInstance::simplify`](crate::SolverInstance::simplify).
    pub elimination_options: EliminationOptions,
    /// The seed of the random generator used for random decisions.
    pub random_seed: u64,
    /// The probability with which a decision is made on a random variable instead of the most
    /// active one.
    pub random_decision_frequency: f64,
    /// The factor by which variable activities decay after every conflict.
    pub variable_decay_factor: f64,
    /// Whether learned clauses are minimised by removing literals implied by the remaining ones.
    pub learned_clause_minimisation: bool,
    /// The maximum number of bytes the clause database may occupy; exceeding it is treated as
    /// running out of memory.
    pub clause_memory_limit: Option<usize>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            restart_options: RestartOptions::default(),
            learning_options: LearningOptions::default(),
            elimination_options: EliminationOptions::default(),
            random_seed: 42,
            random_decision_frequency: 0.0,
            variable_decay_factor: 0.95,
            learned_clause_minimisation: true,
            clause_memory_limit: None,
        }
    }
}

/// Options related to learned clause management, i.e., how and when to remove learned clauses
/// from the database.
#[derive(Debug, Copy, Clone)]
pub struct LearningOptions {
    /// Determines when to rescale the activites of the learned clauses in the database.
    pub max_activity: f32,
    /// Determines the factor by which the activities are divided when a conflict is found.
    pub activity_decay_factor: f32,
    /// Learned clauses with an LBD of at most this value are never removed.
    pub lbd_threshold: u32,
    /// The number of learned clauses with an LBD above [`LearningOptions::lbd_threshold`] which
    /// are kept before roughly half of them are removed.
    pub limit_high_lbd_clauses: usize,
    /// How the high LBD clauses are ordered when deciding which ones to remove.
    pub sorting_strategy: LearnedClauseSortingStrategy,
}

impl Default for LearningOptions {
    fn default() -> Self {
        Self {
            max_activity: 1e20,
            activity_decay_factor: 0.99,
            lbd_threshold: 5,
            limit_high_lbd_clauses: 4000,
            sorting_strategy: LearnedClauseSortingStrategy::Activity,
        }
    }
}

/// The sorting strategy which is used when considering removal from the clause database.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LearnedClauseSortingStrategy {
    /// Sorts based on the activity, the activity is bumped when a clause is encountered during
    /// conflict analysis.
    #[default]
    Activity,
    /// Sorts based on the literal block distance (LBD) which is an indication of how "good" a
    /// learned clause is; ties are broken by activity.
    Lbd,
}

impl std::fmt::Display for LearnedClauseSortingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LearnedClauseSortingStrategy::Activity => write!(f, "activity"),
            LearnedClauseSortingStrategy::Lbd => write!(f, "lbd"),
        }
    }
}

/// Bounds on the bounded variable elimination performed by
/// [`SolverInstance::simplify`](crate::SolverInstance::simplify).
#[derive(Debug, Clone, Copy)]
pub struct EliminationOptions {
    /// Variables occurring in more clauses than this are not considered for elimination.
    pub occurrence_limit: usize,
    /// Elimination of a variable is abandoned if it produces a resolvent longer than this.
    pub resolvent_length_limit: usize,
    /// Elimination may increase the number of clauses by at most this amount per variable.
    pub clause_growth: usize,
}

impl Default for EliminationOptions {
    fn default() -> Self {
        Self {
            occurrence_limit: 100,
            resolvent_length_limit: 20,
            clause_growth: 0,
        }
    }
}
