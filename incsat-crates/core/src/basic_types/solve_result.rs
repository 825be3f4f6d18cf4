use std::fmt::Display;

/// The verdict of a call to [`SolverInstance::solve`] or [`SolverInstance::simplify`].
///
/// [`SolveResult::Unknown`] is returned when the search was interrupted (by the terminate
/// callback, an [`InterruptHandle`], a [`SearchLimit`] or resource exhaustion), or when
/// [`SolverInstance::simplify`] could not decide the formula.
///
/// [`SolverInstance::solve`]: crate::SolverInstance::solve
/// [`SolverInstance::simplify`]: crate::SolverInstance::simplify
/// [`InterruptHandle`]: crate::termination::InterruptHandle
/// [`SearchLimit`]: crate::SearchLimit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveResult {
    Unknown,
    Satisfiable,
    Unsatisfiable,
}

impl SolveResult {
    /// The integer code used by the IPASIR interface: `10` for satisfiable, `20` for
    /// unsatisfiable and `0` otherwise.
    pub fn to_ipasir(self) -> i32 {
        match self {
            SolveResult::Unknown => 0,
            SolveResult::Satisfiable => 10,
            SolveResult::Unsatisfiable => 20,
        }
    }

    /// Whether the result settles the satisfiability question.
    pub fn is_definitive(self) -> bool {
        !matches!(self, SolveResult::Unknown)
    }
}

impl Display for SolveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveResult::Unknown => write!(f, "UNKNOWN"),
            SolveResult::Satisfiable => write!(f, "SATISFIABLE"),
            SolveResult::Unsatisfiable => write!(f, "UNSATISFIABLE"),
        }
    }
}

/// The root-level status of a literal, see [`SolverInstance::fixed`].
///
/// [`SolverInstance::fixed`]: crate::SolverInstance::fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedValue {
    /// The literal is implied by the permanent clause database.
    True,
    /// The negation of the literal is implied by the permanent clause database.
    False,
    Unknown,
}
