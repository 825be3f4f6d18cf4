use std::fmt::Display;

/// The protocol state of a [`SolverInstance`](crate::SolverInstance).
///
/// ```text
/// Configuring --add/assume/freeze--> Input --solve--> Solving --> Satisfiable
///                                      ^                      \-> Unsatisfiable
///                                      |                       \-> Interrupted
///                                      +--------add/assume--------/
/// ```
///
/// A resource-exhaustion abort moves the instance to [`SolverState::Unusable`], from which it
/// never leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverState {
    /// No clause, assumption or freeze has been added yet; options can still be changed.
    Configuring,
    Input,
    /// Only observable from within a callback.
    Solving,
    Satisfiable,
    Unsatisfiable,
    Interrupted,
    Unusable,
}

impl SolverState {
    /// Whether the state holds the result of a `solve` (or `simplify`) call.
    pub fn is_result(self) -> bool {
        matches!(
            self,
            SolverState::Satisfiable | SolverState::Unsatisfiable | SolverState::Interrupted
        )
    }
}

impl Display for SolverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverState::Configuring => write!(f, "configuring"),
            SolverState::Input => write!(f, "accepting input"),
            SolverState::Solving => write!(f, "solving"),
            SolverState::Satisfiable => write!(f, "satisfiable"),
            SolverState::Unsatisfiable => write!(f, "unsatisfiable"),
            SolverState::Interrupted => write!(f, "interrupted"),
            SolverState::Unusable => write!(f, "unusable"),
        }
    }
}
