/// A budget for the next call to [`SolverInstance::solve`](crate::SolverInstance::solve).
///
/// Limits are consumed by the call they apply to; a call which exhausts its budget returns
/// [`SolveResult::Unknown`](crate::SolveResult::Unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    /// Stop after the given number of conflicts.
    Conflicts(u64),
    /// Stop after the given number of decisions (including decisions on assumptions).
    Decisions(u64),
}
