use thiserror::Error;

use crate::api::SolverState;
use crate::basic_types::Literal;

/// A caller error: the [`SolverInstance`] was used outside of its contract.
///
/// Violations are detected before any state is modified, so the instance remains usable after an
/// operation returned one (unless the instance was already [`SolverState::Unusable`]).
///
/// [`SolverInstance`]: crate::SolverInstance
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("'{0}' is not a valid literal")]
    InvalidLiteral(i32),
    #[error("'{0}' is not a valid variable index")]
    InvalidVariable(u32),
    #[error("variable {0} has not been introduced to this instance")]
    UnknownVariable(u32),
    #[error("values can only be queried after a satisfiable verdict, but the solver is {state}")]
    NotSatisfiable { state: SolverState },
    #[error("failed assumptions can only be queried after an unsatisfiable verdict, but the solver is {state}")]
    NotUnsatisfiable { state: SolverState },
    #[error("literal {0} was not part of the last set of assumptions")]
    NotAnAssumption(Literal),
    #[error("variable {0} cannot be melted because it is not frozen")]
    MeltingUnfrozenVariable(u32),
    #[error("options can only be changed before the first clause is added, but the solver is {state}")]
    NotConfiguring { state: SolverState },
    #[error("the clause that is currently being added has not been terminated")]
    UnterminatedClause,
    #[error("the solver ran out of memory and has to be reconstructed")]
    SolverUnusable,
}
