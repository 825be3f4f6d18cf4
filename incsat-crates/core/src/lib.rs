//! # incsat
//! An incremental SAT solver with assumptions, callbacks and clause exchange.
//!
//! A [`SolverInstance`] accepts clauses in DIMACS notation, literal by literal, and can be solved
//! repeatedly; clauses are never removed, while assumptions only hold for one call to
//! [`SolverInstance::solve`].
//!
//! ```rust
//! # use incsat_core::SolverInstance;
//! # use incsat_core::SolveResult;
//! let mut solver = SolverInstance::default();
//! for code in [1, 2, 0, -1, 0] {
//!     solver.add(code).unwrap();
//! }
//! assert_eq!(solver.solve(), Ok(SolveResult::Satisfiable));
//! assert_eq!(solver.value(2.try_into().unwrap()), Ok(true));
//! ```
//!
//! # Callbacks
//! During search the instance reports learned clauses ([`SolverInstance::set_learn`]) and
//! conflicts ([`SolverInstance::set_learn_trail`]), and polls a terminate callback
//! ([`SolverInstance::set_terminate`], or any [`termination::TerminationCondition`]).
//!
//! # Variable elimination
//! [`SolverInstance::simplify`] may eliminate variables. A variable which is used after
//! simplification should be frozen first ([`SolverInstance::freeze`]); eliminated variables are
//! reinstated when they occur in a new clause or assumption.
//!
//! # Clause exchange
//! The [`exchange::Portfolio`] runs several instances in turns and forwards the learned clauses of
//! the active instance to the others.
#[doc(hidden)]
pub mod asserts;
pub(crate) mod basic_types;
pub mod callbacks;
pub mod containers;
pub(crate) mod engine;
pub mod exchange;
pub mod statistics;
pub mod termination;

pub use convert_case;

// All exports from the API are exported directly from the crate, e.g.
// `use incsat_core::SolverInstance;`
mod api;

pub use api::*;

pub use crate::basic_types::FixedValue;
pub use crate::basic_types::Literal;
pub use crate::basic_types::ProtocolViolation;
pub use crate::basic_types::SequenceGeneratorType;
pub use crate::basic_types::SolveResult;
pub use crate::basic_types::Variable;
pub use crate::engine::EliminationOptions;
pub use crate::engine::LearnedClauseSortingStrategy;
pub use crate::engine::LearningOptions;
pub use crate::engine::RestartOptions;
pub use crate::engine::SolverOptions;
