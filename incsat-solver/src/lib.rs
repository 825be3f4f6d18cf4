//! # incsat
//! incsat is an incremental SAT solver. Clauses are added in DIMACS notation, the formula is
//! solved under temporary assumptions, and the instance keeps everything it learned between
//! solve calls.
//!
//! ```rust
//! # use incsat_solver::SolverInstance;
//! # use incsat_solver::SolveResult;
//! # use incsat_solver::Literal;
//! let mut solver = SolverInstance::default();
//!
//! // (x1 \/ x2) /\ (-x1 \/ x2)
//! for code in [1, 2, 0, -1, 2, 0] {
//!     solver.add(code).unwrap();
//! }
//!
//! // Assuming -x2 makes the formula unsatisfiable.
//! let not_x2 = Literal::try_from(-2).unwrap();
//! solver.assume(not_x2).unwrap();
//! assert_eq!(solver.solve().unwrap(), SolveResult::Unsatisfiable);
//! assert!(solver.failed(not_x2).unwrap());
//!
//! // The assumption only held for one call.
//! assert_eq!(solver.solve().unwrap(), SolveResult::Satisfiable);
//! assert!(solver.value(Literal::try_from(2).unwrap()).unwrap());
//! ```
//!
//! Besides the single [`SolverInstance`], the [`exchange::Portfolio`] lets several instances
//! solve the same formula in turns while sharing short learned clauses.
pub use incsat_core::*;
