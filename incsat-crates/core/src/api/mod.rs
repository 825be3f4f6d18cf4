//! The public interface of an incremental solver instance.
mod search_hooks;
mod search_limit;
mod solver_instance;
mod solver_state;

pub use search_limit::SearchLimit;
pub use solver_instance::SolverInstance;
pub use solver_state::SolverState;
