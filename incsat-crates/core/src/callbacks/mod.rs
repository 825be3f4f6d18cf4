//! The callbacks a caller can register on a [`SolverInstance`](crate::SolverInstance).
//!
//! An instance holds at most one callback of each kind; registering a new one drops the previous
//! one. All callbacks fire synchronously on the thread which calls
//! [`SolverInstance::solve`](crate::SolverInstance::solve), in the order in which the search
//! events occur. A callback cannot reach the instance which is solving; forwarding clauses into
//! another, idle instance is supported (see [`crate::exchange`]).
mod callback_registry;
mod trail_snapshot;

pub(crate) use callback_registry::CallbackRegistry;
pub use trail_snapshot::TrailSnapshot;
