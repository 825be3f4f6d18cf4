mod literal;
pub(crate) mod moving_averages;
mod protocol_violation;
pub(crate) mod sequence_generators;
mod solve_result;
mod variable;

pub use literal::Literal;
pub use protocol_violation::ProtocolViolation;
pub use sequence_generators::SequenceGeneratorType;
pub use solve_result::FixedValue;
pub use solve_result::SolveResult;
pub use variable::Variable;
