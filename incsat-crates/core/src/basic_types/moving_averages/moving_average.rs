use std::fmt::Debug;

/// A running average over a stream of terms, used by the restart heuristics to compare short
/// and long term trends of learned clause quality.
pub(crate) trait MovingAverage<Term>: Debug {
    fn add_term(&mut self, new_term: Term);

    fn value(&self) -> f64;

    /// Changes the length of the interval over which the average is taken, if applicable.
    fn adapt(&mut self, interval_length: u64);
}
