/// The sequence which determines the (minimum) number of conflicts between two restarts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SequenceGeneratorType {
    /// A constant number of conflicts between restarts.
    #[default]
    Constant,
    /// A geometrically increasing number of conflicts between restarts.
    Geometric,
    /// The Luby sequence 1, 1, 2, 1, 1, 2, 4, ... multiplied by the base interval.
    Luby,
}

impl std::fmt::Display for SequenceGeneratorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceGeneratorType::Constant => write!(f, "constant"),
            SequenceGeneratorType::Geometric => write!(f, "geometric"),
            SequenceGeneratorType::Luby => write!(f, "luby"),
        }
    }
}
