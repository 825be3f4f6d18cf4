use std::fmt::Display;
use std::num::NonZeroU32;

use crate::basic_types::ProtocolViolation;
use crate::containers::StorageKey;

/// A propositional variable.
///
/// Internally variables are indexed from zero; externally (e.g. in [`Display`] and
/// [`Variable::to_dimacs`]) they are identified by their one-based DIMACS index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    index: u32,
}

impl Variable {
    /// The largest DIMACS index a variable can have; larger indices cannot be negated as an `i32`.
    pub const MAX_DIMACS_INDEX: u32 = i32::MAX as u32;

    pub(crate) fn new(index: u32) -> Variable {
        Variable { index }
    }

    /// Create the variable with the given one-based DIMACS index.
    pub fn from_dimacs(dimacs_index: NonZeroU32) -> Result<Variable, ProtocolViolation> {
        if dimacs_index.get() > Self::MAX_DIMACS_INDEX {
            return Err(ProtocolViolation::InvalidVariable(dimacs_index.get()));
        }

        Ok(Variable::new(dimacs_index.get() - 1))
    }

    /// The one-based DIMACS index of this variable.
    pub fn to_dimacs(self) -> u32 {
        self.index + 1
    }

    pub(crate) fn index(self) -> u32 {
        self.index
    }
}

impl TryFrom<u32> for Variable {
    type Error = ProtocolViolation;

    fn try_from(dimacs_index: u32) -> Result<Self, Self::Error> {
        NonZeroU32::new(dimacs_index)
            .ok_or(ProtocolViolation::InvalidVariable(dimacs_index))
            .and_then(Variable::from_dimacs)
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

impl StorageKey for Variable {
    fn index(&self) -> usize {
        self.index as usize
    }

    fn create_from_index(index: usize) -> Self {
        Variable::new(index as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimacs_index_is_one_based() {
        let variable = Variable::try_from(3).unwrap();
        assert_eq!(variable.index(), 2);
        assert_eq!(variable.to_dimacs(), 3);
        assert_eq!(variable.to_string(), "3");
    }

    #[test]
    fn zero_is_not_a_variable() {
        assert_eq!(
            Variable::try_from(0),
            Err(ProtocolViolation::InvalidVariable(0))
        );
    }
}
