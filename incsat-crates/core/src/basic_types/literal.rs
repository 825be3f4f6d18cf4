use std::fmt::Display;
use std::num::NonZeroU32;

use crate::basic_types::ProtocolViolation;
use crate::basic_types::Variable;
use crate::containers::StorageKey;

/// A [`Variable`] together with a polarity.
///
/// The literal is stored as a single code `2 * variable + polarity`, which makes it usable as an
/// index for per-literal data (e.g. watch lists).
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    code: u32,
}

impl Literal {
    pub fn new(variable: Variable, is_positive: bool) -> Literal {
        Literal {
            code: variable.index() * 2 + (is_positive as u32),
        }
    }

    pub fn positive(variable: Variable) -> Literal {
        Literal::new(variable, true)
    }

    pub fn negative(variable: Variable) -> Literal {
        Literal::new(variable, false)
    }

    pub fn is_positive(&self) -> bool {
        (self.code & 1) == 1
    }

    pub fn is_negative(&self) -> bool {
        (self.code & 1) == 0
    }

    pub fn variable(&self) -> Variable {
        Variable::new(self.code / 2)
    }

    /// The DIMACS representation of the literal: the (one-based) variable index, negated if the
    /// literal is negative.
    pub fn to_dimacs(self) -> i32 {
        let index = self.variable().to_dimacs() as i32;
        if self.is_positive() {
            index
        } else {
            -index
        }
    }
}

impl TryFrom<i32> for Literal {
    type Error = ProtocolViolation;

    /// Interpret a DIMACS literal. Fails for `0` (the clause delimiter) and for `i32::MIN`, whose
    /// magnitude does not fit in an `i32`.
    fn try_from(dimacs_code: i32) -> Result<Self, Self::Error> {
        if dimacs_code == i32::MIN {
            return Err(ProtocolViolation::InvalidLiteral(dimacs_code));
        }

        let magnitude = NonZeroU32::new(dimacs_code.unsigned_abs())
            .ok_or(ProtocolViolation::InvalidLiteral(dimacs_code))?;
        let variable = Variable::from_dimacs(magnitude)?;

        Ok(Literal::new(variable, dimacs_code > 0))
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            code: self.code ^ 1,
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

impl StorageKey for Literal {
    fn index(&self) -> usize {
        self.code as usize
    }

    fn create_from_index(index: usize) -> Self {
        Literal { code: index as u32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimacs_conversion_preserves_sign_and_magnitude() {
        for code in [1, -1, 17, -17, i32::MAX, -i32::MAX] {
            let literal = Literal::try_from(code).unwrap();
            assert_eq!(literal.to_dimacs(), code);
            assert_eq!(literal.is_positive(), code > 0);
            assert_eq!(literal.variable().to_dimacs(), code.unsigned_abs());
        }
    }

    #[test]
    fn negation_flips_polarity_only() {
        let literal = Literal::try_from(5).unwrap();
        assert_eq!((!literal).to_dimacs(), -5);
        assert_eq!((!literal).variable(), literal.variable());
        assert_eq!(!!literal, literal);
    }

    #[test]
    fn sentinel_and_overflowing_codes_are_rejected() {
        assert_eq!(
            Literal::try_from(0),
            Err(ProtocolViolation::InvalidLiteral(0))
        );
        assert_eq!(
            Literal::try_from(i32::MIN),
            Err(ProtocolViolation::InvalidLiteral(i32::MIN))
        );
    }
}
