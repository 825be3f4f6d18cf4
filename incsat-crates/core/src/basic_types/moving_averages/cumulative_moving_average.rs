use std::fmt::Debug;
use std::fmt::Display;

use num::cast::AsPrimitive;
use num::traits::NumAssign;

use super::MovingAverage;

#[derive(Default, Debug, Copy, Clone)]
pub(crate) struct CumulativeMovingAverage<Term> {
    sum: Term,
    num_terms: u64,
}

impl<Term> Display for CumulativeMovingAverage<Term>
where
    Term: Debug + NumAssign + AsPrimitive<f64>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl<Term> MovingAverage<Term> for CumulativeMovingAverage<Term>
where
    Term: Debug + NumAssign + AsPrimitive<f64>,
{
    fn add_term(&mut self, new_term: Term) {
        self.sum += new_term;
        self.num_terms += 1
    }

    fn value(&self) -> f64 {
        if self.num_terms > 0 {
            self.sum.as_() / (self.num_terms as f64)
        } else {
            0.0
        }
    }

    fn adapt(&mut self, _interval_length: u64) {}
}

#[cfg(test)]
mod tests {
    use super::CumulativeMovingAverage;
    use crate::basic_types::moving_averages::MovingAverage;

    #[test]
    fn empty_average_is_zero() {
        let empty_sum: CumulativeMovingAverage<u64> = CumulativeMovingAverage::default();
        assert_eq!(empty_sum.value(), 0.0);
    }

    #[test]
    fn average_over_all_terms() {
        let mut average = CumulativeMovingAverage::default();
        average.add_term(10_u64);
        assert_eq!(average.value(), 10.0);
        average.add_term(20);
        assert_eq!(average.value(), 15.0);
        average.add_term(30);
        assert_eq!(average.value(), 20.0);
    }
}
