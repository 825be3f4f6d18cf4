use std::collections::VecDeque;
use std::fmt::Debug;

use num::cast::AsPrimitive;
use num::traits::NumAssign;

use super::MovingAverage;
use crate::incsat_assert_simple;

/// Average over the last `window_size` terms.
#[derive(Clone, Debug)]
pub(crate) struct WindowedMovingAverage<Term> {
    window_size: u64,
    windowed_sum: Term,
    values_in_window: VecDeque<Term>,
}

impl<Term: Default> WindowedMovingAverage<Term> {
    pub(crate) fn new(window_size: u64) -> WindowedMovingAverage<Term> {
        incsat_assert_simple!(window_size > 0);
        WindowedMovingAverage {
            window_size,
            windowed_sum: Term::default(),
            values_in_window: VecDeque::with_capacity(window_size as usize),
        }
    }
}

impl<Term> MovingAverage<Term> for WindowedMovingAverage<Term>
where
    Term: Debug + Default + NumAssign + AsPrimitive<f64>,
{
    fn add_term(&mut self, new_term: Term) {
        if self.values_in_window.len() as u64 == self.window_size {
            if let Some(oldest) = self.values_in_window.pop_front() {
                self.windowed_sum -= oldest;
            }
        }

        self.windowed_sum += new_term;
        self.values_in_window.push_back(new_term);
    }

    fn value(&self) -> f64 {
        if !self.values_in_window.is_empty() {
            self.windowed_sum.as_() / (self.values_in_window.len() as f64)
        } else {
            0.0
        }
    }

    fn adapt(&mut self, interval_length: u64) {
        incsat_assert_simple!(interval_length > 0);

        while self.values_in_window.len() as u64 > interval_length {
            if let Some(oldest) = self.values_in_window.pop_front() {
                self.windowed_sum -= oldest;
            }
        }
        self.window_size = interval_length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_forgets_old_terms() {
        let mut average = WindowedMovingAverage::new(2);
        average.add_term(10_u64);
        assert_eq!(average.value(), 10.0);
        average.add_term(30);
        assert_eq!(average.value(), 20.0);
        average.add_term(30);
        assert_eq!(average.value(), 30.0);
        average.add_term(10);
        assert_eq!(average.value(), 20.0);
    }

    #[test]
    fn shrinking_the_window_drops_oldest_terms() {
        let mut average = WindowedMovingAverage::new(4);
        for term in [1_u64, 2, 3, 4] {
            average.add_term(term);
        }
        average.adapt(2);
        assert_eq!(average.value(), 3.5);
    }
}
