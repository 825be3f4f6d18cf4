use std::fmt::Debug;

use crate::basic_types::moving_averages::CumulativeMovingAverage;
use crate::basic_types::moving_averages::MovingAverage;
use crate::basic_types::moving_averages::WindowedMovingAverage;
use crate::basic_types::sequence_generators::ConstantSequence;
use crate::basic_types::sequence_generators::GeometricSequence;
use crate::basic_types::sequence_generators::LubySequence;
use crate::basic_types::sequence_generators::SequenceGenerator;
use crate::basic_types::SequenceGeneratorType;

/// The options which are used by the solver to determine when a restart should occur.
///
/// An implementation of a restart strategy based on the specfication of [Section 4 of \[1\]](https://fmv.jku.at/papers/BiereFroehlich-POS15.pdf)
/// (for more information about the Glucose restart strategies see [\[2\]](https://www.cril.univ-artois.fr/articles/xxmain.pdf)).
/// The idea is to restart when the quality of the learned clauses (indicated by the LBD, the
/// number of different decision levels present in a learned clause, lower is generally better) is
/// poor. It takes this into account by keeping track of the overall average LBD and the
/// short-term average LBD and comparing these with one another.
///
/// The strategy also takes into account that if a solver is "close" to finding a solution that it
/// would be better to not restart at that moment and it can then decide to skip a restart.
///
/// # Bibliography
/// \[1\] A. Biere and A. Fröhlich, ‘Evaluating CDCL restart schemes’, Proceedings of Pragmatics of
/// SAT, pp. 1–17, 2015.
///
/// \[2\] G. Audemard and L. Simon, ‘Refining restarts strategies for SAT and UNSAT’, in Principles
/// and Practice of Constraint Programming: 18th International Conference, CP 2012, Québec City, QC,
/// Canada, October 8-12, 2012. Proceedings, 2012, pp. 118–126.
#[derive(Debug, Clone, Copy)]
pub struct RestartOptions {
    /// Decides the sequence based on which the restarts are performed.
    /// To be used in combination with [`RestartOptions::base_interval`]
    pub sequence_generator_type: SequenceGeneratorType,
    /// The base interval length is used as a multiplier to the restart sequence.
    /// For example, constant restarts with base interval 100 means a retart is triggered every 100
    /// conflicts.
    pub base_interval: u64,
    /// The minimum number of conflicts to be reached before the first restart is considered
    pub min_num_conflicts_before_first_restart: u64,
    /// Used to determine if a restart should be forced.
    /// The state is "bad" if the current LBD value is much greater than the global LBD average. A
    /// greater/lower value for lbd-coef means a less/more frequent restart policy
    pub lbd_coef: f64,
    /// Used to determine if a restart should be blocked.
    /// A restart is blocked if the number of assigned variables is much greater than the average
    /// number of assigned variables in the recent past. A greater/lower value means fewer/more
    /// blocked restarts
    pub num_assigned_coef: f64,
    /// The number of conflicts over which the number of assigned variables is averaged when
    /// deciding on blocking restarts.
    pub num_assigned_window: u64,
    /// The coefficient in the geometric sequence `x_i = x_{i-1} * geometric-coef` where `x_1 =
    /// `[`RestartOptions::base_interval`]. Used only if
    /// [`RestartOptions::sequence_generator_type`] is [`SequenceGeneratorType::Geometric`].
    pub geometric_coef: f64,
}

impl Default for RestartOptions {
    fn default() -> Self {
        // The values which are used are based on [Glucose](https://github.com/audemard/glucose).
        Self {
            sequence_generator_type: SequenceGeneratorType::Constant,
            base_interval: 50,
            min_num_conflicts_before_first_restart: 10000,
            lbd_coef: 1.25,
            num_assigned_coef: 1.4,
            num_assigned_window: 5000,
            geometric_coef: 1.5,
        }
    }
}

#[derive(Debug)]
pub(crate) struct RestartStrategy {
    /// A generator for determining how many conflicts should be found before the next restart is
    /// able to take place.
    sequence_generator: Box<dyn SequenceGenerator>,
    /// The number of conflicts encountered since the last restart took place
    number_of_conflicts_encountered_since_restart: u64,
    /// The minimum number of conflicts until the next restart is able to take place
    number_of_conflicts_until_restart: u64,
    /// The minimum number of conflicts until the first restart is able to take place
    minimum_number_of_conflicts_before_first_restart: u64,
    /// The recent average of LBD values.
    lbd_short_term_moving_average: WindowedMovingAverage<u64>,
    /// The higher this value, the fewer restarts are performed.
    lbd_coefficient: f64,
    /// The long-term average of LBD values.
    lbd_long_term_moving_average: CumulativeMovingAverage<u64>,
    /// The higher this value, the fewer restarts are blocked.
    number_of_variables_coefficient: f64,
    /// The average number of variables which are assigned when a conflict is found.
    number_of_assigned_variables_moving_average: WindowedMovingAverage<u64>,
    number_of_restarts: u64,
    number_of_blocked_restarts: u64,
}

impl Default for RestartStrategy {
    fn default() -> Self {
        RestartStrategy::new(RestartOptions::default())
    }
}

impl RestartStrategy {
    pub(crate) fn new(options: RestartOptions) -> Self {
        let base_interval = options.base_interval.max(1);
        let mut sequence_generator: Box<dyn SequenceGenerator> =
            match options.sequence_generator_type {
                SequenceGeneratorType::Constant => {
                    Box::new(ConstantSequence::new(base_interval as i64))
                }
                SequenceGeneratorType::Geometric => Box::new(GeometricSequence::new(
                    base_interval as i64,
                    options.geometric_coef,
                )),
                SequenceGeneratorType::Luby => Box::new(LubySequence::new(base_interval as i64)),
            };

        let number_of_conflicts_until_restart = Self::interval_from(sequence_generator.as_mut());

        RestartStrategy {
            sequence_generator,
            number_of_conflicts_encountered_since_restart: 0,
            number_of_conflicts_until_restart,
            minimum_number_of_conflicts_before_first_restart: options
                .min_num_conflicts_before_first_restart,
            lbd_short_term_moving_average: WindowedMovingAverage::new(base_interval),
            lbd_coefficient: options.lbd_coef,
            lbd_long_term_moving_average: CumulativeMovingAverage::default(),
            number_of_variables_coefficient: options.num_assigned_coef,
            number_of_assigned_variables_moving_average: WindowedMovingAverage::new(
                options.num_assigned_window.max(1),
            ),
            number_of_restarts: 0,
            number_of_blocked_restarts: 0,
        }
    }

    fn interval_from(sequence_generator: &mut dyn SequenceGenerator) -> u64 {
        // Saturated or overflowed sequences still allow a restart eventually.
        let next = sequence_generator.next();
        if next <= 0 {
            u64::MAX
        } else {
            next as u64
        }
    }

    /// Determines whether the restart strategy indicates that a restart should take place; the
    /// strategy considers three conditions (in this order):
    /// - If no restarts have taken place yet then a restart can only take place if the number of
    ///   conflicts encountered since the last restart is larger or equal to
    ///   [`RestartOptions::min_num_conflicts_before_first_restart`]
    /// - A restart can only take place if the number of conflicts encountered since the last
    ///   restart is larger or equal to the number of conflicts until the next restart as indicated
    ///   by the restart sequence
    /// - If both of the previous conditions hold then a restart is performed if the short-term
    ///   average LBD exceeds the long-term average LBD multiplied by
    ///   [`RestartOptions::lbd_coef`].
    pub(crate) fn should_restart(&self) -> bool {
        if self.should_restart_first_time() {
            return false;
        }

        if !self.should_trigger_later_restart() {
            return false;
        }

        self.lbd_long_term_moving_average.value() * self.lbd_coefficient
            <= self.lbd_short_term_moving_average.value()
    }

    fn should_restart_first_time(&self) -> bool {
        self.number_of_restarts == 0
            && self.number_of_conflicts_encountered_since_restart
                < self.minimum_number_of_conflicts_before_first_restart
    }

    /// Notifies the restart strategy that a conflict has taken place so that it can adjust its
    /// internal values, this method has the additional responsibility of checking whether a restart
    /// should be blocked based on whether the solver is "sufficiently close" to finding a solution.
    pub(crate) fn notify_conflict(&mut self, lbd: u32, number_of_assigned_variables: u64) {
        self.number_of_assigned_variables_moving_average
            .add_term(number_of_assigned_variables);
        self.lbd_short_term_moving_average.add_term(lbd as u64);
        self.lbd_long_term_moving_average.add_term(lbd as u64);

        self.number_of_conflicts_encountered_since_restart += 1;

        if self.should_block_restart(number_of_assigned_variables) {
            self.number_of_blocked_restarts += 1;
            self.reset_values()
        }
    }

    fn should_block_restart(&self, number_of_assigned_variables: u64) -> bool {
        if self.should_restart_first_time() {
            return false;
        }

        let close_to_solution = number_of_assigned_variables as f64
            > self.number_of_assigned_variables_moving_average.value()
                * self.number_of_variables_coefficient;

        self.should_trigger_later_restart() && close_to_solution
    }

    fn should_trigger_later_restart(&self) -> bool {
        self.number_of_conflicts_until_restart <= self.number_of_conflicts_encountered_since_restart
    }

    /// Notifies the restart strategy that a restart has taken place so that it can adjust its
    /// internal values
    pub(crate) fn notify_restart(&mut self) {
        self.number_of_restarts += 1;
        self.reset_values()
    }

    pub(crate) fn number_of_blocked_restarts(&self) -> u64 {
        self.number_of_blocked_restarts
    }

    /// Resets the values related to determining whether a restart takes place; called whenever a
    /// restart has taken place or was blocked.
    fn reset_values(&mut self) {
        self.number_of_conflicts_until_restart =
            Self::interval_from(self.sequence_generator.as_mut());
        self.number_of_conflicts_encountered_since_restart = 0;
        self.lbd_short_term_moving_average
            .adapt(self.number_of_conflicts_until_restart);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luby_options() -> RestartOptions {
        RestartOptions {
            sequence_generator_type: SequenceGeneratorType::Luby,
            base_interval: 2,
            min_num_conflicts_before_first_restart: 0,
            lbd_coef: 1.0,
            num_assigned_coef: 1e9,
            ..Default::default()
        }
    }

    #[test]
    fn no_restart_before_the_first_threshold() {
        let mut strategy = RestartStrategy::new(RestartOptions {
            min_num_conflicts_before_first_restart: 3,
            ..luby_options()
        });

        strategy.notify_conflict(5, 10);
        strategy.notify_conflict(5, 10);
        assert!(!strategy.should_restart());
        strategy.notify_conflict(5, 10);
        assert!(strategy.should_restart());
    }

    #[test]
    fn restart_follows_the_sequence() {
        let mut strategy = RestartStrategy::new(luby_options());

        // Luby with base 2: 2, 2, 4, ...
        strategy.notify_conflict(3, 10);
        assert!(!strategy.should_restart());
        strategy.notify_conflict(3, 10);
        assert!(strategy.should_restart());
        strategy.notify_restart();

        strategy.notify_conflict(3, 10);
        strategy.notify_conflict(3, 10);
        assert!(strategy.should_restart());
        strategy.notify_restart();

        for _ in 0..3 {
            strategy.notify_conflict(3, 10);
            assert!(!strategy.should_restart());
        }
        strategy.notify_conflict(3, 10);
        assert!(strategy.should_restart());
    }

    #[test]
    fn restarts_are_blocked_close_to_a_solution() {
        let mut strategy = RestartStrategy::new(RestartOptions {
            num_assigned_coef: 1.0,
            ..luby_options()
        });

        strategy.notify_conflict(3, 10);
        strategy.notify_conflict(3, 100);

        assert_eq!(strategy.number_of_blocked_restarts(), 1);
        assert!(!strategy.should_restart());
    }
}
