use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;
use std::rc::Weak;
use std::time::Duration;

use log::info;

use crate::basic_types::Literal;
use crate::basic_types::ProtocolViolation;
use crate::basic_types::SolveResult;
use crate::engine::SolverOptions;
use crate::statistics::log_statistic_postfix;
use crate::statistics::StatisticLogger;
use crate::termination::TerminationCondition;
use crate::termination::TimeBudget;
use crate::SolverInstance;
use crate::SolverState;

/// A group of instances which solve the same formula in turns and exchange learned clauses.
///
/// ```rust
/// # use std::time::Duration;
/// # use incsat_core::exchange::Portfolio;
/// # use incsat_core::termination::Indefinite;
/// # use incsat_core::SolveResult;
/// # use incsat_core::SolverOptions;
/// let mut portfolio = Portfolio::new(2, SolverOptions::default());
/// for clause in [[1, 2], [-1, 2], [1, -2], [-1, -2]] {
///     for code in clause {
///         portfolio.add(code).unwrap();
///     }
///     portfolio.add(0).unwrap();
/// }
/// portfolio.connect(3);
///
/// let result = portfolio.solve(Duration::from_millis(20), &mut Indefinite).unwrap();
/// assert_eq!(result, SolveResult::Unsatisfiable);
/// ```
#[derive(Debug)]
pub struct Portfolio {
    instances: Vec<Rc<RefCell<SolverInstance>>>,
    /// The number of clauses each instance received from its siblings.
    imported: Vec<Rc<Cell<u64>>>,
    /// The instance which solves in the next round.
    active: usize,
    /// The assumptions for the next call to [`Portfolio::solve`]; they are queued on the active
    /// instance before every round.
    assumptions: Vec<Literal>,
    /// The instance which reached the verdict of the last call to [`Portfolio::solve`].
    winner: Option<usize>,
}

impl Portfolio {
    /// Creates `num_instances` instances. Instance `i` uses the seed of `options` plus `i`, so
    /// that the instances explore the search space differently.
    pub fn new(num_instances: usize, options: SolverOptions) -> Portfolio {
        assert!(num_instances > 0, "a portfolio needs at least one instance");

        let instances = (0..num_instances)
            .map(|index| {
                let options = SolverOptions {
                    random_seed: options.random_seed.wrapping_add(index as u64),
                    ..options
                };
                Rc::new(RefCell::new(SolverInstance::with_options(options)))
            })
            .collect();

        Portfolio {
            instances,
            imported: (0..num_instances).map(|_| Rc::default()).collect(),
            active: 0,
            assumptions: vec![],
            winner: None,
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Adds a DIMACS literal (or the terminating `0`) to every instance.
    pub fn add(&mut self, dimacs_code: i32) -> Result<(), ProtocolViolation> {
        for instance in &self.instances {
            instance.borrow_mut().add(dimacs_code)?;
        }
        Ok(())
    }

    /// Adds the clause to every instance.
    pub fn add_clause(&mut self, literals: &[Literal]) -> Result<(), ProtocolViolation> {
        for instance in &self.instances {
            instance
                .borrow_mut()
                .add_clause(literals.iter().copied())?;
        }
        Ok(())
    }

    /// Assumes the literal to be true for the next call to [`Portfolio::solve`], in every round
    /// and for whichever instance is active.
    pub fn assume(&mut self, literal: Literal) {
        self.assumptions.push(literal);
    }

    /// Installs on every instance a learn callback which forwards each learned clause with at
    /// most `max_length` literals to all other instances. Replaces any learn callback which was
    /// registered before.
    pub fn connect(&mut self, max_length: usize) {
        for (index, instance) in self.instances.iter().enumerate() {
            let siblings: Vec<(Weak<RefCell<SolverInstance>>, Rc<Cell<u64>>)> = self
                .instances
                .iter()
                .zip(&self.imported)
                .enumerate()
                .filter(|&(other, _)| other != index)
                .map(|(_, (sibling, imported))| (Rc::downgrade(sibling), Rc::clone(imported)))
                .collect();

            instance
                .borrow_mut()
                .set_learn(max_length, move |clause: &[Literal]| {
                    for (sibling, imported) in &siblings {
                        let Some(sibling) = sibling.upgrade() else {
                            continue;
                        };
                        let Ok(mut sibling) = sibling.try_borrow_mut() else {
                            panic!("a clause can only be exchanged with an instance which is not solving");
                        };
                        if sibling.add_clause(clause.iter().copied()).is_ok() {
                            imported.set(imported.get() + 1);
                        }
                    }
                });
        }
    }

    /// Lets the instances solve in turns, each for at most `time_slice`, until one of them
    /// reaches a definitive verdict or `termination` asks to stop.
    ///
    /// Returns [`SolveResult::Unknown`] when stopped by `termination` or when every instance ran
    /// out of memory. The assumptions are cleared afterwards.
    pub fn solve(
        &mut self,
        time_slice: Duration,
        mut termination: impl TerminationCondition,
    ) -> Result<SolveResult, ProtocolViolation> {
        let assumptions = std::mem::take(&mut self.assumptions);
        self.winner = None;

        let mut round = 0;
        loop {
            if termination.should_stop() {
                return Ok(SolveResult::Unknown);
            }
            if self
                .instances
                .iter()
                .all(|instance| instance.borrow().state() == SolverState::Unusable)
            {
                return Ok(SolveResult::Unknown);
            }

            round += 1;
            let active = self.active;
            self.active = (self.active + 1) % self.instances.len();

            let result = {
                let mut instance = self.instances[active].borrow_mut();
                if instance.state() == SolverState::Unusable {
                    continue;
                }
                // An instance forgets its assumptions after every call.
                for &assumption in &assumptions {
                    instance.assume(assumption)?;
                }
                instance.set_termination(TimeBudget::starting_now(time_slice));
                let result = instance.solve();
                instance.clear_terminate();
                result?
            };

            info!(
                "round {round} active {active} imported {}",
                self.imported[active].get()
            );

            if result.is_definitive() {
                self.winner = Some(active);
                return Ok(result);
            }
        }
    }

    /// The instance with the given index; it is borrowed by the portfolio while solving.
    pub fn instance(&self, index: usize) -> Rc<RefCell<SolverInstance>> {
        Rc::clone(&self.instances[index])
    }

    /// The index of the instance which decided the formula in the last call to
    /// [`Portfolio::solve`]; its model or failed assumptions can be queried.
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    /// The number of clauses instance `index` received from the other instances.
    pub fn imported(&self, index: usize) -> u64 {
        self.imported[index].get()
    }

    /// Logs the statistics of every instance, prefixed with its index.
    pub fn log_statistics(&self) {
        for (index, instance) in self.instances.iter().enumerate() {
            let logger = StatisticLogger::new(["instance".to_owned(), index.to_string()]);
            instance.borrow().log_statistics_with_logger(logger.clone());
            logger
                .attach_to_prefix("imported")
                .log_statistic(self.imported[index].get());
        }
        log_statistic_postfix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::termination::ClosureCondition;
    use crate::termination::Indefinite;
    use crate::FixedValue;

    #[test]
    fn clauses_reach_every_instance() {
        let mut portfolio = Portfolio::new(3, SolverOptions::default());
        portfolio
            .add_clause(&[Literal::try_from(1).expect("valid literal")])
            .expect("instances are usable");

        for index in 0..3 {
            assert_eq!(portfolio.instance(index).borrow().irredundant_clauses(), 0);
            let fixed = portfolio
                .instance(index)
                .borrow()
                .fixed(Literal::try_from(1).expect("valid literal"));
            assert_eq!(fixed, Ok(FixedValue::True));
        }
    }

    #[test]
    fn outer_termination_stops_the_rounds() {
        let mut portfolio = Portfolio::new(2, SolverOptions::default());
        portfolio.add(1).expect("instances are usable");
        portfolio.add(0).expect("instances are usable");

        let result = portfolio.solve(Duration::from_millis(10), ClosureCondition::new(|| true));
        assert_eq!(result, Ok(SolveResult::Unknown));

        let result = portfolio.solve(Duration::from_millis(10), Indefinite);
        assert_eq!(result, Ok(SolveResult::Satisfiable));
    }
}
