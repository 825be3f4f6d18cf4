use std::time::Duration;
use std::time::Instant;

use log::debug;
use log::warn;

use super::search_hooks::SearchHooks;
use super::SearchLimit;
use super::SolverState;
use crate::basic_types::FixedValue;
use crate::basic_types::Literal;
use crate::basic_types::ProtocolViolation;
use crate::basic_types::SolveResult;
use crate::basic_types::Variable;
use crate::callbacks::CallbackRegistry;
use crate::callbacks::TrailSnapshot;
use crate::containers::KeyedVec;
use crate::engine::CdclEngine;
use crate::engine::EngineOutcome;
use crate::engine::OutOfMemory;
use crate::engine::SolverOptions;
use crate::engine::SolvingEngine;
use crate::statistics::log_statistic_postfix;
use crate::statistics::SolverStatistics;
use crate::statistics::StatisticLogger;
use crate::termination::ClosureCondition;
use crate::termination::ConflictBudget;
use crate::termination::DecisionBudget;
use crate::termination::InterruptHandle;
use crate::termination::TerminationCondition;

/// An incremental SAT solver.
///
/// Clauses are added literal by literal ([`SolverInstance::add`]) or as a whole
/// ([`SolverInstance::add_clause`]); they are never removed. Each call to
/// [`SolverInstance::solve`] may be made under a set of assumptions
/// ([`SolverInstance::assume`]) which only hold for that call.
///
/// ```rust
/// # use incsat_core::SolverInstance;
/// # use incsat_core::SolveResult;
/// let mut solver = SolverInstance::default();
/// solver.add(1).unwrap();
/// solver.add(-2).unwrap();
/// solver.add(0).unwrap();
///
/// solver.assume((-1).try_into().unwrap()).unwrap();
/// assert_eq!(solver.solve(), Ok(SolveResult::Satisfiable));
/// assert_eq!(solver.value((-2).try_into().unwrap()), Ok(true));
///
/// solver.assume((-1).try_into().unwrap()).unwrap();
/// solver.assume(2.try_into().unwrap()).unwrap();
/// assert_eq!(solver.solve(), Ok(SolveResult::Unsatisfiable));
/// assert_eq!(solver.failed(2.try_into().unwrap()), Ok(true));
/// ```
///
/// Every operation which is used outside of its contract returns a [`ProtocolViolation`] and
/// leaves the instance untouched.
#[derive(Debug)]
pub struct SolverInstance {
    engine: Box<dyn SolvingEngine>,
    options: SolverOptions,
    state: SolverState,
    /// The clause which is currently being added through [`SolverInstance::add`].
    clause: Vec<Literal>,
    /// One entry per known variable.
    freeze_counts: KeyedVec<Variable, u32>,
    /// The assumptions for the next call to [`SolverInstance::solve`].
    assumptions: Vec<Literal>,
    /// The assumptions of the last call to [`SolverInstance::solve`].
    last_assumptions: Vec<Literal>,
    callbacks: CallbackRegistry,
    interrupt: InterruptHandle,
    conflict_limit: Option<u64>,
    decision_limit: Option<u64>,
    num_solve_calls: u64,
    time_spent_in_solver: Duration,
    created_at: Instant,
}

impl Default for SolverInstance {
    fn default() -> Self {
        SolverInstance::with_options(SolverOptions::default())
    }
}

impl SolverInstance {
    /// Creates a solver with the provided [`SolverOptions`].
    pub fn with_options(options: SolverOptions) -> SolverInstance {
        SolverInstance {
            engine: Box::new(CdclEngine::new(options)),
            options,
            state: SolverState::Configuring,
            clause: vec![],
            freeze_counts: KeyedVec::default(),
            assumptions: vec![],
            last_assumptions: vec![],
            callbacks: CallbackRegistry::default(),
            interrupt: InterruptHandle::default(),
            conflict_limit: None,
            decision_limit: None,
            num_solve_calls: 0,
            time_spent_in_solver: Duration::ZERO,
            created_at: Instant::now(),
        }
    }

    /// Replaces the options of the solver. This is only possible before anything has been added.
    pub fn set_options(&mut self, options: SolverOptions) -> Result<(), ProtocolViolation> {
        if self.state != SolverState::Configuring {
            return Err(ProtocolViolation::NotConfiguring { state: self.state });
        }

        self.options = options;
        self.engine = Box::new(CdclEngine::new(options));
        Ok(())
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// The name and version of the solver.
    pub fn signature() -> &'static str {
        concat!("incsat-", env!("CARGO_PKG_VERSION"))
    }

    pub fn state(&self) -> SolverState {
        self.state
    }
}

/// Methods for adding clauses and assumptions.
impl SolverInstance {
    /// Adds a literal in DIMACS notation to the clause which is currently being built; `0`
    /// terminates the clause and adds it to the solver.
    pub fn add(&mut self, dimacs_code: i32) -> Result<(), ProtocolViolation> {
        if dimacs_code == 0 {
            self.commit_clause()
        } else {
            self.add_literal(Literal::try_from(dimacs_code)?)
        }
    }

    /// Adds a literal to the clause which is currently being built.
    pub fn add_literal(&mut self, literal: Literal) -> Result<(), ProtocolViolation> {
        self.ensure_usable()?;

        self.introduce_variable(literal.variable())?;
        self.enter_input();
        self.clause.push(literal);
        Ok(())
    }

    /// Adds the clause which is currently being built to the solver. Committing an empty clause
    /// makes the formula unsatisfiable.
    pub fn commit_clause(&mut self) -> Result<(), ProtocolViolation> {
        self.ensure_usable()?;
        self.enter_input();

        let result = self.engine.add_clause(&self.clause);
        self.clause.clear();

        self.check_allocation(result)
    }

    /// Adds the literals to the clause which is currently being built and commits it.
    pub fn add_clause(
        &mut self,
        literals: impl IntoIterator<Item = Literal>,
    ) -> Result<(), ProtocolViolation> {
        for literal in literals {
            self.add_literal(literal)?;
        }
        self.commit_clause()
    }

    /// Assumes the literal to be true for the next call to [`SolverInstance::solve`].
    pub fn assume(&mut self, literal: Literal) -> Result<(), ProtocolViolation> {
        self.ensure_usable()?;

        self.introduce_variable(literal.variable())?;
        self.enter_input();
        self.assumptions.push(literal);
        Ok(())
    }

    /// The largest variable which has been introduced, if any.
    pub fn max_variable(&self) -> Option<Variable> {
        self.freeze_counts.keys().last()
    }
}

/// Methods for solving and querying the result.
impl SolverInstance {
    /// Solves the formula under the current assumptions, which are cleared afterwards.
    ///
    /// Returns [`SolveResult::Unknown`] when the search is stopped by the terminate callback, the
    /// [`InterruptHandle`], a [`SearchLimit`] or because the solver ran out of memory. In the last
    /// case the instance becomes [`SolverState::Unusable`].
    pub fn solve(&mut self) -> Result<SolveResult, ProtocolViolation> {
        self.ensure_usable()?;
        if !self.clause.is_empty() {
            return Err(ProtocolViolation::UnterminatedClause);
        }

        let assumptions = std::mem::take(&mut self.assumptions);
        for assumption in &assumptions {
            let result = self.engine.reinstate(assumption.variable());
            self.check_allocation(result)?;
        }

        self.state = SolverState::Solving;
        self.interrupt.reset();
        let mut hooks = SearchHooks {
            callbacks: &mut self.callbacks,
            interrupt: self.interrupt.clone(),
            conflict_budget: self.conflict_limit.take().map(ConflictBudget::new),
            decision_budget: self.decision_limit.take().map(DecisionBudget::new),
        };

        let start = Instant::now();
        let outcome = self.engine.solve(&assumptions, &mut hooks);
        let elapsed = start.elapsed();
        self.time_spent_in_solver += elapsed;
        self.num_solve_calls += 1;

        let result = self.conclude(outcome);
        debug!(
            "solve call {} with {} assumptions: {result} in {elapsed:?}",
            self.num_solve_calls,
            assumptions.len(),
        );
        self.last_assumptions = assumptions;

        Ok(result)
    }

    /// The value of the literal in the model found by the last call to [`SolverInstance::solve`].
    pub fn value(&self, literal: Literal) -> Result<bool, ProtocolViolation> {
        self.ensure_usable()?;
        if self.state != SolverState::Satisfiable {
            return Err(ProtocolViolation::NotSatisfiable { state: self.state });
        }
        self.ensure_known(literal.variable())?;

        Ok(self.engine.model_value(literal))
    }

    /// Whether the assumption is part of the reason why the last call to
    /// [`SolverInstance::solve`] was unsatisfiable. The failed assumptions together are
    /// unsatisfiable with the clauses.
    pub fn failed(&self, assumption: Literal) -> Result<bool, ProtocolViolation> {
        self.ensure_usable()?;
        if self.state != SolverState::Unsatisfiable {
            return Err(ProtocolViolation::NotUnsatisfiable { state: self.state });
        }
        if !self.last_assumptions.contains(&assumption) {
            return Err(ProtocolViolation::NotAnAssumption(assumption));
        }

        Ok(self.engine.is_failed(assumption))
    }

    /// Whether the literal is implied by the clauses alone. This does not depend on the result of
    /// the last call to [`SolverInstance::solve`].
    pub fn fixed(&self, literal: Literal) -> Result<FixedValue, ProtocolViolation> {
        self.ensure_usable()?;
        self.ensure_known(literal.variable())?;

        Ok(match self.engine.root_value(literal) {
            Some(true) => FixedValue::True,
            Some(false) => FixedValue::False,
            None => FixedValue::Unknown,
        })
    }

    /// Runs up to `rounds` rounds of variable elimination without searching. Frozen variables and
    /// variables of the pending assumptions are not eliminated.
    ///
    /// Returns [`SolveResult::Satisfiable`] or [`SolveResult::Unsatisfiable`] only if
    /// simplification decided the formula.
    pub fn simplify(&mut self, rounds: u32) -> Result<SolveResult, ProtocolViolation> {
        self.ensure_usable()?;
        if !self.clause.is_empty() {
            return Err(ProtocolViolation::UnterminatedClause);
        }

        let start = Instant::now();
        let outcome = self.engine.simplify(rounds, &self.assumptions);
        self.time_spent_in_solver += start.elapsed();

        self.last_assumptions.clear();
        let result = if outcome == EngineOutcome::Unknown {
            self.state = SolverState::Input;
            SolveResult::Unknown
        } else {
            self.conclude(outcome)
        };
        debug!(
            "simplified to {} clauses over {} variables: {result}",
            self.engine.num_irredundant_clauses(),
            self.engine.num_active_variables(),
        );

        Ok(result)
    }

    /// Sets a one-shot budget for the next call to [`SolverInstance::solve`]. A conflict and a
    /// decision budget can be combined.
    pub fn limit(&mut self, limit: SearchLimit) {
        match limit {
            SearchLimit::Conflicts(budget) => self.conflict_limit = Some(budget),
            SearchLimit::Decisions(budget) => self.decision_limit = Some(budget),
        }
    }

    /// A handle which interrupts the running [`SolverInstance::solve`] call, e.g. from another
    /// thread. The handle is reset at the start of every call.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    fn conclude(&mut self, outcome: EngineOutcome) -> SolveResult {
        match outcome {
            EngineOutcome::Satisfiable => {
                self.state = SolverState::Satisfiable;
                SolveResult::Satisfiable
            }
            EngineOutcome::Unsatisfiable => {
                self.state = SolverState::Unsatisfiable;
                SolveResult::Unsatisfiable
            }
            EngineOutcome::Unknown => {
                self.state = SolverState::Interrupted;
                SolveResult::Unknown
            }
            EngineOutcome::OutOfMemory => {
                warn!("the clause database ran out of memory, the solver is unusable");
                self.state = SolverState::Unusable;
                SolveResult::Unknown
            }
        }
    }
}

/// Methods for protecting variables from elimination.
impl SolverInstance {
    /// Protects the variable from elimination by [`SolverInstance::simplify`]. Freezes are
    /// counted; the variable is protected until it is melted as often as it was frozen.
    pub fn freeze(&mut self, variable: Variable) -> Result<(), ProtocolViolation> {
        self.ensure_usable()?;
        self.introduce_variable(variable)?;
        if self.state == SolverState::Configuring {
            self.state = SolverState::Input;
        }

        self.freeze_counts[variable] += 1;
        if self.freeze_counts[variable] == 1 {
            let result = self.engine.set_frozen(variable, true);
            self.check_allocation(result)?;
        }
        Ok(())
    }

    /// Undoes one [`SolverInstance::freeze`] of the variable.
    pub fn melt(&mut self, variable: Variable) -> Result<(), ProtocolViolation> {
        self.ensure_usable()?;
        self.ensure_known(variable)?;
        if self.freeze_counts[variable] == 0 {
            return Err(ProtocolViolation::MeltingUnfrozenVariable(
                variable.to_dimacs(),
            ));
        }

        self.freeze_counts[variable] -= 1;
        if self.freeze_counts[variable] == 0 {
            let result = self.engine.set_frozen(variable, false);
            self.check_allocation(result)?;
        }
        Ok(())
    }

    pub fn frozen(&self, variable: Variable) -> Result<bool, ProtocolViolation> {
        self.ensure_known(variable)?;
        Ok(self.freeze_counts[variable] > 0)
    }
}

/// Methods for registering callbacks.
impl SolverInstance {
    /// Registers a closure which is polled during search; the search stops when it returns
    /// `true`.
    pub fn set_terminate(&mut self, terminate: impl FnMut() -> bool + 'static) {
        self.callbacks.set_terminate(Box::new(ClosureCondition::new(terminate)));
    }

    /// Registers a [`TerminationCondition`] which is polled during search, replacing the current
    /// terminate callback.
    pub fn set_termination(&mut self, termination: impl TerminationCondition + 'static) {
        self.callbacks.set_terminate(Box::new(termination));
    }

    pub fn clear_terminate(&mut self) {
        self.callbacks.clear_terminate();
    }

    /// Registers a closure which receives every learned clause with at most `max_length`
    /// literals.
    ///
    /// The closure cannot use this instance; it may add the clause to another instance which is
    /// not solving.
    pub fn set_learn(&mut self, max_length: usize, learn: impl FnMut(&[Literal]) + 'static) {
        self.callbacks.set_learn(max_length, Box::new(learn));
    }

    pub fn clear_learn(&mut self) {
        self.callbacks.clear_learn();
    }

    /// Registers a closure which receives a [`TrailSnapshot`] for every conflict.
    pub fn set_learn_trail(&mut self, learn_trail: impl FnMut(&TrailSnapshot<'_>) + 'static) {
        self.callbacks.set_learn_trail(Box::new(learn_trail));
    }

    pub fn clear_learn_trail(&mut self) {
        self.callbacks.clear_learn_trail();
    }
}

/// Methods to retrieve information about the solver.
impl SolverInstance {
    /// The number of clauses which were added and not removed by simplification.
    pub fn irredundant_clauses(&self) -> usize {
        self.engine.num_irredundant_clauses()
    }

    /// The number of variables which are neither fixed nor eliminated.
    pub fn active_variables(&self) -> usize {
        self.engine.num_active_variables()
    }

    pub fn statistics(&self) -> SolverStatistics {
        SolverStatistics {
            solve_calls: self.num_solve_calls,
            time_spent_in_solver: self.time_spent_in_solver,
            real_time: self.created_at.elapsed(),
            ..self.engine.statistics()
        }
    }

    /// Logs the statistics currently present in the solver.
    pub fn log_statistics(&self) {
        self.log_statistics_with_logger(StatisticLogger::default());
        log_statistic_postfix();
    }

    /// Logs the statistics with the prefix of the provided [`StatisticLogger`], without the
    /// closing line.
    pub fn log_statistics_with_logger(&self, statistic_logger: StatisticLogger) {
        self.statistics().log(statistic_logger.clone());
        self.engine.log_statistics(statistic_logger);
    }
}

impl SolverInstance {
    fn ensure_usable(&self) -> Result<(), ProtocolViolation> {
        if self.state == SolverState::Unusable {
            return Err(ProtocolViolation::SolverUnusable);
        }
        Ok(())
    }

    fn ensure_known(&self, variable: Variable) -> Result<(), ProtocolViolation> {
        if variable.index() as usize >= self.freeze_counts.len() {
            return Err(ProtocolViolation::UnknownVariable(variable.to_dimacs()));
        }
        Ok(())
    }

    fn introduce_variable(&mut self, variable: Variable) -> Result<(), ProtocolViolation> {
        let num_variables = variable.index() as usize + 1;
        if num_variables <= self.freeze_counts.len() {
            return Ok(());
        }

        let result = self
            .freeze_counts
            .try_reserve(num_variables - self.freeze_counts.len())
            .map_err(|_| OutOfMemory::Variables(num_variables))
            .and_then(|_| self.engine.grow(num_variables));
        self.check_allocation(result)?;

        self.freeze_counts.accomodate(variable, 0);
        Ok(())
    }

    /// Adding clauses or assumptions invalidates the result of the last call to `solve`.
    fn enter_input(&mut self) {
        self.state = SolverState::Input;
    }

    fn check_allocation(&mut self, result: Result<(), OutOfMemory>) -> Result<(), ProtocolViolation> {
        if let Err(error) = result {
            warn!("{error}, the solver is unusable");
            self.state = SolverState::Unusable;
            return Err(ProtocolViolation::SolverUnusable);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(code: i32) -> Literal {
        Literal::try_from(code).expect("test literals are valid")
    }

    fn variable(dimacs: i32) -> Variable {
        literal(dimacs).variable()
    }

    #[test]
    fn options_can_only_be_set_while_configuring() {
        let mut solver = SolverInstance::default();
        assert_eq!(solver.set_options(SolverOptions::default()), Ok(()));

        solver.add(1).unwrap();
        assert_eq!(
            solver.set_options(SolverOptions::default()),
            Err(ProtocolViolation::NotConfiguring {
                state: SolverState::Input
            })
        );
    }

    #[test]
    fn adding_invalidates_the_result() {
        let mut solver = SolverInstance::default();
        solver.add_clause([literal(1), literal(2)]).unwrap();
        assert_eq!(solver.solve(), Ok(SolveResult::Satisfiable));
        assert!(solver.value(literal(1)).is_ok());

        solver.add(-1).unwrap();
        assert_eq!(solver.state(), SolverState::Input);
        assert_eq!(
            solver.value(literal(1)),
            Err(ProtocolViolation::NotSatisfiable {
                state: SolverState::Input
            })
        );
    }

    #[test]
    fn solving_with_an_open_clause_is_rejected() {
        let mut solver = SolverInstance::default();
        solver.add(1).unwrap();
        assert_eq!(solver.solve(), Err(ProtocolViolation::UnterminatedClause));
        assert_eq!(solver.simplify(1), Err(ProtocolViolation::UnterminatedClause));
    }

    #[test]
    fn overflowing_literals_are_rejected() {
        let mut solver = SolverInstance::default();
        assert_eq!(
            solver.add(i32::MIN),
            Err(ProtocolViolation::InvalidLiteral(i32::MIN))
        );
        assert_eq!(solver.state(), SolverState::Configuring);
    }

    #[test]
    fn assumptions_are_cleared_after_solve() {
        let mut solver = SolverInstance::default();
        solver.add_clause([literal(1)]).unwrap();

        solver.assume(literal(-1)).unwrap();
        assert_eq!(solver.solve(), Ok(SolveResult::Unsatisfiable));
        assert_eq!(solver.failed(literal(-1)), Ok(true));

        assert_eq!(solver.solve(), Ok(SolveResult::Satisfiable));
        assert_eq!(solver.value(literal(1)), Ok(true));
    }

    #[test]
    fn failed_requires_a_previous_assumption() {
        let mut solver = SolverInstance::default();
        solver.add_clause([literal(1)]).unwrap();
        solver.add_clause([literal(-1)]).unwrap();

        assert_eq!(solver.solve(), Ok(SolveResult::Unsatisfiable));
        assert_eq!(
            solver.failed(literal(1)),
            Err(ProtocolViolation::NotAnAssumption(literal(1)))
        );
    }

    #[test]
    fn queries_on_unknown_variables_are_rejected() {
        let mut solver = SolverInstance::default();
        solver.add_clause([literal(1)]).unwrap();

        assert_eq!(
            solver.fixed(literal(5)),
            Err(ProtocolViolation::UnknownVariable(5))
        );
        assert_eq!(
            solver.frozen(variable(5)),
            Err(ProtocolViolation::UnknownVariable(5))
        );
        assert_eq!(solver.fixed(literal(-1)), Ok(FixedValue::False));
    }

    #[test]
    fn freezes_are_counted() {
        let mut solver = SolverInstance::default();
        solver.freeze(variable(2)).unwrap();
        solver.freeze(variable(2)).unwrap();
        assert_eq!(solver.max_variable(), Some(variable(2)));

        solver.melt(variable(2)).unwrap();
        assert_eq!(solver.frozen(variable(2)), Ok(true));
        solver.melt(variable(2)).unwrap();
        assert_eq!(solver.frozen(variable(2)), Ok(false));

        assert_eq!(
            solver.melt(variable(2)),
            Err(ProtocolViolation::MeltingUnfrozenVariable(2))
        );
        assert_eq!(solver.frozen(variable(1)), Ok(false));
    }

    #[test]
    fn conflict_limit_applies_to_one_call() {
        let mut solver = SolverInstance::default();
        solver.add_clause([literal(1), literal(2)]).unwrap();

        solver.limit(SearchLimit::Decisions(0));
        assert_eq!(solver.solve(), Ok(SolveResult::Unknown));
        assert_eq!(solver.state(), SolverState::Interrupted);

        assert_eq!(solver.solve(), Ok(SolveResult::Satisfiable));
    }

    #[test]
    fn statistics_count_solve_calls() {
        let mut solver = SolverInstance::default();
        solver.add_clause([literal(1), literal(-2)]).unwrap();
        let _ = solver.solve().unwrap();
        let _ = solver.solve().unwrap();

        assert_eq!(solver.statistics().solve_calls, 2);
        assert!(solver.statistics().decisions >= 1);
    }
}
