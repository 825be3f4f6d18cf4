use std::collections::TryReserveError;

use log::trace;

use super::conflict_analysis::ConflictAnalysisResult;
use super::elimination::ReconstructionStack;
use super::engine_statistics::EngineStatistics;
use super::engine_statistics::LearnedClauseStatistics;
use super::Assignments;
use super::ClauseDatabase;
use super::ClauseReference;
use super::ConflictAnalyser;
use super::EngineHooks;
use super::EngineOutcome;
use super::LearnedClauseManager;
use super::OutOfMemory;
use super::Reason;
use super::RestartStrategy;
use super::SolverOptions;
use super::SolvingEngine;
use super::VariableSelection;
use super::WatchLists;
use super::Watcher;
use crate::basic_types::moving_averages::MovingAverage;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::callbacks::TrailSnapshot;
use crate::containers::HashSet;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::incsat_assert_moderate;
use crate::incsat_assert_simple;
use crate::statistics::SolverStatistics;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// A conflict-driven clause-learning engine.
#[derive(Debug)]
pub(crate) struct CdclEngine {
    pub(super) options: SolverOptions,
    pub(super) clauses: ClauseDatabase,
    pub(super) watch_lists: WatchLists,
    pub(super) assignments: Assignments,
    /// The position in the trail of the next literal to propagate.
    propagation_queue_head: usize,
    pub(super) selection: VariableSelection,
    analyser: ConflictAnalyser,
    restart_strategy: RestartStrategy,
    pub(super) learned_clause_manager: LearnedClauseManager,
    pub(super) reconstruction: ReconstructionStack,
    pub(super) frozen: KeyedVec<Variable, bool>,
    /// The clauses are unsatisfiable regardless of assumptions.
    pub(super) is_inconsistent: bool,
    model: KeyedVec<Variable, bool>,
    failed_assumptions: HashSet<Literal>,
    pub(super) statistics: EngineStatistics,
    learned_clause_statistics: LearnedClauseStatistics,
}

/// What to do after propagation reached a fixpoint without conflict.
enum NextDecision {
    Decide(Literal),
    AssumptionFailed(Literal),
    AllAssigned,
}

impl CdclEngine {
    pub(crate) fn new(options: SolverOptions) -> CdclEngine {
        CdclEngine {
            options,
            clauses: ClauseDatabase::new(options.clause_memory_limit),
            watch_lists: WatchLists::default(),
            assignments: Assignments::default(),
            propagation_queue_head: 0,
            selection: VariableSelection::new(
                options.variable_decay_factor,
                options.random_decision_frequency,
                options.random_seed,
            ),
            analyser: ConflictAnalyser::default(),
            restart_strategy: RestartStrategy::new(options.restart_options),
            learned_clause_manager: LearnedClauseManager::new(options.learning_options),
            reconstruction: ReconstructionStack::default(),
            frozen: KeyedVec::default(),
            is_inconsistent: false,
            model: KeyedVec::default(),
            failed_assumptions: HashSet::default(),
            statistics: EngineStatistics::default(),
            learned_clause_statistics: LearnedClauseStatistics::default(),
        }
    }

    fn reserve_variables(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.assignments.try_reserve(additional)?;
        self.watch_lists.try_reserve(additional)?;
        self.selection.try_reserve(additional)?;
        self.analyser.try_reserve(additional)?;
        self.reconstruction.try_reserve(additional)?;
        self.frozen.try_reserve(additional)
    }

    /// Adds a clause at the root level, removing duplicate and root-false literals.
    pub(super) fn add_clause_at_root(&mut self, literals: &[Literal]) -> Result<(), OutOfMemory> {
        incsat_assert_simple!(self.assignments.decision_level() == 0);
        if self.is_inconsistent {
            return Ok(());
        }

        for literal in literals {
            self.reinstate_variable(literal.variable())?;
        }

        let mut clause = literals.to_vec();
        clause.sort_unstable();
        clause.dedup();
        let is_tautology = clause
            .windows(2)
            .any(|pair| pair[0].variable() == pair[1].variable());
        let is_satisfied = clause
            .iter()
            .any(|&literal| self.assignments.is_literal_true(literal));
        if is_tautology || is_satisfied {
            return Ok(());
        }
        clause.retain(|&literal| !self.assignments.is_literal_false(literal));

        match clause.len() {
            0 => self.is_inconsistent = true,
            1 => {
                self.assignments.enqueue(clause[0], Reason::Unit);
                if self.propagate().is_some() {
                    self.is_inconsistent = true;
                }
            }
            _ => {
                let reference = self.clauses.create_clause(&clause, false, 0)?;
                self.watch_lists.watch_clause(reference, &clause);
            }
        }

        Ok(())
    }

    /// Unit propagation over the watched literals. Returns a conflicting clause if one is found.
    pub(super) fn propagate(&mut self) -> Option<ClauseReference> {
        while self.propagation_queue_head < self.assignments.num_assigned() {
            let propagated = self.assignments.trail()[self.propagation_queue_head];
            self.propagation_queue_head += 1;
            let false_literal = !propagated;

            let mut watchers = self.watch_lists.take(propagated);
            let mut conflict = None;
            let mut num_kept = 0;
            let mut index = 0;

            while index < watchers.len() {
                let watcher = watchers[index];
                index += 1;

                if self.assignments.is_literal_true(watcher.blocker) {
                    watchers[num_kept] = watcher;
                    num_kept += 1;
                    continue;
                }

                let literals = self.clauses[watcher.clause].literals_mut();
                if literals[0] == false_literal {
                    literals.swap(0, 1);
                }
                incsat_assert_moderate!(literals[1] == false_literal);

                let first = literals[0];
                let updated_watcher = Watcher {
                    clause: watcher.clause,
                    blocker: first,
                };
                if first != watcher.blocker && self.assignments.is_literal_true(first) {
                    watchers[num_kept] = updated_watcher;
                    num_kept += 1;
                    continue;
                }

                let replacement = (2..literals.len())
                    .find(|&position| !self.assignments.is_literal_false(literals[position]));
                if let Some(position) = replacement {
                    literals.swap(1, position);
                    self.watch_lists.add_watcher(!literals[1], updated_watcher);
                    continue;
                }

                watchers[num_kept] = updated_watcher;
                num_kept += 1;

                if self.assignments.is_literal_false(first) {
                    conflict = Some(watcher.clause);
                    while index < watchers.len() {
                        watchers[num_kept] = watchers[index];
                        num_kept += 1;
                        index += 1;
                    }
                } else {
                    self.assignments
                        .enqueue(first, Reason::Propagation(watcher.clause));
                    self.statistics.num_propagations += 1;
                }
            }

            watchers.truncate(num_kept);
            self.watch_lists.restore(propagated, watchers);

            if conflict.is_some() {
                return conflict;
            }
        }

        None
    }

    fn backtrack(&mut self, level: u32) {
        let selection = &mut self.selection;
        self.assignments
            .backtrack(level, |literal| selection.on_unassign_literal(literal));
        self.propagation_queue_head = self
            .propagation_queue_head
            .min(self.assignments.num_assigned());
    }

    fn search(&mut self, assumptions: &[Literal], hooks: &mut dyn EngineHooks) -> EngineOutcome {
        loop {
            if hooks.should_stop() {
                return EngineOutcome::Unknown;
            }

            if let Some(conflict) = self.propagate() {
                self.statistics.num_conflicts += 1;
                hooks.on_conflict();

                if self.assignments.decision_level() == 0 {
                    self.is_inconsistent = true;
                    return EngineOutcome::Unsatisfiable;
                }

                if hooks.wants_trail() {
                    self.report_trail(conflict, hooks);
                }

                if self.resolve_conflict(conflict, hooks).is_err() {
                    return EngineOutcome::OutOfMemory;
                }
                continue;
            }

            if self.restart_strategy.should_restart() && self.assignments.decision_level() > 0 {
                self.restart();
            }

            match self.next_decision(assumptions) {
                NextDecision::Decide(literal) => {
                    hooks.on_decision();
                    self.statistics.num_decisions += 1;
                    self.assignments.increase_decision_level();
                    self.assignments.enqueue(literal, Reason::Decision);
                    self.statistics.peak_depth = self
                        .statistics
                        .peak_depth
                        .max(self.assignments.decision_level() as u64);
                }
                NextDecision::AssumptionFailed(assumption) => {
                    let core =
                        self.analyser
                            .analyse_final(assumption, &self.assignments, &self.clauses);
                    self.failed_assumptions.extend(core);
                    return EngineOutcome::Unsatisfiable;
                }
                NextDecision::AllAssigned => return EngineOutcome::Satisfiable,
            }
        }
    }

    fn next_decision(&mut self, assumptions: &[Literal]) -> NextDecision {
        while (self.assignments.decision_level() as usize) < assumptions.len() {
            let assumption = assumptions[self.assignments.decision_level() as usize];
            match self.assignments.literal_value(assumption) {
                // Keep one decision level per assumption.
                Some(true) => self.assignments.increase_decision_level(),
                Some(false) => return NextDecision::AssumptionFailed(assumption),
                None => return NextDecision::Decide(assumption),
            }
        }

        match self.selection.select_decision(&self.assignments) {
            Some(literal) => NextDecision::Decide(literal),
            None => NextDecision::AllAssigned,
        }
    }

    fn report_trail(&self, conflict: ClauseReference, hooks: &mut dyn EngineHooks) {
        let conflict_literals = self.clauses[conflict].literals();
        let is_propagated: Vec<bool> = conflict_literals
            .iter()
            .map(|literal| self.assignments.reason(literal.variable()) != Reason::Decision)
            .collect();
        hooks.on_trail(&TrailSnapshot::new(
            conflict_literals,
            &is_propagated,
            self.assignments.trail(),
        ));
    }

    fn resolve_conflict(
        &mut self,
        conflict: ClauseReference,
        hooks: &mut dyn EngineHooks,
    ) -> Result<(), OutOfMemory> {
        let ConflictAnalysisResult {
            learned_clause,
            backjump_level,
            lbd,
            num_removed_by_minimisation,
        } = self.analyser.analyse(
            conflict,
            &self.assignments,
            &mut self.clauses,
            &mut self.selection,
            &mut self.learned_clause_manager,
            self.options.learned_clause_minimisation,
        );

        self.restart_strategy
            .notify_conflict(lbd, self.assignments.num_assigned() as u64);
        self.statistics.num_blocked_restarts = self.restart_strategy.number_of_blocked_restarts();
        self.update_learned_clause_statistics(
            &learned_clause,
            lbd,
            backjump_level,
            num_removed_by_minimisation,
        );

        self.backtrack(backjump_level);
        if learned_clause.len() == 1 {
            self.assignments.enqueue(learned_clause[0], Reason::Unit);
        } else {
            let reference = self.clauses.create_clause(&learned_clause, true, lbd)?;
            self.watch_lists.watch_clause(reference, &learned_clause);
            self.learned_clause_manager
                .add_learned_clause(reference, lbd);
            self.assignments
                .enqueue(learned_clause[0], Reason::Propagation(reference));
        }
        hooks.on_learned_clause(&learned_clause);

        self.selection.decay_activities();
        self.learned_clause_manager.decay_clause_activities();
        if self
            .learned_clause_manager
            .shrink_learned_clause_database_if_needed(
                &mut self.clauses,
                &mut self.watch_lists,
                &self.assignments,
            )
        {
            self.statistics.num_reductions += 1;
        }

        Ok(())
    }

    fn update_learned_clause_statistics(
        &mut self,
        learned_clause: &[Literal],
        lbd: u32,
        backjump_level: u32,
        num_removed_by_minimisation: usize,
    ) {
        let statistics = &mut self.learned_clause_statistics;
        statistics.num_learned_clauses += 1;
        statistics.num_learned_literals += learned_clause.len() as u64;
        if learned_clause.len() == 1 {
            statistics.num_unit_clauses_learned += 1;
        }
        statistics
            .average_learned_clause_length
            .add_term(learned_clause.len() as u64);
        statistics
            .average_number_of_removed_literals_recursive
            .add_term(num_removed_by_minimisation as u64);
        statistics
            .average_backtrack_amount
            .add_term((self.assignments.decision_level() - backjump_level) as u64);
        statistics.average_lbd.add_term(lbd as u64);
    }

    fn restart(&mut self) {
        trace!(
            "restarting after {} conflicts",
            self.statistics.num_conflicts
        );
        self.backtrack(0);
        self.restart_strategy.notify_restart();
        self.statistics.num_restarts += 1;
    }

    /// Stores the current assignment, completed for unassigned and eliminated variables.
    fn save_model(&mut self) {
        let num_variables = self.assignments.num_variables();
        if num_variables == 0 {
            return;
        }
        self.model
            .accomodate(Variable::new(num_variables as u32 - 1), false);

        for index in 0..num_variables {
            let variable = Variable::create_from_index(index);
            self.model[variable] = self
                .assignments
                .literal_value(Literal::positive(variable))
                .unwrap_or_else(|| self.selection.saved_phase(variable));
        }
        self.reconstruction.extend(&mut self.model);
    }
}

impl SolvingEngine for CdclEngine {
    fn grow(&mut self, num_variables: usize) -> Result<(), OutOfMemory> {
        if num_variables <= self.assignments.num_variables() {
            return Ok(());
        }

        // Everything is reserved up front, so that the growth below cannot fail halfway.
        self.reserve_variables(num_variables - self.assignments.num_variables())
            .map_err(|_| OutOfMemory::Variables(num_variables))?;

        self.assignments.grow(num_variables);
        self.watch_lists.grow(num_variables);
        self.selection.grow(num_variables);
        self.analyser.grow(num_variables);
        self.reconstruction.grow(num_variables);
        self.frozen
            .accomodate(Variable::new(num_variables as u32 - 1), false);
        Ok(())
    }

    fn add_clause(&mut self, literals: &[Literal]) -> Result<(), OutOfMemory> {
        self.add_clause_at_root(literals)
    }

    fn solve(&mut self, assumptions: &[Literal], hooks: &mut dyn EngineHooks) -> EngineOutcome {
        self.failed_assumptions.clear();
        if self.is_inconsistent {
            return EngineOutcome::Unsatisfiable;
        }
        incsat_assert_simple!(assumptions
            .iter()
            .all(|assumption| !self.reconstruction.is_eliminated(assumption.variable())));

        let outcome = self.search(assumptions, hooks);
        if outcome == EngineOutcome::Satisfiable {
            self.save_model();
        }
        self.backtrack(0);

        outcome
    }

    fn model_value(&self, literal: Literal) -> bool {
        self.model[literal.variable()] == literal.is_positive()
    }

    fn is_failed(&self, assumption: Literal) -> bool {
        self.failed_assumptions.contains(&assumption)
    }

    fn root_value(&self, literal: Literal) -> Option<bool> {
        self.assignments.root_value(literal)
    }

    fn set_frozen(&mut self, variable: Variable, is_frozen: bool) -> Result<(), OutOfMemory> {
        self.frozen[variable] = is_frozen;
        if is_frozen {
            self.reinstate_variable(variable)?;
        }
        Ok(())
    }

    fn reinstate(&mut self, variable: Variable) -> Result<(), OutOfMemory> {
        self.reinstate_variable(variable)
    }

    fn simplify(&mut self, rounds: u32, protected: &[Literal]) -> EngineOutcome {
        incsat_assert_simple!(self.assignments.decision_level() == 0);
        if self.is_inconsistent || self.propagate().is_some() {
            self.is_inconsistent = true;
            return EngineOutcome::Unsatisfiable;
        }
        self.simplify_root_clauses();

        for _ in 0..rounds {
            match self.eliminate_variables(protected) {
                Ok(0) => break,
                Ok(_) => {}
                Err(_) => return EngineOutcome::OutOfMemory,
            }

            if self.is_inconsistent || self.propagate().is_some() {
                self.is_inconsistent = true;
                return EngineOutcome::Unsatisfiable;
            }
            self.simplify_root_clauses();
        }

        if protected.is_empty() && self.clauses.num_irredundant() == 0 {
            self.save_model();
            return EngineOutcome::Satisfiable;
        }
        EngineOutcome::Unknown
    }

    fn num_irredundant_clauses(&self) -> usize {
        self.clauses.num_irredundant()
    }

    fn num_active_variables(&self) -> usize {
        (0..self.assignments.num_variables())
            .map(Variable::create_from_index)
            .filter(|&variable| {
                !self.assignments.is_variable_assigned(variable)
                    && !self.reconstruction.is_eliminated(variable)
            })
            .count()
    }

    fn statistics(&self) -> SolverStatistics {
        SolverStatistics {
            conflicts: self.statistics.num_conflicts,
            decisions: self.statistics.num_decisions,
            propagations: self.statistics.num_propagations,
            restarts: self.statistics.num_restarts,
            learned_clauses: self.learned_clause_statistics.num_learned_clauses,
            learned_literals: self.learned_clause_statistics.num_learned_literals,
            reductions: self.statistics.num_reductions,
            eliminated_variables: self.statistics.num_eliminated_variables,
            peak_clause_database_bytes: self.clauses.peak_allocated_bytes(),
            ..Default::default()
        }
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics
            .log(statistic_logger.attach_to_prefix("engine"));
        self.learned_clause_statistics
            .log(statistic_logger.attach_to_prefix("learned_clauses"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingHooks {
        num_decisions: u64,
        num_conflicts: u64,
        learned: Vec<Vec<Literal>>,
        stop_after_decisions: Option<u64>,
    }

    impl EngineHooks for RecordingHooks {
        fn should_stop(&mut self) -> bool {
            self.stop_after_decisions
                .is_some_and(|limit| self.num_decisions >= limit)
        }

        fn on_decision(&mut self) {
            self.num_decisions += 1;
        }

        fn on_conflict(&mut self) {
            self.num_conflicts += 1;
        }

        fn wants_trail(&self) -> bool {
            false
        }

        fn on_trail(&mut self, _: &TrailSnapshot<'_>) {}

        fn on_learned_clause(&mut self, literals: &[Literal]) {
            self.learned.push(literals.to_vec());
        }
    }

    fn literal(code: i32) -> Literal {
        Literal::try_from(code).expect("test literals are valid")
    }

    fn engine_with(clauses: &[&[i32]]) -> CdclEngine {
        let mut engine = CdclEngine::new(SolverOptions::default());
        let num_variables = clauses
            .iter()
            .flat_map(|clause| clause.iter())
            .map(|code| code.unsigned_abs() as usize)
            .max()
            .unwrap_or(0);
        engine.grow(num_variables).expect("small formulas fit in memory");
        for clause in clauses {
            let literals: Vec<Literal> = clause.iter().map(|&code| literal(code)).collect();
            engine
                .add_clause(&literals)
                .expect("no memory limit is set");
        }
        engine
    }

    #[test]
    fn units_propagate_at_the_root() {
        let engine = engine_with(&[&[1, 2], &[-2, 3], &[-1]]);

        assert_eq!(engine.root_value(literal(2)), Some(true));
        assert_eq!(engine.root_value(literal(3)), Some(true));
        assert_eq!(engine.num_active_variables(), 0);
    }

    #[test]
    fn satisfied_and_falsified_literals_are_dropped_on_addition() {
        let mut engine = engine_with(&[&[1]]);
        engine.grow(3).expect("small formulas fit in memory");
        engine
            .add_clause(&[literal(1), literal(2), literal(3)])
            .expect("no memory limit is set");
        engine
            .add_clause(&[literal(-1), literal(2), literal(3)])
            .expect("no memory limit is set");

        assert_eq!(engine.num_irredundant_clauses(), 1);
        assert_eq!(engine.clauses[ClauseReference::create_from_index(0)].len(), 2);
    }

    #[test]
    fn conflicts_are_learned_from() {
        // Every assignment to 1 and 2 falsifies one of the clauses.
        let mut engine = engine_with(&[&[1, 2, 3], &[1, 2, -3], &[1, -2], &[-1, 2], &[-1, -2]]);
        let mut hooks = RecordingHooks::default();

        assert_eq!(engine.solve(&[], &mut hooks), EngineOutcome::Unsatisfiable);
        assert!(hooks.num_conflicts > 0);
        assert!(!hooks.learned.is_empty());
        assert_eq!(engine.statistics().conflicts, hooks.num_conflicts);
    }

    #[test]
    fn model_satisfies_the_assumptions() {
        let mut engine = engine_with(&[&[1, 2], &[-1, 3]]);
        let mut hooks = RecordingHooks::default();

        let outcome = engine.solve(&[literal(1), literal(-2)], &mut hooks);
        assert_eq!(outcome, EngineOutcome::Satisfiable);
        assert!(engine.model_value(literal(1)));
        assert!(engine.model_value(literal(-2)));
        assert!(engine.model_value(literal(3)));
        assert_eq!(engine.assignments.decision_level(), 0);
    }

    #[test]
    fn failed_assumptions_are_recorded() {
        let mut engine = engine_with(&[&[-1, -2]]);
        let mut hooks = RecordingHooks::default();

        let outcome = engine.solve(&[literal(3), literal(1), literal(2)], &mut hooks);
        assert_eq!(outcome, EngineOutcome::Unsatisfiable);
        assert!(engine.is_failed(literal(1)));
        assert!(engine.is_failed(literal(2)));
        assert!(!engine.is_failed(literal(3)));
        assert!(!engine.is_inconsistent);
    }

    #[test]
    fn stopped_search_returns_to_the_root() {
        let mut engine = engine_with(&[&[1, 2], &[3, 4]]);
        let mut hooks = RecordingHooks {
            stop_after_decisions: Some(1),
            ..Default::default()
        };

        assert_eq!(engine.solve(&[], &mut hooks), EngineOutcome::Unknown);
        assert_eq!(engine.assignments.decision_level(), 0);
        assert_eq!(engine.assignments.num_assigned(), 0);
    }

    #[test]
    fn failed_growth_leaves_the_engine_usable() {
        let mut engine = engine_with(&[&[1, 2]]);

        assert!(matches!(
            engine.grow(usize::MAX / 4),
            Err(OutOfMemory::Variables(_))
        ));
        assert_eq!(engine.assignments.num_variables(), 2);

        engine.grow(3).expect("small formulas fit in memory");
        engine
            .add_clause(&[literal(-1), literal(3)])
            .expect("no memory limit is set");
        let mut hooks = RecordingHooks::default();
        assert_eq!(
            engine.solve(&[literal(1)], &mut hooks),
            EngineOutcome::Satisfiable
        );
        assert!(engine.model_value(literal(3)));
    }
}
