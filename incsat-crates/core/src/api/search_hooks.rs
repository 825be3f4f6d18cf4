use crate::basic_types::Literal;
use crate::callbacks::CallbackRegistry;
use crate::callbacks::TrailSnapshot;
use crate::engine::EngineHooks;
use crate::termination::ConflictBudget;
use crate::termination::DecisionBudget;
use crate::termination::InterruptHandle;
use crate::termination::TerminationCondition;

/// Forwards the events of one `solve` call to the registered callbacks and checks the search
/// limits of that call.
pub(crate) struct SearchHooks<'a> {
    pub(crate) callbacks: &'a mut CallbackRegistry,
    pub(crate) interrupt: InterruptHandle,
    pub(crate) conflict_budget: Option<ConflictBudget>,
    pub(crate) decision_budget: Option<DecisionBudget>,
}

impl EngineHooks for SearchHooks<'_> {
    fn should_stop(&mut self) -> bool {
        self.interrupt.should_stop()
            || self.conflict_budget.should_stop()
            || self.decision_budget.should_stop()
            || self.callbacks.should_stop()
    }

    fn on_decision(&mut self) {
        self.conflict_budget.decision_has_been_made();
        self.decision_budget.decision_has_been_made();
        self.callbacks.decision_has_been_made();
    }

    fn on_conflict(&mut self) {
        self.conflict_budget.conflict_has_been_found();
        self.decision_budget.conflict_has_been_found();
        self.callbacks.conflict_has_been_found();
    }

    fn wants_trail(&self) -> bool {
        self.callbacks.has_learn_trail()
    }

    fn on_trail(&mut self, snapshot: &TrailSnapshot<'_>) {
        self.callbacks.on_trail(snapshot);
    }

    fn on_learned_clause(&mut self, literals: &[Literal]) {
        self.callbacks.on_learned_clause(literals);
    }
}
