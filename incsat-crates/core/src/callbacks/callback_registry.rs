use std::fmt::Debug;

use crate::basic_types::Literal;
use crate::callbacks::TrailSnapshot;
use crate::termination::TerminationCondition;

type LearnCallback = Box<dyn FnMut(&[Literal])>;
type TrailCallback = Box<dyn FnMut(&TrailSnapshot<'_>)>;

/// Holds the terminate, learn and trail callbacks of one instance.
#[derive(Default)]
pub(crate) struct CallbackRegistry {
    terminate: Option<Box<dyn TerminationCondition>>,
    /// The learn callback together with the maximum length of the clauses passed to it.
    learn: Option<(usize, LearnCallback)>,
    learn_trail: Option<TrailCallback>,
}

impl Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("has_terminate", &self.terminate.is_some())
            .field("learn_max_length", &self.learn.as_ref().map(|(length, _)| *length))
            .field("has_learn_trail", &self.learn_trail.is_some())
            .finish()
    }
}

impl CallbackRegistry {
    pub(crate) fn set_terminate(&mut self, termination: Box<dyn TerminationCondition>) {
        self.terminate = Some(termination);
    }

    pub(crate) fn clear_terminate(&mut self) {
        self.terminate = None;
    }

    pub(crate) fn set_learn(&mut self, max_length: usize, callback: LearnCallback) {
        self.learn = Some((max_length, callback));
    }

    pub(crate) fn clear_learn(&mut self) {
        self.learn = None;
    }

    pub(crate) fn set_learn_trail(&mut self, callback: TrailCallback) {
        self.learn_trail = Some(callback);
    }

    pub(crate) fn clear_learn_trail(&mut self) {
        self.learn_trail = None;
    }

    pub(crate) fn should_stop(&mut self) -> bool {
        self.terminate.should_stop()
    }

    pub(crate) fn decision_has_been_made(&mut self) {
        self.terminate.decision_has_been_made()
    }

    pub(crate) fn conflict_has_been_found(&mut self) {
        self.terminate.conflict_has_been_found()
    }

    pub(crate) fn has_learn_trail(&self) -> bool {
        self.learn_trail.is_some()
    }

    pub(crate) fn on_trail(&mut self, snapshot: &TrailSnapshot<'_>) {
        if let Some(callback) = self.learn_trail.as_mut() {
            callback(snapshot);
        }
    }

    /// Passes the clause to the learn callback if it is not longer than the registered maximum.
    pub(crate) fn on_learned_clause(&mut self, literals: &[Literal]) {
        if let Some((max_length, callback)) = self.learn.as_mut() {
            if literals.len() <= *max_length {
                callback(literals);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::termination::ClosureCondition;

    fn literals(codes: &[i32]) -> Vec<Literal> {
        codes
            .iter()
            .map(|&code| Literal::try_from(code).expect("test literals are valid"))
            .collect()
    }

    #[test]
    fn learn_callback_respects_max_length() {
        let received = Rc::new(RefCell::new(vec![]));
        let sink = Rc::clone(&received);

        let mut registry = CallbackRegistry::default();
        registry.set_learn(
            2,
            Box::new(move |clause: &[Literal]| sink.borrow_mut().push(clause.to_vec())),
        );

        registry.on_learned_clause(&literals(&[1, -2]));
        registry.on_learned_clause(&literals(&[1, 2, 3]));
        registry.on_learned_clause(&literals(&[-4]));

        assert_eq!(
            *received.borrow(),
            vec![literals(&[1, -2]), literals(&[-4])]
        );
    }

    #[test]
    fn replacing_a_callback_drops_the_previous_one() {
        let first = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&first);

        let mut registry = CallbackRegistry::default();
        registry.set_learn(10, Box::new(move |_: &[Literal]| *counter.borrow_mut() += 1));
        registry.set_learn(10, Box::new(|_: &[Literal]| {}));

        registry.on_learned_clause(&literals(&[1]));
        assert_eq!(*first.borrow(), 0);
        assert_eq!(Rc::strong_count(&first), 1);
    }

    #[test]
    fn terminate_callback_is_polled() {
        let mut registry = CallbackRegistry::default();
        assert!(!registry.should_stop());

        registry.set_terminate(Box::new(ClosureCondition::new(|| true)));
        assert!(registry.should_stop());

        registry.clear_terminate();
        assert!(!registry.should_stop());
    }
}
