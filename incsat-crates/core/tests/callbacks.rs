#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use helpers::add_clauses;
use helpers::literal;
use helpers::model_satisfies;
use helpers::pigeonhole;
use helpers::planted_formula;
use helpers::seeded_rng;
use incsat_core::termination::ConflictBudget;
use incsat_core::Literal;
use incsat_core::ProtocolViolation;
use incsat_core::SearchLimit;
use incsat_core::SolveResult;
use incsat_core::SolverInstance;
use incsat_core::SolverState;

#[test]
fn terminate_callback_interrupts_search() {
    let mut solver = SolverInstance::default();
    add_clauses(&mut solver, &pigeonhole(8, 7));
    let num_clauses = solver.irredundant_clauses();

    let polls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&polls);
    solver.set_terminate(move || {
        counter.set(counter.get() + 1);
        counter.get() > 50
    });

    assert_eq!(solver.solve(), Ok(SolveResult::Unknown));
    assert_eq!(solver.state(), SolverState::Interrupted);
    assert_eq!(polls.get(), 51);
    assert_eq!(solver.irredundant_clauses(), num_clauses);
    assert_eq!(
        solver.value(literal(1)),
        Err(ProtocolViolation::NotSatisfiable {
            state: SolverState::Interrupted
        })
    );

    solver.clear_terminate();
    assert_eq!(solver.solve(), Ok(SolveResult::Unsatisfiable));
}

#[test]
fn interrupted_solve_can_be_retried_with_assumptions() {
    let mut solver = SolverInstance::default();
    add_clauses(&mut solver, &pigeonhole(7, 7));

    solver.set_termination(ConflictBudget::new(0));
    solver.assume(literal(1)).unwrap();
    assert_eq!(solver.solve(), Ok(SolveResult::Unknown));

    solver.clear_terminate();
    solver.assume(literal(1)).unwrap();
    assert_eq!(solver.solve(), Ok(SolveResult::Satisfiable));
    assert_eq!(solver.value(literal(1)), Ok(true));
}

#[test]
fn interrupt_handle_stops_a_running_solve() {
    let mut solver = SolverInstance::default();
    add_clauses(&mut solver, &pigeonhole(12, 11));

    let handle = solver.interrupt_handle();
    let interrupter = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        handle.interrupt();
    });

    assert_eq!(solver.solve(), Ok(SolveResult::Unknown));
    interrupter.join().expect("interrupting thread should not panic");
}

#[test]
fn conflict_limit_is_consumed_by_one_call() {
    let mut solver = SolverInstance::default();
    add_clauses(&mut solver, &pigeonhole(6, 5));

    solver.limit(SearchLimit::Conflicts(3));
    assert_eq!(solver.solve(), Ok(SolveResult::Unknown));
    assert_eq!(solver.statistics().conflicts, 3);

    assert_eq!(solver.solve(), Ok(SolveResult::Unsatisfiable));
}

#[test]
fn learn_callback_receives_short_clauses() {
    let mut solver = SolverInstance::default();
    add_clauses(&mut solver, &pigeonhole(6, 5));

    let learned: Rc<RefCell<Vec<Vec<Literal>>>> = Rc::default();
    let sink = Rc::clone(&learned);
    solver.set_learn(3, move |clause: &[Literal]| sink.borrow_mut().push(clause.to_vec()));

    assert_eq!(solver.solve(), Ok(SolveResult::Unsatisfiable));
    let learned = learned.borrow();
    assert!(!learned.is_empty());
    assert!(learned.iter().all(|clause| !clause.is_empty() && clause.len() <= 3));
    assert!(learned.len() as u64 <= solver.statistics().learned_clauses);
}

#[test]
fn learned_clauses_are_implied_by_the_formula() {
    let clauses = planted_formula(&mut seeded_rng(5), 60, 270);
    let mut solver = SolverInstance::default();
    add_clauses(&mut solver, &clauses);

    let learned: Rc<RefCell<Vec<Vec<Literal>>>> = Rc::default();
    let sink = Rc::clone(&learned);
    solver.set_learn(usize::MAX, move |clause: &[Literal]| {
        sink.borrow_mut().push(clause.to_vec())
    });
    assert_eq!(solver.solve(), Ok(SolveResult::Satisfiable));
    assert!(model_satisfies(&solver, &clauses));

    for clause in learned.borrow().iter() {
        let mut checker = SolverInstance::default();
        add_clauses(&mut checker, &clauses);
        for &literal in clause {
            checker.assume(!literal).unwrap();
        }
        assert_eq!(checker.solve(), Ok(SolveResult::Unsatisfiable));
    }
}

#[test]
fn trail_callback_sees_false_conflicts() {
    let mut solver = SolverInstance::default();
    add_clauses(&mut solver, &pigeonhole(6, 5));

    let num_snapshots = Rc::new(Cell::new(0_u64));
    let counter = Rc::clone(&num_snapshots);
    solver.set_learn_trail(move |snapshot| {
        counter.set(counter.get() + 1);
        assert_eq!(snapshot.conflict().len(), snapshot.is_propagated().len());
        for (literal, _) in snapshot.conflict_with_flags() {
            assert!(snapshot.trail().contains(&!literal));
        }
        // At least one literal of the conflict was propagated at the current level.
        assert!(snapshot.is_propagated().iter().any(|&is_propagated| is_propagated));
    });

    assert_eq!(solver.solve(), Ok(SolveResult::Unsatisfiable));
    assert!(num_snapshots.get() > 0);
    assert!(num_snapshots.get() <= solver.statistics().conflicts);
}
