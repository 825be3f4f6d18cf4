#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

mod helpers;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use helpers::add_clauses;
use helpers::init_logging;
use helpers::literal;
use helpers::pigeonhole;
use incsat_core::exchange::Portfolio;
use incsat_core::termination::Indefinite;
use incsat_core::Literal;
use incsat_core::SearchLimit;
use incsat_core::SolveResult;
use incsat_core::SolverInstance;
use incsat_core::SolverOptions;

#[test]
fn portfolio_refutes_nine_pigeons_in_eight_holes() {
    init_logging();
    let mut portfolio = Portfolio::new(2, SolverOptions::default());
    for clause in pigeonhole(9, 8) {
        for code in clause {
            portfolio.add(code).unwrap();
        }
        portfolio.add(0).unwrap();
    }
    portfolio.connect(3);

    let result = portfolio.solve(Duration::from_millis(20), Indefinite);
    assert_eq!(result, Ok(SolveResult::Unsatisfiable));
}

#[test]
fn portfolio_finds_models_of_every_instance_formula() {
    let clauses = pigeonhole(7, 7);
    let mut portfolio = Portfolio::new(3, SolverOptions::default());
    for clause in &clauses {
        let literals: Vec<Literal> = clause
            .iter()
            .map(|&code| Literal::try_from(code).unwrap())
            .collect();
        portfolio.add_clause(&literals).unwrap();
    }
    portfolio.connect(2);

    let result = portfolio.solve(Duration::from_millis(5), Indefinite);
    assert_eq!(result, Ok(SolveResult::Satisfiable));
}

#[test]
fn forwarded_clauses_are_present_in_the_sibling() {
    let clauses = pigeonhole(7, 6);
    let first = Rc::new(RefCell::new(SolverInstance::default()));
    let second = Rc::new(RefCell::new(SolverInstance::default()));
    add_clauses(&mut first.borrow_mut(), &clauses);
    add_clauses(&mut second.borrow_mut(), &clauses);

    let forwarded: Rc<RefCell<Vec<Vec<Literal>>>> = Rc::default();
    let sink = Rc::clone(&forwarded);
    let sibling = Rc::downgrade(&second);
    first.borrow_mut().set_learn(8, move |clause: &[Literal]| {
        if let Some(sibling) = sibling.upgrade() {
            sibling
                .borrow_mut()
                .add_clause(clause.iter().copied())
                .unwrap();
            sink.borrow_mut().push(clause.to_vec());
        }
    });

    first.borrow_mut().limit(SearchLimit::Conflicts(500));
    let _ = first.borrow_mut().solve().unwrap();
    assert!(!forwarded.borrow().is_empty());

    // A clause is in the database if assuming it false is refuted without search.
    let mut second = second.borrow_mut();
    for clause in forwarded.borrow().iter() {
        for &literal in clause {
            second.assume(!literal).unwrap();
        }
        second.limit(SearchLimit::Decisions(clause.len() as u64));
        assert_eq!(second.solve(), Ok(SolveResult::Unsatisfiable));
    }
}

#[test]
fn assumptions_hold_in_every_round() {
    let mut portfolio = Portfolio::new(2, SolverOptions::default());
    // The pigeonhole clauses only apply when 100 is true.
    for clause in pigeonhole(9, 8) {
        for code in clause {
            portfolio.add(code).unwrap();
        }
        portfolio.add(-100).unwrap();
        portfolio.add(0).unwrap();
    }
    portfolio.connect(3);

    portfolio.assume(literal(100));
    let result = portfolio.solve(Duration::from_millis(1), Indefinite);
    assert_eq!(result, Ok(SolveResult::Unsatisfiable));

    let winner = portfolio.instance(portfolio.winner().expect("a verdict was reached"));
    assert_eq!(winner.borrow().failed(literal(100)), Ok(true));

    // The assumption only held for the previous call.
    let result = portfolio.solve(Duration::from_millis(1), Indefinite);
    assert_eq!(result, Ok(SolveResult::Satisfiable));
    let winner = portfolio.instance(portfolio.winner().expect("a verdict was reached"));
    assert_eq!(winner.borrow().value(literal(100)), Ok(false));
}
