//! Formula generators shared by the integration tests.
#![allow(
    dead_code,
    reason = "every test binary uses a different subset of the helpers"
)]

use incsat_core::Literal;
use incsat_core::SolverInstance;
use incsat_core::Variable;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

/// Shows the solver's log messages in the output of failing tests.
pub(crate) fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

pub(crate) fn literal(dimacs_code: i32) -> Literal {
    Literal::try_from(dimacs_code).expect("test literals are valid")
}

pub(crate) fn variable(dimacs_index: i32) -> Variable {
    literal(dimacs_index).variable()
}

/// The pigeonhole formula: every pigeon sits in a hole and no two pigeons share a hole. It is
/// unsatisfiable iff there are more pigeons than holes.
pub(crate) fn pigeonhole(num_pigeons: i32, num_holes: i32) -> Vec<Vec<i32>> {
    let sits = |pigeon: i32, hole: i32| pigeon * num_holes + hole + 1;

    let mut clauses: Vec<Vec<i32>> = (0..num_pigeons)
        .map(|pigeon| (0..num_holes).map(|hole| sits(pigeon, hole)).collect())
        .collect();
    for hole in 0..num_holes {
        for first in 0..num_pigeons {
            for second in first + 1..num_pigeons {
                clauses.push(vec![-sits(first, hole), -sits(second, hole)]);
            }
        }
    }
    clauses
}

/// A uniform random formula with clauses of `clause_length` distinct variables.
pub(crate) fn random_formula(
    rng: &mut SmallRng,
    num_variables: i32,
    num_clauses: usize,
    clause_length: usize,
) -> Vec<Vec<i32>> {
    (0..num_clauses)
        .map(|_| {
            let mut clause: Vec<i32> = vec![];
            while clause.len() < clause_length {
                let variable = rng.gen_range(1..=num_variables);
                if clause.iter().all(|code: &i32| code.abs() != variable) {
                    clause.push(if rng.gen_bool(0.5) { variable } else { -variable });
                }
            }
            clause
        })
        .collect()
}

/// A random 3-SAT formula which is satisfied by the assignment making every variable true.
pub(crate) fn planted_formula(
    rng: &mut SmallRng,
    num_variables: i32,
    num_clauses: usize,
) -> Vec<Vec<i32>> {
    let mut clauses = random_formula(rng, num_variables, num_clauses, 3);
    for clause in &mut clauses {
        if clause.iter().all(|&code| code < 0) {
            let position = rng.gen_range(0..clause.len());
            clause[position] = -clause[position];
        }
    }
    clauses
}

pub(crate) fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Streams the clauses into the solver through [`SolverInstance::add`].
pub(crate) fn add_clauses(solver: &mut SolverInstance, clauses: &[Vec<i32>]) {
    for clause in clauses {
        for &code in clause {
            solver.add(code).expect("solver accepts input");
        }
        solver.add(0).expect("solver accepts input");
    }
}

/// Whether the clauses are satisfied by the current model of the solver.
pub(crate) fn model_satisfies(solver: &SolverInstance, clauses: &[Vec<i32>]) -> bool {
    clauses.iter().all(|clause| {
        clause.iter().any(|&code| {
            solver
                .value(literal(code))
                .expect("the solver found a model")
        })
    })
}

/// Decides the formula by enumerating all assignments.
pub(crate) fn brute_force_satisfiable(
    num_variables: i32,
    clauses: &[Vec<i32>],
    assumptions: &[i32],
) -> bool {
    (0..1_u64 << num_variables).any(|assignment| {
        let is_true = |code: i32| {
            let value = assignment & (1 << (code.abs() - 1)) != 0;
            value == (code > 0)
        };
        assumptions.iter().all(|&code| is_true(code))
            && clauses
                .iter()
                .all(|clause| clause.iter().any(|&code| is_true(code)))
    })
}
