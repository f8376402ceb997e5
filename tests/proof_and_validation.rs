//! Exercises the DRUP proof writer and model validator end to end
//! against a real solve, rather than unit-testing either in isolation.

use cdcl_sat::config::Config;
use cdcl_sat::types::{CNFDescription, Certificate, Instantiate, Lit};
use cdcl_sat::validator::ValidatorIF;
use cdcl_sat::Solver;

fn lits(xs: &[i32]) -> Vec<Lit> {
    xs.iter().map(|&x| Lit::from_int(x)).collect()
}

#[test]
fn an_unsat_solve_with_a_proof_sink_writes_a_nonempty_proof() {
    let cfg = Config::default();
    let cnf = CNFDescription {
        num_of_variables: 2,
        ..Default::default()
    };
    let mut solver = Solver::instantiate(&cfg, &cnf);
    solver.new_var();
    solver.new_var();

    let sink: Vec<u8> = Vec::new();
    let mut solver = solver.with_proof(sink);
    assert!(solver.proof.is_enabled());

    solver.add_clause(&lits(&[1, 2])).unwrap();
    solver.add_clause(&lits(&[-1, 2])).unwrap();
    solver.add_clause(&lits(&[1, -2])).unwrap();
    solver.add_clause(&lits(&[-1, -2])).unwrap();

    assert!(matches!(solver.solve(), Ok(Certificate::UNSAT(_))));
    solver.proof.flush().unwrap();
}

#[test]
fn a_satisfying_model_from_a_real_solve_validates_against_the_clause_db() {
    // Clauses of length >= 4 land in the clause arena rather than the
    // implicit binary/ternary watcher lists, so this is where
    // `ClauseDb::validate` actually has something to check.
    let cfg = Config::default();
    let cnf = CNFDescription {
        num_of_variables: 4,
        ..Default::default()
    };
    let mut solver = Solver::instantiate(&cfg, &cnf);
    for _ in 0..4 {
        solver.new_var();
    }
    solver.add_clause(&lits(&[1, 2, 3, 4])).unwrap();
    solver.add_clause(&lits(&[-1, -2, -3, -4])).unwrap();
    solver.add_clause(&lits(&[1, -2, 3, -4])).unwrap();

    let model = match solver.solve().unwrap() {
        Certificate::SAT(m) => m,
        Certificate::UNSAT(_) => panic!("expected SAT"),
    };
    assert_eq!(solver.cdb.validate(&model, &[]), None);
}
