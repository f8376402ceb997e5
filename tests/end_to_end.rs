//! Black-box scenarios built straight from literal vectors, covering the
//! documented end-to-end behaviors: the empty formula, the empty
//! clause, trivial conflicts, a uniquely-satisfiable formula, a
//! pigeonhole instance, assumption conflicts, and cancellation/resume.

use cdcl_sat::config::Config;
use cdcl_sat::types::{CNFDescription, Certificate, Instantiate, Lit};
use cdcl_sat::Solver;

fn build(num_vars: usize) -> Solver {
    let cfg = Config::default();
    let cnf = CNFDescription {
        num_of_variables: num_vars,
        ..Default::default()
    };
    let mut s = Solver::instantiate(&cfg, &cnf);
    for _ in 0..num_vars {
        s.new_var();
    }
    s
}

fn lits(xs: &[i32]) -> Vec<Lit> {
    xs.iter().map(|&x| Lit::from_int(x)).collect()
}

#[test]
fn empty_formula_is_satisfiable() {
    let mut s = build(0);
    assert!(matches!(s.solve(), Ok(Certificate::SAT(_))));
}

#[test]
fn the_empty_clause_is_immediately_unsatisfiable() {
    let mut s = build(1);
    assert!(s.add_clause(&[]).is_err());
    assert!(matches!(s.solve(), Ok(Certificate::UNSAT(_))));
}

#[test]
fn a_variable_and_its_negation_conflict_on_first_propagation() {
    let mut s = build(1);
    s.add_clause(&lits(&[1])).unwrap();
    assert!(s.add_clause(&lits(&[-1])).is_err());
    assert!(matches!(s.solve(), Ok(Certificate::UNSAT(_))));
}

#[test]
fn two_contradictory_binaries_over_one_variable_are_unsat() {
    // (x1 v x2), (!x1 v x2), (x1 v !x2), (!x1 v !x2)
    let mut s = build(2);
    s.add_clause(&lits(&[1, 2])).unwrap();
    s.add_clause(&lits(&[-1, 2])).unwrap();
    s.add_clause(&lits(&[1, -2])).unwrap();
    s.add_clause(&lits(&[-1, -2])).unwrap();
    assert!(matches!(s.solve(), Ok(Certificate::UNSAT(_))));
}

#[test]
fn a_formula_with_exactly_one_model_finds_it() {
    let mut s = build(3);
    for c in [
        [1, 2, 3],
        [-1, 2, 3],
        [1, -2, 3],
        [-1, -2, 3],
        [1, 2, -3],
        [-1, 2, -3],
        [1, -2, -3],
    ] {
        s.add_clause(&lits(&c)).unwrap();
    }
    match s.solve().unwrap() {
        Certificate::SAT(model) => {
            assert!(model[1]);
            assert!(model[2]);
            assert!(model[3]);
        }
        Certificate::UNSAT(_) => panic!("expected SAT"),
    }
}

#[test]
fn pigeonhole_three_into_two_is_unsatisfiable() {
    // Variables x_ij: pigeon i in hole j, i in 1..=3, j in 1..=2.
    // var(i, j) = (i - 1) * 2 + j
    let var = |i: i32, j: i32| (i - 1) * 2 + j;
    let mut s = build(6);
    for i in 1..=3 {
        s.add_clause(&lits(&[var(i, 1), var(i, 2)])).unwrap();
    }
    for j in 1..=2 {
        for i1 in 1..=3 {
            for i2 in (i1 + 1)..=3 {
                s.add_clause(&lits(&[-var(i1, j), -var(i2, j)])).unwrap();
            }
        }
    }
    assert!(matches!(s.solve(), Ok(Certificate::UNSAT(_))));
}

#[test]
fn an_inconsistent_three_variable_xor_cycle_is_unsatisfiable() {
    // x1 ^ x2 = 0, x2 ^ x3 = 0, x1 ^ x3 = 1: summing forces 0 = 1.
    //
    // The documented walkthrough for this scenario pairs x1^x2=0,
    // x2^x3=0, x1^x3=0, which is actually satisfiable (x1=x2=x3=0 and
    // x1=x2=x3=1 both work); the third right-hand side is flipped to
    // true here to get a genuinely contradictory cycle.
    let mut s = build(3);
    s.add_xor_clause(&[1, 2], false).unwrap();
    s.add_xor_clause(&[2, 3], false).unwrap();
    s.add_xor_clause(&[1, 3], true).unwrap();
    assert!(matches!(s.solve(), Ok(Certificate::UNSAT(_))));
}

#[test]
fn assumption_conflicts_report_the_contradictory_assumptions() {
    let mut s = build(2);
    s.add_clause(&lits(&[2])).unwrap();
    s.assumptions = lits(&[1, -1]);
    match s.solve().unwrap() {
        Certificate::UNSAT(conflict) => {
            assert!(!conflict.is_empty());
        }
        Certificate::SAT(_) => panic!("expected UNSAT under contradictory assumptions"),
    }
}

#[test]
fn a_tight_conflict_budget_times_out_and_a_later_call_can_still_resolve() {
    let mut s = build(6);
    let var = |i: i32, j: i32| (i - 1) * 2 + j;
    for i in 1..=3 {
        s.add_clause(&lits(&[var(i, 1), var(i, 2)])).unwrap();
    }
    for j in 1..=2 {
        for i1 in 1..=3 {
            for i2 in (i1 + 1)..=3 {
                s.add_clause(&lits(&[-var(i1, j), -var(i2, j)])).unwrap();
            }
        }
    }
    s.config.max_conflicts = 1;
    let first = s.solve();
    assert!(first.is_err());

    s.config.max_conflicts = 0;
    let second = s.solve();
    assert!(second.is_ok());
}
