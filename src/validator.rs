//! Independent model checker, used by tests and by the CLI's
//! `--validate` path: re-checks every clause against a candidate
//! assignment without touching any solver-internal state.

use crate::cdb::ClauseDb;
use crate::types::Lit;

pub trait ValidatorIF {
    fn validate(&self, model: &[bool], extra_binaries: &[(Lit, Lit)]) -> Option<Vec<Lit>>;
}

impl ValidatorIF for ClauseDb {
    /// Returns `None` if every clause is satisfied, or `Some(violated)`
    /// naming the first unsatisfied clause's literals.
    fn validate(&self, model: &[bool], extra_binaries: &[(Lit, Lit)]) -> Option<Vec<Lit>> {
        let satisfies = |lits: &[Lit]| {
            lits.iter().any(|&l| {
                let v = model[l.vi()];
                v != l.is_negated()
            })
        };
        for cid in self.iter_ids() {
            let c = &self[cid];
            if c.is_removed() {
                continue;
            }
            if !satisfies(&c.lits) {
                return Some(c.lits.clone());
            }
        }
        for &(a, b) in extra_binaries {
            if !satisfies(&[a, b]) {
                return Some(vec![a, b]);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{CNFDescription, Instantiate};

    #[test]
    fn a_satisfying_model_validates_clean() {
        let cfg = Config::default();
        let cnf = CNFDescription {
            num_of_variables: 2,
            ..Default::default()
        };
        let mut cdb = ClauseDb::instantiate(&cfg, &cnf);
        cdb.new_clause(vec![Lit::from_int(1), Lit::from_int(2)], false);
        let model = vec![false, true, false];
        assert!(cdb.validate(&model, &[]).is_none());
    }

    #[test]
    fn a_violated_clause_is_reported() {
        let cfg = Config::default();
        let cnf = CNFDescription {
            num_of_variables: 2,
            ..Default::default()
        };
        let mut cdb = ClauseDb::instantiate(&cfg, &cnf);
        cdb.new_clause(vec![Lit::from_int(1), Lit::from_int(2)], false);
        let model = vec![false, false, false];
        assert!(cdb.validate(&model, &[]).is_some());
    }
}
