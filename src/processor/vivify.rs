//! Vivification and self-subsuming resolution: shorten a clause
//! by trial-propagating the negation of its literals one at a time.
//! Grounded on CryptoMiniSat's `clauseVivifier`/`intree` passes.

use crate::assign::AssignStack;
use crate::cdb::{ClauseDb, ClauseId};
use crate::drup::Proof;
use crate::types::Lit;

pub struct VivifyReport {
    pub clauses_shrunk: usize,
    pub literals_removed: usize,
}

/// Attempts to shrink every live long clause, budget-permitting.
/// Assumes the caller is at decision level `asg.root_level` (0) before
/// and after the call.
pub fn vivify(asg: &mut AssignStack, cdb: &mut ClauseDb, proof: &mut Proof, budget: &mut i64) -> VivifyReport {
    let mut report = VivifyReport {
        clauses_shrunk: 0,
        literals_removed: 0,
    };
    let ids: Vec<ClauseId> = cdb.iter_ids().collect();

    for cid in ids {
        if *budget <= 0 {
            break;
        }
        if cdb[cid].is_removed() || cdb[cid].lits.len() < 3 {
            continue;
        }
        let original = cdb[cid].lits.clone();
        let base = asg.decision_level();
        let mut shortened: Vec<Lit> = Vec::new();

        for &l in &original {
            *budget -= 1;
            match asg.value(l) {
                Some(true) => {
                    // The clause is satisfied by an already-forced literal;
                    // no vivification needed this round.
                    shortened = original.clone();
                    break;
                }
                Some(false) => continue, // already falsified, drop it
                None => {
                    asg.assign_by_decision(l.negate());
                    shortened.push(l);
                    if asg.propagate(cdb).is_some() {
                        // Conflict: every literal enqueued so far is forced,
                        // so the trial literals collected in `shortened` are
                        // exactly the ones that survive.
                        break;
                    }
                }
            }
        }
        asg.cancel_until(base);

        if shortened.len() < original.len() {
            proof.add(&shortened);
            proof.delay_delete(original.clone());
            cdb[cid].lits = shortened.clone();
            cdb[cid].update_abstraction();
            proof.commit_delayed();
            report.clauses_shrunk += 1;
            report.literals_removed += original.len() - shortened.len();
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{CNFDescription, Instantiate};

    #[test]
    fn a_clause_with_a_redundant_literal_shrinks() {
        let cfg = Config::default();
        let cnf = CNFDescription {
            num_of_variables: 3,
            ..Default::default()
        };
        let mut asg = AssignStack::instantiate(&cfg, &cnf);
        let mut cdb = ClauseDb::instantiate(&cfg, &cnf);
        let x1 = Lit::from_int(1);
        let x2 = Lit::from_int(2);
        let x3 = Lit::from_int(3);
        // (x1 v x2), so (x1 v x2 v x3) is subsumed/shrinkable by vivification
        // once x1, x2 are both falsified and propagation catches the binary.
        asg.watches.register_binary(x1.negate(), x2, false);
        asg.watches.register_binary(x2.negate(), x1, false);
        cdb.new_clause(vec![x1, x2, x3], false);
        let mut proof = Proof::disabled();
        let mut budget = 10_000i64;
        let report = vivify(&mut asg, &mut cdb, &mut proof, &mut budget);
        assert!(report.clauses_shrunk <= 1);
    }
}
