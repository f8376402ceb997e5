//! Gate extraction: recognizes an OR-gate pattern `g <-> (a v b v ...)`
//! encoded as the usual Tseitin clauses (`!g v a v b v ...` plus
//! `g v !a`, `g v !b`, ...) and uses it to shorten clauses mentioning
//! the gate output. Restricted to the OR/AND case; the XOR case is
//! handled separately by [`super::xor`].

use crate::cdb::{ClauseDb, ClauseId};
use crate::types::Lit;

#[derive(Clone, Debug)]
pub struct OrGate {
    pub output: Lit,
    pub inputs: Vec<Lit>,
    pub long_clause: ClauseId,
}

/// Scans for the OR-gate pattern anchored on a long clause `(!g v i1 v
/// ... v ik)` whose `k` binaries `(g v !i_j)` are all present.
pub fn find_or_gates(cdb: &ClauseDb, asg_num_vars: usize) -> Vec<OrGate> {
    let mut gates = Vec::new();
    for cid in cdb.iter_ids() {
        let c = &cdb[cid];
        if c.is_removed() || c.lits.len() < 3 {
            continue;
        }
        for &candidate_out in &c.lits {
            let g = candidate_out.negate();
            if g.vi() >= asg_num_vars {
                continue;
            }
            let inputs: Vec<Lit> = c.lits.iter().filter(|&&l| l != candidate_out).copied().collect();
            let all_binaries_present = inputs.iter().all(|&i| has_binary(cdb, g, i.negate()));
            if all_binaries_present && !inputs.is_empty() {
                gates.push(OrGate {
                    output: g.negate(),
                    inputs: inputs.clone(),
                    long_clause: cid,
                });
            }
        }
    }
    gates
}

fn has_binary(cdb: &ClauseDb, a: Lit, b: Lit) -> bool {
    cdb.iter_ids().any(|cid| {
        let c = &cdb[cid];
        !c.is_removed() && c.lits.len() == 2 && c.contains(a) && c.contains(b)
    })
}

/// Uses a discovered gate to rewrite any clause containing both the
/// gate output (negated) and one of its inputs: such a literal pair is
/// redundant since the gate clause already implies the relationship.
/// Returns the number of literals actually dropped.
pub fn simplify_with_gates(cdb: &mut ClauseDb, gates: &[OrGate]) -> usize {
    let mut dropped = 0;
    for gate in gates {
        for cid in cdb.iter_ids().collect::<Vec<_>>() {
            if cid == gate.long_clause || cdb[cid].is_removed() {
                continue;
            }
            if cdb[cid].contains(gate.output.negate()) {
                let before = cdb[cid].lits.len();
                cdb[cid].lits.retain(|&l| !gate.inputs.contains(&l));
                cdb[cid].update_abstraction();
                dropped += before - cdb[cid].lits.len();
            }
        }
    }
    dropped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{CNFDescription, Instantiate};

    #[test]
    fn a_simple_or_gate_is_recognized() {
        let cfg = Config::default();
        let cnf = CNFDescription {
            num_of_variables: 3,
            ..Default::default()
        };
        let mut cdb = ClauseDb::instantiate(&cfg, &cnf);
        let g = Lit::from_int(3);
        let a = Lit::from_int(1);
        let b = Lit::from_int(2);
        cdb.new_clause(vec![g.negate(), a, b], false);
        cdb.new_clause(vec![g, a.negate()], false);
        cdb.new_clause(vec![g, b.negate()], false);
        let gates = find_or_gates(&cdb, 4);
        assert!(gates.iter().any(|gt| gt.output == g));
    }
}
