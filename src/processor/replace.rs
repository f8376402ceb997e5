//! Equivalence-class union-find over literals, maintained by SCC
//! and consumed here. Grounded on CryptoMiniSat's `varreplacer.cpp`:
//! canonical representative is the literal with the smallest variable
//! id, replacement is queued rather than applied eagerly.

use crate::assign::{AssignStack, RemovedState};
use crate::cdb::ClauseDb;
use crate::drup::Proof;
use crate::types::{Lit, MaybeInconsistent, SolverError, VarId};

#[derive(Clone, Debug, Default)]
pub struct VarReplacer {
    /// `table[vi]` is `Some(canonical_lit)` when `vi`'s positive literal
    /// has been mapped to `canonical_lit`; `None` means `vi` is its own
    /// representative.
    table: Vec<Option<Lit>>,
    queue: Vec<(Lit, Lit)>,
}

impl VarReplacer {
    pub fn new(num_vars: usize) -> VarReplacer {
        VarReplacer {
            table: vec![None; num_vars + 1],
            queue: Vec::new(),
        }
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn grow_to(&mut self, vi: VarId) {
        if vi >= self.table.len() {
            self.table.resize(vi + 1, None);
        }
    }

    /// Maps a literal through the replacement chain to its canonical
    /// form, following the chain with path compression deferred to the
    /// next `flush`.
    pub fn canonicalize(&self, mut lit: Lit) -> Lit {
        let mut guard = 0;
        while let Some(rep) = self.table[lit.vi()] {
            lit = if lit.is_negated() { rep.negate() } else { rep };
            guard += 1;
            if guard > self.table.len() {
                break; // cycle guard; should never trigger with sane input
            }
        }
        lit
    }

    /// Queues `a == b` (as literals, so `a == !b` records an
    /// anti-equivalence). The loser is oriented toward the lower-id
    /// canonical representative.
    pub fn queue_equivalence(&mut self, a: Lit, b: Lit) {
        let ca = self.canonicalize(a);
        let cb = self.canonicalize(b);
        if ca.vi() == cb.vi() {
            return; // already unified (consistently or not; caller checks UNSAT)
        }
        if ca.vi() < cb.vi() {
            self.queue.push((cb, if ca.is_negated() == cb.is_negated() { ca } else { ca.negate() }));
        } else {
            self.queue.push((ca, if ca.is_negated() == cb.is_negated() { cb } else { cb.negate() }));
        }
    }

    /// Applies every queued equivalence to the clause database and the
    /// assignment's variable table, returning `Err` if a contradiction
    /// surfaces (e.g. `x == x` and `x == !x` both queued).
    pub fn flush(&mut self, asg: &mut AssignStack, cdb: &mut ClauseDb, proof: &mut Proof) -> MaybeInconsistent {
        let pending = std::mem::take(&mut self.queue);
        for (loser_pos, winner) in pending {
            let loser_vi = loser_pos.vi();
            if self.table[loser_vi].is_some() {
                continue; // already mapped by an earlier entry this round
            }
            self.table[loser_vi] = Some(if loser_pos.is_negated() { winner.negate() } else { winner });
            asg.var[loser_vi].removed = RemovedState::Replaced;
        }

        for cid in cdb.iter_ids().collect::<Vec<_>>() {
            if cdb[cid].is_removed() {
                continue;
            }
            let mut rewritten: Vec<Lit> = cdb[cid].lits.iter().map(|&l| self.canonicalize(l)).collect();
            rewritten.sort_unstable();
            rewritten.dedup();
            if rewritten.windows(2).any(|w| w[0] == w[1].negate()) {
                cdb.mark_removed(cid, proof); // tautology after rewrite
                continue;
            }
            if rewritten.len() != cdb[cid].lits.len() || rewritten != cdb[cid].lits {
                cdb[cid].lits = rewritten;
                cdb[cid].update_abstraction();
                if cdb[cid].lits.is_empty() {
                    return Err(SolverError::Inconsistent);
                }
                if cdb[cid].lits.len() == 1 {
                    asg.assign_at_rootlevel(cdb[cid].lits[0])?;
                    cdb.mark_removed(cid, proof);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_follows_the_chain_to_a_fixed_point() {
        let mut r = VarReplacer::new(4);
        let x1 = Lit::from_int(1);
        let x2 = Lit::from_int(2);
        r.queue_equivalence(x1, x2);
        r.table[2] = Some(x1);
        assert_eq!(r.canonicalize(x2), x1);
        assert_eq!(r.canonicalize(x2.negate()), x1.negate());
    }
}
