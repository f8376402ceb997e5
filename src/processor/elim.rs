//! Occurrence-based simplifier: subsumption, self-subsuming resolution,
//! bounded variable elimination, and blocked-clause elimination, all
//! driven off the same per-literal occurrence lists over the
//! `ClauseId`-indexed arena.

use crate::assign::{AssignStack, RemovedState};
use crate::cdb::{ClauseDb, ClauseId};
use crate::drup::Proof;
use crate::types::{Lit, VarId};

/// A fact recorded so a satisfying assignment over the *reduced* formula
/// can be extended back to the original variable set. Eliminated
/// variables replay their clauses in reverse order; each entry is one
/// clause that was removed together with the pivot literal that must be
/// satisfied when that clause isn't otherwise.
#[derive(Clone, Debug)]
pub enum ExtensionFact {
    /// Variable `vi` was blocked-clause-eliminated on `blocking_lit`;
    /// if nothing else forces a value, set it so `blocking_lit` holds.
    Eliminated { vi: VarId, clauses: Vec<Vec<Lit>> },
}

#[derive(Clone, Debug, Default)]
pub struct Occurrences {
    lists: Vec<Vec<ClauseId>>,
}

impl Occurrences {
    pub fn build(cdb: &ClauseDb, num_lits: usize) -> Occurrences {
        let mut lists = vec![Vec::new(); num_lits];
        for cid in cdb.iter_ids() {
            if cdb[cid].is_removed() {
                continue;
            }
            for &l in &cdb[cid].lits {
                lists[l.as_usize()].push(cid);
            }
        }
        Occurrences { lists }
    }

    pub fn of(&self, lit: Lit) -> &[ClauseId] {
        &self.lists[lit.as_usize()]
    }

    fn remove(&mut self, lit: Lit, cid: ClauseId) {
        if let Some(pos) = self.lists[lit.as_usize()].iter().position(|&c| c == cid) {
            self.lists[lit.as_usize()].swap_remove(pos);
        }
    }

    fn add(&mut self, lit: Lit, cid: ClauseId) {
        self.lists[lit.as_usize()].push(cid);
    }
}

pub struct Eliminator {
    pub extension: Vec<ExtensionFact>,
}

impl Eliminator {
    pub fn new() -> Eliminator {
        Eliminator {
            extension: Vec::new(),
        }
    }

    /// Subsumption + self-subsuming resolution over every pair of
    /// clauses sharing a literal, using the occurrence lists to avoid an
    /// all-pairs scan. Returns the number of clauses removed/shrunk.
    pub fn subsume(
        &mut self,
        cdb: &mut ClauseDb,
        occ: &mut Occurrences,
        proof: &mut Proof,
        budget: &mut i64,
    ) -> usize {
        let mut touched = 0;
        let ids: Vec<ClauseId> = cdb.iter_ids().collect();

        for cid in ids {
            if *budget <= 0 {
                break;
            }
            if cdb[cid].is_removed() {
                continue;
            }
            let lits = cdb[cid].lits.clone();
            let shortest_lit = match lits.iter().min_by_key(|&&l| occ.of(l).len()) {
                Some(&l) => l,
                None => continue,
            };
            let candidates: Vec<ClauseId> = occ.of(shortest_lit).to_vec();

            for other in candidates {
                *budget -= 1;
                if other == cid || cdb[other].is_removed() {
                    continue;
                }
                if cdb[other].lits.len() < cdb[cid].lits.len() {
                    continue; // subsumption only removes the longer clause
                }
                if cdb[cid].abstraction & !cdb[other].abstraction != 0 {
                    continue; // cheap abstraction rejection
                }
                if cdb[cid].subset_of(&cdb[other]) {
                    for &l in &cdb[other].lits.clone() {
                        occ.remove(l, other);
                    }
                    cdb.mark_removed(other, proof);
                    touched += 1;
                    continue;
                }
                // Self-subsuming resolution: subset once one literal is flipped.
                if let Some(flip) = lits.iter().find(|&&l| {
                    let mut tmp = cdb[cid].lits.clone();
                    if let Some(p) = tmp.iter().position(|&x| x == l) {
                        tmp[p] = l.negate();
                    }
                    tmp.iter().all(|t| cdb[other].contains(*t) || *t == l.negate())
                }) {
                    if cdb[other].contains(flip.negate()) {
                        let before = cdb[other].lits.clone();
                        proof.delay_delete(before);
                        occ.remove(*flip, other);
                        cdb[other].lits.retain(|&x| x != flip.negate());
                        cdb[other].update_abstraction();
                        proof.add(&cdb[other].lits.clone());
                        proof.commit_delayed();
                        touched += 1;
                    }
                }
            }
        }
        touched
    }

    /// Bounded variable elimination: for a candidate variable,
    /// compute every resolvent over it; eliminate only if the blowup is
    /// acceptable. Tautological resolvents are dropped without counting.
    pub fn try_eliminate_var(
        &mut self,
        vi: VarId,
        asg: &mut AssignStack,
        cdb: &mut ClauseDb,
        occ: &mut Occurrences,
        proof: &mut Proof,
        growth_limit: usize,
    ) -> bool {
        let pos = Lit::from_var(vi, false);
        let neg = Lit::from_var(vi, true);
        let pos_clauses: Vec<ClauseId> = occ.of(pos).to_vec();
        let neg_clauses: Vec<ClauseId> = occ.of(neg).to_vec();
        if pos_clauses.is_empty() || neg_clauses.is_empty() {
            return false;
        }

        let mut resolvents: Vec<Vec<Lit>> = Vec::new();
        for &pc in &pos_clauses {
            for &nc in &neg_clauses {
                if let Some(resolvent) = resolve(cdb, pc, nc, vi) {
                    resolvents.push(resolvent);
                }
            }
        }

        if resolvents.len() > pos_clauses.len() + neg_clauses.len() + growth_limit {
            return false;
        }

        let mut removed_clauses = Vec::new();
        for &cid in pos_clauses.iter().chain(neg_clauses.iter()) {
            removed_clauses.push(cdb[cid].lits.clone());
            for &l in &cdb[cid].lits.clone() {
                occ.remove(l, cid);
            }
            cdb.mark_removed(cid, proof);
        }

        for resolvent in resolvents {
            if resolvent.is_empty() {
                continue;
            }
            let cid = cdb.new_clause(resolvent.clone(), false);
            for &l in &resolvent {
                occ.add(l, cid);
            }
            proof.add(&resolvent);
        }

        asg.var[vi].removed = RemovedState::Eliminated;
        self.extension.push(ExtensionFact::Eliminated {
            vi,
            clauses: removed_clauses,
        });
        true
    }

    /// Blocked-clause elimination: `C` is blocked on `l in C` if every
    /// resolvent of `C` with a clause containing `!l` is tautological.
    pub fn try_blocked_clause(
        &mut self,
        cid: ClauseId,
        cdb: &mut ClauseDb,
        occ: &mut Occurrences,
        proof: &mut Proof,
    ) -> bool {
        let lits = cdb[cid].lits.clone();
        for &l in &lits {
            let partners: Vec<ClauseId> = occ.of(l.negate()).to_vec();
            let blocked = partners.iter().all(|&other| resolve(cdb, cid, other, l.vi()).is_none());
            if blocked {
                for &x in &lits {
                    occ.remove(x, cid);
                }
                cdb.mark_removed(cid, proof);
                self.extension.push(ExtensionFact::Eliminated {
                    vi: l.vi(),
                    clauses: vec![lits],
                });
                return true;
            }
        }
        false
    }

    /// Solution extension: replays elimination facts in reverse
    /// order, forcing each pivot variable to satisfy at least one of its
    /// removed clauses.
    pub fn extend_model(&self, model: &mut [bool]) {
        for fact in self.extension.iter().rev() {
            match fact {
                ExtensionFact::Eliminated { vi, clauses } => {
                    let satisfied = clauses.iter().all(|c| {
                        c.iter().any(|&l| {
                            if l.vi() == *vi {
                                false
                            } else {
                                model[l.vi()] != l.is_negated()
                            }
                        })
                    });
                    if satisfied {
                        // Any value works; keep the current default (false).
                        continue;
                    }
                    // Find a value for vi that satisfies every clause that needs it.
                    for candidate in [false, true] {
                        model[*vi] = candidate;
                        let ok = clauses.iter().all(|c| {
                            c.iter().any(|&l| model[l.vi()] != l.is_negated())
                        });
                        if ok {
                            break;
                        }
                    }
                }
            }
        }
    }
}

/// Computes the resolvent of two clauses over `pivot`, or `None` if it's
/// tautological (both polarities of some other variable present).
fn resolve(cdb: &ClauseDb, a: ClauseId, b: ClauseId, pivot: VarId) -> Option<Vec<Lit>> {
    let mut out: Vec<Lit> = cdb[a]
        .lits
        .iter()
        .chain(cdb[b].lits.iter())
        .filter(|&&l| l.vi() != pivot)
        .copied()
        .collect();
    out.sort_unstable();
    out.dedup();
    if out.windows(2).any(|w| w[0].vi() == w[1].vi()) {
        return None; // opposite polarities of some shared variable: tautology
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{CNFDescription, Instantiate};

    #[test]
    fn a_duplicated_clause_is_subsumed_away() {
        let cfg = Config::default();
        let cnf = CNFDescription {
            num_of_variables: 3,
            ..Default::default()
        };
        let mut cdb = ClauseDb::instantiate(&cfg, &cnf);
        let x1 = Lit::from_int(1);
        let x2 = Lit::from_int(2);
        let x3 = Lit::from_int(3);
        cdb.new_clause(vec![x1, x2], false);
        cdb.new_clause(vec![x1, x2, x3], false);
        let mut occ = Occurrences::build(&cdb, 2 * (cnf.num_of_variables + 1));
        let mut proof = Proof::disabled();
        let mut elim = Eliminator::new();
        let mut budget = 10_000i64;
        let touched = elim.subsume(&mut cdb, &mut occ, &mut proof, &mut budget);
        assert_eq!(touched, 1);
    }
}
