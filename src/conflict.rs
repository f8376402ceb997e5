//! First-UIP conflict analysis: walks the trail backward from a
//! conflicting reason, resolves antecedents until exactly one literal
//! from the current decision level remains, then minimizes the result.
//! Minimization runs two passes: recursive self-subsumption against
//! each literal's own reason, then (when a [`Stamp`] is supplied)
//! binary-implication-graph domination, redundant stamps first and
//! irredundant second. While walking the resolution
//! chain, any clause-backed reason whose other literals are already
//! `seen` is subsumed by the clause being built and gets strengthened
//! in the database on the spot.

use crate::assign::{AssignStack, PropBy};
use crate::cdb::{ClauseDb, ClauseId};
use crate::drup::Proof;
use crate::processor::cache::ImplicationCache;
use crate::stamp::{Flavor, Stamp};
use crate::types::Lit;

/// Returns `(learnt, backtrack_level)`. `learnt[0]` is always the
/// asserting literal. `cache`/`stamp` are `None` when their respective
/// passes are disabled (`Config::do_cache`/`Config::do_stamp`).
pub fn analyze(
    asg: &mut AssignStack,
    cdb: &mut ClauseDb,
    proof: &mut Proof,
    confl: PropBy,
    cache: Option<&ImplicationCache>,
    stamp: Option<&Stamp>,
) -> (Vec<Lit>, usize) {
    let mut seen = vec![false; asg.var.len()];
    // learnt[0] is a placeholder until the asserting literal is known.
    let mut learnt: Vec<Lit> = vec![Lit::from_int(1)];

    let mut path_c = 0usize;
    let mut reason = confl;
    let mut idx = asg.trail.len();
    let mut p: Option<Lit> = None;
    let cur_level = asg.decision_level();

    loop {
        let antecedent = antecedent_lits(cdb, reason, p);
        if let (PropBy::Clause(cid), Some(skip)) = (reason, p) {
            otf_subsume(cdb, proof, cid, skip, &seen);
        }
        for &q in &antecedent {
            let vi = q.vi();
            if seen[vi] || asg.level(vi) == 0 {
                continue;
            }
            seen[vi] = true;
            if asg.level(vi) == cur_level {
                path_c += 1;
            } else {
                learnt.push(q);
            }
        }

        // Walk backward to the next seen literal on the trail.
        loop {
            idx -= 1;
            if seen[asg.trail[idx].vi()] {
                break;
            }
        }
        let lit = asg.trail[idx];
        seen[lit.vi()] = false;
        path_c -= 1;
        if path_c == 0 {
            p = Some(lit);
            learnt[0] = lit.negate();
            break;
        }
        reason = asg.reason(lit.vi());
        p = Some(lit);
    }

    minimize(asg, cdb, &mut learnt, &seen);
    if let Some(c) = cache {
        cache_shrink(c, &mut learnt);
    }
    if let Some(st) = stamp {
        st.shrink(&mut learnt, Flavor::Red);
        st.shrink(&mut learnt, Flavor::Irred);
    }

    let btlevel = if learnt.len() == 1 {
        0
    } else {
        let mut max_i = 1;
        for i in 2..learnt.len() {
            if asg.level(learnt[i].vi()) > asg.level(learnt[max_i].vi()) {
                max_i = i;
            }
        }
        learnt.swap(1, max_i);
        asg.level(learnt[1].vi())
    };

    (learnt, btlevel)
}

fn antecedent_lits(cdb: &ClauseDb, reason: PropBy, skip: Option<Lit>) -> Vec<Lit> {
    let mut out = match reason {
        PropBy::Null => Vec::new(),
        PropBy::Clause(cid) => cdb[cid].lits.clone(),
        PropBy::Binary { lit, .. } => vec![lit.negate()],
        PropBy::Ternary(a, b) => vec![a.negate(), b.negate()],
    };
    if let Some(s) = skip {
        out.retain(|&l| l != s);
    }
    out
}

/// If `cid`'s literals (other than `skip`) are all already `seen` from
/// earlier in the resolution walk, the clause being built already
/// subsumes `cid`: `cid` can drop `skip` permanently, since whatever
/// forced it is already implied by the rest of its own literals.
fn otf_subsume(cdb: &mut ClauseDb, proof: &mut Proof, cid: ClauseId, skip: Lit, seen: &[bool]) {
    let clause = &cdb[cid];
    if clause.is_removed() || clause.lits.len() <= 2 {
        return;
    }
    if !clause.lits.iter().all(|&l| l == skip || seen[l.vi()]) {
        return;
    }
    let before = clause.lits.clone();
    let shortened: Vec<Lit> = before.iter().copied().filter(|&l| l != skip).collect();
    if shortened.len() == before.len() {
        return;
    }
    proof.add(&shortened);
    proof.delay_delete(before);
    cdb[cid].lits = shortened;
    cdb[cid].update_abstraction();
    proof.commit_delayed();
}

/// A learnt literal is redundant if the implication cache already
/// records it reaching some other literal still in the clause: the
/// same argument as [`crate::stamp::Stamp::shrink`], sourced from the
/// probe-maintained cache instead of a fresh DFS.
fn cache_shrink(cache: &ImplicationCache, learnt: &mut Vec<Lit>) {
    if learnt.len() <= 2 {
        return;
    }
    let keep: Vec<bool> = (0..learnt.len())
        .map(|i| {
            if i == 0 {
                return true;
            }
            let lit = learnt[i];
            !learnt
                .iter()
                .enumerate()
                .any(|(j, &other)| j != i && cache.get(lit).iter().any(|e| e.implied == other))
        })
        .collect();
    let mut i = 0;
    learnt.retain(|_| {
        let k = keep[i];
        i += 1;
        k
    });
}

/// Recursive self-subsumption minimization : a learnt
/// literal is redundant if every literal in its reason is already
/// marked `seen` or is itself recursively redundant. Decision-level-0
/// literals always qualify as already covered.
fn minimize(asg: &AssignStack, cdb: &ClauseDb, learnt: &mut Vec<Lit>, seen: &[bool]) {
    let mut seen = seen.to_vec();
    for &l in learnt.iter() {
        seen[l.vi()] = true;
    }
    let keep: Vec<bool> = learnt
        .iter()
        .enumerate()
        .map(|(i, &l)| i == 0 || !is_redundant(asg, cdb, l, &mut seen))
        .collect();
    let mut i = 0;
    learnt.retain(|_| {
        let k = keep[i];
        i += 1;
        k
    });
}

fn is_redundant(asg: &AssignStack, cdb: &ClauseDb, lit: Lit, seen: &mut [bool]) -> bool {
    match asg.reason(lit.vi()) {
        PropBy::Null => false,
        reason => {
            let ante = antecedent_lits(cdb, reason, Some(lit.negate()));
            ante.iter().all(|&q| {
                let vi = q.vi();
                asg.level(vi) == 0 || seen[vi]
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{CNFDescription, Instantiate};

    #[test]
    fn analysis_of_a_two_variable_conflict_asserts_a_unit() {
        let cnf = CNFDescription {
            num_of_variables: 2,
            ..Default::default()
        };
        let cfg = Config::default();
        let mut asg = AssignStack::instantiate(&cfg, &cnf);
        let mut cdb = ClauseDb::instantiate(&cfg, &cnf);
        let l1 = Lit::from_int(1);
        let l2 = Lit::from_int(2);
        // (l1 v l2), (l1 v -l2): deciding -l1 forces l2 and -l2, conflicting.
        let c1 = cdb.new_clause(vec![l1, l2], false);
        let c2 = cdb.new_clause(vec![l1, l2.negate()], false);
        asg.watches.register_long(l1.negate(), c1, l2, cdb[c1].abstraction);
        asg.watches.register_long(l2.negate(), c1, l1, cdb[c1].abstraction);
        asg.watches
            .register_long(l1.negate(), c2, l2.negate(), cdb[c2].abstraction);
        asg.watches
            .register_long(l2, c2, l1, cdb[c2].abstraction);
        asg.assign_by_decision(l1.negate());
        let confl = asg.propagate(&mut cdb).expect("expected a conflict");
        let mut proof = Proof::disabled();
        let (learnt, btlevel) = analyze(&mut asg, &mut cdb, &mut proof, confl, None, None);
        assert_eq!(btlevel, 0);
        assert_eq!(learnt.len(), 1);
        assert_eq!(learnt[0], l1);
    }

    #[test]
    fn otf_subsume_strengthens_a_clause_once_its_other_literals_are_covered() {
        let cnf = CNFDescription {
            num_of_variables: 3,
            ..Default::default()
        };
        let cfg = Config::default();
        let mut cdb = ClauseDb::instantiate(&cfg, &cnf);
        let mut proof = Proof::disabled();
        let a = Lit::from_int(1);
        let b = Lit::from_int(2);
        let c = Lit::from_int(3);
        let cid = cdb.new_clause(vec![a, b, c], false);
        let mut seen = vec![false; 4];
        seen[b.vi()] = true;
        seen[c.vi()] = true;
        otf_subsume(&mut cdb, &mut proof, cid, a, &seen);
        assert_eq!(cdb[cid].lits, vec![b, c]);
    }

    #[test]
    fn otf_subsume_leaves_a_clause_alone_when_a_literal_is_uncovered() {
        let cnf = CNFDescription {
            num_of_variables: 3,
            ..Default::default()
        };
        let cfg = Config::default();
        let mut cdb = ClauseDb::instantiate(&cfg, &cnf);
        let mut proof = Proof::disabled();
        let a = Lit::from_int(1);
        let b = Lit::from_int(2);
        let c = Lit::from_int(3);
        let cid = cdb.new_clause(vec![a, b, c], false);
        let mut seen = vec![false; 4];
        seen[b.vi()] = true;
        // c is not seen, so the clause isn't proven subsumed.
        otf_subsume(&mut cdb, &mut proof, cid, a, &seen);
        assert_eq!(cdb[cid].lits, vec![a, b, c]);
    }
}
