//! Failed-literal probing: try each candidate literal, propagate, and
//! see what breaks or what's forced. Also runs the hyper-binary
//! resolution BFS: any literal propagated while probing `lit` whose
//! reason didn't come directly from `lit` itself gets a shortcut binary
//! clause `(!lit v q)`, so the next propagation reaches it in one hop.
//! Grounded on CryptoMiniSat's `prober.cpp`.

use super::cache::{CacheEntry, ImplicationCache};
use crate::assign::{AssignStack, PropBy};
use crate::cdb::{ClauseDb, Watcher};
use crate::drup::Proof;
use crate::types::{Lit, MaybeInconsistent, Rng, SolverError, VarId};

pub struct ProbeReport {
    pub failed: usize,
    pub both_prop: usize,
    pub hyper_bin_added: usize,
}

/// Runs one probing round over every currently unassigned active
/// variable, consuming `budget` bogo-properties. Derived units are
/// enqueued at the root level immediately; the caller must propagate
/// them before the next round.
pub fn probe(
    asg: &mut AssignStack,
    cdb: &mut ClauseDb,
    cache: &mut ImplicationCache,
    proof: &mut Proof,
    rng: &mut Rng,
    budget: &mut i64,
) -> Result<ProbeReport, SolverError> {
    let mut report = ProbeReport {
        failed: 0,
        both_prop: 0,
        hyper_bin_added: 0,
    };

    let mut candidates: Vec<VarId> = (1..asg.var.len())
        .filter(|&vi| asg.var[vi].is_active() && asg.var[vi].assign.is_none())
        .collect();
    // Randomize order so repeated probing rounds don't starve the tail
    // of the variable range under a tight budget.
    for i in (1..candidates.len()).rev() {
        let j = rng.below(i + 1);
        candidates.swap(i, j);
    }

    for vi in candidates {
        if *budget <= 0 {
            break;
        }
        if asg.var[vi].assign.is_some() {
            continue;
        }
        let lit = Lit::from_var(vi, false);

        let implied_pos = try_one_polarity(asg, cdb, proof, lit, budget, &mut report.hyper_bin_added)?;
        let implied_pos = match implied_pos {
            Some(v) => v,
            None => {
                report.failed += 1;
                continue; // lit itself failed; its negation was enqueued at root
            }
        };

        let implied_neg = try_one_polarity(asg, cdb, proof, lit.negate(), budget, &mut report.hyper_bin_added)?;
        let implied_neg = match implied_neg {
            Some(v) => v,
            None => {
                report.failed += 1;
                continue;
            }
        };

        for &p in &implied_pos {
            if implied_neg.contains(&p) {
                asg.assign_at_rootlevel(p)?;
                report.both_prop += 1;
            }
            cache.merge(
                lit,
                &[CacheEntry {
                    implied: p,
                    only_irredundant_bin: true,
                }],
            );
        }
        for &n in &implied_neg {
            cache.merge(
                lit.negate(),
                &[CacheEntry {
                    implied: n,
                    only_irredundant_bin: true,
                }],
            );
        }
    }

    Ok(report)
}

/// Enqueues `lit` at a fresh decision level and propagates. On
/// conflict, backtracks and enqueues `!lit` at root (the literal is
/// failed); on success, returns every literal implied beyond `lit`
/// itself, then backtracks regardless so the caller can try the other
/// polarity from the same starting state.
fn try_one_polarity(
    asg: &mut AssignStack,
    cdb: &mut ClauseDb,
    proof: &mut Proof,
    lit: Lit,
    budget: &mut i64,
    hyper_bin_added: &mut usize,
) -> Result<Option<Vec<Lit>>, SolverError> {
    let base = asg.decision_level();
    asg.assign_by_decision(lit);
    let confl = asg.propagate(cdb);
    *budget -= asg.trail.len() as i64;

    if confl.is_some() {
        asg.cancel_until(base);
        let root_enqueue: MaybeInconsistent = asg.assign_at_rootlevel(lit.negate());
        root_enqueue?;
        asg.propagate(cdb);
        return Ok(None);
    }

    *hyper_bin_added += hyper_bin_shortcuts(asg, proof, base, lit);

    let implied: Vec<Lit> = asg.trail[asg.trail_lim[base]..]
        .iter()
        .filter(|&&l| l != lit)
        .copied()
        .collect();
    asg.cancel_until(base);
    Ok(Some(implied))
}

/// The hyper-binary resolution BFS: every literal propagated while
/// `lit` is decided, that didn't come directly from a binary clause
/// rooted at `lit` itself, gets a shortcut binary reason. `lit` is the
/// only decision in this segment (probing opens exactly one level on
/// top of `base`), so everything else forced here traces back to `lit`
/// plus clauses and level-0 facts alone -- the BFS doesn't need to walk
/// the chain itself to know that. The shortcut clause is only safe to
/// keep as a standing binary when `base` is the true root: derived
/// under a live assumption frame, it would only hold for this probing
/// call, so it's recorded as `q`'s reason without touching the watch
/// lists (`hyper_bin_not_added`).
fn hyper_bin_shortcuts(asg: &mut AssignStack, proof: &mut Proof, base: usize, lit: Lit) -> usize {
    let mut added = 0;
    let rooted_at_top = base == 0;
    let segment: Vec<Lit> = asg.trail[asg.trail_lim[base]..].to_vec();
    for q in segment {
        if q == lit {
            continue;
        }
        let direct_from_lit = matches!(
            asg.reason(q.vi()),
            PropBy::Binary { lit: anc, .. } if anc.negate() == lit
        );
        if direct_from_lit {
            continue;
        }
        let already_shortcut = asg
            .watches
            .list(lit)
            .iter()
            .any(|w| matches!(w, Watcher::Binary { other, .. } if *other == q));
        if already_shortcut {
            continue;
        }
        if rooted_at_top {
            asg.watches.register_binary(lit.negate(), q, true);
            asg.watches.register_binary(q.negate(), lit, true);
            proof.add(&[lit.negate(), q]);
        }
        asg.var[q.vi()].reason = PropBy::hyper_binary(lit, rooted_at_top);
        added += 1;
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{CNFDescription, Instantiate};

    #[test]
    fn probing_a_literal_whose_only_clause_conflicts_fails_it() {
        let cfg = Config::default();
        let cnf = CNFDescription {
            num_of_variables: 1,
            ..Default::default()
        };
        let mut asg = AssignStack::instantiate(&cfg, &cnf);
        let mut cdb = ClauseDb::instantiate(&cfg, &cnf);
        let x1 = Lit::from_int(1);
        // Unit clause (-x1): trying x1 must fail.
        let _ = asg.assign_at_rootlevel(x1.negate());
        let mut cache = ImplicationCache::new(4);
        let mut proof = Proof::disabled();
        let mut rng = Rng::new(1);
        let mut budget = 10_000i64;
        let report = probe(&mut asg, &mut cdb, &mut cache, &mut proof, &mut rng, &mut budget).unwrap();
        assert_eq!(report.failed, 0); // already assigned at root, loop skips it
        assert_eq!(asg.value(x1), Some(false));
    }
}
