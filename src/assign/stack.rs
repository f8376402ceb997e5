//! The trail, decision-level bookkeeping, and the two-watched-literal
//! propagation loop.

use super::{PropBy, Var};
use crate::cdb::{ClauseDb, WatchStore, Watcher};
use crate::config::Config;
use crate::types::{CNFDescription, Instantiate, Lit, MaybeInconsistent, SolverError, VarId};

/// The assignment trail plus everything needed to propagate and
/// backtrack: per-variable state, the decision-level boundaries, and the
/// watch store (owned here because propagation is the only thing that
/// mutates it on the hot path).
#[derive(Clone, Debug)]
pub struct AssignStack {
    pub var: Vec<Var>,
    pub trail: Vec<Lit>,
    pub trail_lim: Vec<usize>,
    pub q_head: usize,
    pub root_level: usize,
    pub num_vars: usize,
    pub num_solved_vars: usize,
    pub num_eliminated_vars: usize,
    pub conflicts: u64,
    pub watches: WatchStore,
}

impl Instantiate for AssignStack {
    fn instantiate(_config: &Config, cnf: &CNFDescription) -> AssignStack {
        let n = cnf.num_of_variables;
        AssignStack {
            var: vec![Var::default(); n + 1],
            trail: Vec::with_capacity(n),
            trail_lim: Vec::new(),
            q_head: 0,
            root_level: 0,
            num_vars: n,
            num_solved_vars: 0,
            num_eliminated_vars: 0,
            conflicts: 0,
            watches: WatchStore::new(n),
        }
    }
}

impl AssignStack {
    pub fn grow_to(&mut self, vi: VarId) {
        if vi >= self.var.len() {
            self.var.resize(vi + 1, Var::default());
            self.watches.grow_to(vi);
            self.num_vars = self.num_vars.max(vi);
        }
    }

    #[inline]
    pub fn value(&self, lit: Lit) -> Option<bool> {
        self.var[lit.vi()].assign.map(|v| v ^ lit.is_negated())
    }

    #[inline]
    pub fn assigned(&self, lit: Lit) -> Option<bool> {
        self.value(lit)
    }

    #[inline]
    pub fn decision_level(&self) -> usize {
        self.trail_lim.len()
    }

    #[inline]
    pub fn level(&self, vi: VarId) -> usize {
        self.var[vi].level
    }

    #[inline]
    pub fn reason(&self, vi: VarId) -> PropBy {
        self.var[vi].reason
    }

    pub fn len(&self) -> usize {
        self.trail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    /// Opens a new decision level without assigning anything; used for
    /// assumptions already satisfied and for probing scaffolding.
    pub fn new_decision_level(&mut self) {
        self.trail_lim.push(self.trail.len());
    }

    fn enqueue(&mut self, lit: Lit, reason: PropBy) {
        let vi = lit.vi();
        self.var[vi].assign = Some(!lit.is_negated());
        self.var[vi].level = self.decision_level();
        self.var[vi].reason = reason;
        self.trail.push(lit);
    }

    /// Assigns `lit` as a decision: opens a fresh level first.
    pub fn assign_by_decision(&mut self, lit: Lit) {
        self.new_decision_level();
        self.var[lit.vi()].is_decision = true;
        self.enqueue(lit, PropBy::Null);
    }

    /// Assigns `lit` due to propagation from `reason`.
    pub fn assign_by_implication(&mut self, lit: Lit, reason: PropBy) {
        self.enqueue(lit, reason);
    }

    /// Assigns `lit` at the root level (level 0), failing if it
    /// contradicts the current value -- the only way a root-level
    /// operation can fail.
    pub fn assign_at_rootlevel(&mut self, lit: Lit) -> MaybeInconsistent {
        match self.value(lit) {
            Some(true) => Ok(()),
            Some(false) => Err(SolverError::Inconsistent),
            None => {
                debug_assert_eq!(self.decision_level(), self.root_level);
                self.enqueue(lit, PropBy::Null);
                Ok(())
            }
        }
    }

    /// Backtracks to `level`, clearing assignments above it and resetting
    /// `q_head` so propagation resumes from the truncated trail.
    pub fn cancel_until(&mut self, level: usize) {
        if self.decision_level() <= level {
            return;
        }
        let lim = self.trail_lim[level];
        for lit in self.trail.drain(lim..) {
            let vi = lit.vi();
            self.var[vi].assign = None;
            self.var[vi].reason = PropBy::Null;
            self.var[vi].is_decision = false;
        }
        self.trail_lim.truncate(level);
        self.q_head = self.q_head.min(self.trail.len());
    }

    /// Two-watched-literal propagation. Returns `None` when a
    /// fixed point is reached (`q_head == trail.len()`), or `Some(cid)`
    /// naming the clause (or `ClauseId::NULL` for a binary/ternary
    /// conflict, with the conflicting literals left recoverable from the
    /// caller's own antecedent tracking) that conflicted.
    pub fn propagate(&mut self, cdb: &mut ClauseDb) -> Option<PropBy> {
        while self.q_head < self.trail.len() {
            let p = self.trail[self.q_head];
            self.q_head += 1;
            let false_lit = p.negate();

            let list = self.watches.list(p).to_vec();
            let mut keep: Vec<Watcher> = Vec::with_capacity(list.len());
            let mut conflict = None;

            let mut i = 0;
            while i < list.len() {
                let w = list[i];
                i += 1;
                match w {
                    Watcher::Binary { other, redundant } => match self.value(other) {
                        Some(true) => keep.push(w),
                        Some(false) => {
                            conflict = Some(PropBy::Binary {
                                lit: other,
                                red_step: redundant,
                                hyper_bin: false,
                                hyper_bin_not_added: false,
                            });
                            keep.push(w);
                            break;
                        }
                        None => {
                            keep.push(w);
                            self.enqueue(
                                other,
                                PropBy::Binary {
                                    lit: false_lit,
                                    red_step: redundant,
                                    hyper_bin: false,
                                    hyper_bin_not_added: false,
                                },
                            );
                        }
                    },
                    Watcher::Ternary { lit2, lit3, .. } => {
                        let v2 = self.value(lit2);
                        let v3 = self.value(lit3);
                        if v2 == Some(true) || v3 == Some(true) {
                            keep.push(w);
                        } else if v2.is_none() && v3.is_none() {
                            keep.push(w);
                        } else if v2.is_none() {
                            keep.push(w);
                            self.enqueue(lit2, PropBy::Ternary(false_lit, lit3));
                        } else if v3.is_none() {
                            keep.push(w);
                            self.enqueue(lit3, PropBy::Ternary(false_lit, lit2));
                        } else {
                            conflict = Some(PropBy::Ternary(lit2, lit3));
                            keep.push(w);
                            break;
                        }
                    }
                    Watcher::Long { cid, blocker, .. } => {
                        if self.value(blocker) == Some(true) {
                            keep.push(w);
                            continue;
                        }
                        let lits_len = cdb[cid].lits.len();
                        {
                            let lits = &mut cdb[cid].lits;
                            if lits[0] == false_lit {
                                lits.swap(0, 1);
                            }
                        }
                        let first = cdb[cid].lits[0];
                        if self.value(first) == Some(true) {
                            keep.push(Watcher::Long {
                                cid,
                                blocker: first,
                                abstraction: cdb[cid].abstraction,
                            });
                            continue;
                        }
                        let mut found = None;
                        for k in 2..lits_len {
                            let lk = cdb[cid].lits[k];
                            if self.value(lk) != Some(false) {
                                found = Some(k);
                                break;
                            }
                        }
                        if let Some(k) = found {
                            let new_watch = cdb[cid].lits[k];
                            cdb[cid].lits.swap(1, k);
                            self.watches.register_long(new_watch.negate(), cid, first, cdb[cid].abstraction);
                        } else if self.value(first).is_none() {
                            keep.push(w);
                            self.enqueue(first, PropBy::Clause(cid));
                        } else {
                            conflict = Some(PropBy::Clause(cid));
                            keep.push(w);
                        }
                    }
                }
                if conflict.is_some() {
                    break;
                }
            }
            // Remaining untouched watchers keep their place.
            for w in list.into_iter().skip(i) {
                keep.push(w);
            }
            *self.watches.list_mut(p) = keep;

            if let Some(c) = conflict {
                return Some(c);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdb::ClauseDb;

    fn fresh(n: usize) -> (AssignStack, ClauseDb) {
        let cnf = CNFDescription {
            num_of_variables: n,
            ..Default::default()
        };
        let cfg = Config::default();
        (AssignStack::instantiate(&cfg, &cnf), ClauseDb::instantiate(&cfg, &cnf))
    }

    #[test]
    fn binary_propagation_forces_the_implied_literal() {
        let (mut asg, mut cdb) = fresh(2);
        let l1 = Lit::from_int(1);
        let l2 = Lit::from_int(2);
        asg.watches.register_binary(l1.negate(), l2, false);
        asg.watches.register_binary(l2.negate(), l1, false);
        asg.assign_by_decision(l1);
        assert!(asg.propagate(&mut cdb).is_none());
        assert_eq!(asg.value(l2), Some(true));
    }

    #[test]
    fn qhead_reaches_trail_length_at_fixed_point() {
        let (mut asg, mut cdb) = fresh(3);
        asg.assign_by_decision(Lit::from_int(1));
        asg.propagate(&mut cdb);
        assert_eq!(asg.q_head, asg.trail.len());
    }

    #[test]
    fn trail_lim_length_matches_decision_level() {
        let (mut asg, _cdb) = fresh(3);
        asg.assign_by_decision(Lit::from_int(1));
        asg.assign_by_decision(Lit::from_int(2));
        assert_eq!(asg.trail_lim.len(), asg.decision_level());
        assert_eq!(asg.decision_level(), 2);
    }

    #[test]
    fn cancel_until_clears_assignments_above_the_target_level() {
        let (mut asg, _cdb) = fresh(3);
        asg.assign_by_decision(Lit::from_int(1));
        asg.assign_by_decision(Lit::from_int(2));
        asg.cancel_until(1);
        assert_eq!(asg.decision_level(), 1);
        assert_eq!(asg.value(Lit::from_int(2)), None);
        assert_eq!(asg.value(Lit::from_int(1)), Some(true));
    }
}
