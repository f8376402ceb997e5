//! Stamp-based literal removal: a DFS over the binary implication graph
//! assigns each literal a (start, end) discovery/finish pair, giving an
//! O(1) sufficient (not complete) reachability test -- if `a`'s interval
//! contains `b`'s, `a` was on the DFS path to `b`, so `a` implies `b`.
//! Kept in two flavors, `Irred` (irredundant binaries only) and `Red`
//! (every binary, learnt included), so a caller can tell "confirmed by
//! the original formula" apart from "confirmed only with a learnt
//! clause's help." Grounded on CryptoMiniSat's `stamp.h`/`stamp.cpp`
//! (`Stamp::tstamp[lit].start/end[STAMP_IRRED/STAMP_RED]`).

use crate::assign::AssignStack;
use crate::cdb::Watcher;
use crate::types::Lit;

#[derive(Clone, Copy, Debug, Default)]
struct Interval {
    start: u32,
    end: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flavor {
    Irred,
    Red,
}

#[derive(Clone, Debug, Default)]
pub struct Stamp {
    irred: Vec<Interval>,
    red: Vec<Interval>,
}

impl Stamp {
    /// Rebuilds both flavors from the current watch store. Call this
    /// once per in-processing round, not per conflict -- the DFS is
    /// `O(literals + binaries)`, too costly to redo on every learnt
    /// clause.
    pub fn rebuild(asg: &AssignStack) -> Stamp {
        let num_lits = 2 * (asg.var.len());
        Stamp {
            irred: Self::dfs(asg, num_lits, Flavor::Irred),
            red: Self::dfs(asg, num_lits, Flavor::Red),
        }
    }

    fn edges(asg: &AssignStack, idx: usize, flavor: Flavor) -> Vec<usize> {
        let lit = Lit::from_var(idx >> 1, (idx & 1) != 0);
        asg.watches
            .list(lit)
            .iter()
            .filter_map(|w| match w {
                Watcher::Binary { other, redundant } if flavor == Flavor::Red || !*redundant => {
                    Some(other.as_usize())
                }
                _ => None,
            })
            .collect()
    }

    fn dfs(asg: &AssignStack, num_lits: usize, flavor: Flavor) -> Vec<Interval> {
        let mut stamps = vec![Interval::default(); num_lits];
        let mut visited = vec![false; num_lits];
        let mut clock = 0u32;

        for start in 0..num_lits {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            clock += 1;
            stamps[start].start = clock;
            let edges = Self::edges(asg, start, flavor);
            let mut work: Vec<(usize, usize, Vec<usize>)> = vec![(start, 0, edges)];

            while let Some((v, mut i, edges)) = work.pop() {
                let mut recurse_into = None;
                while i < edges.len() {
                    let w = edges[i];
                    i += 1;
                    if !visited[w] {
                        recurse_into = Some(w);
                        break;
                    }
                }
                if let Some(w) = recurse_into {
                    work.push((v, i, edges));
                    visited[w] = true;
                    clock += 1;
                    stamps[w].start = clock;
                    let wedges = Self::edges(asg, w, flavor);
                    work.push((w, 0, wedges));
                    continue;
                }
                clock += 1;
                stamps[v].end = clock;
            }
        }
        stamps
    }

    /// True if `a`'s DFS interval contains `b`'s, i.e. `a` is confirmed
    /// (by this flavor's graph) to reach `b`. A `false` result does not
    /// mean `a` cannot reach `b` -- only that the DFS tree didn't prove it.
    pub fn dominates(&self, a: Lit, b: Lit, flavor: Flavor) -> bool {
        if a == b {
            return true;
        }
        let table = match flavor {
            Flavor::Irred => &self.irred,
            Flavor::Red => &self.red,
        };
        let ia = table[a.as_usize()];
        let ib = table[b.as_usize()];
        ia.start != 0 && ib.start != 0 && ia.start <= ib.start && ib.end <= ia.end
    }

    /// Drops every literal in `cl` (after the asserting literal at
    /// index 0) that implies some other surviving literal: if `lit ->
    /// other` (the binary clause `(!lit v other)` holds, directly or
    /// transitively) and `other` is also in the clause, `lit` is
    /// redundant -- resolving the clause against that binary on `lit`
    /// yields the clause with `lit` dropped and `other` already present
    /// to absorb it. Returns the number of literals removed.
    pub fn shrink(&self, cl: &mut Vec<Lit>, flavor: Flavor) -> usize {
        if cl.len() <= 2 {
            return 0;
        }
        let before = cl.len();
        let keep: Vec<bool> = (0..cl.len())
            .map(|i| {
                if i == 0 {
                    return true;
                }
                let lit = cl[i];
                !cl.iter().enumerate().any(|(j, &other)| {
                    j != i && self.dominates(lit, other, flavor)
                })
            })
            .collect();
        let mut i = 0;
        cl.retain(|_| {
            let k = keep[i];
            i += 1;
            k
        });
        before - cl.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{CNFDescription, Instantiate};

    #[test]
    fn a_literal_dominated_through_a_binary_chain_is_removed() {
        let cfg = Config::default();
        let cnf = CNFDescription {
            num_of_variables: 4,
            ..Default::default()
        };
        let mut asg = AssignStack::instantiate(&cfg, &cnf);
        let x1 = Lit::from_int(1);
        let x2 = Lit::from_int(2);
        let x3 = Lit::from_int(3);
        let x4 = Lit::from_int(4);
        // (!x2 v x4) gives x2 -> x4, and (!x4 v x3) gives x4 -> x3, so
        // x2 -> x3 transitively through x4, which never appears in the
        // clause itself. In (x1 v x2 v x3), x2 is then redundant: x1
        // stays as the asserting literal, x3 already covers what x2
        // would have forced.
        asg.watches.register_binary(x2, x4, false);
        asg.watches.register_binary(x4.negate(), x2.negate(), false);
        asg.watches.register_binary(x4, x3, false);
        asg.watches.register_binary(x3.negate(), x4.negate(), false);

        let stamp = Stamp::rebuild(&asg);
        let mut cl = vec![x1, x2, x3];
        let removed = stamp.shrink(&mut cl, Flavor::Irred);
        assert_eq!(removed, 1);
        assert_eq!(cl, vec![x1, x3]);
    }

    #[test]
    fn a_clause_with_no_binary_relation_is_untouched() {
        let cfg = Config::default();
        let cnf = CNFDescription {
            num_of_variables: 3,
            ..Default::default()
        };
        let asg = AssignStack::instantiate(&cfg, &cnf);
        let stamp = Stamp::rebuild(&asg);
        let mut cl = vec![Lit::from_int(1), Lit::from_int(2), Lit::from_int(3)];
        let removed = stamp.shrink(&mut cl, Flavor::Irred);
        assert_eq!(removed, 0);
        assert_eq!(cl.len(), 3);
    }
}
