//! XOR recovery and Gaussian elimination: clause groups of size
//! `2^(k-1)` over the same `k` variables with compatible parities encode
//! an XOR constraint; connected blocks of recovered XORs are echelonized
//! with dense bit-packed rows.

use crate::types::{Lit, VarId};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Xor {
    pub vars: Vec<VarId>,
    pub rhs: bool,
}

/// Scans clauses of uniform length `k` grouped by variable set; if all
/// `2^(k-1)` sign patterns consistent with one parity are present, emits
/// an XOR and consumes those clauses' ids (returned as the second
/// element) so the caller can remove them.
pub fn find_xors(clauses: &[(crate::cdb::ClauseId, Vec<Lit>)]) -> Vec<(Xor, Vec<crate::cdb::ClauseId>)> {
    let mut by_varset: HashMap<Vec<VarId>, Vec<(crate::cdb::ClauseId, Vec<Lit>)>> = HashMap::new();
    for (cid, lits) in clauses {
        if lits.len() < 3 || lits.len() > 10 {
            continue; // bound the search; large XORs are rare and expensive to confirm
        }
        let mut vars: Vec<VarId> = lits.iter().map(|l| l.vi()).collect();
        vars.sort_unstable();
        if vars.windows(2).any(|w| w[0] == w[1]) {
            continue; // not a simple clause over distinct variables
        }
        by_varset.entry(vars).or_default().push((*cid, lits.clone()));
    }

    let mut out = Vec::new();
    for (vars, group) in by_varset {
        let k = vars.len();
        let needed = 1usize << (k - 1);
        if group.len() < needed {
            continue;
        }
        // Every clause's parity (number of negated literals among the
        // vars, mod 2) must agree for this to be one XOR constraint.
        let parities: Vec<bool> = group
            .iter()
            .map(|(_, lits)| lits.iter().filter(|l| l.is_negated()).count() % 2 == 1)
            .collect();
        let mut distinct_patterns: Vec<Vec<bool>> = group
            .iter()
            .map(|(_, lits)| {
                let mut signs: Vec<(VarId, bool)> = lits.iter().map(|l| (l.vi(), l.is_negated())).collect();
                signs.sort_unstable();
                signs.into_iter().map(|(_, s)| s).collect()
            })
            .collect();
        distinct_patterns.sort();
        distinct_patterns.dedup();
        if distinct_patterns.len() < needed {
            continue;
        }
        let rhs = !parities[0];
        if parities.iter().all(|&p| p == parities[0]) {
            out.push((Xor { vars, rhs }, group.into_iter().map(|(cid, _)| cid).collect()));
        }
    }
    out
}

/// A block of XORs sharing at least one variable, echelonized as a
/// dense bit matrix: `rows[i]` has one bit per variable (`matrix`) plus
/// the RHS bit.
pub struct GaussianBlock {
    pub vars: Vec<VarId>,
    pub rows: Vec<(Vec<bool>, bool)>,
}

impl GaussianBlock {
    pub fn from_xors(xors: &[Xor]) -> GaussianBlock {
        let mut vars: Vec<VarId> = xors.iter().flat_map(|x| x.vars.iter().copied()).collect();
        vars.sort_unstable();
        vars.dedup();
        let index: HashMap<VarId, usize> = vars.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        let rows = xors
            .iter()
            .map(|x| {
                let mut row = vec![false; vars.len()];
                for &v in &x.vars {
                    row[index[&v]] = true;
                }
                (row, x.rhs)
            })
            .collect();
        GaussianBlock { vars, rows }
    }

    /// Echelonizes in place via Gauss-Jordan over GF(2). Returns `false`
    /// if a contradiction (`0 = 1`) is reached.
    pub fn echelonize(&mut self) -> bool {
        let ncols = self.vars.len();
        let mut pivot_row = 0;
        for col in 0..ncols {
            if pivot_row >= self.rows.len() {
                break;
            }
            let found = (pivot_row..self.rows.len()).find(|&r| self.rows[r].0[col]);
            if let Some(r) = found {
                self.rows.swap(pivot_row, r);
                for r in 0..self.rows.len() {
                    if r != pivot_row && self.rows[r].0[col] {
                        let (pivot, rest) = split_at_mut_rows(&mut self.rows, pivot_row, r);
                        for c in 0..ncols {
                            rest.0[c] ^= pivot.0[c];
                        }
                        rest.1 ^= pivot.1;
                    }
                }
                pivot_row += 1;
            }
        }
        // A contradiction is an all-zero row with rhs = true.
        !self.rows.iter().any(|(row, rhs)| *rhs && row.iter().all(|&b| !b))
    }

    /// Rows with at most two set variables translate directly into a
    /// unit or binary clause for the main solver to consume.
    pub fn derived_short_rows(&self) -> Vec<(Vec<Lit>, bool)> {
        self.rows
            .iter()
            .filter(|(row, _)| row.iter().filter(|&&b| b).count() <= 2)
            .map(|(row, rhs)| {
                let lits: Vec<Lit> = row
                    .iter()
                    .enumerate()
                    .filter(|(_, &b)| b)
                    .map(|(i, _)| Lit::from_var(self.vars[i], false))
                    .collect();
                (lits, *rhs)
            })
            .collect()
    }
}

fn split_at_mut_rows(
    rows: &mut [(Vec<bool>, bool)],
    pivot: usize,
    other: usize,
) -> (&(Vec<bool>, bool), &mut (Vec<bool>, bool)) {
    debug_assert_ne!(pivot, other);
    if pivot < other {
        let (a, b) = rows.split_at_mut(other);
        (&a[pivot], &mut b[0])
    } else {
        let (a, b) = rows.split_at_mut(pivot);
        (&b[0], &mut a[other])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echelonizing_an_inconsistent_xor_chain_detects_the_contradiction() {
        // x1 ^ x2 = 0, x2 ^ x3 = 0, x1 ^ x3 = 1 has no solution: summing
        // all three equations mod 2 cancels every variable and leaves
        // 0 = 1 on the right-hand side.
        let xors = vec![
            Xor { vars: vec![1, 2], rhs: false },
            Xor { vars: vec![2, 3], rhs: false },
            Xor { vars: vec![1, 3], rhs: true },
        ];
        let mut block = GaussianBlock::from_xors(&xors);
        assert!(!block.echelonize());
    }

    #[test]
    fn a_consistent_xor_chain_echelonizes_cleanly() {
        let xors = vec![
            Xor { vars: vec![1, 2], rhs: false },
            Xor { vars: vec![2, 3], rhs: false },
        ];
        let mut block = GaussianBlock::from_xors(&xors);
        assert!(block.echelonize());
    }
}
