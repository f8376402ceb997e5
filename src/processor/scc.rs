//! Strongly-connected-component detection over the binary implication
//! graph: for every irredundant binary `{u, v}` there are edges
//! `!u -> v` and `!v -> u`. Any SCC of size >= 2 collapses to a single
//! equivalence class. Grounded on CryptoMiniSat's `sccfinder.cpp`,
//! reimplemented as an iterative Tarjan (no recursion, so there's no
//! stack-depth limit tied to the number of variables).

use super::replace::VarReplacer;
use crate::assign::AssignStack;
use crate::cdb::Watcher;
use crate::types::Lit;

pub struct SccFinder {
    index: Vec<Option<u32>>,
    lowlink: Vec<u32>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: u32,
}

impl SccFinder {
    pub fn new(num_lits: usize) -> SccFinder {
        SccFinder {
            index: vec![None; num_lits],
            lowlink: vec![0; num_lits],
            on_stack: vec![false; num_lits],
            stack: Vec::new(),
            next_index: 0,
        }
    }

    fn edges(asg: &AssignStack, lit: Lit) -> Vec<Lit> {
        asg.watches
            .list(lit)
            .iter()
            .filter_map(|w| match w {
                Watcher::Binary { other, redundant } if !redundant => Some(*other),
                _ => None,
            })
            .collect()
    }

    /// Runs Tarjan over every literal, returns the replacer with every
    /// discovered equivalence queued (not yet flushed).
    pub fn run(&mut self, asg: &AssignStack, budget: &mut i64) -> VarReplacer {
        let mut replacer = VarReplacer::new(asg.num_vars);
        let n = self.index.len();

        for start in 0..n {
            if self.index[start].is_some() || *budget <= 0 {
                continue;
            }
            self.strong_connect(asg, start, &mut replacer, budget);
        }
        replacer
    }

    fn strong_connect(&mut self, asg: &AssignStack, root: usize, replacer: &mut VarReplacer, budget: &mut i64) {
        // Explicit-stack Tarjan: each frame is (node, edge-iterator-position).
        let mut work: Vec<(usize, usize, Vec<usize>)> = Vec::new();
        self.push_new(root);
        let root_lit = lit_from_index(root);
        let root_edges: Vec<usize> = Self::edges(asg, root_lit).into_iter().map(|l| l.as_usize()).collect();
        work.push((root, 0, root_edges));

        while let Some((v, mut i, edges)) = work.pop() {
            *budget -= 1;
            if *budget <= 0 {
                return;
            }
            let mut recurse_into = None;
            while i < edges.len() {
                let w = edges[i];
                i += 1;
                if self.index[w].is_none() {
                    recurse_into = Some(w);
                    break;
                } else if self.on_stack[w] {
                    self.lowlink[v] = self.lowlink[v].min(self.index[w].unwrap());
                }
            }
            if let Some(w) = recurse_into {
                work.push((v, i, edges));
                self.push_new(w);
                let w_lit = lit_from_index(w);
                let w_edges: Vec<usize> = Self::edges(asg, w_lit).into_iter().map(|l| l.as_usize()).collect();
                work.push((w, 0, w_edges));
                continue;
            }

            // Finished exploring v's edges.
            if let Some(&(pv, _, _)) = work.last() {
                self.lowlink[pv] = self.lowlink[pv].min(self.lowlink[v]);
            }
            if self.lowlink[v] == self.index[v].unwrap() {
                let mut component = Vec::new();
                loop {
                    let w = self.stack.pop().unwrap();
                    self.on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                if component.len() >= 2 {
                    let rep = lit_from_index(component[0]);
                    for &idx in &component[1..] {
                        replacer.queue_equivalence(rep, lit_from_index(idx));
                    }
                }
            }
        }
    }

    fn push_new(&mut self, v: usize) {
        self.index[v] = Some(self.next_index);
        self.lowlink[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack[v] = true;
    }
}

fn lit_from_index(idx: usize) -> Lit {
    Lit::from_var(idx >> 1, (idx & 1) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::types::{CNFDescription, Instantiate};

    #[test]
    fn two_consecutive_scc_runs_with_no_intervening_change_agree() {
        let cfg = Config::default();
        let cnf = CNFDescription {
            num_of_variables: 3,
            ..Default::default()
        };
        let mut asg = AssignStack::instantiate(&cfg, &cnf);
        let x1 = Lit::from_int(1);
        let x2 = Lit::from_int(2);
        // x1 <-> x2: binaries (!x1 v x2), (x1 v !x2), registered the way
        // `add_clause` registers any binary clause.
        asg.watches.register_binary(x1, x2, false);
        asg.watches.register_binary(x2.negate(), x1.negate(), false);
        asg.watches.register_binary(x2, x1, false);
        asg.watches.register_binary(x1.negate(), x2.negate(), false);

        let mut b1 = 10_000i64;
        let r1 = SccFinder::new(2 * (asg.num_vars + 1)).run(&asg, &mut b1);
        let mut b2 = 10_000i64;
        let r2 = SccFinder::new(2 * (asg.num_vars + 1)).run(&asg, &mut b2);
        assert_eq!(r1.queued_len(), r2.queued_len());
    }
}
