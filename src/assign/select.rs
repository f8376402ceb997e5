//! Decision-variable selection: an activity-ordered heap with periodic
//! decay, random restarts of the pick, and a stored polarity preference.

use super::AssignStack;
use crate::config::Config;
use crate::types::{Lit, Rng, VarId};

/// A binary max-heap over variable activity, indexed by `VarId`. Lazily
/// tolerant of stale entries: a variable popped that's no longer active
/// or already assigned is simply discarded by the caller.
#[derive(Clone, Debug, Default)]
pub struct VarOrder {
    heap: Vec<VarId>,
    pos: Vec<usize>,
}

impl VarOrder {
    pub fn new(num_vars: usize) -> VarOrder {
        let heap: Vec<VarId> = (1..=num_vars).collect();
        let mut pos = vec![usize::MAX; num_vars + 1];
        for (i, &vi) in heap.iter().enumerate() {
            pos[vi] = i;
        }
        let mut vo = VarOrder { heap, pos };
        // Build heap bottom-up; activities start at 0 so any valid order works.
        vo.rebuild_identity();
        vo
    }

    fn rebuild_identity(&mut self) {
        for (i, &vi) in self.heap.iter().enumerate() {
            self.pos[vi] = i;
        }
    }

    pub fn grow_to(&mut self, vi: VarId) {
        if vi >= self.pos.len() {
            self.pos.resize(vi + 1, usize::MAX);
        }
        if self.pos[vi] == usize::MAX {
            self.heap.push(vi);
            self.pos[vi] = self.heap.len() - 1;
        }
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.pos[self.heap[i]] = i;
        self.pos[self.heap[j]] = j;
    }

    fn sift_up<F: Fn(VarId) -> f64>(&mut self, mut i: usize, activity: &F) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if activity(self.heap[parent]) < activity(self.heap[i]) {
                self.swap(parent, i);
                i = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down<F: Fn(VarId) -> f64>(&mut self, mut i: usize, activity: &F) {
        loop {
            let l = 2 * i + 1;
            let r = 2 * i + 2;
            let mut largest = i;
            if l < self.heap.len() && activity(self.heap[l]) > activity(self.heap[largest]) {
                largest = l;
            }
            if r < self.heap.len() && activity(self.heap[r]) > activity(self.heap[largest]) {
                largest = r;
            }
            if largest == i {
                break;
            }
            self.swap(i, largest);
            i = largest;
        }
    }

    pub fn bump<F: Fn(VarId) -> f64>(&mut self, vi: VarId, activity: F) {
        if let Some(&i) = self.pos.get(vi) {
            if i != usize::MAX {
                self.sift_up(i, &activity);
            }
        }
    }

    /// Removes and returns the highest-activity variable still present.
    pub fn pop<F: Fn(VarId) -> f64>(&mut self, activity: F) -> Option<VarId> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap[0];
        let last = self.heap.len() - 1;
        self.swap(0, last);
        self.pos[self.heap[last]] = usize::MAX;
        self.heap.pop();
        if !self.heap.is_empty() {
            self.sift_down(0, &activity);
        }
        Some(top)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Activity reward scheme (EVSIDS-flavored): bump on conflict
/// participation, periodically rescale to avoid floating-point overflow,
/// and decay the increment gradually so activity differentiates over a
/// long search.
pub struct VarReward {
    pub var_inc: f64,
    pub var_decay: f64,
    pub var_decay_max: f64,
}

impl VarReward {
    pub fn new(config: &Config) -> VarReward {
        VarReward {
            var_inc: config.var_inc_start,
            var_decay: config.var_decay_start,
            var_decay_max: config.var_decay_max,
        }
    }

    pub fn bump(&mut self, asg: &mut AssignStack, order: &mut VarOrder, vi: VarId) {
        asg.var[vi].activity += self.var_inc;
        if asg.var[vi].activity > 1e100 {
            for v in asg.var.iter_mut() {
                v.activity *= 1e-100;
            }
            self.var_inc *= 1e-100;
        }
        order.bump(vi, |v| asg.var[v].activity);
    }

    pub fn decay(&mut self) {
        self.var_inc /= self.var_decay;
    }

    pub fn bump_decay_rate(&mut self) {
        if self.var_decay < self.var_decay_max {
            self.var_decay += 0.01;
        }
    }
}

/// Picks the next decision literal: assumptions first, then the
/// activity heap (occasionally overridden by a uniformly random pick),
/// with polarity from the variable's stored preference.
pub fn select_decision_literal(
    asg: &AssignStack,
    order: &mut VarOrder,
    rng: &mut Rng,
    random_var_freq: f64,
) -> Option<Lit> {
    let pick = if !order.is_empty() && rng.next_f64() < random_var_freq {
        let idx = rng.below(asg.var.len().saturating_sub(1)) + 1;
        if asg.var[idx].is_active() && asg.var[idx].assign.is_none() {
            Some(idx)
        } else {
            None
        }
    } else {
        None
    };

    let vi = match pick {
        Some(vi) => vi,
        None => loop {
            let cand = order.pop(|v| asg.var[v].activity)?;
            if asg.var[cand].is_active() && asg.var[cand].assign.is_none() {
                break cand;
            }
        },
    };

    Some(Lit::from_var(vi, !asg.var[vi].polarity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_pops_in_decreasing_activity_order() {
        let mut order = VarOrder::new(4);
        let activity = |vi: VarId| -> f64 {
            match vi {
                1 => 5.0,
                2 => 1.0,
                3 => 9.0,
                4 => 3.0,
                _ => 0.0,
            }
        };
        for vi in 1..=4 {
            order.bump(vi, activity);
        }
        let mut seen = Vec::new();
        while let Some(vi) = order.pop(activity) {
            seen.push(vi);
        }
        assert_eq!(seen, vec![3, 1, 4, 2]);
    }
}
