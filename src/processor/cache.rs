//! Per-literal implication cache: remembers literals a literal is
//! known to transitively imply, with a flag marking whether that
//! implication is only backed by irredundant binaries (the case that
//! lets minimization and SCC trust the entry without re-deriving it).

use crate::assign::RemovedState;
use crate::types::{Lit, VarId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    pub implied: Lit,
    pub only_irredundant_bin: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ImplicationCache {
    entries: Vec<Vec<CacheEntry>>,
    pub max_size_per_lit: usize,
}

impl ImplicationCache {
    pub fn new(num_lits: usize) -> ImplicationCache {
        ImplicationCache {
            entries: vec![Vec::new(); num_lits],
            max_size_per_lit: 64,
        }
    }

    pub fn grow_to(&mut self, num_lits: usize) {
        if self.entries.len() < num_lits {
            self.entries.resize(num_lits, Vec::new());
        }
    }

    pub fn get(&self, lit: Lit) -> &[CacheEntry] {
        &self.entries[lit.as_usize()]
    }

    /// Unions `other`'s entries into `lit`'s cache. Returns `true` if a
    /// tautology was detected (both polarities of some literal present),
    /// meaning `lit` is forced: either `lit` is always false, or the
    /// merge source is degenerate.
    pub fn merge(&mut self, lit: Lit, new_entries: &[CacheEntry]) -> bool {
        let list = &mut self.entries[lit.as_usize()];
        let mut tautology = false;
        for &e in new_entries {
            if list.iter().any(|x| x.implied == e.implied.negate()) {
                tautology = true;
            }
            match list.iter_mut().find(|x| x.implied == e.implied) {
                Some(existing) => existing.only_irredundant_bin &= e.only_irredundant_bin,
                None => {
                    if list.len() < self.max_size_per_lit {
                        list.push(e);
                    }
                }
            }
        }
        tautology
    }

    pub fn add(&mut self, lit: Lit, implied: Lit, only_irredundant_bin: bool) {
        self.merge(
            lit,
            &[CacheEntry {
                implied,
                only_irredundant_bin,
            }],
        );
    }

    /// Drops entries pointing at variables no longer active, and caps
    /// each list at `max_size_per_lit` during the housekeeping clean pass.
    pub fn clean<F: Fn(VarId) -> RemovedState>(&mut self, removed_state: F) {
        for list in self.entries.iter_mut() {
            list.retain(|e| removed_state(e.implied.vi()) == RemovedState::Active);
            list.truncate(self.max_size_per_lit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merging_opposite_polarities_is_detected_as_a_tautology() {
        let mut cache = ImplicationCache::new(8);
        let a = Lit::from_int(2);
        cache.add(Lit::from_int(1), a, true);
        let saw_taut = cache.merge(
            Lit::from_int(1),
            &[CacheEntry {
                implied: a.negate(),
                only_irredundant_bin: true,
            }],
        );
        assert!(saw_taut);
    }
}
