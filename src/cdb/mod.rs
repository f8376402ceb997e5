//! The clause arena: an index-addressed allocator for long clauses, plus
//! the learned-clause lifecycle (cleaning/reduction) and DRUP emission
//! hooks. Binary/ternary clauses never enter this arena; see
//! [`watch::WatchStore`].

pub mod clause;
pub mod watch;

pub use clause::{Clause, ClauseFlag};
pub use watch::{WatchDBIF, WatchStore, Watcher};

use crate::config::Config;
use crate::drup::Proof;
use crate::types::{CNFDescription, Instantiate, Lit};

/// Index into the arena. Stable only between calls to
/// [`ClauseDb::consolidate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseId(pub u32);

impl ClauseId {
    pub const NULL: ClauseId = ClauseId(u32::MAX);
}

/// Append-only (until consolidated) store of long clauses: a plain
/// `Vec<Clause>` indexed by [`ClauseId`] rather than a byte-level arena,
/// trading pointer-packing tricks for a safe, simple indexing contract.
#[derive(Clone, Debug, Default)]
pub struct ClauseDb {
    clauses: Vec<Clause>,
    num_free: usize,
    pub num_reduction_passes: usize,
}

impl Instantiate for ClauseDb {
    fn instantiate(_config: &Config, _cnf: &CNFDescription) -> ClauseDb {
        ClauseDb {
            clauses: vec![Clause::new(Vec::new(), false)], // index 0 reserved, never addressable
            num_free: 0,
            num_reduction_passes: 0,
        }
    }
}

impl std::ops::Index<ClauseId> for ClauseDb {
    type Output = Clause;
    fn index(&self, cid: ClauseId) -> &Clause {
        &self.clauses[cid.0 as usize]
    }
}

impl std::ops::IndexMut<ClauseId> for ClauseDb {
    fn index_mut(&mut self, cid: ClauseId) -> &mut Clause {
        &mut self.clauses[cid.0 as usize]
    }
}

impl ClauseDb {
    pub fn new_clause(&mut self, lits: Vec<Lit>, redundant: bool) -> ClauseId {
        let c = Clause::new(lits, redundant);
        let id = ClauseId(self.clauses.len() as u32);
        self.clauses.push(c);
        id
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.len() <= 1
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = ClauseId> + '_ {
        (1..self.clauses.len() as u32).map(ClauseId)
    }

    pub fn mark_removed(&mut self, cid: ClauseId, proof: &mut Proof) {
        if !self[cid].is_removed() {
            proof.delete(&self[cid].lits);
            self[cid].mark_removed();
            self.num_free += 1;
        }
    }

    pub fn count_redundant(&self) -> usize {
        self.clauses
            .iter()
            .filter(|c| c.is_redundant() && !c.is_removed())
            .count()
    }

    /// Rebuilds the arena compactly, dropping removed clauses and
    /// handing the caller a remap table so it can rewrite watch/reason
    /// offsets. Index 0 is preserved as the permanent sentinel.
    pub fn consolidate(&mut self) -> Vec<Option<ClauseId>> {
        let mut remap = vec![None; self.clauses.len()];
        let mut compact = Vec::with_capacity(self.clauses.len());
        compact.push(self.clauses[0].clone());
        remap[0] = Some(ClauseId(0));
        for (old_idx, c) in self.clauses.iter().enumerate().skip(1) {
            if c.is_removed() {
                continue;
            }
            let new_id = ClauseId(compact.len() as u32);
            remap[old_idx] = Some(new_id);
            compact.push(c.clone());
        }
        self.clauses = compact;
        self.num_free = 0;
        remap
    }

    /// Computes glue: the number of distinct decision levels among the
    /// literals, using a caller-supplied level lookup so this module
    /// doesn't need to depend on the assignment stack directly.
    pub fn compute_glue<F: Fn(Lit) -> usize>(lits: &[Lit], level_of: F) -> u32 {
        let mut levels: Vec<usize> = lits.iter().map(|&l| level_of(l)).filter(|&lv| lv > 0).collect();
        levels.sort_unstable();
        levels.dedup();
        levels.len() as u32
    }

    /// Learned-clause cleaning: partitions into never-cleaned
    /// (locked, low glue, or still carrying a one-turn reprieve) versus
    /// candidates, then keeps the configured top share of candidates by
    /// glue/size/activity in turn. Returns the ids that were actually
    /// removed, so the caller can detach their watches.
    pub fn reduce<IsLocked: Fn(ClauseId) -> bool>(
        &mut self,
        config: &Config,
        is_locked: IsLocked,
        proof: &mut Proof,
    ) -> Vec<ClauseId> {
        self.num_reduction_passes += 1;
        let (keep_glue, keep_size, keep_activity) = config.keep_ratios();
        let keep_thresh = config.glue_must_keep_clause_if_below_or_eq;

        let mut candidates: Vec<ClauseId> = self
            .iter_ids()
            .filter(|&cid| {
                let c = &self[cid];
                c.is_redundant()
                    && !c.is_removed()
                    && c.ttl == 0
                    && c.glue > keep_thresh
                    && !is_locked(cid)
            })
            .collect();

        let n = candidates.len();
        let mut keep = vec![false; n];

        let mut by_glue = candidates.clone();
        by_glue.sort_by_key(|&cid| self[cid].glue);
        for &cid in by_glue.iter().take((n as f64 * keep_glue) as usize) {
            if let Some(pos) = candidates.iter().position(|&c| c == cid) {
                keep[pos] = true;
            }
        }

        let mut by_size = candidates.clone();
        by_size.sort_by_key(|&cid| self[cid].lits.len());
        for &cid in by_size.iter().take((n as f64 * keep_size) as usize) {
            if let Some(pos) = candidates.iter().position(|&c| c == cid) {
                keep[pos] = true;
            }
        }

        let mut by_activity = candidates.clone();
        by_activity.sort_by(|&a, &b| self[b].activity.partial_cmp(&self[a].activity).unwrap());
        for &cid in by_activity.iter().take((n as f64 * keep_activity) as usize) {
            if let Some(pos) = candidates.iter().position(|&c| c == cid) {
                keep[pos] = true;
            }
        }

        let mut removed = Vec::new();
        for (i, &cid) in candidates.iter().enumerate() {
            if !keep[i] {
                self.mark_removed(cid, proof);
                removed.push(cid);
            }
        }

        for cid in self.iter_ids().collect::<Vec<_>>() {
            if self[cid].ttl > 0 {
                self[cid].ttl -= 1;
            }
        }

        removed
    }

    /// Glue improved past the protection threshold: arm the one-turn
    /// reprieve if it isn't armed already (never re-armed while still
    /// positive, see DESIGN.md).
    pub fn protect_on_glue_improvement(&mut self, cid: ClauseId, config: &Config) {
        let c = &mut self[cid];
        if c.glue <= config.glue_must_keep_clause_if_below_or_eq && c.ttl == 0 {
            c.ttl = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consolidate_is_idempotent_on_live_data() {
        let mut db = ClauseDb::instantiate(&Config::default(), &CNFDescription::default());
        let a = db.new_clause(vec![Lit::from_int(1), Lit::from_int(2), Lit::from_int(3)], false);
        let _b = db.new_clause(vec![Lit::from_int(-1), Lit::from_int(2), Lit::from_int(-3)], true);
        let mut proof = Proof::disabled();
        db.mark_removed(a, &mut proof);
        db.consolidate();
        let before = db.clone();
        db.consolidate();
        assert_eq!(before.len(), db.len());
    }

    #[test]
    fn glue_counts_distinct_nonzero_levels() {
        let lits = vec![Lit::from_int(1), Lit::from_int(2), Lit::from_int(3)];
        let levels = [1usize, 1, 2];
        let g = ClauseDb::compute_glue(&lits, |l| levels[l.vi()]);
        assert_eq!(g, 2);
    }
}
