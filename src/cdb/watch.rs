//! Per-literal watch lists. A clause watching literal `w` is registered
//! under `!w`, so the list attached to a literal `p` holds exactly the
//! clauses that need checking the moment `p` is assigned true (which is
//! when their watched literal `!p` goes false). Binary and ternary
//! clauses are represented inline (no arena entry); long clauses carry
//! an offset into the [`super::ClauseDb`] arena plus a cached blocking
//! literal so the common "already satisfied" case never touches the
//! arena at all.

use crate::cdb::ClauseId;
use crate::types::Lit;

#[derive(Clone, Copy, Debug)]
pub enum Watcher {
    Binary { other: Lit, redundant: bool },
    Ternary { lit2: Lit, lit3: Lit, redundant: bool },
    Long { cid: ClauseId, blocker: Lit, abstraction: u32 },
}

impl Watcher {
    pub fn is_long(&self) -> bool {
        matches!(self, Watcher::Long { .. })
    }

    pub fn cid(&self) -> Option<ClauseId> {
        match self {
            Watcher::Long { cid, .. } => Some(*cid),
            _ => None,
        }
    }
}

pub trait WatchDBIF {
    fn register(&mut self, lit: Lit, w: Watcher);
    /// Removes the first watcher at `lit` pointing at `cid`.
    fn detach(&mut self, lit: Lit, cid: ClauseId);
    /// Removes the first binary watcher at `lit` whose partner is `other`.
    fn detach_binary(&mut self, lit: Lit, other: Lit);
    /// Replaces the blocking literal of the watcher for `cid` at `lit`.
    fn update_blocker(&mut self, lit: Lit, cid: ClauseId, blocker: Lit);
}

impl WatchDBIF for Vec<Watcher> {
    fn register(&mut self, _lit: Lit, w: Watcher) {
        self.push(w);
    }

    fn detach(&mut self, _lit: Lit, cid: ClauseId) {
        if let Some(pos) = self.iter().position(|w| w.cid() == Some(cid)) {
            self.swap_remove(pos);
        }
    }

    fn detach_binary(&mut self, _lit: Lit, other: Lit) {
        if let Some(pos) = self.iter().position(|w| match w {
            Watcher::Binary { other: o, .. } => *o == other,
            _ => false,
        }) {
            self.swap_remove(pos);
        }
    }

    fn update_blocker(&mut self, _lit: Lit, cid: ClauseId, new_blocker: Lit) {
        for w in self.iter_mut() {
            if let Watcher::Long { cid: c, blocker, .. } = w {
                if *c == cid {
                    *blocker = new_blocker;
                }
            }
        }
    }
}

/// One watch list per literal, indexed by `Lit::as_usize`.
#[derive(Clone, Debug, Default)]
pub struct WatchStore {
    lists: Vec<Vec<Watcher>>,
}

impl WatchStore {
    pub fn new(num_vars: usize) -> WatchStore {
        WatchStore {
            lists: vec![Vec::new(); 2 * (num_vars + 1)],
        }
    }

    pub fn grow_to(&mut self, num_vars: usize) {
        let needed = 2 * (num_vars + 1);
        if self.lists.len() < needed {
            self.lists.resize(needed, Vec::new());
        }
    }

    #[inline]
    pub fn list(&self, lit: Lit) -> &[Watcher] {
        &self.lists[lit.as_usize()]
    }

    #[inline]
    pub fn list_mut(&mut self, lit: Lit) -> &mut Vec<Watcher> {
        &mut self.lists[lit.as_usize()]
    }

    pub fn register_binary(&mut self, l: Lit, other: Lit, redundant: bool) {
        self.list_mut(l).register(l, Watcher::Binary { other, redundant });
    }

    pub fn register_ternary(&mut self, l: Lit, lit2: Lit, lit3: Lit, redundant: bool) {
        self.list_mut(l)
            .register(l, Watcher::Ternary { lit2, lit3, redundant });
    }

    pub fn register_long(&mut self, l: Lit, cid: ClauseId, blocker: Lit, abstraction: u32) {
        self.list_mut(l).register(
            l,
            Watcher::Long {
                cid,
                blocker,
                abstraction,
            },
        );
    }

    /// Drops every watcher referencing a removed clause; called right
    /// after a cleaning/consolidation pass so no watch list holds a
    /// dangling offset.
    pub fn clean_removed<F: Fn(ClauseId) -> bool>(&mut self, is_removed: F) {
        for list in self.lists.iter_mut() {
            list.retain(|w| match w {
                Watcher::Long { cid, .. } => !is_removed(*cid),
                _ => true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Lit;

    #[test]
    fn binary_watchers_are_symmetric_by_construction() {
        let mut ws = WatchStore::new(4);
        let a = Lit::from_int(1);
        let b = Lit::from_int(2);
        ws.register_binary(a.negate(), b, false);
        ws.register_binary(b.negate(), a, false);
        assert!(matches!(ws.list(a.negate())[0], Watcher::Binary { other, .. } if other == b));
        assert!(matches!(ws.list(b.negate())[0], Watcher::Binary { other, .. } if other == a));
    }
}
