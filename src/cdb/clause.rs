//! The long-clause representation stored in the arena. Binary and
//! ternary clauses never get an entry here; they live only in the
//! watch lists (see [`super::watch`]).

use crate::types::Lit;
use bitflags::bitflags;

bitflags! {
    #[derive(Default)]
    pub struct ClauseFlag: u16 {
        const REDUNDANT   = 0b0000_0001;
        const REMOVED     = 0b0000_0010;
        const OCCUR_LINKED = 0b0000_0100;
        const ASYMMED     = 0b0000_1000;
    }
}

/// A long clause (length >= 3, for clauses introduced by vivification
/// shrinking a longer clause down; genuinely-added clauses are never
/// shorter than what `add_clause` decided belonged in the arena).
#[derive(Clone, Debug)]
pub struct Clause {
    pub lits: Vec<Lit>,
    pub flags: ClauseFlag,
    pub activity: f64,
    pub glue: u32,
    /// One-shot reprieve from cleaning after a glue improvement; see
    /// DESIGN.md's "Open Question" note on cleaner/analyze interaction.
    pub ttl: u8,
    pub abstraction: u32,
    pub used_in_conflicts: u32,
}

impl Clause {
    pub fn new(lits: Vec<Lit>, redundant: bool) -> Clause {
        let mut c = Clause {
            lits,
            flags: if redundant {
                ClauseFlag::REDUNDANT
            } else {
                ClauseFlag::empty()
            },
            activity: 0.0,
            glue: u32::MAX,
            ttl: 0,
            abstraction: 0,
            used_in_conflicts: 0,
        };
        c.update_abstraction();
        c
    }

    #[inline]
    pub fn is_redundant(&self) -> bool {
        self.flags.contains(ClauseFlag::REDUNDANT)
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        self.flags.contains(ClauseFlag::REMOVED)
    }

    pub fn mark_removed(&mut self) {
        self.flags.insert(ClauseFlag::REMOVED);
    }

    /// Recomputes the abstraction word: one bit per `var mod 32`, used to
    /// cheaply reject subsumption/subset candidates before a full scan.
    pub fn update_abstraction(&mut self) {
        let mut a = 0u32;
        for l in &self.lits {
            a |= 1 << (l.vi() % 32);
        }
        self.abstraction = a;
    }

    pub fn contains(&self, lit: Lit) -> bool {
        self.lits.contains(&lit)
    }

    /// True when `self`'s literal set is a subset of `other`'s (used by
    /// subsumption). Both abstractions must already have been checked by
    /// the caller for a cheap rejection.
    pub fn subset_of(&self, other: &Clause) -> bool {
        self.lits.iter().all(|l| other.contains(*l))
    }
}
