//! The assignment trail and two-watched-literal propagation engine,
//! plus the decision-variable heap and activity reward scheme.

pub mod select;
pub mod stack;

pub use stack::AssignStack;

use crate::cdb::ClauseId;
use crate::types::Lit;

/// Why a literal currently holds its value; `Null` covers both
/// decisions and level-0 facts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropBy {
    Null,
    Clause(ClauseId),
    Binary {
        /// The other (now-false) literal of the binary clause; its
        /// negation is the antecedent.
        lit: Lit,
        /// The binary clause this came from is redundant (learnt), not
        /// one of the original irredundant binaries.
        red_step: bool,
        /// Synthesized by hyper-binary resolution during probing rather
        /// than backed by a clause stored in the watch lists.
        hyper_bin: bool,
        /// A hyper-binary shortcut that held transitively but was never
        /// registered as a real clause, because its derivation already
        /// bottomed out at decision level 0.
        hyper_bin_not_added: bool,
    },
    Ternary(Lit, Lit),
}

impl PropBy {
    /// A plain two-watched-literal binary reason: not a hyper-bin
    /// shortcut, not flagged redundant.
    pub fn binary(lit: Lit) -> PropBy {
        PropBy::Binary {
            lit,
            red_step: false,
            hyper_bin: false,
            hyper_bin_not_added: false,
        }
    }

    /// A hyper-binary shortcut reason: `lit` is the ancestor literal the
    /// BFS resolved through; `added` says whether a real binary clause
    /// was registered for it (see [`PropBy::Binary::hyper_bin_not_added`]).
    pub fn hyper_binary(lit: Lit, added: bool) -> PropBy {
        PropBy::Binary {
            lit,
            red_step: false,
            hyper_bin: true,
            hyper_bin_not_added: !added,
        }
    }
}

impl std::fmt::Display for PropBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropBy::Null => write!(f, "null"),
            PropBy::Clause(cid) => write!(f, "clause#{}", cid.0),
            PropBy::Binary { lit, hyper_bin, .. } if *hyper_bin => {
                write!(f, "hyperbin({:?})", lit)
            }
            PropBy::Binary { lit, .. } => write!(f, "binary({:?})", lit),
            PropBy::Ternary(a, b) => write!(f, "ternary({:?},{:?})", a, b),
        }
    }
}

/// What happened to a variable over the course of in-processing. A
/// variable never leaves this record once touched; it only ever moves
/// from `Active` to one terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemovedState {
    Active,
    Eliminated,
    Replaced,
    QueuedReplacer,
    Decomposed,
}

/// Per-variable bookkeeping: current value, the level it was set at, its
/// reason, the branching heuristics' state, and its disposition in the
/// in-processing pipeline.
#[derive(Clone, Debug)]
pub struct Var {
    pub assign: Option<bool>,
    pub level: usize,
    pub reason: PropBy,
    pub activity: f64,
    pub reward: f64,
    pub polarity: bool,
    pub removed: RemovedState,
    pub is_decision: bool,
}

impl Default for Var {
    fn default() -> Var {
        Var {
            assign: None,
            level: 0,
            reason: PropBy::Null,
            activity: 0.0,
            reward: 0.0,
            polarity: false,
            removed: RemovedState::Active,
            is_decision: false,
        }
    }
}

impl Var {
    pub fn is_active(&self) -> bool {
        self.removed == RemovedState::Active
    }
}
