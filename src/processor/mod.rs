//! The in-processing simplification pipeline run between search epochs.
//! Each pass is its own small module; [`run_round`] sequences equivalent-
//! literal replacement, probing, vivification, subsumption/strengthening,
//! bounded variable elimination, gate extraction, and XOR recovery under
//! per-pass time budgets.

pub mod cache;
pub mod component;
pub mod elim;
pub mod gate;
pub mod probe;
pub mod renumber;
pub mod replace;
pub mod scc;
pub mod vivify;
pub mod xor;

use crate::assign::AssignStack;
use crate::cdb::ClauseDb;
use crate::config::Config;
use crate::drup::Proof;
use crate::stamp::Stamp;
use crate::state::{SolverState, Stat};
use crate::types::{MaybeInconsistent, Rng};
use xor::Xor;

pub struct Processor {
    pub cache: cache::ImplicationCache,
    pub eliminator: elim::Eliminator,
    pub scc: scc::SccFinder,
    /// Binary-implication stamps used for conflict-clause minimization's
    /// second pass. Rebuilt once per [`run_round`], not per conflict --
    /// see [`Stamp::rebuild`].
    pub stamp: Stamp,
}

impl Processor {
    pub fn new(num_vars: usize) -> Processor {
        Processor {
            cache: cache::ImplicationCache::new(2 * (num_vars + 1)),
            eliminator: elim::Eliminator::new(),
            scc: scc::SccFinder::new(2 * (num_vars + 1)),
            stamp: Stamp::default(),
        }
    }

    pub fn grow_to(&mut self, num_vars: usize) {
        self.cache.grow_to(2 * (num_vars + 1));
        self.scc = scc::SccFinder::new(2 * (num_vars + 1));
    }

    /// One full in-processing round: SCC/equivalent-literal detection
    /// and replacement, failed-literal probing, vivification,
    /// occurrence-based subsumption/strengthening/BVE, gate-based clause
    /// shortening, and XOR recovery from the surviving long clauses.
    /// Every pass is budget-bounded and skipped entirely when its
    /// `Config` toggle is off. Recovered XORs are returned so the
    /// caller can fold them into its own Gaussian block;
    /// their source clauses are marked removed here since the XOR
    /// constraint now subsumes them.
    pub fn run_round(
        &mut self,
        config: &Config,
        asg: &mut AssignStack,
        cdb: &mut ClauseDb,
        proof: &mut Proof,
        rng: &mut Rng,
        state: &mut SolverState,
    ) -> Result<Vec<Xor>, crate::types::SolverError> {
        let base_budget = (1_000_000.0 * config.global_timeout_multiplier) as i64;

        if config.do_extended_scc || config.do_find_and_replace_eq_lits {
            let mut budget = (base_budget as f64 * config.subsumption_time_limit_m) as i64;
            let mut replacer = self.scc.run(asg, &mut budget);
            if replacer.queued_len() == 0 {
                state.bump(Stat::PassTimeout);
            }
            replacer.flush(asg, cdb, proof)?;
            if asg.propagate(cdb).is_some() {
                return Err(crate::types::SolverError::Inconsistent);
            }
        }

        if config.do_probe {
            let mut budget = (base_budget as f64 * config.intree_time_limit_m) as i64;
            let report = probe::probe(asg, cdb, &mut self.cache, proof, rng, &mut budget)?;
            for _ in 0..report.failed {
                state.bump(Stat::Probe);
            }
            for _ in 0..report.hyper_bin_added {
                state.bump(Stat::HyperBin);
            }
            if asg.propagate(cdb).is_some() {
                return Err(crate::types::SolverError::Inconsistent);
            }
        }

        {
            let mut budget = (base_budget as f64 * config.subsume_implicit_time_limit_m) as i64;
            let report = vivify::vivify(asg, cdb, proof, &mut budget);
            for _ in 0..report.clauses_shrunk {
                state.bump(Stat::Vivify);
            }
        }

        if config.do_subsume1 || config.do_var_elim {
            let mut occ = elim::Occurrences::build(cdb, 2 * (asg.num_vars + 1));
            if config.do_subsume1 {
                let mut budget = (base_budget as f64 * config.subsumption_time_limit_m) as i64;
                self.eliminator.subsume(cdb, &mut occ, proof, &mut budget);
            }
            if config.do_var_elim {
                let candidates: Vec<_> = (1..asg.var.len())
                    .filter(|&vi| asg.var[vi].is_active() && asg.var[vi].assign.is_none())
                    .collect();
                for vi in candidates {
                    self.eliminator
                        .try_eliminate_var(vi, asg, cdb, &mut occ, proof, 4);
                    state.bump(Stat::Elimination);
                }
            }
        }

        {
            let mut cf = component::ComponentFinder::new(asg.num_vars);
            let parts = cf.partition(cdb, 1);
            if parts.len() > 1 {
                state.bump(Stat::Component);
            }
        }

        if config.do_gate_find {
            let gates = gate::find_or_gates(cdb, asg.num_vars);
            if !gates.is_empty() {
                gate::simplify_with_gates(cdb, &gates);
            }
        }

        let mut recovered = Vec::new();
        if config.do_find_xors {
            let snapshot: Vec<_> = cdb
                .iter_ids()
                .filter(|&cid| !cdb[cid].is_removed())
                .map(|cid| (cid, cdb[cid].lits.clone()))
                .collect();
            for (xo, cids) in xor::find_xors(&snapshot) {
                for cid in cids {
                    cdb.mark_removed(cid, proof);
                }
                recovered.push(xo);
            }
        }

        if config.do_stamp {
            self.stamp = Stamp::rebuild(asg);
        }

        Ok(recovered)
    }
}
