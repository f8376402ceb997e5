//! The top-level orchestrator: owns every component by value rather
//! than behind trait objects, exposes
//! `new_var`/`add_clause`/`add_xor_clause`/`solve`, and alternates
//! search epochs with in-processing rounds under an escalating conflict
//! budget.

use crate::assign::select::{VarOrder, VarReward};
use crate::assign::{AssignStack, PropBy};
use crate::cdb::ClauseDb;
use crate::conflict;
use crate::config::Config;
use crate::drup::Proof;
use crate::processor::renumber::Renumberer;
use crate::processor::xor::{GaussianBlock, Xor};
use crate::processor::Processor;
use crate::restart::Restarter;
use crate::state::{SolverState, Stat};
use crate::types::{
    CNFDescription, Certificate, Instantiate, Lit, MaybeInconsistent, Rng, SolverError, SolverResult, VarId,
};

pub struct Solver {
    pub config: Config,
    pub asg: AssignStack,
    pub cdb: ClauseDb,
    pub proc: Processor,
    pub rst: Restarter,
    pub state: SolverState,
    pub proof: Proof,
    pub rng: Rng,
    pub xors: Vec<Xor>,
    pub assumptions: Vec<Lit>,
    order: VarOrder,
    reward: VarReward,
    interrupt: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

impl Instantiate for Solver {
    fn instantiate(config: &Config, cnf: &CNFDescription) -> Solver {
        Solver {
            config: config.clone(),
            asg: AssignStack::instantiate(config, cnf),
            cdb: ClauseDb::instantiate(config, cnf),
            proc: Processor::new(cnf.num_of_variables),
            rst: Restarter::instantiate(config, cnf),
            state: SolverState::instantiate(config, cnf),
            proof: Proof::disabled(),
            rng: Rng::new(config.orig_seed),
            order: VarOrder::new(cnf.num_of_variables),
            reward: VarReward::new(config),
            xors: Vec::new(),
            assumptions: Vec::new(),
            interrupt: std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }
}

impl Default for Solver {
    fn default() -> Solver {
        Solver::instantiate(&Config::default(), &CNFDescription::default())
    }
}

impl Solver {
    pub fn with_proof<W: std::io::Write + Send + 'static>(mut self, w: W) -> Solver {
        self.proof = Proof::to_writer(w);
        self
    }

    /// A clone of the interrupt flag a caller can set from another
    /// thread to request cancellation as soon as possible.
    pub fn interrupt_handle(&self) -> std::sync::Arc<std::sync::atomic::AtomicBool> {
        self.interrupt.clone()
    }

    pub fn new_var(&mut self) -> VarId {
        self.asg.num_vars += 1;
        let vi = self.asg.num_vars;
        self.asg.grow_to(vi);
        self.proc.grow_to(vi);
        self.order.grow_to(vi);
        vi
    }

    /// Adds a clause, deduping and detecting tautology, then dispatching
    /// by length: empty -> UNSAT, unit -> root enqueue, else -> arena or
    /// implicit watchers.
    pub fn add_clause(&mut self, raw: &[Lit]) -> MaybeInconsistent {
        if !self.state.ok {
            return Err(SolverError::Inconsistent);
        }
        for l in raw {
            if l.vi() == 0 || l.vi() > self.asg.num_vars {
                return Err(SolverError::OutOfRange);
            }
        }
        let mut lits = raw.to_vec();
        lits.sort_unstable();
        lits.dedup();
        if lits.windows(2).any(|w| w[0] == w[1].negate()) {
            return Ok(()); // tautology, drop silently
        }

        let result = match lits.len() {
            0 => Err(SolverError::Inconsistent),
            1 => self.asg.assign_at_rootlevel(lits[0]),
            2 => {
                self.asg.watches.register_binary(lits[0].negate(), lits[1], false);
                self.asg.watches.register_binary(lits[1].negate(), lits[0], false);
                self.proof.add(&lits);
                Ok(())
            }
            3 => {
                self.asg
                    .watches
                    .register_ternary(lits[0].negate(), lits[1], lits[2], false);
                self.asg
                    .watches
                    .register_ternary(lits[1].negate(), lits[0], lits[2], false);
                self.asg
                    .watches
                    .register_ternary(lits[2].negate(), lits[0], lits[1], false);
                self.proof.add(&lits);
                Ok(())
            }
            _ => {
                let cid = self.cdb.new_clause(lits.clone(), false);
                let abst = self.cdb[cid].abstraction;
                self.asg.watches.register_long(lits[0].negate(), cid, lits[1], abst);
                self.asg.watches.register_long(lits[1].negate(), cid, lits[0], abst);
                self.proof.add(&lits);
                Ok(())
            }
        };

        if result.is_err() {
            self.state.ok = false;
        }
        result
    }

    /// Records an XOR constraint (`vars[0] ^ vars[1] ^ ... = rhs`). The
    /// constraint is kept separately and folded into search via
    /// [`Solver::run_gauss`] rather than expanded into `2^(k-1)` clauses
    /// up front.
    pub fn add_xor_clause(&mut self, vars: &[VarId], rhs: bool) -> MaybeInconsistent {
        if !self.state.ok {
            return Err(SolverError::Inconsistent);
        }
        self.xors.push(Xor {
            vars: vars.to_vec(),
            rhs,
        });
        Ok(())
    }

    /// Folds every recorded XOR into a fresh Gaussian block, derives any
    /// unit/binary consequences, and enqueues them at the root. Returns
    /// `Err` on contradiction.
    fn run_gauss(&mut self) -> MaybeInconsistent {
        if self.xors.is_empty() || !self.config.do_echelonize_xor {
            return Ok(());
        }
        let mut block = GaussianBlock::from_xors(&self.xors);
        if !block.echelonize() {
            self.state.ok = false;
            return Err(SolverError::Inconsistent);
        }
        for (lits, rhs) in block.derived_short_rows() {
            match lits.len() {
                0 if !rhs => continue,
                0 => return Err(SolverError::Inconsistent),
                1 => {
                    let l = if rhs { lits[0] } else { lits[0].negate() };
                    self.asg.assign_at_rootlevel(l)?;
                }
                2 => {
                    // rhs=true means exactly one is true, i.e. (a v b) and (!a v !b);
                    // rhs=false means they agree, i.e. (a v !b) and (!a v b).
                    let (a, b) = (lits[0], lits[1]);
                    if rhs {
                        self.add_clause(&[a, b])?;
                        self.add_clause(&[a.negate(), b.negate()])?;
                    } else {
                        self.add_clause(&[a, b.negate()])?;
                        self.add_clause(&[a.negate(), b])?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Finds all negated assumptions reachable from the conflicting
    /// literal. A simplified backward walk over reasons: it collects
    /// every assumption-level literal touched while resolving the
    /// conflict, which is the same data first-UIP analysis already
    /// computes minus the asserting-literal truncation.
    fn final_conflict(&self, confl: PropBy) -> Vec<Lit> {
        let mut seen = vec![false; self.asg.var.len()];
        let mut out = Vec::new();
        let mut frontier = match confl {
            PropBy::Null => Vec::new(),
            PropBy::Clause(cid) => self.cdb[cid].lits.clone(),
            PropBy::Binary { lit, .. } => vec![lit.negate()],
            PropBy::Ternary(a, b) => vec![a.negate(), b.negate()],
        };
        while let Some(lit) = frontier.pop() {
            let vi = lit.vi();
            if seen[vi] || self.asg.level(vi) == 0 {
                continue;
            }
            seen[vi] = true;
            if self.assumptions.contains(&lit.negate()) {
                out.push(lit.negate());
                continue;
            }
            match self.asg.reason(vi) {
                PropBy::Null => {}
                PropBy::Clause(cid) => frontier.extend(self.cdb[cid].lits.iter().copied()),
                PropBy::Binary { lit, .. } => frontier.push(lit.negate()),
                PropBy::Ternary(a, b) => {
                    frontier.push(a.negate());
                    frontier.push(b.negate());
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Runs the solver to completion (or until the interrupt flag fires
    /// / the configured conflict budget is exhausted).
    pub fn solve(&mut self) -> SolverResult {
        if !self.state.ok {
            return Ok(Certificate::UNSAT(Vec::new()));
        }
        if self.asg.propagate(&mut self.cdb).is_some() {
            self.state.ok = false;
            return Ok(Certificate::UNSAT(Vec::new()));
        }
        self.run_gauss()?;

        let mut next_inprocess_at: u64 = 2000;

        loop {
            if self.interrupt.load(std::sync::atomic::Ordering::Relaxed) {
                self.asg.cancel_until(self.asg.root_level);
                return Err(SolverError::TimeOut);
            }
            if self.state.time_is_up(&self.config) {
                self.asg.cancel_until(self.asg.root_level);
                return Err(SolverError::TimeOut);
            }
            if self.config.max_conflicts > 0 && self.asg.conflicts >= self.config.max_conflicts {
                self.asg.cancel_until(self.asg.root_level);
                return Err(SolverError::TimeOut);
            }

            match self.asg.propagate(&mut self.cdb) {
                Some(confl) => {
                    self.state.bump(Stat::Conflict);
                    self.asg.conflicts += 1;

                    if self.asg.decision_level() == 0 {
                        self.state.ok = false;
                        return Ok(Certificate::UNSAT(Vec::new()));
                    }

                    let cache = self.config.do_cache.then_some(&self.proc.cache);
                    let stamp = self.config.do_stamp.then_some(&self.proc.stamp);
                    let (learnt, btlevel) = conflict::analyze(
                        &mut self.asg,
                        &mut self.cdb,
                        &mut self.proof,
                        confl,
                        cache,
                        stamp,
                    );
                    if learnt.is_empty() {
                        self.state.ok = false;
                        return Err(SolverError::NullLearnt);
                    }
                    for &l in &learnt {
                        self.reward.bump(&mut self.asg, &mut self.order, l.vi());
                    }
                    self.reward.decay();

                    if btlevel < self.assumptions.len() {
                        let fc = self.final_conflict(confl);
                        self.asg.cancel_until(self.asg.root_level);
                        return Ok(Certificate::UNSAT(if fc.is_empty() {
                            self.assumptions.clone()
                        } else {
                            fc
                        }));
                    }

                    let glue = ClauseDbGlueHelper::compute(&self.asg, &learnt);
                    self.asg.cancel_until(btlevel);
                    self.attach_learnt(&learnt, glue);
                    self.rst.update_on_conflict(glue, self.asg.len());
                }
                None => {
                    // Eliminated/replaced variables never reach the trail, so
                    // completeness is judged against the active count, not
                    // the total variable count.
                    let num_active = Renumberer::build(&self.asg).num_inner();
                    if self.asg.len() == num_active && self.assumptions.len() <= self.asg.decision_level() {
                        let model = self.extract_model();
                        return Ok(Certificate::SAT(model));
                    }

                    if self.rst.should_restart() {
                        self.rst.fire();
                        self.state.bump(Stat::Restart);
                        self.asg.cancel_until(self.asg.root_level);
                        continue;
                    }

                    if self.asg.conflicts >= next_inprocess_at {
                        next_inprocess_at = self.asg.conflicts + 4000;
                        self.asg.cancel_until(self.asg.root_level);
                        self.inprocess()?;
                        self.state.progress(self.cdb.len(), self.asg.num_vars, self.asg.len());
                    }

                    let level = self.asg.decision_level();
                    if level < self.assumptions.len() {
                        let next = self.assumptions[level];
                        match self.asg.value(next) {
                            Some(false) => {
                                let fc = self.final_conflict(PropBy::binary(next));
                                self.asg.cancel_until(self.asg.root_level);
                                return Ok(Certificate::UNSAT(if fc.is_empty() { vec![next] } else { fc }));
                            }
                            Some(true) => {
                                self.asg.new_decision_level();
                            }
                            None => {
                                self.asg.assign_by_decision(next);
                            }
                        }
                        continue;
                    }

                    self.decide_next()?;
                }
            }
        }
    }

    fn decide_next(&mut self) -> MaybeInconsistent {
        let pick = crate::assign::select::select_decision_literal(
            &self.asg,
            &mut self.order,
            &mut self.rng,
            self.config.random_var_freq,
        );
        match pick {
            None => Ok(()),
            Some(lit) => {
                self.asg.assign_by_decision(lit);
                self.state.bump(Stat::Decision);
                Ok(())
            }
        }
    }

    fn attach_learnt(&mut self, learnt: &[Lit], glue: u32) {
        self.proof.add(learnt);
        match learnt.len() {
            1 => {
                let _ = self.asg.assign_at_rootlevel(learnt[0]);
            }
            2 => {
                self.asg.watches.register_binary(learnt[0].negate(), learnt[1], true);
                self.asg.watches.register_binary(learnt[1].negate(), learnt[0], true);
                self.asg.assign_by_implication(learnt[0], PropBy::binary(learnt[1].negate()));
            }
            3 => {
                self.asg
                    .watches
                    .register_ternary(learnt[0].negate(), learnt[1], learnt[2], true);
                self.asg
                    .watches
                    .register_ternary(learnt[1].negate(), learnt[0], learnt[2], true);
                self.asg
                    .watches
                    .register_ternary(learnt[2].negate(), learnt[0], learnt[1], true);
                self.asg
                    .assign_by_implication(learnt[0], PropBy::Ternary(learnt[1].negate(), learnt[2].negate()));
            }
            _ => {
                let cid = self.cdb.new_clause(learnt.to_vec(), true);
                self.cdb[cid].glue = glue;
                self.cdb.protect_on_glue_improvement(cid, &self.config);
                let abst = self.cdb[cid].abstraction;
                self.asg
                    .watches
                    .register_long(learnt[0].negate(), cid, learnt[1], abst);
                self.asg
                    .watches
                    .register_long(learnt[1].negate(), cid, learnt[0], abst);
                self.asg.assign_by_implication(learnt[0], PropBy::Clause(cid));
            }
        }
    }

    fn inprocess(&mut self) -> MaybeInconsistent {
        let recovered = self.proc.run_round(
            &self.config,
            &mut self.asg,
            &mut self.cdb,
            &mut self.proof,
            &mut self.rng,
            &mut self.state,
        )?;
        if !recovered.is_empty() {
            self.xors.extend(recovered);
            self.run_gauss()?;
        }
        if self.config.max_temporary_learnt_clauses < self.cdb.count_redundant() {
            let locked = |_cid: crate::cdb::ClauseId| false;
            self.cdb.reduce(&self.config, locked, &mut self.proof);
            let cdb = &self.cdb;
            self.asg.watches.clean_removed(|cid| cdb[cid].is_removed());
            self.state.bump(Stat::Reduction);
        }
        Ok(())
    }

    fn extract_model(&mut self) -> Vec<bool> {
        let mut model: Vec<bool> = (0..=self.asg.num_vars)
            .map(|vi| self.asg.var.get(vi).and_then(|v| v.assign).unwrap_or(false))
            .collect();
        self.proc.eliminator.extend_model(&mut model);
        model
    }
}

/// `compute_glue` needs a level-lookup closure borrowing `asg`; this
/// tiny indirection keeps the borrow scoped to one call inside `solve`.
struct ClauseDbGlueHelper;
impl ClauseDbGlueHelper {
    fn compute(asg: &AssignStack, lits: &[Lit]) -> u32 {
        ClauseDb::compute_glue(lits, |l| asg.level(l.vi()))
    }
}

