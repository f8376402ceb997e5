//! Running statistics and the progress printer. Grounded on the
//! teacher's `src/state.rs`: an enum of countable events, an EMA block
//! for smoothing, and a one-line-refresh report gated by quiet mode.

use crate::config::Config;
use crate::types::{CNFDescription, Ema, Instantiate};
use chrono::Utc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stat {
    Conflict,
    Decision,
    Propagation,
    Restart,
    BlockRestart,
    Reduction,
    Elimination,
    Probe,
    HyperBin,
    Vivify,
    PassTimeout,
    Component,
    EndOfStatIndex,
}

/// Everything the orchestrator tracks across epochs, plus the wall-clock
/// start time used to honor `Config::max_time`.
pub struct SolverState {
    pub stats: Vec<u64>,
    pub ema_lbd: Ema,
    pub ema_trail: Ema,
    pub start: chrono::DateTime<Utc>,
    pub quiet: bool,
    pub ok: bool,
    pub progress_rows_printed: u32,
}

impl Instantiate for SolverState {
    fn instantiate(config: &Config, _cnf: &CNFDescription) -> SolverState {
        SolverState {
            stats: vec![0; Stat::EndOfStatIndex as usize],
            ema_lbd: Ema::new(1.0 / 32.0),
            ema_trail: Ema::new(1.0 / 32.0),
            start: Utc::now(),
            quiet: config.quiet_mode,
            ok: true,
            progress_rows_printed: 0,
        }
    }
}

impl SolverState {
    pub fn bump(&mut self, s: Stat) {
        self.stats[s as usize] += 1;
    }

    pub fn get(&self, s: Stat) -> u64 {
        self.stats[s as usize]
    }

    pub fn elapsed_secs(&self) -> f64 {
        (Utc::now() - self.start).num_milliseconds() as f64 / 1000.0
    }

    pub fn time_is_up(&self, config: &Config) -> bool {
        config.max_time > 0 && self.elapsed_secs() >= config.max_time as f64
    }

    pub fn progress(&mut self, cdb_len: usize, num_vars: usize, num_assigned: usize) {
        if self.quiet {
            return;
        }
        println!(
            "c {:>8.2}s | conflicts: {:>9} | restarts: {:>7} | vars: {:>7}/{:<7} | clauses: {:>9}",
            self.elapsed_secs(),
            self.get(Stat::Conflict),
            self.get(Stat::Restart),
            num_assigned,
            num_vars,
            cdb_len,
        );
        self.progress_rows_printed += 1;
    }
}
