//! Restart policy selection and the EMA bookkeeping it runs on, using
//! the `Ema`/`Ema2` structs defined in [`crate::types`] across the four
//! restart modes named in the configuration surface.

use crate::config::Config;
use crate::types::{Ema2, Instantiate};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartMode {
    Glue,
    Luby,
    Geometric,
    Never,
}

impl RestartMode {
    fn from_str(s: &str) -> RestartMode {
        match s {
            "luby" => RestartMode::Luby,
            "geometric" => RestartMode::Geometric,
            "never" => RestartMode::Never,
            _ => RestartMode::Glue,
        }
    }
}

fn luby(inc: f64, mut i: u64) -> f64 {
    // Standard Luby sequence: 1 1 2 1 1 2 4 1 1 2 1 1 2 4 8 ...
    let mut size = 1u64;
    let mut seq = 0u32;
    while size < i + 1 {
        seq += 1;
        size = 2 * size + 1;
    }
    while size - 1 != i {
        size = (size - 1) / 2;
        seq -= 1;
        i %= size;
    }
    inc.powi(seq as i32)
}

/// Tracks glue/trail trends and decides when to fire a restart.
pub struct Restarter {
    pub mode: RestartMode,
    pub glue: Ema2,
    pub trail: Ema2,
    pub restart_first: u64,
    pub restart_inc: f64,
    pub blocking_multip: f64,
    pub luby_index: u64,
    pub conflicts_since_restart: u64,
    pub cur_restart_budget: f64,
    pub num_restarts: u64,
    pub num_blocked: u64,
}

impl Instantiate for Restarter {
    fn instantiate(config: &Config, _cnf: &crate::types::CNFDescription) -> Restarter {
        Restarter {
            mode: RestartMode::from_str(&config.restart_type),
            glue: Ema2::new(1.0 / 32.0, 1.0 / 4096.0),
            trail: Ema2::new(1.0 / 32.0, 1.0 / 4096.0),
            restart_first: config.restart_first,
            restart_inc: config.restart_inc,
            blocking_multip: config.blocking_restart_multip,
            luby_index: 0,
            conflicts_since_restart: 0,
            cur_restart_budget: config.restart_first as f64,
            num_restarts: 0,
            num_blocked: 0,
        }
    }
}

impl Restarter {
    pub fn update_on_conflict(&mut self, glue: u32, trail_len: usize) {
        self.glue.update(glue as f64);
        self.trail.update(trail_len as f64);
        self.conflicts_since_restart += 1;
    }

    /// Decides whether to fire now. Blocking restart suppresses a
    /// would-be restart when the trail is unusually long relative to its
    /// own long-window mean, on the theory that the search is making
    /// real progress and shouldn't be thrown away.
    pub fn should_restart(&mut self) -> bool {
        if self.mode == RestartMode::Never {
            return false;
        }
        let blocked = self.trail.get() > self.blocking_multip * self.trail_slow_estimate();
        match self.mode {
            RestartMode::Glue => {
                let fire = self.glue.trend() > 0.8_f64.recip() || self.glue.get() > 1.25 * self.glue_slow_estimate();
                if fire && blocked {
                    self.num_blocked += 1;
                    false
                } else {
                    fire
                }
            }
            RestartMode::Luby => {
                let budget = self.restart_first as f64 * luby(self.restart_inc, self.luby_index);
                (self.conflicts_since_restart as f64) > budget
            }
            RestartMode::Geometric => (self.conflicts_since_restart as f64) > self.cur_restart_budget,
            RestartMode::Never => false,
        }
    }

    fn glue_slow_estimate(&self) -> f64 {
        self.glue.get() / self.glue.trend().max(0.01)
    }

    fn trail_slow_estimate(&self) -> f64 {
        self.trail.get() / self.trail.trend().max(0.01)
    }

    pub fn fire(&mut self) {
        self.num_restarts += 1;
        self.conflicts_since_restart = 0;
        match self.mode {
            RestartMode::Luby => self.luby_index += 1,
            RestartMode::Geometric => self.cur_restart_budget *= self.restart_inc,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luby_matches_known_prefix() {
        let expected = [1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 4.0, 1.0];
        for (i, &e) in expected.iter().enumerate() {
            assert_eq!(luby(2.0, i as u64), e);
        }
    }

    #[test]
    fn geometric_mode_grows_its_budget_after_each_restart() {
        let cfg = Config {
            restart_type: "geometric".to_string(),
            restart_first: 100,
            restart_inc: 2.0,
            ..Config::default()
        };
        let mut r = Restarter::instantiate(&cfg, &crate::types::CNFDescription::default());
        let before = r.cur_restart_budget;
        r.fire();
        assert_eq!(r.cur_restart_budget, before * 2.0);
    }
}
