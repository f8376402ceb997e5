//! Solver configuration, parsed either from the command line (via
//! `structopt`) or built directly with [`Config::default`] for library
//! use. Fields are grouped by concern: I/O, branching, restarts, clause-DB maintenance, in-processing toggles, and budgets.

use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Clone, Debug, StructOpt)]
#[structopt(name = "cdcl-sat", about = "A CDCL SAT solver")]
pub struct Config {
    /// CNF file to read, `-` or omitted means stdin.
    #[structopt(parse(from_os_str))]
    pub cnf_filename: Option<PathBuf>,

    /// Where to write the DRUP proof, if `--certify` is set.
    #[structopt(long = "proof", parse(from_os_str))]
    pub proof_filename: Option<PathBuf>,

    #[structopt(long = "certify")]
    pub certify: bool,

    #[structopt(long = "quiet")]
    pub quiet_mode: bool,

    // --- activity / branching -------------------------------------
    #[structopt(long, default_value = "0.8")]
    pub var_decay_start: f64,
    #[structopt(long, default_value = "0.95")]
    pub var_decay_max: f64,
    #[structopt(long, default_value = "1.0")]
    pub var_inc_start: f64,
    #[structopt(long, default_value = "0.01")]
    pub random_var_freq: f64,
    #[structopt(long, default_value = "automatic")]
    pub polarity_mode: String,

    // --- restarts ----------------------------------------------------
    #[structopt(long, default_value = "glue")]
    pub restart_type: String,
    #[structopt(long, default_value = "100")]
    pub restart_first: u64,
    #[structopt(long, default_value = "1.5")]
    pub restart_inc: f64,
    #[structopt(long, default_value = "50")]
    pub burst_search_len: u64,
    #[structopt(long, default_value = "1.4")]
    pub blocking_restart_multip: f64,

    // --- clause database ----------------------------------------------
    #[structopt(long, default_value = "0.24,0.48,0.28")]
    pub ratio_keep_clauses: String,
    #[structopt(long, default_value = "2")]
    pub glue_must_keep_clause_if_below_or_eq: u32,
    #[structopt(long, default_value = "20000")]
    pub max_temporary_learnt_clauses: usize,
    #[structopt(long, default_value = "1.3")]
    pub inc_max_temp_red_cls: f64,

    // --- in-processing toggles ------------------------------------
    #[structopt(long)]
    pub do_probe: bool,
    #[structopt(long)]
    pub do_cache: bool,
    #[structopt(long)]
    pub do_stamp: bool,
    #[structopt(long)]
    pub do_find_xors: bool,
    #[structopt(long)]
    pub do_echelonize_xor: bool,
    #[structopt(long)]
    pub do_find_and_replace_eq_lits: bool,
    #[structopt(long)]
    pub do_extended_scc: bool,
    #[structopt(long)]
    pub do_var_elim: bool,
    #[structopt(long)]
    pub do_subsume1: bool,
    #[structopt(long)]
    pub do_gate_find: bool,
    #[structopt(long)]
    pub do_bounded_variable_addition: bool,

    // --- time / budget ----------------------------------------------
    #[structopt(long, default_value = "1.0")]
    pub xor_finder_time_limit_m: f64,
    #[structopt(long, default_value = "1.0")]
    pub subsumption_time_limit_m: f64,
    #[structopt(long, default_value = "1.0")]
    pub intree_time_limit_m: f64,
    #[structopt(long, default_value = "1.0")]
    pub subsume_implicit_time_limit_m: f64,
    #[structopt(long, default_value = "1.0")]
    pub global_timeout_multiplier: f64,
    #[structopt(long, default_value = "0")]
    pub max_time: u64,
    #[structopt(long, default_value = "0")]
    pub max_conflicts: u64,

    #[structopt(long, default_value = "0")]
    pub orig_seed: u64,

    #[structopt(long, parse(from_os_str))]
    pub output_dirname: Option<PathBuf>,
    #[structopt(long, parse(from_os_str))]
    pub result_filename: Option<PathBuf>,
    #[structopt(long)]
    pub use_log: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            cnf_filename: None,
            proof_filename: None,
            certify: false,
            quiet_mode: true,
            var_decay_start: 0.8,
            var_decay_max: 0.95,
            var_inc_start: 1.0,
            random_var_freq: 0.01,
            polarity_mode: "automatic".to_string(),
            restart_type: "glue".to_string(),
            restart_first: 100,
            restart_inc: 1.5,
            burst_search_len: 50,
            blocking_restart_multip: 1.4,
            ratio_keep_clauses: "0.24,0.48,0.28".to_string(),
            glue_must_keep_clause_if_below_or_eq: 2,
            max_temporary_learnt_clauses: 20_000,
            inc_max_temp_red_cls: 1.3,
            do_probe: true,
            do_cache: true,
            do_stamp: true,
            do_find_xors: true,
            do_echelonize_xor: true,
            do_find_and_replace_eq_lits: true,
            do_extended_scc: true,
            do_var_elim: true,
            do_subsume1: true,
            do_gate_find: true,
            do_bounded_variable_addition: false,
            xor_finder_time_limit_m: 1.0,
            subsumption_time_limit_m: 1.0,
            intree_time_limit_m: 1.0,
            subsume_implicit_time_limit_m: 1.0,
            global_timeout_multiplier: 1.0,
            max_time: 0,
            max_conflicts: 0,
            orig_seed: 0,
            output_dirname: None,
            result_filename: None,
            use_log: false,
        }
    }
}

impl Config {
    /// Parses `ratio_keep_clauses` into its three weights, falling back
    /// to the default split if malformed.
    pub fn keep_ratios(&self) -> (f64, f64, f64) {
        let parts: Vec<f64> = self
            .ratio_keep_clauses
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        if parts.len() == 3 {
            (parts[0], parts[1], parts[2])
        } else {
            (0.24, 0.48, 0.28)
        }
    }
}

impl<T> From<T> for Config
where
    PathBuf: From<T>,
{
    fn from(path: T) -> Config {
        Config {
            cnf_filename: Some(PathBuf::from(path)),
            ..Config::default()
        }
    }
}
