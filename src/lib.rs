//! A CDCL (Conflict-Driven Clause-Learning) SAT solver with an
//! in-processing simplification pipeline: equivalent-literal detection,
//! failed-literal probing, vivification, occurrence-based subsumption
//! and variable elimination, gate extraction, and XOR recovery with
//! Gaussian elimination, run between search epochs under escalating
//! conflict budgets.
//!
//! The entry points are [`solver::Solver::new_var`],
//! [`solver::Solver::add_clause`], [`solver::Solver::add_xor_clause`],
//! and [`solver::Solver::solve`]. A solver built with
//! [`types::Instantiate::instantiate`] from a [`config::Config`] and a
//! [`types::CNFDescription`] is ready to use immediately; the
//! `cdcl-sat` binary is a thin DIMACS-reading front end over the same
//! API.

#[macro_use]
extern crate bitflags;

pub mod assign;
pub mod cdb;
pub mod conflict;
pub mod config;
pub mod drup;
pub mod processor;
pub mod restart;
pub mod solver;
pub mod stamp;
pub mod state;
pub mod types;
pub mod validator;

pub use config::Config;
pub use solver::Solver;
pub use types::{Certificate, Lit, SolverError, SolverResult, VarId};
