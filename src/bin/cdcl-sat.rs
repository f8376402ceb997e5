//! Thin CLI front end: reads a DIMACS CNF file, builds a solver, and
//! prints the result in the usual `s SATISFIABLE`/`s UNSATISFIABLE`
//! convention, using a hand-rolled ANSI color helper instead of an
//! external dependency and the 10/20/0 exit-code convention.

use cdcl_sat::config::Config;
use cdcl_sat::types::{CNFDescription, Certificate, Instantiate, Lit};
use cdcl_sat::Solver;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use structopt::StructOpt;

fn colored(s: &str, code: &str) -> String {
    format!("\x1B[{}m{}\x1B[0m", code, s)
}

/// Parses a DIMACS stream, returning the variable count declared by the
/// `p cnf` header (if any) and the clauses as literal vectors.
fn parse_dimacs<R: BufRead>(r: R) -> io::Result<(usize, Vec<Vec<i32>>)> {
    let mut num_vars = 0usize;
    let mut clauses = Vec::new();
    let mut cur: Vec<i32> = Vec::new();

    for line in r.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if line.starts_with('p') {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                num_vars = parts[2].parse().unwrap_or(0);
            }
            continue;
        }
        for tok in line.split_whitespace() {
            let x: i32 = match tok.parse() {
                Ok(x) => x,
                Err(_) => continue,
            };
            if x == 0 {
                clauses.push(std::mem::take(&mut cur));
            } else {
                cur.push(x);
            }
        }
    }
    Ok((num_vars, clauses))
}

fn report(cert: &Result<Certificate, cdcl_sat::SolverError>, num_vars: usize) {
    match cert {
        Ok(Certificate::SAT(model)) => {
            println!("{}", colored("s SATISFIABLE", "1;32"));
            print!("v");
            for vi in 1..=num_vars.min(model.len().saturating_sub(1)) {
                print!(" {}", if model[vi] { vi as i32 } else { -(vi as i32) });
            }
            println!(" 0");
        }
        Ok(Certificate::UNSAT(_)) => println!("{}", colored("s UNSATISFIABLE", "1;31")),
        Err(_) => println!("{}", colored("s UNKNOWN", "1;33")),
    }
}

fn exit_code(cert: &Result<Certificate, cdcl_sat::SolverError>) -> i32 {
    match cert {
        Ok(Certificate::SAT(_)) => 10,
        Ok(Certificate::UNSAT(_)) => 20,
        Err(_) => 0,
    }
}

fn main() {
    let config = Config::from_args();

    let raw: Box<dyn Read> = match &config.cnf_filename {
        Some(path) if path.as_os_str() != "-" => Box::new(File::open(path).unwrap_or_else(|e| {
            eprintln!("c cannot open {:?}: {}", path, e);
            std::process::exit(1);
        })),
        _ => Box::new(io::stdin()),
    };
    let (num_vars, raw_clauses) = parse_dimacs(BufReader::new(raw)).unwrap_or_else(|e| {
        eprintln!("c read error: {}", e);
        std::process::exit(1);
    });

    let cnf = CNFDescription {
        num_of_variables: num_vars,
        num_of_clauses: raw_clauses.len(),
        pathname: config
            .cnf_filename
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string()),
    };

    let mut solver = Solver::instantiate(&config, &cnf);
    for _ in 0..num_vars {
        solver.new_var();
    }

    if config.certify {
        if let Some(path) = &config.proof_filename {
            match File::create(path) {
                Ok(f) => solver = solver.with_proof(f),
                Err(e) => eprintln!("c cannot open proof file {:?}: {}", path, e),
            }
        }
    }

    let mut ok = true;
    for raw in &raw_clauses {
        let lits: Vec<Lit> = raw.iter().map(|&x| Lit::from_int(x)).collect();
        if solver.add_clause(&lits).is_err() {
            ok = false;
            break;
        }
    }

    let result = if ok { solver.solve() } else { Ok(Certificate::UNSAT(Vec::new())) };

    if !config.quiet_mode {
        report(&result, num_vars);
    }

    if let Some(path) = &config.result_filename {
        if let Ok(mut f) = File::create(path) {
            let _ = writeln!(f, "{:?}", result);
        }
    }

    let _ = solver.proof.flush();
    std::process::exit(exit_code(&result));
}
