use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, ValueEnum};

use incrsat::cnf::dimacs::load_cnf;
use incrsat::engine::dpll::DpllEngine;
use incrsat::engine::varisat::VarisatEngine;
use incrsat::{Engine, Session, SolveResult};

#[derive(Parser, Debug)]
#[command(name = "incrsat")]
#[command(about = "Incremental SAT front-end")]
struct Cli {
    /// DIMACS CNF input file
    cnf: String,
    /// Literal assumed true for this solve (repeatable)
    #[arg(long = "assume")]
    assume: Vec<i32>,
    #[arg(long, value_enum, default_value = "dpll")]
    engine: EngineChoice,
    /// Run bounded preprocessing before solving
    #[arg(long)]
    simplify: bool,
    /// Decision budget for the solve
    #[arg(long)]
    decisions: Option<i64>,
    /// Conflict budget for the solve
    #[arg(long)]
    conflicts: Option<i64>,
    /// Wall-clock budget in milliseconds, enforced through the
    /// cooperative-stop binding
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Print engine statistics after solving
    #[arg(long)]
    stats: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum EngineChoice {
    Dpll,
    Varisat,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let engine: Box<dyn Engine> = match cli.engine {
        EngineChoice::Dpll => Box::new(DpllEngine::new()),
        EngineChoice::Varisat => Box::new(VarisatEngine::new()),
    };
    let mut session = Session::with_engine(engine);

    let cnf = load_cnf(&cli.cnf)?;
    let num_vars = cnf.num_vars;
    for clause in &cnf.clauses {
        session.add_clause(clause.iter().map(|l| l.to_dimacs()));
    }

    println!("c {}", incrsat::signature());
    println!("c engine: {}", session.engine_name());
    println!("c vars: {} clauses: {}", num_vars, session.irredundant());

    if let Some(n) = cli.decisions {
        session.set_limit("decisions", n);
    }
    if let Some(n) = cli.conflicts {
        session.set_limit("conflicts", n);
    }
    if let Some(ms) = cli.timeout_ms {
        let deadline = Instant::now() + Duration::from_millis(ms);
        session.set_terminate(move || Instant::now() >= deadline);
    }

    if cli.simplify {
        let outcome = session.simplify();
        println!("c simplify: {}", outcome);
    }

    for &code in &cli.assume {
        session.assume(code);
    }
    let result = session.solve();
    println!("s {}", result);

    match result {
        SolveResult::Satisfiable => {
            let values = (1..=num_vars as i32)
                .map(|v| session.val(v).to_string())
                .collect::<Vec<_>>();
            println!("v {} 0", values.join(" "));
        }
        SolveResult::Unsatisfiable => {
            let failed = cli
                .assume
                .iter()
                .copied()
                .filter(|&a| session.failed(a))
                .map(|a| a.to_string())
                .collect::<Vec<_>>();
            if !failed.is_empty() {
                println!("c failed assumptions: {}", failed.join(" "));
            }
        }
        SolveResult::Unknown => {}
    }

    if cli.stats {
        session.print_statistics();
    }
    Ok(())
}
