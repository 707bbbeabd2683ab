pub mod dpll;
pub mod varisat;

use std::fmt;

use crate::cnf::cnf::Lit;

/// Outcome of a solve or simplify attempt. `Unknown` means the attempt was
/// interrupted or ran out of its budget, not that the engine failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    Satisfiable,
    Unsatisfiable,
    Unknown,
}

impl SolveResult {
    /// The classic solver exit codes: 10 / 20 / 0.
    pub fn raw_code(self) -> i32 {
        match self {
            SolveResult::Satisfiable => 10,
            SolveResult::Unsatisfiable => 20,
            SolveResult::Unknown => 0,
        }
    }

    /// Boolean-style mapping: 1 / 0 / -1.
    pub fn flag(self) -> i32 {
        match self {
            SolveResult::Satisfiable => 1,
            SolveResult::Unsatisfiable => 0,
            SolveResult::Unknown => -1,
        }
    }
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveResult::Satisfiable => "SATISFIABLE",
            SolveResult::Unsatisfiable => "UNSATISFIABLE",
            SolveResult::Unknown => "UNKNOWN",
        };
        write!(f, "{name}")
    }
}

/// Cooperative stop check, polled synchronously at checkpoints inside
/// solve/simplify on the calling thread. Any `FnMut() -> bool` closure works;
/// captured state plays the role of an external context pointer.
pub trait Terminate {
    fn should_stop(&mut self) -> bool;
}

impl<F: FnMut() -> bool> Terminate for F {
    fn should_stop(&mut self) -> bool {
        self()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub solve_calls: usize,
    pub simplify_calls: usize,
    pub decisions: usize,
    pub propagations: usize,
    pub conflicts: usize,
    pub fixed_vars: usize,
    pub eliminated_vars: usize,
}

/// The decision procedure behind a session. Sessions own exactly one engine
/// and drive it sequentially; everything an engine exposes goes through this
/// trait so backends stay swappable.
pub trait Engine {
    fn name(&self) -> &'static str;

    /// A blank engine of the same kind, used when a session is reset.
    fn fresh(&self) -> Box<dyn Engine>;

    fn add_clause(&mut self, clause: &[Lit]);
    fn solve(&mut self, assumptions: &[Lit]) -> SolveResult;
    fn simplify(&mut self) -> SolveResult;

    /// Value of `var` under the last satisfying assignment, if one exists.
    fn model_value(&self, var: u32) -> Option<bool>;
    /// Whether `lit` is part of the failed-assumption core of the last
    /// unsatisfiable answer.
    fn failed(&self, lit: Lit) -> bool;
    /// Value forced on `var` by the clause database alone, ignoring
    /// assumptions.
    fn fixed_value(&self, var: u32) -> Option<bool>;

    fn freeze(&mut self, var: u32);
    fn melt(&mut self, var: u32);

    fn set_option(&mut self, name: &str, value: i64);
    fn get_option(&self, name: &str) -> i64;
    /// Limits apply to the next solve only, then clear.
    fn set_limit(&mut self, name: &str, value: i64);

    fn connect_terminator(&mut self, terminator: Box<dyn Terminate>);
    fn disconnect_terminator(&mut self);
    /// One-shot stop request, consumed by the next attempt that observes it.
    fn request_stop(&mut self);

    /// Variables neither fixed at root level nor eliminated.
    fn active(&self) -> i64;
    /// Original clauses still present in the database.
    fn irredundant(&self) -> i64;
    fn stats(&self) -> EngineStats;
    fn print_statistics(&self);
}
