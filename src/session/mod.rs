pub mod freeze;

use crate::cnf::cnf::Lit;
use crate::engine::dpll::DpllEngine;
use crate::engine::{Engine, EngineStats, SolveResult, Terminate};
use crate::session::freeze::FreezeTable;

/// Exclusively-owned driving context for one engine instance: the clause
/// under construction, the assumptions for the next solve, and the freeze
/// reference counts all live here. Operations must be issued sequentially;
/// distinct sessions are fully independent.
///
/// Queries have validity windows the session does not police: `val` is
/// meaningful only after a satisfiable answer, `failed` only after an
/// unsatisfiable answer for literals that were assumed. Outside those
/// windows the calls are cheap but their results carry no meaning.
pub struct Session {
    engine: Box<dyn Engine>,
    clause: Vec<Lit>,
    assumptions: Vec<Lit>,
    freeze: FreezeTable,
}

impl Session {
    pub fn new() -> Self {
        Self::with_engine(Box::new(DpllEngine::new()))
    }

    pub fn with_engine(engine: Box<dyn Engine>) -> Self {
        Self {
            engine,
            clause: Vec::new(),
            assumptions: Vec::new(),
            freeze: FreezeTable::new(),
        }
    }

    /// Consumes this session and returns a fresh one backed by a blank
    /// engine of the same kind. The clause buffer, assumptions, freeze
    /// counts and terminator binding are all discarded.
    pub fn reset(self) -> Self {
        Self::with_engine(self.engine.fresh())
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Appends one literal to the clause under construction; zero commits
    /// the buffered clause to the engine. All bulk ingestion forms reduce to
    /// this primitive plus a closing zero.
    pub fn add_literal(&mut self, code: i32) {
        if code == 0 {
            let clause = std::mem::take(&mut self.clause);
            self.engine.add_clause(&clause);
        } else {
            self.clause.push(Lit::from_dimacs(code));
        }
    }

    /// Ingests exactly `count` leading entries of `lits`, then closes the
    /// clause. Every entry is forwarded as-is: a zero before the count is
    /// exhausted draws a diagnostic but still reaches the primitive, where
    /// it commits the buffer early and the remaining entries open the next
    /// clause.
    pub fn add_clause_counted(&mut self, count: usize, lits: &[i32]) {
        debug_assert!(lits.len() >= count, "fewer literals than declared");
        for &code in &lits[..count] {
            if code == 0 {
                log::warn!("clause terminated before {count} literals were read");
            }
            self.add_literal(code);
        }
        self.add_literal(0);
    }

    /// Ingests entries of `lits` up to (not including) the first zero, then
    /// closes the clause. The sequence is expected to contain a zero; when
    /// it does not, the scan stops at the end of the slice and the clause is
    /// closed anyway.
    pub fn add_clause_terminated(&mut self, lits: &[i32]) {
        for &code in lits {
            if code == 0 {
                self.add_literal(0);
                return;
            }
            self.add_literal(code);
        }
        log::warn!("no terminating zero before end of literal sequence");
        self.add_literal(0);
    }

    /// Ingests every yielded literal, then closes the clause.
    pub fn add_clause<I>(&mut self, lits: I)
    where
        I: IntoIterator<Item = i32>,
    {
        for code in lits {
            if code == 0 {
                log::warn!("zero literal inside clause input");
            }
            self.add_literal(code);
        }
        self.add_literal(0);
    }

    /// Registers `code` to hold for the next solve only. Repeated calls
    /// accumulate; the whole set is consumed by that solve regardless of its
    /// outcome.
    pub fn assume(&mut self, code: i32) {
        self.assumptions.push(Lit::from_dimacs(code));
    }

    pub fn solve(&mut self) -> SolveResult {
        let assumptions = std::mem::take(&mut self.assumptions);
        self.engine.solve(&assumptions)
    }

    /// `solve`, mapped to 1 / 0 / -1.
    pub fn solve_flag(&mut self) -> i32 {
        self.solve().flag()
    }

    /// Bounded preprocessing over the committed database, without
    /// assumptions. May settle the formula outright.
    pub fn simplify(&mut self) -> SolveResult {
        self.engine.simplify()
    }

    /// The literal's value under the last satisfying assignment: `code` if
    /// true, `-code` if false. Meaningful only after a satisfiable answer;
    /// otherwise returns 0.
    pub fn val(&self, code: i32) -> i32 {
        let lit = Lit::from_dimacs(code);
        match self.engine.model_value(lit.var) {
            Some(value) => {
                if value == lit.sign {
                    code
                } else {
                    -code
                }
            }
            None => 0,
        }
    }

    /// Whether `code` was part of the failed-assumption core of the last
    /// unsatisfiable answer. Meaningful only for literals that were in the
    /// consumed assumption set.
    pub fn failed(&self, code: i32) -> bool {
        self.engine.failed(Lit::from_dimacs(code))
    }

    /// Whether the clause database alone forces `code`: 1 implied true, -1
    /// implied false, 0 unforced. Assumptions never contribute.
    pub fn fixed(&self, code: i32) -> i32 {
        let lit = Lit::from_dimacs(code);
        match self.engine.fixed_value(lit.var) {
            Some(value) if value == lit.sign => 1,
            Some(_) => -1,
            None => 0,
        }
    }

    pub fn freeze(&mut self, code: i32) {
        let var = Lit::from_dimacs(code).var;
        if self.freeze.freeze(var) {
            self.engine.freeze(var);
        }
    }

    pub fn melt(&mut self, code: i32) {
        let var = Lit::from_dimacs(code).var;
        if self.freeze.melt(var) {
            self.engine.melt(var);
        }
    }

    pub fn frozen(&self, code: i32) -> bool {
        self.freeze.frozen(Lit::from_dimacs(code).var)
    }

    pub fn set_option(&mut self, name: &str, value: i64) {
        self.engine.set_option(name, value);
    }

    pub fn get_option(&self, name: &str) -> i64 {
        self.engine.get_option(name)
    }

    pub fn set_limit(&mut self, name: &str, value: i64) {
        self.engine.set_limit(name, value);
    }

    /// Binds a cooperative stop check polled during solve/simplify. A new
    /// binding replaces the old one; there is at most one per session.
    pub fn set_terminate<T: Terminate + 'static>(&mut self, terminator: T) {
        self.engine.connect_terminator(Box::new(terminator));
    }

    /// Removes the binding; solving runs to completion again.
    pub fn clear_terminate(&mut self) {
        self.engine.disconnect_terminator();
    }

    /// One-shot interruption request, independent of any bound predicate:
    /// the next solve or simplify that reaches a checkpoint answers
    /// `Unknown` and consumes the request.
    pub fn terminate(&mut self) {
        self.engine.request_stop();
    }

    pub fn active(&self) -> i64 {
        self.engine.active()
    }

    pub fn irredundant(&self) -> i64 {
        self.engine.irredundant()
    }

    pub fn stats(&self) -> EngineStats {
        self.engine.stats()
    }

    pub fn print_statistics(&self) {
        self.engine.print_statistics();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
