use indexmap::IndexMap;
use varisat::ExtendFormula;

use crate::cnf::cnf::Lit;
use crate::engine::{Engine, EngineStats, SolveResult, Terminate};

/// Engine backed by the varisat crate. The backend performs no variable
/// elimination, so freeze/melt are inert, and it exposes no in-search
/// checkpoint, so the terminator is honored at solve entry only.
pub struct VarisatEngine {
    inner: varisat::Solver<'static>,
    vars: Vec<varisat::Var>,
    last_model: Option<Vec<varisat::Lit>>,
    last_failed: Vec<Lit>,
    units: IndexMap<u32, bool>,
    clause_count: i64,
    terminator: Option<Box<dyn Terminate>>,
    stop_requested: bool,
    stats: EngineStats,
}

impl VarisatEngine {
    pub fn new() -> Self {
        Self {
            inner: varisat::Solver::new(),
            vars: Vec::new(),
            last_model: None,
            last_failed: Vec::new(),
            units: IndexMap::new(),
            clause_count: 0,
            terminator: None,
            stop_requested: false,
            stats: EngineStats::default(),
        }
    }

    fn ensure_vars(&mut self, var: u32) {
        while (self.vars.len() as u32) < var {
            let v = self.inner.new_var();
            self.vars.push(v);
        }
    }

    fn to_var(&self, v: u32) -> Option<varisat::Var> {
        if v == 0 {
            return None;
        }
        self.vars.get(v as usize - 1).copied()
    }

    fn to_lit(&self, lit: Lit) -> Option<varisat::Lit> {
        let var = self.to_var(lit.var)?;
        Some(varisat::Lit::from_var(var, lit.sign))
    }

    fn from_lit(&self, lit: varisat::Lit) -> Lit {
        Lit::new(lit.var().index() as u32 + 1, lit.is_positive())
    }

    fn should_stop(&mut self) -> bool {
        if self.stop_requested {
            self.stop_requested = false;
            return true;
        }
        if let Some(t) = self.terminator.as_mut() {
            if t.should_stop() {
                return true;
            }
        }
        false
    }
}

impl Default for VarisatEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for VarisatEngine {
    fn name(&self) -> &'static str {
        "varisat"
    }

    fn fresh(&self) -> Box<dyn Engine> {
        Box::new(VarisatEngine::new())
    }

    fn add_clause(&mut self, clause: &[Lit]) {
        self.last_model = None;
        self.last_failed.clear();
        for lit in clause {
            self.ensure_vars(lit.var);
        }
        let lits = clause
            .iter()
            .filter_map(|&x| self.to_lit(x))
            .collect::<Vec<_>>();
        self.inner.add_clause(&lits);
        self.clause_count += 1;
        if let [only] = clause {
            self.units.insert(only.var, only.sign);
        }
    }

    fn solve(&mut self, assumptions: &[Lit]) -> SolveResult {
        self.stats.solve_calls += 1;
        self.last_model = None;
        self.last_failed.clear();
        if self.should_stop() {
            return SolveResult::Unknown;
        }

        for lit in assumptions {
            self.ensure_vars(lit.var);
        }
        let assumps = assumptions
            .iter()
            .filter_map(|&x| self.to_lit(x))
            .collect::<Vec<_>>();
        // assume() replaces the previous assumption set, so an empty call
        // also clears whatever the last solve used
        self.inner.assume(&assumps);
        match self.inner.solve() {
            Ok(true) => {
                self.last_model = self.inner.model();
                SolveResult::Satisfiable
            }
            Ok(false) => {
                if let Some(core) = self.inner.failed_core() {
                    self.last_failed = core.iter().map(|&l| self.from_lit(l)).collect();
                }
                SolveResult::Unsatisfiable
            }
            Err(err) => {
                log::debug!("backend error treated as inconclusive: {err}");
                SolveResult::Unknown
            }
        }
    }

    fn simplify(&mut self) -> SolveResult {
        self.stats.simplify_calls += 1;
        SolveResult::Unknown
    }

    fn model_value(&self, var: u32) -> Option<bool> {
        let v = self.to_var(var)?;
        let model = self.last_model.as_ref()?;
        let pos = v.lit(true);
        let neg = v.lit(false);
        if model.contains(&pos) {
            Some(true)
        } else if model.contains(&neg) {
            Some(false)
        } else {
            None
        }
    }

    fn failed(&self, lit: Lit) -> bool {
        self.last_failed.contains(&lit)
    }

    fn fixed_value(&self, var: u32) -> Option<bool> {
        self.units.get(&var).copied()
    }

    fn freeze(&mut self, _var: u32) {}

    fn melt(&mut self, _var: u32) {}

    fn set_option(&mut self, name: &str, _value: i64) {
        log::debug!("ignoring option {name:?}: backend exposes none");
    }

    fn get_option(&self, _name: &str) -> i64 {
        0
    }

    fn set_limit(&mut self, name: &str, _value: i64) {
        log::debug!("ignoring limit {name:?}: backend exposes none");
    }

    fn connect_terminator(&mut self, terminator: Box<dyn Terminate>) {
        self.terminator = Some(terminator);
    }

    fn disconnect_terminator(&mut self) {
        self.terminator = None;
    }

    fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    fn active(&self) -> i64 {
        self.vars.len() as i64 - self.units.len() as i64
    }

    fn irredundant(&self) -> i64 {
        self.clause_count
    }

    fn stats(&self) -> EngineStats {
        self.stats
    }

    fn print_statistics(&self) {
        println!("c --- {} engine statistics ---", self.name());
        println!("c solve calls:        {}", self.stats.solve_calls);
        println!("c simplify calls:     {}", self.stats.simplify_calls);
        println!("c active variables:   {}", self.active());
        println!("c irredundant:        {}", self.irredundant());
    }
}
