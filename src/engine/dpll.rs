use indexmap::{IndexMap, IndexSet};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::cnf::cnf::{Cnf, Lit};
use crate::engine::{Engine, EngineStats, SolveResult, Terminate};

/// Search steps between cooperative stop checks.
const POLL_INTERVAL: u64 = 64;

#[derive(Debug, Clone)]
struct ElimRecord {
    sign: bool,
    clauses: Vec<Vec<Lit>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Sat,
    Unsat,
    Stopped,
}

struct SearchCtx {
    steps: u64,
    decisions_left: Option<i64>,
    conflicts_left: Option<i64>,
}

impl SearchCtx {
    fn new(decisions: Option<i64>, conflicts: Option<i64>) -> Self {
        Self {
            steps: 0,
            decisions_left: decisions,
            conflicts_left: conflicts,
        }
    }

    fn unbounded() -> Self {
        Self::new(None, None)
    }

    // false once the budget is exhausted
    fn spend(slot: &mut Option<i64>) -> bool {
        match slot {
            None => true,
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            Some(_) => false,
        }
    }

    fn spend_decision(&mut self) -> bool {
        Self::spend(&mut self.decisions_left)
    }

    fn spend_conflict(&mut self) -> bool {
        Self::spend(&mut self.conflicts_left)
    }
}

/// Incremental engine built on recursive DPLL search. Assumptions are folded
/// into a per-call working formula as unit clauses; preprocessing runs at the
/// root level only and keeps reconstruction records for every variable it
/// eliminates, so clauses can be restored when later input mentions the
/// variable again.
pub struct DpllEngine {
    cnf: Cnf,
    root: Vec<Option<bool>>,
    eliminated: IndexMap<u32, ElimRecord>,
    frozen: IndexSet<u32>,
    inconsistent: bool,
    last_model: Option<Vec<bool>>,
    last_failed: Vec<Lit>,
    options: IndexMap<String, i64>,
    limits: IndexMap<String, i64>,
    terminator: Option<Box<dyn Terminate>>,
    stop_requested: bool,
    rng: ChaCha8Rng,
    stats: EngineStats,
}

impl DpllEngine {
    pub fn new() -> Self {
        let options = [
            ("verbose".to_string(), 0),
            ("seed".to_string(), 0),
            ("randomphase".to_string(), 0),
            ("coremin".to_string(), 1),
        ]
        .into_iter()
        .collect();
        Self {
            cnf: Cnf::new(0),
            root: vec![None],
            eliminated: IndexMap::new(),
            frozen: IndexSet::new(),
            inconsistent: false,
            last_model: None,
            last_failed: Vec::new(),
            options,
            limits: IndexMap::new(),
            terminator: None,
            stop_requested: false,
            rng: ChaCha8Rng::seed_from_u64(0),
            stats: EngineStats::default(),
        }
    }

    fn option_value(&self, name: &str) -> i64 {
        self.options.get(name).copied().unwrap_or(0)
    }

    fn take_limit(&mut self, name: &str) -> Option<i64> {
        self.limits.shift_remove(name).filter(|&n| n >= 0)
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

    /// Brings back every clause stashed for an eliminated variable mentioned
    /// in `lits`, cascading through variables the restored clauses mention.
    fn restore_eliminated(&mut self, lits: &[Lit]) {
        let mut queue = lits
            .iter()
            .map(|l| l.var)
            .filter(|v| self.eliminated.contains_key(v))
            .collect::<Vec<_>>();
        while let Some(var) = queue.pop() {
            let Some(record) = self.eliminated.shift_remove(&var) else {
                continue;
            };
            for clause in &record.clauses {
                for lit in clause {
                    if self.eliminated.contains_key(&lit.var) {
                        queue.push(lit.var);
                    }
                }
            }
            self.cnf.clauses.extend(record.clauses);
        }
        self.stats.eliminated_vars = self.eliminated.len();
    }

    fn sync_var_space(&mut self) {
        let len = self.cnf.num_vars as usize + 1;
        if self.root.len() < len {
            self.root.resize(len, None);
        }
    }

    fn working_formula(&self, assumptions: &[Lit]) -> Cnf {
        let mut work = self.cnf.clone();
        for &a in assumptions {
            work.add_clause(vec![a]);
        }
        work
    }

    fn seed_assignment(&self, work: &Cnf) -> Vec<Option<bool>> {
        let mut assignment = vec![None; work.num_vars as usize + 1];
        for (var, value) in self.root.iter().enumerate() {
            if let Some(v) = value {
                assignment[var] = Some(*v);
            }
        }
        assignment
    }

    fn search(&mut self, work: &Cnf, assignment: &mut [Option<bool>], ctx: &mut SearchCtx) -> Outcome {
        ctx.steps += 1;
        if ctx.steps % POLL_INTERVAL == 0 && self.should_stop() {
            return Outcome::Stopped;
        }

        if !unit_propagate(work, assignment, &mut self.stats.propagations) {
            return self.conflict(ctx);
        }
        match work.eval_formula_partial(assignment) {
            Some(true) => return Outcome::Sat,
            Some(false) => return self.conflict(ctx),
            None => {}
        }

        let Some(var) = first_unassigned(assignment) else {
            return Outcome::Unsat;
        };

        if !ctx.spend_decision() {
            return Outcome::Stopped;
        }
        self.stats.decisions += 1;
        let first = if self.option_value("randomphase") != 0 {
            self.rng.random_bool(0.5)
        } else {
            true
        };

        let mut attempt = assignment.to_vec();
        attempt[var] = Some(first);
        match self.search(work, &mut attempt, ctx) {
            Outcome::Sat => {
                assignment.copy_from_slice(&attempt);
                return Outcome::Sat;
            }
            Outcome::Stopped => return Outcome::Stopped,
            Outcome::Unsat => {}
        }

        let mut attempt = assignment.to_vec();
        attempt[var] = Some(!first);
        match self.search(work, &mut attempt, ctx) {
            Outcome::Sat => {
                assignment.copy_from_slice(&attempt);
                Outcome::Sat
            }
            other => other,
        }
    }

    fn conflict(&mut self, ctx: &mut SearchCtx) -> Outcome {
        self.stats.conflicts += 1;
        if ctx.spend_conflict() {
            Outcome::Unsat
        } else {
            Outcome::Stopped
        }
    }

    fn store_model(&mut self, work: &Cnf, assignment: &[Option<bool>]) {
        let mut model = vec![false; work.num_vars as usize + 1];
        for (var, value) in assignment.iter().enumerate() {
            model[var] = value.unwrap_or(false);
        }
        // eliminated variables take their recorded pure polarity; nothing in
        // the working formula mentions them, so this cannot unsatisfy it
        for (&var, record) in &self.eliminated {
            if (var as usize) < model.len() {
                model[var as usize] = record.sign;
            }
        }
        self.last_model = Some(model);
    }

    /// Deletion minimization: drop any assumption whose removal keeps the
    /// formula unsatisfiable. What remains is still a valid core if the
    /// terminator cuts the loop short.
    fn minimize_core(&mut self, assumptions: &[Lit]) -> Vec<Lit> {
        let mut core = assumptions.to_vec();
        if core.len() <= 1 || self.option_value("coremin") == 0 {
            return core;
        }
        let mut i = 0;
        while i < core.len() {
            if self.should_stop() {
                break;
            }
            let mut trial = core.clone();
            trial.remove(i);
            let work = self.working_formula(&trial);
            let mut assignment = self.seed_assignment(&work);
            let mut ctx = SearchCtx::unbounded();
            match self.search(&work, &mut assignment, &mut ctx) {
                Outcome::Unsat => {
                    core.remove(i);
                }
                Outcome::Sat => i += 1,
                Outcome::Stopped => break,
            }
        }
        core
    }

    fn propagate_from_root(&self) -> Option<Vec<Option<bool>>> {
        let mut assignment = vec![None; self.cnf.num_vars as usize + 1];
        for (var, value) in self.root.iter().enumerate() {
            if var < assignment.len() {
                assignment[var] = *value;
            }
        }
        let mut scratch = 0;
        if unit_propagate(&self.cnf, &mut assignment, &mut scratch) {
            Some(assignment)
        } else {
            None
        }
    }

    /// One pure-literal scan over the current clauses. Returns the first
    /// eliminable variable with its polarity.
    fn find_pure_literal(&self) -> Option<(u32, bool)> {
        let mut polarity: IndexMap<u32, (bool, bool)> = IndexMap::new();
        for clause in &self.cnf.clauses {
            for lit in clause {
                let entry = polarity.entry(lit.var).or_insert((false, false));
                if lit.sign {
                    entry.0 = true;
                } else {
                    entry.1 = true;
                }
            }
        }
        polarity
            .into_iter()
            .find(|&(var, (pos, neg))| pos != neg && !self.frozen.contains(&var))
            .map(|(var, (pos, _))| (var, pos))
    }

    fn eliminate(&mut self, var: u32, sign: bool) {
        let mut stashed = Vec::new();
        self.cnf.clauses.retain_mut(|clause| {
            if clause.iter().any(|l| l.var == var) {
                stashed.push(std::mem::take(clause));
                false
            } else {
                true
            }
        });
        self.eliminated.insert(var, ElimRecord { sign, clauses: stashed });
        self.stats.eliminated_vars = self.eliminated.len();
    }
}

impl Default for DpllEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for DpllEngine {
    fn name(&self) -> &'static str {
        "dpll"
    }

    fn fresh(&self) -> Box<dyn Engine> {
        Box::new(DpllEngine::new())
    }

    fn add_clause(&mut self, clause: &[Lit]) {
        self.last_model = None;
        self.last_failed.clear();
        self.restore_eliminated(clause);
        self.cnf.add_clause(clause.to_vec());
        self.sync_var_space();
    }

    fn solve(&mut self, assumptions: &[Lit]) -> SolveResult {
        self.stats.solve_calls += 1;
        self.last_model = None;
        self.last_failed.clear();

        let decisions = self.take_limit("decisions");
        let conflicts = self.take_limit("conflicts");

        if self.inconsistent {
            return SolveResult::Unsatisfiable;
        }
        // entry checkpoint: a pending stop request or an already-firing
        // predicate aborts before any search work
        if self.should_stop() {
            return SolveResult::Unknown;
        }

        self.restore_eliminated(assumptions);
        let work = self.working_formula(assumptions);
        let mut assignment = self.seed_assignment(&work);
        let mut ctx = SearchCtx::new(decisions, conflicts);

        let result = match self.search(&work, &mut assignment, &mut ctx) {
            Outcome::Sat => {
                self.store_model(&work, &assignment);
                SolveResult::Satisfiable
            }
            Outcome::Unsat => {
                if assumptions.is_empty() {
                    self.inconsistent = true;
                } else {
                    self.last_failed = self.minimize_core(assumptions);
                }
                SolveResult::Unsatisfiable
            }
            Outcome::Stopped => SolveResult::Unknown,
        };
        if self.option_value("verbose") > 0 {
            log::debug!(
                "solve #{} -> {} ({} decisions, {} conflicts)",
                self.stats.solve_calls,
                result,
                self.stats.decisions,
                self.stats.conflicts
            );
        }
        result
    }

    fn simplify(&mut self) -> SolveResult {
        self.stats.simplify_calls += 1;
        self.last_model = None;
        if self.inconsistent {
            return SolveResult::Unsatisfiable;
        }
        if self.should_stop() {
            return SolveResult::Unknown;
        }

        let Some(assignment) = self.propagate_from_root() else {
            self.inconsistent = true;
            return SolveResult::Unsatisfiable;
        };
        for (var, value) in assignment.iter().enumerate() {
            if let Some(v) = value {
                self.root[var] = Some(*v);
            }
        }
        self.stats.fixed_vars = self.root.iter().filter(|v| v.is_some()).count();

        // apply the root assignment: drop satisfied clauses, strip false
        // literals from the rest
        self.cnf.clauses.retain_mut(|clause| {
            match Cnf::eval_clause_partial(clause, &assignment) {
                Some(true) => false,
                _ => {
                    clause.retain(|&lit| Cnf::eval_lit_partial(lit, &assignment).is_none());
                    true
                }
            }
        });

        while let Some((var, sign)) = self.find_pure_literal() {
            if self.should_stop() {
                return SolveResult::Unknown;
            }
            self.eliminate(var, sign);
        }

        if self.cnf.clauses.is_empty() {
            let work = self.cnf.clone();
            let seeded = self.seed_assignment(&work);
            self.store_model(&work, &seeded);
            return SolveResult::Satisfiable;
        }
        SolveResult::Unknown
    }

    fn model_value(&self, var: u32) -> Option<bool> {
        let idx = var as usize;
        self.last_model
            .as_ref()
            .and_then(|m| if idx < m.len() { Some(m[idx]) } else { None })
    }

    fn failed(&self, lit: Lit) -> bool {
        self.last_failed.contains(&lit)
    }

    fn fixed_value(&self, var: u32) -> Option<bool> {
        match self.propagate_from_root() {
            Some(assignment) => assignment.get(var as usize).copied().flatten(),
            None => self.root.get(var as usize).copied().flatten(),
        }
    }

    fn freeze(&mut self, var: u32) {
        self.frozen.insert(var);
    }

    fn melt(&mut self, var: u32) {
        self.frozen.shift_remove(&var);
    }

    fn set_option(&mut self, name: &str, value: i64) {
        if !self.options.contains_key(name) {
            log::debug!("ignoring unknown option {name:?}");
            return;
        }
        self.options.insert(name.to_string(), value);
        if name == "seed" {
            self.rng = ChaCha8Rng::seed_from_u64(value as u64);
        }
    }

    fn get_option(&self, name: &str) -> i64 {
        self.option_value(name)
    }

    fn set_limit(&mut self, name: &str, value: i64) {
        match name {
            "decisions" | "conflicts" => {
                self.limits.insert(name.to_string(), value);
            }
            _ => log::debug!("ignoring unknown limit {name:?}"),
        }
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
        let fixed = self.root.iter().filter(|v| v.is_some()).count();
        self.cnf.num_vars as i64 - fixed as i64 - self.eliminated.len() as i64
    }

    fn irredundant(&self) -> i64 {
        self.cnf.clauses.len() as i64
    }

    fn stats(&self) -> EngineStats {
        self.stats
    }

    fn print_statistics(&self) {
        println!("c --- {} engine statistics ---", self.name());
        println!("c solve calls:        {}", self.stats.solve_calls);
        println!("c simplify calls:     {}", self.stats.simplify_calls);
        println!("c decisions:          {}", self.stats.decisions);
        println!("c propagations:       {}", self.stats.propagations);
        println!("c conflicts:          {}", self.stats.conflicts);
        println!("c fixed variables:    {}", self.stats.fixed_vars);
        println!("c eliminated:         {}", self.eliminated.len());
        println!("c active variables:   {}", self.active());
        println!("c irredundant:        {}", self.irredundant());
    }
}

fn unit_propagate(cnf: &Cnf, assignment: &mut [Option<bool>], props: &mut usize) -> bool {
    loop {
        let mut changed = false;

        for clause in &cnf.clauses {
            let mut open_count = 0usize;
            let mut last_open = Lit::new(0, true);
            let mut has_true = false;

            for &lit in clause {
                match Cnf::eval_lit_partial(lit, assignment) {
                    Some(true) => {
                        has_true = true;
                        break;
                    }
                    Some(false) => {}
                    None => {
                        open_count += 1;
                        last_open = lit;
                    }
                }
            }

            if has_true {
                continue;
            }
            if open_count == 0 {
                return false;
            }
            if open_count == 1 {
                let var = last_open.var as usize;
                let need = last_open.sign;
                match assignment[var] {
                    Some(v) if v != need => return false,
                    Some(_) => {}
                    None => {
                        assignment[var] = Some(need);
                        *props += 1;
                        changed = true;
                    }
                }
            }
        }

        if !changed {
            return true;
        }
    }
}

fn first_unassigned(assignment: &[Option<bool>]) -> Option<usize> {
    (1..assignment.len()).find(|&i| assignment[i].is_none())
}
