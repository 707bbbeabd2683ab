use std::time::{Duration, Instant};

use incrsat::{Session, SolveResult};

// Pigeonhole instance: holes + 1 pigeons into the given number of holes.
// Unsatisfiable, and far beyond what plain search finishes quickly.
fn pigeonhole(session: &mut Session, holes: i32) {
    let var = |pigeon: i32, hole: i32| pigeon * holes + hole;
    for pigeon in 0..=holes {
        session.add_clause((1..=holes).map(|hole| var(pigeon, hole)));
    }
    for hole in 1..=holes {
        for a in 0..holes {
            for b in (a + 1)..=holes {
                session.add_clause([-var(a, hole), -var(b, hole)]);
            }
        }
    }
}

#[test]
fn always_stop_predicate_yields_unknown() {
    let mut sat = Session::new();
    sat.add_clause([1, 2]);
    sat.add_clause([-1, 2]);
    sat.set_terminate(|| true);
    assert_eq!(sat.solve(), SolveResult::Unknown);

    let mut unsat = Session::new();
    unsat.add_clause([1]);
    unsat.add_clause([-1]);
    unsat.set_terminate(|| true);
    assert_eq!(unsat.solve(), SolveResult::Unknown);
}

#[test]
fn clearing_the_binding_restores_definite_answers() {
    let mut session = Session::new();
    session.add_clause([1, 2]);
    session.set_terminate(|| true);
    assert_eq!(session.solve(), SolveResult::Unknown);
    session.clear_terminate();
    assert_eq!(session.solve(), SolveResult::Satisfiable);
}

#[test]
fn binding_a_new_predicate_replaces_the_old_one() {
    let mut session = Session::new();
    session.add_clause([1]);
    session.set_terminate(|| true);
    session.set_terminate(|| false);
    assert_eq!(session.solve(), SolveResult::Satisfiable);
}

#[test]
fn predicate_state_lives_in_the_closure() {
    let mut session = Session::new();
    session.add_clause([1, 2]);
    let mut calls = 0u64;
    session.set_terminate(move || {
        calls += 1;
        calls > 1_000_000
    });
    // the counter never reaches the threshold on a formula this small
    assert_eq!(session.solve(), SolveResult::Satisfiable);
}

#[test]
fn deadline_predicate_interrupts_a_long_solve() {
    let mut session = Session::new();
    pigeonhole(&mut session, 6);
    let deadline = Instant::now() + Duration::from_millis(10);
    session.set_terminate(move || Instant::now() >= deadline);
    assert_eq!(session.solve(), SolveResult::Unknown);
}

#[test]
fn one_shot_stop_interrupts_the_next_solve_only() {
    let mut session = Session::new();
    session.add_clause([1, 2]);
    session.terminate();
    assert_eq!(session.solve(), SolveResult::Unknown);
    assert_eq!(session.solve(), SolveResult::Satisfiable);
}

#[test]
fn one_shot_stop_applies_to_simplify_too() {
    let mut session = Session::new();
    session.add_clause([1]);
    session.terminate();
    assert_eq!(session.simplify(), SolveResult::Unknown);
    assert_eq!(session.simplify(), SolveResult::Satisfiable);
}

#[test]
fn decision_limit_exhaustion_is_inconclusive() {
    let mut session = Session::new();
    session.add_clause([1, 2]);
    session.add_clause([-1, -2]);
    session.set_limit("decisions", 0);
    assert_eq!(session.solve(), SolveResult::Unknown);
    // the limit applied to that solve only
    assert_eq!(session.solve(), SolveResult::Satisfiable);
}

#[test]
fn conflict_limit_exhaustion_is_inconclusive() {
    let mut session = Session::new();
    session.add_clause([1, 2]);
    session.add_clause([1, -2]);
    session.add_clause([-1, 2]);
    session.add_clause([-1, -2]);
    session.set_limit("conflicts", 0);
    assert_eq!(session.solve(), SolveResult::Unknown);
    assert_eq!(session.solve(), SolveResult::Unsatisfiable);
}
