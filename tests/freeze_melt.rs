use incrsat::{Session, SolveResult};

#[test]
fn refcount_tracks_net_freezes() {
    let mut session = Session::new();
    session.add_clause([3, 4]);
    session.freeze(3);
    session.freeze(3);
    session.melt(3);
    assert!(session.frozen(3));
    session.melt(3);
    assert!(!session.frozen(3));
}

#[test]
fn freezing_by_either_polarity_targets_the_variable() {
    let mut session = Session::new();
    session.freeze(-5);
    assert!(session.frozen(5));
    assert!(session.frozen(-5));
    session.melt(5);
    assert!(!session.frozen(5));
}

#[test]
fn frozen_variables_survive_preprocessing() {
    // 2 occurs only positively, a prime elimination candidate
    let mut session = Session::new();
    session.add_clause([1, 2]);
    session.add_clause([-1, 2]);
    session.freeze(2);
    assert_eq!(session.simplify(), SolveResult::Unknown);
    assert_eq!(session.active(), 2);
    assert_eq!(session.irredundant(), 2);
    assert_eq!(session.solve(), SolveResult::Satisfiable);
    // 2 is true in every model of this formula
    assert_eq!(session.val(2), 2);
}

#[test]
fn melting_reenables_elimination() {
    let mut session = Session::new();
    session.add_clause([1, 2]);
    session.add_clause([-1, 2]);
    session.freeze(2);
    assert_eq!(session.simplify(), SolveResult::Unknown);
    assert_eq!(session.active(), 2);

    session.melt(2);
    assert_eq!(session.simplify(), SolveResult::Satisfiable);
    assert_eq!(session.active(), 1);
    assert_eq!(session.irredundant(), 0);
    assert_eq!(session.val(2), 2);
}

#[test]
fn frozen_value_queryable_after_preprocessing_and_solve() {
    let mut session = Session::new();
    session.add_clause([1, 2]);
    session.add_clause([-1, 2]);
    session.freeze(2);
    let _ = session.simplify();
    assert_eq!(session.solve(), SolveResult::Satisfiable);
    assert_eq!(session.val(2), 2);
    session.melt(2);
    assert!(!session.frozen(2));
}

#[test]
fn adding_over_an_eliminated_variable_stays_sound() {
    let mut session = Session::new();
    session.add_clause([1, 2]);
    session.add_clause([-1, 2]);
    // unfrozen, 2 is eliminated and both clauses leave the database
    assert_eq!(session.simplify(), SolveResult::Satisfiable);
    assert_eq!(session.irredundant(), 0);

    // constraining 2 the other way must bring those clauses back
    session.add_clause([-2]);
    assert_eq!(session.solve(), SolveResult::Unsatisfiable);
}

#[test]
fn assuming_an_eliminated_variable_stays_sound() {
    let mut session = Session::new();
    session.add_clause([1, 2]);
    session.add_clause([-1, 2]);
    assert_eq!(session.simplify(), SolveResult::Satisfiable);

    session.assume(-2);
    assert_eq!(session.solve(), SolveResult::Unsatisfiable);
    assert!(session.failed(-2));

    session.assume(2);
    assert_eq!(session.solve(), SolveResult::Satisfiable);
}
