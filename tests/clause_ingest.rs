use incrsat::{Session, SolveResult};
use proptest::prelude::*;

// Drives vars 1..=n to the polarities in `mask` through assumptions, so a
// solve answers exactly whether the committed clauses allow that assignment.
fn solve_under_mask(session: &mut Session, n: i32, mask: u32) -> SolveResult {
    for v in 1..=n {
        let positive = (mask >> (v - 1)) & 1 == 1;
        session.assume(if positive { v } else { -v });
    }
    session.solve()
}

fn clause_satisfied(codes: &[i32], mask: u32) -> bool {
    codes
        .iter()
        .any(|&c| ((mask >> (c.abs() - 1)) & 1 == 1) == (c > 0))
}

#[test]
fn all_ingestion_shapes_commit_the_same_clause() {
    let codes = [1, -2, 3];

    let mut by_literal = Session::new();
    for &c in &codes {
        by_literal.add_literal(c);
    }
    by_literal.add_literal(0);

    let mut counted = Session::new();
    counted.add_clause_counted(3, &codes);

    let mut terminated = Session::new();
    terminated.add_clause_terminated(&[1, -2, 3, 0]);

    let mut collected = Session::new();
    collected.add_clause(codes);

    let mut shapes = [by_literal, counted, terminated, collected];
    for session in &mut shapes {
        assert_eq!(session.irredundant(), 1);
    }
    for mask in 0..8u32 {
        let expected = if clause_satisfied(&codes, mask) {
            SolveResult::Satisfiable
        } else {
            SolveResult::Unsatisfiable
        };
        for session in &mut shapes {
            assert_eq!(solve_under_mask(session, 3, mask), expected);
        }
    }
}

#[test]
fn premature_zero_commits_early_and_continues() {
    let mut session = Session::new();
    session.add_clause_counted(3, &[1, 0, 2]);
    // the zero is forwarded as-is: it closes (1), and the remaining literal
    // plus the final close commit (2)
    assert_eq!(session.irredundant(), 2);
    assert_eq!(session.solve(), SolveResult::Satisfiable);
    assert_eq!(session.fixed(1), 1);
    assert_eq!(session.fixed(2), 1);
}

#[test]
fn open_buffer_carries_across_calls() {
    let mut session = Session::new();
    session.add_literal(1);
    session.add_literal(2);
    assert_eq!(session.irredundant(), 0);
    session.add_literal(0);
    assert_eq!(session.irredundant(), 1);
}

#[test]
fn missing_sentinel_still_closes() {
    let mut session = Session::new();
    session.add_clause_terminated(&[1, 2]);
    assert_eq!(session.irredundant(), 1);
}

#[test]
fn terminated_form_ignores_entries_past_the_zero() {
    let mut session = Session::new();
    session.add_clause_terminated(&[1, 0, 7, 8]);
    assert_eq!(session.irredundant(), 1);
    assert_eq!(session.fixed(1), 1);
    assert_eq!(session.fixed(7), 0);
}

#[test]
fn empty_close_commits_the_empty_clause() {
    let mut session = Session::new();
    session.add_literal(0);
    assert_eq!(session.irredundant(), 1);
    assert_eq!(session.solve(), SolveResult::Unsatisfiable);
}

proptest! {
    #[test]
    fn shapes_agree_on_random_clauses(
        lits in proptest::collection::vec((1i32..=4, proptest::bool::ANY), 1..5)
    ) {
        let codes = lits
            .iter()
            .map(|&(v, positive)| if positive { v } else { -v })
            .collect::<Vec<_>>();
        let mut with_sentinel = codes.clone();
        with_sentinel.push(0);

        let mut by_literal = Session::new();
        for &c in &codes {
            by_literal.add_literal(c);
        }
        by_literal.add_literal(0);

        let mut counted = Session::new();
        counted.add_clause_counted(codes.len(), &codes);

        let mut terminated = Session::new();
        terminated.add_clause_terminated(&with_sentinel);

        let mut collected = Session::new();
        collected.add_clause(codes.iter().copied());

        let mut shapes = [by_literal, counted, terminated, collected];
        for mask in 0..16u32 {
            let expected = if clause_satisfied(&codes, mask) {
                SolveResult::Satisfiable
            } else {
                SolveResult::Unsatisfiable
            };
            for session in &mut shapes {
                prop_assert_eq!(solve_under_mask(session, 4, mask), expected);
            }
        }
    }
}
