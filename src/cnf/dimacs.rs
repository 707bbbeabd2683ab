use std::fs;

use thiserror::Error;

use super::cnf::{Cnf, Lit};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DimacsError {
    #[error("missing 'p cnf' problem line")]
    MissingHeader,
    #[error("malformed problem line: {0:?}")]
    BadHeader(String),
    #[error("bad literal token {token:?} on line {line}")]
    BadLiteral { token: String, line: usize },
    #[error("unterminated clause at end of input")]
    UnterminatedClause,
}

pub fn to_dimacs(cnf: &Cnf) -> String {
    let mut out = String::new();
    out.push_str(&format!("p cnf {} {}\n", cnf.num_vars, cnf.clauses.len()));
    for clause in &cnf.clauses {
        for &lit in clause {
            out.push_str(&format!("{} ", lit.to_dimacs()));
        }
        out.push_str("0\n");
    }
    out
}

pub fn parse_dimacs(input: &str) -> Result<Cnf, DimacsError> {
    let mut cnf: Option<Cnf> = None;
    let mut clause = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }
        if line.starts_with('p') {
            cnf = Some(parse_header(line)?);
            continue;
        }
        let target = cnf.as_mut().ok_or(DimacsError::MissingHeader)?;
        for token in line.split_whitespace() {
            let code: i32 = token.parse().map_err(|_| DimacsError::BadLiteral {
                token: token.to_string(),
                line: idx + 1,
            })?;
            if code == 0 {
                target.add_clause(std::mem::take(&mut clause));
            } else {
                clause.push(Lit::from_dimacs(code));
            }
        }
    }

    if !clause.is_empty() {
        return Err(DimacsError::UnterminatedClause);
    }
    cnf.ok_or(DimacsError::MissingHeader)
}

fn parse_header(line: &str) -> Result<Cnf, DimacsError> {
    let fields = line.split_whitespace().collect::<Vec<_>>();
    match fields.as_slice() {
        ["p", "cnf", vars, _clauses] => {
            let num_vars: u32 = vars
                .parse()
                .map_err(|_| DimacsError::BadHeader(line.to_string()))?;
            Ok(Cnf::new(num_vars))
        }
        _ => Err(DimacsError::BadHeader(line.to_string())),
    }
}

pub fn load_cnf(path: &str) -> anyhow::Result<Cnf> {
    let text = fs::read_to_string(path)?;
    Ok(parse_dimacs(&text)?)
}
