//! Driving layer for incremental SAT engines: clause construction,
//! per-solve assumptions, freeze/melt bookkeeping, cooperative interruption
//! and post-solve queries, all behind one exclusively-owned session handle.

pub mod cnf;
pub mod engine;
pub mod session;

pub use engine::{Engine, EngineStats, SolveResult, Terminate};
pub use session::Session;

/// Identifies this library build; carries no per-session state.
pub fn signature() -> &'static str {
    concat!("incrsat-", env!("CARGO_PKG_VERSION"))
}
