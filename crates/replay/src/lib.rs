//! Offline replay of scripted auction calls.
//!
//! A [`script::Script`] names resources, strategies, opening balances and a
//! timed call list; [`runner::run`] feeds it through the serialized auction
//! service and reports final states plus the decoded journal.

pub mod runner;
pub mod script;

pub use runner::{ReplayReport, run};
pub use script::Script;
