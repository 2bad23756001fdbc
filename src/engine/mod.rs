//! Run orchestration and display for stanza
//!
//! Reconciliation itself lives in the `declarative` crate; this module
//! orders the stages of a run and renders plans for the terminal.

pub mod differ;
pub mod stages;

pub use stages::{StageGraph, StageOutcome};
