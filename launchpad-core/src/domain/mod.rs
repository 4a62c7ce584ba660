//! Core domain types
//!
//! These types are shared between the pipeline (which executes runs) and
//! the server/client/CLI (which carry requests and results across the wire).

pub mod language;
pub mod naming;
pub mod stage;
