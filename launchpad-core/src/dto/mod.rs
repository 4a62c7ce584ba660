//! Data Transfer Objects
//!
//! Request and result types for one build-and-run invocation.

pub mod build_run;
