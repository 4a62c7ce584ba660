//! Launchpad Core
//!
//! Core types shared by the Launchpad build-and-run services.
//!
//! This crate contains:
//! - Domain types: languages, resource-name rules and pipeline stages
//! - DTOs: the request/result pair exchanged between callers and the pipeline

pub mod domain;
pub mod dto;
