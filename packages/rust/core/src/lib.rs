//! Core pipeline orchestration and domain logic for auto-bank.
//!
//! This crate ties together input discovery, the external preset parser,
//! seed documents, collation, and output writing into one end-to-end run
//! (`pipeline::build_bank`).

pub mod collate;
pub mod discovery;
pub mod emit;
pub mod parser;
pub mod pipeline;
pub mod seed;
