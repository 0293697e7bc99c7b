//! Command-line interface for SQLHarvest.
//!
//! Resolves `--input` into SQL sources (file, directory, or inline text),
//! runs the core extractor over each, and flattens the results into one
//! catalog CSV.

pub mod cli;
pub mod input;
pub mod output;
pub mod rows;
