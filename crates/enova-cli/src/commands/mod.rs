//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod fetch;
pub mod parse;
pub mod review;
