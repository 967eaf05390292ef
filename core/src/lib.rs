//! Survey-to-portfolio allocation pipeline.
//!
//! `ingest` cleans the raw survey export, `classifier` maps answers onto an
//! investment amount and risk profile, `allocator` expands each respondent
//! into one row per asset class, `export` writes the flat table. `engine`
//! drives one batch through all four.

pub mod allocator;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod ingest;
pub mod record;
pub mod types;
