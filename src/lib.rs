//! Graph Explorer - incremental exploration of property graphs
//!
//! Shows a graph one neighborhood at a time, folding large fan-outs of
//! unexplored neighbors into groups so the view stays readable.

pub mod cli;
pub mod config;
pub mod error;
pub mod exploration;
pub mod models;
pub mod services;
pub mod source;
pub mod visualization;
