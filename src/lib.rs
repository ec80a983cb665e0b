pub mod cli;
pub mod collect;
pub mod config;
pub mod dataset;
pub mod diagnostics;
pub mod error;
pub mod git;
pub mod model;
pub mod process;
pub mod render;
pub mod summary;
